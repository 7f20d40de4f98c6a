// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Symbol parser for the `<kind name(args)>` grammar literal format.
//!
//! Parsing never fails outright. Malformed input truncates the token stream
//! at the first structural mistake and reports a [`ParseError`] alongside the
//! symbols recovered up to that point.

use thiserror::Error;
use tracing::warn;

use crate::math::RandomSource;
use crate::symbol::SymbolKind;

/// Opens a symbol.
pub const OPEN: char = '<';
/// Closes a symbol.
pub const CLOSE: char = '>';
/// Ends the parseable part of the input.
pub const COMMENT: char = '/';
/// Marks an inline random-float placeholder inside arguments.
pub const RANDOM_PREFIX: &str = "R[";

/// Structural or lexical problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `<` appeared while another symbol was still open.
    #[error("symbol opened at byte {offset} before the previous one was closed")]
    UnexpectedOpen {
        /// Byte offset of the offending `<`.
        offset: usize,
    },
    /// A non-whitespace character appeared outside any symbol.
    #[error("expected '<' at byte {offset}, found {found:?}")]
    MissingOpen {
        /// Byte offset of the offending character.
        offset: usize,
        /// The character found instead of `<`.
        found: char,
    },
    /// Input ended inside an open symbol.
    #[error("symbol opened at byte {offset} is never closed")]
    Unclosed {
        /// Byte offset of the unmatched `<`.
        offset: usize,
    },
    /// The kind token is not one of the recognised forms.
    #[error("unknown symbol kind {token:?} in {raw}")]
    UnknownKind {
        /// The token as written.
        token: String,
        /// The full symbol text.
        raw: String,
    },
    /// An `R[min,max]` placeholder could not be resolved; it is left verbatim.
    #[error("malformed random placeholder {fragment:?}")]
    MalformedRandom {
        /// The unresolved fragment.
        fragment: String,
    },
}

/// A symbol as read from text, before it is placed in an arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSymbol {
    /// Source text including the angle brackets.
    pub raw: String,
    /// Kind parsed from the leading token.
    pub kind: SymbolKind,
    /// Identifier with whitespace removed.
    pub name: String,
    /// Argument string with random placeholders resolved.
    pub args: String,
}

/// Output of [`parse`]: every symbol recovered plus the problems encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parse {
    /// Symbols in source order.
    pub symbols: Vec<ParsedSymbol>,
    /// Problems in the order they were found; at most one is structural.
    pub errors: Vec<ParseError>,
}

/// Tokenizes `text` into symbols.
///
/// Random draws happen in source order, one per `R[min,max]` placeholder.
pub fn parse(text: &str, rng: &mut dyn RandomSource) -> Parse {
    let mut out = Parse::default();
    let mut open_at: Option<usize> = None;

    for (offset, ch) in text.char_indices() {
        if ch == COMMENT {
            return out;
        }
        if ch == OPEN {
            if open_at.is_some() {
                report(&mut out, ParseError::UnexpectedOpen { offset });
                return out;
            }
            open_at = Some(offset);
            continue;
        }
        let Some(start) = open_at else {
            if ch.is_whitespace() {
                continue;
            }
            report(&mut out, ParseError::MissingOpen { offset, found: ch });
            return out;
        };
        if ch == CLOSE {
            let raw = &text[start..offset + ch.len_utf8()];
            let symbol = read_symbol(raw, rng, &mut out.errors);
            out.symbols.push(symbol);
            open_at = None;
        }
    }

    if let Some(offset) = open_at {
        report(&mut out, ParseError::Unclosed { offset });
    }
    out
}

/// Concatenates raw symbol texts back into a grammar string.
pub fn render(symbols: &[ParsedSymbol]) -> String {
    symbols.iter().map(|s| s.raw.as_str()).collect()
}

fn report(out: &mut Parse, err: ParseError) {
    warn!(error = %err, "grammar parse error");
    out.errors.push(err);
}

fn read_symbol(raw: &str, rng: &mut dyn RandomSource, errors: &mut Vec<ParseError>) -> ParsedSymbol {
    let body = raw.trim_matches(|c| c == OPEN || c == CLOSE);
    let (token, rest) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], &body[split..]),
        None => (body, ""),
    };
    let kind = SymbolKind::from_token(token);
    if kind == SymbolKind::Invalid {
        let err = ParseError::UnknownKind {
            token: token.to_owned(),
            raw: raw.to_owned(),
        };
        warn!(error = %err, "grammar parse error");
        errors.push(err);
    }

    let compact = strip_whitespace(rest);
    let (name, args) = match (compact.find('('), compact.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let mut name = String::with_capacity(compact.len());
            name.push_str(&compact[..open]);
            name.push_str(&compact[close + 1..]);
            let args = resolve_random(&compact[open + 1..close], rng, errors);
            (name, args)
        }
        _ => (compact, String::new()),
    };

    ParsedSymbol {
        raw: raw.to_owned(),
        kind,
        name,
        args,
    }
}

/// Removes every whitespace character.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replaces each `R[min,max]` with an independent draw from `[min, max)`.
pub fn resolve_random(args: &str, rng: &mut dyn RandomSource, errors: &mut Vec<ParseError>) -> String {
    let mut out = args.to_owned();
    let mut cursor = 0;
    while let Some(found) = out[cursor..].find(RANDOM_PREFIX) {
        let start = cursor + found;
        let Some(close) = out[start..].find(']').map(|c| start + c) else {
            let err = ParseError::MalformedRandom {
                fragment: out[start..].to_owned(),
            };
            warn!(error = %err, "grammar parse error");
            errors.push(err);
            break;
        };
        let inner = &out[start + RANDOM_PREFIX.len()..close];
        let bounds: Vec<Option<f32>> = inner.split(',').map(|v| v.parse().ok()).collect();
        let [Some(min), Some(max)] = bounds.as_slice() else {
            let err = ParseError::MalformedRandom {
                fragment: out[start..=close].to_owned(),
            };
            warn!(error = %err, "grammar parse error");
            errors.push(err);
            cursor = close + 1;
            continue;
        };
        let value = format!("{}", rng.range_f32(*min, *max));
        out.replace_range(start..=close, &value);
        cursor = start + value.len();
    }
    out
}
