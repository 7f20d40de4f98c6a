// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Non-fatal problems recorded while a grammar runs.
use core::fmt;

use crate::ident::EntityId;
use crate::parser::ParseError;

/// A recoverable event worth reporting to the caller.
///
/// Every diagnostic is also logged when it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Grammar text was malformed; the remainder was dropped.
    Parse {
        /// Iteration during which the text was parsed.
        iteration: u32,
        /// What went wrong.
        error: ParseError,
    },
    /// The target entity has no capability with this name.
    MethodNotFound {
        /// Iteration of the pass.
        iteration: u32,
        /// Raw text of the Method symbol.
        method: String,
        /// Raw text of the Object symbol it was routed to.
        target: String,
    },
    /// A Method symbol had no Object before it in the pass.
    MethodPlacementOrder {
        /// Iteration of the pass.
        iteration: u32,
        /// Raw text of the Method symbol.
        method: String,
    },
    /// A spawned entity left the allowed region; the pass was rolled back.
    SpatialViolation {
        /// Iteration of the pass.
        iteration: u32,
        /// Raw text of the offending Object symbol.
        symbol: String,
        /// Entity that failed validation.
        entity: EntityId,
    },
}

impl Diagnostic {
    /// Iteration the diagnostic belongs to.
    pub fn iteration(&self) -> u32 {
        match self {
            Self::Parse { iteration, .. }
            | Self::MethodNotFound { iteration, .. }
            | Self::MethodPlacementOrder { iteration, .. }
            | Self::SpatialViolation { iteration, .. } => *iteration,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { iteration, error } => write!(f, "[{iteration}] parse: {error}"),
            Self::MethodNotFound {
                iteration,
                method,
                target,
            } => write!(f, "[{iteration}] no method {method} on {target}"),
            Self::MethodPlacementOrder { iteration, method } => {
                write!(f, "[{iteration}] {method} must follow an object")
            }
            Self::SpatialViolation {
                iteration,
                symbol,
                entity,
            } => write!(f, "[{iteration}] {symbol} ({entity}) is outside the space"),
        }
    }
}
