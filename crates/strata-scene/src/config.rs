// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grammar documents: everything one execution needs, as JSON.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_core::math::{RandomSource, Vec3};
use strata_core::{EngineConfig, IterationBudget, Rule, DEFAULT_MAX_RECOVERY_ATTEMPTS};
use strata_geom::Region;
use thiserror::Error;

use crate::link::Link;
use crate::prefab::{Prefab, PrefabKind};

/// Error type for loading and validating documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The text is not a valid document.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A link names a prefab the catalogue lacks.
    #[error("link {symbol:?} references unknown prefab {prefab:?}")]
    UnknownPrefab {
        /// Linked symbol.
        symbol: String,
        /// Missing prefab.
        prefab: String,
    },
    /// A link offers no variants.
    #[error("link {symbol:?} has no prefabs")]
    EmptyLink {
        /// Linked symbol.
        symbol: String,
    },
    /// A generator lists something other than a tile.
    #[error("generator {generator:?} lists {prefab:?}, which is not a tile prefab")]
    NotATile {
        /// Generator prefab.
        generator: String,
        /// Offending entry.
        prefab: String,
    },
    /// A size has a negative component.
    #[error("{what} has a negative size")]
    NegativeSize {
        /// Prefab or section name.
        what: String,
    },
    /// `repeat` is zero.
    #[error("repeat must be at least 1")]
    ZeroRepeat,
}

/// Iteration and recovery settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Pass limit when `endless` is off.
    pub iterations: u32,
    /// Keep rewriting until the sentence empties.
    pub endless: bool,
    /// Exclude a failed alternative for every symbol, not only its producer.
    pub relaxed_recovery: bool,
    /// Rollbacks allowed per iteration.
    pub max_recovery_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            iterations: 1,
            endless: false,
            relaxed_recovery: false,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
        }
    }
}

/// The bounded space spawned tiles must stay in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// Minimum corner.
    pub origin: Vec3,
    /// Extent.
    pub size: Vec3,
    /// Where holders are created, relative to `origin`.
    #[serde(default)]
    pub spawn_start: Vec3,
    /// Same as [`EngineSettings::relaxed_recovery`].
    #[serde(default)]
    pub relaxed: bool,
}

impl SpaceConfig {
    /// Region spanned by the space.
    pub fn region(&self) -> Region {
        Region::new(self.origin, self.size)
    }

    /// World position holders start at.
    pub fn spawn_origin(&self) -> Vec3 {
        self.origin.add(&self.spawn_start)
    }
}

/// Box that finished runs are scattered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterArea {
    /// Minimum corner.
    pub origin: Vec3,
    /// Extent.
    pub size: Vec3,
}

impl ScatterArea {
    /// Uniform point inside the area.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> Vec3 {
        let [ox, oy, oz] = self.origin.to_array();
        let [sx, sy, sz] = self.size.to_array();
        let x = rng.range_f32(ox, ox + sx);
        let y = rng.range_f32(oy, oy + sy);
        let z = rng.range_f32(oz, oz + sz);
        Vec3::new(x, y, z)
    }
}

const fn one() -> u32 {
    1
}

/// A complete grammar setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDocument {
    /// Starting sentence.
    pub start: String,
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Rewriting rules.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Symbol to prefab links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Prefab catalogue.
    #[serde(default)]
    pub prefabs: Vec<Prefab>,
    /// Validation space; without it nothing is validated.
    #[serde(default)]
    pub space: Option<SpaceConfig>,
    /// Where each finished run's holder is moved.
    #[serde(default)]
    pub scatter: Option<ScatterArea>,
    /// How many times the grammar is executed.
    #[serde(default = "one")]
    pub repeat: u32,
    /// Seed used when the caller does not supply one.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GrammarDocument {
    /// Reads and validates a document file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a document.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serializes the document as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks cross references and value ranges.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.repeat == 0 {
            return Err(DocumentError::ZeroRepeat);
        }
        let find = |name: &str| self.prefabs.iter().find(|p| p.name == name);
        for link in &self.links {
            if link.prefabs.is_empty() {
                return Err(DocumentError::EmptyLink {
                    symbol: link.symbol.clone(),
                });
            }
            if let Some(missing) = link.prefabs.iter().find(|p| find(p.as_str()).is_none()) {
                return Err(DocumentError::UnknownPrefab {
                    symbol: link.symbol.clone(),
                    prefab: missing.clone(),
                });
            }
        }
        for prefab in &self.prefabs {
            match &prefab.kind {
                PrefabKind::Marker => {}
                PrefabKind::Tile(shape) => {
                    if has_negative(shape.size) {
                        return Err(DocumentError::NegativeSize {
                            what: prefab.name.clone(),
                        });
                    }
                }
                PrefabKind::Generator(generator) => {
                    let bad = generator
                        .tiles
                        .iter()
                        .find(|t| !matches!(find(t.as_str()).map(|p| &p.kind), Some(PrefabKind::Tile(_))));
                    if let Some(bad) = bad {
                        return Err(DocumentError::NotATile {
                            generator: prefab.name.clone(),
                            prefab: bad.clone(),
                        });
                    }
                }
            }
        }
        if let Some(space) = &self.space {
            if has_negative(space.size) {
                return Err(DocumentError::NegativeSize { what: "space".into() });
            }
        }
        if let Some(scatter) = &self.scatter {
            if has_negative(scatter.size) {
                return Err(DocumentError::NegativeSize {
                    what: "scatter area".into(),
                });
            }
        }
        Ok(())
    }

    /// Engine configuration; the space's `relaxed` flag also turns on
    /// relaxed recovery.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            budget: if self.engine.endless {
                IterationBudget::Unbounded
            } else {
                IterationBudget::Bounded(self.engine.iterations)
            },
            relaxed_recovery: self.engine.relaxed_recovery || self.space.is_some_and(|s| s.relaxed),
            max_recovery_attempts: self.engine.max_recovery_attempts,
        }
    }
}

fn has_negative(v: Vec3) -> bool {
    v.to_array().iter().any(|c| *c < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"start": "<object A>"}"#;

    #[test]
    fn defaults_fill_a_minimal_document() {
        let doc = GrammarDocument::from_json_str(MINIMAL).unwrap();
        assert_eq!(doc.repeat, 1);
        assert!(doc.space.is_none());
        let config = doc.engine_config();
        assert_eq!(config.budget, IterationBudget::Bounded(1));
        assert_eq!(config.max_recovery_attempts, DEFAULT_MAX_RECOVERY_ATTEMPTS);
        assert!(!config.relaxed_recovery);
    }

    #[test]
    fn space_relaxed_flag_reaches_the_engine() {
        let doc = GrammarDocument::from_json_str(
            r#"{"start": "<o A>", "engine": {"endless": true},
                "space": {"origin": [0,0,0], "size": [4,4,4], "relaxed": true}}"#,
        )
        .unwrap();
        let config = doc.engine_config();
        assert_eq!(config.budget, IterationBudget::Unbounded);
        assert!(config.relaxed_recovery);
    }

    #[test]
    fn broken_references_are_rejected() {
        let unknown = r#"{"start": "", "links": [{"symbol": "A", "prefabs": ["Nope"]}]}"#;
        assert!(matches!(
            GrammarDocument::from_json_str(unknown),
            Err(DocumentError::UnknownPrefab { .. })
        ));
        let empty = r#"{"start": "", "links": [{"symbol": "A", "prefabs": []}]}"#;
        assert!(matches!(
            GrammarDocument::from_json_str(empty),
            Err(DocumentError::EmptyLink { .. })
        ));
        let not_tile = r#"{"start": "", "prefabs": [
            {"name": "M", "kind": "marker"},
            {"name": "G", "kind": "generator", "tiles": ["M"]}]}"#;
        assert!(matches!(
            GrammarDocument::from_json_str(not_tile),
            Err(DocumentError::NotATile { .. })
        ));
        let negative = r#"{"start": "", "prefabs": [{"name": "T", "kind": "tile", "size": [1,-1,1]}]}"#;
        assert!(matches!(
            GrammarDocument::from_json_str(negative),
            Err(DocumentError::NegativeSize { .. })
        ));
        assert!(matches!(
            GrammarDocument::from_json_str(r#"{"start": "", "repeat": 0}"#),
            Err(DocumentError::ZeroRepeat)
        ));
        assert!(matches!(GrammarDocument::from_json_str("{"), Err(DocumentError::Serde(_))));
    }

    #[test]
    fn scatter_samples_stay_inside() {
        let area = ScatterArea {
            origin: Vec3::new(-5.0, 0.0, 2.0),
            size: Vec3::new(10.0, 0.0, 3.0),
        };
        let mut rng = strata_core::math::Prng::from_seed_u64(8);
        for _ in 0..64 {
            let p = area.sample(&mut rng);
            assert!((-5.0..5.0).contains(&p.x()));
            assert!(p.y().abs() < f32::EPSILON);
            assert!((2.0..5.0).contains(&p.z()));
        }
    }
}
