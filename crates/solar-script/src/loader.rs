//! Behavior file loader
//!
//! Accepts JSON or RON documents in either of two shapes:
//! - `{ "behaviors": [ ... ] }` for a single system's file
//! - `{ "movement": [ ... ], "ai": [ ... ] }` for a combined file
//!
//! A malformed definition is skipped and recorded in the [`LoadReport`];
//! the rest of the file still loads.

use crate::error::{Error, Result};
use crate::registry::BehaviorRegistry;
use crate::schema::{AiBehaviorDef, MovementBehaviorDef};
use solar_core::{Value, ValueMap};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
}

impl Format {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("ron") => Ok(Format::Ron),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse(&self, content: &str) -> Result<Value> {
        Ok(match self {
            Format::Json => serde_json::from_str(content)?,
            Format::Ron => ron::from_str(content)?,
        })
    }
}

/// Which system a behavior definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Movement,
    Ai,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Movement => write!(f, "movement"),
            Section::Ai => write!(f, "ai"),
        }
    }
}

/// A definition the loader skipped
#[derive(Debug)]
pub struct Rejected {
    pub section: Section,
    /// Position of the definition within its list
    pub index: usize,
    pub error: Error,
}

/// Outcome of loading one or more files
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of accepted definitions, in load order
    pub loaded: Vec<String>,
    /// Definitions skipped with the reason
    pub rejected: Vec<Rejected>,
}

impl LoadReport {
    /// True when nothing was rejected
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Loader for behavior files
pub struct Loader {
    registry: BehaviorRegistry,
    report: LoadReport,
}

impl Loader {
    /// Create a loader with an empty registry
    pub fn new() -> Self {
        Self::with_registry(BehaviorRegistry::new())
    }

    /// Create a loader that extends an existing registry
    pub fn with_registry(registry: BehaviorRegistry) -> Self {
        Self {
            registry,
            report: LoadReport::default(),
        }
    }

    /// Load a behavior file, choosing JSON or RON by extension
    ///
    /// A `behaviors` list is read as `section`; a combined file ignores it.
    pub fn load_file(&mut self, path: impl AsRef<Path>, section: Section) -> Result<()> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path)?;
        info!(path = %path.display(), "loading behavior file");
        self.load_str(&content, format, section)
    }

    /// Load a behavior document from a string
    pub fn load_str(&mut self, content: &str, format: Format, section: Section) -> Result<()> {
        let doc = format.parse(content)?;
        let doc = doc
            .as_map()
            .ok_or_else(|| Error::InvalidSchema(format!("expected a map at top level, got {}", doc.type_name())))?;

        let mut found = false;
        if let Some(list) = doc.get("behaviors") {
            found = true;
            self.load_list(list, section)?;
        }
        if let Some(list) = doc.get("movement") {
            found = true;
            self.load_list(list, Section::Movement)?;
        }
        if let Some(list) = doc.get("ai") {
            found = true;
            self.load_list(list, Section::Ai)?;
        }

        if !found {
            return Err(Error::InvalidSchema(
                "expected a 'behaviors', 'movement' or 'ai' list".to_string(),
            ));
        }
        Ok(())
    }

    fn load_list(&mut self, list: &Value, section: Section) -> Result<()> {
        let entries = list.as_list().ok_or_else(|| {
            Error::InvalidSchema(format!("'{}' must be a list, got {}", section, list.type_name()))
        })?;

        for (index, entry) in entries.iter().enumerate() {
            let outcome = match entry.as_map() {
                Some(map) => self.load_definition(map, section),
                None => Err(Error::InvalidSchema(format!(
                    "definition must be a map, got {}",
                    entry.type_name()
                ))),
            };

            match outcome {
                Ok(name) => {
                    debug!(%section, behavior = %name, "registered behavior");
                    self.report.loaded.push(name);
                }
                Err(error) => {
                    warn!(%section, index, %error, "skipping behavior definition");
                    self.report.rejected.push(Rejected {
                        section,
                        index,
                        error,
                    });
                }
            }
        }
        Ok(())
    }

    fn load_definition(&mut self, map: &ValueMap, section: Section) -> Result<String> {
        match section {
            Section::Movement => {
                let def = MovementBehaviorDef::from_map(map)?;
                let name = def.name.clone();
                self.registry.register_movement(def)?;
                Ok(name)
            }
            Section::Ai => {
                let def = AiBehaviorDef::from_map(map)?;
                let name = def.name.clone();
                self.registry.register_ai(def)?;
                Ok(name)
            }
        }
    }

    /// Get the current registry (for inspection during loading)
    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Get the report so far
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Finish loading and return the registry with the load report
    pub fn finish(self) -> (BehaviorRegistry, LoadReport) {
        (self.registry, self.report)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AiKind, MovementKind};

    #[test]
    fn test_load_movement_json() {
        let content = r#"
        {
            "behaviors": [
                {"name": "slow_linear", "type": "linear", "max_speed": 30.0, "enabled": true},
                {"name": "seek_target", "type": "seek", "speed": 50.0, "max_force": 150.0}
            ]
        }
        "#;

        let mut loader = Loader::new();
        loader.load_str(content, Format::Json, Section::Movement).unwrap();

        let (registry, report) = loader.finish();
        assert!(report.is_clean());
        assert_eq!(report.loaded, vec!["slow_linear", "seek_target"]);
        assert_eq!(
            registry.movement("slow_linear").map(|d| &d.kind),
            Some(&MovementKind::Linear { max_speed: 30.0 })
        );
    }

    #[test]
    fn test_bad_definitions_skipped() {
        let content = r#"
        {
            "behaviors": [
                {"name": "rest", "type": "idle", "priority": 0},
                {"name": "dance", "type": "dance"},
                {"name": "hunt", "type": "hunt"},
                {"type": "idle"},
                {"name": "rest", "type": "idle"},
                "not a map",
                {"name": "run", "type": "flee", "threat_types": ["fighter"], "priority": 30}
            ]
        }
        "#;

        let mut loader = Loader::new();
        loader.load_str(content, Format::Json, Section::Ai).unwrap();
        let (registry, report) = loader.finish();

        assert_eq!(report.loaded, vec!["rest", "run"]);
        assert_eq!(report.rejected.len(), 5);
        assert!(matches!(
            report.rejected[0].error,
            Error::UnknownBehaviorType { .. }
        ));
        assert!(matches!(report.rejected[1].error, Error::MissingField { .. }));
        assert!(matches!(report.rejected[2].error, Error::MissingField { .. }));
        assert!(matches!(
            report.rejected[3].error,
            Error::DuplicateDefinition(_)
        ));
        assert!(matches!(report.rejected[4].error, Error::InvalidSchema(_)));
        assert_eq!(report.rejected[1].index, 2);
        assert_eq!(registry.ai_count(), 2);
    }

    #[test]
    fn test_load_combined_ron() {
        let content = r#"
        {
            "movement": [
                {"name": "drift", "type": "wander", "speed": 10},
            ],
            "ai": [
                {"name": "rest", "type": "idle", "energy_recovery_rate": 15.0},
                {
                    "name": "patrol",
                    "type": "patrol",
                    "priority": 10,
                    "waypoints": [[0.0, 0.0], [100.0, 0.0]],
                },
            ],
        }
        "#;

        let mut loader = Loader::new();
        loader.load_str(content, Format::Ron, Section::Ai).unwrap();
        let (registry, report) = loader.finish();

        assert!(report.is_clean());
        assert!(registry.movement("drift").is_some());
        assert!(matches!(
            registry.ai("patrol").map(|d| &d.kind),
            Some(AiKind::Patrol { waypoints, .. }) if waypoints.len() == 2
        ));
    }

    #[test]
    fn test_whole_file_errors() {
        let mut loader = Loader::new();
        assert!(matches!(
            loader.load_str("{ not json", Format::Json, Section::Ai),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            loader.load_str("[1, 2]", Format::Json, Section::Ai),
            Err(Error::InvalidSchema(_))
        ));
        assert!(matches!(
            loader.load_str(r#"{"other": []}"#, Format::Json, Section::Ai),
            Err(Error::InvalidSchema(_))
        ));
        assert!(matches!(
            Format::from_path(Path::new("behaviors.yaml")),
            Err(Error::UnsupportedFormat(_))
        ));
        assert_eq!(
            Format::from_path(Path::new("config/ai.ron")).unwrap(),
            Format::Ron
        );
    }

    #[test]
    fn test_load_file() {
        let dir = std::env::temp_dir().join(format!("solar-script-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("movement.json");
        fs::write(
            &path,
            r#"{"behaviors": [{"name": "cruise", "type": "linear"}]}"#,
        )
        .unwrap();

        let mut loader = Loader::with_registry(BehaviorRegistry::with_defaults());
        loader.load_file(&path, Section::Movement).unwrap();
        assert!(loader.registry().movement("cruise").is_some());
        assert!(loader.registry().movement("fast_patrol").is_some());

        let missing = loader.load_file(dir.join("absent.json"), Section::Movement);
        assert!(matches!(missing, Err(Error::Io(_))));

        fs::remove_dir_all(&dir).unwrap();
    }
}
