//! Template database for runtime loading and lookup
//!
//! Templates are defined in RON files:
//!
//! ```ron
//! (
//!     family: Some("sms_sts"),
//!     templates: [
//!         (
//!             id: 3,
//!             name: "left-elbow",
//!             registers: [
//!                 (addr: 9, value: 1024),
//!                 (addr: 11, value: 3072),
//!             ],
//!         ),
//!     ],
//! )
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::family::ServoFamily;
use crate::{registers, RegisterAddr, ServoId};

/// Highest id a servo can be assigned (254 is the broadcast id)
pub const MAX_SERVO_ID: ServoId = 253;

/// Error type for template database operations
#[derive(Error, Debug)]
pub enum TemplateDbError {
    /// I/O error reading files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// RON parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

// ============================================================================
// RON deserialization types (intermediate format)
// ============================================================================

#[derive(Debug, Clone, serde::Deserialize)]
struct RegisterWriteDef {
    addr: RegisterAddr,
    value: u16,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct TemplateDef {
    id: ServoId,
    #[serde(default)]
    name: String,
    registers: Vec<RegisterWriteDef>,
}

/// A template file: optional family tag plus its templates
#[derive(Debug, Clone, serde::Deserialize)]
struct TemplateFileDef {
    #[serde(default)]
    family: Option<String>,
    templates: Vec<TemplateDef>,
}

// ============================================================================
// Template types
// ============================================================================

/// A configuration template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Template id, also the id the servo is renamed to
    pub id: ServoId,
    /// Human-readable name
    pub name: String,
    /// Family the register values were written for, if declared
    pub family: Option<ServoFamily>,
    /// Register writes in the order they are applied
    pub registers: Vec<(RegisterAddr, u16)>,
}

impl Template {
    /// Create a template from an ordered list of register writes
    pub fn new(id: ServoId, name: impl Into<String>, registers: Vec<(RegisterAddr, u16)>) -> Self {
        Self {
            id,
            name: name.into(),
            family: None,
            registers,
        }
    }

    fn validate(&self) -> Result<(), TemplateDbError> {
        if self.id > MAX_SERVO_ID {
            return Err(TemplateDbError::Validation(format!(
                "template id {} is above the highest servo id {}",
                self.id, MAX_SERVO_ID
            )));
        }

        // The id is written last by the load procedure
        if self.registers.iter().any(|&(addr, _)| addr == registers::ID) {
            return Err(TemplateDbError::Validation(format!(
                "template {} writes the ID register directly",
                self.id
            )));
        }

        Ok(())
    }
}

fn duplicate(existing: &Template, new: &Template) -> TemplateDbError {
    TemplateDbError::Validation(format!(
        "duplicate template id {} ('{}' and '{}')",
        new.id, existing.name, new.name
    ))
}

/// Runtime template database
///
/// Holds the templates loaded from RON files, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateDatabase {
    templates: BTreeMap<ServoId, Template>,
}

impl TemplateDatabase {
    /// Create an empty template database
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Add a single template
    ///
    /// Fails if the template is invalid or its id is already taken.
    pub fn insert(&mut self, template: Template) -> Result<(), TemplateDbError> {
        template.validate()?;

        if let Some(existing) = self.templates.get(&template.id) {
            return Err(duplicate(existing, &template));
        }

        self.templates.insert(template.id, template);
        Ok(())
    }

    /// Load templates from a single RON file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, TemplateDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load templates from a RON string
    ///
    /// A file is loaded as a whole: if any of its templates is invalid or
    /// clashes with an id already loaded (or another one in the same
    /// file), nothing is added. Returns the number of templates added.
    pub fn load_ron(&mut self, content: &str) -> Result<usize, TemplateDbError> {
        let file_def: TemplateFileDef = ron::from_str(content)?;

        let family = file_def
            .family
            .as_deref()
            .map(str::parse::<ServoFamily>)
            .transpose()
            .map_err(|e| TemplateDbError::Validation(e.to_string()))?;

        let mut staged: BTreeMap<ServoId, Template> = BTreeMap::new();

        for def in file_def.templates {
            let template = Template {
                id: def.id,
                name: if def.name.is_empty() {
                    format!("template-{}", def.id)
                } else {
                    def.name
                },
                family,
                registers: def
                    .registers
                    .into_iter()
                    .map(|r| (r.addr, r.value))
                    .collect(),
            };
            template.validate()?;

            let existing = self
                .templates
                .get(&template.id)
                .or_else(|| staged.get(&template.id));
            if let Some(existing) = existing {
                return Err(duplicate(existing, &template));
            }
            staged.insert(template.id, template);
        }

        let count = staged.len();
        self.templates.append(&mut staged);
        Ok(count)
    }

    /// Load all RON files from a directory
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, TemplateDbError> {
        let mut total = 0;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "ron") {
                total += self.load_file(&path)?;
            }
        }

        Ok(total)
    }

    /// Find a template by id
    pub fn get(&self, id: ServoId) -> Option<&Template> {
        self.templates.get(&id)
    }

    /// Get the number of templates in the database
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate over all templates in id order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ron() {
        let ron = r#"
        (
            family: Some("sms_sts"),
            templates: [
                (
                    id: 3,
                    name: "left-elbow",
                    registers: [
                        (addr: 11, value: 3072),
                        (addr: 9, value: 1024),
                        (addr: 21, value: 32),
                    ],
                ),
                (
                    id: 4,
                    registers: [(addr: 9, value: 0)],
                ),
            ],
        )
        "#;

        let mut db = TemplateDatabase::new();
        let count = db.load_ron(ron).unwrap();

        assert_eq!(count, 2);
        assert_eq!(db.len(), 2);

        let elbow = db.get(3).unwrap();
        assert_eq!(elbow.name, "left-elbow");
        assert_eq!(elbow.family, Some(ServoFamily::SmsSts));
        // File order is kept, not sorted by address
        assert_eq!(elbow.registers, vec![(11, 3072), (9, 1024), (21, 32)]);

        assert_eq!(db.get(4).unwrap().name, "template-4");
        assert!(db.get(5).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut db = TemplateDatabase::new();
        db.insert(Template::new(7, "a", vec![(9, 0)])).unwrap();

        let err = db.insert(Template::new(7, "b", vec![(9, 1)])).unwrap_err();
        assert!(matches!(err, TemplateDbError::Validation(_)));
        assert_eq!(db.get(7).unwrap().name, "a");
    }

    #[test]
    fn test_id_register_rejected() {
        let mut db = TemplateDatabase::new();
        let err = db
            .insert(Template::new(2, "renamer", vec![(registers::ID, 9)]))
            .unwrap_err();
        assert!(matches!(err, TemplateDbError::Validation(_)));
        assert!(db.is_empty());
    }

    #[test]
    fn test_invalid_file_adds_nothing() {
        let mut db = TemplateDatabase::new();
        db.insert(Template::new(1, "existing", vec![(9, 0)])).unwrap();

        // Second template writes the ID register
        let bad_register = r#"(templates: [
            (id: 2, registers: [(addr: 9, value: 0)]),
            (id: 3, registers: [(addr: 5, value: 7)]),
        ])"#;
        assert!(db.load_ron(bad_register).is_err());

        // Same id twice in one file
        let twice = r#"(templates: [
            (id: 4, registers: []),
            (id: 4, registers: []),
        ])"#;
        assert!(db.load_ron(twice).is_err());

        // Clashes with a template loaded earlier
        let clash = r#"(templates: [
            (id: 5, registers: []),
            (id: 1, registers: []),
        ])"#;
        assert!(db.load_ron(clash).is_err());

        assert_eq!(db.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_count_is_templates_added() {
        let mut db = TemplateDatabase::new();
        let ron = r#"(templates: [(id: 6, registers: []), (id: 7, registers: [])])"#;
        assert_eq!(db.load_ron(ron).unwrap(), 2);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_broadcast_id_rejected() {
        let mut db = TemplateDatabase::new();
        assert!(db.insert(Template::new(254, "bcast", vec![])).is_err());
    }

    #[test]
    fn test_unknown_family_rejected() {
        let ron = r#"(family: Some("xl430"), templates: [])"#;
        let mut db = TemplateDatabase::new();
        assert!(matches!(
            db.load_ron(ron),
            Err(TemplateDbError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let mut db = TemplateDatabase::new();
        assert!(matches!(
            db.load_ron("(templates: [(id: 1)])"),
            Err(TemplateDbError::Parse(_))
        ));
    }
}
