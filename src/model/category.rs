//! Class definitions shared by every job.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CLASS_COLOR, DEFAULT_CLASS_NAME};

/// An annotation class with a name and display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Display name of the class (one line of `classes.txt`)
    pub name: String,
    /// CSS-style display color, e.g. `#00ff00`
    #[serde(default)]
    pub color: String,
}

impl ClassDef {
    /// Create a new class definition.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The class list used when no registry has been saved yet.
pub fn default_classes() -> Vec<ClassDef> {
    vec![ClassDef::new(DEFAULT_CLASS_NAME, DEFAULT_CLASS_COLOR)]
}
