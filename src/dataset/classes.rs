//! Global class registry.

use std::io;
use std::path::Path;
use std::sync::Arc;

use super::record::{RecordError, read_json, write_json};
use crate::constants::CLASSES_FILE;
use crate::model::{ClassDef, default_classes};
use crate::storage::Storage;

/// Source of the ordered class list that box class indices refer to.
///
/// Exporters only see this trait, so the positional index scheme can be
/// replaced without touching the converters.
pub trait ClassCatalog: Send + Sync {
    /// Current classes, in index order.
    fn classes(&self) -> Vec<ClassDef>;

    /// Current class names, in index order.
    fn class_names(&self) -> Vec<String> {
        self.classes().into_iter().map(|c| c.name).collect()
    }
}

impl ClassCatalog for Vec<ClassDef> {
    fn classes(&self) -> Vec<ClassDef> {
        self.clone()
    }
}

/// Class list persisted as `classes.json` at the data root, shared by all jobs.
#[derive(Clone)]
pub struct ClassRegistry {
    storage: Arc<dyn Storage>,
}

impl ClassRegistry {
    /// Create a registry over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load the stored classes, reporting why they could not be read.
    pub fn try_load(&self) -> Result<Vec<ClassDef>, RecordError> {
        read_json(self.storage.as_ref(), Path::new(CLASSES_FILE))
    }

    /// Load the classes; a missing or unparsable registry yields the single default class.
    pub fn load(&self) -> Vec<ClassDef> {
        match self.try_load() {
            Ok(classes) => classes,
            Err(RecordError::Missing { .. }) => default_classes(),
            Err(e) => {
                log::warn!("Using default classes: {}", e);
                default_classes()
            }
        }
    }

    /// Replace the stored classes. Names and colors are not validated.
    pub fn save(&self, classes: &[ClassDef]) -> io::Result<()> {
        write_json(self.storage.as_ref(), Path::new(CLASSES_FILE), classes)?;
        log::info!("Saved {} classes", classes.len());
        Ok(())
    }
}

impl ClassCatalog for ClassRegistry {
    fn classes(&self) -> Vec<ClassDef> {
        self.load()
    }
}
