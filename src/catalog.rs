//! Class catalog for the waste classifier
//!
//! The catalog's index order is the contract between the model's output
//! vector and the human readable labels returned to clients. It is built
//! once at startup and shared read-only by every request.

use serde::Serialize;

use crate::utils::error::{ClassifierError, Result};

/// Total number of classes in the built-in waste catalog
pub const NUM_CLASSES: usize = 9;

/// Class names for the waste dataset (9 classes)
/// MUST match the label order the model was trained with.
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "cardboard",
    "food organics",
    "glass",
    "metal",
    "miscellaneous trash",
    "paper",
    "plastic",
    "textile trash",
    "vegetation",
];

/// Display names and disposal guidance for the built-in classes
const CLASS_DETAILS: [(&str, &str, &str); NUM_CLASSES] = [
    ("cardboard", "Cardboard", "Flatten boxes and remove tape before recycling."),
    ("food organics", "Food Organics", "Compost food scraps to reduce landfill waste."),
    ("glass", "Glass", "Rinse containers and recycle with glass."),
    ("metal", "Metal", "Clean cans and foil before recycling."),
    ("miscellaneous trash", "Miscellaneous Trash", "Dispose in general waste bin."),
    ("paper", "Paper", "Keep paper dry and clean for recycling."),
    ("plastic", "Plastic", "Check the recycling number and clean before recycling."),
    ("textile trash", "Textile", "Donate wearable clothes or recycle fabric."),
    ("vegetation", "Vegetation", "Compost yard waste and plant material."),
];

/// Descriptive information about a single class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassInfo {
    pub index: usize,
    pub name: String,
    pub display_name: String,
    pub disposal_tip: Option<String>,
}

/// Ordered, immutable list of class names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Build a catalog from an ordered list of names
    ///
    /// Names must be non-empty and unique, otherwise the per-class
    /// probability mapping would silently lose entries.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(ClassifierError::Config(
                "class catalog must contain at least one class".to_string(),
            ));
        }

        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ClassifierError::Config(format!(
                    "class name at index {} is empty",
                    i
                )));
            }
            if names[..i].contains(name) {
                return Err(ClassifierError::Config(format!(
                    "duplicate class name '{}' at index {}",
                    name, i
                )));
            }
        }

        Ok(Self { names })
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the class name for a given label index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Get the label index for a given class name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up display information for a class
    pub fn class_info(&self, name: &str) -> Option<ClassInfo> {
        let index = self.index_of(name)?;
        let details = CLASS_DETAILS.iter().find(|(n, _, _)| *n == name);

        Some(ClassInfo {
            index,
            name: name.to_string(),
            display_name: details
                .map(|(_, display, _)| display.to_string())
                .unwrap_or_else(|| name.to_string()),
            disposal_tip: details.map(|(_, _, tip)| tip.to_string()),
        })
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self {
            names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
