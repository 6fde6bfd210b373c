use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::alignment::Alignment;
use crate::core::catalog::CatalogError;

/// Authored content for one ending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingContent {
    pub title: String,
    pub lines: Vec<String>,
}

/// Ending content keyed by the path the narrative finished on.
#[derive(Debug, Clone)]
pub struct EndingTable {
    entries: FxHashMap<Alignment, EndingContent>,
}

// The RON file lists the three endings as named fields so a missing one is
// rejected by the deserializer itself.
#[derive(Debug, Deserialize)]
struct RonEndings {
    power: EndingContent,
    humanity: EndingContent,
    bliss: EndingContent,
}

impl EndingTable {
    /// Build a table, requiring an entry for every alignment.
    pub fn new(entries: FxHashMap<Alignment, EndingContent>) -> Result<Self, CatalogError> {
        for alignment in Alignment::ALL {
            if !entries.contains_key(&alignment) {
                return Err(CatalogError::MissingEnding(alignment));
            }
        }
        Ok(Self { entries })
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, CatalogError> {
        let raw: RonEndings = ron::from_str(input)?;
        let mut entries = FxHashMap::default();
        entries.insert(Alignment::Power, raw.power);
        entries.insert(Alignment::Humanity, raw.humanity);
        entries.insert(Alignment::Bliss, raw.bliss);
        Self::new(entries)
    }

    pub fn get(&self, alignment: Alignment) -> &EndingContent {
        // Construction guarantees all three keys.
        &self.entries[&alignment]
    }
}

/// The terminal record produced when the narrative ends. The score, depth and
/// limbo count are frozen at the moment the ending is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    pub path: Alignment,
    pub final_score: i32,
    pub depth: u32,
    pub limbo_count: u32,
    pub content: EndingContent,
}
