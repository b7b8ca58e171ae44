//! Difficulty Selector
//!
//! A "dice roll" picking one session modifier uniformly from a fixed catalog.

use crate::error::{DrillError, Result};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Built-in difficulties JSON
pub const DIFFICULTIES_JSON: &str = include_str!("../data/difficulties.json");

static BUILTIN_DIFFICULTIES: Lazy<Arc<DifficultyCatalog>> = Lazy::new(|| {
    Arc::new(
        DifficultyCatalog::from_json(DIFFICULTIES_JSON)
            .expect("Embedded difficulties JSON is corrupted"),
    )
});

/// Random session modifier ("Balón pesado", "Máximo dos toques", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difficulty {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Non-empty list of difficulties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyCatalog {
    entries: Vec<Difficulty>,
}

impl DifficultyCatalog {
    pub fn new(entries: Vec<Difficulty>) -> Result<Self> {
        if entries.is_empty() {
            return Err(DrillError::InvalidState("difficulty catalog is empty".to_string()));
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The compiled-in difficulties.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded JSON fails to parse.
    pub fn builtin() -> Arc<DifficultyCatalog> {
        Arc::clone(&BUILTIN_DIFFICULTIES)
    }

    pub fn list(&self) -> &[Difficulty] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Difficulty> {
        self.entries.iter().find(|d| d.id == id)
    }

    /// Uniform pick. The catalog is never empty, so this always yields.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> &Difficulty {
        let idx = rng.gen_range(0..self.entries.len());
        &self.entries[idx]
    }
}
