//! Drill Catalog
//!
//! Read-only registry of drill definitions. The built-in catalog is embedded
//! at compile time with `include_str!` and parsed once; callers share it
//! through an `Arc` so playback and tests can inject their own catalogs.

pub mod types;

pub use types::{
    Cue, Drill, LevelFilter, Obstacle, ObstacleKind, Player, PlayerNumber, Point, Positions,
    MAX_LEVEL,
};

use crate::error::{DrillError, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

/// Built-in drills JSON
pub const DRILLS_JSON: &str = include_str!("../../data/drills.json");

static BUILTIN_CATALOG: Lazy<Arc<DrillCatalog>> = Lazy::new(|| {
    Arc::new(DrillCatalog::from_json(DRILLS_JSON).expect("Embedded drills JSON is corrupted"))
});

#[derive(Debug, Clone, PartialEq)]
pub struct DrillCatalog {
    drills: Vec<Drill>,
}

impl DrillCatalog {
    /// Build a catalog, checking structural shape only.
    pub fn new(drills: Vec<Drill>) -> Result<Self> {
        if drills.is_empty() {
            return Err(DrillError::InvalidState("drill catalog is empty".to_string()));
        }

        let mut ids = HashSet::new();
        for drill in &drills {
            if !ids.insert(drill.id.as_str()) {
                return Err(DrillError::InvalidState(format!("duplicate drill id '{}'", drill.id)));
            }
            drill.validate()?;
        }

        Ok(Self { drills })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let drills: Vec<Drill> = serde_json::from_str(json)?;
        Self::new(drills)
    }

    /// The compiled-in catalog.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded JSON fails to parse (never happens
    /// in a normal build; covered by tests).
    pub fn builtin() -> Arc<DrillCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    pub fn list(&self) -> &[Drill] {
        &self.drills
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Drill> {
        self.drills.get(index).ok_or_else(|| DrillError::out_of_range(index, self.drills.len()))
    }

    /// Catalog indices of the drills passing `filter`, in catalog order.
    pub fn filter_indices(&self, filter: LevelFilter) -> Vec<usize> {
        self.drills
            .iter()
            .enumerate()
            .filter(|(_, d)| filter.matches(d))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filter(&self, filter: LevelFilter) -> Vec<&Drill> {
        self.drills.iter().filter(|d| filter.matches(d)).collect()
    }

    pub fn position_of(&self, drill_id: &str) -> Option<usize> {
        self.drills.iter().position(|d| d.id == drill_id)
    }

    /// Distinct levels present in the catalog, ascending.
    pub fn levels(&self) -> Vec<u8> {
        let mut levels: Vec<u8> = self.drills.iter().filter_map(|d| d.level).collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::types::fixtures::square_drill;
    use super::*;

    fn test_catalog() -> DrillCatalog {
        DrillCatalog::new(vec![
            square_drill("a", Some(1)),
            square_drill("b", None),
            square_drill("c", Some(2)),
            square_drill("d", Some(1)),
        ])
        .unwrap()
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = DrillCatalog::builtin();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.list()[0].id, "activation");
        assert!(catalog.list().iter().all(|d| d.validate().is_ok()));
        assert!(catalog.list().iter().any(|d| d.players.is_some()));
        assert!(catalog.list().iter().any(|d| d.multiple_balls.is_some()));
        assert!(catalog.list().iter().any(|d| d.level.is_none()));
    }

    #[test]
    fn test_filter_preserves_order() {
        let catalog = test_catalog();

        let all: Vec<&str> = catalog.filter(LevelFilter::All).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(all, vec!["a", "b", "c", "d"]);

        let level_one: Vec<&str> =
            catalog.filter(LevelFilter::Level(1)).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(level_one, vec!["a", "d"]);
        assert_eq!(catalog.filter_indices(LevelFilter::Level(1)), vec![0, 3]);
        assert!(catalog.filter(LevelFilter::Level(4)).is_empty());
    }

    #[test]
    fn test_get_out_of_range() {
        let catalog = test_catalog();
        assert_eq!(catalog.get(1).unwrap().id, "b");
        assert_eq!(catalog.get(4), Err(DrillError::OutOfRange { index: 4, len: 4 }));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_ids() {
        assert!(DrillCatalog::new(Vec::new()).is_err());
        assert!(DrillCatalog::new(vec![square_drill("a", None), square_drill("a", None)]).is_err());
        assert!(matches!(DrillCatalog::from_json("{"), Err(DrillError::InvalidState(_))));
    }

    #[test]
    fn test_position_of_and_levels() {
        let catalog = test_catalog();
        assert_eq!(catalog.position_of("c"), Some(2));
        assert_eq!(catalog.position_of("zzz"), None);
        assert_eq!(catalog.levels(), vec![1, 2]);
    }
}
