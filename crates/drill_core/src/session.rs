//! Current session
//!
//! Composes drill playback, the rolled difficulty, view toggles and the
//! currently loaded workshop. Tracks whether the session drifted from the
//! workshop it was loaded from or last saved as.

use crate::catalog::{Cue, Drill, DrillCatalog, LevelFilter, Positions};
use crate::clock::Tick;
use crate::config::SessionConfig;
use crate::difficulty::{Difficulty, DifficultyCatalog};
use crate::error::DrillError;
use crate::playback::PlaybackState;
use crate::teams::{self, Teams};
use crate::workshop::{KeyValueStore, NewWorkshop, StoreError, Workshop, WorkshopStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Drill(#[from] DrillError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No workshop is currently loaded")]
    NoCurrentWorkshop,
}

/// View toggles. Never persisted and never touch playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_arrows: bool,
    pub show_3d: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { show_arrows: true, show_3d: false }
    }
}

/// Serializable summary for front-ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub drill_id: Option<String>,
    pub drill_name: Option<String>,
    pub level_filter: LevelFilter,
    pub step_index: usize,
    pub passes: u64,
    pub playing: bool,
    pub difficulty: Option<Difficulty>,
    pub workshop: Option<String>,
    pub has_unsaved_changes: bool,
    pub display: DisplayOptions,
}

#[derive(Debug, Clone)]
pub struct Session {
    playback: PlaybackState,
    difficulties: Arc<DifficultyCatalog>,
    difficulty: Option<Difficulty>,
    rng: ChaCha8Rng,
    display: DisplayOptions,
    current_workshop: Option<Workshop>,
    has_unsaved_changes: bool,
}

/// The part of the session a workshop captures.
type Snapshot = (Option<usize>, Option<String>);

impl Session {
    pub fn new(drills: Arc<DrillCatalog>, difficulties: Arc<DifficultyCatalog>) -> Self {
        Self::with_rng(PlaybackState::new(drills), difficulties, ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(
        drills: Arc<DrillCatalog>,
        difficulties: Arc<DifficultyCatalog>,
        seed: u64,
    ) -> Self {
        Self::with_rng(PlaybackState::new(drills), difficulties, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_config(
        config: &SessionConfig,
        drills: Arc<DrillCatalog>,
        difficulties: Arc<DifficultyCatalog>,
    ) -> Self {
        let playback = PlaybackState::with_period(drills, config.tick_period());
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(playback, difficulties, rng)
    }

    /// Session over the built-in catalogs.
    pub fn builtin(config: &SessionConfig) -> Self {
        Self::from_config(config, DrillCatalog::builtin(), DifficultyCatalog::builtin())
    }

    fn with_rng(
        playback: PlaybackState,
        difficulties: Arc<DifficultyCatalog>,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            playback,
            difficulties,
            difficulty: None,
            rng,
            display: DisplayOptions::default(),
            current_workshop: None,
            has_unsaved_changes: false,
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn catalog(&self) -> &Arc<DrillCatalog> {
        self.playback.catalog()
    }

    pub fn difficulties(&self) -> &Arc<DifficultyCatalog> {
        &self.difficulties
    }

    pub fn current_drill(&self) -> Result<&Drill, DrillError> {
        self.playback.current_drill()
    }

    pub fn difficulty(&self) -> Option<&Difficulty> {
        self.difficulty.as_ref()
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn current_workshop(&self) -> Option<&Workshop> {
        self.current_workshop.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn status(&self) -> SessionStatus {
        let drill = self.playback.current_drill().ok();
        SessionStatus {
            drill_id: drill.map(|d| d.id.clone()),
            drill_name: drill.map(|d| d.name.clone()),
            level_filter: self.playback.level_filter(),
            step_index: self.playback.step_index(),
            passes: self.playback.lap_count(),
            playing: self.playback.is_playing(),
            difficulty: self.difficulty.clone(),
            workshop: self.current_workshop.as_ref().map(|w| w.name.clone()),
            has_unsaved_changes: self.has_unsaved_changes,
            display: self.display,
        }
    }

    // ========================
    // Selection (tracked)
    // ========================

    fn snapshot(&self) -> Snapshot {
        (self.playback.current_catalog_index(), self.difficulty.as_ref().map(|d| d.id.clone()))
    }

    fn note_change(&mut self, before: Snapshot) {
        if self.current_workshop.is_some() && self.snapshot() != before {
            self.has_unsaved_changes = true;
        }
    }

    pub fn select_drill(&mut self, index: usize) -> Result<&Drill, DrillError> {
        let before = self.snapshot();
        self.playback.select_drill(index)?;
        self.note_change(before);
        self.playback.current_drill()
    }

    pub fn select_level_filter(&mut self, filter: LevelFilter) -> usize {
        let before = self.snapshot();
        let count = self.playback.select_level_filter(filter);
        self.note_change(before);
        count
    }

    /// Throw the dice.
    pub fn roll_difficulty(&mut self) -> &Difficulty {
        let rolled = self.difficulties.roll(&mut self.rng).clone();
        log::debug!("rolled difficulty '{}'", rolled.id);

        let changed = self.difficulty.as_ref().map(|d| d.id.as_str()) != Some(rolled.id.as_str());
        if changed && self.current_workshop.is_some() {
            self.has_unsaved_changes = true;
        }
        self.difficulty.insert(rolled)
    }

    pub fn clear_difficulty(&mut self) {
        let before = self.snapshot();
        self.difficulty = None;
        self.note_change(before);
    }

    // ========================
    // Playback (untracked)
    // ========================

    pub fn play(&mut self) -> bool {
        self.playback.play()
    }

    pub fn pause(&mut self) -> bool {
        self.playback.pause()
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playback.toggle_playing()
    }

    pub fn tick(&mut self) -> Option<Tick> {
        self.playback.tick()
    }

    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.playback.advance(elapsed)
    }

    pub fn current_positions(&self) -> Result<Positions<'_>, DrillError> {
        self.playback.current_positions()
    }

    pub fn toggle_cue_tooltip(&mut self, keyword: &str) -> Result<Option<&Cue>, DrillError> {
        self.playback.toggle_cue_tooltip(keyword)
    }

    pub fn close_tooltip(&mut self) {
        self.playback.close_tooltip();
    }

    pub fn toggle_arrows(&mut self) -> bool {
        self.display.show_arrows = !self.display.show_arrows;
        self.display.show_arrows
    }

    pub fn toggle_3d(&mut self) -> bool {
        self.display.show_3d = !self.display.show_3d;
        self.display.show_3d
    }

    pub fn randomize_teams(&mut self, names: &str) -> Option<Teams> {
        teams::randomize(names, &mut self.rng)
    }

    // ========================
    // Workshops
    // ========================

    /// Create a workshop from the current drill and difficulty and make it
    /// the current one.
    pub fn save_as<S: KeyValueStore>(
        &mut self,
        store: &WorkshopStore<S>,
        name: &str,
    ) -> Result<&Workshop, SessionError> {
        let drill_index = self.catalog_index()?;
        let drill_id = self.playback.current_drill()?.id.clone();

        let new = NewWorkshop::new(name, drill_index, self.difficulty.clone()).with_drill_id(drill_id);
        let created = store.insert(new)?;

        self.has_unsaved_changes = false;
        Ok(self.current_workshop.insert(created))
    }

    /// Write the current drill and difficulty into the current workshop.
    pub fn save<S: KeyValueStore>(
        &mut self,
        store: &WorkshopStore<S>,
    ) -> Result<&Workshop, SessionError> {
        let mut workshop = self.current_workshop.clone().ok_or(SessionError::NoCurrentWorkshop)?;
        workshop.drill_index = self.catalog_index()?;
        workshop.drill_id = Some(self.playback.current_drill()?.id.clone());
        workshop.difficulty = self.difficulty.clone();

        let updated = store.update(&workshop)?;

        self.has_unsaved_changes = false;
        Ok(self.current_workshop.insert(updated))
    }

    /// Restore a workshop: its drill (re-resolved by id when the catalog
    /// moved it), its difficulty, step 0 and no passes.
    pub fn load(&mut self, workshop: &Workshop) -> Result<(), SessionError> {
        let index = self.resolve_drill_index(workshop);
        self.playback.select_catalog_index(index)?;

        self.difficulty = workshop.difficulty.clone();
        self.current_workshop = Some(workshop.clone());
        self.has_unsaved_changes = false;

        log::info!("Loaded workshop '{}' ({})", workshop.name, workshop.id);
        Ok(())
    }

    pub fn load_by_id<S: KeyValueStore>(
        &mut self,
        store: &WorkshopStore<S>,
        id: &str,
    ) -> Result<(), SessionError> {
        let workshop = store.get(id)?;
        self.load(&workshop)
    }

    /// Delete a stored workshop; deleting the current one detaches it.
    pub fn delete_workshop<S: KeyValueStore>(
        &mut self,
        store: &WorkshopStore<S>,
        id: &str,
    ) -> Result<(), SessionError> {
        store.delete(id)?;

        if self.current_workshop.as_ref().is_some_and(|w| w.id == id) {
            self.detach_workshop();
        }
        Ok(())
    }

    /// Keep the session as is but stop tracking it against a workshop.
    pub fn detach_workshop(&mut self) {
        self.current_workshop = None;
        self.has_unsaved_changes = false;
    }

    fn catalog_index(&self) -> Result<usize, DrillError> {
        self.playback.current_catalog_index().ok_or_else(|| {
            DrillError::out_of_range(
                self.playback.current_index().unwrap_or(0),
                self.playback.filtered_drills().len(),
            )
        })
    }

    fn resolve_drill_index(&self, workshop: &Workshop) -> usize {
        let catalog = self.playback.catalog();
        match workshop.drill_id.as_deref().and_then(|id| catalog.position_of(id)) {
            Some(position) => {
                if position != workshop.drill_index {
                    log::warn!(
                        "Workshop '{}': drill '{}' moved from index {} to {}",
                        workshop.name,
                        workshop.drill_id.as_deref().unwrap_or_default(),
                        workshop.drill_index,
                        position
                    );
                }
                position
            }
            None => {
                if let Some(id) = workshop.drill_id.as_deref() {
                    log::warn!(
                        "Workshop '{}': drill '{}' is no longer in the catalog, using index {}",
                        workshop.name,
                        id,
                        workshop.drill_index
                    );
                }
                workshop.drill_index
            }
        }
    }
}
