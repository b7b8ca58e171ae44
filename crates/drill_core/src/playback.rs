//! Drill Playback State
//!
//! Projects the session clock's step index onto the selected drill and owns
//! drill / level-filter selection and the cue tooltip.

use crate::catalog::{Cue, Drill, DrillCatalog, LevelFilter, Positions};
use crate::clock::{SessionClock, Tick, TICK_PERIOD};
use crate::error::{DrillError, Result};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PlaybackState {
    catalog: Arc<DrillCatalog>,
    filter: LevelFilter,
    /// Catalog indices passing `filter`
    filtered: Vec<usize>,
    /// Position inside `filtered`
    current: usize,
    clock: SessionClock,
    /// Index of the shown cue in the current drill
    tooltip: Option<usize>,
}

impl PlaybackState {
    pub fn new(catalog: Arc<DrillCatalog>) -> Self {
        Self::with_period(catalog, TICK_PERIOD)
    }

    pub fn with_period(catalog: Arc<DrillCatalog>, period: Duration) -> Self {
        let filtered = catalog.filter_indices(LevelFilter::All);
        let path_len = catalog.list().first().map(Drill::path_len).unwrap_or(1);
        Self {
            catalog,
            filter: LevelFilter::All,
            filtered,
            current: 0,
            clock: SessionClock::with_period(non_zero(path_len), period),
            tooltip: None,
        }
    }

    pub fn catalog(&self) -> &Arc<DrillCatalog> {
        &self.catalog
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.filter
    }

    /// Drills of the active filter, in catalog order.
    pub fn filtered_drills(&self) -> Vec<&Drill> {
        self.filtered.iter().filter_map(|&idx| self.catalog.list().get(idx)).collect()
    }

    /// Index of the current drill within the filtered set.
    pub fn current_index(&self) -> Option<usize> {
        (self.current < self.filtered.len()).then_some(self.current)
    }

    /// Index of the current drill in the full catalog.
    pub fn current_catalog_index(&self) -> Option<usize> {
        self.filtered.get(self.current).copied()
    }

    pub fn current_drill(&self) -> Result<&Drill> {
        let idx = self
            .current_catalog_index()
            .ok_or_else(|| DrillError::out_of_range(self.current, self.filtered.len()))?;
        self.catalog.get(idx)
    }

    /// Switch the active subset. The first drill of the subset becomes
    /// current; an empty subset leaves no current drill until the caller
    /// picks another filter. Returns the subset size.
    pub fn select_level_filter(&mut self, filter: LevelFilter) -> usize {
        self.filter = filter;
        self.filtered = self.catalog.filter_indices(filter);
        self.current = 0;
        self.reset_playback();

        log::debug!("level filter {:?}: {} drills", filter, self.filtered.len());
        self.filtered.len()
    }

    pub fn select_drill(&mut self, index: usize) -> Result<&Drill> {
        if index >= self.filtered.len() {
            return Err(DrillError::out_of_range(index, self.filtered.len()));
        }
        self.current = index;
        self.reset_playback();

        let drill = self.current_drill()?;
        log::debug!("selected drill '{}'", drill.id);
        Ok(drill)
    }

    /// Select by full-catalog index, clearing the level filter.
    pub fn select_catalog_index(&mut self, index: usize) -> Result<&Drill> {
        self.catalog.get(index)?;

        self.filter = LevelFilter::All;
        self.filtered = self.catalog.filter_indices(LevelFilter::All);
        self.current = index;
        self.reset_playback();

        self.current_drill()
    }

    /// Step 0, no laps, no tooltip. The clock keeps its running state.
    fn reset_playback(&mut self) {
        let path_len = self.current_drill().map(Drill::path_len).unwrap_or(1);
        self.clock.reset(non_zero(path_len));
        self.clock.reset_laps();
        self.tooltip = None;
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn step_index(&self) -> usize {
        self.clock.step_index()
    }

    /// Completed traversals of the current drill's path ("passes").
    pub fn lap_count(&self) -> u64 {
        self.clock.lap_count()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    pub fn play(&mut self) -> bool {
        self.clock.start()
    }

    pub fn pause(&mut self) -> bool {
        self.clock.stop()
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.clock.toggle()
    }

    pub fn tick(&mut self) -> Option<Tick> {
        self.clock.tick()
    }

    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.clock.advance(elapsed)
    }

    pub fn set_period(&mut self, period: Duration) {
        self.clock.set_period(period);
    }

    /// Ball(s), players and obstacles at the current step.
    pub fn current_positions(&self) -> Result<Positions<'_>> {
        self.current_drill()?.positions_at(self.clock.step_index())
    }

    pub fn tooltip(&self) -> Option<&Cue> {
        let idx = self.tooltip?;
        self.current_drill().ok()?.cues.get(idx)
    }

    /// Show the cue for `keyword`, or hide it if it is already shown.
    pub fn toggle_cue_tooltip(&mut self, keyword: &str) -> Result<Option<&Cue>> {
        let idx = self
            .current_drill()?
            .cues
            .iter()
            .position(|c| c.keyword == keyword)
            .ok_or_else(|| DrillError::NotFound(format!("cue '{}'", keyword)))?;

        if self.tooltip == Some(idx) {
            self.tooltip = None;
        } else {
            self.tooltip = Some(idx);
        }
        Ok(self.tooltip())
    }

    pub fn close_tooltip(&mut self) {
        self.tooltip = None;
    }
}

fn non_zero(len: usize) -> NonZeroUsize {
    NonZeroUsize::new(len).unwrap_or(NonZeroUsize::MIN)
}
