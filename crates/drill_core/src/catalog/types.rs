//! Drill data model
//!
//! All coordinates are percentages of the pitch container, x and y in [0, 100].

use crate::error::{DrillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Highest level a drill may be classified with.
pub const MAX_LEVEL: u8 = 5;

/// A point in percentage space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shirt label of a player. Either a plain number or free text ("D1", "GK").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerNumber {
    Numeric(u32),
    Label(String),
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayerNumber::Numeric(n) => write!(f, "{}", n),
            PlayerNumber::Label(label) => write!(f, "{}", label),
        }
    }
}

/// A player inside one frame of a drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(flatten)]
    pub position: Point,
    /// Free-form squad tag ("A", "B", "neutral", ...)
    pub team: String,
    pub number: PlayerNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Cone,
    Goal,
    #[default]
    Generic,
}

/// Static marker on the pitch. Obstacles never move during playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(flatten)]
    pub position: Point,
    #[serde(default)]
    pub kind: ObstacleKind,
}

/// Coaching cue shown in a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub keyword: String,
    pub description: String,
}

/// Level filter applied to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelFilter {
    #[default]
    All,
    Level(u8),
}

impl LevelFilter {
    /// Drills without a level only pass the `All` filter.
    pub fn matches(&self, drill: &Drill) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Level(level) => drill.level == Some(*level),
        }
    }
}

impl From<Option<u8>> for LevelFilter {
    fn from(level: Option<u8>) -> Self {
        level.map(LevelFilter::Level).unwrap_or(LevelFilter::All)
    }
}

/// A training drill as authored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_description: Option<String>,
    /// 1..=5, `None` means unclassified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Planned length of the drill in the session plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Waypoints of the main ball, traversed cyclically
    pub path: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_balls: Option<Vec<Vec<Point>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Vec<Player>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

/// Everything visible on the pitch at one step of a drill.
#[derive(Debug, Clone, PartialEq)]
pub struct Positions<'a> {
    pub step_index: usize,
    /// One point for single-ball drills, the whole frame otherwise
    pub balls: &'a [Point],
    /// Empty when the drill has no player frames
    pub players: &'a [Player],
    pub obstacles: &'a [Obstacle],
}

impl Drill {
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub fn cue(&self, keyword: &str) -> Option<&Cue> {
        self.cues.iter().find(|c| c.keyword == keyword)
    }

    /// Project the drill onto one step.
    pub fn positions_at(&self, step_index: usize) -> Result<Positions<'_>> {
        self.check_frames()?;

        let balls = match &self.multiple_balls {
            Some(frames) => frames
                .get(step_index)
                .map(|frame| frame.as_slice())
                .ok_or_else(|| DrillError::out_of_range(step_index, frames.len()))?,
            None => self
                .path
                .get(step_index)
                .map(std::slice::from_ref)
                .ok_or_else(|| DrillError::out_of_range(step_index, self.path.len()))?,
        };

        let players = match &self.players {
            Some(frames) => frames
                .get(step_index)
                .map(|frame| frame.as_slice())
                .ok_or_else(|| DrillError::out_of_range(step_index, frames.len()))?,
            None => &[],
        };

        Ok(Positions { step_index, balls, players, obstacles: &self.obstacles })
    }

    /// Frame arrays must have one entry per path step.
    pub fn check_frames(&self) -> Result<()> {
        let path_len = self.path.len();

        if let Some(frames) = &self.multiple_balls {
            if frames.len() != path_len {
                return Err(DrillError::InvalidState(format!(
                    "drill '{}': multipleBalls has {} frames, path has {} points",
                    self.id,
                    frames.len(),
                    path_len
                )));
            }
        }

        if let Some(frames) = &self.players {
            if frames.len() != path_len {
                return Err(DrillError::InvalidState(format!(
                    "drill '{}': players has {} frames, path has {} points",
                    self.id,
                    frames.len(),
                    path_len
                )));
            }
        }

        Ok(())
    }

    /// Structural checks applied when a catalog is built.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(DrillError::InvalidState(format!("drill '{}': empty path", self.id)));
        }

        if let Some(level) = self.level {
            if level == 0 || level > MAX_LEVEL {
                return Err(DrillError::InvalidState(format!(
                    "drill '{}': level {} outside 1..={}",
                    self.id, level, MAX_LEVEL
                )));
            }
        }

        self.check_frames()?;

        let mut keywords = HashSet::new();
        for cue in &self.cues {
            if !keywords.insert(cue.keyword.as_str()) {
                return Err(DrillError::InvalidState(format!(
                    "drill '{}': duplicate cue keyword '{}'",
                    self.id, cue.keyword
                )));
            }
        }

        Ok(())
    }
}
