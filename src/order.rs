//! A request for a maze and the slot the finished maze is delivered into.
//!
//! The factory's worker thread is the only writer: it raises the progress percentage and finally
//! delivers. Everyone else holds a clone of the order and reads.

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crate::errors::*;
use crate::maze::Maze;
use crate::units::SkillLevel;

pub const DELIVERED_PROGRESS: u8 = 100;

/// Which spanning tree algorithm carves the maze.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builder {
    Dfs,
    Prim,
    Eller,
}

impl FromStr for Builder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Builder> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" => Ok(Builder::Dfs),
            "prim" => Ok(Builder::Prim),
            "eller" => Ok(Builder::Eller),
            _ => bail!("unknown maze builder '{}'", s),
        }
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Builder::Dfs => "dfs",
            Builder::Prim => "prim",
            Builder::Eller => "eller",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
struct OrderState {
    skill: SkillLevel,
    builder: Builder,
    perfect: bool,
    seed: Option<u64>,
    progress: AtomicU8,
    maze: OnceLock<Arc<Maze>>,
}

/// Shared handle on one order. Clones see the same progress and the same delivery.
#[derive(Debug, Clone)]
pub struct BuildOrder {
    state: Arc<OrderState>,
}

impl BuildOrder {
    pub fn new(skill: SkillLevel, builder: Builder, perfect: bool) -> BuildOrder {
        BuildOrder::with_seed(skill, builder, perfect, None)
    }

    /// An order that always produces the same maze for the same seed.
    pub fn seeded(skill: SkillLevel, builder: Builder, perfect: bool, seed: u64) -> BuildOrder {
        BuildOrder::with_seed(skill, builder, perfect, Some(seed))
    }

    fn with_seed(skill: SkillLevel, builder: Builder, perfect: bool, seed: Option<u64>) -> BuildOrder {
        BuildOrder {
            state: Arc::new(OrderState {
                skill,
                builder,
                perfect,
                seed,
                progress: AtomicU8::new(0),
                maze: OnceLock::new(),
            }),
        }
    }

    #[inline]
    pub fn skill_level(&self) -> SkillLevel {
        self.state.skill
    }

    #[inline]
    pub fn builder(&self) -> Builder {
        self.state.builder
    }

    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.state.perfect
    }

    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.state.seed
    }

    /// Percentage done, never decreasing. 100 only once the maze can be collected.
    #[inline]
    pub fn progress(&self) -> u8 {
        self.state.progress.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.progress() == DELIVERED_PROGRESS
    }

    /// The delivered maze, None until progress reaches 100.
    pub fn maze(&self) -> Option<Arc<Maze>> {
        if self.is_delivered() {
            self.state.maze.get().cloned()
        } else {
            None
        }
    }

    /// Raise progress. Lower values than already reported are ignored and 100 is reserved for
    /// delivery.
    pub(crate) fn update_progress(&self, percent: u8) {
        let capped = percent.min(DELIVERED_PROGRESS - 1);
        let _ = self.state.progress.fetch_max(capped, Ordering::AcqRel);
    }

    /// Hand over the maze. Only the first delivery counts.
    pub(crate) fn deliver(&self, maze: Maze) -> bool {
        if self.state.maze.set(Arc::new(maze)).is_err() {
            return false;
        }
        self.state.progress.store(DELIVERED_PROGRESS, Ordering::Release);
        true
    }
}
