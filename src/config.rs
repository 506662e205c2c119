//! Skill level policy: how big a maze is and how far it strays from a perfect maze.

use lazy_static::lazy_static;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::*;
use crate::units::{Height, SkillLevel, Width};

const LEVELS_COUNT: usize = SkillLevel::MAX as usize + 1;

const SKILL_X: [usize; LEVELS_COUNT] = [4, 12, 15, 20, 25, 25, 35, 35, 40, 60, 70, 80, 90, 110, 120, 150];
const SKILL_Y: [usize; LEVELS_COUNT] = [4, 12, 15, 15, 20, 25, 25, 35, 35, 40, 60, 70, 75, 75, 90, 120];
const SKILL_ROOMS: [usize; LEVELS_COUNT] = [0, 2, 2, 3, 4, 4, 5, 10, 10, 20, 25, 25, 30, 30, 40, 50];
const SKILL_LOOP_PERCENT: [u8; LEVELS_COUNT] = [0, 2, 2, 3, 3, 4, 4, 5, 5, 5, 6, 6, 7, 7, 8, 8];

/// Policy for one skill level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPolicy {
    pub width: usize,
    pub height: usize,
    /// Upper bound on rooms carved into an imperfect maze.
    pub rooms: usize,
    /// Percentage of the walls left after carving that come down in an imperfect maze.
    pub loop_percent: u8,
}

impl SkillPolicy {
    #[inline]
    pub fn dimensions(&self) -> (Width, Height) {
        (Width(self.width), Height(self.height))
    }
}

/// One policy per skill level, 0 to 15.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTable {
    pub levels: Vec<SkillPolicy>,
}

lazy_static! {
    pub static ref DEFAULT_SKILL_TABLE: SkillTable = SkillTable {
        levels: (0..LEVELS_COUNT)
            .map(|level| SkillPolicy {
                width: SKILL_X[level],
                height: SKILL_Y[level],
                rooms: SKILL_ROOMS[level],
                loop_percent: SKILL_LOOP_PERCENT[level],
            })
            .collect(),
    };
}

impl Default for SkillTable {
    fn default() -> SkillTable {
        DEFAULT_SKILL_TABLE.clone()
    }
}

impl SkillTable {
    pub fn from_json_str(json: &str) -> Result<SkillTable> {
        let table: SkillTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<SkillTable> {
        let path = path.as_ref();
        let file = File::open(path)
            .chain_err(|| format!("unable to open skill table {}", path.display()))?;
        let table: SkillTable = serde_json::from_reader(BufReader::new(file))
            .chain_err(|| format!("unable to parse skill table {}", path.display()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Exactly one policy per skill level, none with an empty grid.
    pub fn validate(&self) -> Result<()> {
        if self.levels.len() != LEVELS_COUNT {
            bail!("skill table has {} levels, expected {}",
                  self.levels.len(),
                  LEVELS_COUNT);
        }
        if let Some(policy) = self.levels.iter().find(|policy| policy.width == 0 || policy.height == 0) {
            bail!(ErrorKind::InvalidDimensions(policy.width, policy.height));
        }
        Ok(())
    }

    #[inline]
    pub fn policy(&self, skill: SkillLevel) -> Result<&SkillPolicy> {
        self.levels
            .get(skill.level() as usize)
            .ok_or_else(|| ErrorKind::InvalidSkillLevel(skill.level()).into())
    }
}
