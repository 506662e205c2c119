use crate::errors::*;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Width(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Height(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RowIndex(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ColumnIndex(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct NodesCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct EdgesCount(pub usize);

/// Maze difficulty, 0 (tiny) to 15 (huge).
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, Hash)]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const MAX: u8 = 15;

    pub fn new(level: u8) -> Result<SkillLevel> {
        if level <= SkillLevel::MAX {
            Ok(SkillLevel(level))
        } else {
            bail!(ErrorKind::InvalidSkillLevel(level))
        }
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.0
    }
}
