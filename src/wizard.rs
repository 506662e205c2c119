//! The cheating driver: it knows how far every cell is from the exit.

use itertools::Itertools;
use log::debug;

use crate::cells::CompassPrimary;
use crate::drivers::{DriverCore, RobotDriver};
use crate::errors::*;
use crate::robot::SENSING_ENERGY;

/// Added to the distance of a neighbour behind a wall, the price of jumping it.
pub const JUMP_PENALTY: u32 = 10;

/// Heads for the neighbour closest to the exit, jumping a wall when that still pays off.
#[derive(Default)]
pub struct Wizard {
    core: DriverCore,
}

/// What the wizard decided for one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub direction: CompassPrimary,
    pub blocked: bool,
}

impl Wizard {
    pub fn new() -> Wizard {
        Wizard { core: DriverCore::new() }
    }

    /// Score the four neighbours and pick the cheapest, first in North, East, South, West order
    /// on a tie. Neighbours off the grid score `u32::MAX`. The wall checks are refunded.
    pub fn plan(&mut self) -> Result<Plan> {
        let distance = match self.core.distance() {
            Some(distance) => distance.clone(),
            None => bail!("wizard has no distance field"),
        };
        let (position, heading) = {
            let robot = self.core.attached_robot()?;
            (robot.current_position()?, robot.current_direction())
        };

        let mut scores = [u32::MAX; 4];
        let mut blocked = [false; 4];
        for (i, direction) in CompassPrimary::ALL.iter().enumerate() {
            blocked[i] = self.core.wall_at(heading.relative_to(*direction))?;
            let neighbour = position.offset(*direction).and_then(|cell| distance.distance_to(cell));
            if let Some(steps) = neighbour {
                scores[i] = if blocked[i] { steps.saturating_add(JUMP_PENALTY) } else { steps };
            }
        }

        let robot = self.core.attached_robot()?;
        if !robot.has_stopped() {
            let refunded = robot.battery_level() + 4.0 * SENSING_ENERGY;
            robot.set_battery_level(refunded);
        }

        let best = scores.iter().position_min().unwrap_or(0);
        debug!("wizard at {:?} scores {:?}", position, scores);
        Ok(Plan {
            direction: CompassPrimary::ALL[best],
            blocked: blocked[best],
        })
    }

    /// Plan, face the chosen neighbour and get there.
    pub fn step(&mut self) -> Result<()> {
        self.core.begin_decision()?;
        if self.core.attached_robot()?.has_stopped() {
            bail!(ErrorKind::RobotStopped);
        }

        let plan = self.plan()?;
        let robot = self.core.attached_robot()?;
        if let Some(turn) = robot.current_direction().turn_towards(plan.direction) {
            robot.rotate(turn);
        }
        if plan.blocked {
            robot.jump()?;
        } else {
            robot.move_forward(1, false);
        }
        Ok(())
    }
}

impl RobotDriver for Wizard {
    fn core(&self) -> &DriverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DriverCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "wizard"
    }

    fn drive(&mut self) -> Result<()> {
        while !self.core.attached_robot()?.is_at_exit() {
            self.step()?;
        }
        Ok(())
    }
}
