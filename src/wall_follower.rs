//! Left hand on the wall until the exit shows up.

use log::debug;

use crate::cells::{RelativeDirection, Turn};
use crate::drivers::{DriverCore, RobotDriver};
use crate::errors::*;

/// Keeps a wall on its left. Broken sensors are stood in for by turning another one the wanted
/// way.
#[derive(Default)]
pub struct WallFollower {
    core: DriverCore,
}

impl WallFollower {
    pub fn new() -> WallFollower {
        WallFollower { core: DriverCore::new() }
    }

    /// A robot in the middle of a room has nothing to follow. Walk ahead until a wall is
    /// directly in front, then turn so it is on the left.
    fn leave_open_space(&mut self) -> Result<()> {
        let in_room = {
            let robot = self.core.attached_robot()?;
            robot.has_room_sensor() && robot.is_inside_room()?
        };
        if !in_room || !self.no_walls_around()? {
            return Ok(());
        }

        debug!("wall follower starts in open space");
        loop {
            self.core.begin_decision()?;
            let robot = self.core.attached_robot()?;
            if robot.is_at_exit() {
                return Ok(());
            }
            if robot.has_stopped() {
                bail!(ErrorKind::RobotStopped);
            }
            if self.core.wall_at(RelativeDirection::Forward)? {
                break;
            }
            self.core.attached_robot()?.move_forward(1, false);
        }
        self.core.attached_robot()?.rotate(Turn::Right);
        Ok(())
    }

    fn no_walls_around(&mut self) -> Result<bool> {
        for direction in RelativeDirection::ALL.iter() {
            if self.core.wall_at(*direction)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// One step of the left hand rule.
    pub fn step(&mut self) -> Result<()> {
        self.core.begin_decision()?;
        if self.core.attached_robot()?.has_stopped() {
            bail!(ErrorKind::RobotStopped);
        }

        if self.core.wall_at(RelativeDirection::Left)? {
            if self.core.wall_at(RelativeDirection::Forward)? {
                self.core.attached_robot()?.rotate(Turn::Right);
            } else {
                self.core.attached_robot()?.move_forward(1, false);
            }
        } else {
            let robot = self.core.attached_robot()?;
            robot.rotate(Turn::Left);
            robot.move_forward(1, false);
        }
        Ok(())
    }
}

impl RobotDriver for WallFollower {
    fn core(&self) -> &DriverCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DriverCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "wall follower"
    }

    fn drive(&mut self) -> Result<()> {
        self.leave_open_space()?;
        while !self.core.attached_robot()?.is_at_exit() {
            self.step()?;
        }
        Ok(())
    }
}
