//! The simulated robot: where it is, which way it faces, how much battery is left and which of
//! its sensors work.
//!
//! Every sensor read and every actuator call is paid for from the battery. Running out of energy
//! is not an error; the robot just stops, for good. Errors are kept for calls that are wrong in
//! themselves: reading a broken sensor, jumping out of the maze, asking for a position off the
//! grid.

use log::{debug, warn};
use std::sync::Arc;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, RelativeDirection, Turn, Wallboard};
use crate::errors::*;
use crate::maze::Maze;

pub const SENSING_ENERGY: f32 = 1.0;
pub const QUARTER_TURN_ENERGY: f32 = 3.0;
pub const MOVE_FORWARD_ENERGY: f32 = 5.0;
pub const JUMP_WALL_ENERGY: f32 = 50.0;
pub const INITIAL_BATTERY: f32 = 3000.0;

#[derive(Debug, Clone)]
pub struct Robot {
    maze: Arc<Maze>,
    position: Cartesian2DCoordinate,
    direction: CompassPrimary,
    battery: f32,
    odometer: u32,
    installed: [bool; 4],
    operational: [bool; 4],
    room_sensor: bool,
    stopped: bool,
}

impl Robot {
    /// A fully equipped robot at the maze's start, full battery.
    pub fn new(maze: Arc<Maze>) -> Robot {
        Robot::with_sensors(maze, &RelativeDirection::ALL, true)
    }

    /// A robot carrying distance sensors for `sensors` only.
    pub fn with_sensors(maze: Arc<Maze>, sensors: &[RelativeDirection], room_sensor: bool) -> Robot {
        let mut installed = [false; 4];
        for sensor in sensors {
            installed[sensor.index()] = true;
        }
        Robot {
            position: maze.start(),
            direction: maze.start_direction(),
            maze,
            battery: INITIAL_BATTERY,
            odometer: 0,
            installed,
            operational: installed,
            room_sensor,
            stopped: false,
        }
    }

    #[inline]
    pub fn maze(&self) -> &Arc<Maze> {
        &self.maze
    }

    pub fn current_position(&self) -> Result<Cartesian2DCoordinate> {
        if self.maze.grid().is_valid_coordinate(self.position) {
            Ok(self.position)
        } else {
            bail!(ErrorKind::InvalidPosition(self.position.x, self.position.y))
        }
    }

    /// Teleport, mostly for setting up scenarios. Not checked against the grid.
    pub fn set_current_position(&mut self, position: Cartesian2DCoordinate) {
        self.position = position;
    }

    #[inline]
    pub fn current_direction(&self) -> CompassPrimary {
        self.direction
    }

    pub fn set_current_direction(&mut self, direction: CompassPrimary) {
        self.direction = direction;
    }

    #[inline]
    pub fn battery_level(&self) -> f32 {
        self.battery
    }

    pub fn set_battery_level(&mut self, level: f32) {
        self.battery = level;
    }

    #[inline]
    pub fn odometer_reading(&self) -> u32 {
        self.odometer
    }

    pub fn reset_odometer(&mut self) {
        self.odometer = 0;
    }

    pub fn energy_for_full_rotation(&self) -> f32 {
        4.0 * QUARTER_TURN_ENERGY
    }

    pub fn energy_for_step_forward(&self) -> f32 {
        MOVE_FORWARD_ENERGY
    }

    /// Stopped robots ignore every further command. Once stopped, always stopped.
    #[inline]
    pub fn has_stopped(&self) -> bool {
        self.stopped || self.battery <= 0.0
    }

    #[inline]
    pub fn has_room_sensor(&self) -> bool {
        self.room_sensor
    }

    pub fn set_room_sensor(&mut self, room_sensor: bool) {
        self.room_sensor = room_sensor;
    }

    #[inline]
    pub fn has_operational_sensor(&self, direction: RelativeDirection) -> bool {
        self.operational[direction.index()]
    }

    #[inline]
    pub fn has_sensor(&self, direction: RelativeDirection) -> bool {
        self.installed[direction.index()]
    }

    pub fn trigger_sensor_failure(&mut self, direction: RelativeDirection) {
        if self.operational[direction.index()] {
            debug!("{:?} sensor failed", direction);
        }
        self.operational[direction.index()] = false;
    }

    /// Returns false only when the robot never had that sensor.
    pub fn repair_sensor(&mut self, direction: RelativeDirection) -> bool {
        if !self.installed[direction.index()] {
            return false;
        }
        self.operational[direction.index()] = true;
        true
    }

    /// Free of charge.
    pub fn is_at_exit(&self) -> bool {
        self.maze.grid().is_exit_position(self.position)
    }

    /// Steps that can be taken in `direction` before hitting a wall, None if the robot can see
    /// out through the exit that way.
    pub fn distance_to_obstacle(&mut self, direction: RelativeDirection) -> Result<Option<u32>> {
        self.require_sensor(direction)?;
        let position = self.current_position()?;
        if !self.consume(SENSING_ENERGY) {
            return Ok(Some(0));
        }
        Ok(self.scan(position, self.direction.towards(direction)))
    }

    pub fn can_see_through_exit(&mut self, direction: RelativeDirection) -> Result<bool> {
        self.require_sensor(direction)?;
        let position = self.current_position()?;
        if !self.consume(SENSING_ENERGY) {
            return Ok(false);
        }
        Ok(self.scan(position, self.direction.towards(direction)).is_none())
    }

    pub fn is_inside_room(&mut self) -> Result<bool> {
        if !self.room_sensor {
            bail!(ErrorKind::MissingRoomSensor);
        }
        let position = self.current_position()?;
        if !self.consume(SENSING_ENERGY) {
            return Ok(false);
        }
        Ok(self.maze.grid().is_in_room(position))
    }

    /// Turn on the spot. Nothing happens without the energy for the whole turn.
    pub fn rotate(&mut self, turn: Turn) {
        let cost = QUARTER_TURN_ENERGY * turn.quarter_turns() as f32;
        if self.consume(cost) {
            self.direction = self.direction.turned(turn);
        }
    }

    /// Walk up to `distance` cells straight ahead.
    ///
    /// Bumping into a wall ends the walk. A manual walk just halts there, an automatic one is a
    /// navigation failure and stops the robot. Walking out through the exit halts on the exit
    /// cell.
    pub fn move_forward(&mut self, distance: u32, manual: bool) {
        for _ in 0..distance {
            if self.has_stopped() {
                return;
            }
            if self.battery < MOVE_FORWARD_ENERGY {
                self.stop("battery too low to move");
                return;
            }

            let facing = Wallboard { cell: self.position, direction: self.direction };
            if self.maze.grid().exit_wallboard() == Some(facing) {
                return;
            }
            if self.maze.grid().has_wall(self.position, self.direction) {
                if !manual {
                    self.stop("walked into a wall");
                }
                return;
            }

            if let Some(next) = self.maze.grid().neighbour_at_direction(self.position, self.direction) {
                if self.consume(MOVE_FORWARD_ENERGY) {
                    self.position = next;
                    self.odometer += 1;
                }
            }
        }
    }

    /// Hop over the wallboard ahead, whether it is there or not.
    pub fn jump(&mut self) -> Result<()> {
        if self.has_stopped() {
            return Ok(());
        }
        if self.battery < JUMP_WALL_ENERGY {
            self.stop("battery too low to jump");
            return Ok(());
        }
        let position = self.current_position()?;
        let target = match self.maze.grid().neighbour_at_direction(position, self.direction) {
            Some(target) => target,
            None => {
                self.stop("jumped at an exterior wall");
                bail!(ErrorKind::ExteriorJump);
            }
        };
        if self.consume(JUMP_WALL_ENERGY) {
            self.position = target;
            self.odometer += 1;
        }
        Ok(())
    }

    fn require_sensor(&self, direction: RelativeDirection) -> Result<()> {
        if self.has_operational_sensor(direction) {
            Ok(())
        } else {
            bail!(ErrorKind::UnsupportedSensor(direction))
        }
    }

    /// Pay for an action. A robot that cannot afford it stops instead.
    fn consume(&mut self, cost: f32) -> bool {
        if self.has_stopped() {
            return false;
        }
        if self.battery < cost {
            self.stop("battery exhausted");
            return false;
        }
        self.battery -= cost;
        if self.battery <= 0.0 {
            self.stop("battery exhausted");
        }
        true
    }

    fn stop(&mut self, reason: &str) {
        if !self.stopped {
            warn!("robot stopped at {:?}: {}", self.position, reason);
        }
        self.stopped = true;
    }

    /// Free cells ahead in absolute direction `direction`, None when the line of sight leaves the
    /// maze through the exit.
    fn scan(&self, from: Cartesian2DCoordinate, direction: CompassPrimary) -> Option<u32> {
        let grid = self.maze.grid();
        let mut steps = 0;
        let mut cell = from;
        loop {
            if grid.has_wall(cell, direction) {
                return Some(steps);
            }
            match grid.neighbour_at_direction(cell, direction) {
                Some(next) => {
                    cell = next;
                    steps += 1;
                }
                None => return None,
            }
        }
    }
}
