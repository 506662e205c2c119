//! What every robot driver shares: the robot it steers, the distance field it may consult, its
//! beliefs about which sensors work, and the queue sensor faults arrive on.

use log::{info, warn};
use std::sync::Arc;

use crate::cells::{RelativeDirection, Turn};
use crate::errors::*;
use crate::pathing::Distances;
use crate::robot::Robot;
use crate::sensors::{SensorCommand, SensorFaults};

pub struct DriverCore {
    robot: Option<Robot>,
    distance: Option<Arc<Distances>>,
    beliefs: [bool; 4],
    starting_battery: f32,
    faults: SensorFaults,
    commands: flume::Receiver<SensorCommand>,
}

impl Default for DriverCore {
    fn default() -> DriverCore {
        DriverCore::new()
    }
}

impl DriverCore {
    pub fn new() -> DriverCore {
        let (faults, commands) = SensorFaults::channel();
        DriverCore {
            robot: None,
            distance: None,
            beliefs: [true; 4],
            starting_battery: 0.0,
            faults,
            commands,
        }
    }

    /// Take charge of a robot. Its battery level now is the baseline for energy consumption.
    /// Without an explicit distance field the maze's own is used.
    pub fn set_robot(&mut self, robot: Robot) {
        self.starting_battery = robot.battery_level();
        if self.distance.is_none() {
            self.distance = Some(Arc::new(robot.maze().distances().clone()));
        }
        self.robot = Some(robot);
        self.refresh_beliefs();
    }

    #[inline]
    pub fn robot(&self) -> Option<&Robot> {
        self.robot.as_ref()
    }

    #[inline]
    pub fn robot_mut(&mut self) -> Option<&mut Robot> {
        self.robot.as_mut()
    }

    pub fn attached_robot(&mut self) -> Result<&mut Robot> {
        match self.robot.as_mut() {
            Some(robot) => Ok(robot),
            None => bail!("no robot attached to the driver"),
        }
    }

    pub fn set_distance(&mut self, distance: Arc<Distances>) {
        self.distance = Some(distance);
    }

    #[inline]
    pub fn distance(&self) -> Option<&Arc<Distances>> {
        self.distance.as_ref()
    }

    /// Believe whatever the robot says about its sensors right now.
    pub fn refresh_beliefs(&mut self) {
        if let Some(robot) = self.robot.as_ref() {
            for direction in RelativeDirection::ALL.iter() {
                self.beliefs[direction.index()] = robot.has_operational_sensor(*direction);
            }
        }
    }

    #[inline]
    pub fn sensor_beliefs(&self) -> [bool; 4] {
        self.beliefs
    }

    pub fn set_sensor_belief(&mut self, direction: RelativeDirection, operational: bool) {
        self.beliefs[direction.index()] = operational;
    }

    #[inline]
    pub fn sensor_channel(&self) -> SensorFaults {
        self.faults.clone()
    }

    /// Apply every queued sensor command to the robot and refresh the beliefs. Called before
    /// each decision so nothing changes while one is being made.
    pub fn begin_decision(&mut self) -> Result<()> {
        let commands = self.commands.try_iter().collect::<Vec<_>>();
        let robot = self.attached_robot()?;
        for command in commands {
            if !command.apply(robot) {
                warn!("{:?} ignored, the robot has no such sensor", command);
            }
        }
        self.refresh_beliefs();
        Ok(())
    }

    /// Distance to the obstacle in `wanted` direction.
    ///
    /// Reads the wanted sensor if it is believed to work. Otherwise the robot turns so another
    /// working sensor points the wanted way, reads it and turns back. Sideways sensors are
    /// preferred to the opposite one since that needs an about turn each way.
    pub fn sense(&mut self, wanted: RelativeDirection) -> Result<Option<u32>> {
        let candidates = std::iter::once(wanted)
            .chain(RelativeDirection::ALL
                .iter()
                .cloned()
                .filter(|dir| *dir != wanted && *dir != wanted.opposite()))
            .chain(std::iter::once(wanted.opposite()));

        let mut substitute = None;
        for candidate in candidates {
            if self.beliefs[candidate.index()] {
                substitute = Some(candidate);
                break;
            }
        }
        let held = match substitute {
            Some(held) => held,
            None => bail!(ErrorKind::UnsupportedSensor(wanted)),
        };

        let robot = self.attached_robot()?;
        let turn = Turn::clockwise(4 + wanted.quarter_turns() - held.quarter_turns());
        if let Some(turn) = turn {
            robot.rotate(turn);
        }
        let reading = robot.distance_to_obstacle(held);
        if let Some(turn) = turn {
            robot.rotate(turn.reversed());
        }
        reading
    }

    /// Is there a wallboard right next to the robot in `wanted` direction?
    pub fn wall_at(&mut self, wanted: RelativeDirection) -> Result<bool> {
        Ok(self.sense(wanted)? == Some(0))
    }

    pub fn energy_consumption(&self) -> f32 {
        self.robot.as_ref().map_or(0.0, |robot| self.starting_battery - robot.battery_level())
    }

    pub fn path_length(&self) -> u32 {
        self.robot.as_ref().map_or(0, |robot| robot.odometer_reading())
    }
}

/// A strategy that steers a robot to the exit.
///
/// Implementors provide `drive`, the decision loop, and access to their `DriverCore`; everything
/// else comes with the trait.
pub trait RobotDriver {
    fn core(&self) -> &DriverCore;

    fn core_mut(&mut self) -> &mut DriverCore;

    /// Run until the robot is at the exit. Any error, or the robot stopping, ends the drive.
    fn drive(&mut self) -> Result<()>;

    fn name(&self) -> &'static str;

    fn set_robot(&mut self, robot: Robot) {
        self.core_mut().set_robot(robot)
    }

    fn robot(&self) -> Option<&Robot> {
        self.core().robot()
    }

    fn robot_mut(&mut self) -> Option<&mut Robot> {
        self.core_mut().robot_mut()
    }

    fn set_distance(&mut self, distance: Arc<Distances>) {
        self.core_mut().set_distance(distance)
    }

    fn distance(&self) -> Option<&Arc<Distances>> {
        self.core().distance()
    }

    fn trigger_update_sensor_information(&mut self) {
        self.core_mut().refresh_beliefs()
    }

    fn sensor_beliefs(&self) -> [bool; 4] {
        self.core().sensor_beliefs()
    }

    fn set_sensor_belief(&mut self, direction: RelativeDirection, operational: bool) {
        self.core_mut().set_sensor_belief(direction, operational)
    }

    fn sensor_channel(&self) -> SensorFaults {
        self.core().sensor_channel()
    }

    /// Drive to the exit. Every failure surfaces as `RobotStopped` with the cause chained under
    /// it.
    fn drive_to_exit(&mut self) -> Result<bool> {
        match self.drive() {
            Ok(()) => {
                info!("{} reached the exit: energy {}, path length {}",
                      self.name(),
                      self.energy_consumption(),
                      self.path_length());
                Ok(true)
            }
            Err(err) => {
                warn!("{} failed: {}", self.name(), err);
                if let ErrorKind::RobotStopped = *err.kind() {
                    return Err(err);
                }
                Err(err).chain_err(|| ErrorKind::RobotStopped)
            }
        }
    }

    fn energy_consumption(&self) -> f32 {
        self.core().energy_consumption()
    }

    fn path_length(&self) -> u32 {
        self.core().path_length()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::{CompassPrimary, RelativeDirection::*};
    use crate::maze::fixtures;
    use crate::robot::{INITIAL_BATTERY, QUARTER_TURN_ENERGY, SENSING_ENERGY};

    fn core_in_corridor() -> DriverCore {
        let mut core = DriverCore::new();
        core.set_robot(Robot::new(fixtures::corridor(4)));
        core
    }

    #[test]
    fn beliefs_follow_the_robot_only_when_refreshed() {
        let mut core = core_in_corridor();
        assert_eq!(core.sensor_beliefs(), [true; 4]);
        core.robot_mut().unwrap().trigger_sensor_failure(Right);
        assert_eq!(core.sensor_beliefs(), [true; 4]);
        core.refresh_beliefs();
        assert_eq!(core.sensor_beliefs(), [true, false, true, true]);
    }

    #[test]
    fn queued_faults_apply_at_the_next_decision() {
        let mut core = core_in_corridor();
        let faults = core.sensor_channel();
        assert!(faults.fail_now(Forward));
        assert!(core.robot().unwrap().has_operational_sensor(Forward));

        core.begin_decision().unwrap();
        assert!(!core.robot().unwrap().has_operational_sensor(Forward));
        assert!(!core.sensor_beliefs()[Forward.index()]);

        assert!(faults.repair_now(Forward));
        core.begin_decision().unwrap();
        assert!(core.sensor_beliefs()[Forward.index()]);
    }

    #[test]
    fn direct_sensing_costs_one() {
        let mut core = core_in_corridor();
        assert_eq!(core.sense(Forward).unwrap(), None);
        assert!(core.wall_at(Left).unwrap());
        assert_eq!(core.energy_consumption(), 2.0 * SENSING_ENERGY);
    }

    #[test]
    fn substitute_sensing_turns_there_and_back() {
        let mut core = core_in_corridor();
        core.robot_mut().unwrap().trigger_sensor_failure(Forward);
        core.refresh_beliefs();

        // Left sensor pointed forward by a right turn.
        assert_eq!(core.sense(Forward).unwrap(), None);
        let robot = core.robot().unwrap();
        assert_eq!(robot.current_direction(), CompassPrimary::East);
        assert_eq!(INITIAL_BATTERY - robot.battery_level(),
                   2.0 * QUARTER_TURN_ENERGY + SENSING_ENERGY);
    }

    #[test]
    fn opposite_sensor_is_the_last_resort() {
        let mut core = core_in_corridor();
        for dir in &[Forward, Left, Right] {
            core.robot_mut().unwrap().trigger_sensor_failure(*dir);
        }
        core.refresh_beliefs();
        assert_eq!(core.sense(Forward).unwrap(), None);
        assert_eq!(core.energy_consumption(), 4.0 * QUARTER_TURN_ENERGY + SENSING_ENERGY);
        assert_eq!(core.robot().unwrap().current_direction(), CompassPrimary::East);
    }

    #[test]
    fn no_working_sensor_is_an_error() {
        let mut core = core_in_corridor();
        for dir in RelativeDirection::ALL.iter() {
            core.set_sensor_belief(*dir, false);
        }
        let err = core.sense(Left).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedSensor(Left)));
    }

    #[test]
    fn wrong_beliefs_surface_as_errors() {
        let mut core = core_in_corridor();
        core.robot_mut().unwrap().trigger_sensor_failure(Forward);
        assert!(core.sense(Forward).is_err());
    }

    #[test]
    fn no_robot_no_decisions() {
        let mut core = DriverCore::new();
        assert!(core.begin_decision().is_err());
        assert_eq!(core.energy_consumption(), 0.0);
        assert_eq!(core.path_length(), 0);
    }
}
