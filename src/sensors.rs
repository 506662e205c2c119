//! Sensor failures and repairs arrive as messages.
//!
//! Whoever wants to break or fix a robot's sensor sends a `SensorCommand`, immediately or after a
//! delay from a throwaway thread. The driver owning the robot drains the queue at the start of
//! every decision, so a command never lands in the middle of one.

use log::debug;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cells::RelativeDirection;
use crate::robot::Robot;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorCommand {
    Fail(RelativeDirection),
    Repair(RelativeDirection),
}

impl SensorCommand {
    /// Returns false for a repair of a sensor the robot does not have.
    pub fn apply(self, robot: &mut Robot) -> bool {
        match self {
            SensorCommand::Fail(direction) => {
                robot.trigger_sensor_failure(direction);
                true
            }
            SensorCommand::Repair(direction) => robot.repair_sensor(direction),
        }
    }
}

/// Sending side of a driver's sensor command queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SensorFaults {
    sender: flume::Sender<SensorCommand>,
}

impl SensorFaults {
    pub fn channel() -> (SensorFaults, flume::Receiver<SensorCommand>) {
        let (sender, receiver) = flume::unbounded();
        (SensorFaults { sender }, receiver)
    }

    /// Queue a command. False once the driver is gone.
    pub fn send(&self, command: SensorCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    pub fn fail_now(&self, direction: RelativeDirection) -> bool {
        self.send(SensorCommand::Fail(direction))
    }

    pub fn repair_now(&self, direction: RelativeDirection) -> bool {
        self.send(SensorCommand::Repair(direction))
    }

    /// Break the sensor after `delay`. There is no way to call it off.
    pub fn fail_after(&self, direction: RelativeDirection, delay: Duration) -> JoinHandle<()> {
        self.send_after(SensorCommand::Fail(direction), delay)
    }

    /// Fix the sensor after `delay`. There is no way to call it off.
    pub fn repair_after(&self, direction: RelativeDirection, delay: Duration) -> JoinHandle<()> {
        self.send_after(SensorCommand::Repair(direction), delay)
    }

    fn send_after(&self, command: SensorCommand, delay: Duration) -> JoinHandle<()> {
        let sender = self.sender.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            if sender.send(command).is_err() {
                debug!("{:?} dropped, nobody is listening", command);
            }
        })
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::RelativeDirection::*;
    use crate::maze::fixtures;

    #[test]
    fn commands_change_the_robot() {
        let mut robot = Robot::with_sensors(fixtures::corridor(3), &[Left, Forward], true);
        assert!(SensorCommand::Fail(Left).apply(&mut robot));
        assert!(!robot.has_operational_sensor(Left));
        assert!(SensorCommand::Repair(Left).apply(&mut robot));
        assert!(robot.has_operational_sensor(Left));
        assert!(!SensorCommand::Repair(Right).apply(&mut robot));
    }

    #[test]
    fn commands_queue_in_order() {
        let (faults, receiver) = SensorFaults::channel();
        assert!(faults.fail_now(Forward));
        assert!(faults.repair_now(Forward));
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(),
                   vec![SensorCommand::Fail(Forward), SensorCommand::Repair(Forward)]);
    }

    #[test]
    fn delayed_commands_arrive() {
        let (faults, receiver) = SensorFaults::channel();
        let handle = faults.fail_after(Backward, Duration::from_millis(5));
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)),
                   Ok(SensorCommand::Fail(Backward)));
        handle.join().unwrap();
    }

    #[test]
    fn sending_to_a_gone_driver() {
        let (faults, receiver) = SensorFaults::channel();
        drop(receiver);
        assert!(!faults.fail_now(Left));
        faults.repair_after(Left, Duration::from_millis(1)).join().unwrap();
    }
}
