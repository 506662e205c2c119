//! Crate wide error types.
//!
//! `error_chain!` creates the `Error`, `ErrorKind`, `ResultExt` and `Result` types.
//! Other modules `use crate::errors::*;` to get at them.
//!
//! Energy exhaustion is not an error: a robot that runs out of battery is simply
//! stopped, see `Robot::has_stopped`.

use crate::cells::{RelativeDirection, Wallboard};

error_chain! {

    foreign_links {
        Json(::serde_json::Error);
        Io(::std::io::Error);
    }

    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid maze dimensions")
            display("invalid maze dimensions {} x {}", width, height)
        }
        InvalidSkillLevel(level: u8) {
            description("invalid skill level")
            display("invalid skill level {}, expected 0..=15", level)
        }
        InvalidWallboard(wallboard: Wallboard) {
            description("invalid wallboard")
            display("wallboard {:?} is not valid here", wallboard)
        }
        MissingExit {
            description("maze has no exit")
            display("maze grid has no exit wallboard")
        }
        Disconnected(unreached: usize) {
            description("maze is not connected")
            display("{} cells cannot reach the exit", unreached)
        }
        UnsupportedSensor(direction: RelativeDirection) {
            description("sensor not operational")
            display("no operational {:?} sensor", direction)
        }
        MissingRoomSensor {
            description("room sensor missing")
            display("robot has no room sensor")
        }
        InvalidPosition(x: u32, y: u32) {
            description("position outside the maze")
            display("invalid position ({}, {})", x, y)
        }
        ExteriorJump {
            description("jump over an exterior wall")
            display("can't jump an exterior wall")
        }
        RobotStopped {
            description("robot stopped")
            display("robot has stopped and is not functional")
        }
        FactoryBusy {
            description("maze factory busy")
            display("maze factory is already building an order")
        }
        BuildFailed {
            description("maze build failed")
            display("maze builder thread terminated without delivering")
        }
    }
}
