//! **mazewalker** builds rectangular mazes and sends battery powered robots through them.
//!
//! A `MazeFactory` generates a maze on a worker thread (depth first backtracking, Prim or Eller),
//! places an exit on the border and computes the distance from every cell to it. A `Robot` moves
//! through the finished `Maze`, paying for every sensor read and every step, and a `RobotDriver`
//! (`WallFollower` or `Wizard`) decides where it goes.

#[macro_use]
extern crate error_chain;

pub mod cells;
pub mod config;
pub mod drivers;
pub mod eller;
pub mod errors;
pub mod factory;
pub mod generators;
pub mod grid;
pub mod grid_iterators;
pub mod maze;
pub mod order;
pub mod pathing;
pub mod robot;
pub mod sensors;
pub mod units;
pub mod utils;
pub mod wall_follower;
pub mod wizard;
