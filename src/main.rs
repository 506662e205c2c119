use docopt::Docopt;
use error_chain::bail;
use log::info;
use mazewalker::{
    cells::RelativeDirection,
    config::SkillTable,
    drivers::RobotDriver,
    factory::MazeFactory,
    order::{BuildOrder, Builder},
    robot::Robot,
    units::SkillLevel,
    wall_follower::WallFollower,
    wizard::Wizard,
};
use serde_derive::Deserialize;
use std::{env, io, io::prelude::*, thread, time::Duration};

const USAGE: &str = "Mazewalker

Usage:
    mazewalker_driver -h | --help
    mazewalker_driver [dfs|prim|eller] [--skill=<n>] [--perfect] [--seed=<s>] [--driver=<d>] [--fail=<dir> [--fail-after-ms=<ms>] [--repair-after-ms=<ms>]] [--skill-table=<path>] [--save=<path>] [--debug]

Options:
    -h --help                Show this screen.
    --skill=<n>              Skill level 0 to 15, higher is bigger [default: 0].
    --perfect                No loops and no rooms, exactly one way between any two cells.
    --seed=<s>               Seed the maze builder for a repeatable maze.
    --driver=<d>             wizard or wall-follower [default: wizard].
    --fail=<dir>             Break the left, right, forward or backward distance sensor.
    --fail-after-ms=<ms>     Delay before the sensor breaks [default: 0].
    --repair-after-ms=<ms>   Repair the broken sensor again after this delay.
    --skill-table=<path>     JSON file with the 16 skill level policies.
    --save=<path>            Write the finished maze as JSON.
    --debug                  Enable debug messages.
";

#[derive(Debug, Deserialize)]
struct DriverArgs {
    cmd_dfs: bool,
    cmd_prim: bool,
    cmd_eller: bool,
    flag_skill: u8,
    flag_perfect: bool,
    flag_seed: Option<u64>,
    flag_driver: String,
    flag_fail: String,
    flag_fail_after_ms: u64,
    flag_repair_after_ms: Option<u64>,
    flag_skill_table: String,
    flag_save: String,
    flag_debug: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazewalker::errors::Error, ::mazewalker::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> Result<()> {

    let args: DriverArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.flag_debug {
        env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    let builder = if args.cmd_prim {
        Builder::Prim
    } else if args.cmd_eller {
        Builder::Eller
    } else {
        Builder::Dfs
    };
    let skill = SkillLevel::new(args.flag_skill)?;

    let mut factory = MazeFactory::new(false);
    if !args.flag_skill_table.is_empty() {
        factory = factory.with_skill_table(SkillTable::from_json_file(&args.flag_skill_table)?)?;
    }

    let order = match args.flag_seed {
        Some(seed) => BuildOrder::seeded(skill, builder, args.flag_perfect, seed),
        None => BuildOrder::new(skill, builder, args.flag_perfect),
    };
    factory.order(order.clone())?;
    wait_with_progress(&factory, &order)?;
    let maze = factory.wait_till_delivered()?;

    println!("{} maze {}x{}, start {:?}, exit {:?}, shortest path {}",
             builder,
             maze.width().0,
             maze.height().0,
             maze.start(),
             maze.exit(),
             maze.distances().distance_to(maze.start()).unwrap_or(0));

    if !args.flag_save.is_empty() {
        maze.snapshot()
            .to_json_file(&args.flag_save)
            .chain_err(|| format!("Failed to save maze to {}", args.flag_save))?;
    }

    let mut driver: Box<dyn RobotDriver> = match args.flag_driver.as_str() {
        "wizard" => Box::new(Wizard::new()),
        "wall-follower" => Box::new(WallFollower::new()),
        other => bail!("unknown driver {}, expected wizard or wall-follower", other),
    };
    driver.set_robot(Robot::new(maze.clone()));

    if !args.flag_fail.is_empty() {
        let direction = parse_direction(&args.flag_fail)?;
        let faults = driver.sensor_channel();
        if args.flag_fail_after_ms == 0 {
            faults.fail_now(direction);
        } else {
            let _ = faults.fail_after(direction, Duration::from_millis(args.flag_fail_after_ms));
        }
        if let Some(delay) = args.flag_repair_after_ms {
            let _ = faults.repair_after(direction, Duration::from_millis(delay));
        }
    }

    let outcome = driver.drive_to_exit();
    info!("drive finished after {} steps", driver.path_length());

    match outcome {
        Ok(_) => println!("{} reached the exit", driver.name()),
        Err(err) => {
            println!("{} failed: {}", driver.name(), err);
            for cause in err.iter().skip(1) {
                println!("  caused by: {}", cause);
            }
        }
    }
    println!("energy consumed: {}", driver.energy_consumption());
    println!("path length: {}", driver.path_length());

    Ok(())
}

/// Show the build progress on one line until the order is delivered or the builder gives up.
fn wait_with_progress(factory: &MazeFactory, order: &BuildOrder) -> Result<()> {
    let stdout = io::stdout();
    let mut last_shown = None;
    while !order.is_delivered() && factory.is_building() {
        let progress = order.progress();
        if last_shown != Some(progress) {
            let mut out = stdout.lock();
            write!(out, "\rbuilding {:3}%", progress)?;
            out.flush()?;
            last_shown = Some(progress);
        }
        thread::sleep(POLL_INTERVAL);
    }
    println!("\rbuilding {:3}%", order.progress());
    Ok(())
}

fn parse_direction(name: &str) -> Result<RelativeDirection> {
    match name.to_lowercase().as_str() {
        "left" => Ok(RelativeDirection::Left),
        "right" => Ok(RelativeDirection::Right),
        "forward" => Ok(RelativeDirection::Forward),
        "backward" => Ok(RelativeDirection::Backward),
        other => bail!("unknown sensor direction {}", other),
    }
}
