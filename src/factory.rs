//! Builds ordered mazes on a worker thread.
//!
//! One order at a time: the factory spawns a thread per order which carves the grid, adds loops
//! and rooms, places the exit and start, computes the distance field and finally delivers into
//! the order. Progress goes 0, up to 70 while carving, 80, 90, then 100 on delivery.

use log::{debug, info};
use rand::Rng;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::cells::Cartesian2DCoordinate;
use crate::config::{SkillPolicy, SkillTable, DEFAULT_SKILL_TABLE};
use crate::eller::{self, EllerSettings};
use crate::errors::*;
use crate::generators;
use crate::grid::Grid;
use crate::maze::Maze;
use crate::order::{BuildOrder, Builder};
use crate::pathing::Distances;
use crate::utils;

/// Seed of a deterministic factory's builds unless the order carries its own.
pub const DETERMINISTIC_SEED: u64 = 13;

const EXTRAS_PROGRESS: u8 = 80;
const EXIT_PROGRESS: u8 = 90;

pub struct MazeFactory {
    deterministic: bool,
    skill_table: SkillTable,
    eller_settings: EllerSettings,
    worker: Option<(BuildOrder, JoinHandle<Result<()>>)>,
}

impl MazeFactory {
    pub fn new(deterministic: bool) -> MazeFactory {
        MazeFactory {
            deterministic,
            skill_table: DEFAULT_SKILL_TABLE.clone(),
            eller_settings: EllerSettings::default(),
            worker: None,
        }
    }

    /// Fails for a table that does not hold one usable policy per skill level.
    pub fn with_skill_table(mut self, skill_table: SkillTable) -> Result<MazeFactory> {
        skill_table.validate()?;
        self.skill_table = skill_table;
        Ok(self)
    }

    pub fn with_eller_settings(mut self, eller_settings: EllerSettings) -> MazeFactory {
        self.eller_settings = eller_settings;
        self
    }

    #[inline]
    pub fn skill_table(&self) -> &SkillTable {
        &self.skill_table
    }

    /// Start building the order in the background. Fails while a previous order is still being
    /// built.
    pub fn order(&mut self, order: BuildOrder) -> Result<()> {
        if let Some((_, handle)) = self.worker.as_ref() {
            if !handle.is_finished() {
                bail!(ErrorKind::FactoryBusy);
            }
        }
        if let Some((_, handle)) = self.worker.take() {
            let _ = handle.join();
        }

        let policy = *self.skill_table.policy(order.skill_level())?;
        let eller_settings = self.eller_settings;
        let seed = order.seed().or(if self.deterministic { Some(DETERMINISTIC_SEED) } else { None });
        info!("order placed: {} builder, skill {}, perfect {}, {}x{}",
              order.builder(),
              order.skill_level().level(),
              order.is_perfect(),
              policy.width,
              policy.height);

        let worker_order = order.clone();
        let handle = thread::Builder::new()
            .name("maze-builder".into())
            .spawn(move || -> Result<()> {
                let mut rng = utils::xorshift_rng(seed);
                let maze = build_maze(&worker_order, &policy, &eller_settings, &mut rng)?;
                info!("maze delivered: start {:?}, exit {:?}, path length {}",
                      maze.start(),
                      maze.exit(),
                      maze.distances().max());
                let _ = worker_order.deliver(maze);
                Ok(())
            })?;
        self.worker = Some((order, handle));
        Ok(())
    }

    /// True while a worker thread is still running.
    pub fn is_building(&self) -> bool {
        self.worker.as_ref().map_or(false, |(_, handle)| !handle.is_finished())
    }

    /// Block until the current order has been delivered and return its maze.
    pub fn wait_till_delivered(&mut self) -> Result<Arc<Maze>> {
        let (order, handle) = match self.worker.take() {
            Some(worker) => worker,
            None => bail!("no maze order placed"),
        };
        match handle.join() {
            Ok(built) => built.chain_err(|| ErrorKind::BuildFailed)?,
            Err(_) => bail!(ErrorKind::BuildFailed),
        }
        order.maze().ok_or_else(|| ErrorKind::BuildFailed.into())
    }
}

/// The whole pipeline, synchronously on the calling thread, reporting progress into `order`.
/// The maze is returned rather than delivered.
pub fn build_maze<R: Rng>(order: &BuildOrder,
                          policy: &SkillPolicy,
                          eller_settings: &EllerSettings,
                          rng: &mut R)
                          -> Result<Maze> {
    order.update_progress(0);
    let (width, height) = policy.dimensions();
    let mut grid = Grid::new(width, height)?;

    {
        let mut progress = |percent: u8| order.update_progress(percent);
        match order.builder() {
            Builder::Dfs => generators::recursive_backtracker(&mut grid, rng, &mut progress),
            Builder::Prim => generators::prim(&mut grid, rng, &mut progress),
            Builder::Eller => {
                let _ = eller::eller(&mut grid, rng, eller_settings, &mut progress);
            }
        }
    }

    if !order.is_perfect() {
        let loops = generators::knock_down_walls(&mut grid, rng, policy.loop_percent);
        let rooms = generators::carve_rooms(&mut grid, rng, policy.rooms);
        debug!("imperfect maze: {} extra passages, {} rooms", loops, rooms);
    }
    order.update_progress(EXTRAS_PROGRESS);

    place_exit(&mut grid)?;
    let maze = Maze::with_farthest_start(grid)?;
    debug_assert_eq!(maze.distances().distance_to(maze.start()),
                     Some(maze.distances().max()));
    order.update_progress(EXIT_PROGRESS);
    Ok(maze)
}

/// Open the exit in the border cell farthest from the middle of the grid. Ties go to the first
/// cell in row-major order, and the cell's first border wallboard in N/E/S/W order is removed.
fn place_exit(grid: &mut Grid) -> Result<()> {
    let centre = Cartesian2DCoordinate::new((grid.width().0 / 2) as u32,
                                            (grid.height().0 / 2) as u32);
    let from_centre = Distances::new(grid, centre)?;

    let mut farthest: Option<(u32, Cartesian2DCoordinate)> = None;
    for coord in grid.iter() {
        if grid.border_wallboards(coord).is_empty() {
            continue;
        }
        let distance = from_centre.distance_to(coord).unwrap_or(0);
        if farthest.map_or(true, |(best, _)| distance > best) {
            farthest = Some((distance, coord));
        }
    }

    let exit_wallboard = farthest.and_then(|(_, coord)| grid.border_wallboards(coord).first().cloned())
        .ok_or(ErrorKind::MissingExit)?;
    debug!("exit at {:?}", exit_wallboard);
    grid.set_exit(exit_wallboard)
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::cells::{CompassPrimary, Wallboard};
    use crate::units::SkillLevel;

    fn skill(level: u8) -> SkillLevel {
        SkillLevel::new(level).unwrap()
    }

    fn count_exits(maze: &Maze) -> usize {
        let grid = maze.grid();
        grid.iter()
            .flat_map(|coord| {
                CompassPrimary::ALL.into_iter().map(move |direction| Wallboard { cell: coord, direction })
            })
            .filter(|wallboard| grid.is_part_of_border(*wallboard) && !grid.has_wallboard(*wallboard))
            .count()
    }

    fn check_maze(maze: &Maze, policy: &SkillPolicy) -> bool {
        let distances = maze.distances();
        maze.grid().width().0 == policy.width && maze.grid().height().0 == policy.height &&
        count_exits(maze) == 1 &&
        maze.grid().iter().all(|coord| distances.distance_to(coord).is_some()) &&
        distances.distance_to(maze.start()) == Some(distances.max()) &&
        distances.distance_to(maze.exit()) == Some(0)
    }

    fn build(level: u8, builder: Builder, perfect: bool, seed: u64) -> (BuildOrder, Maze) {
        let order = BuildOrder::seeded(skill(level), builder, perfect, seed);
        let policy = *DEFAULT_SKILL_TABLE.policy(order.skill_level()).unwrap();
        let mut rng = utils::xorshift_rng(Some(seed));
        let maze = build_maze(&order, &policy, &EllerSettings::default(), &mut rng).unwrap();
        (order, maze)
    }

    #[test]
    fn every_builder_makes_valid_mazes() {
        fn p(seed: u64, level: u8, perfect: bool) -> bool {
            let level = level % 4;
            let policy = *DEFAULT_SKILL_TABLE.policy(skill(level)).unwrap();
            [Builder::Dfs, Builder::Prim, Builder::Eller].iter().all(|builder| {
                let (_, maze) = build(level, *builder, perfect, seed);
                check_maze(&maze, &policy)
            })
        }
        quickcheck(p as fn(u64, u8, bool) -> bool);
    }

    #[test]
    fn perfect_mazes_are_spanning_trees() {
        for builder in &[Builder::Dfs, Builder::Prim, Builder::Eller] {
            let (_, maze) = build(2, *builder, true, 21);
            assert_eq!(maze.grid().links_count(), maze.grid().size() - 1);
            assert!(maze.grid().rooms().is_empty());
        }
    }

    #[test]
    fn imperfect_mazes_have_loops_and_rooms() {
        let (_, maze) = build(4, Builder::Dfs, false, 8);
        assert!(maze.grid().links_count() > maze.grid().size() - 1);
        assert!(!maze.grid().rooms().is_empty());
    }

    #[test]
    fn pipeline_stops_short_of_delivery() {
        let (order, _) = build(1, Builder::Eller, false, 5);
        assert_eq!(order.progress(), EXIT_PROGRESS);
        assert!(order.maze().is_none());
    }

    #[test]
    fn exit_is_on_the_border_farthest_from_centre() {
        // A 3x1 corridor, centre (1, 0): both ends are 1 away, the first wins.
        let mut grid = Grid::new(crate::units::Width(3), crate::units::Height(1)).unwrap();
        grid.link(Cartesian2DCoordinate::new(0, 0), Cartesian2DCoordinate::new(1, 0)).unwrap();
        grid.link(Cartesian2DCoordinate::new(1, 0), Cartesian2DCoordinate::new(2, 0)).unwrap();
        place_exit(&mut grid).unwrap();
        assert_eq!(grid.exit_wallboard(), Some(Wallboard::new(0, 0, CompassPrimary::North)));
    }

    #[test]
    fn factory_delivers_in_the_background() {
        let mut factory = MazeFactory::new(false);
        let order = BuildOrder::new(skill(3), Builder::Prim, false);
        factory.order(order.clone()).unwrap();

        let maze = factory.wait_till_delivered().unwrap();
        assert!(!factory.is_building());
        assert_eq!(order.progress(), 100);
        assert!(Arc::ptr_eq(&maze, &order.maze().unwrap()));
        assert!(check_maze(&maze, DEFAULT_SKILL_TABLE.policy(skill(3)).unwrap()));
    }

    #[test]
    fn observed_progress_is_monotonic() {
        let mut factory = MazeFactory::new(true);
        let order = BuildOrder::new(skill(9), Builder::Eller, false);
        let watcher = order.clone();
        let done = Arc::new(AtomicBool::new(false));
        let watcher_done = done.clone();
        let poller = thread::spawn(move || {
            let mut seen = vec![watcher.progress()];
            while !watcher_done.load(Ordering::Acquire) {
                seen.push(watcher.progress());
                thread::sleep(Duration::from_micros(50));
            }
            seen.push(watcher.progress());
            seen
        });

        factory.order(order).unwrap();
        let _ = factory.wait_till_delivered().unwrap();
        done.store(true, Ordering::Release);
        let seen = poller.join().unwrap();
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn deterministic_factories_agree() {
        let build_once = || {
            let mut factory = MazeFactory::new(true);
            factory.order(BuildOrder::new(skill(2), Builder::Dfs, false)).unwrap();
            factory.wait_till_delivered().unwrap().snapshot()
        };
        assert_eq!(build_once(), build_once());
    }

    #[test]
    fn custom_skill_table() {
        let mut table = DEFAULT_SKILL_TABLE.clone();
        table.levels[0].width = 7;
        table.levels[0].height = 3;
        let mut factory = MazeFactory::new(true).with_skill_table(table).unwrap();
        let order = BuildOrder::new(skill(0), Builder::Prim, true);
        factory.order(order).unwrap();
        let maze = factory.wait_till_delivered().unwrap();
        assert_eq!((maze.width().0, maze.height().0), (7, 3));
    }

    #[test]
    fn invalid_skill_tables_are_refused() {
        let short = SkillTable { levels: DEFAULT_SKILL_TABLE.levels[..3].to_vec() };
        assert!(MazeFactory::new(true).with_skill_table(short).is_err());
        assert!(MazeFactory::new(true).with_skill_table(SkillTable { levels: vec![] }).is_err());

        let mut empty_grid = DEFAULT_SKILL_TABLE.clone();
        empty_grid.levels[3].width = 0;
        let err = MazeFactory::new(true).with_skill_table(empty_grid).err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidDimensions(0, _)));
    }

    #[test]
    fn waiting_without_an_order_fails() {
        let mut factory = MazeFactory::new(true);
        assert!(factory.wait_till_delivered().is_err());
    }
}
