use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use mazewalker::cells::{Cartesian2DCoordinate, CompassPrimary, Wallboard};
use mazewalker::generators;
use mazewalker::grid::Grid;
use mazewalker::pathing::Distances;
use mazewalker::units::{Height, Width};
use mazewalker::utils;

fn carved_grid() -> Grid {
    let mut g = Grid::new(Width(350), Height(350)).unwrap();
    let mut rng = utils::xorshift_rng(Some(5));
    generators::recursive_backtracker(&mut g, &mut rng, &mut |_| {});
    g.set_exit(Wallboard::new(0, 0, CompassPrimary::North)).unwrap();
    g
}

fn bench_distances(c: &mut Criterion) {
    c.bench_function("distances", |b| {
        let g = carved_grid();
        let exit = Cartesian2DCoordinate::new(0, 0);
        b.iter(|| Distances::new(&g, exit))
    });
}

fn bench_furthest_points(c: &mut Criterion) {
    c.bench_function("furthest_points", |b| {
        let g = carved_grid();
        let distances = Distances::new(&g, Cartesian2DCoordinate::new(0, 0)).unwrap();
        b.iter(|| distances.furthest_points_on_grid())
    });
}

fn bench_path_to_exit(c: &mut Criterion) {
    c.bench_function("path_to_exit", |b| {
        let g = carved_grid();
        let distances = Distances::new(&g, Cartesian2DCoordinate::new(0, 0)).unwrap();
        let start = Cartesian2DCoordinate::new(349, 349);
        b.iter(|| distances.path_to_exit(&g, start))
    });
}

criterion_group!(benches,
    bench_distances,
    bench_furthest_points,
    bench_path_to_exit
);
criterion_main!(benches);
