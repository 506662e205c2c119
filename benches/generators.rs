use criterion::{criterion_group, criterion_main, Criterion};
use mazewalker::{
    config::DEFAULT_SKILL_TABLE,
    eller::{self, EllerSettings},
    factory,
    generators,
    grid::Grid,
    order::{BuildOrder, Builder},
    units::{Height, SkillLevel, Width},
    utils,
};

fn empty_grid() -> Grid {
    Grid::new(Width(64), Height(64)).unwrap()
}

fn bench_recursive_backtracker_64(c: &mut Criterion) {
    let mut rng = utils::xorshift_rng(Some(1));
    c.bench_function("recursive_backtracker_64", move |b| {
        b.iter(|| {
            let mut g = empty_grid();
            generators::recursive_backtracker(&mut g, &mut rng, &mut |_| {});
            g
        })
    });
}

fn bench_prim_64(c: &mut Criterion) {
    let mut rng = utils::xorshift_rng(Some(1));
    c.bench_function("prim_64", move |b| {
        b.iter(|| {
            let mut g = empty_grid();
            generators::prim(&mut g, &mut rng, &mut |_| {});
            g
        })
    });
}

fn bench_eller_64(c: &mut Criterion) {
    let mut rng = utils::xorshift_rng(Some(1));
    let settings = EllerSettings::default();
    c.bench_function("eller_64", move |b| {
        b.iter(|| {
            let mut g = empty_grid();
            let _ = eller::eller(&mut g, &mut rng, &settings, &mut |_| {});
            g
        })
    });
}

fn bench_full_pipeline_skill_9(c: &mut Criterion) {
    let skill = SkillLevel::new(9).unwrap();
    let policy = *DEFAULT_SKILL_TABLE.policy(skill).unwrap();
    let settings = EllerSettings::default();
    let mut rng = utils::xorshift_rng(Some(1));
    c.bench_function("full_pipeline_skill_9", move |b| {
        b.iter(|| {
            let order = BuildOrder::new(skill, Builder::Dfs, false);
            factory::build_maze(&order, &policy, &settings, &mut rng).unwrap()
        })
    });
}

criterion_group!(benches,
    bench_recursive_backtracker_64,
    bench_prim_64,
    bench_eller_64,
    bench_full_pipeline_skill_9
);
criterion_main!(benches);
