//! # Local Planner Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::{
    eqpt::{
        chassis::Chassis,
        loc::LocPose,
        perception::{BBox2D, PerceptionObstacle, PerceptionObstacles},
    },
    plan::Point,
};
use nav_lib::{
    local_plan::{
        select, DwaParams, DynamicWindow, Goal, InputData, LocalPlanner, Obstacle, Params,
        PlannerState, Trajectory,
    },
    motion::{VehicleState, VelCmd},
};
use util::module::State;

fn local_plan_benchmark(c: &mut Criterion) {
    let params = DwaParams::default();
    let state = VehicleState::at_origin(0.5, 0.1);
    let goal = Goal::new(2.0, 0.3);
    let obstacles = vec![
        Obstacle::new(1.0, 0.0, 0.2),
        Obstacle::new(1.5, 0.6, 0.2),
        Obstacle::new(2.5, -0.4, 0.2),
    ];

    c.bench_function("Trajectory::rollout", |b| {
        b.iter(|| Trajectory::rollout(black_box(&state), &VelCmd::new(0.5, 0.2), &params))
    });

    let window = DynamicWindow::calculate(&state, &params);
    c.bench_function("select", |b| {
        b.iter(|| {
            select(
                black_box(&state),
                &window,
                &params,
                &goal,
                &obstacles,
                PlannerState::default(),
            )
        })
    });

    // Full cycle including the frame conversion
    let scale = 144.9;
    let input = InputData {
        pose: LocPose::now(1.0 * scale, 0.0, 0.0),
        path: (0..=100)
            .rev()
            .map(|i| Point {
                x: i as f64 * 0.05 * scale,
                y: 0.0,
            })
            .collect(),
        perception: PerceptionObstacles {
            perception_obstacle: vec![PerceptionObstacle {
                id: 0,
                bbox2d: BBox2D {
                    xmin: -0.2,
                    xmax: 0.0,
                    zmin: 1.0,
                    zmax: 1.2,
                },
            }],
        },
        chassis: Some(Chassis { speed_ms: 0.5 }),
    };
    let mut planner = LocalPlanner::new(Params::default());

    c.bench_function("LocalPlanner::proc", |b| {
        b.iter(|| planner.proc(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, local_plan_benchmark);
criterion_main!(benches);
