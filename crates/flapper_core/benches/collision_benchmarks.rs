use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flapper_core::collision::collides;
use flapper_core::mask::{Mask, ProceduralSilhouettes, Segment, SilhouetteProvider};
use flapper_data::{Agent, AgentId, Obstacle};

fn pipe(x: f64) -> Obstacle {
    Obstacle {
        x,
        gap_center: 250.0,
        top: 250.0 - 640.0,
        bottom: 450.0,
        passed: false,
        serial: 0,
    }
}

fn bench_collision_in_gap(c: &mut Criterion) {
    let shapes = ProceduralSilhouettes::new();
    let agent = Agent::new(230.0, 320.0);
    let bird = shapes.agent_mask(AgentId(0), &agent).unwrap();
    let top = shapes.segment_mask(Segment::Top).unwrap();
    let bottom = shapes.segment_mask(Segment::Bottom).unwrap();
    let obstacle = pipe(200.0);

    c.bench_function("collides_bird_in_gap", |b| {
        b.iter(|| black_box(collides(&agent, bird, black_box(&obstacle), top, bottom)))
    });
}

fn bench_overlap_full(c: &mut Criterion) {
    let big = Mask::filled(104, 640);
    let bird = Mask::ellipse(68, 48);

    c.bench_function("mask_overlap_miss_worst_case", |b| {
        let empty = Mask::new(68, 48);
        b.iter(|| black_box(empty.overlap(&big, black_box((0, 0)))))
    });

    c.bench_function("mask_overlap_hit", |b| {
        b.iter(|| black_box(bird.overlap(&big, black_box((10, 10)))))
    });
}

criterion_group!(benches, bench_collision_in_gap, bench_overlap_full);
criterion_main!(benches);
