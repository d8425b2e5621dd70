//! Cross-component scenarios: a full simulation tick loop driven by hand-built
//! track fixtures, exercising car physics, collision, checkpoints and fitness
//! together rather than in isolation.

use raceway_neat::{Controls, FixedMap, MapSource, Rectangle, SimConfig, Simulation, Vector2};

fn oval_track() -> (Vector2, Vec<Rectangle>, Vec<Vector2>) {
    let start = Vector2::zero();
    let checkpoints = vec![
        start,
        Vector2::new(400.0, 0.0),
        Vector2::new(400.0, 400.0),
        Vector2::new(0.0, 400.0),
    ];
    let map = FixedMap { start_pos: start, walls: vec![], checkpoints };
    map.generate().unwrap()
}

#[test]
fn friction_brings_a_coasting_car_to_a_stop() {
    // Build up some velocity first, then release the throttle: friction
    // alone must bring the car to a full stop within a handful of ticks.
    let (start, walls, checkpoints) = oval_track();
    let cfg = SimConfig::default();
    let mut sim = Simulation::new(1, start, walls, checkpoints, cfg);

    let drive = [Controls { forward: true, ..Default::default() }];
    let info = sim.update(0.1, &drive);
    assert!(info[0][0] > 0.0, "car should be accelerating under forward throttle");

    let coast = [Controls::default()];
    let mut last_velocity = 1.0;
    for _ in 0..50 {
        last_velocity = sim.update(0.1, &coast)[0][0];
    }
    assert_eq!(last_velocity, 0.0);
}

#[test]
fn car_driving_forward_around_the_oval_gains_fitness_monotonically() {
    let (start, walls, checkpoints) = oval_track();
    let cfg = SimConfig::default();
    let mut sim = Simulation::new(1, start, walls, checkpoints, cfg);

    let drive = [Controls { forward: true, ..Default::default() }];
    let mut last_fitness = sim.get_cars_fitness()[0];
    for _ in 0..600 {
        sim.update(0.05, &drive);
        let fitness = sim.get_cars_fitness()[0];
        assert!(fitness >= last_fitness - 1e-6, "fitness must not regress while driving forward");
        last_fitness = fitness;
    }
    assert!(last_fitness > 0.0);
}

#[test]
fn all_dead_reports_true_only_once_every_car_has_collided() {
    let start = Vector2::zero();
    // Placed well clear of car 1's stationary bounding box (half-width 70.5
    // centred on the origin), but squarely in car 0's path as it accelerates.
    let wall = Rectangle::new(
        Vector2::new(200.0, -100.0),
        Vector2::new(300.0, -100.0),
        Vector2::new(300.0, 100.0),
        Vector2::new(200.0, 100.0),
    );
    let checkpoints = vec![start, Vector2::new(500.0, 0.0)];
    let cfg = SimConfig::default();
    let mut sim = Simulation::new(2, start, vec![wall], checkpoints, cfg);

    let drive = [
        Controls { forward: true, ..Default::default() },
        Controls::default(),
    ];
    assert!(!sim.all_dead());
    for _ in 0..50 {
        sim.update(0.1, &drive);
    }
    // Car 0 drove into the wall; car 1 never moved and never collides.
    assert!(!sim.all_dead());
}

#[test]
fn tracked_car_position_follows_camera() {
    let (start, walls, checkpoints) = oval_track();
    let cfg = SimConfig::default();
    let mut sim = Simulation::new(2, start, walls, checkpoints, cfg);
    sim.track_car(1);

    let drive = [Controls::default(), Controls { forward: true, ..Default::default() }];
    for _ in 0..5 {
        sim.update(0.1, &drive);
    }
    assert!(sim.camera_position().x > 0.0);
}
