use glam::Vec3;
use particle_viz::config::SphereConfig;
use particle_viz::frame::ManualScheduler;
use particle_viz::sphere::{FrameInput, Shape, SphereEngine, SphereScene, Trail};

fn engine(count: usize) -> SphereEngine {
    let mut config = SphereConfig::default();
    config.set_particle_count(count);
    SphereEngine::new(config, 7).unwrap()
}

fn scene(count: usize) -> SphereScene {
    SphereScene::new(engine(count), 1280.0, 720.0)
}

#[test]
fn sphere_targets_are_the_original_points() {
    let mut e = engine(400);
    e.set_shape(Shape::Ring);
    e.set_shape(Shape::Sphere);
    for p in e.particles() {
        assert_eq!(p.shape_target(), p.original());
        assert!((p.original().length() - e.config().sphere_radius).abs() < 1e-3);
    }
}

#[test]
fn every_shape_fills_every_particle() {
    for count in [50, 400, 1333] {
        let mut e = engine(count);
        for shape in Shape::ALL {
            for outline in [false, true] {
                e.set_outline_mode(outline);
                e.set_shape(shape);
                assert_eq!(e.particles().len(), count);
                assert_eq!(shape.targets(count, 6.0, outline).len(), count);
                assert!(e.particles().iter().all(|p| p.shape_target().is_finite()));
            }
        }
    }
}

#[test]
fn set_shape_is_idempotent() {
    for shape in Shape::ALL {
        let mut e = engine(400);
        e.set_shape(shape);
        let first: Vec<Vec3> = e.particles().iter().map(|p| p.shape_target()).collect();
        e.set_shape(shape);
        let second: Vec<Vec3> = e.particles().iter().map(|p| p.shape_target()).collect();
        assert_eq!(first, second, "{}", shape);
    }
}

#[test]
fn scatter_and_cluster_are_clamped() {
    let mut e = engine(50);
    e.set_scatter_amount(5.0);
    e.set_cluster_amount(-2.0);
    assert_eq!(e.config().scatter, 1.0);
    assert_eq!(e.config().cluster, 0.0);
}

#[test]
fn count_change_rebuilds_within_range() {
    let mut e = engine(400);
    e.set_particle_count(10);
    assert_eq!(e.particles().len(), 50);
    e.set_particle_count(5000);
    assert_eq!(e.particles().len(), 2000);
}

#[test]
fn trails_never_exceed_capacity() {
    let mut s = scene(200);
    s.engine.set_scatter_amount(1.0);
    let mut clock = ManualScheduler::new();
    for frame in 0..240 {
        // Keep the camera moving so every particle streaks.
        s.wheel(if frame % 2 == 0 { 200.0 } else { -200.0 });
        clock.step(&mut s);
        for p in s.engine.particles() {
            assert!(p.trail().len() <= Trail::CAPACITY);
        }
    }
    assert!(s
        .engine
        .particles()
        .iter()
        .any(|p| p.trail().len() == Trail::CAPACITY));

    // FIFO: the newest entry carries the latest time.
    let p = &s.engine.particles()[0];
    if let (Some(oldest), Some(newest)) = (p.trail().oldest(), p.trail().newest()) {
        assert!(oldest.time <= newest.time);
    }
}

#[test]
fn positions_stay_finite_with_pointer_on_a_particle() {
    let mut e = engine(400);
    e.set_interaction_radius(10.0);
    let on_particle = e.particles()[3].mesh.position;
    e.set_pointer_3d(on_particle, true);
    e.set_scatter_amount(0.7);

    for frame in 0..600 {
        if frame == 200 {
            e.set_shape(Shape::Ring);
        }
        if frame == 400 {
            e.set_shape(Shape::Smiley);
        }
        e.tick(FrameInput {
            time: frame as f32 / 60.0,
            camera_position: Vec3::new(0.0, 0.0, 10.0),
        });
        for p in e.particles() {
            assert!(p.mesh.position.is_finite(), "frame {}: {:?}", frame, p.mesh);
            assert!(p.mesh.intensity.is_finite() && p.mesh.scale.is_finite());
        }
    }
}

#[test]
fn particles_settle_on_the_chosen_shape() {
    let mut s = scene(400);
    s.engine.set_shape(Shape::Thumbs);
    let mut clock = ManualScheduler::new();
    clock.run(&mut s, 400);
    for p in s.engine.particles() {
        assert!(p.mesh.position.distance(p.shape_target()) < 0.05);
    }
}

#[test]
fn pointer_moving_off_releases_particles() {
    let mut e = engine(400);
    e.set_shape(Shape::Ring);
    let still = |frame: usize| FrameInput {
        time: frame as f32 / 60.0,
        camera_position: Vec3::new(0.0, 0.0, 10.0),
    };
    for frame in 0..300 {
        e.tick(still(frame));
    }

    // Just inside the ring; the nearest ring particles are under 2 away.
    e.set_pointer_3d(Vec3::new(1.9, 0.0, 0.0), true);
    e.tick(still(300));
    let touched = e.particles().iter().filter(|p| p.is_interacting()).count();
    assert!(touched > 0);

    // Still flagged near, but nothing is within reach any more.
    e.set_pointer_3d(Vec3::new(0.0, 0.0, 20.0), true);
    e.tick(still(301));
    assert!(e.particles().iter().all(|p| !p.is_interacting()));

    e.set_pointer_3d(Vec3::new(1.9, 0.0, 0.0), true);
    e.tick(still(302));
    e.set_pointer_3d(Vec3::new(1.9, 0.0, 0.0), false);
    e.tick(still(303));
    assert!(e.particles().iter().all(|p| !p.is_interacting()));
}

#[test]
fn page_overrides_never_keep_the_sphere_off() {
    for json in [r#"{"sphereRadius": 0}"#, r#"{"scatterRadius": -1, "particleSize": 0}"#] {
        let config = SphereConfig::from_json(json).unwrap();
        let e: SphereEngine = SphereEngine::new(config, 1).unwrap();
        assert!(e.particles().iter().all(|p| p.original().is_finite()));
    }
}
