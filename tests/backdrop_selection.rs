//! Capability-driven backdrop selection and scoped activation.

use backdrop::prelude::*;

fn seeded_config() -> BackdropConfig {
    let mut config = BackdropConfig::default();
    config.links.seed = Some(1);
    config.fallback.seed = Some(2);
    config
}

fn frame(n: u64) -> FrameTime {
    FrameTime {
        elapsed: n as f32 / 60.0,
        delta: 1.0 / 60.0,
        frame: n,
    }
}

#[test]
fn available_capability_selects_link_field() {
    let backdrop = select_backdrop(&seeded_config(), &Forced::available()).unwrap();
    assert_eq!(backdrop.name(), "link field");
    assert!(!backdrop.is_running());
}

#[test]
fn missing_capability_selects_static_field() {
    let probe = Forced(Err(CapabilityError::NoAdapter));
    let backdrop = select_backdrop(&seeded_config(), &probe).unwrap();
    assert_eq!(backdrop.name(), "static field");
}

#[test]
fn force_fallback_skips_probe() {
    let mut config = seeded_config();
    config.force_fallback = true;
    let backdrop = select_backdrop(&config, &Forced::available()).unwrap();
    assert_eq!(backdrop.name(), "static field");
}

#[test]
fn invalid_config_is_reported() {
    let mut config = seeded_config();
    config.links.particle_count = 0;
    let err = select_backdrop(&config, &Forced::available()).err().unwrap();
    assert!(matches!(err, ConfigError::NonPositive { field: "links.particle_count" }));
}

#[test]
fn both_backdrops_share_the_interface() {
    for probe in [Forced::available(), Forced::unavailable()] {
        let mut backdrop = select_backdrop(&seeded_config(), &probe).unwrap();
        assert!(backdrop.scene().is_empty());
        {
            let mut active = activate(&mut *backdrop);
            for n in 1..=10 {
                active.update(&frame(n));
            }
            assert!(!active.scene().points.is_empty());
        }
        assert!(!backdrop.is_running());
        assert!(backdrop.scene().is_empty());

        // Frames after teardown change nothing.
        backdrop.update(&frame(11));
        assert!(backdrop.scene().is_empty());
    }
}

#[test]
fn guard_stops_grid_trail() {
    let config = GridConfig {
        rows: 3,
        cols: 3,
        ..Default::default()
    };
    let mut grid = GridTrail::new(config, Region::new(0.0, 0.0, 300.0, 300.0)).unwrap();
    {
        let mut active = activate(&mut grid);
        active.on_pointer_move(10.0, 10.0);
        active.on_pointer_move(150.0, 150.0);
        assert_eq!(active.trail().len(), 2);
    }
    assert!(!grid.is_running());
    assert!(grid.trail().is_empty());
    assert!(!grid.on_pointer_move(10.0, 10.0));
}

#[test]
fn guard_stops_on_panic() {
    let mut field = LinkField::new(seeded_config().links).unwrap();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _active = activate(&mut field);
        panic!("host callback failed");
    }));
    assert!(result.is_err());
    assert!(!field.is_running());
}

#[test]
fn scene_vertices_cover_every_line() {
    let mut backdrop = select_backdrop(&seeded_config(), &Forced::available()).unwrap();
    let active = activate(&mut *backdrop);
    let scene = active.scene();
    assert_eq!(scene.line_vertices().len(), scene.lines.len() * 2);
    assert_eq!(scene.point_vertices().len(), scene.points.len());
}
