use std::time::Duration;

use glam::Vec2;
use gridswarm_core::{AgentId, CellCoord, Command, Event, SimulationConfig};
use gridswarm_system_collision::Collision;
use gridswarm_world::{self as world, query, World};
use proptest::prelude::*;

const RADIUS: f32 = 57.0;

fn config(density: u8, passes: u32) -> SimulationConfig {
    SimulationConfig {
        wall_density_percent: density,
        relaxation_passes: passes,
        ..SimulationConfig::default()
    }
}

fn spawn(world: &mut World, position: Vec2) -> AgentId {
    let agent = query::next_agent_id(world);
    let mut events = Vec::new();
    world::apply(world, Command::SpawnAgent { position }, &mut events);
    agent
}

/// Ticks the world once and applies the collision system's corrections.
fn resolve(world: &mut World) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
    let walls = query::wall_map(world);
    let mut collision = Collision::new(query::config(world));
    let mut commands = Vec::new();
    collision.handle(
        &events,
        &query::agent_view(world),
        query::spatial_index(world),
        |cell| walls.is_wall(cell),
        &mut commands,
    );
    for command in commands.clone() {
        world::apply(world, command, &mut events);
    }
    commands
}

fn position(world: &World, agent: AgentId) -> Vec2 {
    query::agent(world, agent).expect("agent exists").position
}

#[test]
fn close_pair_separates_to_full_diameter() {
    let mut world = World::new(config(0, 5));
    let first = spawn(&mut world, Vec2::new(50.0, 50.0));
    let second = spawn(&mut world, Vec2::new(60.0, 50.0));

    let _ = resolve(&mut world);

    let distance = position(&world, first).distance(position(&world, second));
    assert!(distance >= 2.0 * RADIUS - 1e-3, "distance {distance}");
}

#[test]
fn single_pass_strictly_increases_distance() {
    let mut world = World::new(config(0, 1));
    let first = spawn(&mut world, Vec2::new(50.0, 50.0));
    let second = spawn(&mut world, Vec2::new(53.0, 58.0));
    let before = position(&world, first).distance(position(&world, second));

    let _ = resolve(&mut world);

    let after = position(&world, first).distance(position(&world, second));
    assert!(after > before);
}

#[test]
fn selected_agent_is_displaced_less() {
    let mut world = World::new(config(0, 1));
    let leader = spawn(&mut world, Vec2::new(50.0, 50.0));
    let follower = spawn(&mut world, Vec2::new(150.0, 50.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetSelected {
            agent: leader,
            selected: true,
        },
        &mut events,
    );

    let _ = resolve(&mut world);

    assert!((position(&world, leader).x - 47.2).abs() < 1e-3);
    assert!((position(&world, follower).x - 161.2).abs() < 1e-3);
}

#[test]
fn relocation_keeps_spatial_index_in_step() {
    let mut world = World::new(config(0, 5));
    let first = spawn(&mut world, Vec2::new(95.0, 50.0));
    let second = spawn(&mut world, Vec2::new(105.0, 50.0));

    let commands = resolve(&mut world);

    assert_eq!(commands.len(), 2);
    for agent in [first, second] {
        let snapshot = query::agent(&world, agent).expect("agent exists");
        assert!(query::spatial_index(&world)
            .agents_in(snapshot.cell)
            .contains(&agent));
    }
    assert_eq!(query::spatial_index(&world).len(), 2);
}

#[test]
fn agent_near_wall_is_pushed_clear() {
    // Full density leaves only the protected block around the origin open.
    let mut world = World::new(config(100, 5));
    let agent = spawn(&mut world, Vec2::new(280.0, 50.0));

    let _ = resolve(&mut world);

    let position = position(&world, agent);
    assert!(position.x <= 300.0 - RADIUS + 1e-3, "x {}", position.x);
    assert_clear_of_walls(&world, position);
}

#[test]
fn untouched_agents_receive_no_commands() {
    let mut world = World::new(config(0, 5));
    let _ = spawn(&mut world, Vec2::new(0.0, 0.0));
    let _ = spawn(&mut world, Vec2::new(500.0, 0.0));

    assert!(resolve(&mut world).is_empty());
}

#[test]
fn tick_without_overlap_only_reports_time() {
    let mut world = World::new(config(0, 5));
    let _ = spawn(&mut world, Vec2::new(0.0, 0.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16)
        }]
    );
}

fn assert_clear_of_walls(world: &World, position: Vec2) {
    let walls = query::wall_map(world);
    let geometry = query::geometry(world);
    let center = geometry.cell_of(position);
    for dx in -1..=1 {
        for dy in -1..=1 {
            let cell: CellCoord = center.offset(dx, dy);
            if !walls.is_wall(cell) {
                continue;
            }
            let origin = geometry.cell_origin(cell);
            let closest = position.clamp(origin, origin + Vec2::splat(geometry.cell_size()));
            assert!(
                position.distance(closest) >= RADIUS - 1e-3,
                "{position:?} penetrates wall cell {cell:?}"
            );
        }
    }
}

#[test]
fn wall_push_out_ignores_separation_pass_count() {
    let corner = Vec2::new(290.0, 280.0);
    let settle = |passes| {
        let mut world = World::new(config(100, passes));
        let agent = spawn(&mut world, corner);
        let _ = resolve(&mut world);
        position(&world, agent)
    };

    let single = settle(1);
    assert_eq!(single, settle(5));
    // One sweep leaves the corner pushes partially cancelled.
    assert!((single.x - 243.0).abs() < 1e-3, "{single:?}");
    assert!(single.y > 250.0, "{single:?}");
}

#[test]
fn extra_wall_sweeps_settle_concave_corners() {
    let mut world = World::new(SimulationConfig {
        wall_sweeps: 5,
        ..config(100, 1)
    });
    let agent = spawn(&mut world, Vec2::new(290.0, 280.0));

    let _ = resolve(&mut world);

    let position = position(&world, agent);
    assert!(position.distance(Vec2::splat(243.0)) < 1e-3, "{position:?}");
    assert_clear_of_walls(&world, position);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lone_agent_in_protected_block_ends_clear_of_walls(
        x in -190.0f32..290.0,
        y in -190.0f32..290.0,
    ) {
        let mut world = World::new(SimulationConfig {
            wall_sweeps: 5,
            ..config(100, 5)
        });
        let agent = spawn(&mut world, Vec2::new(x, y));

        let _ = resolve(&mut world);

        let position = position(&world, agent);
        prop_assert!(position.is_finite());
        assert_clear_of_walls(&world, position);
    }
}
