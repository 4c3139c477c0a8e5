//! Throwing, shooting and disposing projectiles.

use std::f32::consts::PI;
use std::time::Duration;

use glam::{Quat, Vec3};
use playfield::collision::CollisionBus;
use playfield::projectile::{ProjectileConfig, Shot, SpawnContext};
use playfield::{
    CollisionMode, EntityId, PhysicsWorld, ProjectileSpawner, SandboxWorld, Scene, SessionConfig,
    ShapeKind, SpawnPlacement, TickReport,
};
use rstest::rstest;
use test_utils::{assert_vec3_near, Rig};

fn first_fired(reports: &[TickReport]) -> Option<(u64, EntityId)> {
    reports
        .iter()
        .find_map(|r| r.fired.first().map(|id| (r.tick, *id)))
}

fn gentle_throws() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.projectiles.throw_impulse = 5.0;
    config
}

#[rstest]
#[case::facing_forward(0.0, Vec3::new(0.7, 1.0, 0.75))]
#[case::facing_back(PI, Vec3::new(-0.7, 1.0, -0.75))]
fn throw_spawns_at_handed_offset(#[case] yaw: f32, #[case] offset: Vec3) {
    let mut rig = Rig::new(SessionConfig::default());
    let actor = rig.actor;
    rig.session
        .scene_mut()
        .get_mut(actor)
        .expect("actor")
        .rotation = Quat::from_rotation_y(yaw);
    rig.click(2);
    let reports = rig.run(101);

    let (tick, projectile) = first_fired(&reports).expect("throw released");
    // Pressed on tick 1, released 1600 ms later at 16 ms per tick.
    assert_eq!(tick, 101);
    let placed = rig
        .session
        .scene()
        .get(projectile)
        .expect("projectile")
        .position;
    assert_vec3_near(placed, rig.actor_position() + offset, 1e-5);
}

#[rstest]
fn fire_presses_during_a_throw_are_ignored() {
    let mut rig = Rig::new(SessionConfig::default());
    rig.click(2);
    rig.run(10);
    rig.click(2);
    let reports = rig.run(200);
    let fired: usize = reports.iter().map(|r| r.fired.len()).sum();
    assert_eq!(fired, 1);
}

#[rstest]
fn shot_leaves_from_the_camera() {
    let mut rig = Rig::new(SessionConfig::default());
    let camera = rig.session.camera().position();
    let forward = rig.session.camera().forward_direction();
    rig.tap("KeyE");
    let report = rig.step();
    let shot = *report.fired.first().expect("shot fired");
    let entity = rig.session.scene().get(shot).expect("shot");
    assert_eq!(entity.position, camera);
    let body = rig
        .session
        .physics()
        .body(rig.session.scene().body_of(shot).expect("body"))
        .expect("state");
    assert_vec3_near(body.linear_velocity, forward * 1000.0, 1e-2);
}

#[rstest]
fn impulse_along_z_only_moves_along_z() {
    let mut world = SandboxWorld::new(Vec3::ZERO);
    let mut scene = Scene::new();
    let mut bus = CollisionBus::new();
    let template = scene.spawn_template("ball", Vec3::ZERO);
    scene
        .attach_body(&mut world, template, ShapeKind::ball(0.3), 1.0, 0.5, 0.5)
        .expect("template");
    let mut spawner = ProjectileSpawner::new(ProjectileConfig::default());
    let mut ctx = SpawnContext {
        scene: &mut scene,
        physics: &mut world,
        bus: &mut bus,
    };
    let id = spawner
        .fire(
            &mut ctx,
            template,
            &Shot {
                origin: Vec3::ZERO,
                origin_rotation: Quat::IDENTITY,
                direction: Vec3::Z,
                magnitude: 1000.0,
                placement: SpawnPlacement::AtOrigin,
            },
        )
        .expect("fire");
    let body = scene.body_of(id).expect("body");
    let velocity = world.body(body).expect("state").linear_velocity;
    assert!(velocity.z > 0.0);
    assert_eq!(velocity.x, 0.0);
    assert_eq!(velocity.y, 0.0);
}

#[rstest]
fn landing_projectile_is_disposed_exactly_once() {
    let mut rig = Rig::with_gravity(gentle_throws(), Vec3::new(0.0, -9.81, 0.0));
    rig.click(2);
    let mut reports = Vec::new();
    for _ in 0..500 {
        let report = rig.step();
        assert!(
            rig.session.projectiles().pending_timers() <= 1,
            "duplicate disposal timer at tick {}",
            report.tick
        );
        reports.push(report);
    }
    let (_, projectile) = first_fired(&reports).expect("thrown");
    let disposals = reports
        .iter()
        .flat_map(|r| r.disposed.iter())
        .filter(|id| **id == projectile)
        .count();
    assert_eq!(disposals, 1);
    assert!(!rig.session.scene().contains(projectile));
    assert!(rig.session.projectiles().live().is_empty());
}

#[rstest]
fn landing_starts_a_three_second_countdown() {
    let mut rig = Rig::with_gravity(gentle_throws(), Vec3::new(0.0, -9.81, 0.0));
    rig.click(2);
    let reports = rig.run(101);
    let (_, projectile) = first_fired(&reports).expect("thrown");
    let mut landed_at = None;
    let mut disposed_at = None;
    for _ in 0..400 {
        let report = rig.step();
        if landed_at.is_none() && rig.session.projectiles().disposal_pending(projectile) {
            landed_at = Some(report.tick);
        }
        if report.disposed.contains(&projectile) {
            disposed_at = Some(report.tick);
            break;
        }
    }
    let landed = landed_at.expect("projectile landed");
    let disposed = disposed_at.expect("projectile disposed");
    let elapsed = Duration::from_millis(16 * (disposed - landed));
    assert!(elapsed >= Duration::from_millis(3000), "disposed after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3016), "disposed after {elapsed:?}");
}

#[rstest]
fn manual_dispose_is_idempotent() {
    let mut rig = Rig::with_gravity(gentle_throws(), Vec3::new(0.0, -9.81, 0.0));
    rig.tap("KeyE");
    let shot = *rig.step().fired.first().expect("shot");
    assert!(rig.session.dispose(shot));
    assert!(!rig.session.dispose(shot));
    assert_eq!(rig.session.projectiles().pending_timers(), 0);
    let later: usize = rig.run(300).iter().map(|r| r.disposed.len()).sum();
    assert_eq!(later, 0);
}

#[rstest]
fn lifetime_disposes_projectiles_that_never_land() {
    let mut config = SessionConfig::default();
    config.projectiles.max_lifetime_ms = Some(160);
    let mut rig = Rig::new(config);
    rig.tap("KeyE");
    let shot = *rig.step().fired.first().expect("shot");
    let reports = rig.run(10);
    assert_eq!(reports[9].disposed, vec![shot]);
    assert!(rig.session.projectiles().live().is_empty());
}

#[rstest]
fn disposing_a_shot_drops_user_subscriptions() {
    let mut rig = Rig::new(SessionConfig::default());
    rig.tap("KeyE");
    let shot = *rig.step().fired.first().expect("shot");
    rig.session
        .on_collide(shot, &[rig.ground], |_, _| Ok(()), CollisionMode::Persistent)
        .expect("user subscription");
    assert_eq!(rig.session.subscriptions(), 2);

    assert!(rig.session.dispose(shot));
    assert_eq!(rig.session.subscriptions(), 0);
}

#[rstest]
fn expired_shot_drops_user_subscriptions() {
    let mut config = SessionConfig::default();
    config.projectiles.max_lifetime_ms = Some(160);
    let mut rig = Rig::new(config);
    rig.tap("KeyE");
    let shot = *rig.step().fired.first().expect("shot");
    rig.session
        .on_collide(shot, &[rig.ground], |_, _| Ok(()), CollisionMode::OneShot)
        .expect("user subscription");

    let disposed: Vec<EntityId> = rig.run(10).into_iter().flat_map(|r| r.disposed).collect();
    assert_eq!(disposed, vec![shot]);
    assert_eq!(rig.session.subscriptions(), 0);
}
