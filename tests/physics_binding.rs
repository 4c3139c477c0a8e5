//! Binding behaviour against a mocked solver and the sandbox.

use std::time::Duration;

use glam::{Quat, Vec3};
use mockall::mock;
use mockall::predicate::{always, eq};
use playfield::entity::{Entity, EntityId};
use playfield::physics::{
    apply_force, apply_impulse, attach, set_velocity, BodyDesc, BodyHandle, BodyState,
    ContactPair, PhysicsError, PhysicsWorld, RigidBody, SandboxWorld, ShapeKind,
};
use rstest::rstest;

mock! {
    pub World {}

    impl PhysicsWorld for World {
        fn supports(&self, shape: &ShapeKind) -> bool;
        fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;
        fn remove_body(&mut self, body: BodyHandle) -> bool;
        fn set_enabled(&mut self, body: BodyHandle, enabled: bool) -> Result<(), PhysicsError>;
        fn body(&self, body: BodyHandle) -> Option<BodyState>;
        fn set_transform(
            &mut self,
            body: BodyHandle,
            position: Vec3,
            rotation: Quat,
        ) -> Result<(), PhysicsError>;
        fn set_linear_velocity(
            &mut self,
            body: BodyHandle,
            velocity: Vec3,
        ) -> Result<(), PhysicsError>;
        fn set_angular_velocity(
            &mut self,
            body: BodyHandle,
            velocity: Vec3,
        ) -> Result<(), PhysicsError>;
        fn apply_impulse(
            &mut self,
            body: BodyHandle,
            impulse: Vec3,
            world_point: Vec3,
        ) -> Result<(), PhysicsError>;
        fn apply_force(
            &mut self,
            body: BodyHandle,
            force: Vec3,
            world_point: Vec3,
        ) -> Result<(), PhysicsError>;
        fn step(&mut self, dt: Duration);
        fn report_contacts(&self) -> Vec<ContactPair>;
    }
}

fn static_body() -> RigidBody {
    RigidBody {
        handle: BodyHandle(7),
        shape: ShapeKind::cube(1.0),
        mass: 0.0,
        friction: 0.5,
        restitution: 0.0,
    }
}

#[rstest]
fn unsupported_shape_leaves_entity_visual() {
    let mut world = MockWorld::new();
    world.expect_supports().return_const(false);
    world.expect_create_body().never();
    let mut entity = Entity::new(EntityId(1), "rock", Vec3::ZERO);
    let result = attach(
        &mut world,
        &mut entity,
        ShapeKind::Mesh {
            vertices: vec![Vec3::ONE],
        },
        1.0,
        0.5,
        0.0,
    );
    assert_eq!(result, Err(PhysicsError::InvalidShape { shape: "mesh" }));
    assert!(entity.body.is_none());
}

#[rstest]
fn attach_passes_the_entity_transform() {
    let mut world = MockWorld::new();
    world.expect_supports().return_const(true);
    world
        .expect_create_body()
        .withf(|desc| desc.position == Vec3::new(1.0, 2.0, 3.0) && desc.mass == 2.0)
        .times(1)
        .returning(|_| Ok(BodyHandle(42)));
    let mut entity = Entity::new(EntityId(1), "crate", Vec3::new(1.0, 2.0, 3.0));
    let body = attach(&mut world, &mut entity, ShapeKind::cube(1.0), 2.0, 0.5, 0.1)
        .expect("attach");
    assert_eq!(body.handle, BodyHandle(42));
    assert_eq!(entity.body, Some(body));
}

#[rstest]
fn static_bodies_never_reach_the_solver() {
    let mut world = MockWorld::new();
    world.expect_apply_impulse().never();
    world.expect_apply_force().never();
    let body = static_body();
    apply_impulse(&mut world, &body, Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO).expect("impulse");
    apply_force(&mut world, &body, Vec3::X, Vec3::ONE).expect("force");
}

#[rstest]
fn set_velocity_only_touches_given_components() {
    let mut world = MockWorld::new();
    world
        .expect_set_linear_velocity()
        .with(eq(BodyHandle(7)), eq(Vec3::X))
        .times(1)
        .returning(|_, _| Ok(()));
    world.expect_set_angular_velocity().never();
    set_velocity(&mut world, &static_body(), Some(Vec3::X), None).expect("velocity");
}

#[rstest]
fn solver_errors_propagate() {
    let mut world = MockWorld::new();
    world
        .expect_apply_impulse()
        .with(eq(BodyHandle(9)), always(), always())
        .returning(|body, _, _| Err(PhysicsError::UnknownBody(body)));
    let body = RigidBody {
        handle: BodyHandle(9),
        mass: 1.0,
        ..static_body()
    };
    assert_eq!(
        apply_impulse(&mut world, &body, Vec3::Z, Vec3::ZERO),
        Err(PhysicsError::UnknownBody(BodyHandle(9)))
    );
}

#[rstest]
#[case(Vec3::new(0.0, 1000.0, 0.0))]
#[case(Vec3::new(-5.0, 0.0, 3.0))]
#[case(Vec3::splat(1e6))]
#[case(Vec3::ZERO)]
fn static_bodies_stay_put_in_the_sandbox(#[case] push: Vec3) {
    let mut world = SandboxWorld::default();
    let mut entity = Entity::new(EntityId(1), "wall", Vec3::new(2.0, 0.0, 0.0));
    let body = attach(&mut world, &mut entity, ShapeKind::cube(1.0), 0.0, 0.5, 0.0)
        .expect("attach");
    for _ in 0..10 {
        apply_impulse(&mut world, &body, push, Vec3::new(2.5, 0.5, 0.0)).expect("impulse");
        apply_force(&mut world, &body, push, Vec3::ZERO).expect("force");
        world.step(Duration::from_millis(16));
    }
    let state = world.body(body.handle).expect("state");
    assert_eq!(state.position, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(state.linear_velocity, Vec3::ZERO);
}
