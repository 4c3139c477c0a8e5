//! Activating a session from loaded models.

use std::time::Duration;

use glam::Vec3;
use playfield::animation::{AnimationError, ClipSpec};
use playfield::{
    AssetLoadError, ClipKind, EntityId, LoadedModel, MemoryLoader, OrbitCamera, SandboxWorld,
    Session, SessionConfig, SessionError, ShapeKind,
};
use rstest::rstest;
use test_utils::{full_model, model_loader, Rig, MODEL_PATH};

fn bare_session(config: SessionConfig) -> (Session, EntityId) {
    let mut session = Session::new(
        config,
        Box::new(SandboxWorld::new(Vec3::ZERO)),
        Box::new(OrbitCamera::default()),
    );
    let actor = session.spawn("actor", Vec3::ZERO);
    (session, actor)
}

#[rstest]
fn tick_before_activation_is_refused() {
    let (mut session, _) = bare_session(SessionConfig::default());
    assert!(!session.is_ready());
    let result = session.tick(Duration::from_millis(16));
    assert!(matches!(result, Err(SessionError::NotReady)));
}

#[tokio::test]
async fn missing_clip_keeps_session_idle() {
    let (mut session, actor) = bare_session(SessionConfig::default());
    let mut model = full_model();
    model.animations.retain(|name| name != "throw");
    let loader = MemoryLoader::new().with_model(MODEL_PATH, model);

    let err = session
        .activate(&loader, MODEL_PATH, actor)
        .await
        .expect_err("throw clip is required");
    assert!(matches!(
        err,
        SessionError::Animation(AnimationError::MissingClip {
            kind: ClipKind::Throw,
            ..
        })
    ));
    assert!(!session.is_ready());
}

#[tokio::test]
async fn renamed_clips_resolve_through_config() {
    let renamed = ClipSpec {
        name: "breathe".to_owned(),
        rate: 0.5,
    };
    let (mut session, actor) = bare_session(SessionConfig {
        animations: [(ClipKind::Idle, renamed)].into_iter().collect(),
        ..SessionConfig::default()
    });
    let mut model = full_model();
    model.animations.retain(|name| name != "idle");
    model.animations.push("breathe".to_owned());
    let loader = MemoryLoader::new().with_model(MODEL_PATH, model);

    session
        .activate(&loader, MODEL_PATH, actor)
        .await
        .expect("renamed idle clip");
    assert!(session.is_ready());
}

#[tokio::test]
async fn unknown_actor_is_rejected() {
    let (mut session, _) = bare_session(SessionConfig::default());
    let err = session
        .activate(&model_loader(), MODEL_PATH, EntityId(999))
        .await
        .expect_err("no such actor");
    assert!(matches!(err, SessionError::UnknownEntity(EntityId(999))));
}

#[tokio::test]
async fn unknown_model_surfaces_loader_error() {
    let (mut session, actor) = bare_session(SessionConfig::default());
    let err = session
        .activate(&MemoryLoader::new(), "ghost.glb", actor)
        .await
        .expect_err("nothing to load");
    assert!(matches!(
        err,
        SessionError::Asset(AssetLoadError::NotFound(ref path)) if path == "ghost.glb"
    ));
    assert!(!session.is_ready());
}

#[tokio::test]
async fn activation_ignores_extra_clips() {
    let (mut session, actor) = bare_session(SessionConfig::default());
    let mut model = full_model();
    model.animations.push("wave".to_owned());
    let loader = MemoryLoader::new().with_model(
        MODEL_PATH,
        LoadedModel {
            meshes: Vec::new(),
            ..model
        },
    );
    session
        .activate(&loader, MODEL_PATH, actor)
        .await
        .expect("extra clips are fine");
    let report = session.tick(Duration::from_millis(16)).expect("tick");
    assert_eq!(report.tick, 1);
}

#[rstest]
fn jump_pushes_an_embodied_actor_upwards() {
    let mut rig = Rig::new(SessionConfig::default());
    let actor = rig.actor;
    rig.session
        .scene_mut()
        .get_mut(actor)
        .expect("actor")
        .position
        .y = 0.5;
    rig.session
        .attach_body(actor, ShapeKind::cube(1.0), 1.0, 0.5, 0.0)
        .expect("actor body");

    rig.tap("Space");
    rig.step();

    let body = rig.session.scene().body_of(actor).expect("body");
    let state = rig.session.physics().body(body).expect("state");
    let impulse = rig.session.config().locomotion.jump_impulse;
    assert!((state.linear_velocity.y - impulse).abs() < 1e-4);
}
