//! Headless playfield demo driven by a JSON config.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use log::info;
use playfield::{
    init_logging, AssetLoader, ClipKind, LoadedModel, ManifestLoader, MemoryLoader, OrbitCamera,
    RawInput, SandboxWorld, Session, SessionConfig, ShapeKind, Templates, TickReport,
};

/// Headless playfield demo: scripted input against the sandbox solver.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// JSON session configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON model manifest; a built-in model is used when absent
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 240)]
    ticks: u64,
}

/// Input injected at fixed ticks.
fn scripted_input(tick: u64) -> Vec<RawInput> {
    let key = |code: &str| code.to_owned();
    match tick {
        1 => vec![RawInput::KeyDown(key("KeyW"))],
        10 => vec![RawInput::PointerDown(2)],
        11 => vec![RawInput::PointerUp(2)],
        60 => vec![RawInput::KeyDown(key("KeyA"))],
        90 => vec![RawInput::KeyUp(key("KeyA"))],
        120 => vec![RawInput::KeyUp(key("KeyW"))],
        150 => vec![RawInput::KeyDown(key("KeyE")), RawInput::KeyUp(key("KeyE"))],
        200 => vec![RawInput::KeyDown(key("Space")), RawInput::KeyUp(key("Space"))],
        _ => Vec::new(),
    }
}

fn build_scene(session: &mut Session) -> anyhow::Result<playfield::EntityId> {
    let ground = session.spawn("ground", Vec3::new(0.0, -0.5, 0.0));
    session.attach_body(
        ground,
        ShapeKind::Box {
            half_extents: Vec3::new(50.0, 0.5, 50.0),
        },
        0.0,
        0.8,
        0.3,
    )?;
    session.set_ground(ground)?;

    let ball = session.spawn_template("bowlingBall", Vec3::new(0.0, -10.0, 0.0));
    session.attach_body(ball, ShapeKind::ball(0.3), 1.0, 0.5, 0.5)?;
    let cannonball = session.spawn_template("cannonball", Vec3::new(0.0, -10.0, 0.0));
    session.attach_body(cannonball, ShapeKind::ball(0.5), 5.0, 0.5, 0.2)?;
    session.set_templates(Templates {
        throwable: Some(ball),
        shot: Some(cannonball),
    })?;

    let actor = session.spawn("actor", Vec3::ZERO);
    let goal = session.spawn("goal", Vec3::new(0.0, 0.0, 1.0));
    session.add_trigger_zone(goal, actor, Vec3::ONE)?;
    Ok(actor)
}

fn builtin_loader() -> MemoryLoader {
    let animations = ClipKind::ALL
        .iter()
        .map(|kind| kind.default_name().to_owned())
        .collect();
    MemoryLoader::new().with_model(
        "actor.glb",
        LoadedModel {
            meshes: vec!["actor".to_owned()],
            animations,
        },
    )
}

async fn activate<L: AssetLoader>(
    session: &mut Session,
    loader: &L,
    path: &str,
    actor: playfield::EntityId,
) -> anyhow::Result<()> {
    session
        .activate(loader, path, actor)
        .await
        .with_context(|| format!("activating actor from {path}"))
}

fn summarise(report: &TickReport) {
    for id in &report.fired {
        info!("tick {}: fired {id:?}", report.tick);
    }
    for id in &report.disposed {
        info!("tick {}: disposed {id:?}", report.tick);
    }
    for event in &report.triggers {
        info!("tick {}: {event:?}", report.tick);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let mut session = Session::new(
        config,
        Box::new(SandboxWorld::default()),
        Box::new(OrbitCamera::default()),
    );
    let actor = build_scene(&mut session)?;

    match &args.model {
        Some(path) => {
            let root = path.parent().map(PathBuf::from).unwrap_or_default();
            let file = path
                .file_name()
                .and_then(|f| f.to_str())
                .context("model path has no file name")?;
            activate(&mut session, &ManifestLoader::new(root), file, actor).await?;
        }
        None => activate(&mut session, &builtin_loader(), "actor.glb", actor).await?,
    }

    let dt = session.frame_delta();
    for tick in 1..=args.ticks {
        for raw in scripted_input(tick) {
            session.push_input(raw);
        }
        let report = session.tick(dt)?;
        summarise(&report);
    }

    let position = session.actor().map(|a| a.position).unwrap_or_default();
    info!(
        "finished {} ticks; actor at {position}, {} projectiles live",
        args.ticks,
        session.projectiles().live().len()
    );
    Ok(())
}
