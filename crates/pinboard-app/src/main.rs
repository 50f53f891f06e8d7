//! Headless Pinboard host.
//!
//! Opens the saved scene, applies one command through the same creation and
//! gesture entry points an interactive host uses, and saves the result.

use clap::{Parser, Subcommand};
use kurbo::{Point, Size, Vec2};
use pinboard_core::handles::{self, HEADER_HEIGHT};
use pinboard_core::storage::FileStorage;
use pinboard_core::{
    Direction, HitTarget, ImageSource, ObjectId, Payload, PointerEvent, Scene, SceneConfig, SceneObject,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("config: {0}")]
    Config(#[from] pinboard_core::ConfigError),
    #[error("storage: {0}")]
    Storage(#[from] pinboard_core::StorageError),
    #[error("image: {0}")]
    Ingest(#[from] pinboard_core::IngestError),
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no object {0}")]
    UnknownObject(ObjectId),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Parser, Debug)]
#[command(name = "pinboard", about = "Pinboard scene manager")]
struct Cli {
    /// Directory holding saved scenes (defaults to the platform data dir)
    #[arg(long, env = "PINBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON scene config
    #[arg(long, env = "PINBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Viewport size as WIDTHxHEIGHT, overriding the config
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<Size>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a sticky note
    Note {
        #[arg(long)]
        text: Option<String>,
    },
    /// Add a video player
    Video { url: String },
    /// Add one or more images
    Image {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List objects in rendering order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Drag an object by its header
    Move { id: ObjectId, dx: f64, dy: f64 },
    /// Resize an object from one of its handles (n, ne, e, se, s, sw, w, nw)
    Resize {
        id: ObjectId,
        direction: Direction,
        dx: f64,
        dy: f64,
    },
    /// Raise an object above all others
    Front { id: ObjectId },
    /// Replace a note's text
    Edit { id: ObjectId, text: String },
    /// Delete an object
    Close { id: ObjectId },
    /// Feed a JSON array of pointer events
    Replay { events: PathBuf },
}

fn parse_viewport(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: f64 = w.trim().parse().map_err(|e| format!("bad width: {}", e))?;
    let height: f64 = h.trim().parse().map_err(|e| format!("bad height: {}", e))?;
    if width <= 0.0 || height <= 0.0 {
        return Err("viewport must be positive".to_string());
    }
    Ok(Size::new(width, height))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match pollster::block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(viewport) = cli.viewport {
        config.viewport = viewport;
    }

    let storage = match cli.data_dir {
        Some(dir) => Arc::new(FileStorage::new(dir)?),
        None => pinboard_core::storage::create_default_storage()?,
    };
    log::debug!("Using storage at {}", storage.base_path().display());

    let mut scene = Scene::open(config, storage).await;
    let result = apply(&mut scene, cli.command).await;

    if let Some(save) = scene.take_save() {
        if !save.await {
            log::warn!("Scene changes were not saved");
        }
    }
    result
}

async fn apply(scene: &mut Scene<FileStorage>, command: Command) -> Result<(), AppError> {
    match command {
        Command::Note { text } => {
            let id = scene.add_note();
            if let Some(text) = text {
                scene.edit_note(id, text);
            }
            println!("{}", id);
        }
        Command::Video { url } => {
            let id = scene
                .add_video(&url)
                .ok_or_else(|| AppError::Rejected(format!("not a video URL: {}", url)))?;
            println!("{}", id);
        }
        Command::Image { paths } => {
            let mut sources = Vec::with_capacity(paths.len());
            for path in &paths {
                sources.push(ImageSource::from_path(path)?);
            }
            for task in scene.ingest(sources) {
                task.await;
            }
            let placed = scene.drain_pending_images();
            for id in &placed {
                println!("{}", id);
            }
            if placed.len() < paths.len() {
                log::warn!("{} of {} images were not added", paths.len() - placed.len(), paths.len());
            }
        }
        Command::List { json } => {
            if json {
                println!("{}", scene.store().snapshot().to_json()?);
            } else {
                for object in scene.objects() {
                    println!("{}", describe(object));
                }
            }
        }
        Command::Move { id, dx, dy } => {
            let object = lookup(scene, id)?;
            let header =
                object.position + Vec2::new(object.size.width / 2.0, HEADER_HEIGHT.min(object.size.height) / 2.0);
            drive(scene, id, HitTarget::Header, header, Vec2::new(dx, dy))?;
            println!("{}", describe(current(scene, id)?));
        }
        Command::Resize { id, direction, dx, dy } => {
            let object = lookup(scene, id)?;
            let handle = handles::handles(object.bounds())
                .into_iter()
                .find(|h| h.direction == direction)
                .map(|h| h.rect.center())
                .ok_or_else(|| AppError::Rejected(format!("no {} handle", direction)))?;
            drive(scene, id, HitTarget::Handle(direction), handle, Vec2::new(dx, dy))?;
            println!("{}", describe(current(scene, id)?));
        }
        Command::Front { id } => {
            let z_rank = scene.bring_to_front(id).ok_or(AppError::UnknownObject(id))?;
            println!("{} z={}", id, z_rank);
        }
        Command::Edit { id, text } => {
            if !scene.edit_note(id, text) {
                return Err(AppError::Rejected(format!("{} is not a note", id)));
            }
        }
        Command::Close { id } => {
            if !scene.close(id) {
                log::info!("{} was already gone", id);
            }
        }
        Command::Replay { events } => {
            let json = std::fs::read_to_string(&events).map_err(|e| AppError::Read {
                path: events.clone(),
                message: e.to_string(),
            })?;
            let events: Vec<PointerEvent> = serde_json::from_str(&json)?;
            let changed = events.iter().filter(|event| scene.handle_pointer_event(event)).count();
            log::info!("Replayed {} events, {} changed the scene", events.len(), changed);
            // A replay that stops mid-gesture behaves like a lost window.
            scene.focus_lost();
        }
    }
    Ok(())
}

/// Press, move and release through the gesture protocol.
fn drive(
    scene: &mut Scene<FileStorage>,
    id: ObjectId,
    target: HitTarget,
    start: Point,
    delta: Vec2,
) -> Result<(), AppError> {
    if !scene.pointer_down_on(id, target, start) {
        return Err(AppError::Rejected(format!("could not start gesture on {}", id)));
    }
    scene.pointer_move(start + delta);
    scene.pointer_up();
    Ok(())
}

fn lookup(scene: &Scene<FileStorage>, id: ObjectId) -> Result<SceneObject, AppError> {
    scene.get(id).cloned().ok_or(AppError::UnknownObject(id))
}

fn current(scene: &Scene<FileStorage>, id: ObjectId) -> Result<&SceneObject, AppError> {
    scene.get(id).ok_or(AppError::UnknownObject(id))
}

fn describe(object: &SceneObject) -> String {
    let content = match &object.payload {
        Payload::Note(note) => format!("{:?}", note.text),
        Payload::Video(video) => video.embed_url(),
        Payload::Image(image) => format!("{} bytes", image.data_size()),
    };
    format!(
        "{} {:<5} x={:.1} y={:.1} w={:.1} h={:.1} z={} {}",
        object.id(),
        object.kind().label(),
        object.position.x,
        object.position.y,
        object.size.width,
        object.size.height,
        object.z_rank,
        content
    )
}
