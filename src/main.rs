//! Ghostcore headless runner.
//!
//! Loads a simulation config, a tile map and an entity layout (or the
//! built-in demo level), then runs the fixed-timestep pipeline for a number
//! of frames without rendering, logging what happens.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --frames 600 --hold right
//! cargo run -- --config sim.ini --map level.json --entities layout.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::{error, info};

use ghostcore::components::state::Blackboard;
use ghostcore::components::vectors::Position;
use ghostcore::ecs::entity::EntityId;
use ghostcore::ecs::world::World;
use ghostcore::error::SimError;
use ghostcore::events::bus::Handler;
use ghostcore::events::input::Key;
use ghostcore::events::{Event, EventKind};
use ghostcore::level;
use ghostcore::prefab::{LevelLayout, spawn_layout};
use ghostcore::resources::simconfig::SimConfig;
use ghostcore::resources::tilemap::{GridTileMap, TileMap};
use ghostcore::session::Session;
use ghostcore::systems::default_pipeline;

#[derive(Parser)]
#[command(version, about = "Headless runner for the ghostcore tile simulation")]
struct Cli {
    /// INI file with [simulation] and [map] sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON tile map; overrides the config's map path.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,

    /// JSON entity layout; the demo level is used when absent.
    #[arg(long, value_name = "PATH")]
    entities: Option<PathBuf>,

    /// Frames to simulate (one timestep of wall time each).
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Override the fixed simulation rate.
    #[arg(long, value_name = "HZ")]
    timestep_hz: Option<u32>,

    /// Override the time scale.
    #[arg(long)]
    time_scale: Option<f32>,

    /// Keys held down from the first frame (left, right, up, down, interact).
    #[arg(long, value_name = "KEY", value_parser = parse_key)]
    hold: Vec<Key>,
}

fn parse_key(name: &str) -> Result<Key, String> {
    match name.to_ascii_lowercase().as_str() {
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        "interact" => Ok(Key::Interact),
        "enter" => Ok(Key::Enter),
        "exit" => Ok(Key::Exit),
        other => Err(format!("unknown key '{other}'")),
    }
}

fn log_sound(
    _world: &mut World,
    _owner: Option<EntityId>,
    event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    if let Event::Sound { code } = event {
        info!("sound: {code}");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig, SimError> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load_from_file(path)?,
        None => SimConfig::new(),
    };
    if let Some(hz) = cli.timestep_hz {
        config.timestep_hz = hz;
    }
    if let Some(scale) = cli.time_scale {
        config.time_scale = scale;
    }
    if let Some(map) = &cli.map {
        config.map_path = Some(map.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_session(cli: &Cli, config: &SimConfig) -> Result<Session, SimError> {
    let map: Rc<dyn TileMap> = match &config.map_path {
        Some(path) => Rc::new(GridTileMap::load_from_file(path)?),
        None => Rc::new(level::demo_map()?),
    };

    let mut world = World::new();
    world.on(EventKind::Sound, Handler::new(log_sound));
    match &cli.entities {
        Some(path) => {
            level::register_world_handlers(&mut world);
            spawn_layout(&mut world, &LevelLayout::load_from_file(path)?)?;
        }
        None => {
            level::populate_demo(&mut world)?;
        }
    }

    Session::new(world, default_pipeline(map)?, config)
}

fn run(cli: Cli) -> Result<(), SimError> {
    let config = load_config(&cli)?;
    let mut session = build_session(&cli, &config)?;

    for key in cli.hold.iter() {
        session.post_input(Event::KeyDown { key: *key });
    }

    let wall_dt = config.timestep();
    let mut passes = 0;
    for frame in 0..cli.frames {
        passes += session.advance(wall_dt)?;
        if let Some(scene) = session.take_transition() {
            info!("Frame {frame}: transition to '{scene}', stopping");
            break;
        }
    }

    let world = session.world();
    info!(
        "Ran {passes} passes, {:.2}s simulated, {} entities alive",
        session.time().elapsed,
        world.entity_count()
    );
    for player in world.group_members(level::PLAYER) {
        if let Some(position) = world.try_get::<Position>(player) {
            info!("Player {player} at ({:.1}, {:.1})", position.0.x, position.0.y);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
