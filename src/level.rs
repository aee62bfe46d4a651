//! Built-in demo level.
//!
//! A two-floor building: the ghost starts downstairs, a terminal waits to be
//! hacked, a plant offers cover and two guards patrol. It wires together
//! everything the core offers (scripts, entity and world handlers,
//! interactables, radar, groups) and is what the binary runs when no layout
//! file is given.
//!
//! Rules:
//! - Interacting with a terminal hacks it.
//! - Interacting with cover toggles hiding; a hiding ghost cannot move and
//!   cannot be seen.
//! - Up/Down while touching stairs moves the ghost to the nearest stairs
//!   above/below in the same column.
//! - A guard that sees the ghost in front of it becomes surprised, then
//!   alert, then shoots (game over).
//! - Touching the exit door with every terminal hacked lets the ghost out
//!   past the right edge of the map.
//! - The ghost leaving through the right edge with every terminal hacked
//!   completes the level.

use glam::Vec2;
use log::{debug, info};

use crate::components::animation::Animation;
use crate::components::camera::Camera;
use crate::components::collidable::Collidable;
use crate::components::drawable::Drawable;
use crate::components::eventhandler::{EventHandler, Interactable};
use crate::components::facing::Facing;
use crate::components::playerinput::PlayerInput;
use crate::components::radar::Radar;
use crate::components::script::Script;
use crate::components::state::{Blackboard, State};
use crate::components::vectors::{Acceleration, Dimension, Position, TargetVelocity, Velocity};
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::bus::Handler;
use crate::events::collision::{CollisionEvent, Edge};
use crate::events::input::Key;
use crate::events::{Event, EventKind};
use crate::resources::tilemap::GridTileMap;

pub const PLAYER: &str = "player";
pub const TERMINAL: &str = "terminal";
pub const HIDABLE: &str = "hidable";
pub const LIFT: &str = "lift";
pub const EXIT: &str = "exit";

pub const GAME_OVER: &str = "game_over";
pub const LEVEL_COMPLETE: &str = "level_complete";
pub const QUIT: &str = "quit";

/// 80x64 pixels of building, two floors.
pub fn demo_map() -> Result<GridTileMap, SimError> {
    GridTileMap::from_rows(
        &[
            "..........",
            "..........",
            "..........",
            "##########",
            "..........",
            "..........",
            "..........",
            "##########",
        ],
        (8, 8),
    )
}

/// Populate `world` with the demo level and return the ghost.
pub fn populate_demo(world: &mut World) -> Result<EntityId, SimError> {
    register_world_handlers(world);

    let ghost = spawn_ghost(world, Vec2::new(8.0, 43.0))?;
    spawn_guard(world, Vec2::new(8.0, 9.0), 0.0, 5.0)?;
    spawn_guard(world, Vec2::new(50.0, 9.0), 2.0, 5.0)?;
    spawn_stairs(world, Vec2::new(60.0, 43.0))?;
    spawn_stairs(world, Vec2::new(60.0, 11.0))?;
    spawn_cover(world, Vec2::new(38.0, 43.0), "plant")?;
    spawn_terminal(world, Vec2::new(16.0, 15.0))?;
    spawn_exit(world, Vec2::new(72.0, 11.0), Vec2::new(88.0, 11.0))?;

    let camera = world.create_entity();
    world.attach(camera, Position::default())?;
    world.attach(camera, Camera::follow(Vec2::new(64.0, 64.0)))?;

    info!("Demo level ready: {} entities", world.entity_count());
    Ok(ghost)
}

pub fn register_world_handlers(world: &mut World) {
    world.on(EventKind::Quit, Handler::new(on_quit));
    world.on(EventKind::KeyDown, Handler::new(on_quit));
    world.on(EventKind::GameOver, Handler::new(on_game_over));
    world.on(EventKind::LevelComplete, Handler::new(on_level_complete));
    world.on(EventKind::Offscreen, Handler::new(on_offscreen));
    world.on(EventKind::Collision, Handler::new(on_exit_reached));
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

pub fn spawn_ghost(world: &mut World, position: Vec2) -> Result<EntityId, SimError> {
    let ghost = world.create_entity();
    world.attach(ghost, Position(position))?;
    world.attach(ghost, Dimension::new(4.0, 12.0))?;
    world.attach(ghost, Velocity::default())?;
    world.attach(ghost, Acceleration::new(2.0, 0.0))?;
    world.attach(ghost, TargetVelocity::default())?;
    world.attach(ghost, Drawable::new("ghost.png", 1).with_offset(Vec2::new(-1.0, 0.0)))?;
    world.attach(ghost, Animation::new(14.0, 8))?;
    world.attach(ghost, Collidable::new())?;
    world.attach(ghost, PlayerInput::default())?;
    world.attach(ghost, Facing::Right)?;
    world.attach(
        ghost,
        State::new(Blackboard::new().with("hiding", false)),
    )?;
    world.attach(
        ghost,
        EventHandler::new().with(EventKind::KeyDown, Handler::new(take_stairs)),
    )?;
    world.add_to_group(PLAYER, ghost)?;
    Ok(ghost)
}

pub fn spawn_guard(
    world: &mut World,
    position: Vec2,
    time_offset: f32,
    cycle_time: f32,
) -> Result<EntityId, SimError> {
    let guard = world.create_entity();
    world.attach(guard, Position(position))?;
    world.attach(guard, Dimension::new(4.0, 14.0))?;
    world.attach(guard, Velocity::default())?;
    world.attach(guard, Facing::Right)?;
    world.attach(guard, Radar::new([PLAYER]))?;
    world.attach(guard, Drawable::new(GuardMode::Patrol.sprite(), 1))?;
    world.attach(guard, Collidable::new())?;
    world.attach(
        guard,
        State::new(
            Blackboard::new()
                .with("mode", GuardMode::Patrol.name())
                .with("mode_time", time_offset),
        ),
    )?;
    world.attach(
        guard,
        Script::new().with(guard_script, Blackboard::new().with("cycle_time", cycle_time)),
    )?;
    world.add_to_group("guard", guard)?;
    Ok(guard)
}

pub fn spawn_stairs(world: &mut World, position: Vec2) -> Result<EntityId, SimError> {
    let stairs = world.create_entity();
    world.attach(stairs, Position(position))?;
    world.attach(stairs, Dimension::new(6.0, 12.0))?;
    world.attach(stairs, Drawable::new("stairs.png", 0).with_offset(Vec2::new(-1.0, -1.0)))?;
    world.attach(stairs, Collidable::new())?;
    world.add_to_group(LIFT, stairs)?;
    Ok(stairs)
}

/// Something to hide in; `kind` picks the sprite and the extra group.
pub fn spawn_cover(world: &mut World, position: Vec2, kind: &str) -> Result<EntityId, SimError> {
    let cover = world.create_entity();
    world.attach(cover, Position(position))?;
    world.attach(cover, Dimension::new(10.0, 12.0))?;
    world.attach(cover, Drawable::new(format!("{kind}.png"), 0))?;
    world.attach(cover, Collidable::new())?;
    world.attach(
        cover,
        Interactable::new(Handler::with_context(
            toggle_hiding,
            Blackboard::new()
                .with("empty", format!("{kind}.png"))
                .with("occupied", format!("{kind}_hiding.png")),
        )),
    )?;
    world.attach(cover, State::new(Blackboard::new().with("occupied", false)))?;
    world.add_to_group(HIDABLE, cover)?;
    world.add_to_group(kind, cover)?;
    Ok(cover)
}

pub fn spawn_terminal(world: &mut World, position: Vec2) -> Result<EntityId, SimError> {
    let terminal = world.create_entity();
    world.attach(terminal, Position(position))?;
    world.attach(terminal, Dimension::new(4.0, 8.0))?;
    world.attach(terminal, Drawable::new("terminal.png", 0))?;
    world.attach(terminal, Collidable::new())?;
    world.attach(terminal, State::new(Blackboard::new().with("hacked", false)))?;
    world.attach(terminal, Interactable::new(Handler::new(hack_terminal)))?;
    world.add_to_group(TERMINAL, terminal)?;
    Ok(terminal)
}

/// A door that, once every terminal is hacked, puts the ghost at `outside`.
/// The map is closed, so `outside` must lie more than a tile past an edge for
/// the crossing to register.
pub fn spawn_exit(world: &mut World, position: Vec2, outside: Vec2) -> Result<EntityId, SimError> {
    let exit = world.create_entity();
    world.attach(exit, Position(position))?;
    world.attach(exit, Dimension::new(4.0, 12.0))?;
    world.attach(exit, Collidable::new())?;
    world.attach(exit, State::new(Blackboard::new().with("outside", outside)))?;
    world.add_to_group(EXIT, exit)?;
    Ok(exit)
}

// ---------------------------------------------------------------------------
// World handlers
// ---------------------------------------------------------------------------

fn on_quit(
    world: &mut World,
    _owner: Option<EntityId>,
    event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    if matches!(event, Event::Quit | Event::KeyDown { key: Key::Exit }) {
        world.request_transition(QUIT);
    }
    Ok(())
}

fn on_game_over(
    world: &mut World,
    _owner: Option<EntityId>,
    _event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    info!("Game over");
    world.request_transition(GAME_OVER);
    Ok(())
}

fn on_level_complete(
    world: &mut World,
    _owner: Option<EntityId>,
    _event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    info!("Level complete");
    world.request_transition(LEVEL_COMPLETE);
    Ok(())
}

/// `true` once every terminal in the level is hacked.
pub fn all_terminals_hacked(world: &World) -> bool {
    world.groups().get(TERMINAL).iter().all(|&terminal| {
        world
            .try_get::<State>(terminal)
            .and_then(|state| state.get_bool("hacked"))
            .unwrap_or(false)
    })
}

fn on_offscreen(
    world: &mut World,
    _owner: Option<EntityId>,
    event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    if let Event::Offscreen { entity, edge: Edge::Right } = *event {
        if world.in_group(entity, PLAYER) && all_terminals_hacked(world) {
            world.post(Event::LevelComplete);
        }
    }
    Ok(())
}

fn on_exit_reached(
    world: &mut World,
    _owner: Option<EntityId>,
    event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    let Event::Collision(CollisionEvent::Entity { a, b }) = *event else {
        return Ok(());
    };
    let (ghost, exit) = if world.in_group(a, PLAYER) && world.in_group(b, EXIT) {
        (a, b)
    } else if world.in_group(b, PLAYER) && world.in_group(a, EXIT) {
        (b, a)
    } else {
        return Ok(());
    };
    if !all_terminals_hacked(world) {
        return Ok(());
    }
    if let Some(outside) = world.get::<State>(exit)?.get_vec2("outside") {
        debug!("exit {exit} lets {ghost} out to {outside}");
        world.get_mut::<Position>(ghost)?.0 = outside;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entity handlers
// ---------------------------------------------------------------------------

fn hack_terminal(
    world: &mut World,
    owner: Option<EntityId>,
    _event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    let Some(terminal) = owner else {
        return Ok(());
    };
    let state = world.get_mut::<State>(terminal)?;
    if state.get_bool("hacked") == Some(true) {
        return Ok(());
    }
    state.set("hacked", true);
    world.get_mut::<Drawable>(terminal)?.set_sprite("terminalwin.png");
    world.post(Event::sound("terminal"));
    info!("terminal {terminal} hacked");
    Ok(())
}

fn toggle_hiding(
    world: &mut World,
    owner: Option<EntityId>,
    event: &Event,
    context: &Blackboard,
) -> Result<(), SimError> {
    let (Some(cover), Event::Interact { actor, .. }) = (owner, event) else {
        return Ok(());
    };
    let actor = *actor;
    let hiding = !world
        .get::<State>(actor)?
        .get_bool("hiding")
        .unwrap_or(false);

    world.get_mut::<State>(actor)?.set("hiding", hiding);
    world.get_mut::<State>(cover)?.set("occupied", hiding);
    if let Some(player) = world.try_get_mut::<PlayerInput>(actor) {
        player.enabled = !hiding;
    }
    if let Some(drawable) = world.try_get_mut::<Drawable>(actor) {
        drawable.layer = if hiding { -1 } else { 1 };
    }
    let sprite = if hiding {
        context.get_text("occupied")
    } else {
        context.get_text("empty")
    };
    if let Some(sprite) = sprite {
        world.get_mut::<Drawable>(cover)?.set_sprite(sprite);
    }
    Ok(())
}

/// Stairs in the same column as `from`, nearest first, strictly above
/// (`up`) or below.
fn next_stairs(world: &World, from: EntityId, up: bool) -> Option<Vec2> {
    let origin = world.try_get::<Position>(from)?.0;
    world
        .groups()
        .get(LIFT)
        .iter()
        .filter(|&&lift| lift != from)
        .filter_map(|&lift| world.try_get::<Position>(lift).map(|p| p.0))
        .filter(|p| p.x == origin.x && if up { p.y < origin.y } else { p.y > origin.y })
        .min_by(|a, b| {
            (a.y - origin.y)
                .abs()
                .total_cmp(&(b.y - origin.y).abs())
        })
}

fn take_stairs(
    world: &mut World,
    owner: Option<EntityId>,
    event: &Event,
    _context: &Blackboard,
) -> Result<(), SimError> {
    let (Some(ghost), Event::KeyDown { key }) = (owner, event) else {
        return Ok(());
    };
    let up = match key {
        Key::Up => true,
        Key::Down => false,
        _ => return Ok(()),
    };
    if !world.get::<PlayerInput>(ghost)?.enabled {
        return Ok(());
    }
    let lifts: Vec<EntityId> = world
        .get::<Collidable>(ghost)?
        .collision_set
        .iter()
        .copied()
        .filter(|other| world.in_group(*other, LIFT))
        .collect();
    for lift in lifts {
        if let Some(target) = next_stairs(world, lift, up) {
            world.get_mut::<Position>(ghost)?.0 = target;
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Guard behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    Patrol,
    Surprised,
    Alert,
}

impl GuardMode {
    pub fn name(self) -> &'static str {
        match self {
            GuardMode::Patrol => "patrol",
            GuardMode::Surprised => "surprised",
            GuardMode::Alert => "alert",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "patrol" => Some(GuardMode::Patrol),
            "surprised" => Some(GuardMode::Surprised),
            "alert" => Some(GuardMode::Alert),
            _ => None,
        }
    }

    fn sprite(self) -> &'static str {
        match self {
            GuardMode::Patrol => "guard.png",
            GuardMode::Surprised => "guard_surprised.png",
            GuardMode::Alert => "guard_alert.png",
        }
    }
}

const SURPRISE_TIME: f32 = 0.6;
const AIM_TIME: f32 = 0.4;

/// The first player pinged by the guard's radar is in front of it, in line
/// of sight and not hiding.
fn guard_sees_player(world: &World, guard: EntityId) -> Result<bool, SimError> {
    let Some(ping) = world.get::<Radar>(guard)?.pings(PLAYER).first().copied() else {
        return Ok(false);
    };
    let hiding = world
        .try_get::<State>(ping.entity)
        .and_then(|s| s.get_bool("hiding"))
        .unwrap_or(false);
    let in_front = match world.get::<Facing>(guard)? {
        Facing::Right => ping.distance.x >= 0.0,
        Facing::Left => ping.distance.x < 0.0,
    };
    Ok(ping.visible && in_front && !hiding)
}

fn guard_script(
    world: &mut World,
    guard: EntityId,
    dt: f32,
    context: &Blackboard,
) -> Result<(), SimError> {
    let cycle_time = context.get_float("cycle_time").unwrap_or(5.0) as f32;
    let state = world.get::<State>(guard)?;
    let mut mode = state
        .get_text("mode")
        .and_then(GuardMode::from_name)
        .unwrap_or(GuardMode::Patrol);
    let mut mode_time = state.get_float("mode_time").unwrap_or(0.0) as f32 + dt;

    if mode == GuardMode::Patrol && mode_time > cycle_time {
        mode_time = 0.0;
        let facing = world.get_mut::<Facing>(guard)?;
        *facing = facing.flipped();
    }
    let sees = guard_sees_player(world, guard)?;

    let mut fire = false;
    match mode {
        GuardMode::Patrol => {
            if sees {
                mode = GuardMode::Surprised;
                mode_time = 0.0;
            }
        }
        GuardMode::Surprised => {
            if mode_time > SURPRISE_TIME {
                if sees {
                    mode = GuardMode::Alert;
                    mode_time = 0.0;
                } else {
                    mode = GuardMode::Patrol;
                }
            }
        }
        GuardMode::Alert => {
            if !sees {
                mode = GuardMode::Surprised;
                mode_time = 0.0;
            } else if mode_time > AIM_TIME {
                fire = true;
            }
        }
    }

    let state = world.get_mut::<State>(guard)?;
    state.set("mode", mode.name());
    state.set("mode_time", mode_time);
    if let Some(drawable) = world.try_get_mut::<Drawable>(guard) {
        drawable.set_sprite(mode.sprite());
    }
    if fire {
        world.post(Event::sound("shoot"));
        world.post(Event::GameOver);
    }
    Ok(())
}
