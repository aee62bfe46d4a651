//! Closed set of component kinds and the tagged [`Component`] value.
//!
//! Every piece of per-entity data is one variant of [`Component`]. The
//! matching [`ComponentKind`] is the discriminator used as the store key and
//! as a bit in [`ComponentSet`], the requirement mask systems declare.
//!
//! Typed access goes through [`ComponentData`], implemented for every
//! variant payload, so systems write `world.get::<Position>(id)?` instead of
//! matching on the enum.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::components::animation::Animation;
use crate::components::camera::Camera;
use crate::components::collidable::Collidable;
use crate::components::drawable::Drawable;
use crate::components::eventhandler::{EventHandler, Interactable};
use crate::components::facing::Facing;
use crate::components::playerinput::PlayerInput;
use crate::components::radar::Radar;
use crate::components::script::Script;
use crate::components::state::State;
use crate::components::vectors::{
    Acceleration, Dimension, LastPosition, Position, TargetVelocity, Velocity,
};
use crate::error::SimError;

/// Discriminator for every component the store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ComponentKind {
    Position,
    Velocity,
    Acceleration,
    Dimension,
    LastPosition,
    TargetVelocity,
    Collidable,
    Drawable,
    Animation,
    Camera,
    EventHandler,
    Interactable,
    State,
    Script,
    Facing,
    Radar,
    PlayerInput,
}

impl ComponentKind {
    /// All kinds in declaration order.
    pub const ALL: [ComponentKind; 17] = [
        ComponentKind::Position,
        ComponentKind::Velocity,
        ComponentKind::Acceleration,
        ComponentKind::Dimension,
        ComponentKind::LastPosition,
        ComponentKind::TargetVelocity,
        ComponentKind::Collidable,
        ComponentKind::Drawable,
        ComponentKind::Animation,
        ComponentKind::Camera,
        ComponentKind::EventHandler,
        ComponentKind::Interactable,
        ComponentKind::State,
        ComponentKind::Script,
        ComponentKind::Facing,
        ComponentKind::Radar,
        ComponentKind::PlayerInput,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u8)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "Position",
            ComponentKind::Velocity => "Velocity",
            ComponentKind::Acceleration => "Acceleration",
            ComponentKind::Dimension => "Dimension",
            ComponentKind::LastPosition => "LastPosition",
            ComponentKind::TargetVelocity => "TargetVelocity",
            ComponentKind::Collidable => "Collidable",
            ComponentKind::Drawable => "Drawable",
            ComponentKind::Animation => "Animation",
            ComponentKind::Camera => "Camera",
            ComponentKind::EventHandler => "EventHandler",
            ComponentKind::Interactable => "Interactable",
            ComponentKind::State => "State",
            ComponentKind::Script => "Script",
            ComponentKind::Facing => "Facing",
            ComponentKind::Radar => "Radar",
            ComponentKind::PlayerInput => "PlayerInput",
        }
    }

    /// Look a kind up by its name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset over [`ComponentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentSet(u32);

impl ComponentSet {
    pub const EMPTY: ComponentSet = ComponentSet(0);

    /// Build a set in a const context, e.g. for system requirements.
    pub const fn of(kinds: &[ComponentKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        ComponentSet(bits)
    }

    pub const fn with(self, kind: ComponentKind) -> Self {
        ComponentSet(self.0 | kind.bit())
    }

    pub fn insert(&mut self, kind: ComponentKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: ComponentKind) {
        self.0 &= !kind.bit();
    }

    pub const fn contains(self, kind: ComponentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// `true` when every kind in `other` is also in `self`.
    pub const fn is_superset_of(self, other: ComponentSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<ComponentKind> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        let mut set = ComponentSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// A component instance: exactly one of the known kinds.
#[derive(Debug, Clone)]
pub enum Component {
    Position(Position),
    Velocity(Velocity),
    Acceleration(Acceleration),
    Dimension(Dimension),
    LastPosition(LastPosition),
    TargetVelocity(TargetVelocity),
    Collidable(Collidable),
    Drawable(Drawable),
    Animation(Animation),
    Camera(Camera),
    EventHandler(EventHandler),
    Interactable(Interactable),
    State(State),
    Script(Script),
    Facing(Facing),
    Radar(Radar),
    PlayerInput(PlayerInput),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Position(_) => ComponentKind::Position,
            Component::Velocity(_) => ComponentKind::Velocity,
            Component::Acceleration(_) => ComponentKind::Acceleration,
            Component::Dimension(_) => ComponentKind::Dimension,
            Component::LastPosition(_) => ComponentKind::LastPosition,
            Component::TargetVelocity(_) => ComponentKind::TargetVelocity,
            Component::Collidable(_) => ComponentKind::Collidable,
            Component::Drawable(_) => ComponentKind::Drawable,
            Component::Animation(_) => ComponentKind::Animation,
            Component::Camera(_) => ComponentKind::Camera,
            Component::EventHandler(_) => ComponentKind::EventHandler,
            Component::Interactable(_) => ComponentKind::Interactable,
            Component::State(_) => ComponentKind::State,
            Component::Script(_) => ComponentKind::Script,
            Component::Facing(_) => ComponentKind::Facing,
            Component::Radar(_) => ComponentKind::Radar,
            Component::PlayerInput(_) => ComponentKind::PlayerInput,
        }
    }

    /// Build a component from a kind name and loose JSON data, as found in
    /// level layout files.
    ///
    /// Vector kinds take `[x, y]`; struct kinds take an object whose missing
    /// fields fall back to defaults; `null` means "all defaults". Handler
    /// kinds (EventHandler, Interactable, Script) hold function pointers and
    /// cannot be described by data.
    pub fn from_json(name: &str, data: &JsonValue) -> Result<Component, SimError> {
        let kind = ComponentKind::from_name(name).ok_or_else(|| SimError::InvalidComponent {
            kind: name.to_string(),
            reason: "not a recognised component kind".to_string(),
        })?;

        let component = match kind {
            ComponentKind::Position => Component::Position(parse(kind, data)?),
            ComponentKind::Velocity => Component::Velocity(parse(kind, data)?),
            ComponentKind::Acceleration => Component::Acceleration(parse(kind, data)?),
            ComponentKind::Dimension => Component::Dimension(parse(kind, data)?),
            ComponentKind::LastPosition => Component::LastPosition(parse(kind, data)?),
            ComponentKind::TargetVelocity => Component::TargetVelocity(parse(kind, data)?),
            ComponentKind::Collidable => Component::Collidable(parse(kind, data)?),
            ComponentKind::Drawable => Component::Drawable(parse(kind, data)?),
            ComponentKind::Animation => Component::Animation(parse(kind, data)?),
            ComponentKind::Camera => Component::Camera(parse(kind, data)?),
            ComponentKind::State => Component::State(parse(kind, data)?),
            ComponentKind::Facing => Component::Facing(parse(kind, data)?),
            ComponentKind::Radar => Component::Radar(parse(kind, data)?),
            ComponentKind::PlayerInput => Component::PlayerInput(parse(kind, data)?),
            ComponentKind::EventHandler | ComponentKind::Interactable | ComponentKind::Script => {
                return Err(SimError::InvalidComponent {
                    kind: name.to_string(),
                    reason: "handler components must be attached from code".to_string(),
                });
            }
        };
        Ok(component)
    }
}

fn parse<T: DeserializeOwned + Default>(
    kind: ComponentKind,
    data: &JsonValue,
) -> Result<T, SimError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data.clone()).map_err(|e| SimError::InvalidComponent {
        kind: kind.name().to_string(),
        reason: e.to_string(),
    })
}

/// Typed view over one [`Component`] variant.
pub trait ComponentData: Sized + Into<Component> {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;

    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! impl_component_data {
    ($($kind:ident),* $(,)?) => {
        $(
            impl ComponentData for $kind {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$kind(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$kind(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$kind> for Component {
                fn from(value: $kind) -> Self {
                    Component::$kind(value)
                }
            }
        )*
    };
}

impl_component_data!(
    Position,
    Velocity,
    Acceleration,
    Dimension,
    LastPosition,
    TargetVelocity,
    Collidable,
    Drawable,
    Animation,
    Camera,
    EventHandler,
    Interactable,
    State,
    Script,
    Facing,
    Radar,
    PlayerInput,
);
