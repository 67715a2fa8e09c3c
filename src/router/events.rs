use crate::host::{SurfaceHandle, ViewerId};
use crate::item::ItemSignature;

use super::click::{ClickKind, ClickModifiers};

/// Mutable event delivered by the host. Marking it handled suppresses the
/// host's default reaction and hides it from later `ignore_handled` subscribers.
pub trait HostEvent {
    fn is_handled(&self) -> bool;
    fn set_handled(&mut self, handled: bool);

    fn mark_handled(&mut self) {
        self.set_handled(true);
    }
}

/// A player used the item held in hand.
#[derive(Debug, Clone)]
pub struct InteractEvent {
    pub player: ViewerId,
    pub held_item: Option<ItemSignature>,
    handled: bool,
}

impl InteractEvent {
    pub fn new(player: impl Into<ViewerId>, held_item: Option<ItemSignature>) -> Self {
        Self {
            player: player.into(),
            held_item,
            handled: false,
        }
    }
}

impl HostEvent for InteractEvent {
    fn is_handled(&self) -> bool {
        self.handled
    }

    fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }
}

/// A click on an item inside some host surface.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub clicker: Option<ViewerId>,
    pub clicked_item: Option<ItemSignature>,
    pub slot: usize,
    pub surface_title: String,
    /// Handle of the clicked surface, when the host can report it.
    pub surface: Option<SurfaceHandle>,
    pub modifiers: ClickModifiers,
    handled: bool,
}

impl ClickEvent {
    /// Plain left click; adjust with [`ClickEvent::with_modifiers`].
    pub fn new(
        clicker: Option<ViewerId>,
        clicked_item: Option<ItemSignature>,
        slot: usize,
        surface_title: impl Into<String>,
    ) -> Self {
        Self {
            clicker,
            clicked_item,
            slot,
            surface_title: surface_title.into(),
            surface: None,
            modifiers: ClickModifiers::left(),
            handled: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: ClickModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_surface(mut self, handle: SurfaceHandle) -> Self {
        self.surface = Some(handle);
        self
    }

    pub fn click_kind(&self) -> ClickKind {
        self.modifiers.kind()
    }
}

impl HostEvent for ClickEvent {
    fn is_handled(&self) -> bool {
        self.handled
    }

    fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }
}

/// Click details passed to [`crate::ScreenBehavior::on_item_click`].
#[derive(Debug, Clone)]
pub struct ItemClick {
    pub viewer: ViewerId,
    pub item: ItemSignature,
    pub slot: usize,
    pub kind: ClickKind,
}

/// Event families the router listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Interact,
    Click,
}

/// Host delivery tiers, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    First,
    Early,
    Normal,
    Late,
    Last,
}

/// How the host should subscribe the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub category: EventCategory,
    pub priority: EventPriority,
    pub ignore_handled: bool,
}
