use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use serde::Serialize;

/// Closed set of click kinds handed to screen hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    Other,
}

impl ClickKind {
    pub fn from_modifiers(modifiers: ClickModifiers) -> Self {
        let ClickModifiers { left, right, shift } = modifiers;
        match (left, right, shift) {
            (true, _, true) => ClickKind::ShiftLeft,
            (true, _, false) => ClickKind::Left,
            (false, true, true) => ClickKind::ShiftRight,
            (false, true, false) => ClickKind::Right,
            (false, false, _) => ClickKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClickKind::Left => "left",
            ClickKind::ShiftLeft => "shift_left",
            ClickKind::Right => "right",
            ClickKind::ShiftRight => "shift_right",
            ClickKind::Other => "other",
        }
    }
}

/// Raw click flags as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClickModifiers {
    pub left: bool,
    pub right: bool,
    pub shift: bool,
}

impl ClickModifiers {
    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Terminal hosts: only button presses count, anything else is `Other`.
    pub fn from_mouse(event: &MouseEvent) -> Self {
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => Self {
                left: true,
                right: false,
                shift,
            },
            MouseEventKind::Down(MouseButton::Right) => Self {
                left: false,
                right: true,
                shift,
            },
            _ => Self {
                shift,
                ..Self::default()
            },
        }
    }

    pub fn kind(self) -> ClickKind {
        ClickKind::from_modifiers(self)
    }
}
