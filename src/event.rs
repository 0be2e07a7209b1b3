//! The event taxonomy.
//!
//! Everything that flows through the [`EventQueue`](crate::queue::EventQueue) is an
//! [`Event`]: window-level notifications (resize, focus), peripheral connect and
//! disconnect notices, and per-peripheral input ([`InputEvent`]).
//!
//! Events are small immutable values. Adapters build them on whatever thread the
//! platform calls back on; the consumer drains and folds them into per-frame state.
//!
//! ## Value conventions
//! - **Positions** are in view coordinates (points, origin top-left, y grows down).
//! - **Stick offsets** are normalized to `[-1.0, 1.0]` per axis; `(0, 0)` is rest.
//! - **Mouse deltas** are in the units the platform reports (usually points).
//! - **Buttons and keys** are expressed as press/release edges, never as levels.

use serde::{Deserialize, Serialize};

use crate::keycode::{KeyCode, MouseButton};

/// A 2D value: a position, offset or delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `true` when both components are exactly zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Vec2::new(x, y)
    }
}

/// Top-level event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The drawable area changed size.
    Resize { width: u32, height: u32 },
    /// The app gained or lost focus.
    Focus(FocusState),
    /// A peripheral became available.
    PeripheralConnected(PeripheralEvent),
    /// A peripheral went away.
    PeripheralDisconnected(PeripheralEvent),
    /// Input from a peripheral.
    Input(InputEvent),
}

impl Event {
    /// The wrapped input event, if this is one.
    #[inline]
    pub fn as_input(&self) -> Option<&InputEvent> {
        match self {
            Event::Input(input) => Some(input),
            _ => None,
        }
    }
}

impl From<InputEvent> for Event {
    fn from(input: InputEvent) -> Self {
        Event::Input(input)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusState {
    Active,
    Inactive,
}

/// Category of a connected peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeripheralKind {
    PhysicalController,
    VirtualController,
    Keyboard,
    Mouse,
}

impl PeripheralKind {
    /// `true` for both physical and virtual controllers.
    #[inline]
    pub fn is_controller(self) -> bool {
        matches!(
            self,
            PeripheralKind::PhysicalController | PeripheralKind::VirtualController
        )
    }
}

/// Payload of connect/disconnect events.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeripheralEvent {
    pub kind: PeripheralKind,
    /// Stable identifier of the device (same as [`DeviceInfo::id`](crate::device::DeviceInfo::id)).
    pub id: String,
}

impl PeripheralEvent {
    pub fn new(kind: PeripheralKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Input from one of the supported peripheral families.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Controller(ControllerEvent),
    Pan(PanEvent),
    Tap(TapEvent),
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

// --- Controller ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// A tap on the screen area of an on-screen controller.
    ScreenTap {
        state: PressState,
        position: Vec2,
    },
    Button {
        button: ControllerButton,
        state: PressState,
    },
    Stick {
        stick: Stick,
        state: StickPhase,
        /// Normalized offset; `(0, 0)` on `Ended`.
        offset: Vec2,
    },
}

/// Digital controller buttons tracked by the framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    Start,
}

impl ControllerButton {
    pub const ALL: [ControllerButton; 5] = [
        ControllerButton::A,
        ControllerButton::B,
        ControllerButton::X,
        ControllerButton::Y,
        ControllerButton::Start,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            ControllerButton::A => 0,
            ControllerButton::B => 1,
            ControllerButton::X => 2,
            ControllerButton::Y => 3,
            ControllerButton::Start => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressState {
    Pressed,
    Released,
}

impl PressState {
    #[inline]
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            PressState::Pressed
        } else {
            PressState::Released
        }
    }
}

/// Zero-crossing phase of a two-axis input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickPhase {
    /// Left rest position.
    Began,
    /// Moved while away from rest.
    Changed,
    /// Returned to rest.
    Ended,
}

// --- Touchscreen ---------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanEvent {
    pub state: PanPhase,
    pub position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanPhase {
    Began,
    Panning,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapEvent {
    pub state: TapPhase,
    pub kind: TapKind,
    pub position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapPhase {
    Began,
    Held,
    Ended,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapKind {
    #[default]
    Tap,
    DoubleTap,
    LongPress,
}

// --- Keyboard / mouse ----------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyboardEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MouseEvent {
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Relative motion; `position` is set when the platform reports an absolute location.
    Move {
        delta: Vec2,
        position: Option<Vec2>,
    },
    Scroll {
        delta: Vec2,
    },
}
