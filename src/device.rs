//! Platform seam: device descriptions and the capability traits adapters drive.
//!
//! The adapters in this crate never talk to an OS API directly. Instead each one is
//! handed an implementation of [`PeripheralSource`] (controllers, keyboards, mice) or
//! [`GestureSurface`] (touch views), which
//! - reports the devices currently connected,
//! - delivers connect/disconnect notifications (`on_presence_changed`),
//! - delivers raw value changes for one device (`on_input_changed`).
//!
//! Callbacks may run on **any** thread. Implementations must not hold internal locks
//! while invoking a handler.
//!
//! [`VirtualSource`](crate::backends::virtual_input::VirtualSource) is the in-memory
//! implementation used for software controllers, tests and demos.

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::event::{ControllerButton, PeripheralEvent, PeripheralKind, Stick, TapKind, Vec2};

bitflags! {
    /// Input profiles a device supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u8 {
        /// Face buttons, start and two thumbsticks.
        const EXTENDED_GAMEPAD = 0b0001;
        /// Per-key change reports.
        const KEYBOARD_INPUT = 0b0010;
        /// Relative motion, buttons and scroll.
        const MOUSE_INPUT = 0b0100;
    }
}

/// Device family a source reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Controller,
    Keyboard,
    Mouse,
}

/// Snapshot describing a single device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable identifier; equality of peripherals is by this id only.
    pub id: String,
    /// Human-readable name for UI.
    pub description: String,
    pub class: DeviceClass,
    /// Software device (e.g. an on-screen controller).
    pub is_virtual: bool,
    /// Opaque platform handle, meaningful only to the source that issued it.
    pub handle: u64,
    pub capabilities: Capabilities,
}

impl DeviceInfo {
    /// A physical game controller with the extended gamepad profile.
    pub fn controller(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            class: DeviceClass::Controller,
            is_virtual: false,
            handle: 0,
            capabilities: Capabilities::EXTENDED_GAMEPAD,
        }
    }

    /// A software controller with the extended gamepad profile.
    pub fn virtual_controller(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            is_virtual: true,
            ..Self::controller(id, description)
        }
    }

    pub fn keyboard(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            class: DeviceClass::Keyboard,
            is_virtual: false,
            handle: 0,
            capabilities: Capabilities::KEYBOARD_INPUT,
        }
    }

    pub fn mouse(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            class: DeviceClass::Mouse,
            is_virtual: false,
            handle: 0,
            capabilities: Capabilities::MOUSE_INPUT,
        }
    }

    /// Builder-style override of the capability set.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Builder-style override of the platform handle.
    pub fn with_handle(mut self, handle: u64) -> Self {
        self.handle = handle;
        self
    }

    pub fn peripheral_kind(&self) -> PeripheralKind {
        match (self.class, self.is_virtual) {
            (DeviceClass::Controller, false) => PeripheralKind::PhysicalController,
            (DeviceClass::Controller, true) => PeripheralKind::VirtualController,
            (DeviceClass::Keyboard, _) => PeripheralKind::Keyboard,
            (DeviceClass::Mouse, _) => PeripheralKind::Mouse,
        }
    }

    /// Payload for the connect/disconnect events of this device.
    pub fn peripheral_event(&self) -> PeripheralEvent {
        PeripheralEvent::new(self.peripheral_kind(), self.id.clone())
    }
}

/// Connect or disconnect notification from a source.
#[derive(Clone, Debug, PartialEq)]
pub enum PresenceChange {
    Connected(DeviceInfo),
    Disconnected(DeviceInfo),
}

/// One raw value change, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawInput {
    /// Controller button level changed.
    Button {
        button: ControllerButton,
        pressed: bool,
    },
    /// Two-axis controller input moved to `value`.
    Thumbstick { stick: Stick, value: Vec2 },
    /// Touch on an on-screen controller's free area.
    ScreenTap { pressed: bool, position: Vec2 },
    /// Keyboard key changed; `usage` is the HID Keyboard page usage.
    Key { usage: u16, pressed: bool },
    /// Mouse button changed; `index` 0 is the primary button.
    MouseButton { index: u8, pressed: bool },
    MouseMoved { delta: Vec2 },
    MouseScrolled { delta: Vec2 },
}

/// Phase reported by a gesture recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

/// One gesture recognizer callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawGesture {
    Pan {
        phase: GesturePhase,
        position: Vec2,
    },
    Tap {
        kind: TapKind,
        phase: GesturePhase,
        position: Vec2,
    },
}

impl PresenceChange {
    pub fn device(&self) -> &DeviceInfo {
        match self {
            PresenceChange::Connected(info) | PresenceChange::Disconnected(info) => info,
        }
    }
}

pub type PresenceHandler = Arc<dyn Fn(PresenceChange) + Send + Sync>;
pub type InputHandler = Arc<dyn Fn(RawInput) + Send + Sync>;
pub type GestureHandler = Arc<dyn Fn(RawGesture) + Send + Sync>;

/// Platform device discovery and monitoring for one device family.
pub trait PeripheralSource: Send + Sync {
    /// Devices connected right now.
    fn connected_devices(&self) -> Vec<DeviceInfo>;

    /// Install (or with `None`, remove) the connect/disconnect handler.
    fn on_presence_changed(&self, handler: Option<PresenceHandler>);

    /// Install (or with `None`, remove) the raw value handler of one device.
    ///
    /// Removing a handler that was never installed must succeed.
    fn on_input_changed(
        &self,
        device_id: &str,
        handler: Option<InputHandler>,
    ) -> Result<(), SourceError>;

    /// Create a software device to use when no physical one is present.
    fn synthesize_virtual(&self) -> Result<DeviceInfo, SourceError> {
        Err(SourceError::Unsupported("virtual devices"))
    }

    /// Show or hide the on-screen UI of a virtual device.
    fn set_overlay_visible(&self, _device_id: &str, _visible: bool) {}
}

/// Presence notices forwarded from the source's threads to the consumer.
///
/// Registering installs a handler on the source that only sends into a channel;
/// the owning adapter drains it from `pump()`.
pub(crate) struct PresenceInbox {
    rx: flume::Receiver<PresenceChange>,
}

impl PresenceInbox {
    pub(crate) fn register(source: &dyn PeripheralSource) -> Self {
        let (tx, rx) = flume::unbounded();
        source.on_presence_changed(Some(Arc::new(move |change: PresenceChange| {
            // The adapter is gone; nothing left to notify.
            let _ = tx.send(change);
        })));
        Self { rx }
    }

    pub(crate) fn drain(&self) -> flume::TryIter<'_, PresenceChange> {
        self.rx.try_iter()
    }
}

/// A view that touch gestures can be recognized on.
pub trait GestureSurface: Send + Sync {
    fn surface_id(&self) -> &str;

    /// Start delivering gestures to `handler`, replacing any previous one.
    fn attach(&self, handler: GestureHandler);

    /// Stop delivering gestures. Safe when nothing is attached.
    fn detach(&self);
}

/// System cursor control used while mouse input is captured.
pub trait CursorControl: Send + Sync {
    fn hide(&self);
    fn show(&self);
    /// Move the cursor to the middle of the main display.
    fn warp_to_center(&self);
}

/// Cursor control that does nothing (touch-first platforms, headless runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCursor;

impl CursorControl for NoCursor {
    fn hide(&self) {}
    fn show(&self) {}
    fn warp_to_center(&self) {}
}
