//! Input modes and cross-thread mode requests.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which peripheral families feed the per-frame state. Modes are additive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InputMode: u8 {
        const CONTROLLER = 0b0001;
        const TOUCHSCREEN = 0b0010;
        const KEYBOARD = 0b0100;
        const MOUSE = 0b1000;
    }
}

impl InputMode {
    /// Single-family modes in routing order.
    pub const FAMILIES: [InputMode; 4] = [
        InputMode::CONTROLLER,
        InputMode::TOUCHSCREEN,
        InputMode::KEYBOARD,
        InputMode::MOUSE,
    ];
}

/// A mode change asked for from another thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeRequest {
    Set(InputMode),
    Toggle(InputMode),
}

/// Sendable handle for asking the consumer thread to change modes.
///
/// Requests are applied at the start of the next
/// [`drain_and_process`](crate::system::InputSystem::drain_and_process).
#[derive(Clone, Debug)]
pub struct ModeHandle {
    tx: flume::Sender<ModeRequest>,
}

impl ModeHandle {
    pub(crate) fn new(tx: flume::Sender<ModeRequest>) -> Self {
        Self { tx }
    }

    /// Returns `false` once the input system is gone.
    pub fn set(&self, mode: InputMode) -> bool {
        self.tx.send(ModeRequest::Set(mode)).is_ok()
    }

    pub fn toggle(&self, mode: InputMode) -> bool {
        self.tx.send(ModeRequest::Toggle(mode)).is_ok()
    }
}
