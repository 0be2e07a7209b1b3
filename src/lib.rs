//! Event-driven input multiplexing for games and interactive apps.
//!
//! Peripheral adapters (controller, touchscreen, keyboard, mouse) turn platform
//! callbacks into [`Event`]s on a bounded [`EventQueue`] from any thread. Once per
//! frame the [`InputSystem`] drains the queue on the render thread and folds the
//! batch into edge-triggered per-frame state ([`ControllerState`],
//! [`TouchScreenState`], [`KeyboardState`], [`MouseState`]) for the families the
//! current [`InputMode`] enables.
//!
//! [`FrameLink`] wraps an `InputSystem` into a complete per-frame driver.

pub mod backends;
pub mod config;
pub mod controller;
pub mod controller_state;
pub mod device;
pub mod edge;
pub mod error;
pub mod event;
pub mod frame;
pub mod keyboard;
pub mod keycode;
pub mod mode;
pub mod mouse;
pub mod queue;
pub mod system;
pub mod touch;
pub mod touch_state;

pub use config::{AutoSwitch, InputConfig, MouseConfig};
pub use controller::{Controller, ControllerInput, RawController, StickLatch};
pub use controller_state::ControllerState;
pub use device::*;
pub use edge::{EdgeState, EdgeTriggered, FrameState, TapState, TapTrigger};
pub use error::{ConfigError, SourceError};
pub use event::*;
pub use frame::{FrameData, FrameHandler, FrameLink};
pub use keyboard::{KeyboardInput, KeyboardState};
pub use keycode::{KeyCode, MouseButton};
pub use mode::{InputMode, ModeHandle, ModeRequest};
pub use mouse::{MouseInput, MouseState};
pub use queue::{EventQueue, DEFAULT_QUEUE_CAPACITY};
pub use system::{Diagnostics, InputSources, InputSystem, Peripheral};
pub use touch::TouchInput;
pub use touch_state::{PanGesture, PanState, TapGesture, TapGestureState, TouchScreenState};
