//! Mouse adapter and per-frame mouse state.
//!
//! Unlike controllers and keyboards, every connected mouse is active while mouse
//! input is enabled. Enabling captures the system cursor (hide + warp to centre)
//! according to [`MouseConfig`]; disabling gives it back.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::config::MouseConfig;
use crate::device::{
    Capabilities, CursorControl, DeviceClass, DeviceInfo, InputHandler, PeripheralSource,
    PresenceChange, PresenceInbox, RawInput,
};
use crate::edge::FrameState;
use crate::event::{Event, InputEvent, MouseEvent, Vec2};
use crate::keycode::MouseButton;
use crate::queue::EventQueue;

/// Mouse input is offered on desktop targets unless configuration says otherwise.
pub fn mouse_available(config: &MouseConfig) -> bool {
    config.enabled.unwrap_or(cfg!(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux"
    )))
}

pub struct MouseInput {
    queue: Arc<EventQueue<Event>>,
    source: Arc<dyn PeripheralSource>,
    cursor: Arc<dyn CursorControl>,
    inbox: PresenceInbox,
    config: MouseConfig,
    mice: Vec<DeviceInfo>,
    active: Vec<String>,
    enabled: bool,
}

impl MouseInput {
    pub fn new(
        queue: Arc<EventQueue<Event>>,
        source: Arc<dyn PeripheralSource>,
        cursor: Arc<dyn CursorControl>,
        config: MouseConfig,
    ) -> Self {
        let inbox = PresenceInbox::register(source.as_ref());
        let mut input = Self {
            queue,
            source,
            cursor,
            inbox,
            config,
            mice: Vec::new(),
            active: Vec::new(),
            enabled: false,
        };
        for info in input.source.connected_devices() {
            input.track(info);
        }
        input
    }

    fn track(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Mouse {
            log::warn!("mouse source reported {:?} device {}", info.class, info.id);
            return;
        }
        if self.mice.iter().any(|m| m.id == info.id) {
            log::error!("mouse {} connected twice; ignoring", info.id);
            return;
        }
        log::info!("mouse connected: {} ({})", info.description, info.id);
        self.queue
            .enqueue(Event::PeripheralConnected(info.peripheral_event()));
        if self.enabled {
            self.activate(&info);
        }
        self.mice.push(info);
    }

    fn untrack(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Mouse {
            log::warn!("mouse source reported {:?} device {}", info.class, info.id);
            return;
        }
        let Some(pos) = self.mice.iter().position(|m| m.id == info.id) else {
            log::error!("unknown mouse {} disconnected; ignoring", info.id);
            return;
        };
        self.deactivate(&info.id);
        let mouse = self.mice.remove(pos);
        log::info!("mouse disconnected: {}", mouse.id);
        self.queue
            .enqueue(Event::PeripheralDisconnected(mouse.peripheral_event()));
    }

    /// Apply presence notices received since the last call.
    pub fn pump(&mut self) {
        let changes: Vec<PresenceChange> = self.inbox.drain().collect();
        for change in changes {
            match change {
                PresenceChange::Connected(info) => self.track(info),
                PresenceChange::Disconnected(info) => self.untrack(info),
            }
        }
    }

    pub fn is_available(&self) -> bool {
        mouse_available(&self.config)
    }

    /// Capture the cursor and listen to every connected mouse.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        if !self.is_available() {
            log::warn!("mouse input is not available on this platform");
            return;
        }
        self.enabled = true;
        if self.config.hide_cursor {
            self.cursor.hide();
        }
        if self.config.warp_cursor {
            self.cursor.warp_to_center();
        }
        let mice = self.mice.clone();
        for info in &mice {
            self.activate(info);
        }
        log::info!("mouse input enabled ({} active)", self.active.len());
    }

    fn activate(&mut self, info: &DeviceInfo) {
        if !info.capabilities.contains(Capabilities::MOUSE_INPUT) {
            log::error!("mouse {} reports no mouse input; skipping", info.id);
            return;
        }
        if self.active.iter().any(|id| *id == info.id) {
            return;
        }
        let handler = self.input_handler();
        match self.source.on_input_changed(&info.id, Some(handler)) {
            Ok(()) => self.active.push(info.id.clone()),
            Err(e) => log::error!("failed to install mouse handler for {}: {e}", info.id),
        }
    }

    fn deactivate(&mut self, id: &str) {
        let Some(pos) = self.active.iter().position(|a| a == id) else {
            return;
        };
        self.active.remove(pos);
        if let Err(e) = self.source.on_input_changed(id, None) {
            log::warn!("failed to remove mouse handler for {id}: {e}");
        }
    }

    fn input_handler(&self) -> InputHandler {
        let queue = self.queue.clone();
        let cursor = self.cursor.clone();
        let warp = self.config.warp_cursor;
        Arc::new(move |raw: RawInput| {
            let event = match raw {
                RawInput::MouseButton { index, pressed } => {
                    let button = MouseButton::from_index(index);
                    if pressed {
                        MouseEvent::ButtonDown(button)
                    } else {
                        MouseEvent::ButtonUp(button)
                    }
                }
                RawInput::MouseMoved { delta } => {
                    if warp {
                        cursor.warp_to_center();
                    }
                    MouseEvent::Move {
                        delta,
                        position: None,
                    }
                }
                RawInput::MouseScrolled { delta } => MouseEvent::Scroll { delta },
                other => {
                    log::warn!("mouse handler ignoring non-mouse input {other:?}");
                    return;
                }
            };
            #[cfg(feature = "debug-log")]
            log::trace!("mouse event {event:?}");
            queue.enqueue(Event::Input(InputEvent::Mouse(event)));
        })
    }

    /// Stop listening and restore the cursor.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        for id in std::mem::take(&mut self.active) {
            if let Err(e) = self.source.on_input_changed(&id, None) {
                log::warn!("failed to remove mouse handler for {id}: {e}");
            }
        }
        if self.config.hide_cursor {
            self.cursor.show();
        }
        log::info!("mouse input disabled");
    }

    pub fn mice(&self) -> &[DeviceInfo] {
        &self.mice
    }

    pub fn active_mice(&self) -> &[String] {
        &self.active
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Drop for MouseInput {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Button sets plus pointer motion for the current tick.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MouseState {
    pressed: BTreeSet<MouseButton>,
    held: BTreeSet<MouseButton>,
    released: BTreeSet<MouseButton>,
    position: Vec2,
    delta: Vec2,
    scroll: Vec2,
}

impl MouseState {
    pub fn new() -> Self {
        Self::default()
    }

    fn progress_existing_states(&mut self) {
        let pressed = std::mem::take(&mut self.pressed);
        self.held.extend(pressed);
        self.released.clear();
        self.delta = Vec2::ZERO;
        self.scroll = Vec2::ZERO;
    }

    fn apply(&mut self, event: MouseEvent) {
        match event {
            MouseEvent::ButtonDown(button) => {
                if self.held.contains(&button) {
                    return;
                }
                self.released.remove(&button);
                self.pressed.insert(button);
            }
            MouseEvent::ButtonUp(button) => {
                self.pressed.remove(&button);
                self.held.remove(&button);
                self.released.insert(button);
            }
            MouseEvent::Move { delta, position } => {
                self.delta += delta;
                self.position = position.unwrap_or(self.position + delta);
            }
            MouseEvent::Scroll { delta } => self.scroll += delta,
        }
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }

    pub fn is_released(&self, button: MouseButton) -> bool {
        self.released.contains(&button)
    }

    pub fn is_active(&self, button: MouseButton) -> bool {
        self.is_pressed(button) || self.is_held(button)
    }

    /// Absolute position when the platform reports one, otherwise the sum of all
    /// deltas since the last reset.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Motion this tick.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Scroll this tick.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }
}

impl FrameState for MouseState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.progress_existing_states();
        for event in events {
            if let Event::Input(InputEvent::Mouse(mouse)) = event {
                self.apply(*mouse);
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
