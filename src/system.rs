//! The input coordinator.
//!
//! [`InputSystem`] owns the event queue, the four adapters, their per-frame state
//! machines and the current [`InputMode`]. It is the only place the mode changes,
//! and it lives on the consumer (render) thread.
//!
//! Once per tick, before querying any state:
//!
//! ```no_run
//! # use kobold_input::{InputConfig, InputSources, InputSystem};
//! let mut input = InputSystem::new(&InputConfig::default(), InputSources::headless());
//! let events = input.drain_and_process();
//! # drop(events);
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::backends::virtual_input::VirtualSource;
use crate::config::{AutoSwitch, InputConfig};
use crate::controller::{Controller, ControllerInput};
use crate::controller_state::ControllerState;
use crate::device::{CursorControl, DeviceInfo, GestureSurface, NoCursor, PeripheralSource};
use crate::edge::FrameState;
use crate::error::SourceError;
use crate::event::{Event, PeripheralEvent, PeripheralKind};
use crate::keyboard::{KeyboardInput, KeyboardState};
use crate::mode::{InputMode, ModeHandle, ModeRequest};
use crate::mouse::{MouseInput, MouseState};
use crate::queue::EventQueue;
use crate::touch::TouchInput;
use crate::touch_state::TouchScreenState;

/// Platform seams handed to [`InputSystem::new`].
pub struct InputSources {
    pub controllers: Arc<dyn PeripheralSource>,
    pub keyboards: Arc<dyn PeripheralSource>,
    pub mice: Arc<dyn PeripheralSource>,
    pub cursor: Arc<dyn CursorControl>,
}

impl InputSources {
    /// In-memory sources only: an on-screen controller and nothing else.
    pub fn headless() -> Self {
        Self {
            controllers: Arc::new(VirtualSource::controllers()),
            keyboards: Arc::new(VirtualSource::keyboards()),
            mice: Arc::new(VirtualSource::mice()),
            cursor: Arc::new(NoCursor),
        }
    }
}

/// A known peripheral, as published to the app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Peripheral {
    pub kind: PeripheralKind,
    pub id: String,
    pub description: String,
}

impl Peripheral {
    fn from_device(info: &DeviceInfo) -> Self {
        Self {
            kind: info.peripheral_kind(),
            id: info.id.clone(),
            description: info.description.clone(),
        }
    }
}

impl From<&Controller> for Peripheral {
    fn from(controller: &Controller) -> Self {
        let PeripheralEvent { kind, id } = controller.peripheral_event();
        Self {
            kind,
            id,
            description: controller.description.clone(),
        }
    }
}

/// Snapshot of the live input system.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostics {
    pub mode: InputMode,
    pub peripherals: Vec<Peripheral>,
    pub active_controller: Option<String>,
    pub gesture_surfaces: usize,
    /// Events waiting for the next drain, oldest first.
    pub queued: Vec<Event>,
    /// Events evicted from the queue since it was created.
    pub dropped: u64,
}

impl Diagnostics {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct InputSystem {
    queue: Arc<EventQueue<Event>>,
    mode: InputMode,
    auto_switch: AutoSwitch,
    requests: flume::Receiver<ModeRequest>,
    requests_tx: flume::Sender<ModeRequest>,

    controller: ControllerInput,
    touch: TouchInput,
    keyboard: KeyboardInput,
    mouse: MouseInput,

    controller_state: ControllerState,
    touch_state: TouchScreenState,
    keyboard_state: KeyboardState,
    mouse_state: MouseState,
}

impl InputSystem {
    /// Build the queue and adapters, then switch on `config.default_modes`.
    pub fn new(config: &InputConfig, sources: InputSources) -> Self {
        let queue = Arc::new(EventQueue::new(config.queue_capacity));
        let (requests_tx, requests) = flume::unbounded();

        let mut system = Self {
            controller: ControllerInput::new(queue.clone(), sources.controllers),
            touch: TouchInput::new(queue.clone()),
            keyboard: KeyboardInput::new(queue.clone(), sources.keyboards),
            mouse: MouseInput::new(queue.clone(), sources.mice, sources.cursor, config.mouse),
            queue,
            mode: InputMode::empty(),
            auto_switch: config.auto_switch,
            requests,
            requests_tx,
            controller_state: ControllerState::new(),
            touch_state: TouchScreenState::new(),
            keyboard_state: KeyboardState::new(),
            mouse_state: MouseState::new(),
        };
        system.set_input_mode(config.initial_mode());
        system
    }

    /// Shared queue; producers may enqueue from any thread.
    pub fn queue(&self) -> &Arc<EventQueue<Event>> {
        &self.queue
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// Replace the mode set. Families switched on are enabled (the controller
    /// family with its default controller); families switched off are disabled
    /// and their state is cleared.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        let previous = self.mode;
        if mode == previous {
            return;
        }
        for family in InputMode::FAMILIES {
            if previous.contains(family) && !mode.contains(family) {
                self.disable_family(family);
            }
        }
        self.mode = mode;
        for family in InputMode::FAMILIES {
            if mode.contains(family) && !previous.contains(family) {
                self.enable_family(family);
            }
        }
        log::info!("input mode {previous:?} -> {mode:?}");
    }

    /// Flip the bits in `mode`.
    pub fn toggle_input_mode(&mut self, mode: InputMode) {
        self.set_input_mode(self.mode.symmetric_difference(mode));
    }

    /// Handle for changing modes from other threads.
    pub fn mode_handle(&self) -> ModeHandle {
        ModeHandle::new(self.requests_tx.clone())
    }

    fn enable_family(&mut self, family: InputMode) {
        if family == InputMode::CONTROLLER {
            self.controller.enable();
        } else if family == InputMode::TOUCHSCREEN {
            self.touch.enable();
        } else if family == InputMode::KEYBOARD {
            self.keyboard.enable();
        } else if family == InputMode::MOUSE {
            self.mouse.enable();
        }
    }

    fn disable_family(&mut self, family: InputMode) {
        if family == InputMode::CONTROLLER {
            self.controller.disable();
            self.controller_state.reset();
        } else if family == InputMode::TOUCHSCREEN {
            self.touch.disable();
            self.touch_state.reset();
        } else if family == InputMode::KEYBOARD {
            self.keyboard.disable();
            self.keyboard_state.reset();
        } else if family == InputMode::MOUSE {
            self.mouse.disable();
            self.mouse_state.reset();
        }
    }

    fn apply_mode_requests(&mut self) {
        let requests: Vec<ModeRequest> = self.requests.try_iter().collect();
        for request in requests {
            match request {
                ModeRequest::Set(mode) => self.set_input_mode(mode),
                ModeRequest::Toggle(mode) => self.toggle_input_mode(mode),
            }
        }
    }

    /// Run one tick of input.
    ///
    /// Applies pending mode requests, pumps adapter presence, drains the queue,
    /// reacts to peripheral changes, and folds the batch into the state machines
    /// of the active modes. The drained batch is returned for resize/focus
    /// handling and for apps that want raw events.
    pub fn drain_and_process(&mut self) -> Vec<Event> {
        self.apply_mode_requests();

        self.controller.pump();
        self.keyboard.pump();
        self.mouse.pump();

        let events = self.queue.dequeue_all();
        for event in &events {
            self.auto_switch(event);
        }
        self.process_inputs(&events);
        events
    }

    /// Fold a batch into the state machines of the active modes.
    pub fn process_inputs(&mut self, events: &[Event]) {
        if self.mode.contains(InputMode::CONTROLLER) {
            self.controller_state.process_inputs(events);
        }
        if self.mode.contains(InputMode::TOUCHSCREEN) {
            self.touch_state.process_inputs(events);
        }
        if self.mode.contains(InputMode::KEYBOARD) {
            self.keyboard_state.process_inputs(events);
        }
        if self.mode.contains(InputMode::MOUSE) {
            self.mouse_state.process_inputs(events);
        }
    }

    fn auto_switch(&mut self, event: &Event) {
        match event {
            Event::PeripheralConnected(peripheral) => self.on_connected(peripheral),
            Event::PeripheralDisconnected(peripheral) => self.on_disconnected(peripheral),
            _ => {}
        }
    }

    fn on_connected(&mut self, peripheral: &PeripheralEvent) {
        match peripheral.kind {
            PeripheralKind::PhysicalController if self.mode.contains(InputMode::CONTROLLER) => {
                match self.controller.active_controller().map(Controller::is_virtual) {
                    Some(true) => {
                        if self.auto_switch.to_physical_on_connect {
                            log::info!("switching to physical controller {}", peripheral.id);
                            // Failures are logged by the adapter.
                            let _ = self.controller.enable_controller_by_id(&peripheral.id);
                        }
                    }
                    Some(false) => {}
                    None => self.controller.enable(),
                }
            }
            PeripheralKind::Keyboard if self.mode.contains(InputMode::KEYBOARD) => {
                self.keyboard.enable();
            }
            _ => {}
        }
    }

    fn on_disconnected(&mut self, peripheral: &PeripheralEvent) {
        match peripheral.kind {
            PeripheralKind::PhysicalController if self.mode.contains(InputMode::CONTROLLER) => {
                if self.controller.active_controller().is_some() {
                    return;
                }
                if self.controller.physical_count() > 0 || self.auto_switch.to_virtual_on_disconnect
                {
                    self.controller.enable();
                }
            }
            PeripheralKind::Keyboard if self.mode.contains(InputMode::KEYBOARD) => {
                if self.keyboard.keyboards().is_empty() {
                    if self.auto_switch.clear_keyboard_on_disconnect {
                        log::info!("last keyboard disconnected; leaving keyboard mode");
                        self.set_input_mode(self.mode.difference(InputMode::KEYBOARD));
                    }
                } else {
                    self.keyboard.enable();
                }
            }
            _ => {}
        }
    }

    pub fn register_gesture_source(&mut self, surface: Arc<dyn GestureSurface>) {
        self.touch.register_gesture_source(surface);
    }

    pub fn unregister_gesture_source(&mut self, surface_id: &str) -> bool {
        self.touch.unregister_gesture_source(surface_id)
    }

    /// Make `id` the active controller.
    pub fn enable_controller_by_id(&mut self, id: &str) -> Result<(), SourceError> {
        self.controller.enable_controller_by_id(id)
    }

    /// Every known controller, keyboard and mouse.
    pub fn peripherals(&self) -> Vec<Peripheral> {
        self.controller
            .controllers()
            .iter()
            .map(Peripheral::from)
            .chain(self.keyboard.keyboards().iter().map(Peripheral::from_device))
            .chain(self.mouse.mice().iter().map(Peripheral::from_device))
            .collect()
    }

    pub fn controllers(&self) -> &[Controller] {
        self.controller.controllers()
    }

    pub fn active_controller(&self) -> Option<&Controller> {
        self.controller.active_controller()
    }

    pub fn controller_state(&self) -> &ControllerState {
        &self.controller_state
    }

    pub fn touch_state(&self) -> &TouchScreenState {
        &self.touch_state
    }

    pub fn keyboard_state(&self) -> &KeyboardState {
        &self.keyboard_state
    }

    pub fn mouse_state(&self) -> &MouseState {
        &self.mouse_state
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            mode: self.mode,
            peripherals: self.peripherals(),
            active_controller: self.active_controller().map(|c| c.id.clone()),
            gesture_surfaces: self.touch.surface_count(),
            queued: self.queue.peek_all(),
            dropped: self.queue.dropped(),
        }
    }
}
