//! Keyboard adapter and per-frame keyboard state.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::device::{
    Capabilities, DeviceClass, DeviceInfo, InputHandler, PeripheralSource, PresenceChange,
    PresenceInbox, RawInput,
};
use crate::edge::FrameState;
use crate::event::{Event, InputEvent, KeyboardEvent};
use crate::keycode::KeyCode;
use crate::queue::EventQueue;

/// Keyboard adapter. One keyboard (the first connected) is active at a time.
pub struct KeyboardInput {
    queue: Arc<EventQueue<Event>>,
    source: Arc<dyn PeripheralSource>,
    inbox: PresenceInbox,
    keyboards: Vec<DeviceInfo>,
    active: Option<String>,
}

impl KeyboardInput {
    pub fn new(queue: Arc<EventQueue<Event>>, source: Arc<dyn PeripheralSource>) -> Self {
        let inbox = PresenceInbox::register(source.as_ref());
        let mut input = Self {
            queue,
            source,
            inbox,
            keyboards: Vec::new(),
            active: None,
        };
        for info in input.source.connected_devices() {
            input.track(info);
        }
        input
    }

    fn track(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Keyboard {
            log::warn!("keyboard source reported {:?} device {}", info.class, info.id);
            return;
        }
        if self.keyboards.iter().any(|k| k.id == info.id) {
            log::error!("keyboard {} connected twice; ignoring", info.id);
            return;
        }
        log::info!("keyboard connected: {} ({})", info.description, info.id);
        self.queue
            .enqueue(Event::PeripheralConnected(info.peripheral_event()));
        self.keyboards.push(info);
    }

    fn untrack(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Keyboard {
            log::warn!("keyboard source reported {:?} device {}", info.class, info.id);
            return;
        }
        let Some(pos) = self.keyboards.iter().position(|k| k.id == info.id) else {
            log::error!("unknown keyboard {} disconnected; ignoring", info.id);
            return;
        };
        if self.active.as_deref() == Some(info.id.as_str()) {
            self.disable();
        }
        let keyboard = self.keyboards.remove(pos);
        log::info!("keyboard disconnected: {}", keyboard.id);
        self.queue
            .enqueue(Event::PeripheralDisconnected(keyboard.peripheral_event()));
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

    /// Start listening to the first connected keyboard.
    pub fn enable(&mut self) {
        if self.active.is_some() {
            return;
        }
        let Some(keyboard) = self.keyboards.first() else {
            log::warn!("no keyboard connected; keyboard input stays off");
            return;
        };
        if !keyboard.capabilities.contains(Capabilities::KEYBOARD_INPUT) {
            log::error!("keyboard {} reports no key input; not enabling", keyboard.id);
            return;
        }
        let id = keyboard.id.clone();
        let handler = Self::input_handler(self.queue.clone());
        if let Err(e) = self.source.on_input_changed(&id, Some(handler)) {
            log::error!("failed to install key handler for {id}: {e}");
            return;
        }
        log::info!("keyboard enabled: {id}");
        self.active = Some(id);
    }

    fn input_handler(queue: Arc<EventQueue<Event>>) -> InputHandler {
        Arc::new(move |raw: RawInput| match raw {
            RawInput::Key { usage, pressed } => {
                let code = KeyCode::from_hid_usage(usage);
                let event = if pressed {
                    KeyboardEvent::KeyDown(code)
                } else {
                    KeyboardEvent::KeyUp(code)
                };
                #[cfg(feature = "debug-log")]
                log::trace!("keyboard usage {usage:#04x} -> {event:?}");
                queue.enqueue(Event::Input(InputEvent::Keyboard(event)));
            }
            other => log::warn!("keyboard handler ignoring non-key input {other:?}"),
        })
    }

    pub fn disable(&mut self) {
        let Some(id) = self.active.take() else {
            return;
        };
        if let Err(e) = self.source.on_input_changed(&id, None) {
            log::warn!("failed to remove key handler for {id}: {e}");
        }
        log::info!("keyboard disabled: {id}");
    }

    pub fn keyboards(&self) -> &[DeviceInfo] {
        &self.keyboards
    }

    pub fn active_keyboard(&self) -> Option<&DeviceInfo> {
        let id = self.active.as_deref()?;
        self.keyboards.iter().find(|k| k.id == id)
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Pressed / held / released key sets.
///
/// A key is in at most one of `pressed` and `held`. Pressed keys move to held at
/// the next tick; released keys are cleared at the next tick.
#[derive(Clone, Debug, Default, Serialize)]
pub struct KeyboardState {
    pressed: BTreeSet<KeyCode>,
    held: BTreeSet<KeyCode>,
    released: BTreeSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn progress_existing_states(&mut self) {
        let pressed = std::mem::take(&mut self.pressed);
        self.held.extend(pressed);
        self.released.clear();
    }

    fn apply(&mut self, event: KeyboardEvent) {
        match event {
            KeyboardEvent::KeyDown(key) => {
                // Key repeat for a key that is already down.
                if self.held.contains(&key) {
                    return;
                }
                self.released.remove(&key);
                self.pressed.insert(key);
            }
            KeyboardEvent::KeyUp(key) => {
                self.pressed.remove(&key);
                self.held.remove(&key);
                self.released.insert(key);
            }
        }
    }

    /// Went down this tick.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Down since an earlier tick.
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Went up this tick.
    pub fn is_released(&self, key: KeyCode) -> bool {
        self.released.contains(&key)
    }

    /// Down, whether new this tick or not.
    pub fn is_active(&self, key: KeyCode) -> bool {
        self.is_pressed(key) || self.is_held(key)
    }

    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().copied()
    }

    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }

    pub fn released(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.released.iter().copied()
    }

    /// Any modifier key is down.
    pub fn any_modifier(&self) -> bool {
        self.pressed().chain(self.held()).any(KeyCode::is_modifier)
    }
}

impl FrameState for KeyboardState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.progress_existing_states();
        for event in events {
            if let Event::Input(InputEvent::Keyboard(key)) = event {
                self.apply(*key);
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualSource;
    use crate::event::{PeripheralEvent, PeripheralKind};

    fn down(key: KeyCode) -> Event {
        Event::Input(InputEvent::Keyboard(KeyboardEvent::KeyDown(key)))
    }

    fn up(key: KeyCode) -> Event {
        Event::Input(InputEvent::Keyboard(KeyboardEvent::KeyUp(key)))
    }

    #[test]
    fn press_hold_release() {
        let mut state = KeyboardState::new();
        state.process_inputs(&[down(KeyCode::W)]);
        assert!(state.is_pressed(KeyCode::W));
        assert!(!state.is_held(KeyCode::W));

        state.process_inputs(&[]);
        assert!(!state.is_pressed(KeyCode::W));
        assert!(state.is_held(KeyCode::W));

        state.process_inputs(&[up(KeyCode::W)]);
        assert!(state.is_released(KeyCode::W));
        assert!(!state.is_active(KeyCode::W));

        state.process_inputs(&[]);
        assert!(!state.is_released(KeyCode::W));
    }

    #[test]
    fn repeat_while_held_is_ignored() {
        let mut state = KeyboardState::new();
        state.process_inputs(&[down(KeyCode::Space)]);
        state.process_inputs(&[down(KeyCode::Space)]);
        assert!(state.is_held(KeyCode::Space));
        assert!(!state.is_pressed(KeyCode::Space));
    }

    #[test]
    fn tap_within_one_tick_is_released() {
        let mut state = KeyboardState::new();
        state.process_inputs(&[down(KeyCode::E), up(KeyCode::E)]);
        assert!(state.is_released(KeyCode::E));
        assert!(!state.is_pressed(KeyCode::E));
    }

    #[test]
    fn modifiers() {
        let mut state = KeyboardState::new();
        state.process_inputs(&[down(KeyCode::A)]);
        assert!(!state.any_modifier());
        state.process_inputs(&[down(KeyCode::LeftShift)]);
        assert!(state.any_modifier());
    }

    fn keyboard_source() -> Arc<VirtualSource> {
        Arc::new(VirtualSource::keyboards().with_device(DeviceInfo::keyboard("kb", "Keyboard")))
    }

    #[test]
    fn adapter_translates_usages() {
        let queue = Arc::new(EventQueue::new(16));
        let source = keyboard_source();
        let mut input = KeyboardInput::new(queue.clone(), source.clone());
        assert_eq!(
            queue.dequeue_all(),
            vec![Event::PeripheralConnected(PeripheralEvent::new(
                PeripheralKind::Keyboard,
                "kb"
            ))]
        );

        input.enable();
        source.key("kb", 0x04, true);
        source.key("kb", 0x04, false);
        source.key("kb", 0xFFFF, true);
        assert_eq!(
            queue.dequeue_all(),
            vec![
                down(KeyCode::A),
                up(KeyCode::A),
                down(KeyCode::Unknown),
            ]
        );

        input.disable();
        assert!(!source.key("kb", 0x04, true));
    }

    #[test]
    fn enable_without_keyboard_is_a_no_op() {
        let queue = Arc::new(EventQueue::new(16));
        let mut input = KeyboardInput::new(queue, Arc::new(VirtualSource::keyboards()));
        input.enable();
        assert!(!input.is_enabled());
    }

    #[test]
    fn missing_capability_is_a_no_op() {
        let queue = Arc::new(EventQueue::new(16));
        let source = Arc::new(VirtualSource::keyboards().with_device(
            DeviceInfo::keyboard("kb", "Keyboard").with_capabilities(Capabilities::empty()),
        ));
        let mut input = KeyboardInput::new(queue, source.clone());
        input.enable();
        assert!(!input.is_enabled());
        assert!(!source.has_handler("kb"));
    }

    #[test]
    fn disconnect_of_active_keyboard() {
        let queue = Arc::new(EventQueue::new(16));
        let source = keyboard_source();
        let mut input = KeyboardInput::new(queue.clone(), source.clone());
        input.enable();
        queue.dequeue_all();

        source.disconnect("kb");
        input.pump();
        assert!(!input.is_enabled());
        assert!(input.keyboards().is_empty());
        assert_eq!(
            queue.dequeue_all(),
            vec![Event::PeripheralDisconnected(PeripheralEvent::new(
                PeripheralKind::Keyboard,
                "kb"
            ))]
        );
    }
}
