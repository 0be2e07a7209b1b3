//! Game controller adapter.
//!
//! [`ControllerInput`] tracks the controllers a [`PeripheralSource`] reports and
//! keeps at most one of them *active*. Only the active controller has a raw input
//! handler installed; every raw change it reports becomes exactly one
//! [`ControllerEvent`] in the shared queue.
//!
//! A software controller is synthesized at construction (when the source supports
//! it) so there is always something to fall back to. Its on-screen overlay is shown
//! only while it is the active controller.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::device::{
    Capabilities, DeviceClass, DeviceInfo, InputHandler, PeripheralSource, PresenceChange,
    PresenceInbox, RawInput,
};
use crate::error::SourceError;
use crate::event::{
    ControllerEvent, Event, InputEvent, PeripheralEvent, PeripheralKind, PressState, Stick,
    StickPhase, Vec2,
};
use crate::queue::EventQueue;

/// Platform handle of a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RawController {
    Physical(u64),
    Virtual(u64),
}

/// A tracked controller. Equality and hashing use `id` only.
#[derive(Clone, Debug, Serialize)]
pub struct Controller {
    pub id: String,
    pub description: String,
    pub raw: RawController,
    pub capabilities: Capabilities,
}

impl Controller {
    pub fn from_device(info: &DeviceInfo) -> Self {
        let raw = if info.is_virtual {
            RawController::Virtual(info.handle)
        } else {
            RawController::Physical(info.handle)
        };
        Self {
            id: info.id.clone(),
            description: info.description.clone(),
            raw,
            capabilities: info.capabilities,
        }
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        matches!(self.raw, RawController::Virtual(_))
    }

    pub fn peripheral_event(&self) -> PeripheralEvent {
        let kind = if self.is_virtual() {
            PeripheralKind::VirtualController
        } else {
            PeripheralKind::PhysicalController
        };
        PeripheralEvent::new(kind, self.id.clone())
    }
}

impl PartialEq for Controller {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Controller {}

impl Hash for Controller {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Rest/away latch for one two-axis input.
///
/// Turns a stream of values into zero-crossing phases: leaving rest is `Began`,
/// moving while away is `Changed`, returning to rest is `Ended`, and values at rest
/// while already at rest produce nothing. The swap makes `Began` fire once even if
/// two threads report at the same time.
#[derive(Debug, Default)]
pub struct StickLatch {
    active: AtomicBool,
}

impl StickLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, value: Vec2) -> Option<StickPhase> {
        if value.is_zero() {
            if self.active.swap(false, Ordering::AcqRel) {
                Some(StickPhase::Ended)
            } else {
                None
            }
        } else if self.active.swap(true, Ordering::AcqRel) {
            Some(StickPhase::Changed)
        } else {
            Some(StickPhase::Began)
        }
    }
}

/// Map one raw change of the active controller to a taxonomy event.
///
/// `latches` holds the left and right stick latches of that controller.
pub(crate) fn translate(raw: RawInput, latches: &[StickLatch; 2]) -> Option<ControllerEvent> {
    match raw {
        RawInput::Button { button, pressed } => Some(ControllerEvent::Button {
            button,
            state: PressState::from_pressed(pressed),
        }),
        RawInput::Thumbstick { stick, value } => {
            let latch = match stick {
                Stick::Left => &latches[0],
                Stick::Right => &latches[1],
            };
            let state = latch.phase(value)?;
            let offset = if state == StickPhase::Ended {
                Vec2::ZERO
            } else {
                value
            };
            Some(ControllerEvent::Stick {
                stick,
                state,
                offset,
            })
        }
        RawInput::ScreenTap { pressed, position } => Some(ControllerEvent::ScreenTap {
            state: PressState::from_pressed(pressed),
            position,
        }),
        other => {
            log::warn!("controller handler ignoring non-controller input {other:?}");
            None
        }
    }
}

fn can_activate(controller: &Controller) -> bool {
    controller
        .capabilities
        .contains(Capabilities::EXTENDED_GAMEPAD)
}

/// Controller adapter. Lives on the consumer thread.
pub struct ControllerInput {
    queue: Arc<EventQueue<Event>>,
    source: Arc<dyn PeripheralSource>,
    inbox: PresenceInbox,
    controllers: Vec<Controller>,
    active: Option<String>,
    fallback: Option<String>,
    /// Last controller picked through `enable_controller_by_id`; `enable()`
    /// returns to it while it is still tracked and capable.
    selected: Option<String>,
}

impl ControllerInput {
    /// Start tracking the source's controllers.
    ///
    /// Enqueues `PeripheralConnected` for the synthesized controller and for every
    /// controller already connected. Nothing is activated yet.
    pub fn new(queue: Arc<EventQueue<Event>>, source: Arc<dyn PeripheralSource>) -> Self {
        let inbox = PresenceInbox::register(source.as_ref());
        let mut input = Self {
            queue,
            source,
            inbox,
            controllers: Vec::new(),
            active: None,
            fallback: None,
            selected: None,
        };

        match input.source.synthesize_virtual() {
            Ok(info) => {
                input.source.set_overlay_visible(&info.id, false);
                input.fallback = Some(info.id.clone());
                input.track(info);
            }
            Err(SourceError::Unsupported(_)) => {
                log::debug!("controller source cannot synthesize a virtual controller");
            }
            Err(e) => log::warn!("failed to synthesize virtual controller: {e}"),
        }

        for info in input.source.connected_devices() {
            if input.controllers.iter().any(|c| c.id == info.id) {
                continue;
            }
            input.track(info);
        }

        log::info!(
            "controller input ready: {} controller(s), {} physical",
            input.controllers.len(),
            input.physical_count()
        );
        input
    }

    fn track(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Controller {
            log::warn!(
                "controller source reported non-controller device {} ({:?})",
                info.id,
                info.class
            );
            return;
        }
        if self.controllers.iter().any(|c| c.id == info.id) {
            log::error!("controller {} connected twice; ignoring", info.id);
            return;
        }
        log::info!("controller connected: {} ({})", info.description, info.id);
        self.controllers.push(Controller::from_device(&info));
        self.queue
            .enqueue(Event::PeripheralConnected(info.peripheral_event()));
    }

    fn untrack(&mut self, info: DeviceInfo) {
        if info.class != DeviceClass::Controller {
            log::warn!(
                "controller source reported non-controller device {} ({:?})",
                info.id,
                info.class
            );
            return;
        }
        let Some(pos) = self.controllers.iter().position(|c| c.id == info.id) else {
            log::error!("unknown controller {} disconnected; ignoring", info.id);
            return;
        };
        if self.active.as_deref() == Some(info.id.as_str()) {
            self.disable();
        }
        let controller = self.controllers.remove(pos);
        if self.fallback.as_deref() == Some(controller.id.as_str()) {
            self.fallback = None;
        }
        if self.selected.as_deref() == Some(controller.id.as_str()) {
            self.selected = None;
        }
        log::info!(
            "controller disconnected: {} ({})",
            controller.description,
            controller.id
        );
        self.queue
            .enqueue(Event::PeripheralDisconnected(controller.peripheral_event()));
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

    /// Activate a controller unless one is already active.
    ///
    /// The controller last chosen with [`enable_controller_by_id`] wins while it is
    /// still connected. Otherwise physical controllers are preferred over the
    /// synthesized one, and controllers without the extended gamepad profile are
    /// skipped.
    ///
    /// [`enable_controller_by_id`]: Self::enable_controller_by_id
    pub fn enable(&mut self) {
        if self.active.is_some() {
            return;
        }
        let Some(id) = self.selected_id().or_else(|| self.default_controller_id()) else {
            log::warn!("no controller available to enable");
            return;
        };
        // Failures are logged by `activate`.
        let _ = self.activate(&id);
    }

    fn selected_id(&self) -> Option<String> {
        let id = self.selected.as_deref()?;
        self.controllers
            .iter()
            .find(|c| c.id == id && can_activate(c))
            .map(|c| c.id.clone())
    }

    fn default_controller_id(&self) -> Option<String> {
        let capable = || self.controllers.iter().filter(|c| can_activate(c));
        capable()
            .find(|c| !c.is_virtual())
            .or_else(|| {
                let fallback = self.fallback.as_deref()?;
                capable().find(|c| c.id == fallback)
            })
            .or_else(|| capable().next())
            .map(|c| c.id.clone())
    }

    /// Make `id` the active controller, deactivating the previous one first.
    ///
    /// The choice is remembered: switching controller mode off and on again
    /// restores it.
    pub fn enable_controller_by_id(&mut self, id: &str) -> Result<(), SourceError> {
        self.activate(id)?;
        self.selected = Some(id.to_owned());
        Ok(())
    }

    fn activate(&mut self, id: &str) -> Result<(), SourceError> {
        let Some(controller) = self.controllers.iter().find(|c| c.id == id).cloned() else {
            log::error!("cannot enable unknown controller {id}");
            return Err(SourceError::UnknownDevice(id.to_owned()));
        };
        if !can_activate(&controller) {
            log::error!(
                "controller {} has no extended gamepad profile; not enabling",
                controller.id
            );
            return Err(SourceError::MissingCapability {
                device_id: controller.id,
                missing: Capabilities::EXTENDED_GAMEPAD,
            });
        }
        if self.active.as_deref() == Some(id) {
            return Ok(());
        }

        self.disable();

        let handler = Self::input_handler(self.queue.clone());
        if let Err(e) = self.source.on_input_changed(id, Some(handler)) {
            log::error!("failed to install input handler for controller {id}: {e}");
            return Err(e);
        }
        if controller.is_virtual() {
            self.source.set_overlay_visible(id, true);
        }
        log::info!("controller enabled: {} ({id})", controller.description);
        self.active = Some(controller.id);
        Ok(())
    }

    fn input_handler(queue: Arc<EventQueue<Event>>) -> InputHandler {
        let latches = [StickLatch::new(), StickLatch::new()];
        Arc::new(move |raw: RawInput| {
            if let Some(event) = translate(raw, &latches) {
                #[cfg(feature = "debug-log")]
                log::trace!("controller event {event:?}");
                queue.enqueue(Event::Input(InputEvent::Controller(event)));
            }
        })
    }

    /// Deactivate the active controller, if any.
    pub fn disable(&mut self) {
        let Some(id) = self.active.take() else {
            return;
        };
        if let Err(e) = self.source.on_input_changed(&id, None) {
            log::warn!("failed to remove input handler for controller {id}: {e}");
        }
        if self
            .controllers
            .iter()
            .any(|c| c.id == id && c.is_virtual())
        {
            self.source.set_overlay_visible(&id, false);
        }
        log::info!("controller disabled: {id}");
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn active_controller(&self) -> Option<&Controller> {
        let id = self.active.as_deref()?;
        self.controllers.iter().find(|c| c.id == id)
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    pub fn physical_count(&self) -> usize {
        self.controllers.iter().filter(|c| !c.is_virtual()).count()
    }
}

impl Drop for ControllerInput {
    fn drop(&mut self) {
        self.disable();
    }
}
