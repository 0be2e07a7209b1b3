//! In-memory peripherals.
//!
//! [`VirtualSource`] is a [`PeripheralSource`] whose devices are created and driven
//! from code: software (on-screen) controllers, headless runs, demos and tests.
//! [`VirtualSurface`] and [`VirtualCursor`] do the same for gestures and the system
//! cursor.
//!
//! Handlers are always invoked with the internal lock released, so a handler may
//! call back into the source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::device::{
    CursorControl, DeviceClass, DeviceInfo, GestureHandler, GestureSurface, InputHandler,
    PeripheralSource, PresenceChange, PresenceHandler, RawGesture, RawInput,
};
use crate::error::SourceError;
use crate::event::{ControllerButton, Stick, Vec2};

#[derive(Default)]
struct Inner {
    devices: Vec<DeviceInfo>,
    presence: Option<PresenceHandler>,
    handlers: HashMap<String, InputHandler>,
    overlays: HashMap<String, bool>,
    synthesized: usize,
}

/// A peripheral source for one device family, driven from code.
pub struct VirtualSource {
    class: DeviceClass,
    synthesizes: bool,
    inner: Mutex<Inner>,
}

impl VirtualSource {
    pub fn new(class: DeviceClass) -> Self {
        Self {
            class,
            synthesizes: false,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Controller source that can synthesize on-screen controllers.
    pub fn controllers() -> Self {
        Self {
            synthesizes: true,
            ..Self::new(DeviceClass::Controller)
        }
    }

    pub fn keyboards() -> Self {
        Self::new(DeviceClass::Keyboard)
    }

    pub fn mice() -> Self {
        Self::new(DeviceClass::Mouse)
    }

    /// Builder: devices present before any adapter is created.
    pub fn with_device(self, info: DeviceInfo) -> Self {
        self.lock().devices.push(info);
        self
    }

    /// Builder: turn virtual-controller synthesis off.
    pub fn without_synthesis(mut self) -> Self {
        self.synthesizes = false;
        self
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plug in a device and notify the presence handler.
    pub fn connect(&self, info: DeviceInfo) {
        let handler = {
            let mut inner = self.lock();
            inner.devices.push(info.clone());
            inner.presence.clone()
        };
        if let Some(handler) = handler {
            handler(PresenceChange::Connected(info));
        }
    }

    /// Unplug a device and notify the presence handler. Returns `false` for an
    /// unknown id.
    pub fn disconnect(&self, device_id: &str) -> bool {
        let (info, handler) = {
            let mut inner = self.lock();
            let Some(pos) = inner.devices.iter().position(|d| d.id == device_id) else {
                return false;
            };
            let info = inner.devices.remove(pos);
            inner.handlers.remove(device_id);
            inner.overlays.remove(device_id);
            (info, inner.presence.clone())
        };
        if let Some(handler) = handler {
            handler(PresenceChange::Disconnected(info));
        }
        true
    }

    /// Deliver a presence notice without touching the device list.
    pub fn notify(&self, change: PresenceChange) {
        let handler = self.lock().presence.clone();
        if let Some(handler) = handler {
            handler(change);
        }
    }

    /// Deliver one raw value change to the device's handler. Returns `false` when
    /// no handler is installed.
    pub fn send(&self, device_id: &str, input: RawInput) -> bool {
        let handler = self.lock().handlers.get(device_id).cloned();
        match handler {
            Some(handler) => {
                handler(input);
                true
            }
            None => false,
        }
    }

    pub fn press(&self, device_id: &str, button: ControllerButton) -> bool {
        self.send(
            device_id,
            RawInput::Button {
                button,
                pressed: true,
            },
        )
    }

    pub fn release(&self, device_id: &str, button: ControllerButton) -> bool {
        self.send(
            device_id,
            RawInput::Button {
                button,
                pressed: false,
            },
        )
    }

    pub fn move_stick(&self, device_id: &str, stick: Stick, x: f32, y: f32) -> bool {
        self.send(
            device_id,
            RawInput::Thumbstick {
                stick,
                value: Vec2::new(x, y),
            },
        )
    }

    /// Key change by HID usage.
    pub fn key(&self, device_id: &str, usage: u16, pressed: bool) -> bool {
        self.send(device_id, RawInput::Key { usage, pressed })
    }

    pub fn has_handler(&self, device_id: &str) -> bool {
        self.lock().handlers.contains_key(device_id)
    }

    /// Overlay visibility last requested for a device, if any.
    pub fn overlay_visible(&self, device_id: &str) -> Option<bool> {
        self.lock().overlays.get(device_id).copied()
    }
}

impl PeripheralSource for VirtualSource {
    fn connected_devices(&self) -> Vec<DeviceInfo> {
        self.lock().devices.clone()
    }

    fn on_presence_changed(&self, handler: Option<PresenceHandler>) {
        self.lock().presence = handler;
    }

    fn on_input_changed(
        &self,
        device_id: &str,
        handler: Option<InputHandler>,
    ) -> Result<(), SourceError> {
        let mut inner = self.lock();
        match handler {
            Some(handler) => {
                if !inner.devices.iter().any(|d| d.id == device_id) {
                    return Err(SourceError::UnknownDevice(device_id.to_owned()));
                }
                inner.handlers.insert(device_id.to_owned(), handler);
            }
            None => {
                inner.handlers.remove(device_id);
            }
        }
        Ok(())
    }

    fn synthesize_virtual(&self) -> Result<DeviceInfo, SourceError> {
        if !self.synthesizes {
            return Err(SourceError::Unsupported("virtual devices"));
        }
        let mut inner = self.lock();
        inner.synthesized += 1;
        let info = DeviceInfo::virtual_controller(
            format!("virtual-controller-{}", inner.synthesized),
            "On-Screen Controller",
        )
        .with_handle(inner.synthesized as u64);
        inner.devices.push(info.clone());
        Ok(info)
    }

    fn set_overlay_visible(&self, device_id: &str, visible: bool) {
        self.lock().overlays.insert(device_id.to_owned(), visible);
    }
}

/// A gesture surface driven from code.
pub struct VirtualSurface {
    id: String,
    handler: Mutex<Option<GestureHandler>>,
}

impl VirtualSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handler: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<GestureHandler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a recognizer callback. Returns `false` when nothing is attached.
    pub fn gesture(&self, gesture: RawGesture) -> bool {
        let handler = self.slot().clone();
        match handler {
            Some(handler) => {
                handler(gesture);
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.slot().is_some()
    }
}

impl GestureSurface for VirtualSurface {
    fn surface_id(&self) -> &str {
        &self.id
    }

    fn attach(&self, handler: GestureHandler) {
        *self.slot() = Some(handler);
    }

    fn detach(&self) {
        self.slot().take();
    }
}

/// Cursor stand-in that records what was asked of it.
#[derive(Debug, Default)]
pub struct VirtualCursor {
    hidden: AtomicBool,
    warps: AtomicUsize,
}

impl VirtualCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }

    /// Number of `warp_to_center` calls so far.
    pub fn warps(&self) -> usize {
        self.warps.load(Ordering::Acquire)
    }
}

impl CursorControl for VirtualCursor {
    fn hide(&self) {
        self.hidden.store(true, Ordering::Release);
    }

    fn show(&self) {
        self.hidden.store(false, Ordering::Release);
    }

    fn warp_to_center(&self) {
        self.warps.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn presence_handler_sees_connect_and_disconnect() {
        let source = VirtualSource::keyboards();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        source.on_presence_changed(Some(Arc::new(move |change| {
            sink.lock().unwrap().push(change);
        })));

        source.connect(DeviceInfo::keyboard("kb", "Keyboard"));
        assert!(source.disconnect("kb"));
        assert!(!source.disconnect("kb"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], PresenceChange::Connected(_)));
        assert!(matches!(seen[1], PresenceChange::Disconnected(_)));
    }

    #[test]
    fn handlers_may_reenter_the_source() {
        let source = Arc::new(
            VirtualSource::controllers().with_device(DeviceInfo::controller("p", "Pad")),
        );
        let inner = source.clone();
        source
            .on_input_changed(
                "p",
                Some(Arc::new(move |_| {
                    // Would deadlock if the lock were held during the callback.
                    let _ = inner.connected_devices();
                })),
            )
            .unwrap();
        assert!(source.press("p", ControllerButton::A));
    }

    #[test]
    fn input_handler_requires_a_known_device() {
        let source = VirtualSource::mice();
        let err = source
            .on_input_changed("missing", Some(Arc::new(|_| {})))
            .unwrap_err();
        assert_eq!(err, SourceError::UnknownDevice("missing".into()));
        // removal always succeeds
        assert!(source.on_input_changed("missing", None).is_ok());
    }

    #[test]
    fn synthesis_is_controller_only() {
        let pads = VirtualSource::controllers();
        let info = pads.synthesize_virtual().unwrap();
        assert!(info.is_virtual);
        assert!(pads.connected_devices().contains(&info));

        assert!(VirtualSource::keyboards().synthesize_virtual().is_err());
        assert!(VirtualSource::controllers()
            .without_synthesis()
            .synthesize_virtual()
            .is_err());
    }

    #[test]
    fn surface_attach_detach() {
        let surface = VirtualSurface::new("main");
        let gesture = RawGesture::Pan {
            phase: crate::device::GesturePhase::Began,
            position: Vec2::ZERO,
        };
        assert!(!surface.gesture(gesture));
        surface.attach(Arc::new(|_| {}));
        assert!(surface.is_attached());
        assert!(surface.gesture(gesture));
        surface.detach();
        surface.detach();
        assert!(!surface.is_attached());
    }
}
