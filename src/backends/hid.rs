//! HID game controller discovery via `hidapi`.
//!
//! [`HidSource`] enumerates joysticks and gamepads and reports them as physical
//! controllers. Report decoding is not implemented, so devices are published
//! without the extended gamepad profile: they show up as peripherals, and the
//! controller adapter refuses to activate them.
//!
//! On-screen controllers are synthesized by an embedded [`VirtualSource`], so
//! controller mode always has something it can activate. Drive it through
//! [`HidSource::on_screen`].
//!
//! There is no hotplug callback in `hidapi`; call [`HidSource::refresh`] from time
//! to time to pick up connects and disconnects.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hidapi::HidApi;

use crate::backends::is_gamepad_usage;
use crate::backends::virtual_input::VirtualSource;
use crate::device::{
    Capabilities, DeviceInfo, InputHandler, PeripheralSource, PresenceChange, PresenceHandler,
};
use crate::error::SourceError;

#[derive(Default)]
struct Inner {
    devices: Vec<DeviceInfo>,
    presence: Option<PresenceHandler>,
}

pub struct HidSource {
    inner: Mutex<Inner>,
    on_screen: Arc<VirtualSource>,
}

impl HidSource {
    pub fn new() -> Result<Self, hidapi::HidError> {
        let devices = enumerate()?;
        log::info!("hid: {} controller(s) found", devices.len());
        Ok(Self::with_devices(devices))
    }

    fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                devices,
                presence: None,
            }),
            on_screen: Arc::new(VirtualSource::controllers()),
        }
    }

    /// Source of the synthesized on-screen controllers.
    pub fn on_screen(&self) -> &Arc<VirtualSource> {
        &self.on_screen
    }

    fn is_on_screen(&self, device_id: &str) -> bool {
        self.on_screen
            .connected_devices()
            .iter()
            .any(|d| d.id == device_id)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-enumerate and report what changed since the last enumeration.
    pub fn refresh(&self) -> Result<(), hidapi::HidError> {
        let current = enumerate()?;
        let (changes, handler) = {
            let mut inner = self.lock();
            let mut changes = Vec::new();
            for old in &inner.devices {
                if !current.iter().any(|d| d.id == old.id) {
                    changes.push(PresenceChange::Disconnected(old.clone()));
                }
            }
            for new in &current {
                if !inner.devices.iter().any(|d| d.id == new.id) {
                    changes.push(PresenceChange::Connected(new.clone()));
                }
            }
            inner.devices = current;
            (changes, inner.presence.clone())
        };
        if let Some(handler) = handler {
            for change in changes {
                handler(change);
            }
        }
        Ok(())
    }
}

fn enumerate() -> Result<Vec<DeviceInfo>, hidapi::HidError> {
    let api = HidApi::new()?;
    let mut out: Vec<DeviceInfo> = Vec::new();
    for info in api.device_list() {
        if !is_gamepad_usage(info.usage_page(), info.usage()) {
            continue;
        }
        let vid = info.vendor_id();
        let pid = info.product_id();
        let id = format!(
            "hid:{vid:04x}:{pid:04x}:{}",
            info.path().to_string_lossy()
        );
        // One physical device can expose the same path on several entries.
        if out.iter().any(|d| d.id == id) {
            continue;
        }
        let description = info.product_string().unwrap_or("HID Gamepad").to_owned();

        #[cfg(feature = "debug-log")]
        log::debug!(
            "hid: accepted {description} usage_page={:#06x} usage={:#06x}",
            info.usage_page(),
            info.usage()
        );

        out.push(
            DeviceInfo::controller(id, description)
                .with_handle((u64::from(vid) << 16) | u64::from(pid))
                .with_capabilities(Capabilities::empty()),
        );
    }
    Ok(out)
}

impl PeripheralSource for HidSource {
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
        if self.is_on_screen(device_id) {
            return self.on_screen.on_input_changed(device_id, handler);
        }
        match handler {
            None => Ok(()),
            Some(_) => Err(SourceError::MissingCapability {
                device_id: device_id.to_owned(),
                missing: Capabilities::EXTENDED_GAMEPAD,
            }),
        }
    }

    fn synthesize_virtual(&self) -> Result<DeviceInfo, SourceError> {
        self.on_screen.synthesize_virtual()
    }

    fn set_overlay_visible(&self, device_id: &str, visible: bool) {
        self.on_screen.set_overlay_visible(device_id, visible);
    }
}
