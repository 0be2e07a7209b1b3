//! Platform backends.
//!
//! Implementations of the [`device`](crate::device) seams.
//!
//! # Feature flags
//! - **`hid`**: HID joystick/gamepad discovery through `hidapi` ([`hid::HidSource`]).
//!
//! The in-memory [`virtual_input`] backend is always available. On Windows the
//! [`windows::SystemCursor`] drives the real cursor.

use std::sync::Arc;

use crate::device::{CursorControl, PeripheralSource};
use crate::system::InputSources;

use self::virtual_input::VirtualSource;

pub mod virtual_input;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(windows)]
#[cfg_attr(docsrs, doc(cfg(windows)))]
pub mod windows;

/// `true` for Generic Desktop joystick, gamepad and multi-axis controller usages.
///
/// Mice (0x02) and keyboards (0x06) on the same page are rejected.
pub fn is_gamepad_usage(usage_page: u16, usage: u16) -> bool {
    const GENERIC_DESKTOP: u16 = 0x01;
    usage_page == GENERIC_DESKTOP && matches!(usage, 0x04 | 0x05 | 0x08)
}

/// Best sources the enabled backends offer.
///
/// Controllers come from HID discovery when the `hid` feature is on and `hidapi`
/// initializes; otherwise from an in-memory source. Both synthesize an on-screen
/// controller, which stays the one activated while HID pads lack a gamepad
/// profile.
/// Keyboards and mice are in-memory sources the host feeds from its window events.
pub fn platform_sources() -> InputSources {
    InputSources {
        controllers: controller_source(),
        keyboards: Arc::new(VirtualSource::keyboards()),
        mice: Arc::new(VirtualSource::mice()),
        cursor: cursor(),
    }
}

fn controller_source() -> Arc<dyn PeripheralSource> {
    #[cfg(feature = "hid")]
    {
        match hid::HidSource::new() {
            Ok(source) => return Arc::new(source),
            Err(e) => log::warn!("hid: failed to initialize ({e}); using virtual controllers"),
        }
    }
    Arc::new(VirtualSource::controllers())
}

fn cursor() -> Arc<dyn CursorControl> {
    #[cfg(windows)]
    {
        Arc::new(windows::SystemCursor::new())
    }
    #[cfg(not(windows))]
    {
        Arc::new(crate::device::NoCursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamepad_usages() {
        assert!(is_gamepad_usage(0x01, 0x05));
        assert!(is_gamepad_usage(0x01, 0x04));
        assert!(is_gamepad_usage(0x01, 0x08));
        assert!(!is_gamepad_usage(0x01, 0x02));
        assert!(!is_gamepad_usage(0x01, 0x06));
        assert!(!is_gamepad_usage(0x0C, 0x05));
    }

    #[test]
    fn platform_sources_build() {
        let sources = platform_sources();
        assert!(sources.keyboards.connected_devices().is_empty());
    }
}
