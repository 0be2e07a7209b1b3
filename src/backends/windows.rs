//! Windows system cursor.

use std::sync::atomic::{AtomicBool, Ordering};

use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SetCursorPos, ShowCursor, SM_CXSCREEN, SM_CYSCREEN,
};

use crate::device::CursorControl;

/// The Win32 cursor. `ShowCursor` keeps a display counter, so hide and show are
/// only forwarded when the visibility actually changes.
#[derive(Debug, Default)]
pub struct SystemCursor {
    hidden: AtomicBool,
}

impl SystemCursor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorControl for SystemCursor {
    fn hide(&self) {
        if !self.hidden.swap(true, Ordering::AcqRel) {
            // SAFETY: no pointers involved; affects only the calling thread's cursor count.
            unsafe {
                ShowCursor(0);
            }
        }
    }

    fn show(&self) {
        if self.hidden.swap(false, Ordering::AcqRel) {
            // SAFETY: as above.
            unsafe {
                ShowCursor(1);
            }
        }
    }

    fn warp_to_center(&self) {
        // SAFETY: plain integer arguments and results.
        let ok = unsafe {
            let x = GetSystemMetrics(SM_CXSCREEN) / 2;
            let y = GetSystemMetrics(SM_CYSCREEN) / 2;
            SetCursorPos(x, y)
        };
        if ok == 0 {
            log::warn!("SetCursorPos failed");
        }
    }
}
