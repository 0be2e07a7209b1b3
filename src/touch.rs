//! Touchscreen adapter.
//!
//! Touch input comes from gesture recognizers on views rather than from a device
//! source. Views are registered with [`TouchInput::register_gesture_source`]; while
//! touch input is enabled each registered surface reports pan and tap gestures,
//! which are translated to [`PanEvent`]s and [`TapEvent`]s.

use std::sync::Arc;

use crate::device::{GestureHandler, GesturePhase, GestureSurface, RawGesture};
use crate::event::{Event, InputEvent, PanEvent, PanPhase, TapEvent, TapPhase};
use crate::queue::EventQueue;

/// Map one recognizer callback to a taxonomy event. `Possible` never produces one.
pub(crate) fn translate(gesture: RawGesture) -> Option<InputEvent> {
    match gesture {
        RawGesture::Pan { phase, position } => {
            let state = match phase {
                GesturePhase::Began => PanPhase::Began,
                GesturePhase::Changed => PanPhase::Panning,
                GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                    PanPhase::Ended
                }
                GesturePhase::Possible => return None,
            };
            Some(InputEvent::Pan(PanEvent { state, position }))
        }
        RawGesture::Tap {
            kind,
            phase,
            position,
        } => {
            let state = match phase {
                GesturePhase::Began => TapPhase::Began,
                GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                    TapPhase::Ended
                }
                GesturePhase::Possible | GesturePhase::Changed => return None,
            };
            Some(InputEvent::Tap(TapEvent {
                state,
                kind,
                position,
            }))
        }
    }
}

pub struct TouchInput {
    queue: Arc<EventQueue<Event>>,
    surfaces: Vec<Arc<dyn GestureSurface>>,
    enabled: bool,
}

impl TouchInput {
    pub fn new(queue: Arc<EventQueue<Event>>) -> Self {
        Self {
            queue,
            surfaces: Vec::new(),
            enabled: false,
        }
    }

    fn gesture_handler(&self) -> GestureHandler {
        let queue = self.queue.clone();
        Arc::new(move |gesture: RawGesture| {
            if let Some(event) = translate(gesture) {
                #[cfg(feature = "debug-log")]
                log::trace!("touch event {event:?}");
                queue.enqueue(Event::Input(event));
            }
        })
    }

    /// Add a view to recognize gestures on. A surface with the same id replaces the
    /// previous one.
    pub fn register_gesture_source(&mut self, surface: Arc<dyn GestureSurface>) {
        let id = surface.surface_id().to_owned();
        if self.unregister_gesture_source(&id) {
            log::warn!("gesture surface {id} registered twice; replacing");
        }
        if self.enabled {
            surface.attach(self.gesture_handler());
        }
        log::debug!("gesture surface registered: {id}");
        self.surfaces.push(surface);
    }

    /// Remove a view. Returns `false` if it was not registered.
    pub fn unregister_gesture_source(&mut self, surface_id: &str) -> bool {
        let Some(pos) = self
            .surfaces
            .iter()
            .position(|s| s.surface_id() == surface_id)
        else {
            return false;
        };
        let surface = self.surfaces.remove(pos);
        if self.enabled {
            surface.detach();
        }
        true
    }

    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        for surface in &self.surfaces {
            surface.attach(self.gesture_handler());
        }
        log::info!(
            "touch input enabled on {} surface(s)",
            self.surfaces.len()
        );
    }

    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        for surface in &self.surfaces {
            surface.detach();
        }
        log::info!("touch input disabled");
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Drop for TouchInput {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualSurface;
    use crate::event::{TapKind, Vec2};

    fn pan(phase: GesturePhase) -> RawGesture {
        RawGesture::Pan {
            phase,
            position: Vec2::new(1.0, 2.0),
        }
    }

    #[test]
    fn pan_phases() {
        let phases: Vec<_> = [
            GesturePhase::Possible,
            GesturePhase::Began,
            GesturePhase::Changed,
            GesturePhase::Ended,
            GesturePhase::Cancelled,
            GesturePhase::Failed,
        ]
        .into_iter()
        .map(|p| match translate(pan(p)) {
            Some(InputEvent::Pan(e)) => Some(e.state),
            _ => None,
        })
        .collect();
        assert_eq!(
            phases,
            vec![
                None,
                Some(PanPhase::Began),
                Some(PanPhase::Panning),
                Some(PanPhase::Ended),
                Some(PanPhase::Ended),
                Some(PanPhase::Ended),
            ]
        );
    }

    #[test]
    fn tap_phases() {
        let tap = |phase| RawGesture::Tap {
            kind: TapKind::DoubleTap,
            phase,
            position: Vec2::ZERO,
        };
        assert_eq!(translate(tap(GesturePhase::Changed)), None);
        assert_eq!(
            translate(tap(GesturePhase::Failed)),
            Some(InputEvent::Tap(TapEvent {
                state: TapPhase::Ended,
                kind: TapKind::DoubleTap,
                position: Vec2::ZERO,
            }))
        );
    }

    #[test]
    fn surfaces_attach_only_while_enabled() {
        let queue = Arc::new(EventQueue::new(8));
        let surface = Arc::new(VirtualSurface::new("main"));
        let mut touch = TouchInput::new(queue.clone());
        touch.register_gesture_source(surface.clone());
        assert!(!surface.is_attached());

        touch.enable();
        assert!(surface.gesture(pan(GesturePhase::Began)));
        assert_eq!(queue.len(), 1);

        touch.disable();
        assert!(!surface.gesture(pan(GesturePhase::Ended)));

        touch.enable();
        assert!(touch.unregister_gesture_source("main"));
        assert!(!surface.is_attached());
        assert!(!touch.unregister_gesture_source("main"));
    }

    #[test]
    fn registering_while_enabled_attaches() {
        let queue = Arc::new(EventQueue::new(8));
        let mut touch = TouchInput::new(queue);
        touch.enable();
        let surface = Arc::new(VirtualSurface::new("late"));
        touch.register_gesture_source(surface.clone());
        assert!(surface.is_attached());
        touch.register_gesture_source(surface.clone());
        assert_eq!(touch.surface_count(), 1);
        assert!(surface.is_attached());
    }
}
