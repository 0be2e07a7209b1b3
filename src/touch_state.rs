//! Per-frame touchscreen state: one pan gesture and one tap gesture at a time.
//!
//! Deltas follow the framework's world convention: x grows right, **y grows up**.
//! Screen positions have y growing down, so the y component of every delta is
//! flipped (`previous.y - current.y`).

use serde::Serialize;

use crate::edge::{EdgeState, EdgeTriggered, FrameState};
use crate::event::{Event, InputEvent, PanEvent, PanPhase, TapEvent, TapKind, TapPhase, Vec2};

/// Payload of an active pan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PanGesture {
    /// Latest touch position (screen coordinates).
    pub position: Vec2,
    /// Where the pan began.
    pub start_position: Vec2,
    /// Change since the previous sample.
    pub relative: Vec2,
    /// Change since the pan began.
    pub absolute: Vec2,
}

#[inline]
fn delta(from: Vec2, to: Vec2) -> Vec2 {
    Vec2::new(to.x - from.x, from.y - to.y)
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PanState {
    action: EdgeTriggered<PanGesture>,
}

impl PanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Held` means panning.
    pub fn phase(&self) -> EdgeState {
        self.action.state()
    }

    pub fn gesture(&self) -> &PanGesture {
        self.action.payload()
    }

    pub fn is_active(&self) -> bool {
        self.action.is_active()
    }

    pub fn is_panning(&self) -> bool {
        self.action.is_held()
    }

    pub fn progress_existing_states(&mut self) {
        self.action.advance();
    }

    fn apply(&mut self, event: &PanEvent) {
        let position = event.position;
        match event.state {
            PanPhase::Began => self.begin(position),
            PanPhase::Panning => {
                if !self.action.is_active() {
                    // Enabled mid-gesture: treat the first sample as the start.
                    self.begin(position);
                    return;
                }
                let next = self.advanced_to(position);
                self.action.hold(next);
            }
            PanPhase::Ended => {
                if self.action.state() == EdgeState::None {
                    return;
                }
                let next = self.advanced_to(position);
                self.action.end(next);
            }
        }
    }

    fn begin(&mut self, position: Vec2) {
        self.action.begin(PanGesture {
            position,
            start_position: position,
            relative: Vec2::ZERO,
            absolute: Vec2::ZERO,
        });
    }

    fn advanced_to(&self, position: Vec2) -> PanGesture {
        let current = self.action.payload();
        PanGesture {
            position,
            start_position: current.start_position,
            relative: delta(current.position, position),
            absolute: delta(current.start_position, position),
        }
    }

    fn fold(&mut self, events: &[Event]) {
        for event in events {
            if let Event::Input(InputEvent::Pan(pan)) = event {
                self.apply(pan);
            }
        }
    }
}

impl FrameState for PanState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.progress_existing_states();
        self.fold(events);
    }

    fn reset(&mut self) {
        self.action.reset();
    }
}

/// Payload of an active tap gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TapGesture {
    pub kind: TapKind,
    pub position: Vec2,
    pub start_position: Vec2,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TapGestureState {
    action: EdgeTriggered<TapGesture>,
}

impl TapGestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EdgeState {
        self.action.state()
    }

    pub fn gesture(&self) -> &TapGesture {
        self.action.payload()
    }

    pub fn kind(&self) -> TapKind {
        self.action.payload().kind
    }

    pub fn is_active(&self) -> bool {
        self.action.is_active()
    }

    /// A tap of `kind` completed this tick.
    pub fn tapped(&self, kind: TapKind) -> bool {
        self.action.is_released() && self.kind() == kind
    }

    pub fn progress_existing_states(&mut self) {
        self.action.advance();
    }

    fn apply(&mut self, event: &TapEvent) {
        let start_position = if self.action.is_active() {
            self.action.payload().start_position
        } else {
            event.position
        };
        let gesture = TapGesture {
            kind: event.kind,
            position: event.position,
            start_position,
        };
        match event.state {
            TapPhase::Began => self.action.begin(TapGesture {
                start_position: event.position,
                ..gesture
            }),
            TapPhase::Held => self.action.hold(gesture),
            TapPhase::Ended => self.action.end(gesture),
        }
    }

    fn fold(&mut self, events: &[Event]) {
        for event in events {
            if let Event::Input(InputEvent::Tap(tap)) = event {
                self.apply(tap);
            }
        }
    }
}

impl FrameState for TapGestureState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.progress_existing_states();
        self.fold(events);
    }

    fn reset(&mut self) {
        self.action.reset();
    }
}

/// Pan + tap, stepped together.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TouchScreenState {
    pub pan: PanState,
    pub tap: TapGestureState,
}

impl TouchScreenState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameState for TouchScreenState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.pan.progress_existing_states();
        self.tap.progress_existing_states();
        self.pan.fold(events);
        self.tap.fold(events);
    }

    fn reset(&mut self) {
        FrameState::reset(&mut self.pan);
        FrameState::reset(&mut self.tap);
    }
}
