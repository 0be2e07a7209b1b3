//! Edge-triggered per-control state.
//!
//! Every tracked control (button, stick, gesture) is a tiny state machine that is
//! stepped once per tick *before* the tick's events are folded in:
//!
//! ```text
//!   Began ──tick──▶ Held        Ended ──tick──▶ None (payload reset)
//!   Held  ──tick──▶ Held        None  ──tick──▶ None
//! ```
//!
//! An event arriving in a tick overrides the decayed value, so `Began` and `Ended`
//! are visible for exactly one tick each.

use serde::Serialize;

use crate::event::Event;

/// A per-frame input state machine, run on the consumer thread once per tick.
pub trait FrameState {
    /// Step every tracked control one tick, then fold `events` in order.
    /// Later events for the same control win.
    fn process_inputs(&mut self, events: &[Event]);

    /// Drop all state (used when the owning input mode is switched off).
    fn reset(&mut self);
}

/// Lifecycle of one control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeState {
    #[default]
    None,
    Began,
    Held,
    Ended,
}

impl EdgeState {
    /// One tick of decay.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            EdgeState::Began => EdgeState::Held,
            EdgeState::Ended => EdgeState::None,
            other => other,
        }
    }

    /// Began or held.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, EdgeState::Began | EdgeState::Held)
    }

    /// Ended or none.
    #[inline]
    pub fn is_inactive(self) -> bool {
        !self.is_active()
    }
}

/// A control's state plus the payload that is valid while it is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EdgeTriggered<T> {
    state: EdgeState,
    payload: T,
}

impl<T: Default> EdgeTriggered<T> {
    pub fn new() -> Self {
        Self {
            state: EdgeState::None,
            payload: T::default(),
        }
    }

    /// Step one tick. Decaying from `Ended` to `None` resets the payload.
    pub fn advance(&mut self) {
        if self.state == EdgeState::Ended {
            self.payload = T::default();
        }
        self.state = self.state.next();
    }

    /// Back to `None` with a default payload.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<T> EdgeTriggered<T> {
    #[inline]
    pub fn set(&mut self, state: EdgeState, payload: T) {
        self.state = state;
        self.payload = payload;
    }

    #[inline]
    pub fn begin(&mut self, payload: T) {
        self.set(EdgeState::Began, payload);
    }

    #[inline]
    pub fn hold(&mut self, payload: T) {
        self.set(EdgeState::Held, payload);
    }

    #[inline]
    pub fn end(&mut self, payload: T) {
        self.set(EdgeState::Ended, payload);
    }

    #[inline]
    pub fn state(&self) -> EdgeState {
        self.state
    }

    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// Began or held this tick.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Began this tick.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.state == EdgeState::Began
    }

    /// Held (began on an earlier tick, not yet released).
    #[inline]
    pub fn is_held(&self) -> bool {
        self.state == EdgeState::Held
    }

    /// Ended this tick.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.state == EdgeState::Ended
    }
}

/// Two-state lifecycle for one-shot controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TapState {
    #[default]
    None,
    Tapped,
}

/// A one-shot control: `Tapped` for the tick it happens, `None` afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TapTrigger<T> {
    state: TapState,
    payload: T,
}

impl<T: Default> TapTrigger<T> {
    pub fn new() -> Self {
        Self {
            state: TapState::None,
            payload: T::default(),
        }
    }

    pub fn advance(&mut self) {
        if self.state == TapState::Tapped {
            self.state = TapState::None;
            self.payload = T::default();
        }
    }

    pub fn tap(&mut self, payload: T) {
        self.state = TapState::Tapped;
        self.payload = payload;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<T> TapTrigger<T> {
    #[inline]
    pub fn state(&self) -> TapState {
        self.state
    }

    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == TapState::Tapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Vec2;

    #[test]
    fn transition_table() {
        assert_eq!(EdgeState::None.next(), EdgeState::None);
        assert_eq!(EdgeState::Began.next(), EdgeState::Held);
        assert_eq!(EdgeState::Held.next(), EdgeState::Held);
        assert_eq!(EdgeState::Ended.next(), EdgeState::None);
    }

    #[test]
    fn press_hold_release_sequence() {
        let mut button: EdgeTriggered<()> = EdgeTriggered::new();
        let mut seen = Vec::new();

        // tick 1: press
        button.advance();
        button.begin(());
        seen.push(button.state());
        // tick 2: nothing
        button.advance();
        seen.push(button.state());
        // tick 3: release
        button.advance();
        button.end(());
        seen.push(button.state());
        // tick 4: nothing
        button.advance();
        seen.push(button.state());

        assert_eq!(
            seen,
            vec![EdgeState::Began, EdgeState::Held, EdgeState::Ended, EdgeState::None]
        );
    }

    #[test]
    fn payload_survives_until_decay_to_none() {
        let mut stick: EdgeTriggered<Vec2> = EdgeTriggered::new();
        stick.begin(Vec2::new(0.3, 0.4));
        stick.advance();
        assert_eq!(*stick.payload(), Vec2::new(0.3, 0.4));
        stick.end(Vec2::new(0.1, 0.0));
        assert_eq!(*stick.payload(), Vec2::new(0.1, 0.0));
        stick.advance();
        assert_eq!(stick.state(), EdgeState::None);
        assert_eq!(*stick.payload(), Vec2::ZERO);
    }

    #[test]
    fn event_overrides_decayed_value() {
        let mut button: EdgeTriggered<()> = EdgeTriggered::new();
        button.begin(());
        button.advance();
        // release + re-press in consecutive ticks
        button.end(());
        button.advance();
        button.begin(());
        assert!(button.is_pressed());
    }

    #[test]
    fn queries() {
        let mut b: EdgeTriggered<()> = EdgeTriggered::new();
        assert!(!b.is_active());
        b.begin(());
        assert!(b.is_active() && b.is_pressed() && !b.is_held());
        b.advance();
        assert!(b.is_active() && b.is_held());
        b.end(());
        assert!(b.is_released() && b.state().is_inactive());
    }

    #[test]
    fn tap_trigger_lasts_one_tick() {
        let mut tap: TapTrigger<Vec2> = TapTrigger::new();
        tap.tap(Vec2::new(10.0, 20.0));
        assert!(tap.is_active());
        assert_eq!(*tap.payload(), Vec2::new(10.0, 20.0));
        tap.advance();
        assert_eq!(tap.state(), TapState::None);
        assert_eq!(*tap.payload(), Vec2::ZERO);
    }
}
