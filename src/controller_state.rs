//! Per-frame controller state.
//!
//! [`ControllerState`] folds controller events into one [`EdgeTriggered`] slot per
//! button and stick, plus a one-shot screen tap. Query it after
//! [`InputSystem::drain_and_process`](crate::system::InputSystem::drain_and_process)
//! and before rendering.

use serde::Serialize;

use crate::edge::{EdgeState, EdgeTriggered, FrameState, TapTrigger};
use crate::event::{
    ControllerButton, ControllerEvent, Event, InputEvent, PressState, Stick, StickPhase, Vec2,
};

#[derive(Clone, Debug, Default, Serialize)]
pub struct ControllerState {
    screen_tap: TapTrigger<Vec2>,
    buttons: [EdgeTriggered<()>; 5],
    left_stick: EdgeTriggered<Vec2>,
    right_stick: EdgeTriggered<Vec2>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn progress_existing_states(&mut self) {
        self.screen_tap.advance();
        for button in &mut self.buttons {
            button.advance();
        }
        self.left_stick.advance();
        self.right_stick.advance();
    }

    fn apply(&mut self, event: &ControllerEvent) {
        match *event {
            ControllerEvent::ScreenTap { state, position } => {
                // Only the touch-down counts as a tap.
                if state == PressState::Pressed {
                    self.screen_tap.tap(position);
                }
            }
            ControllerEvent::Button { button, state } => {
                let slot = &mut self.buttons[button.index()];
                match state {
                    PressState::Pressed => slot.begin(()),
                    PressState::Released => slot.end(()),
                }
            }
            ControllerEvent::Stick {
                stick,
                state,
                offset,
            } => {
                let slot = self.stick_mut(stick);
                match state {
                    StickPhase::Began => slot.begin(offset),
                    StickPhase::Changed => slot.hold(offset),
                    StickPhase::Ended => slot.end(offset),
                }
            }
        }
    }

    fn stick_mut(&mut self, stick: Stick) -> &mut EdgeTriggered<Vec2> {
        match stick {
            Stick::Left => &mut self.left_stick,
            Stick::Right => &mut self.right_stick,
        }
    }

    /// Full slot for a button.
    #[inline]
    pub fn button(&self, button: ControllerButton) -> &EdgeTriggered<()> {
        &self.buttons[button.index()]
    }

    #[inline]
    pub fn button_state(&self, button: ControllerButton) -> EdgeState {
        self.button(button).state()
    }

    /// Pressed this tick.
    pub fn is_pressed(&self, button: ControllerButton) -> bool {
        self.button(button).is_pressed()
    }

    /// Pressed on an earlier tick and still down.
    pub fn is_held(&self, button: ControllerButton) -> bool {
        self.button(button).is_held()
    }

    /// Released this tick.
    pub fn is_released(&self, button: ControllerButton) -> bool {
        self.button(button).is_released()
    }

    /// Pressed this tick or held.
    pub fn is_active(&self, button: ControllerButton) -> bool {
        self.button(button).is_active()
    }

    /// State and offset of a stick.
    #[inline]
    pub fn stick(&self, stick: Stick) -> &EdgeTriggered<Vec2> {
        match stick {
            Stick::Left => &self.left_stick,
            Stick::Right => &self.right_stick,
        }
    }

    /// Stick offset; `(0, 0)` once the stick has decayed to `None`.
    pub fn stick_offset(&self, stick: Stick) -> Vec2 {
        *self.stick(stick).payload()
    }

    pub fn screen_tap(&self) -> &TapTrigger<Vec2> {
        &self.screen_tap
    }
}

impl FrameState for ControllerState {
    fn process_inputs(&mut self, events: &[Event]) {
        self.progress_existing_states();

        for event in events {
            if let Event::Input(InputEvent::Controller(controller_event)) = event {
                self.apply(controller_event);
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
    use crate::edge::TapState;

    fn button(button: ControllerButton, pressed: bool) -> Event {
        Event::Input(InputEvent::Controller(ControllerEvent::Button {
            button,
            state: PressState::from_pressed(pressed),
        }))
    }

    fn stick(stick: Stick, state: StickPhase, x: f32, y: f32) -> Event {
        Event::Input(InputEvent::Controller(ControllerEvent::Stick {
            stick,
            state,
            offset: Vec2::new(x, y),
        }))
    }

    #[test]
    fn button_press_hold_release() {
        let mut state = ControllerState::new();
        let ticks = [
            vec![button(ControllerButton::A, true)],
            vec![],
            vec![button(ControllerButton::A, false)],
            vec![],
        ];
        let seen: Vec<_> = ticks
            .iter()
            .map(|batch| {
                state.process_inputs(batch);
                state.button_state(ControllerButton::A)
            })
            .collect();
        assert_eq!(
            seen,
            vec![EdgeState::Began, EdgeState::Held, EdgeState::Ended, EdgeState::None]
        );
    }

    #[test]
    fn buttons_are_independent() {
        let mut state = ControllerState::new();
        state.process_inputs(&[button(ControllerButton::B, true)]);
        assert!(state.is_pressed(ControllerButton::B));
        assert!(!state.is_active(ControllerButton::A));
        state.process_inputs(&[button(ControllerButton::Start, true)]);
        assert!(state.is_held(ControllerButton::B));
        assert!(state.is_pressed(ControllerButton::Start));
    }

    #[test]
    fn later_events_in_a_batch_win() {
        let mut state = ControllerState::new();
        state.process_inputs(&[
            button(ControllerButton::X, true),
            button(ControllerButton::X, false),
        ]);
        assert!(state.is_released(ControllerButton::X));

        state.process_inputs(&[
            button(ControllerButton::Y, false),
            button(ControllerButton::Y, true),
        ]);
        assert!(state.is_pressed(ControllerButton::Y));
    }

    #[test]
    fn stick_lifecycle() {
        let mut state = ControllerState::new();

        state.process_inputs(&[]);
        assert_eq!(state.stick(Stick::Left).state(), EdgeState::None);

        state.process_inputs(&[stick(Stick::Left, StickPhase::Began, 0.5, 0.0)]);
        assert_eq!(state.stick(Stick::Left).state(), EdgeState::Began);
        assert_eq!(state.stick_offset(Stick::Left), Vec2::new(0.5, 0.0));

        state.process_inputs(&[stick(Stick::Left, StickPhase::Changed, 0.5, 0.5)]);
        assert_eq!(state.stick(Stick::Left).state(), EdgeState::Held);
        assert_eq!(state.stick_offset(Stick::Left), Vec2::new(0.5, 0.5));

        state.process_inputs(&[stick(Stick::Left, StickPhase::Ended, 0.0, 0.0)]);
        assert_eq!(state.stick(Stick::Left).state(), EdgeState::Ended);
        assert_eq!(state.stick_offset(Stick::Left), Vec2::ZERO);

        state.process_inputs(&[]);
        assert_eq!(state.stick(Stick::Left).state(), EdgeState::None);
        assert_eq!(state.stick_offset(Stick::Left), Vec2::ZERO);
        // the other stick never moved
        assert_eq!(state.stick(Stick::Right).state(), EdgeState::None);
    }

    #[test]
    fn held_stick_keeps_offset_without_events() {
        let mut state = ControllerState::new();
        state.process_inputs(&[stick(Stick::Right, StickPhase::Began, -0.2, 0.9)]);
        state.process_inputs(&[]);
        state.process_inputs(&[]);
        assert_eq!(state.stick(Stick::Right).state(), EdgeState::Held);
        assert_eq!(state.stick_offset(Stick::Right), Vec2::new(-0.2, 0.9));
    }

    #[test]
    fn screen_tap_is_one_shot() {
        let mut state = ControllerState::new();
        let tap = |pressed| {
            Event::Input(InputEvent::Controller(ControllerEvent::ScreenTap {
                state: PressState::from_pressed(pressed),
                position: Vec2::new(100.0, 50.0),
            }))
        };
        state.process_inputs(&[tap(true)]);
        assert!(state.screen_tap().is_active());
        assert_eq!(*state.screen_tap().payload(), Vec2::new(100.0, 50.0));

        state.process_inputs(&[tap(false)]);
        assert_eq!(state.screen_tap().state(), TapState::None);
    }

    #[test]
    fn ignores_other_events() {
        let mut state = ControllerState::new();
        state.process_inputs(&[Event::Resize {
            width: 10,
            height: 10,
        }]);
        for b in ControllerButton::ALL {
            assert_eq!(state.button_state(b), EdgeState::None);
        }
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = ControllerState::new();
        state.process_inputs(&[button(ControllerButton::A, true)]);
        FrameState::reset(&mut state);
        assert_eq!(state.button_state(ControllerButton::A), EdgeState::None);
    }
}
