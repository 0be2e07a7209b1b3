use std::sync::{Arc, Mutex};
use std::thread;

use kobold_input::backends::virtual_input::{VirtualCursor, VirtualSource, VirtualSurface};
use kobold_input::{
    ControllerButton, DeviceInfo, EdgeState, Event, EventQueue, FrameData, FrameHandler,
    FrameLink, GesturePhase, InputConfig, InputEvent, InputMode, InputSources, InputSystem,
    KeyCode, MouseButton, PeripheralKind, RawGesture, RawInput, Stick, TapKind, Vec2,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Rig {
    pads: Arc<VirtualSource>,
    keys: Arc<VirtualSource>,
    mice: Arc<VirtualSource>,
    cursor: Arc<VirtualCursor>,
    system: InputSystem,
}

fn rig(config: &str) -> Rig {
    init_logging();
    let pads = Arc::new(VirtualSource::controllers());
    let keys = Arc::new(
        VirtualSource::keyboards().with_device(DeviceInfo::keyboard("kb", "Keyboard")),
    );
    let mice =
        Arc::new(VirtualSource::mice().with_device(DeviceInfo::mouse("mouse", "Mouse")));
    let cursor = Arc::new(VirtualCursor::new());
    let sources = InputSources {
        controllers: pads.clone(),
        keyboards: keys.clone(),
        mice: mice.clone(),
        cursor: cursor.clone(),
    };
    let config = InputConfig::from_toml_str(config).unwrap();
    let system = InputSystem::new(&config, sources);
    Rig {
        pads,
        keys,
        mice,
        cursor,
        system,
    }
}

#[test]
fn queue_keeps_newest_under_concurrent_producers() {
    init_logging();
    let queue = Arc::new(EventQueue::new(100));
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..100u32 {
                    queue.enqueue((p, i));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let drained = queue.dequeue_all();
    assert_eq!(drained.len(), 100);
    assert_eq!(queue.dropped(), 300);
    // per-producer order survives eviction
    for p in 0..4 {
        let mine: Vec<u32> = drained
            .iter()
            .filter(|(q, _)| *q == p)
            .map(|(_, i)| *i)
            .collect();
        assert!(mine.windows(2).all(|w| w[0] < w[1]));
    }
    assert!(queue.is_empty());
}

#[test]
fn controller_input_from_another_thread() {
    let mut rig = rig(r#"default_modes = ["controller"]"#);
    let id = rig.system.active_controller().unwrap().id.clone();
    rig.system.drain_and_process();

    let pads = rig.pads.clone();
    let pad_id = id.clone();
    thread::spawn(move || {
        pads.press(&pad_id, ControllerButton::Start);
        pads.move_stick(&pad_id, Stick::Right, 0.0, 1.0);
    })
    .join()
    .unwrap();

    rig.system.drain_and_process();
    let state = rig.system.controller_state();
    assert!(state.is_pressed(ControllerButton::Start));
    assert_eq!(state.stick(Stick::Right).state(), EdgeState::Began);
    assert_eq!(state.stick_offset(Stick::Right), Vec2::new(0.0, 1.0));

    rig.pads.release(&id, ControllerButton::Start);
    rig.pads.move_stick(&id, Stick::Right, 0.0, 0.0);
    rig.system.drain_and_process();
    let state = rig.system.controller_state();
    assert!(state.is_released(ControllerButton::Start));
    assert_eq!(state.stick(Stick::Right).state(), EdgeState::Ended);

    rig.system.drain_and_process();
    let state = rig.system.controller_state();
    assert_eq!(state.button_state(ControllerButton::Start), EdgeState::None);
    assert_eq!(state.stick_offset(Stick::Right), Vec2::ZERO);
}

#[test]
fn controller_switches_follow_physical_presence() {
    let mut rig = rig(r#"default_modes = ["controller"]"#);
    assert!(rig.system.active_controller().unwrap().is_virtual());

    rig.pads.connect(DeviceInfo::controller("pad-1", "Pad One"));
    let batch = rig.system.drain_and_process();
    assert!(batch.iter().any(|e| matches!(
        e,
        Event::PeripheralConnected(p) if p.kind == PeripheralKind::PhysicalController
    )));
    assert_eq!(rig.system.active_controller().unwrap().id, "pad-1");

    rig.pads.disconnect("pad-1");
    let batch = rig.system.drain_and_process();
    assert!(batch
        .iter()
        .any(|e| matches!(e, Event::PeripheralDisconnected(p) if p.id == "pad-1")));
    assert!(rig.system.active_controller().unwrap().is_virtual());
}

#[test]
fn keyboard_and_mouse_together() {
    let mut rig = rig(
        r#"
        default_modes = ["keyboard", "mouse"]
        [mouse]
        enabled = true
        "#,
    );
    assert!(rig.cursor.is_hidden());
    rig.system.drain_and_process();

    rig.keys.key("kb", 0x1A, true); // W
    rig.mice.send(
        "mouse",
        RawInput::MouseButton {
            index: 1,
            pressed: true,
        },
    );
    rig.mice.send(
        "mouse",
        RawInput::MouseMoved {
            delta: Vec2::new(4.0, -2.0),
        },
    );
    rig.system.drain_and_process();

    assert!(rig.system.keyboard_state().is_pressed(KeyCode::W));
    assert!(rig.system.mouse_state().is_pressed(MouseButton::Right));
    assert_eq!(rig.system.mouse_state().delta(), Vec2::new(4.0, -2.0));

    rig.system.drain_and_process();
    assert!(rig.system.keyboard_state().is_held(KeyCode::W));
    assert!(rig.system.mouse_state().is_held(MouseButton::Right));
    assert_eq!(rig.system.mouse_state().delta(), Vec2::ZERO);

    rig.system.set_input_mode(InputMode::KEYBOARD);
    assert!(!rig.cursor.is_hidden());
    assert!(!rig.system.mouse_state().is_active(MouseButton::Right));
    assert!(!rig.mice.has_handler("mouse"));
}

#[test]
fn touch_gestures_reach_touch_state() {
    let mut rig = rig(r#"default_modes = ["touchscreen"]"#);
    let surface = Arc::new(VirtualSurface::new("main-view"));
    rig.system.register_gesture_source(surface.clone());

    let pan = |phase, x, y| RawGesture::Pan {
        phase,
        position: Vec2::new(x, y),
    };
    surface.gesture(pan(GesturePhase::Began, 10.0, 10.0));
    surface.gesture(pan(GesturePhase::Changed, 20.0, 5.0));
    rig.system.drain_and_process();
    let touch = rig.system.touch_state();
    assert!(touch.pan.is_active());
    assert_eq!(touch.pan.gesture().absolute, Vec2::new(10.0, 5.0));

    surface.gesture(pan(GesturePhase::Cancelled, 20.0, 5.0));
    surface.gesture(RawGesture::Tap {
        kind: TapKind::Tap,
        phase: GesturePhase::Ended,
        position: Vec2::new(1.0, 1.0),
    });
    rig.system.drain_and_process();
    let touch = rig.system.touch_state();
    assert_eq!(touch.pan.phase(), EdgeState::Ended);
    assert!(touch.tap.tapped(TapKind::Tap));

    assert!(rig.system.unregister_gesture_source("main-view"));
    assert!(!surface.is_attached());
}

#[test]
fn mode_handle_from_ui_thread() {
    let mut rig = rig("");
    let handle = rig.system.mode_handle();
    let ui = thread::spawn(move || {
        handle.toggle(InputMode::CONTROLLER);
        handle.toggle(InputMode::KEYBOARD);
    });
    ui.join().unwrap();

    rig.system.drain_and_process();
    assert_eq!(
        rig.system.input_mode(),
        InputMode::CONTROLLER | InputMode::KEYBOARD
    );
    assert!(rig.system.active_controller().is_some());
    assert!(rig.keys.has_handler("kb"));
}

#[test]
fn overflow_drops_oldest_input() {
    let mut rig = rig(
        r#"
        queue_capacity = 4
        default_modes = ["keyboard"]
        "#,
    );
    rig.system.drain_and_process();
    for usage in 0x04..0x0A {
        rig.keys.key("kb", usage, true); // A..F
    }
    let batch = rig.system.drain_and_process();
    assert_eq!(batch.len(), 4);
    let keyboard = rig.system.keyboard_state();
    assert!(!keyboard.is_pressed(KeyCode::A));
    assert!(!keyboard.is_pressed(KeyCode::B));
    assert!(keyboard.is_pressed(KeyCode::C));
    assert!(keyboard.is_pressed(KeyCode::F));
    assert!(rig.system.diagnostics().dropped >= 2);
}

#[test]
fn frame_link_runs_the_whole_tick() {
    #[derive(Default)]
    struct Seen {
        frames: u64,
        a_pressed_on: Option<u64>,
        sizes: Vec<(u32, u32)>,
    }

    struct Game(Arc<Mutex<Seen>>);

    impl FrameHandler for Game {
        fn handle_resize(&mut self, width: u32, height: u32) {
            self.0.lock().unwrap().sizes.push((width, height));
        }

        fn handle_focus_change(&mut self, _active: bool) {}

        fn handle_frame(&mut self, frame: &FrameData, input: &InputSystem) {
            let mut seen = self.0.lock().unwrap();
            seen.frames = frame.frame_count;
            if input.controller_state().is_pressed(ControllerButton::A) {
                seen.a_pressed_on = Some(frame.frame_count);
            }
        }
    }

    let rig = rig(r#"default_modes = ["controller"]"#);
    let pads = rig.pads.clone();
    let id = rig.system.active_controller().unwrap().id.clone();
    let mut link = FrameLink::new(rig.system);
    let seen = Arc::new(Mutex::new(Seen::default()));
    link.register_frame_handler(Box::new(Game(seen.clone())));
    link.resize(1280, 720);
    link.finish_launching();

    link.tick(0.0);
    pads.press(&id, ControllerButton::A);
    link.tick(1.0 / 60.0);
    link.tick(2.0 / 60.0);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.frames, 3);
    assert_eq!(seen.a_pressed_on, Some(2));
    assert_eq!(seen.sizes, vec![(0, 0), (1280, 720)]);
}

#[test]
fn events_round_through_the_queue_unchanged() {
    init_logging();
    let queue = EventQueue::new(8);
    let event = Event::Input(InputEvent::Keyboard(kobold_input::KeyboardEvent::KeyDown(
        KeyCode::Escape,
    )));
    queue.enqueue(event.clone());
    assert_eq!(queue.peek_all(), vec![event.clone()]);
    assert_eq!(queue.dequeue(), Some(event));
}
