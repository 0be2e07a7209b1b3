use std::path::PathBuf;
use std::time::{Duration, Instant};

use kobold_input::backends::platform_sources;
use kobold_input::{
    ControllerButton, FocusState, FrameData, FrameHandler, FrameLink, InputConfig, InputSystem,
};

struct Game;

impl FrameHandler for Game {
    fn handle_resize(&mut self, width: u32, height: u32) {
        log::info!("resize {width}x{height}");
    }

    fn handle_focus_change(&mut self, active: bool) {
        log::info!("focus {active}");
    }

    fn handle_frame(&mut self, frame: &FrameData, input: &InputSystem) {
        if frame.frame_count % 60 == 0 {
            log::info!(
                "frame {} t={:.2}s fps={:.1} controller={:?}",
                frame.frame_count,
                frame.elapsed_time,
                frame.fps,
                input.active_controller().map(|c| &c.description)
            );
        }
        if input.controller_state().is_pressed(ControllerButton::Start) {
            log::info!("start pressed");
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional config path as the first argument.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => InputConfig::load(&path).unwrap_or_else(|e| {
            log::error!("{e}; using defaults");
            InputConfig::default()
        }),
        None => InputConfig::from_toml_str(r#"default_modes = ["controller"]"#)
            .expect("built-in config parses"),
    };

    let mut link = FrameLink::new(InputSystem::new(&config, platform_sources()));
    link.register_frame_handler(Box::new(Game));
    link.resize(1280, 720);
    link.set_focus(FocusState::Active);
    link.finish_launching();

    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(3) {
        let frame_start = Instant::now();
        link.tick(start.elapsed().as_secs_f64());
        link.record_frame_time(frame_start.elapsed().as_secs_f32() * 1000.0);
        // Sleep a touch to avoid pegging the CPU in the demo
        std::thread::sleep(Duration::from_millis(16));
    }
    log::info!(
        "{} frames, avg frame time {:.3} ms",
        link.frame_count(),
        link.frame_time_ms()
    );
}
