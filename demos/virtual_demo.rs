use std::sync::Arc;

use kobold_input::backends::virtual_input::VirtualSource;
use kobold_input::{
    ControllerButton, DeviceInfo, Event, InputConfig, InputEvent, InputSources, InputSystem,
    NoCursor, Stick,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pads = Arc::new(VirtualSource::controllers());
    let sources = InputSources {
        controllers: pads.clone(),
        keyboards: Arc::new(VirtualSource::keyboards()),
        mice: Arc::new(VirtualSource::mice()),
        cursor: Arc::new(NoCursor),
    };
    let config = InputConfig::from_toml_str(r#"default_modes = ["controller"]"#)
        .expect("built-in config parses");
    let mut input = InputSystem::new(&config, sources);

    // A physical pad shows up and takes over from the on-screen one.
    pads.connect(DeviceInfo::controller("demo-pad", "Demo Pad"));
    print_batch(&input.drain_and_process());

    // Inject some sample input
    pads.move_stick("demo-pad", Stick::Left, 0.75, 0.0);
    pads.press("demo-pad", ControllerButton::A);
    print_batch(&input.drain_and_process());

    let state = input.controller_state();
    println!(
        "A pressed: {}, left stick: {:?}",
        state.is_pressed(ControllerButton::A),
        state.stick_offset(Stick::Left)
    );

    println!("{}", input.diagnostics().to_json().expect("diagnostics serialize"));
}

fn print_batch(events: &[Event]) {
    for event in events {
        match event {
            Event::PeripheralConnected(p) => println!("(Virtual) {:?} {} connected", p.kind, p.id),
            Event::PeripheralDisconnected(p) => {
                println!("(Virtual) {:?} {} disconnected", p.kind, p.id)
            }
            Event::Input(InputEvent::Controller(c)) => println!("(Virtual) {c:?}"),
            other => println!("(Virtual) {other:?}"),
        }
    }
}
