//! Drive Scene headless driver
//!
//! Loads settings (first argument, default `drive-scene.json`), builds the
//! scene and drives a scripted route through the section layout at 60 Hz,
//! logging zone transitions and the actions the host would perform.
//!
//! Usage: `drive-scene [settings.json] [--quality low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
mod driver;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Drive Scene (headless) starting...");
    driver::main(std::env::args().skip(1))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library and run their own frame loop
}
