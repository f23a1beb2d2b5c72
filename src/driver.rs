//! Scripted route driver for the native binary

use std::process::ExitCode;

use drive_scene::sim::{InteractTrigger, VehicleInput};
use drive_scene::{FrameInput, Scene, SceneAction, SceneError, Settings};

const FRAME_DT: f32 = 1.0 / 60.0;

/// One leg of the demo route
struct Leg {
    label: &'static str,
    frames: u32,
    input: VehicleInput,
    /// Press the interaction key on the last frame of the leg
    interact: bool,
}

fn route() -> Vec<Leg> {
    let drive = |up, left, right, brake| VehicleInput::from_keys(up, false, left, right, brake);
    vec![
        Leg {
            label: "settle",
            frames: 60,
            input: VehicleInput::default(),
            interact: false,
        },
        Leg {
            label: "to research hub",
            frames: 95,
            input: drive(true, false, false, false),
            interact: false,
        },
        Leg {
            label: "stop at panel",
            frames: 50,
            input: drive(false, false, false, true),
            interact: true,
        },
        Leg {
            label: "to live analyser",
            frames: 200,
            input: drive(true, false, false, false),
            interact: false,
        },
        Leg {
            label: "stop at analyser",
            frames: 60,
            input: drive(false, false, false, true),
            interact: true,
        },
        Leg {
            label: "swing right",
            frames: 120,
            input: drive(true, false, true, false),
            interact: false,
        },
        Leg {
            label: "coast",
            frames: 180,
            input: VehicleInput::default(),
            interact: false,
        },
    ]
}

/// Command line options
#[derive(Debug, PartialEq)]
struct Options {
    settings_path: String,
    quality: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Options {
    let mut options = Options {
        settings_path: "drive-scene.json".to_string(),
        quality: None,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quality" => options.quality = args.next(),
            _ => options.settings_path = arg,
        }
    }
    options
}

fn run(options: &Options) -> Result<(), SceneError> {
    let mut settings = Settings::load_from(&options.settings_path)?;
    if let Some(name) = &options.quality {
        settings.set_quality_named(name)?;
    }
    let mut scene = Scene::new(&settings)?;

    let mut transitions = 0;
    let mut actions = 0;
    for leg in route() {
        log::info!("Leg: {}", leg.label);
        for frame in 0..leg.frames {
            let input = FrameInput {
                vehicle: leg.input,
                interact: (leg.interact && frame + 1 == leg.frames).then_some(InteractTrigger::Key),
                zoom: 0.0,
            };
            let snap = scene.frame_by(FRAME_DT, &input);
            transitions += snap.transitions.len();

            for action in scene.drain_actions() {
                actions += 1;
                match action {
                    SceneAction::OpenLink { name, link, .. } => match link {
                        Some(url) => log::info!("Open '{name}': {url}"),
                        None => log::info!("Open '{name}' (no link configured)"),
                    },
                }
            }
        }
        let pose = scene.world().chassis_pose();
        log::info!(
            "  at ({:.1}, {:.1}) speed {:.1} m/s, camera {}",
            pose.position.x,
            pose.position.y,
            pose.planar_speed(),
            scene.camera().angle().as_str()
        );
    }

    println!(
        "Drove {:.1}s: {} zone transitions, {} interactions",
        scene.clock().elapsed(),
        transitions,
        actions
    );
    Ok(())
}

pub fn main(args: impl IntoIterator<Item = String>) -> ExitCode {
    let options = parse_args(args);
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("drive-scene: {err}");
            ExitCode::FAILURE
        }
    }
}
