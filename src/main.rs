mod viewer;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tinsel::{SceneConfig, ViewerError};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser, Debug)]
#[command(about = "Particle Christmas tree with photo ornaments", version)]
struct Args {
    /// Number of needle instances
    #[arg(long, default_value_t = 3000)]
    needles: usize,

    /// Number of ornament instances
    #[arg(long, default_value_t = 150)]
    ornaments: usize,

    /// Number of fairy light instances
    #[arg(long, default_value_t = 400)]
    lights: usize,

    /// Fixed RNG seed for reproducible layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Images to hang on the tree at startup, in order
    images: Vec<PathBuf>,
}

impl Args {
    fn scene_config(&self) -> SceneConfig {
        let config = SceneConfig::default()
            .with_needle_count(self.needles)
            .with_ornament_count(self.ornaments)
            .with_light_count(self.lights);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn run(args: Args) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = viewer::App::new(&args.scene_config(), args.images);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.needles == 0 || args.ornaments == 0 || args.lights == 0 {
        log::error!("instance counts must be positive");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
