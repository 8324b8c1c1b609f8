#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Math Snake experience.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{info, LevelFilter};
use math_snake_core::{Operation, SessionPhase};
use math_snake_rendering::{project, Color, FrameInput, Presentation, RenderingBackend};
use math_snake_rendering_macroquad::MacroquadBackend;

use crate::{
    config::{ConfigError, Overrides, Settings},
    simulation::Simulation,
};

/// Command-line arguments accepted by the `math-snake` binary.
#[derive(Debug, Parser)]
#[command(
    name = "math-snake",
    about = "Steer the snake into the cell holding the answer to an arithmetic problem"
)]
struct CliArgs {
    /// TOML file with `[session]` and `[quiz]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for problem generation and target placement.
    #[arg(long)]
    seed: Option<u64>,
    #[command(flatten)]
    overrides: Overrides,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Log filter applied on top of `RUST_LOG`.
    #[arg(long)]
    log_level: Option<LevelFilter>,
    /// Run without a window, driving the session with simulated time.
    #[arg(long)]
    headless: bool,
    /// Operation played in headless mode.
    #[arg(long, value_enum, default_value_t = OperationArg::Add)]
    operation: OperationArg,
    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 200)]
    ticks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OperationArg {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Add => Operation::Add,
            OperationArg::Subtract => Operation::Subtract,
            OperationArg::Multiply => Operation::Multiply,
            OperationArg::Divide => Operation::Divide,
        }
    }
}

/// Entry point for the Math Snake command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level);

    let settings = load_settings(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let simulation = Simulation::new(settings.session, settings.quiz, seed);

    if args.headless {
        return run_headless(simulation, args.operation.into(), args.ticks);
    }

    let presentation = Presentation::new(
        "Math Snake",
        Color::from_rgb_u8(0x18, 0x18, 0x20),
        project(&simulation.view()),
    );
    let mut simulation = simulation;
    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            simulation.submit_input(&input);
            let _ = simulation.advance(dt);
            simulation.populate_scene(scene);
        })
        .context("rendering backend failed")
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        let _ = builder.filter_level(level);
    }
    builder.init();
}

fn load_settings(args: &CliArgs) -> Result<Settings> {
    let settings = config::resolve(args.config.as_deref(), &args.overrides);
    match settings {
        Ok(settings) => Ok(settings),
        Err(error @ (ConfigError::Io { .. } | ConfigError::Parse { .. })) => {
            Err(error).context("failed to load configuration")
        }
        Err(error) => Err(error).context("configuration rejected"),
    }
}

fn run_headless(mut simulation: Simulation, operation: Operation, ticks: u64) -> Result<()> {
    info!("headless run: {} for {ticks} ticks", operation.label());
    simulation.submit_input(&FrameInput {
        select_operation: Some(operation),
        ..FrameInput::default()
    });

    while simulation.ticks() < ticks {
        let view = simulation.view();
        if view.phase != SessionPhase::Running {
            break;
        }
        let _ = simulation.advance(view.tick_period);
    }

    let view = simulation.view();
    println!(
        "final phase: {:?}, score: {}, length: {}, ticks: {}",
        view.phase,
        view.score,
        view.actor.len(),
        view.tick_index
    );
    Ok(())
}
