#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the isometric grid generator.

mod app;
mod config;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use isogrid_core::APPLICATION_TITLE;
use isogrid_rendering::{
    Color, ControlPanelView, FrameInput, GridStatus, Presentation, RenderingBackend, Scene,
    SceneGraph,
};
use isogrid_rendering_macroquad::MacroquadBackend;
use isogrid_system_bootstrap::{install, GenerateTrigger};
use isogrid_world::{query, GridSettings};
use log::info;

use crate::{
    app::{create_containers, GridApp},
    config::{FileConfig, GeneratorConfig, Overrides, SamplingChoice},
};

const CONTROL_PANEL_WIDTH: f32 = 260.0;

/// Generates isometric tile grids with randomly placed obstacles.
#[derive(Debug, Parser)]
#[command(name = "isogrid", version, about, long_about = None)]
struct Args {
    /// Number of grid columns.
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=15))]
    width: Option<u32>,
    /// Number of grid rows.
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=15))]
    height: Option<u32>,
    /// Number of obstacles placed on top of the tiles.
    #[arg(long)]
    obstacles: Option<u32>,
    /// Seed for variant and obstacle selection; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Algorithm used to pick obstacle cells.
    #[arg(long, value_enum)]
    sampling: Option<SamplingChoice>,
    /// TOML file providing defaults and variant palettes.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Generate without opening a window and print a summary.
    #[arg(long)]
    headless: bool,
    /// Number of grids generated in headless mode.
    #[arg(long, default_value_t = 1)]
    regenerations: u32,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Frame-rate cap; 0 disables it.
    #[arg(long, default_value_t = 60)]
    target_fps: u32,
    /// Log the measured frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            obstacle_count: self.obstacles,
            seed: self.seed,
            sampling: self.sampling,
        }
    }
}

/// Entry point for the isometric grid generator.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = GeneratorConfig::resolve(file, args.overrides())?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("using seed {seed}");
    let settings = GridSettings::new(config.parameters, config.tile_pool(), config.obstacle_pool())
        .with_seed(seed)
        .with_sampling(config.sampling.into());

    let trigger = install(GenerateTrigger::new())?;
    let mut graph = SceneGraph::new();
    let containers = create_containers(&mut graph);
    let app = GridApp::new(settings, containers, trigger);

    if args.headless {
        let scene = Scene::new(graph, config.palette(), None, GridStatus::default());
        return run_headless(app, scene, args.regenerations);
    }

    let scene = Scene::new(
        graph,
        config.palette(),
        Some(ControlPanelView::new(
            CONTROL_PANEL_WIDTH,
            Color::from_rgb_u8(32, 34, 40),
        )),
        GridStatus {
            parameters: config.parameters,
            ..GridStatus::default()
        },
    );
    let presentation = Presentation::new(APPLICATION_TITLE, Color::from_rgb_u8(18, 20, 24), scene);
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_target_fps(Some(args.target_fps))
        .with_show_fps(args.show_fps);

    let mut app = app;
    backend.run(presentation, move |_dt, input, scene| app.frame(input, scene))
}

fn run_headless(mut app: GridApp, mut scene: Scene, regenerations: u32) -> Result<()> {
    let press = FrameInput {
        generate_pressed: true,
        ..FrameInput::default()
    };

    for _ in 0..regenerations {
        app.frame(press, &mut scene);
        if let Some(message) = app.last_error() {
            bail!("{message}");
        }
        while app.is_generating() {
            app.frame(FrameInput::default(), &mut scene);
        }
        if let Some(message) = app.last_error() {
            bail!("{message}");
        }
    }

    let world = app.world();
    let parameters = query::parameters(world);
    println!(
        "{}x{} grid: {} tiles, {} obstacles after {} generation(s)",
        parameters.width(),
        parameters.height(),
        query::tile_layer(world).len(),
        query::obstacle_layer(world).len(),
        query::completed_generations(world)
    );
    for obstacle in query::obstacle_layer(world).iter() {
        let cell = obstacle.cell();
        println!("{} at ({}, {})", obstacle.label(), cell.column(), cell.row());
    }
    Ok(())
}
