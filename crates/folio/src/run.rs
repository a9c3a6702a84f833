use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use fxconfig::FxConfig;
use renderer::{ExportOptions, RenderMode, Renderer, RendererConfig, Viewport};
use tracing_subscriber::EnvFilter;

use crate::cli::{ConfigAction, ExportArgs, RunArgs};
use crate::paths::AppPaths;
use crate::portfolio::Portfolio;
use crate::settings::{self, ConfigSource};

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &RunArgs) -> Result<(AppPaths, FxConfig, ConfigSource)> {
    let paths = AppPaths::discover()?;
    let (config, source) = settings::load(args.config.as_deref(), &paths)?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        source = %source,
        "resolved folio configuration"
    );
    Ok((paths, config, source))
}

fn renderer_config(args: &RunArgs, mode: RenderMode) -> RendererConfig {
    RendererConfig {
        surface_size: args.size.unwrap_or(DEFAULT_SIZE),
        mode,
        target_fps: args.fps,
        ..RendererConfig::default()
    }
}

/// Opens the interactive preview window.
pub fn preview(args: &RunArgs) -> Result<()> {
    let (_, config, source) = load_config(args)?;
    tracing::info!(%source, "starting preview");
    let renderer_config = renderer_config(args, RenderMode::Windowed);
    let viewport = Viewport::from(renderer_config.surface_size);

    let mut portfolio = Portfolio::new(config, viewport, args.seed, Instant::now());
    let mut renderer = Renderer::new(renderer_config);
    let result = renderer.run(&mut portfolio);
    portfolio.teardown();
    result.map(|_| ())
}

/// Renders frames off-screen and prints the written paths.
pub fn export(args: &RunArgs, export: ExportArgs) -> Result<()> {
    let (_, config, source) = load_config(args)?;
    tracing::info!(%source, frames = export.frames, "starting export");
    let options = ExportOptions {
        path: export.output,
        frames: export.frames,
        frame_interval: Duration::from_millis(export.interval_ms),
        pointer: export.pointer,
    };
    let renderer_config = renderer_config(args, RenderMode::Export(options));
    let viewport = Viewport::from(renderer_config.surface_size);

    let mut portfolio = Portfolio::new(config, viewport, args.seed, Instant::now());
    let written = Renderer::new(renderer_config)
        .run(&mut portfolio)
        .context("export failed")?;
    portfolio.teardown();

    let mut stdout = io::stdout().lock();
    for path in written {
        writeln!(stdout, "{}", path.display())?;
    }
    Ok(())
}

pub fn config_command(args: &RunArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let (_, _, source) = load_config(args)?;
            println!("configuration OK ({source})");
        }
        ConfigAction::Print { json } => {
            let (_, config, _) = load_config(args)?;
            if json {
                let rendered = serde_json::to_string_pretty(&config)
                    .context("failed to render configuration as JSON")?;
                println!("{rendered}");
            } else {
                print!("{}", config.to_toml_string()?);
            }
        }
        ConfigAction::Where => {
            let paths = AppPaths::discover()?;
            let file = args.config.clone().unwrap_or_else(|| paths.config_file());
            println!("config dir:  {}", paths.config_dir().display());
            println!(
                "config file: {} ({})",
                file.display(),
                if file.exists() { "present" } else { "missing" }
            );
        }
    }
    Ok(())
}
