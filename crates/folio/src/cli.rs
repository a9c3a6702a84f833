use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::Point;

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    author,
    version,
    about = "Portfolio page background effects",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Effects configuration file; defaults to `config.toml` in the config directory.
    #[arg(long, value_name = "FILE", global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Surface size in pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, global = true)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for the preview window (0 = uncapped).
    #[arg(long, value_name = "FPS", global = true)]
    pub fps: Option<f32>,

    /// Seed for particle placement; random when omitted.
    #[arg(long, value_name = "SEED", global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render frames off-screen and write them as PNG files.
    Export(ExportArgs),
    /// Inspect the effects configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output PNG path; numbered when more than one frame is written.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of frames to render.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub frames: u32,

    /// Simulated time between frames in milliseconds.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = 16)]
    pub interval_ms: u64,

    /// Pointer position replayed before every frame (e.g. `640,360`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer)]
    pub pointer: Option<Point>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load and validate the configuration.
    Check,
    /// Print the effective configuration, defaults included.
    Print {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration directory and file.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_pointer(value: &str) -> Result<Point, String> {
    let trimmed = value.trim();
    let (x, y) = trimmed
        .split_once(',')
        .ok_or_else(|| "expected X,Y format, e.g. 640,360".to_string())?;
    let coordinate = |raw: &str| -> Result<f32, String> {
        raw.trim()
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}' in pointer '{trimmed}'", raw.trim()))
    };
    Ok(Point::new(coordinate(x)?, coordinate(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_accepts_common_separators() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 64 X 48 "), Ok((64, 48)));
        assert_eq!(parse_surface_size("800×600"), Ok((800, 600)));
    }

    #[test]
    fn surface_size_rejects_bad_input() {
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }

    #[test]
    fn pointer_parses_coordinates() {
        assert_eq!(parse_pointer("640,360"), Ok(Point::new(640.0, 360.0)));
        assert_eq!(parse_pointer(" 1.5 , -2 "), Ok(Point::new(1.5, -2.0)));
        assert!(parse_pointer("640").is_err());
        assert!(parse_pointer("a,b").is_err());
        assert!(parse_pointer("NaN,1").is_err());
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let cli = Cli::try_parse_from([
            "folio", "export", "--output", "out.png", "--size", "64x48", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.run.size, Some((64, 48)));
        assert_eq!(cli.run.seed, Some(7));
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.frames, 1);
                assert_eq!(args.output, PathBuf::from("out.png"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
