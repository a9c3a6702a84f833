mod cli;
mod paths;
mod portfolio;
mod run;
mod settings;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Export(args)) => run::export(&cli.run, args),
        Some(Command::Config(config_cmd)) => run::config_command(&cli.run, config_cmd.action),
        None => run::preview(&cli.run),
    }
}
