mod commands;
mod handlers;
mod output;

use clap::Parser;
use commands::Cli;
use studio_core::StudioSettings;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match StudioSettings::load_or_default(&cli.settings) {
        Ok(settings) => settings,
        Err(err) => {
            output::print_error(&err.to_string());
            std::process::exit(1);
        }
    };
    if let Some(dir) = cli.config_dir {
        settings.configuration_dir = dir;
    }

    if let Err(err) = handlers::handle_command(cli.command, &settings) {
        output::print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
