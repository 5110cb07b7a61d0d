//! `calwatch config` -- show and edit the TOML configuration.

use clap::Subcommand;

use calwatch_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("lookback_days = {}", config.lookback_days);
            println!("display_timezone = {}", config.display_timezone);
            println!("alert_username = {}", config.alert_username);
            println!("line_endpoint = {}", config.line_endpoint);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "lookback_days" => {
                    config.lookback_days = value
                        .parse()
                        .map_err(|_| format!("lookback_days must be a number, got '{value}'"))?;
                }
                "display_timezone" => {
                    config.display_timezone = value;
                    config.display_zone()?;
                }
                "alert_username" => config.alert_username = value,
                "line_endpoint" => config.line_endpoint = value,
                other => return Err(format!("unknown configuration key: {other}").into()),
            }
            config.save()?;
            println!("Saved.");
        }
    }
    Ok(())
}
