//! `calwatch auth` -- credential management in the property bag.

use clap::Subcommand;

use calwatch_core::storage::{
    PROPERTY_KEY_GOOGLE_ACCESS_TOKEN, PROPERTY_KEY_LINE_TOKEN, PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT,
};
use calwatch_core::{Database, PropertyBag};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the LINE Notify bearer token
    SetLineToken { token: String },
    /// Store the Slack incoming-webhook URL for alerts
    SetSlackWebhook { url: String },
    /// Store the Google Calendar API access token
    SetGoogleToken { token: String },
    /// Show which credentials are configured
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        AuthAction::SetLineToken { token } => {
            db.set_property(PROPERTY_KEY_LINE_TOKEN, &token)?;
            println!("LINE token stored.");
        }
        AuthAction::SetSlackWebhook { url } => {
            if !url.starts_with("https://") {
                return Err("Slack webhook URL must start with https://".into());
            }
            db.set_property(PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT, &url)?;
            println!("Slack webhook stored.");
        }
        AuthAction::SetGoogleToken { token } => {
            db.set_property(PROPERTY_KEY_GOOGLE_ACCESS_TOKEN, &token)?;
            println!("Google access token stored.");
        }
        AuthAction::Status => {
            for key in [
                PROPERTY_KEY_GOOGLE_ACCESS_TOKEN,
                PROPERTY_KEY_LINE_TOKEN,
                PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT,
            ] {
                let state = if db.get_property(key)?.is_some() {
                    "configured"
                } else {
                    "not set"
                };
                println!("{key}: {state}");
            }
        }
    }
    Ok(())
}
