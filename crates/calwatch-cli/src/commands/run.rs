//! `calwatch run` -- one notification pass for a calendar.

use std::sync::Arc;

use calwatch_core::storage::{
    PROPERTY_KEY_GOOGLE_ACCESS_TOKEN, PROPERTY_KEY_LINE_TOKEN, PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT,
};
use calwatch_core::{
    CalendarTrigger, Config, Database, GoogleCalendarSource, PropertyBag, Renderer, Watcher,
    WebhookDispatcher,
};

pub async fn run(calendar_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);

    let access_token = require_property(
        &*db,
        PROPERTY_KEY_GOOGLE_ACCESS_TOKEN,
        "calwatch auth set-google-token",
    )?;
    let line_token = require_property(&*db, PROPERTY_KEY_LINE_TOKEN, "calwatch auth set-line-token")?;
    let slack_endpoint = require_property(
        &*db,
        PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT,
        "calwatch auth set-slack-webhook",
    )?;

    let watcher = Watcher::new(
        Box::new(GoogleCalendarSource::new(access_token, config.lookback_days)),
        db.clone(),
        db.clone(),
        Renderer::new(config.display_zone()?),
        Box::new(WebhookDispatcher::new(
            config.line_endpoint.clone(),
            line_token,
            slack_endpoint,
            config.alert_username.clone(),
        )),
    );

    let outcome = watcher.run(&CalendarTrigger::new(calendar_id)).await?;
    if outcome.notified {
        println!(
            "Notified {} changed event(s) for {calendar_id}.",
            outcome.changed
        );
    } else {
        println!("No changes for {calendar_id}.");
    }
    Ok(())
}

fn require_property(
    db: &dyn PropertyBag,
    key: &str,
    hint: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    db.get_property(key)?
        .ok_or_else(|| format!("{key} is not set. Run `{hint}` first.").into())
}
