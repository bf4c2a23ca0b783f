use serde_json::json;

use crate::common::{load_config, load_engine, print_json, CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let config = load_config()?;
    let engine = load_engine(&config)?;
    let state = ctx.load_state()?;
    let status = engine.weekly_status(&state, &ctx.now(&config)?)?;

    let locale = engine.locale();
    print_json(&json!({
        "weekKey": status.week.week_key,
        "days": status.week.day_keys,
        "eventId": status.event.id,
        "title": status.event.title(locale),
        "description": status.event.description(locale),
        "xp": status.event.xp,
        "bonusPercent": status.event.bonus_percent,
        "percent": status.display_percent(),
        "completed": status.completed,
        "recorded": status.recorded,
        "eventsEnabled": status.events_enabled,
    }))
}
