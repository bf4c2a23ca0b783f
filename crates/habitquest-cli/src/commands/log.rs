use chrono::NaiveDate;
use clap::Args;
use habitquest_core::DayKey;

use crate::common::{load_config, print_json, CliResult, Context};

#[derive(Args)]
pub struct LogArgs {
    /// Day to record (default: --date or today)
    #[arg(long)]
    day: Option<NaiveDate>,
    /// Habits checked off, added to the day's total
    #[arg(long, default_value_t = 0)]
    check_ins: u32,
    /// Active minutes, added to the day's total
    #[arg(long, default_value_t = 0)]
    minutes: u32,
    /// Mark the day as journaled
    #[arg(long)]
    journal: bool,
    /// Mood rating 1-5
    #[arg(long)]
    mood: Option<u8>,
}

pub fn run(ctx: &Context, args: LogArgs) -> CliResult {
    let day = match args.day {
        Some(day) => DayKey::new(day),
        None => DayKey::new(ctx.today(&load_config()?)?),
    };

    let mut state = ctx.load_state()?;
    let mut activity = state.days.get(&day).cloned().unwrap_or_default();
    activity.check_ins = activity.check_ins.saturating_add(args.check_ins);
    activity.active_minutes = activity.active_minutes.saturating_add(args.minutes);
    activity.journaled |= args.journal;
    if args.mood.is_some() {
        activity.mood = args.mood;
    }

    state.record_day(day, activity.clone())?;
    ctx.save_state(&state)?;
    print_json(&serde_json::json!({ "day": day, "activity": activity }))
}
