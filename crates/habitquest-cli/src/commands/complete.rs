use chrono::Utc;
use clap::Args;
use habitquest_core::{complete_event, CompletionOutcome, CoreError, EventAward};
use serde_json::json;

use crate::common::{load_config, print_json, CliResult, Context};

#[derive(Args)]
pub struct CompleteArgs {
    /// ISO week key, e.g. 2024-W10
    week_key: String,
    /// Event id to record
    #[arg(long)]
    event: String,
    /// Experience to award
    #[arg(long)]
    xp: u32,
}

pub fn run(ctx: &Context, args: CompleteArgs) -> CliResult {
    let mut state = ctx.load_state()?;
    let award = EventAward::new(args.event, args.xp);
    let completed_at = ctx.now(&load_config()?)?.with_timezone(&Utc);
    let outcome = complete_event(&mut state, &args.week_key, &award, completed_at)?;

    match outcome {
        CompletionOutcome::Recorded(entry) => {
            ctx.save_state(&state)?;
            print_json(&json!({ "recorded": true, "entry": entry, "xp": state.xp }))
        }
        CompletionOutcome::AlreadyRecorded { entry, mismatch } => {
            if let Some(mismatch) = mismatch {
                eprintln!("warning: {}", CoreError::from(mismatch));
            }
            print_json(&json!({ "recorded": false, "entry": entry, "xp": state.xp }))
        }
    }
}
