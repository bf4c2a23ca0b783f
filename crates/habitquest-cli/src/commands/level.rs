use serde_json::json;

use crate::common::{load_config, load_engine, print_json, CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let engine = load_engine(&load_config()?)?;
    let state = ctx.load_state()?;

    let progress = engine.level(&state)?;
    let next_reward = engine.next_reward(&state)?;
    print_json(&json!({
        "level": progress.level,
        "xp": progress.xp,
        "levelFloorXp": progress.level_floor_xp,
        "nextLevelXp": progress.next_level_xp,
        "percent": progress.percent,
        "nextReward": next_reward,
    }))
}
