use crate::common::{load_config, load_engine, print_json, CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let engine = load_engine(&load_config()?)?;
    let state = ctx.load_state()?;
    print_json(&engine.event_archive(&state))
}
