use crate::common::{load_config, load_engine, print_json, CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    let config = load_config()?;
    let engine = load_engine(&config)?;
    let mut state = ctx.load_state()?;

    match engine.sync_weekly_completion(&mut state, &ctx.now(&config)?)? {
        Some(entry) => {
            ctx.save_state(&state)?;
            print_json(&entry)
        }
        None => {
            println!("nothing to record");
            Ok(())
        }
    }
}
