use crate::common::{load_config, load_engine, print_json, CliResult, Context};

pub fn run(ctx: &Context, top: bool) -> CliResult {
    let engine = load_engine(&load_config()?)?;
    let state = ctx.load_state()?;

    if top {
        match engine.top_chain(&state)? {
            Some(chain) => print_json(&chain),
            None => {
                println!("all chains complete");
                Ok(())
            }
        }
    } else {
        print_json(&engine.chains(&state)?)
    }
}
