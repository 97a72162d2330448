use clap::Args;

use super::{open_controller, CmdResult};

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of sessions to show
    #[arg(long, short = 'n', default_value_t = 10)]
    limit: usize,
}

pub fn run(args: HistoryArgs) -> CmdResult {
    let controller = open_controller()?;
    let recent = controller.history().recent(args.limit);
    println!("{}", serde_json::to_string_pretty(recent)?);
    Ok(())
}
