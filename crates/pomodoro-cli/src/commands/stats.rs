use chrono::Local;
use clap::Args;
use pomodoro_core::Timeframe;

use super::{open_controller, CmdResult};

#[derive(Args)]
pub struct StatsArgs {
    /// today, week, month or all
    #[arg(default_value = "today")]
    timeframe: Timeframe,
}

pub fn run(args: StatsArgs) -> CmdResult {
    let controller = open_controller()?;
    let stats = controller.stats(args.timeframe, &Local::now());
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
