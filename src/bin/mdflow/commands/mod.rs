mod analyze;
mod inspect;
mod simulate;

use analyze::run_analyze;
use inspect::run_inspect;
use simulate::run_simulate;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Simulate(args) => run_simulate(args, ctx),
        Command::Analyze(args) => run_analyze(args, ctx),
        Command::Inspect(args) => run_inspect(args, ctx),
    }
}
