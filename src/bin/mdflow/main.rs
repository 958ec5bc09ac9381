use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod display;
mod io;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();
    init_logging(cli.verbose);

    let ctx = display::Context::new(cli.command.quiet(), cli.verbose);

    if ctx.interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `-v`; without either only warnings are shown.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();
    log::debug!("logging initialized at {level}");
}
