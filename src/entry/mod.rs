mod plan;

use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches};

use crate::args::SweepArgs;
use crate::error::AppResult;
use plan::{build_plan, execute_plan};

/// Parses the command line, installs logging, and runs the chosen command
/// on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when arguments, configuration or a local output step
/// fail. Remote failures during a sweep are logged, not returned.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<SweepArgs>> {
    let mut cmd = SweepArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(SweepArgs::from_arg_matches(&matches)?))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--")
}

async fn run_async(args: SweepArgs) -> AppResult<()> {
    let plan = build_plan(args)?;
    execute_plan(plan).await
}
