use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::app::{LoadCoordinator, print_report};
use crate::args::{DEFAULT_CONFIG_FILES, TesterArgs};
use crate::config::RunConfig;
use crate::error::AppResult;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    apply_config(&mut args, &matches)?;
    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run_async(&args));
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    treat_as_empty && !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

async fn run_async(args: &TesterArgs) -> AppResult<()> {
    let config = RunConfig::from_args(args)?;
    let (shutdown_tx, _) = shutdown_channel();

    // The coordinator subscribes on construction, so it must exist before
    // signals are routed into the channel.
    let mut coordinator = LoadCoordinator::for_http(config, shutdown_tx.clone())?;
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let outcome = coordinator.run().await;

    signal_handle.abort();
    if let Err(err) = signal_handle.await
        && !err.is_cancelled()
    {
        tracing::debug!("Signal handler task ended abnormally: {}", err);
    }

    let summary = outcome?;
    print_report(
        coordinator.config(),
        &summary,
        args.output_format,
        args.time_unit,
    )?;
    Ok(())
}
