//! chronicle - a daily journal stored as plain folders, one note per day

pub mod cli;
pub mod domain;
pub mod infra;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_archive, handle_calendar, handle_connect, handle_edit, handle_grant, handle_show,
        handle_status, handle_write, storage_context,
    },
};
use infra::CapabilityStore;

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let mut store = CapabilityStore::new(config.state_file());
    let verbose = cli.verbose > 0;
    let context = |store: &mut CapabilityStore| storage_context(cli.dir.as_deref(), &config, store);

    match &cli.command {
        Command::Connect(args) => handle_connect(args, &mut store, verbose),
        Command::Status => handle_status(&mut store),
        Command::Grant(args) => handle_grant(args, &mut store),
        Command::Write(args) => handle_write(args, &context(&mut store)?),
        Command::Edit(args) => handle_edit(args, &context(&mut store)?, &config),
        Command::Show(args) => handle_show(args, &context(&mut store)?),
        Command::Archive(args) => handle_archive(args, &context(&mut store)?, verbose),
        Command::Calendar(args) => handle_calendar(args, &context(&mut store)?),
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "chronicle",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Initializes the logger; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
