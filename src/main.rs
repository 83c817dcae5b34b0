// src/main.rs

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::error;

use nawabs::cli::{Cli, Command};
use nawabs::commands;
use nawabs::config::{Config, ConfigOverrides};

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::Init = cli.command {
        return commands::cmd_init(cli.workspace);
    }

    let overrides = ConfigOverrides {
        workspace: cli.workspace,
        compiler_exe: cli.nim_exe,
        clone_using_https: cli.clone_using_https,
        norecipes: cli.norecipes,
        non_interactive: cli.non_interactive,
    };
    let start = std::env::current_dir()?;
    let config = Config::discover(&start, overrides)?;

    match cli.command {
        Command::Init => unreachable!("handled above"),
        Command::Refresh => commands::cmd_refresh(&config),
        Command::Search { terms } => commands::cmd_search(&config, &terms),
        Command::List => commands::cmd_list(&config),
        Command::Clone { name } => commands::cmd_clone(&config, &name),
        Command::Tinker { backend, name } => commands::cmd_tinker(&config, &backend, &name),
        Command::Update { name } => commands::cmd_replay(&config, &name),
        Command::Pinned { name } => commands::cmd_replay(&config, &name),
        Command::Build(args) => match args.as_slice() {
            [backend, name] => commands::cmd_build(&config, backend, name),
            _ => bail!("usage: nawabs <backend> <name>"),
        },
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
