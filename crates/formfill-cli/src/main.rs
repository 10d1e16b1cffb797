// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod prefs;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use formfill_api::Client;
use formfill_app::Session;
use prefs::Preferences;
use runtime::HttpRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `formfill --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let client = Client::new(config.api_base_url(), config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    let timings = config.session_timings()?;

    if options.check_only {
        return check_backend(&client);
    }

    let log_path = logging::init(&config)?;
    info!(
        base_url = client.base_url(),
        log = %log_path.display(),
        "starting formfill"
    );

    let prefs_path = Preferences::default_path()?;
    let preferences = Preferences::load(&prefs_path)?;
    let theme = preferences.theme();

    let mut session = Session::new(timings, config.stale_days());
    let mut runtime = HttpRuntime::new(client, preferences);
    formfill_tui::run_app(&mut session, &mut runtime, theme)
}

fn check_backend(client: &Client) -> Result<()> {
    let health = client
        .health()
        .with_context(|| format!("health check against {}", client.base_url()))?;
    match &health.llm_provider {
        Some(provider) => println!("backend {} ({provider})", health.status),
        None => println!("backend {}", health.status),
    }

    let identifiers = client
        .list_identifiers()
        .with_context(|| format!("list identifiers from {}", client.base_url()))?;
    println!("{} records available", identifiers.len());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("formfill - record browser and editor");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and query the backend");
    println!("  --help                   Show this help");
}
