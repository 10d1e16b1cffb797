// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, bail};
use std::env::{self, VarError};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "FORMFILL_LOG";

/// The terminal belongs to the UI, so logs go to an append-only file.
/// `FORMFILL_LOG` overrides the configured level.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter(env_directives()?.as_deref(), config.log_level())?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(path)
}

fn env_directives() -> Result<Option<String>> {
    match env::var(LOG_ENV) {
        Ok(directives) => Ok(Some(directives)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => bail!("{LOG_ENV} is not valid UTF-8"),
    }
}

/// Only an unset override falls back to the configured level.
fn filter(from_env: Option<&str>, configured: &str) -> Result<EnvFilter> {
    match from_env {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}")),
        None => EnvFilter::try_new(configured)
            .with_context(|| format!("invalid log level {configured:?}")),
    }
}
