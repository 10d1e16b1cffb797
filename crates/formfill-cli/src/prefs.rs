// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::data_dir;
use anyhow::{Context, Result};
use formfill_app::Theme;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default)]
    theme: Theme,
}

/// User preferences that outlive a session. Loaded once at startup and
/// written back on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    path: PathBuf,
    theme: Theme,
}

impl Preferences {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FORMFILL_PREFS_PATH") {
            return Ok(PathBuf::from(path));
        }
        Ok(data_dir()?.join("preferences.toml"))
    }

    /// A missing file means defaults. An unreadable one is logged and
    /// replaced by defaults rather than blocking startup.
    pub fn load(path: &Path) -> Result<Self> {
        let theme = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read preferences {}", path.display()))?;
            match toml::from_str::<PrefsFile>(&raw) {
                Ok(file) => file.theme,
                Err(error) => {
                    warn!(path = %path.display(), %error, "ignoring malformed preferences");
                    Theme::default()
                }
            }
        } else {
            Theme::default()
        };

        Ok(Self {
            path: path.to_owned(),
            theme,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create preferences directory {}", parent.display()))?;
        }
        let raw = toml::to_string(&PrefsFile { theme: self.theme })
            .context("encode preferences")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write preferences {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::Preferences;
    use anyhow::Result;
    use formfill_app::Theme;

    #[test]
    fn missing_file_defaults_to_light() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let prefs = Preferences::load(&temp.path().join("preferences.toml"))?;
        assert_eq!(prefs.theme(), Theme::Light);
        Ok(())
    }

    #[test]
    fn set_theme_persists_across_loads() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("preferences.toml");

        let mut prefs = Preferences::load(&path)?;
        prefs.set_theme(Theme::Dark)?;
        assert_eq!(std::fs::read_to_string(&path)?.trim(), "theme = \"dark\"");

        let reloaded = Preferences::load(&path)?;
        assert_eq!(reloaded.theme(), Theme::Dark);
        assert_eq!(reloaded.path(), path.as_path());
        Ok(())
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"neon\"\n")?;
        let prefs = Preferences::load(&path)?;
        assert_eq!(prefs.theme(), Theme::Light);
        Ok(())
    }
}
