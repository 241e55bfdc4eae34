//! Persisted light/dark preference.
//!
//! Read once at startup from a single file holding `light` or `dark`; a
//! missing or malformed file means `light`. Every toggle writes the file
//! before returning, so a restart right after toggling sees the new value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    mode: ThemeMode,
}

impl ThemeStore {
    /// `<config_dir>/playground-cli/theme`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playground-cli")
            .join("theme")
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mode = match fs::read_to_string(&path) {
            Ok(raw) => ThemeMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("ignoring malformed theme file {}", path.display());
                ThemeMode::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ThemeMode::default(),
            Err(e) => {
                tracing::warn!("could not read theme file {}: {e}", path.display());
                ThemeMode::default()
            }
        };
        tracing::debug!("theme loaded: {}", mode.as_str());
        Self { path, mode }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flip and persist. The in-memory value flips even if the write fails.
    pub fn toggle(&mut self) -> io::Result<ThemeMode> {
        self.mode = self.mode.toggled();
        self.persist()?;
        Ok(self.mode)
    }

    fn persist(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.mode.as_str())
    }
}
