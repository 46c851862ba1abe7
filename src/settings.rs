//! Persisted display preferences.
//!
//! Preferences live as a single JSON record under the fixed key
//! [`SETTINGS_KEY`]:
//!
//! ```json
//! {"backgroundColor":"#ffffff","fontSize":16,"layout":"grid","theme":"light"}
//! ```
//!
//! Loading never fails: a missing or unparseable record yields
//! [`Preferences::default`]. Every successful change rewrites the record.
//!
//! Storage goes through [`KeyValueStorage`] so the record can live wherever
//! the host keeps small state; [`FileStorage`] writes one `<key>.json` file
//! per key under a directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Storage key of the preferences record.
pub const SETTINGS_KEY: &str = "gallerySettings";

/// Allowed font sizes in pixels.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 12..=24;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Grid => "grid",
            Layout::List => "list",
        })
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Layout::Grid),
            "list" => Ok(Layout::List),
            other => Err(format!("unknown layout '{other}' (expected grid or list)")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// User display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// CSS colour of the page background.
    pub background_color: String,
    /// Base font size in pixels.
    pub font_size: u32,
    pub layout: Layout,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            font_size: 16,
            layout: Layout::Grid,
            theme: Theme::Light,
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(SettingsError::Validation(format!(
                "fontSize must be {}-{}",
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            )));
        }
        if self.background_color.trim().is_empty() {
            return Err(SettingsError::Validation(
                "backgroundColor must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// CSS custom properties a renderer applies to the document root.
    pub fn css_variables(&self) -> String {
        format!(
            ":root {{\n    --background-color: {};\n    --font-size: {}px;\n}}",
            self.background_color, self.font_size
        )
    }
}

/// A partial update: only `Some` fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub background_color: Option<String>,
    pub font_size: Option<u32>,
    pub layout: Option<Layout>,
    pub theme: Option<Theme>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.font_size.is_none()
            && self.layout.is_none()
            && self.theme.is_none()
    }

    fn apply_to(self, prefs: &mut Preferences) {
        if let Some(color) = self.background_color {
            prefs.background_color = color;
        }
        if let Some(size) = self.font_size {
            prefs.font_size = size;
        }
        if let Some(layout) = self.layout {
            prefs.layout = layout;
        }
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
    }
}

/// Minimal string key-value persistence.
pub trait KeyValueStorage {
    /// `None` if the key has never been written or cannot be read.
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)
    }
}

/// Preferences plus the storage they are mirrored to.
#[derive(Debug)]
pub struct SettingsStore<S> {
    storage: S,
    current: Preferences,
}

impl<S: KeyValueStorage> SettingsStore<S> {
    /// Read the stored record, falling back to defaults when it is absent,
    /// unparseable or out of range.
    pub fn load(storage: S) -> Self {
        let current = match storage.read(SETTINGS_KEY) {
            Some(raw) => match serde_json::from_str::<Preferences>(&raw) {
                Ok(prefs) if prefs.validate().is_ok() => prefs,
                Ok(_) | Err(_) => {
                    tracing::warn!(key = SETTINGS_KEY, "stored preferences unusable, using defaults");
                    Preferences::default()
                }
            },
            None => Preferences::default(),
        };
        Self { storage, current }
    }

    pub fn get(&self) -> &Preferences {
        &self.current
    }

    /// Merge `patch`, validate and persist. Invalid patches change nothing.
    pub fn update(&mut self, patch: PreferencesPatch) -> Result<&Preferences, SettingsError> {
        let mut next = self.current.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        self.persist(&next)?;
        self.current = next;
        Ok(&self.current)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, SettingsError> {
        let theme = self.current.theme.toggled();
        self.update(PreferencesPatch {
            theme: Some(theme),
            ..Default::default()
        })?;
        Ok(theme)
    }

    fn persist(&mut self, prefs: &Preferences) -> Result<(), SettingsError> {
        let json = serde_json::to_string(prefs)?;
        self.storage.write(SETTINGS_KEY, &json)?;
        tracing::debug!(key = SETTINGS_KEY, "preferences saved");
        Ok(())
    }
}
