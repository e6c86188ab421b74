//! End tag options.
//!
//! Options are an explicit value handed to every scan and presentation call. Each change goes
//! through [`EndTagOptions::update`], which bumps a runtime-only version; a generation remembers
//! the version it was scanned with, so a stale generation is detected by comparing numbers.
//!
//! The file format is TOML (`endtag.toml`). Unknown keys are ignored and missing keys take
//! their defaults, so older and newer files both load.
//!
//! ```toml
//! enabled = true
//! languages = ["csharp", "java"]
//! display_mode = "icon_and_text"
//! click_mode = "ctrl_click"
//! visibility_mode = "header_not_visible"
//! margin = 16
//! max_walk_steps = 256
//! skip_same_line = true
//! ```

use crate::error::ConfigError;
use crate::header::DEFAULT_MAX_WALK_STEPS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Upper bound for `max_walk_steps`.
pub const MAX_WALK_STEPS_LIMIT: usize = 4096;

const FILE_NAME: &str = "endtag.toml";

/// What an end tag shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Only the icon.
    Icon,
    /// Only the header text.
    Text,
    /// Icon followed by header text.
    #[default]
    IconAndText,
}

/// Which gesture on an end tag jumps to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// A single click.
    #[default]
    Single,
    /// A double click.
    Double,
    /// A single click with Ctrl held.
    CtrlClick,
}

/// When an end tag is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// Always.
    #[default]
    Always,
    /// Only while the header line is scrolled out of view.
    HeaderNotVisible,
}

/// User options for end tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndTagOptions {
    /// Master switch. Disabled options short-circuit scanning.
    pub enabled: bool,
    /// Content types end tags are produced for (compared case-insensitively).
    pub languages: Vec<String>,
    /// What a tag shows.
    pub display_mode: DisplayMode,
    /// Which gesture navigates to the header.
    pub click_mode: ClickMode,
    /// When a tag is shown.
    pub visibility_mode: VisibilityMode,
    /// Gap between the closing brace and the tag, in pixels. Passed through to the UI.
    pub margin: u32,
    /// Bound on the outward structure walk per closing brace.
    pub max_walk_steps: usize,
    /// Suppress tags for blocks whose header is on the closing-brace line.
    pub skip_same_line: bool,
    #[serde(skip)]
    version: u64,
}

impl Default for EndTagOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: ["csharp", "c/c++", "java", "javascript", "typescript"]
                .into_iter()
                .map(String::from)
                .collect(),
            display_mode: DisplayMode::default(),
            click_mode: ClickMode::default(),
            visibility_mode: VisibilityMode::default(),
            margin: 16,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            skip_same_line: true,
            version: 0,
        }
    }
}

impl EndTagOptions {
    /// Parse an options document. Unlike [`load_from`] this reports malformed input.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse an options file.
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Runtime version; bumped by every [`update`](Self::update).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Change options in place and bump the version.
    pub fn update(&mut self, change: impl FnOnce(&mut Self)) {
        let version = self.version;
        change(self);
        self.version = version + 1;
        info!(target: "endtag.config", version = self.version, "options_updated");
    }

    /// `max_walk_steps` clamped to `1..=MAX_WALK_STEPS_LIMIT`.
    pub fn effective_max_walk_steps(&self) -> usize {
        self.max_walk_steps.clamp(1, MAX_WALK_STEPS_LIMIT)
    }

    /// Whether tags are produced for `content_type`.
    pub fn is_language_enabled(&self, content_type: &str) -> bool {
        self.enabled
            && self
                .languages
                .iter()
                .any(|lang| lang.eq_ignore_ascii_case(content_type))
    }
}

/// Best-effort options path: `endtag.toml` in the working directory, else the platform config
/// directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("endtag").join(FILE_NAME);
    }
    local
}

/// Load options from `path` (or [`discover`]), falling back to defaults.
///
/// A missing file is normal and logged at debug level; an unreadable or malformed file is
/// logged as a warning. Neither is an error.
pub fn load_from(path: Option<PathBuf>) -> EndTagOptions {
    let path = path.unwrap_or_else(discover);
    if !path.exists() {
        tracing::debug!(target: "endtag.config", path = %path.display(), "options_file_missing");
        return EndTagOptions::default();
    }
    match EndTagOptions::read_from(&path) {
        Ok(options) => {
            info!(target: "endtag.config", path = %path.display(), "options_loaded");
            options
        }
        Err(err) => {
            warn!(
                target: "endtag.config",
                path = %path.display(),
                error = %err,
                "options_fallback_to_defaults"
            );
            EndTagOptions::default()
        }
    }
}
