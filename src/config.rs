use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_TF_ARGS_PREFIX,
    DEFAULT_TF_PATH, WORKSPACE_CONFIG_FILE_NAME,
};
use crate::debug;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// when files are checked out automatically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AutoCheckout {
    #[default]
    #[serde(rename = "off", alias = "never")]
    Off,
    #[serde(rename = "on save")]
    OnSave,
}

/// whether a check-in needs a comment before the backend is called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentPolicy {
    #[default]
    Prompt,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// tf client executable
    pub tf_path: String,

    /// arguments placed before every command, `["vc"]` for the team explorer client
    pub tf_args_prefix: Vec<String>,

    pub command_timeout_secs: u64,

    pub auto_checkout: AutoCheckout,

    pub checkin_comment: CommentPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tf_path: DEFAULT_TF_PATH.to_string(),
            tf_args_prefix: DEFAULT_TF_ARGS_PREFIX
                .iter()
                .map(ToString::to_string)
                .collect(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            auto_checkout: AutoCheckout::default(),
            checkin_comment: CommentPolicy::default(),
        }
    }
}

impl Settings {
    /// load settings for a workspace
    ///
    /// an explicit file wins, then the workspace file, then the user file,
    /// then built-in defaults
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let workspace_file = root.join(WORKSPACE_CONFIG_FILE_NAME);
        if workspace_file.is_file() {
            return Self::from_file(&workspace_file);
        }

        if let Some(user_file) = user_config_file()
            && user_file.is_file()
        {
            return Self::from_file(&user_file);
        }

        debug!("no settings file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("loading settings from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
