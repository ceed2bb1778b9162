use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/typerace`, falling back to the platform data dir.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("typerace"))
        } else {
            ProjectDirs::from("", "", "typerace").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("results.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("typerace.log"))
    }

    pub fn artifacts_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("artifacts"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typerace").map(|pd| pd.config_dir().join("config.json"))
    }
}
