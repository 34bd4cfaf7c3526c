//! Locations of the configuration files warden merges.

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// File-backed configuration layers, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Per-user settings shared by every deployment on the machine.
    User,
    /// Checked-in deployment settings.
    Project,
    /// Untracked overrides next to the project file.
    Local,
}

impl ConfigLayer {
    pub const ALL: [ConfigLayer; 3] = [ConfigLayer::User, ConfigLayer::Project, ConfigLayer::Local];

    pub fn file_name(self) -> &'static str {
        match self {
            ConfigLayer::User => "config.toml",
            ConfigLayer::Project => "warden.toml",
            ConfigLayer::Local => "warden.local.toml",
        }
    }
}

/// Resolves where each [`ConfigLayer`] lives.
#[derive(Debug)]
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "Warden", "warden"),
        }
    }

    /// Platform config directory for warden, e.g. `~/.config/warden` on Linux.
    ///
    /// # Errors
    ///
    /// [`ConfigError::XdgError`] when no home directory can be determined.
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::XdgError("no home directory for warden user config".to_string()))
    }

    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join(ConfigLayer::User.file_name()))
    }

    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(ConfigLayer::Project.file_name())
    }

    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(ConfigLayer::Local.file_name())
    }

    /// Path of `layer` for `project_dir`, or `None` for the user layer when
    /// there is no home directory.
    pub fn layer_file(&self, layer: ConfigLayer, project_dir: &Path) -> Option<PathBuf> {
        match layer {
            ConfigLayer::User => self.user_config_file().ok(),
            ConfigLayer::Project => Some(Self::project_config_file(project_dir)),
            ConfigLayer::Local => Some(Self::local_config_file(project_dir)),
        }
    }

    /// Layers whose file exists, lowest precedence first.
    pub fn existing_layers(
        &self,
        project_dir: &Path,
        include_user: bool,
    ) -> Vec<(ConfigLayer, PathBuf)> {
        ConfigLayer::ALL
            .into_iter()
            .filter(|layer| include_user || *layer != ConfigLayer::User)
            .filter_map(|layer| Some((layer, self.layer_file(layer, project_dir)?)))
            .filter(|(_, file)| file.is_file())
            .collect()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn user_file_sits_in_warden_config_dir() {
        let paths = Paths::new();

        if let Ok(file) = paths.user_config_file() {
            assert_eq!(file.parent(), paths.user_config_dir().ok().as_deref());
            assert!(file.to_string_lossy().contains("warden"));
            assert!(file.ends_with("config.toml"));
        }
    }

    #[test]
    fn deployment_files_live_in_project_dir() {
        let dir = tempdir().expect("Failed to create temp dir");

        assert_eq!(
            Paths::project_config_file(dir.path()),
            dir.path().join("warden.toml")
        );
        assert_eq!(
            Paths::local_config_file(dir.path()),
            dir.path().join("warden.local.toml")
        );
    }

    #[test]
    fn existing_layers_skips_missing_files_and_keeps_precedence() {
        let dir = tempdir().expect("Failed to create temp dir");
        let paths = Paths::new();
        assert!(paths.existing_layers(dir.path(), false).is_empty());

        fs::write(dir.path().join("warden.local.toml"), "").expect("Failed to write local config");
        fs::write(dir.path().join("warden.toml"), "").expect("Failed to write project config");
        fs::create_dir(dir.path().join("nested")).expect("Failed to create dir");

        let layers: Vec<ConfigLayer> = paths
            .existing_layers(dir.path(), false)
            .into_iter()
            .map(|(layer, _)| layer)
            .collect();
        assert_eq!(layers, vec![ConfigLayer::Project, ConfigLayer::Local]);
    }
}
