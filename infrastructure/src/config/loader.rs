//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
pub const PROJECT_CONFIG_FILES: [&str; 2] = ["dashagent.toml", ".dashagent.toml"];

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "DASHAGENT_";

/// Where a configuration layer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `DASHAGENT_*` environment variables (`__` separates sections,
    ///    e.g. `DASHAGENT_WORKFLOW__MAX_PARALLEL_STEPS=1`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./dashagent.toml` or `./.dashagent.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/dashagent/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path();
        Self::figment(global.as_deref(), Path::new("."), config_path.map(PathBuf::as_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load the file layers only, without environment variables
    pub fn load_files(
        global: Option<&Path>,
        project_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(global, project_dir, explicit)
            .extract()
            .map_err(Box::new)
    }

    fn figment(global: Option<&Path>, project_dir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global.filter(|p| p.exists()) {
            tracing::debug!(path = %global_path.display(), "Loading global config");
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = Self::project_config_in(project_dir) {
            tracing::debug!(path = %project_path.display(), "Loading project config");
            figment = figment.merge(Toml::file(project_path));
        }

        // A missing explicit file is an error, unlike the discovered layers
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading explicit config");
            figment = figment.merge(Toml::file_exact(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/dashagent/config.toml if set,
    /// otherwise falls back to ~/.config/dashagent/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dashagent").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// The config layers in priority order, for `show-config`
    pub fn config_sources(explicit: Option<&PathBuf>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        sources.push(ConfigSource {
            label: "Environment",
            location: format!("{}*", ENV_PREFIX),
            found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
        });

        if let Some(path) = explicit {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: format!("./{} or ./{}", PROJECT_CONFIG_FILES[0], PROJECT_CONFIG_FILES[1]),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                location: path.display().to_string(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.workflow.max_parallel_steps, 1);
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("dashagent"));
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[workflow]\nmax_parallel_steps = 8\n\n[confirmation]\nttl_seconds = 60\n",
        )
        .unwrap();

        let project_dir = dir.path().join("project");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join(".dashagent.toml"), "[workflow]\nmax_parallel_steps = 2\n").unwrap();

        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = ConfigLoader::load_files(Some(&global), &project_dir, Some(&explicit)).unwrap();
        assert_eq!(config.workflow.max_parallel_steps, 2);
        assert_eq!(config.confirmation.ttl_seconds, 60);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_plain_name_wins_over_dotfile() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dashagent.toml"), "[confirmation]\nttl_seconds = 10\n").unwrap();
        fs::write(dir.path().join(".dashagent.toml"), "[confirmation]\nttl_seconds = 20\n").unwrap();

        let config = ConfigLoader::load_files(None, dir.path(), None).unwrap();
        assert_eq!(config.confirmation.ttl_seconds, 10);
    }

    #[test]
    fn test_missing_global_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_files(Some(&dir.path().join("absent.toml")), dir.path(), None).unwrap();
        assert_eq!(config.workflow.max_parallel_steps, 1);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = ConfigLoader::load_files(None, dir.path(), Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dashagent.toml"), "[workflow]\nmax_parallel_steps = \"many\"\n").unwrap();
        assert!(ConfigLoader::load_files(None, dir.path(), None).is_err());
    }

    #[test]
    fn test_workflows_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("dashagent.toml"),
            r#"
[[workflows]]
id = "next-week"
name = "Next week"

[[workflows.steps]]
id = "when"
tool = "parse_date"
params = { text = "next week" }
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_files(None, dir.path(), None).unwrap();
        assert_eq!(config.workflows.len(), 1);
        assert_eq!(config.workflows[0].steps[0].params["text"], "next week");
    }

    #[test]
    fn test_config_sources_end_with_defaults() {
        let sources = ConfigLoader::config_sources(None);
        assert_eq!(sources[0].label, "Environment");
        let last = sources.last().unwrap();
        assert_eq!(last.label, "Default");
        assert!(last.found);
    }
}
