//! Standard paths used by tempo

use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "TEMPO_CONFIG";

/// Standard tempo paths
pub struct Paths {
    /// Config directory (~/.config/tempo)
    pub config: PathBuf,
    /// Data directory (~/.local/share/tempo), where bundled sounds are looked up
    pub data: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("tempo");

        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("tempo");

        Self { config, data }
    }

    /// Default location of the configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Resolve the config file: explicit path, then `TEMPO_CONFIG`, then the default
    pub fn resolve_config(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| self.config_file())
    }

    /// Path of a sound bundled in the data directory (e.g. `click.wav`)
    pub fn sound(&self, name: &str) -> PathBuf {
        self.data.join("sounds").join(name)
    }
}
