//! Standard paths used by myvault

use std::path::PathBuf;

/// Standard myvault paths
pub struct Paths {
    /// Data directory (~/.local/share/myvault)
    pub data: PathBuf,
    /// Config directory (~/.config/myvault)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("myvault");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("myvault");

        Self { data, config }
    }

    /// Default configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Default log file (appended to on every run)
    pub fn log_file(&self) -> PathBuf {
        self.data.join("myvault.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        let paths = Paths::new();
        assert!(paths.data.ends_with("myvault"));
        assert!(paths.config.ends_with("myvault"));
        assert_eq!(paths.config_file().file_name().unwrap(), "config.json");
        assert_eq!(paths.log_file().file_name().unwrap(), "myvault.log");
    }
}
