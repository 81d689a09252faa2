use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_allocation_length")]
    pub allocation_length: i64,
    #[serde(default = "default_invalid_fd")]
    pub invalid_fd: i32,
    #[serde(default)]
    pub keep_scratch: bool,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_allocation_length() -> i64 {
    4096
}

fn default_invalid_fd() -> i32 {
    -1
}

impl Default for Config {
    fn default() -> Config {
        Config {
            scratch_dir: default_scratch_dir(),
            allocation_length: default_allocation_length(),
            invalid_fd: default_invalid_fd(),
            keep_scratch: false,
        }
    }
}

impl Config {
    pub fn from_slice(by: &[u8]) -> Result<Config, failure::Error> {
        let config: Config = toml::de::from_slice(by)?;
        if config.allocation_length <= 0 {
            return Err(failure::format_err!(
                "allocation_length is {}, must be positive",
                config.allocation_length
            ));
        }
        if 0 <= config.invalid_fd {
            return Err(failure::format_err!(
                "invalid_fd is {}, must be negative",
                config.invalid_fd
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config, failure::Error> {
        let mut by = Vec::new();
        let mut file = File::open(path)?;
        file.read_to_end(&mut by)?;
        Config::from_slice(&by)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_slice(b"").unwrap();
        assert_eq!(config.scratch_dir, std::env::temp_dir());
        assert_eq!(config.allocation_length, 4096);
        assert_eq!(config.invalid_fd, -1);
        assert!(!config.keep_scratch);
    }

    #[test]
    fn overrides() {
        let config = Config::from_slice(
            br#"
scratch_dir = "/var/tmp"
allocation_length = 65536
invalid_fd = -7
keep_scratch = true
"#,
        )
        .unwrap();
        assert_eq!(config.scratch_dir, std::path::Path::new("/var/tmp"));
        assert_eq!(config.allocation_length, 65536);
        assert_eq!(config.invalid_fd, -7);
        assert!(config.keep_scratch);
    }

    #[test]
    fn rejects_non_positive_length() {
        assert!(Config::from_slice(b"allocation_length = 0").is_err());
    }

    #[test]
    fn rejects_valid_looking_fd() {
        assert!(Config::from_slice(b"invalid_fd = 0").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::ser::to_string_pretty(&config).unwrap();
        let back = Config::from_slice(text.as_bytes()).unwrap();
        assert_eq!(back.allocation_length, config.allocation_length);
        assert_eq!(back.scratch_dir, config.scratch_dir);
    }
}
