use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::Deserialize;

/// Largest decimals value the unit parser accepts.
const MAX_DECIMALS: u8 = 77;

/// Top-level airdrop configuration loaded from TOML.
#[derive(Debug, Deserialize)]
pub struct AirdropConfig {
    pub token: TokenConfig,
    pub campaign: CampaignConfig,
}

/// Token the allocations are denominated in.
#[derive(Debug, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    /// Amounts in the allocation file are scaled by `10^decimals`.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}

/// Campaign parameters.
#[derive(Debug, Deserialize)]
pub struct CampaignConfig {
    /// Account allowed to publish the root. The builder only reports it; the
    /// distributor's `OwnerAuthorizer` enforces it.
    pub owner: Address,
    /// Allocation file (JSON array). Relative paths resolve against the config file.
    pub input: PathBuf,
    /// Distribution file to write. Relative paths resolve against the config file.
    pub output: PathBuf,
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AirdropConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.campaign.input = base.join(&config.campaign.input);
            config.campaign.output = base.join(&config.campaign.output);
        }
        config.validate()?;
        Ok(config)
    }

    /// Replace the input and/or output paths (command-line overrides) and
    /// validate again.
    pub fn with_overrides(
        mut self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(input) = input {
            self.campaign.input = input;
        }
        if let Some(output) = output {
            self.campaign.output = output;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.decimals > MAX_DECIMALS {
            return Err(ConfigError::Validation(format!(
                "token.decimals must be at most {MAX_DECIMALS}, got {}",
                self.token.decimals
            )));
        }
        if self.campaign.owner == Address::ZERO {
            return Err(ConfigError::Validation(
                "campaign.owner must not be the zero address".into(),
            ));
        }
        if self.campaign.input == self.campaign.output {
            return Err(ConfigError::Validation(
                "campaign.input and campaign.output must differ".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        [token]
        symbol = "DROP"
        decimals = 6

        [campaign]
        owner = "0x000000000000000000000000000000000000000a"
        input = "allocations.json"
        output = "distribution.json"
    "#;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airdrop.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_valid_config() {
        let (dir, path) = write_config(VALID);
        let config = AirdropConfig::load(&path).unwrap();

        assert_eq!(config.token.symbol, "DROP");
        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.campaign.owner, Address::with_last_byte(0x0a));
        assert_eq!(config.campaign.input, dir.path().join("allocations.json"));
        assert_eq!(config.campaign.output, dir.path().join("distribution.json"));
    }

    #[test]
    fn test_decimals_default() {
        let (_dir, path) = write_config(&VALID.replace("decimals = 6", ""));
        let config = AirdropConfig::load(&path).unwrap();
        assert_eq!(config.token.decimals, 18);
    }

    #[test]
    fn test_decimals_out_of_range() {
        let (_dir, path) = write_config(&VALID.replace("decimals = 6", "decimals = 78"));
        let err = AirdropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_owner_rejected() {
        let (_dir, path) = write_config(&VALID.replace(
            "0x000000000000000000000000000000000000000a",
            "0x0000000000000000000000000000000000000000",
        ));
        let err = AirdropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_same_input_and_output_rejected() {
        let (_dir, path) = write_config(&VALID.replace("distribution.json", "allocations.json"));
        let err = AirdropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_output_override_onto_input_rejected() {
        let (_dir, path) = write_config(VALID);
        let config = AirdropConfig::load(&path).unwrap();
        let input = config.campaign.input.clone();
        let err = config.with_overrides(None, Some(input)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_overrides_replace_paths() {
        let (dir, path) = write_config(VALID);
        let config = AirdropConfig::load(&path)
            .unwrap()
            .with_overrides(Some(dir.path().join("other.json")), None)
            .unwrap();
        assert_eq!(config.campaign.input, dir.path().join("other.json"));
        assert_eq!(config.campaign.output, dir.path().join("distribution.json"));
    }

    #[test]
    fn test_malformed_toml() {
        let (_dir, path) = write_config("[token\nsymbol = ");
        let err = AirdropConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AirdropConfig::load(Path::new("/nonexistent/airdrop.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
