use super::rules::RuleConfig;
use super::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML config: {}", path.as_ref().display()))?;

    Ok(config)
}

/// A missing file means defaults; a present but broken file is an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    if !path.as_ref().exists() {
        log::warn!(
            "Config file not found: {}, using defaults",
            path.as_ref().display()
        );
        return Ok(Config::default());
    }

    let config = load_config(&path)?;
    log::info!("Loaded configuration from: {}", path.as_ref().display());
    Ok(config)
}

/// Rule data for the engine: an explicit override wins over the config's
/// `rules_file`, and neither means the built-in rule set.
pub fn load_rules(config: &Config, override_path: Option<&str>) -> Result<RuleConfig> {
    match override_path.or(config.rules_file.as_deref()) {
        Some(path) => RuleConfig::load_from_file(path),
        None => {
            log::debug!("Using built-in rule set");
            Ok(RuleConfig::default())
        }
    }
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(&Config::default())?;
    fs::write(&path, yaml)
        .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
    Ok(())
}

pub fn write_default_rules<P: AsRef<Path>>(path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(&RuleConfig::default())?;
    fs::write(&path, yaml)
        .with_context(|| format!("Failed to write rule file: {}", path.as_ref().display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "storage: [unterminated").unwrap();
        assert!(load_config_or_default(&path).is_err());
    }

    #[test]
    fn test_generated_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("clearnet.yaml");
        let rules_path = dir.path().join("rules.yaml");

        write_default_config(&config_path).unwrap();
        write_default_rules(&rules_path).unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config, Config::default());

        let rules = load_rules(&config, rules_path.to_str()).unwrap();
        assert_eq!(rules, RuleConfig::default());
    }

    #[test]
    fn test_rules_default_when_unset() {
        let rules = load_rules(&Config::default(), None).unwrap();
        assert_eq!(rules.thresholds.high, 70);
    }
}
