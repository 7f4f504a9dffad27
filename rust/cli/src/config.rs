//! Layered configuration: built-in defaults, then an optional TOML file named
//! by `POTLEDGER_CONFIG`, then individual environment variables. Every value
//! remembers which layer it came from so `potledger cfg` can show it.

use potledger_engine::stats::StatsConfig;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "POTLEDGER_CONFIG";
pub const REBUY_THRESHOLD_ENV: &str = "POTLEDGER_REBUY_THRESHOLD_BB";
pub const SEPARATOR_ENV: &str = "POTLEDGER_SEPARATOR";
pub const SHOW_BUYINS_ENV: &str = "POTLEDGER_SHOW_BUYINS";

/// Column separator of the dynamics export.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    #[default]
    Comma,
    Tab,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Tab => '\t',
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Some(Separator::Comma),
            "tab" | "tabs" | "\t" => Some(Separator::Tab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Stack increases of at least this many big blinds count as rebuys.
    pub rebuy_threshold_bb: Option<u32>,
    pub dynamics_separator: Separator,
    /// Always list buy-ins in the summary.
    pub show_buyins: bool,
}

impl Config {
    pub fn stats_config(&self) -> StatsConfig {
        StatsConfig {
            rebuy_threshold_bb: self.rebuy_threshold_bb,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub rebuy_threshold_bb: ValueSource,
    pub dynamics_separator: ValueSource,
    pub show_buyins: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            rebuy_threshold_bb: ValueSource::Default,
            dynamics_separator: ValueSource::Default,
            show_buyins: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read {}: {}", CONFIG_ENV, e),
            ConfigError::Parse(e) => write!(f, "invalid TOML: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(&path)?;
        let f: FileConfig = toml::from_str(&s)?;
        tracing::debug!(path = %path, "configuration file loaded");
        if let Some(v) = f.rebuy_threshold_bb {
            cfg.rebuy_threshold_bb = Some(v);
            sources.rebuy_threshold_bb = ValueSource::File;
        }
        if let Some(v) = f.dynamics_separator {
            cfg.dynamics_separator = v;
            sources.dynamics_separator = ValueSource::File;
        }
        if let Some(v) = f.show_buyins {
            cfg.show_buyins = v;
            sources.show_buyins = ValueSource::File;
        }
    }

    if let Ok(threshold) = std::env::var(REBUY_THRESHOLD_ENV)
        && !threshold.is_empty()
    {
        cfg.rebuy_threshold_bb = Some(
            threshold
                .parse()
                .map_err(|_| ConfigError::Invalid("Invalid rebuy_threshold_bb".into()))?,
        );
        sources.rebuy_threshold_bb = ValueSource::Env;
    }
    if let Ok(sep) = std::env::var(SEPARATOR_ENV)
        && !sep.is_empty()
    {
        cfg.dynamics_separator = Separator::parse(&sep)
            .ok_or_else(|| ConfigError::Invalid("Invalid dynamics_separator".into()))?;
        sources.dynamics_separator = ValueSource::Env;
    }
    if let Ok(show) = std::env::var(SHOW_BUYINS_ENV)
        && !show.is_empty()
    {
        cfg.show_buyins =
            parse_bool(&show).ok_or_else(|| ConfigError::Invalid("Invalid show_buyins".into()))?;
        sources.show_buyins = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    rebuy_threshold_bb: Option<u32>,
    #[serde(default)]
    dynamics_separator: Option<Separator>,
    #[serde(default)]
    show_buyins: Option<bool>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.rebuy_threshold_bb == Some(0) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: rebuy_threshold_bb must be >0".into(),
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write as _;

    fn clear_env() {
        for key in [CONFIG_ENV, REBUY_THRESHOLD_ENV, SEPARATOR_ENV, SHOW_BUYINS_ENV] {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_without_environment() {
        clear_env();
        let resolved = load_with_sources().unwrap();
        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources.rebuy_threshold_bb, ValueSource::Default);
        assert_eq!(resolved.config.stats_config(), StatsConfig::default());
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rebuy_threshold_bb = 50\ndynamics_separator = \"tab\"").unwrap();
        unsafe {
            std::env::set_var(CONFIG_ENV, file.path());
            std::env::set_var(REBUY_THRESHOLD_ENV, "100");
        }
        let resolved = load_with_sources().unwrap();
        clear_env();

        assert_eq!(resolved.config.rebuy_threshold_bb, Some(100));
        assert_eq!(resolved.sources.rebuy_threshold_bb, ValueSource::Env);
        assert_eq!(resolved.config.dynamics_separator, Separator::Tab);
        assert_eq!(resolved.sources.dynamics_separator, ValueSource::File);
        assert!(!resolved.config.show_buyins);
        assert_eq!(resolved.sources.show_buyins, ValueSource::Default);
    }

    #[test]
    #[serial]
    fn zero_threshold_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var(REBUY_THRESHOLD_ENV, "0");
        }
        let result = load();
        clear_env();
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains(">0")));
    }

    #[test]
    #[serial]
    fn malformed_values_are_rejected() {
        clear_env();
        unsafe {
            std::env::set_var(SHOW_BUYINS_ENV, "sometimes");
        }
        assert!(load().is_err());
        clear_env();
        unsafe {
            std::env::set_var(SEPARATOR_ENV, "semicolon");
        }
        assert!(load().is_err());
        clear_env();
    }

    #[test]
    fn separator_parses_aliases() {
        assert_eq!(Separator::parse("TAB"), Some(Separator::Tab));
        assert_eq!(Separator::parse(","), Some(Separator::Comma));
        assert_eq!(Separator::Tab.as_char(), '\t');
    }
}
