//! Configuration command handler.
//!
//! Displays the effective configuration with the source of each value
//! (default, environment, or configuration file).
//!
//! # Example Output
//!
//! ```json
//! {
//!   "rebuy_threshold_bb": {
//!     "value": null,
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "rebuy_threshold_bb": {
            "value": config.rebuy_threshold_bb,
            "source": sources.rebuy_threshold_bb,
        },
        "dynamics_separator": {
            "value": config.dynamics_separator,
            "source": sources.dynamics_separator,
        },
        "show_buyins": {
            "value": config.show_buyins,
            "source": sources.show_buyins,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_ENV, REBUY_THRESHOLD_ENV, SEPARATOR_ENV, SHOW_BUYINS_ENV};
    use serial_test::serial;

    fn clear_env() {
        for key in [CONFIG_ENV, REBUY_THRESHOLD_ENV, SEPARATOR_ENV, SHOW_BUYINS_ENV] {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_cfg_displays_json_output() {
        clear_env();
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_cfg_command(&mut out, &mut err).unwrap();

        let output = String::from_utf8(out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&output).expect("cfg output should be valid JSON");
        assert!(json["rebuy_threshold_bb"]["value"].is_null());
        assert_eq!(json["dynamics_separator"]["value"], "comma");
        assert_eq!(json["show_buyins"]["source"], "default");
        assert!(err.is_empty(), "should not write to stderr on success");
    }

    #[test]
    #[serial]
    fn test_cfg_reports_env_source() {
        clear_env();
        unsafe {
            std::env::set_var(SHOW_BUYINS_ENV, "yes");
        }
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_cfg_command(&mut out, &mut err);
        clear_env();

        result.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["show_buyins"]["value"], true);
        assert_eq!(json["show_buyins"]["source"], "env");
    }

    #[test]
    #[serial]
    fn test_cfg_handles_config_error() {
        clear_env();
        unsafe {
            std::env::set_var(REBUY_THRESHOLD_ENV, "lots");
        }
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_cfg_command(&mut out, &mut err);
        clear_env();

        assert!(matches!(result, Err(CliError::Config(_))));
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.starts_with("Error: Invalid configuration"));
        assert!(out.is_empty());
    }
}
