//! Shared helpers for the CLI integration tests.

use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the CLI in-process with captured streams.
pub fn run_cli(args: &[&str]) -> CliResult {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let argv = std::iter::once("potledger").chain(args.iter().copied());
    let exit_code = potledger_cli::run(argv, &mut out, &mut err);
    CliResult {
        exit_code,
        stdout: String::from_utf8(out).expect("stdout is utf-8"),
        stderr: String::from_utf8(err).expect("stderr is utf-8"),
    }
}

/// Three-hand session shared with the engine tests.
#[allow(dead_code)]
pub fn session_fixture() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../engine/tests/fixtures/session.txt")
        .to_string_lossy()
        .into_owned()
}

#[allow(dead_code)]
pub fn write_log(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write log");
    path
}

/// Clears every `POTLEDGER_*` variable the config layer reads.
#[allow(dead_code)]
pub fn clear_config_env() {
    use potledger_cli::config::{CONFIG_ENV, REBUY_THRESHOLD_ENV, SEPARATOR_ENV, SHOW_BUYINS_ENV};
    for key in [CONFIG_ENV, REBUY_THRESHOLD_ENV, SEPARATOR_ENV, SHOW_BUYINS_ENV] {
        unsafe {
            std::env::remove_var(key);
        }
    }
}
