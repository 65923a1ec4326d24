//! Utility functions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Version information for the binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Parse `--key=value` and bare `--flag` arguments
///
/// Bare flags map to `"true"`. Anything not starting with `--` is ignored.
pub fn parse_cli_args<I>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = HashMap::new();

    for arg in args {
        let Some(flag) = arg.strip_prefix("--") else {
            continue;
        };
        match flag.split_once('=') {
            Some((key, value)) => cli_args.insert(key.to_string(), value.to_string()),
            None => cli_args.insert(flag.to_string(), "true".to_string()),
        };
    }

    cli_args
}
