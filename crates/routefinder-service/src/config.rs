//! Environment-driven service configuration.
//!
//! | variable | default |
//! |---|---|
//! | `ROUTEFINDER_SOURCE` | required |
//! | `ROUTEFINDER_CRS` | from the source |
//! | `ROUTEFINDER_SNAP_TOLERANCE` | `1e-6` |
//! | `ROUTEFINDER_RESPECT_ONEWAY` | `false` |
//! | `ROUTEFINDER_QUERY_TIMEOUT_MS` | `30000` |
//! | `SERVICE_PORT` | `8080` |

use std::path::PathBuf;
use std::time::Duration;

use routefinder_lib::{resolve_crs, resolve_source_path, BuildOptions, Crs, DEFAULT_SNAP_TOLERANCE};

use crate::state::AppStateError;

pub const SNAP_TOLERANCE_ENV_VAR: &str = "ROUTEFINDER_SNAP_TOLERANCE";
pub const RESPECT_ONEWAY_ENV_VAR: &str = "ROUTEFINDER_RESPECT_ONEWAY";
pub const QUERY_TIMEOUT_ENV_VAR: &str = "ROUTEFINDER_QUERY_TIMEOUT_MS";
pub const PORT_ENV_VAR: &str = "SERVICE_PORT";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub source: PathBuf,
    pub crs: Option<Crs>,
    pub build: BuildOptions,
    pub port: u16,
    pub query_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, AppStateError> {
        let source = resolve_source_path(None)?;
        let crs = resolve_crs(None)?;

        let snap_tolerance = match read_var(SNAP_TOLERANCE_ENV_VAR) {
            Some(raw) => parse_var(SNAP_TOLERANCE_ENV_VAR, &raw)?,
            None => DEFAULT_SNAP_TOLERANCE,
        };
        let respect_oneway = read_var(RESPECT_ONEWAY_ENV_VAR)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        let port = match read_var(PORT_ENV_VAR) {
            Some(raw) => parse_var(PORT_ENV_VAR, &raw)?,
            None => DEFAULT_PORT,
        };
        let query_timeout = match read_var(QUERY_TIMEOUT_ENV_VAR) {
            Some(raw) => Duration::from_millis(parse_var(QUERY_TIMEOUT_ENV_VAR, &raw)?),
            None => DEFAULT_QUERY_TIMEOUT,
        };

        Ok(Self {
            source,
            crs,
            build: BuildOptions {
                snap_tolerance,
                respect_oneway,
            },
            port,
            query_timeout,
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, AppStateError> {
    raw.parse().map_err(|_| AppStateError::InvalidSetting {
        name,
        value: raw.to_string(),
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
