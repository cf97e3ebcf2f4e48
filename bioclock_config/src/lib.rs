#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the dose timeline engine.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section is optional; omitted keys fall back to the defaults the
//!   dashboard has always used (30 min onset, 240 min duration, 20% afterglow,
//!   14 day tolerance reset, 5 s tick).
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Location of the substance reference dataset (JSON map of key -> profile).
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogCfg {
    /// Path to the dataset. Relative paths are resolved against the config file's directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverCfg {
    /// Onset used when a substance has no onset text at all (minutes)
    pub default_onset_min: f64,
    /// Duration used when a substance has no duration text at all (minutes)
    pub default_duration_min: f64,
}

impl Default for ResolverCfg {
    fn default() -> Self {
        Self {
            default_onset_min: 30.0,
            default_duration_min: 240.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PhaseCfg {
    /// Total window = duration * afterglow_factor. Must be >= 1.0.
    pub afterglow_factor: f64,
}

impl Default for PhaseCfg {
    fn default() -> Self {
        Self {
            afterglow_factor: 1.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ToleranceCfg {
    /// Days after which tolerance is considered fully reset
    pub reset_days: f64,
    /// Power-law coefficient (percent)
    pub coefficient: f64,
    /// Power-law exponent (negative)
    pub exponent: f64,
}

impl Default for ToleranceCfg {
    fn default() -> Self {
        Self {
            reset_days: 14.0,
            coefficient: 280.059565,
            exponent: -0.412565956,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TickerCfg {
    /// Re-render period for `timeline --watch` (ms)
    pub interval_ms: u64,
}

impl Default for TickerCfg {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerCfg {
    /// Socket address for `serve`. Also accepts alias "bind_address".
    #[serde(alias = "bind_address")]
    pub bind: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogCfg,
    pub resolver: ResolverCfg,
    pub phase: PhaseCfg,
    pub tolerance: ToleranceCfg,
    pub ticker: TickerCfg,
    pub server: ServerCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file. Relative `catalog.path` values are
/// rebased onto the directory holding the config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let mut cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    if let (Some(p), Some(dir)) = (cfg.catalog.path.as_ref(), path.parent())
        && p.is_relative()
    {
        cfg.catalog.path = Some(dir.join(p));
    }
    cfg.validate()?;
    Ok(cfg)
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Resolver
        let r = &self.resolver;
        if !(r.default_onset_min.is_finite() && r.default_onset_min > 0.0) {
            eyre::bail!("resolver.default_onset_min must be > 0");
        }
        if !(r.default_duration_min.is_finite() && r.default_duration_min > 0.0) {
            eyre::bail!("resolver.default_duration_min must be > 0");
        }
        if r.default_onset_min > r.default_duration_min {
            eyre::bail!("resolver.default_onset_min must be <= resolver.default_duration_min");
        }

        // Phase
        if !(self.phase.afterglow_factor.is_finite() && self.phase.afterglow_factor >= 1.0) {
            eyre::bail!("phase.afterglow_factor must be >= 1.0");
        }

        // Tolerance
        let t = &self.tolerance;
        if !(t.reset_days.is_finite() && t.reset_days > 0.0) {
            eyre::bail!("tolerance.reset_days must be > 0");
        }
        if !(t.coefficient.is_finite() && t.coefficient > 0.0) {
            eyre::bail!("tolerance.coefficient must be > 0");
        }
        if !(t.exponent.is_finite() && t.exponent < 0.0) {
            eyre::bail!("tolerance.exponent must be < 0");
        }

        // Ticker
        if self.ticker.interval_ms == 0 {
            eyre::bail!("ticker.interval_ms must be >= 1");
        }
        if self.ticker.interval_ms > 60 * 60 * 1000 {
            eyre::bail!("ticker.interval_ms is unreasonably large (>1h)");
        }

        // Server
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            eyre::bail!(
                "server.bind must be a socket address like 127.0.0.1:5000, got {:?}",
                self.server.bind
            );
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of {}", ROTATIONS.join("|"));
        }

        Ok(())
    }
}
