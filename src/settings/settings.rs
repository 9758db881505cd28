use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    pub log: Log,
    pub session: Session,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// Overridden by the JWT_SECRET environment variable when set. An empty
    /// effective key aborts startup.
    pub signing_key: String,
    /// Go-style duration strings, e.g. "900s", "15m", "720h".
    pub access_ttl: String,
    pub refresh_ttl: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub backend: String, // "fake" or "redis"
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "fake" or "real"
    pub dsn: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

/// Parses an integer duration with an `s`, `m` or `h` suffix.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let (value, per_unit) = if let Some(v) = s.strip_suffix('s') {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60)
    } else if let Some(v) = s.strip_suffix('h') {
        (v, 3600)
    } else {
        return Err(anyhow!("invalid duration unit in {:?}", s));
    };
    let value: u64 = value
        .parse()
        .map_err(|_| anyhow!("invalid duration: {:?}", s))?;
    Ok(Duration::from_secs(value * per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_durations() {
        assert_eq!(parse_duration("900s").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("720h").unwrap(), Duration::from_secs(720 * 3600));
    }

    #[test]
    fn rejects_malformed_durations() {
        for bad in ["", "900", "h", "-5s", "1.5h", "10d"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should not parse");
        }
    }
}
