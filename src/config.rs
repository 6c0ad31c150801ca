use std::env;
use std::fs;
use std::path::PathBuf;

use harvest::{DEFAULT_BASE_URL, Error, Result};
use reqwest::Url;
use serde::Deserialize;

pub const TOKEN_ENV: &str = "HARVEST_ACCESS_TOKEN";
pub const ACCOUNT_ENV: &str = "HARVEST_ACCOUNT_ID";
pub const BASE_URL_ENV: &str = "HARVEST_BASE_URL";

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub access_token: String,
    pub account_id: String,
    pub base_url: Url,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    access_token: Option<String>,
    account_id: Option<String>,
    base_url: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<Settings> {
    let file = read_config().unwrap_or_default();
    resolve(overrides, |key| env::var(key).ok(), file)
}

fn resolve(
    overrides: Overrides,
    env: impl Fn(&str) -> Option<String>,
    file: ConfigFile,
) -> Result<Settings> {
    let pick = |flag: Option<String>, key: &str, stored: Option<String>| {
        flag.or_else(|| env(key))
            .or(stored)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let access_token = pick(overrides.access_token, TOKEN_ENV, file.access_token)
        .ok_or_else(|| missing("access token", TOKEN_ENV))?;
    let account_id = pick(overrides.account_id, ACCOUNT_ENV, file.account_id)
        .ok_or_else(|| missing("account id", ACCOUNT_ENV))?;
    let raw_url = pick(overrides.base_url, BASE_URL_ENV, file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&raw_url)
        .map_err(|err| Error::Config(format!("invalid base URL {raw_url:?}: {err}")))?;

    Ok(Settings {
        access_token,
        account_id,
        base_url,
    })
}

fn missing(what: &str, key: &str) -> Error {
    Error::Config(format!(
        "no {what} configured; pass it as a flag, set {key}, or add it to ~/.harvest.json"
    ))
}

fn config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".harvest.json");
    Some(path)
}

fn read_config() -> Option<ConfigFile> {
    let path = config_path()?;
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn flags_beat_env_and_file() {
        let settings = resolve(
            Overrides {
                access_token: Some("flag-token".to_string()),
                ..Default::default()
            },
            |key| (key == TOKEN_ENV || key == ACCOUNT_ENV).then(|| format!("env-{key}")),
            ConfigFile {
                access_token: Some("file-token".to_string()),
                account_id: Some("file-account".to_string()),
                base_url: None,
            },
        )
        .unwrap();
        assert_eq!(settings.access_token, "flag-token");
        assert_eq!(settings.account_id, format!("env-{ACCOUNT_ENV}"));
        assert_eq!(settings.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn file_fills_the_gaps() {
        let settings = resolve(
            Overrides::default(),
            no_env,
            ConfigFile {
                access_token: Some(" file-token\n".to_string()),
                account_id: Some("42".to_string()),
                base_url: Some("http://localhost:8080/v2/".to_string()),
            },
        )
        .unwrap();
        assert_eq!(settings.access_token, "file-token");
        assert_eq!(settings.account_id, "42");
        assert_eq!(settings.base_url.as_str(), "http://localhost:8080/v2/");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = resolve(Overrides::default(), no_env, ConfigFile::default()).unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.contains(TOKEN_ENV)));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = resolve(
            Overrides {
                access_token: Some("token".to_string()),
                account_id: Some("   ".to_string()),
                ..Default::default()
            },
            no_env,
            ConfigFile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.contains(ACCOUNT_ENV)));
    }
}
