use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://dgucoop.dongguk.edu/mobile/menu.html";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_MINUTES: i64 = 360;
const DEFAULT_DEBUG_DIR: &str = "debug_output";
const DISABLED: &str = ":none:";
const STDOUT: &str = ":stdout:";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub fetch_timeout: Duration,
    pub refresh_interval: chrono::Duration,
    /// `None` turns the debug dump off.
    pub debug_dir: Option<PathBuf>,
    /// `None` prints snapshots to stdout.
    pub output: Option<PathBuf>,
    pub target_date: Option<NaiveDate>,
    pub run_once: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub ocr_image_url: Option<Url>,
    /// The all-restaurant weekly page; `None` skips it.
    pub weekly_url: Option<Url>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = parse_url(
            "DGUCOOP_BASE_URL",
            var("DGUCOOP_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;

        let timeout_secs: u64 = parse_number("FETCH_TIMEOUT_SECS", var("FETCH_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("FETCH_TIMEOUT_SECS must be positive".to_string()));
        }

        let refresh_minutes: i64 =
            parse_number("REFRESH_INTERVAL_MINUTES", var("REFRESH_INTERVAL_MINUTES"))?
                .unwrap_or(DEFAULT_REFRESH_MINUTES);
        let refresh_interval = chrono::Duration::try_minutes(refresh_minutes)
            .filter(|interval| *interval > chrono::Duration::zero())
            .ok_or_else(|| {
                Error::Config(format!(
                    "REFRESH_INTERVAL_MINUTES must be a positive number of minutes, got {refresh_minutes}"
                ))
            })?;

        let debug_dir = match var("DEBUG_DIR").as_deref() {
            Some(DISABLED) => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from(DEFAULT_DEBUG_DIR)),
        };

        let output = match var("OUTPUT").as_deref() {
            None | Some(STDOUT) => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        let target_date = var("TARGET_DATE")
            .map(|date| {
                NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                    .map_err(|e| Error::Config(format!("TARGET_DATE {date:?}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            base_url,
            fetch_timeout: Duration::from_secs(timeout_secs),
            refresh_interval,
            debug_dir,
            output,
            target_date,
            run_once: var("RUN_ONCE").is_some(),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            ocr_image_url: var("OCR_IMAGE_URL")
                .map(|url| parse_url("OCR_IMAGE_URL", &url))
                .transpose()?,
            weekly_url: var("WEEKLY_URL")
                .map(|url| parse_url("WEEKLY_URL", &url))
                .transpose()?,
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|e| Error::Config(format!("{key} {value:?}: {e}")))
}

fn parse_number<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{key} {value:?}: {e}")))
        })
        .transpose()
}
