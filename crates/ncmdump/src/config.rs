//! CLI-owned configuration: defaults, TOML file, environment and flags,
//! translated into a `PipelineConfig`.
//!
//! Core never sees these types -- it receives a pre-built `PipelineConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use ncmdump_core::{
    ColumnLayout, DEFAULT_PAGE_SIZE, DEFAULT_USER_AGENT, ExtractionMode, PipelineConfig,
    TransportConfig, console_url,
};

use crate::cli::Cli;
use crate::error::CliError;

/// Prefix of the environment variables read into [`Settings`].
const ENV_PREFIX: &str = "NCMDUMP_";

/// String settings whose environment values are taken verbatim. The generic
/// env provider would type `NCMDUMP_PASSWORD=0123` as the integer 123.
const TEXT_KEYS: [&str; 4] = ["address", "username", "password", "user_agent"];

// ── Settings ─────────────────────────────────────────────────────────

/// Fully layered settings for one run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub tls: bool,
    pub username: String,
    /// Plaintext in the file or environment; wrapped in a secret on resolve.
    pub password: Option<String>,
    pub method: ExtractionMode,
    pub export: bool,
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub timeout_secs: Option<u64>,
    pub page_size: u32,
    /// Inventory row indices, for consoles with a non-standard column set.
    pub columns: ColumnLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: None,
            port: None,
            tls: false,
            username: "guest".into(),
            password: None,
            method: ExtractionMode::default(),
            export: false,
            output_dir: PathBuf::from("."),
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: None,
            page_size: DEFAULT_PAGE_SIZE,
            columns: ColumnLayout::default(),
        }
    }
}

/// Values given on the command line. Only flags that were actually passed
/// are serialized, so they override without masking lower layers.
#[derive(Debug, Default, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<ExtractionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            address: cli.address.clone(),
            port: cli.port,
            tls: cli.tls.then_some(true),
            username: cli.username.clone(),
            password: cli.password.clone(),
            method: cli.method.map(ExtractionMode::from),
            export: cli.export.then_some(true),
            output_dir: cli.output_dir.clone(),
            user_agent: cli.user_agent.clone(),
            timeout_secs: cli.timeout,
            page_size: cli.page_size,
        }
    }
}

// ── Config file path ─────────────────────────────────────────────────

/// Platform config file location, e.g. `~/.config/ncmdump/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ncmdump").map(|dirs| dirs.config_dir().join("config.toml"))
}

// ── Loading ──────────────────────────────────────────────────────────

/// Layer defaults, the config file, `NCMDUMP_*` and the command line.
///
/// An explicit `--config` must exist; the platform default may be absent.
pub fn load(cli: &Cli) -> Result<Settings, CliError> {
    let file = match &cli.config {
        Some(path) if !path.is_file() => {
            return Err(CliError::NoConfig {
                path: path.display().to_string(),
            });
        }
        Some(path) => Some(path.clone()),
        None => config_path(),
    };
    let settings = figment(file.as_deref(), &Overrides::from(cli)).extract()?;
    Ok(settings)
}

fn figment(file: Option<&Path>, overrides: &Overrides) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    if let Some(path) = file {
        figment = figment.merge(Toml::file(path));
    }
    let mut ignored = vec!["config"];
    ignored.extend(TEXT_KEYS);
    figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&ignored))
        .merge(Serialized::defaults(text_env()))
        .merge(Serialized::defaults(overrides))
}

/// `NCMDUMP_*` values for [`TEXT_KEYS`], as plain strings.
fn text_env() -> BTreeMap<&'static str, String> {
    TEXT_KEYS
        .into_iter()
        .filter_map(|key| {
            let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            std::env::var(var).ok().map(|value| (key, value))
        })
        .collect()
}

// ── Resolution ───────────────────────────────────────────────────────

impl Settings {
    /// Build the pipeline configuration.
    ///
    /// This is the single boundary where CLI config types cross into core
    /// types.
    pub fn pipeline_config(&self, password: SecretString) -> Result<PipelineConfig, CliError> {
        let address = self
            .address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| CliError::NoAddress {
                path: config_path()
                    .map_or_else(|| "config.toml".into(), |p| p.display().to_string()),
            })?;

        let base_url =
            console_url(address, self.port, self.tls).map_err(|e| CliError::Validation {
                field: "address".into(),
                reason: e.to_string(),
            })?;

        if self.page_size == 0 {
            return Err(CliError::Validation {
                field: "page_size".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(PipelineConfig {
            base_url,
            username: self.username.clone(),
            password,
            transport: TransportConfig {
                user_agent: self.user_agent.clone(),
                timeout: self.timeout_secs.map(Duration::from_secs),
            },
            mode: self.method,
            layout: self.columns,
            page_size: self.page_size,
        })
    }

    /// Password from the layered settings; empty when none was given.
    pub fn password(&self) -> SecretString {
        SecretString::from(self.password.clone().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;

    /// Layered settings for `args`. Runs inside a jail so env changes made
    /// by other tests never leak in.
    fn settings(file: Option<&Path>, args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(std::iter::once("ncmdump").chain(args.iter().copied()))
            .unwrap();
        let mut settings = None;
        figment::Jail::expect_with(|_| {
            settings = Some(figment(file, &Overrides::from(&cli)).extract()?);
            Ok(())
        });
        settings.unwrap()
    }

    #[test]
    fn defaults_match_the_classic_tool() {
        let s = settings(None, &[]);
        assert_eq!(s.username, "guest");
        assert_eq!(s.user_agent, "NCM Dump");
        assert_eq!(s.page_size, 1000);
        assert_eq!(s.method, ExtractionMode::Edit);
        assert_eq!(s.output_dir, PathBuf::from("."));
        assert!(!s.tls && !s.export);
        assert!(s.timeout_secs.is_none());
    }

    #[test]
    fn file_values_apply_and_flags_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
address = "orion.lab"
port = 8443
tls = true
username = "backup"
method = "export"

[columns]
vendor = 19
"#,
        )
        .unwrap();

        let s = settings(Some(&path), &["-u", "admin"]);
        assert_eq!(s.address.as_deref(), Some("orion.lab"));
        assert_eq!(s.port, Some(8443));
        assert!(s.tls);
        assert_eq!(s.username, "admin");
        assert_eq!(s.method, ExtractionMode::Export);
        assert_eq!(s.columns.vendor, 19);
        assert_eq!(s.columns.name, ColumnLayout::ORION.name);
    }

    #[test]
    fn unset_boolean_flags_do_not_mask_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "export = true\n").unwrap();

        assert!(settings(Some(&path), &[]).export);
    }

    #[test]
    fn numeric_env_strings_stay_verbatim() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NCMDUMP_PASSWORD", "0123");
            jail.set_env("NCMDUMP_USERNAME", "1001");
            jail.set_env("NCMDUMP_ADDRESS", "10");
            jail.set_env("NCMDUMP_PORT", "8443");

            let s: Settings = figment(None, &Overrides::default()).extract()?;
            assert_eq!(s.password.as_deref(), Some("0123"));
            assert_eq!(s.username, "1001");
            assert_eq!(s.address.as_deref(), Some("10"));
            assert_eq!(s.port, Some(8443));
            Ok(())
        });
    }

    #[test]
    fn flags_still_beat_text_env_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NCMDUMP_USERNAME", "1001");
            let cli = Cli::try_parse_from(["ncmdump", "-u", "admin"]).unwrap();

            let s: Settings = figment(None, &Overrides::from(&cli)).extract()?;
            assert_eq!(s.username, "admin");
            Ok(())
        });
    }

    #[test]
    fn pipeline_config_builds_the_console_url() {
        let s = settings(None, &["-i", "10.0.0.5", "--port", "8787", "--tls", "--timeout", "20"]);
        let config = s.pipeline_config(s.password()).unwrap();
        assert_eq!(config.base_url.as_str(), "https://10.0.0.5:8787/");
        assert_eq!(config.transport.timeout, Some(Duration::from_secs(20)));
        assert_eq!(config.password.expose_secret(), "");
    }

    #[test]
    fn missing_address_is_a_usage_error() {
        let s = settings(None, &[]);
        let err = s.pipeline_config(s.password()).unwrap_err();
        assert!(matches!(err, CliError::NoAddress { .. }));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let s = settings(None, &["-i", "10.0.0.5", "--page-size", "0"]);
        let err = s.pipeline_config(s.password()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
