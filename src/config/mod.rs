use std::env;
use std::path::PathBuf;
use serde_derive::Deserialize;
use thiserror::Error;
use url::Url;

use crate::helpers::{self, HelperError};
use crate::ollama;

pub const APP_NAME: &str = "inline-edit";
const CONFIG_NAME: &str = "config";
const LOG_SUBDIR: &str = "logs/inline_edit";

pub const ENV_PROMPTS_DIR: &str = "INLINE_EDIT_PROMPTS_DIR";
pub const ENV_HOST: &str = "OLLAMA_HOST";
pub const ENV_MODEL: &str = "INLINE_EDIT_MODEL";
pub const ENV_SEED: &str = "INLINE_EDIT_SEED";
pub const ENV_LOGGING: &str = "INLINE_EDIT_LOGGING";
pub const ENV_LOG_DIR: &str = "INLINE_EDIT_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot load config file: {0}")]
	File(#[source] HelperError),
	#[error("invalid value '{value}' for {key}: {reason}")]
	InvalidValue { key: String, value: String, reason: String },
	#[error("request logging is enabled but no log directory could be determined (set INLINE_EDIT_LOG_DIR or HOME)")]
	NoLogDir,
}

fn invalid(key: &str, value: &str, reason: impl ToString) -> ConfigError {
	ConfigError::InvalidValue { key: key.to_string(), value: value.to_string(), reason: reason.to_string() }
}

/// Contents of `config.json` in the user's config directory; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigFile {
	pub prompts_dir: Option<PathBuf>,
	pub host: Option<String>,
	pub model: Option<String>,
	pub seed: Option<u64>,
	pub logging: Option<bool>,
	pub log_dir: Option<PathBuf>,
}

/// Directory defaults that depend on the process environment.
#[derive(Debug, Clone)]
pub struct Defaults {
	pub prompts_dir: PathBuf,
	pub log_dir: Option<PathBuf>,
}

impl Defaults {
	/// `prompts/` beside the executable and `~/.inline-edit/logs/inline_edit`.
	pub fn from_install() -> Self {
		let prompts_dir = env::current_exe()
			.ok()
			.and_then(|exe| exe.parent().map(|dir| dir.join("prompts")))
			.unwrap_or_else(|| PathBuf::from("prompts"));
		let log_dir = helpers::home_dir()
			.ok()
			.map(|home| home.join(format!(".{}", APP_NAME)).join(LOG_SUBDIR));
		Defaults { prompts_dir, log_dir }
	}
}

/// Everything one run needs to know, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
	pub prompts_dir: PathBuf,
	pub base_url: Url,
	pub model: String,
	pub seed: Option<u64>,
	pub logging: bool,
	pub log_dir: PathBuf,
}

impl Config {
	/// Defaults, then the config file, then the environment.
	pub fn load() -> Result<Config, ConfigError> {
		let file = match helpers::config_load::<ConfigFile>(APP_NAME, CONFIG_NAME) {
			Ok(file) => file,
			Err(err) if err.is_not_found() => ConfigFile::default(),
			Err(HelperError::Io(err)) if helpers::home_dir().is_err() => {
				tracing::debug!(error = %err, "no config directory, using defaults");
				ConfigFile::default()
			},
			Err(err) => return Err(ConfigError::File(err)),
		};
		Config::resolve(file, |key| env::var(key).ok(), Defaults::from_install())
	}

	pub fn resolve<F>(file: ConfigFile, env: F, defaults: Defaults) -> Result<Config, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let prompts_dir = env(ENV_PROMPTS_DIR)
			.map(PathBuf::from)
			.or(file.prompts_dir)
			.unwrap_or(defaults.prompts_dir);

		let host = env(ENV_HOST)
			.or(file.host)
			.unwrap_or_else(|| ollama::DEFAULT_HOST.to_string());
		let base_url = parse_host(&host)?;

		let model = env(ENV_MODEL)
			.or(file.model)
			.unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string());

		let seed = match env(ENV_SEED) {
			Some(value) => Some(value.trim().parse::<u64>().map_err(|e| invalid(ENV_SEED, &value, e))?),
			None => file.seed,
		};

		let logging = match env(ENV_LOGGING) {
			Some(value) => parse_flag(ENV_LOGGING, &value)?,
			None => file.logging.unwrap_or(false),
		};

		let log_dir = env(ENV_LOG_DIR)
			.map(PathBuf::from)
			.or(file.log_dir)
			.or(defaults.log_dir);
		let log_dir = match log_dir {
			Some(dir) => dir,
			None if logging => return Err(ConfigError::NoLogDir),
			None => PathBuf::new(),
		};

		Ok(Config { prompts_dir, base_url, model, seed, logging, log_dir })
	}
}

/// Accepts `host:port` as well as a full URL, the way `OLLAMA_HOST` is usually set.
fn parse_host(host: &str) -> Result<Url, ConfigError> {
	let host = host.trim();
	let with_scheme = if host.contains("://") {
		host.to_string()
	} else {
		format!("http://{}", host)
	};
	let url = Url::parse(&with_scheme).map_err(|e| invalid(ENV_HOST, host, e))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid(ENV_HOST, host, "scheme must be http or https"));
	}
	Ok(url)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"" | "0" | "false" | "no" | "off" => Ok(false),
		_ => Err(invalid(key, value, "expected true or false")),
	}
}
