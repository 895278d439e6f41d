use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::env;
use std::string;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelperError {
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
	#[error("Serde error: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("FromUtf8 error: {0}")]
	FromUtf8Error(#[from] string::FromUtf8Error),
	#[error("Other Error {0}")]
	FromString(String),
}

impl HelperError {
	pub fn msg<M: Into<String>>(msg: M) -> Self {
		HelperError::FromString(msg.into())
	}

	/// True when the underlying cause is a file that does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(self, HelperError::Io(err) if err.kind() == io::ErrorKind::NotFound)
	}
}

pub fn has_specific_extension<P: AsRef<Path>>(path: P, ext: &str) -> bool {
	match path.as_ref().extension() {
		Some(os_str) => os_str == ext,
		None => false,
	}
}

pub fn home_dir() -> Result<PathBuf, io::Error> {
	match env::var("HOME") {
		Ok(home) if !home.is_empty() => Ok(PathBuf::from(home)),
		_ => Err(io::Error::new(io::ErrorKind::Other, "HOME not found")),
	}
}

pub fn config_get_dir(app_name: &str) -> Result<PathBuf, io::Error> {
	let mut pb = match env::var("XDG_CONFIG_HOME") {
		Ok(config_home) if !config_home.is_empty() => PathBuf::from(config_home),
		_ => {
			let mut config_home = home_dir()
				.map_err(|_| io::Error::new(io::ErrorKind::Other, "XDG_CONFIG_HOME or HOME not found"))?;
			config_home.push(".config");
			config_home
		}
	};
	pb.push(app_name);
	Ok(pb)
}

pub fn config_load<T: DeserializeOwned>(app_name: &str, config_name: &str) -> Result<T, HelperError> {
	let mut config_file = config_get_dir(app_name)?;
	config_file.push(config_name.to_string() + ".json");
	read_from_json(&config_file)
}

pub fn read_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T, HelperError> {
	let mut file = File::open(file_path.as_ref())?;
	let mut content = String::new();
	file.read_to_string(&mut content)?;
	let parsed_json: T = serde_json::from_str(&content)?;
	Ok(parsed_json)
}

/// Serialise `object` as pretty JSON into `file_path`, creating the parent
/// directories first.
pub fn save_to_json<T: Serialize>(file_path: impl AsRef<Path>, object: &T) -> Result<(), HelperError> {
	let serialised = serde_json::to_string_pretty(&object)?;
	if let Some(parent) = file_path.as_ref().parent() {
		fs::create_dir_all(parent)?;
	}
	let mut file = OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.open(file_path.as_ref())?;
	writeln!(file, "{}", &serialised)?;
	Ok(())
}

const MAX_READ_BYTES: usize = 1 << 20;

pub trait FromInputBytes: Sized {
	fn from_bytes(bytes: Vec<u8>) -> Result<Self, HelperError>;
}

impl FromInputBytes for String {
	fn from_bytes(bytes: Vec<u8>) -> Result<Self, HelperError> {
		Ok(String::from_utf8(bytes)?)
	}
}

pub fn read_stdin<T>() -> Result<T, HelperError>
where
	T: FromInputBytes,
{
	read_bounded(io::stdin())
}

/// Read the whole of `reader`, refusing anything larger than `MAX_READ_BYTES`.
pub fn read_bounded<R, T>(mut reader: R) -> Result<T, HelperError>
where
	R: Read,
	T: FromInputBytes,
{
	let mut buffer = Vec::new();
	reader.by_ref().take(MAX_READ_BYTES as u64).read_to_end(&mut buffer)?;

	if buffer.len() == MAX_READ_BYTES {
		let mut extra = [0u8; 1];
		let extra_read = reader.read(&mut extra)?;

		if extra_read != 0 {
			return Err(HelperError::msg("Input too large"));
		}
	}

	T::from_bytes(buffer)
}
