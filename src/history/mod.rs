use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use serde_derive::Serialize;

use crate::diff::{self, Marker};
use crate::helpers::{self, HelperError};
use crate::ollama::Generation;

/// One record per request, written as JSON and never read back.
#[derive(Serialize, Debug)]
pub struct RequestLog {
	pub datetime: String,
	pub prompt_label: String,
	pub input: String,
	pub output: String,
	pub highlighted_diff: String,
	pub time_taken: f64,
	pub input_tokens: u64,
	pub generated_tokens: u64,
	#[serde(skip)]
	logged_at: DateTime<Local>,
}

impl RequestLog {
	pub fn new(logged_at: DateTime<Local>, label: &str, input: &str, generation: &Generation, time_taken: f64) -> Self {
		RequestLog {
			datetime: logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
			prompt_label: label.to_string(),
			input: input.to_string(),
			output: generation.text.clone(),
			highlighted_diff: diff::highlight(input, &generation.text, Marker::Plain),
			time_taken,
			input_tokens: generation.prompt_tokens,
			generated_tokens: generation.generated_tokens,
			logged_at,
		}
	}

	pub fn file_name(&self) -> String {
		format!("request_{}_{}.json", self.prompt_label, self.logged_at.format("%Y%m%d_%H%M%S"))
	}

	/// Write the record into `log_dir`, creating it if needed, and return the file path.
	pub fn write(&self, log_dir: &Path) -> Result<PathBuf, HelperError> {
		let path = log_dir.join(self.file_name());
		helpers::save_to_json(&path, self)?;
		Ok(path)
	}
}
