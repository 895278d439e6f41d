use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::helpers;

pub const PLACEHOLDER: &str = "{input}";
pub const TEMPLATE_EXTENSION: &str = "prompt";

#[derive(Debug, Error)]
pub enum TemplateError {
	#[error("no template named '{label}' in {}{}", .dir.display(), available_hint(.available))]
	NotFound {
		label: String,
		dir: PathBuf,
		available: Vec<String>,
	},
	#[error("template {} is not valid UTF-8 text", .path.display())]
	Format {
		path: PathBuf,
		#[source]
		source: std::string::FromUtf8Error,
	},
	#[error("cannot read template {}: {}", .path.display(), .source)]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

fn available_hint(available: &[String]) -> String {
	if available.is_empty() {
		String::new()
	} else {
		format!(" (available: {})", available.join(", "))
	}
}

/// A template file loaded from disk, holding at most one `{input}` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
	content: String,
}

impl Template {
	pub fn new(content: String) -> Self {
		Template { content }
	}

	/// Replace the first placeholder with `input`. The inserted text is never
	/// scanned again, so an `{input}` inside `input` stays literal.
	pub fn fill(&self, input: &str) -> String {
		let mut prompt = self.content.clone();
		if let Some(pos) = prompt.find(PLACEHOLDER) {
			prompt.replace_range(pos..pos + PLACEHOLDER.len(), input);
		}
		prompt
	}
}

pub struct TemplateLoader {
	dir: PathBuf,
}

impl TemplateLoader {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		TemplateLoader { dir: dir.into() }
	}

	fn not_found(&self, label: &str) -> TemplateError {
		TemplateError::NotFound {
			label: label.to_string(),
			dir: self.dir.clone(),
			available: self.labels().unwrap_or_default(),
		}
	}

	pub fn load(&self, label: &str) -> Result<Template, TemplateError> {
		if !is_plain_label(label) {
			return Err(self.not_found(label));
		}
		let path = self.dir.join(format!("{}.{}", label, TEMPLATE_EXTENSION));
		tracing::debug!(path = %path.display(), "loading template");
		let bytes = match fs::read(&path) {
			Ok(bytes) => bytes,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(self.not_found(label)),
			Err(err) => return Err(TemplateError::Io { path, source: err }),
		};
		let content = String::from_utf8(bytes).map_err(|source| TemplateError::Format { path: path.clone(), source })?;
		Ok(Template::new(content))
	}

	/// Load the template called `label` and substitute `input` into it.
	pub fn prepare(&self, label: &str, input: &str) -> Result<String, TemplateError> {
		Ok(self.load(label)?.fill(input))
	}

	/// Labels of every `.prompt` file in the templates directory, sorted.
	pub fn labels(&self) -> Result<Vec<String>, io::Error> {
		let mut labels = Vec::new();
		for entry in fs::read_dir(&self.dir)? {
			let path = entry?.path();
			if path.is_file() && helpers::has_specific_extension(&path, TEMPLATE_EXTENSION) {
				if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
					labels.push(stem.to_string());
				}
			}
		}
		labels.sort();
		Ok(labels)
	}
}

fn is_plain_label(label: &str) -> bool {
	!label.is_empty() && label != "." && label != ".." && !label.contains(['/', '\\'])
}
