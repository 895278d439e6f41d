use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use chrono::Local;
use thiserror::Error;

use crate::config::Config;
use crate::history::RequestLog;
use crate::ollama::{Generate, Generation, InferenceError};
use crate::template::{TemplateError, TemplateLoader};

#[derive(Debug, Error)]
pub enum EditError {
	#[error(transparent)]
	Template(#[from] TemplateError),
	#[error(transparent)]
	Inference(#[from] InferenceError),
	#[error("cannot write output: {0}")]
	Output(#[from] io::Error),
}

#[derive(Debug)]
pub struct Outcome {
	pub generation: Generation,
	/// Where the request log went, if logging was on and the write worked.
	pub log_path: Option<PathBuf>,
}

/// Run one edit: fill the template, ask the model, print the answer to `out`
/// and, when enabled, log the request. A failed log write is reported but
/// does not fail the run.
pub async fn run<C, W>(config: &Config, client: &C, label: &str, input: &str, out: &mut W) -> Result<Outcome, EditError>
where
	C: Generate,
	W: Write,
{
	let input = input.trim();
	let started = Instant::now();

	let prompt = TemplateLoader::new(&config.prompts_dir).prepare(label, input)?;
	tracing::debug!(label, prompt_len = prompt.len(), "prompt prepared");

	let generation = client.generate(&prompt, config.seed).await?;
	let elapsed = started.elapsed().as_secs_f64();

	writeln!(out, "{}", generation.text.trim())?;
	out.flush()?;

	let log_path = if config.logging {
		let record = RequestLog::new(Local::now(), label, input, &generation, elapsed);
		match record.write(&config.log_dir) {
			Ok(path) => {
				tracing::debug!(path = %path.display(), "request logged");
				Some(path)
			},
			Err(err) => {
				tracing::warn!(dir = %config.log_dir.display(), error = %err, "could not write request log");
				None
			},
		}
	} else {
		None
	};

	Ok(Outcome { generation, log_path })
}
