use clap::Parser;
use clap::error::ErrorKind;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod diff;
mod edit;
mod helpers;
mod history;
mod ollama;
mod template;

#[cfg(test)]
mod test;

use config::Config;
use ollama::OllamaClient;

const TRACE_ENV: &str = "INLINE_EDIT_TRACE";

/// Rewrite the text on stdin with a local language model, using a named
/// prompt template.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
	/// Template to apply, loaded from `<prompts_dir>/<TEMPLATE_LABEL>.prompt`
	template_label: String,
}

/// Exit status for a command line clap refused; help and version are not failures.
fn usage_exit_code(err: &clap::Error) -> u8 {
	match err.kind() {
		ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
		_ => 1,
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_env(TRACE_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.compact()
		.init();
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::load()?;
	tracing::debug!(?config, "configuration resolved");

	let input: String = helpers::read_stdin()?;
	let client = OllamaClient::new(&config.base_url, &config.model)?;
	tracing::debug!(model = client.model(), bytes = input.len(), "input read");

	let stdout = io::stdout();
	let mut out = stdout.lock();
	edit::run(&config, &client, &args.template_label, &input, &mut out).await?;
	Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	init_tracing();

	let args = match Cli::try_parse() {
		Ok(args) => args,
		Err(err) => {
			let _ = err.print();
			return ExitCode::from(usage_exit_code(&err));
		},
	};

	match run(args).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("inline-edit: {}", err);
			ExitCode::FAILURE
		},
	}
}
