use super::*;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use url::Url;

use edit::EditError;
use ollama::{Generate, Generation, InferenceError};
use template::TemplateError;

struct StubClient {
	reply: Result<Generation, String>,
	prompts: RefCell<Vec<(String, Option<u64>)>>,
}

impl StubClient {
	fn replying(text: &str, prompt_tokens: u64, generated_tokens: u64) -> Self {
		StubClient {
			reply: Ok(Generation { text: text.to_string(), prompt_tokens, generated_tokens }),
			prompts: RefCell::new(Vec::new()),
		}
	}

	fn unreachable() -> Self {
		StubClient { reply: Err("connection refused".to_string()), prompts: RefCell::new(Vec::new()) }
	}
}

impl Generate for StubClient {
	async fn generate(&self, prompt: &str, seed: Option<u64>) -> Result<Generation, InferenceError> {
		self.prompts.borrow_mut().push((prompt.to_string(), seed));
		match &self.reply {
			Ok(generation) => Ok(generation.clone()),
			Err(reason) => Err(InferenceError::Unavailable { url: "http://localhost:11434/api/generate".to_string(), reason: reason.clone() }),
		}
	}
}

fn workspace() -> tempfile::TempDir {
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir(dir.path().join("prompts")).unwrap();
	fs::write(dir.path().join("prompts").join("proofread.prompt"), "Fix grammar: {input}").unwrap();
	dir
}

fn config_in(dir: &Path, logging: bool) -> Config {
	Config {
		prompts_dir: dir.join("prompts"),
		base_url: Url::parse(ollama::DEFAULT_HOST).unwrap(),
		model: ollama::DEFAULT_MODEL.to_string(),
		seed: None,
		logging,
		log_dir: dir.join("logs").join("inline_edit"),
	}
}

#[tokio::test]
async fn proofread_prints_generated_text() {
	let dir = workspace();
	let config = config_in(dir.path(), false);
	let client = StubClient::replying("Hello world", 5, 2);
	let mut out = Vec::new();

	let outcome = edit::run(&config, &client, "proofread", "  helo wurld\n", &mut out).await.unwrap();

	assert_eq!(String::from_utf8(out).unwrap(), "Hello world\n");
	assert_eq!(*client.prompts.borrow(), vec![("Fix grammar: helo wurld".to_string(), None)]);
	assert_eq!(outcome.generation.prompt_tokens, 5);
	assert_eq!(outcome.generation.generated_tokens, 2);
	assert!(outcome.log_path.is_none());
	assert!(!dir.path().join("logs").exists());
}

#[tokio::test]
async fn generated_text_is_trimmed_and_seed_forwarded() {
	let dir = workspace();
	let mut config = config_in(dir.path(), false);
	config.seed = Some(1234);
	let client = StubClient::replying("\n  Hello world  \n\n", 5, 2);
	let mut out = Vec::new();

	edit::run(&config, &client, "proofread", "helo wurld", &mut out).await.unwrap();

	assert_eq!(String::from_utf8(out).unwrap(), "Hello world\n");
	assert_eq!(client.prompts.borrow()[0].1, Some(1234));
}

#[tokio::test]
async fn logging_writes_one_record() {
	let dir = workspace();
	let config = config_in(dir.path(), true);
	let client = StubClient::replying("Hello world", 5, 2);
	let mut out = Vec::new();

	let outcome = edit::run(&config, &client, "proofread", "helo world", &mut out).await.unwrap();

	let path = outcome.log_path.expect("log written");
	assert_eq!(path.parent().unwrap(), config.log_dir.as_path());
	let name = path.file_name().unwrap().to_str().unwrap();
	assert!(name.starts_with("request_proofread_") && name.ends_with(".json"), "{}", name);
	assert_eq!(fs::read_dir(&config.log_dir).unwrap().count(), 1);

	let record: serde_json::Value = helpers::read_from_json(&path).unwrap();
	assert_eq!(record["prompt_label"], "proofread");
	assert_eq!(record["input"], "helo world");
	assert_eq!(record["output"], "Hello world");
	assert_eq!(record["highlighted_diff"], "<<Hello>> world ");
	assert_eq!(record["input_tokens"], 5);
	assert_eq!(record["generated_tokens"], 2);
	assert!(record["time_taken"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn failed_log_write_keeps_the_generation() {
	let dir = workspace();
	let mut config = config_in(dir.path(), true);
	let blocker = dir.path().join("not-a-dir");
	fs::write(&blocker, "").unwrap();
	config.log_dir = blocker.join("logs");
	let client = StubClient::replying("Hello world", 5, 2);
	let mut out = Vec::new();

	let outcome = edit::run(&config, &client, "proofread", "helo wurld", &mut out).await.unwrap();

	assert_eq!(String::from_utf8(out).unwrap(), "Hello world\n");
	assert!(outcome.log_path.is_none());
}

#[tokio::test]
async fn unknown_template_skips_generation() {
	let dir = workspace();
	let config = config_in(dir.path(), false);
	let client = StubClient::replying("unused", 0, 0);
	let mut out = Vec::new();

	let result = edit::run(&config, &client, "translate", "text", &mut out).await;

	assert!(matches!(result, Err(EditError::Template(TemplateError::NotFound { .. }))));
	assert!(client.prompts.borrow().is_empty());
	assert!(out.is_empty());
}

#[tokio::test]
async fn unreachable_service_prints_nothing() {
	let dir = workspace();
	let config = config_in(dir.path(), true);
	let client = StubClient::unreachable();
	let mut out = Vec::new();

	let result = edit::run(&config, &client, "proofread", "helo wurld", &mut out).await;

	assert!(matches!(result, Err(EditError::Inference(InferenceError::Unavailable { .. }))));
	assert!(out.is_empty());
	assert!(!config.log_dir.exists());
}

#[test]
fn missing_label_is_a_usage_error() {
	let err = Cli::try_parse_from(["inline-edit"]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
	assert_eq!(usage_exit_code(&err), 1);
}

#[test]
fn extra_arguments_are_rejected() {
	let err = Cli::try_parse_from(["inline-edit", "proofread", "extra"]).unwrap_err();
	assert_eq!(usage_exit_code(&err), 1);
}

#[test]
fn help_is_not_a_failure() {
	let err = Cli::try_parse_from(["inline-edit", "--help"]).unwrap_err();
	assert_eq!(usage_exit_code(&err), 0);
}

#[test]
fn single_label_parses() {
	let cli = Cli::try_parse_from(["inline-edit", "proofread"]).unwrap();
	assert_eq!(cli.template_label, "proofread");
}

#[test]
fn bounded_read_rejects_oversized_input() {
	let big = vec![b'a'; (1 << 20) + 1];
	let result: Result<String, _> = helpers::read_bounded(big.as_slice());
	assert!(matches!(result, Err(helpers::HelperError::FromString(_))));

	let exact = vec![b'a'; 1 << 20];
	let text: String = helpers::read_bounded(exact.as_slice()).unwrap();
	assert_eq!(text.len(), 1 << 20);
}

#[test]
fn bounded_read_requires_utf8() {
	let result: Result<String, _> = helpers::read_bounded(&[0xffu8, 0xfe][..]);
	assert!(matches!(result, Err(helpers::HelperError::FromUtf8Error(_))));
}
