use serde_derive::Serialize;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub enum InferenceError {
	#[error("inference service unavailable at {url}: {reason}")]
	Unavailable { url: String, reason: String },
	#[error("bad response from inference service: {0}")]
	Response(String),
}

impl InferenceError {
	fn response<M: Into<String>>(msg: M) -> Self {
		InferenceError::Response(msg.into())
	}
}

/// The full result of one non-streaming generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
	pub text: String,
	pub prompt_tokens: u64,
	pub generated_tokens: u64,
}

/// Anything that can turn a finished prompt into a [`Generation`].
pub trait Generate {
	async fn generate(&self, prompt: &str, seed: Option<u64>) -> Result<Generation, InferenceError>;
}

#[derive(Serialize, Debug)]
struct GenerateOptions {
	seed: u64,
}

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
	model: &'a str,
	prompt: &'a str,
	stream: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	options: Option<GenerateOptions>,
}

pub struct OllamaClient {
	post_url: Url,
	model: String,
	http: reqwest::Client,
}

impl OllamaClient {
	pub fn new(base_url: &Url, model: &str) -> Result<Self, url::ParseError> {
		let mut base = base_url.clone();
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}
		Ok(OllamaClient {
			post_url: base.join("api/generate")?,
			model: model.to_string(),
			http: reqwest::Client::new(),
		})
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	fn unavailable(&self, err: reqwest::Error) -> InferenceError {
		InferenceError::Unavailable { url: self.post_url.to_string(), reason: err.to_string() }
	}

	/// Pull the generated text and the two token counters out of a
	/// `/api/generate` response body.
	pub fn parse_response(response: &str) -> Result<Generation, InferenceError> {
		let json: serde_json::Value = serde_json::from_str(response)
			.map_err(|e| InferenceError::response(format!("not JSON: {}", e)))?;
		if let Some(error) = json.get("error").and_then(|e| e.as_str()) {
			return Err(InferenceError::response(error));
		}
		let text = json
			.get("response").ok_or(InferenceError::response("No response in the return object"))?
			.as_str().ok_or(InferenceError::response("response is not a string"))?;
		let prompt_tokens = json
			.get("prompt_eval_count").ok_or(InferenceError::response("No prompt_eval_count in the return object"))?
			.as_u64().ok_or(InferenceError::response("prompt_eval_count is not a count"))?;
		let generated_tokens = json
			.get("eval_count").ok_or(InferenceError::response("No eval_count in the return object"))?
			.as_u64().ok_or(InferenceError::response("eval_count is not a count"))?;
		Ok(Generation {
			text: text.to_string(),
			prompt_tokens,
			generated_tokens,
		})
	}
}

/// The `error` string an Ollama error body carries, if there is one.
fn service_error(body: &str) -> Option<String> {
	let json: serde_json::Value = serde_json::from_str(body).ok()?;
	json.get("error")?.as_str().map(|e| e.to_string())
}

impl Generate for OllamaClient {
	async fn generate(&self, prompt: &str, seed: Option<u64>) -> Result<Generation, InferenceError> {
		let request = GenerateRequest {
			model: &self.model,
			prompt,
			stream: false,
			options: seed.map(|seed| GenerateOptions { seed }),
		};
		let serialised = serde_json::to_string(&request)
			.map_err(|e| InferenceError::response(e.to_string()))?;
		tracing::debug!(url = %self.post_url, model = %self.model, seed = ?seed, "sending generate request");
		let resp = self.http
			.post(self.post_url.clone())
			.header(CONTENT_TYPE, "application/json")
			.body(serialised)
			.send()
			.await
			.map_err(|e| self.unavailable(e))?;
		let status = resp.status();
		let body = resp.text().await.map_err(|e| self.unavailable(e))?;
		if !status.is_success() {
			let detail = service_error(&body).unwrap_or(body);
			return Err(InferenceError::response(format!("HTTP {}: {}", status, detail)));
		}
		let generation = Self::parse_response(&body)?;
		tracing::debug!(prompt_tokens = generation.prompt_tokens, generated_tokens = generation.generated_tokens, "generation complete");
		Ok(generation)
	}
}
