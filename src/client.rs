use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Fixed sampling seed sent with every request.
const SEED: u64 = 420;

/// Sequence at which the endpoint stops generating.
const STOP: [&str; 1] = ["</s>"];

/// Boundary to the text-completion service. One call sends a system
/// instruction plus user content and returns the generated text, trimmed.
pub trait CompletionClient: Sync {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    seed: u64,
    stop: [&'a str; 1],
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Some OpenAI-compatible servers drop sampling fields whose value is exactly
/// zero, so zero is remapped to the smallest positive float.
fn no_omit(value: f32) -> f32 {
    if value == 0.0 { f32::MIN_POSITIVE } else { value }
}

fn build_request<'a>(system: &'a str, user: &'a str, max_tokens: u32) -> ChatRequest<'a> {
    ChatRequest {
        temperature: no_omit(0.0),
        top_p: no_omit(0.95),
        max_tokens,
        seed: SEED,
        stop: STOP,
        messages: [
            ChatMessage { role: "system", content: system },
            ChatMessage { role: "user", content: user },
        ],
    }
}

/// The first choice's message content, trimmed. An empty `choices` array is
/// an error, not a panic.
fn first_choice_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .context("completion response contained no choices")
}

/// Blocking client for an OpenAI-compatible `chat/completions` endpoint.
pub struct HttpCompletionClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    /// `endpoint` is the base URL up to and including the API version, e.g.
    /// `http://localhost:8080/v1`.
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        // No timeout: a hung completion call hangs the invocation.
        let http = Client::builder()
            .timeout(None)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = build_request(system, user, max_tokens);

        let mut call = self.http.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .with_context(|| format!("completion request to {url} failed"))?;
        if !response.status().is_success() {
            bail!("completion call failed with status {}", response.status());
        }

        let body: ChatResponse = response
            .json()
            .context("failed to decode completion response")?;
        first_choice_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_fields_are_never_zero() {
        let request = build_request("system", "user", 120);

        let value = serde_json::to_value(&request).expect("request must serialize");
        assert!(value["temperature"].as_f64().expect("temperature missing") > 0.0);
        assert!((value["top_p"].as_f64().expect("top_p missing") - 0.95).abs() < 1e-6);
        assert_eq!(value["max_tokens"], 120);
        assert_eq!(value["seed"], 420);
        assert_eq!(value["stop"][0], "</s>");
    }

    #[test]
    fn request_carries_system_then_user_message() {
        let request = build_request("be brief", "hello", 120);

        let value = serde_json::to_value(&request).expect("request must serialize");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "be brief");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hello");
    }

    #[test]
    fn first_choice_is_extracted_and_trimmed() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  a summary \n"}}]}"#,
        )
        .expect("response must parse");

        let text = first_choice_text(body).expect("one choice present");
        assert_eq!(text, "a summary");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[]}"#).expect("response must parse");

        assert!(first_choice_text(body).is_err());
    }
}
