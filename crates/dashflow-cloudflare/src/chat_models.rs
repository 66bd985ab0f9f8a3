//! Cloudflare Workers AI chat models implementation

use std::collections::HashMap;
use std::pin::Pin;

use async_stream::stream;
use async_trait::async_trait;
use dashflow::core::{
    callbacks::CallbackManager,
    config_loader::env_vars::{env_string, CLOUDFLARE_ACCOUNT_ID, CLOUDFLARE_API_TOKEN},
    error::{Error as DashFlowError, Result},
    language_models::{
        ChatGeneration, ChatGenerationChunk, ChatModel, ChatResult, ToolChoice, ToolDefinition,
    },
    messages::{AIMessage, AIMessageChunk, BaseMessage, Message},
};
use eventsource_stream::Eventsource;
use futures::stream::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const DEFAULT_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";
const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Cloudflare Workers AI chat model
///
/// Provides access to Cloudflare's edge inference with 50+ models
/// including Llama, Mistral, Gemma, and more.
///
/// # Example
///
/// ```no_run
/// use dashflow_cloudflare::ChatCloudflare;
/// use dashflow::core::messages::Message;
/// use dashflow::core::language_models::ChatModel;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let model = ChatCloudflare::new()
///     .with_account_id(std::env::var("CLOUDFLARE_ACCOUNT_ID")?)
///     .with_api_token(std::env::var("CLOUDFLARE_API_TOKEN")?)
///     .with_model("@cf/meta/llama-3.1-8b-instruct");
///
/// let messages = vec![Message::human("Hello!")];
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ChatCloudflare {
    /// Cloudflare account ID
    account_id: Option<String>,
    /// API token for authentication
    api_token: Option<String>,
    /// Model name (e.g., "@cf/meta/llama-3.1-8b-instruct")
    model: String,
    /// HTTP client
    client: Client,
    /// Temperature for sampling (0.0 to 5.0)
    temperature: Option<f32>,
    /// Maximum number of tokens to generate (default 256)
    max_tokens: Option<u32>,
    /// Top-p sampling parameter
    top_p: Option<f32>,
    /// Top-k sampling parameter
    top_k: Option<u32>,
    /// Seed for reproducibility
    seed: Option<i64>,
    /// Repetition penalty
    repetition_penalty: Option<f32>,
    /// Frequency penalty
    frequency_penalty: Option<f32>,
    /// Presence penalty
    presence_penalty: Option<f32>,
}

impl ChatCloudflare {
    /// Creates a new `ChatCloudflare` instance with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_id: env_string(CLOUDFLARE_ACCOUNT_ID),
            api_token: env_string(CLOUDFLARE_API_TOKEN),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
            seed: None,
            repetition_penalty: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }

    /// Sets the Cloudflare account ID
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Sets the API token
    #[must_use]
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Sets the model name (e.g., "@cf/meta/llama-3.1-8b-instruct")
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature (0.0 to 5.0, default 0.6)
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of tokens to generate (default 256)
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the top-p sampling parameter
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the top-k sampling parameter
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Sets the seed for reproducibility
    #[must_use]
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the repetition penalty
    #[must_use]
    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }

    /// Sets the frequency penalty
    #[must_use]
    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Sets the presence penalty
    #[must_use]
    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Builds the API endpoint URL
    fn endpoint(&self) -> Result<String> {
        let account_id = self
            .account_id
            .as_ref()
            .ok_or_else(|| DashFlowError::invalid_input("Cloudflare account ID not set"))?;
        Ok(format!(
            "{}/accounts/{}/ai/run/{}",
            API_BASE, account_id, self.model
        ))
    }

    /// Converts `DashFlow` messages to Cloudflare format
    fn convert_messages(&self, messages: &[BaseMessage]) -> Vec<CloudflareMessage> {
        messages
            .iter()
            .map(|msg| CloudflareMessage {
                role: match msg {
                    Message::System { .. } => "system".to_string(),
                    Message::Human { .. } => "user".to_string(),
                    Message::AI { .. } => "assistant".to_string(),
                    _ => "user".to_string(),
                },
                content: msg.as_text(),
            })
            .collect()
    }

    /// Builds the request body
    // SAFETY: json!({...}) macro always produces JsonValue::Object, so as_object_mut() is infallible
    #[allow(clippy::expect_used)]
    fn build_request_body(&self, messages: &[BaseMessage], streaming: bool) -> JsonValue {
        let mut body = serde_json::json!({
            "messages": self.convert_messages(messages),
            "stream": streaming,
        });

        // SAFETY: json!({...}) always produces JsonValue::Object, so as_object_mut() always returns Some
        let obj = body.as_object_mut().expect("json!({}) produces object");

        if let Some(temperature) = self.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(top_p) = self.top_p {
            obj.insert("top_p".to_string(), serde_json::json!(top_p));
        }
        if let Some(top_k) = self.top_k {
            obj.insert("top_k".to_string(), serde_json::json!(top_k));
        }
        if let Some(seed) = self.seed {
            obj.insert("seed".to_string(), serde_json::json!(seed));
        }
        if let Some(penalty) = self.repetition_penalty {
            obj.insert("repetition_penalty".to_string(), serde_json::json!(penalty));
        }
        if let Some(penalty) = self.frequency_penalty {
            obj.insert("frequency_penalty".to_string(), serde_json::json!(penalty));
        }
        if let Some(penalty) = self.presence_penalty {
            obj.insert("presence_penalty".to_string(), serde_json::json!(penalty));
        }

        body
    }
}

impl Default for ChatCloudflare {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CloudflareMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    result: CloudflareResult,
    success: bool,
    errors: Vec<JsonValue>,
    /// NOTE: messages field from Cloudflare API response (deserialization only).
    /// Not currently used but kept for complete API response parsing and future use.
    ///
    /// Serde deserialization field: Must match Cloudflare Workers AI API response schema.
    /// Field exists in API responses alongside success/errors (lines 253-254).
    /// Not accessed in current implementation (only result field extracted, line 252).
    /// Reserved for future diagnostic/logging enhancements (API metadata).
    /// Cannot remove without breaking serde deserialization from Cloudflare API responses.
    #[allow(dead_code)] // Part of Cloudflare API response schema; kept for future extensions
    messages: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct CloudflareResult {
    response: String,
}

#[async_trait]
impl ChatModel for ChatCloudflare {
    fn llm_type(&self) -> &'static str {
        "cloudflare-workers-ai"
    }

    fn identifying_params(&self) -> HashMap<String, JsonValue> {
        let mut params = HashMap::new();
        params.insert("model".to_string(), JsonValue::String(self.model.clone()));
        if let Some(temp) = self.temperature {
            params.insert("temperature".to_string(), JsonValue::from(temp));
        }
        if let Some(max_tokens) = self.max_tokens {
            params.insert("max_tokens".to_string(), JsonValue::from(max_tokens));
        }
        params
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn _generate(
        &self,
        messages: &[BaseMessage],
        _stop: Option<&[String]>,
        _tools: Option<&[ToolDefinition]>,
        _tool_choice: Option<&ToolChoice>,
        _run_manager: Option<&CallbackManager>,
    ) -> Result<ChatResult> {
        let api_token = self
            .api_token
            .as_ref()
            .ok_or_else(|| DashFlowError::invalid_input("Cloudflare API token not set"))?;

        let url = self.endpoint()?;
        let body = self.build_request_body(messages, false);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_token}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DashFlowError::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DashFlowError::http(format!(
                "Cloudflare API error ({status}): {error_text}"
            )));
        }

        let cf_response: CloudflareResponse = response
            .json()
            .await
            .map_err(|e| DashFlowError::api_format(format!("Failed to parse response: {e}")))?;

        if !cf_response.success {
            return Err(DashFlowError::http(format!(
                "Cloudflare API reported failure: {:?}",
                cf_response.errors
            )));
        }

        let ai_message = AIMessage::new(cf_response.result.response);

        Ok(ChatResult {
            generations: vec![ChatGeneration {
                message: ai_message.into(),
                generation_info: None,
            }],
            llm_output: None,
        })
    }

    async fn _stream(
        &self,
        messages: &[BaseMessage],
        _stop: Option<&[String]>,
        _tools: Option<&[ToolDefinition]>,
        _tool_choice: Option<&ToolChoice>,
        _run_manager: Option<&CallbackManager>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatGenerationChunk>> + Send>>> {
        let api_token = self
            .api_token
            .clone()
            .ok_or_else(|| DashFlowError::invalid_input("Cloudflare API token not set"))?;

        let url = self.endpoint()?;
        let body = self.build_request_body(messages, true);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_token}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DashFlowError::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DashFlowError::http(format!(
                "Cloudflare API error ({status}): {error_text}"
            )));
        }

        let event_stream = response.bytes_stream().eventsource();

        let stream = stream! {
            futures::pin_mut!(event_stream);

            while let Some(event) = futures::StreamExt::next(&mut event_stream).await {
                match event {
                    Ok(event) => {
                        if event.data == "[DONE]" {
                            break;
                        }

                        match serde_json::from_str::<JsonValue>(&event.data) {
                            Ok(data) => {
                                if let Some(response_text) = data.get("response").and_then(|r| r.as_str()) {
                                    let chunk = AIMessageChunk::new(response_text.to_string());

                                    yield Ok(ChatGenerationChunk {
                                        message: chunk,
                                        generation_info: None,
                                    });
                                }
                            }
                            Err(e) => {
                                yield Err(DashFlowError::api_format(format!(
                                    "Failed to parse SSE event: {e}"
                                )));
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(DashFlowError::http(format!(
                            "SSE stream error: {e}"
                        )));
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
