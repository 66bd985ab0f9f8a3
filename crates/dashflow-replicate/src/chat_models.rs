// Allow clippy warnings for Replicate chat models
// - clone_on_ref_ptr: Arc cloned for streaming operations
// - redundant_clone: OpenAI types require owned strings
#![allow(clippy::clone_on_ref_ptr, clippy::redundant_clone)]

//! Replicate chat model implementation

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        ChatCompletionTool, ChatCompletionToolChoiceOption, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject, ImageDetail as OpenAIImageDetail, ImageUrl,
    },
    Client,
};
use async_stream::stream;
use async_trait::async_trait;
use dashflow::core::{
    callbacks::CallbackManager,
    config_loader::env_vars::{env_string, REPLICATE_API_TOKEN},
    error::{Error, Result},
    language_models::{
        ChatGeneration, ChatGenerationChunk, ChatModel, ChatResult, ToolChoice, ToolDefinition,
    },
    messages::{AIMessageChunk, BaseMessage, InvalidToolCall, Message, ToolCall},
    rate_limiters::RateLimiter,
    retry::{with_retry, RetryPolicy},
    serialization::{Serializable, SerializedObject, SERIALIZATION_VERSION},
    usage::UsageMetadata,
};
use futures::Stream;
use futures::StreamExt;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Replicate OpenAI-compatible API base URL
const REPLICATE_API_BASE: &str = "https://openai-proxy.replicate.com/v1";

/// Replicate default model
const DEFAULT_MODEL: &str = "meta/meta-llama-3-8b-instruct";

/// Replicate chat model configuration and client
///
/// Replicate provides access to thousands of open-source models including
/// Llama, Mistral, and many others. The API is OpenAI-compatible.
///
/// # Example
/// ```no_run
/// use dashflow_replicate::ChatReplicate;
/// use dashflow::core::language_models::ChatModel;
/// use dashflow::core::messages::Message;
///
/// #[tokio::main]
/// async fn main() {
///     let model = ChatReplicate::new()
///         .with_model("meta/meta-llama-3-70b-instruct")
///         .with_temperature(0.7);
///
///     let messages = vec![Message::human("Hello!")];
///     let result = model.generate(&messages, None, None, None, None).await.unwrap();
///     println!("{:?}", result);
/// }
/// ```
///
/// # Authentication
/// Set the `REPLICATE_API_TOKEN` environment variable with your Replicate API token.
#[derive(Clone, Debug)]
pub struct ChatReplicate {
    /// OpenAI-compatible client configured for Replicate
    client: Arc<Client<OpenAIConfig>>,

    /// Model name (e.g., "meta/meta-llama-3-70b-instruct")
    model: String,

    /// Sampling temperature (0.0 to 2.0)
    temperature: Option<f32>,

    /// Maximum tokens to generate
    max_tokens: Option<u32>,

    /// Top-p sampling parameter
    top_p: Option<f32>,

    /// Frequency penalty (-2.0 to 2.0)
    frequency_penalty: Option<f32>,

    /// Presence penalty (-2.0 to 2.0)
    presence_penalty: Option<f32>,

    /// Number of completions to generate
    n: Option<u8>,

    /// Tools available for the model to call
    tools: Option<Vec<ChatCompletionTool>>,

    /// Controls which (if any) tool is called by the model
    tool_choice: Option<ChatCompletionToolChoiceOption>,

    /// Retry policy for API calls
    retry_policy: RetryPolicy,

    /// Optional rate limiter to control request rate
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl ChatReplicate {
    /// Create a new `ChatReplicate` instance with default settings
    ///
    /// Uses `REPLICATE_API_TOKEN` environment variable for authentication
    #[must_use]
    pub fn new() -> Self {
        let api_key = env_string(REPLICATE_API_TOKEN).unwrap_or_default();

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(REPLICATE_API_BASE);

        Self::with_config(config)
    }

    /// Create a new `ChatReplicate` instance with custom configuration
    #[must_use]
    pub fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Arc::new(Client::with_config(config)),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            n: None,
            tools: None,
            tool_choice: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Create with explicit API token
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(REPLICATE_API_BASE);
        Self::with_config(config)
    }

    /// Set the model name
    ///
    /// Popular models:
    /// - meta/meta-llama-3-70b-instruct
    /// - meta/meta-llama-3-8b-instruct
    /// - mistralai/mistral-7b-instruct-v0.2
    /// - mistralai/mixtral-8x7b-instruct-v0.1
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the top-p parameter
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the frequency penalty
    #[must_use]
    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Set the presence penalty
    #[must_use]
    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Set the number of completions to generate
    #[must_use]
    pub fn with_n(mut self, n: u8) -> Self {
        self.n = Some(n);
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set a rate limiter to control request rate
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Bind tools to the model for function calling
    #[deprecated(
        since = "1.9.0",
        note = "Use bind_tools() from ChatModelToolBindingExt trait instead. \
                bind_tools() is type-safe and works consistently across all providers. \
                Example: `use dashflow::core::language_models::ChatModelToolBindingExt; \
                model.bind_tools(vec![Arc::new(tool)], None)`"
    )]
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        let openai_tools: Vec<ChatCompletionTool> = tools
            .into_iter()
            .filter_map(|tool| {
                let name = tool.get("name")?.as_str()?.to_string();
                let description = tool
                    .get("description")
                    .and_then(|d| d.as_str())
                    .map(std::string::ToString::to_string);
                let parameters = tool.get("parameters").cloned();

                Some(ChatCompletionTool {
                    r#type: async_openai::types::ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name,
                        description,
                        parameters,
                        strict: None,
                    },
                })
            })
            .collect();

        self.tools = if openai_tools.is_empty() {
            None
        } else {
            Some(openai_tools)
        };
        self
    }

    /// Control which tool the model should call
    #[must_use]
    pub fn with_tool_choice(mut self, choice: Option<String>) -> Self {
        self.tool_choice = choice.map(|c| match c.as_str() {
            "none" => ChatCompletionToolChoiceOption::None,
            "auto" => ChatCompletionToolChoiceOption::Auto,
            "required" => ChatCompletionToolChoiceOption::Required,
            function_name => ChatCompletionToolChoiceOption::Named(
                async_openai::types::ChatCompletionNamedToolChoice {
                    r#type: async_openai::types::ChatCompletionToolType::Function,
                    function: async_openai::types::FunctionName {
                        name: function_name.to_string(),
                    },
                },
            ),
        });
        self
    }
}

impl Default for ChatReplicate {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `DashFlow` `ImageSource` to `OpenAI` `ImageUrl`
fn convert_image_source(
    source: &dashflow::core::messages::ImageSource,
    detail: Option<dashflow::core::messages::ImageDetail>,
) -> ImageUrl {
    use dashflow::core::messages::ImageSource;

    let url = match source {
        ImageSource::Url { url } => url.clone(),
        ImageSource::Base64 { media_type, data } => {
            format!("data:{media_type};base64,{data}")
        }
    };

    let openai_detail = detail.map(|d| match d {
        dashflow::core::messages::ImageDetail::Low => OpenAIImageDetail::Low,
        dashflow::core::messages::ImageDetail::High => OpenAIImageDetail::High,
        dashflow::core::messages::ImageDetail::Auto => OpenAIImageDetail::Auto,
    });

    ImageUrl {
        url,
        detail: openai_detail,
    }
}

/// Convert `DashFlow` `MessageContent` to `OpenAI` user message content format
fn convert_content(
    content: &dashflow::core::messages::MessageContent,
) -> ChatCompletionRequestUserMessageContent {
    use dashflow::core::messages::{ContentBlock, MessageContent};

    match content {
        MessageContent::Text(text) => ChatCompletionRequestUserMessageContent::Text(text.clone()),
        MessageContent::Blocks(blocks) => {
            let parts: Vec<ChatCompletionRequestUserMessageContentPart> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => {
                        if text.is_empty() {
                            None
                        } else {
                            Some(ChatCompletionRequestUserMessageContentPart::Text(
                                ChatCompletionRequestMessageContentPartText { text: text.clone() },
                            ))
                        }
                    }
                    ContentBlock::Image { source, detail } => {
                        Some(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                            ChatCompletionRequestMessageContentPartImage {
                                image_url: convert_image_source(source, *detail),
                            },
                        ))
                    }
                    _ => None,
                })
                .collect();

            if parts.len() == 1 {
                if let ChatCompletionRequestUserMessageContentPart::Text(text_part) = &parts[0] {
                    return ChatCompletionRequestUserMessageContent::Text(text_part.text.clone());
                }
            }

            ChatCompletionRequestUserMessageContent::Array(parts)
        }
    }
}

/// Convert `DashFlow` `ToolDefinition` to `OpenAI` `ChatCompletionTool`
fn convert_tool_definition(tool: &ToolDefinition) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: async_openai::types::ChatCompletionToolType::Function,
        function: FunctionObject {
            name: tool.name.clone(),
            description: if tool.description.is_empty() {
                None
            } else {
                Some(tool.description.clone())
            },
            parameters: Some(tool.parameters.clone()),
            strict: None,
        },
    }
}

/// Convert `DashFlow` `ToolChoice` to `OpenAI` `ChatCompletionToolChoiceOption`
fn convert_tool_choice(choice: &ToolChoice) -> ChatCompletionToolChoiceOption {
    match choice {
        ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
        ToolChoice::None => ChatCompletionToolChoiceOption::None,
        ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
        ToolChoice::Specific(name) => ChatCompletionToolChoiceOption::Named(
            async_openai::types::ChatCompletionNamedToolChoice {
                r#type: async_openai::types::ChatCompletionToolType::Function,
                function: async_openai::types::FunctionName { name: name.clone() },
            },
        ),
    }
}

/// Convert `DashFlow` Message to `OpenAI` `ChatCompletionRequestMessage`
fn convert_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    match message {
        Message::System { content, .. } => {
            let msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(content.as_text())
                .build()
                .map_err(|e| {
                    Error::invalid_input(format!("Failed to build system message: {e}"))
                })?;
            Ok(ChatCompletionRequestMessage::System(msg))
        }
        Message::Human { content, .. } => {
            let msg = ChatCompletionRequestUserMessageArgs::default()
                .content(convert_content(content))
                .build()
                .map_err(|e| Error::invalid_input(format!("Failed to build user message: {e}")))?;
            Ok(ChatCompletionRequestMessage::User(msg))
        }
        Message::AI {
            content,
            tool_calls,
            ..
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();

            // Set content if present
            if !content.as_text().is_empty() {
                builder.content(content.as_text());
            }

            // Convert tool calls if present
            if !tool_calls.is_empty() {
                let openai_tool_calls: Vec<ChatCompletionMessageToolCall> = tool_calls
                    .iter()
                    .map(|tc| ChatCompletionMessageToolCall {
                        id: tc.id.clone(),
                        r#type: async_openai::types::ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.args.to_string(),
                        },
                    })
                    .collect();
                builder.tool_calls(openai_tool_calls);
            }

            let msg = builder
                .build()
                .map_err(|e| Error::invalid_input(format!("Failed to build AI message: {e}")))?;
            Ok(ChatCompletionRequestMessage::Assistant(msg))
        }
        Message::Tool {
            content,
            tool_call_id,
            ..
        } => {
            let msg = ChatCompletionRequestToolMessageArgs::default()
                .content(content.as_text())
                .tool_call_id(tool_call_id)
                .build()
                .map_err(|e| Error::invalid_input(format!("Failed to build tool message: {e}")))?;
            Ok(ChatCompletionRequestMessage::Tool(msg))
        }
        Message::Function { .. } => Err(Error::invalid_input(
            "Function messages are deprecated. Use Tool messages instead.".to_string(),
        )),
    }
}

#[async_trait]
impl ChatModel for ChatReplicate {
    async fn _generate(
        &self,
        messages: &[BaseMessage],
        stop: Option<&[String]>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
        run_manager: Option<&CallbackManager>,
    ) -> Result<ChatResult> {
        // Generate run ID for tracing
        let run_id = Uuid::new_v4();

        // Call on_llm_start callback
        if let Some(manager) = run_manager {
            let serialized = self.identifying_params();
            let prompts: Vec<String> = messages
                .iter()
                .map(dashflow::core::messages::Message::as_text)
                .collect();

            manager
                .on_llm_start(&serialized, &prompts, run_id, None, &[], &HashMap::new())
                .await?;
        }

        // Apply rate limiting if configured
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        // Build request with retry
        let result = with_retry(&self.retry_policy, || async {
            // Convert messages
            let mut openai_messages: Vec<ChatCompletionRequestMessage> =
                Vec::with_capacity(messages.len());
            for msg in messages {
                openai_messages.push(convert_message(msg)?);
            }

            // Build request
            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(&self.model).messages(openai_messages);

            // Add optional parameters
            if let Some(temp) = self.temperature {
                request.temperature(temp);
            }
            if let Some(max_tok) = self.max_tokens {
                request.max_tokens(max_tok);
            }
            if let Some(p) = self.top_p {
                request.top_p(p);
            }
            if let Some(fp) = self.frequency_penalty {
                request.frequency_penalty(fp);
            }
            if let Some(pp) = self.presence_penalty {
                request.presence_penalty(pp);
            }
            if let Some(n) = self.n {
                request.n(n);
            }
            if let Some(stop_seqs) = stop {
                request.stop(stop_seqs.to_vec());
            }

            // Add tools if provided
            let combined_tools: Vec<ChatCompletionTool> = if let Some(tool_defs) = tools {
                tool_defs.iter().map(convert_tool_definition).collect()
            } else {
                self.tools.clone().unwrap_or_default()
            };

            if !combined_tools.is_empty() {
                request.tools(combined_tools);

                // Set tool choice
                if let Some(tc) = tool_choice {
                    request.tool_choice(convert_tool_choice(tc));
                } else if let Some(tc) = &self.tool_choice {
                    request.tool_choice(tc.clone());
                }
            }

            let request = request
                .build()
                .map_err(|e| Error::invalid_input(format!("Failed to build request: {e}")))?;

            // Make API call
            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| Error::api(format!("Replicate API error: {e}")))?;

            Ok(response)
        })
        .await?;

        // Extract usage metadata
        let usage = result.usage.as_ref().map(|u| UsageMetadata {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
            input_token_details: None,
            output_token_details: None,
        });

        // Convert response to ChatResult
        let generations: Vec<ChatGeneration> = result
            .choices
            .iter()
            .map(|choice| {
                let content = choice.message.content.clone().unwrap_or_default();

                // Extract tool calls
                let tool_calls: Vec<ToolCall> = choice
                    .message
                    .tool_calls
                    .as_ref()
                    .map(|tcs| {
                        tcs.iter()
                            .filter_map(|tc| {
                                serde_json::from_str(&tc.function.arguments)
                                    .ok()
                                    .map(|args| ToolCall {
                                        id: tc.id.clone(),
                                        name: tc.function.name.clone(),
                                        args,
                                        tool_type: "tool_call".to_string(),
                                        index: None,
                                    })
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let invalid_tool_calls: Vec<InvalidToolCall> = choice
                    .message
                    .tool_calls
                    .as_ref()
                    .map(|tcs| {
                        tcs.iter()
                            .filter_map(|tc| {
                                if serde_json::from_str::<serde_json::Value>(&tc.function.arguments)
                                    .is_err()
                                {
                                    Some(InvalidToolCall {
                                        id: tc.id.clone(),
                                        name: Some(tc.function.name.clone()),
                                        args: Some(tc.function.arguments.clone()),
                                        error: "Failed to parse tool call arguments".to_string(),
                                    })
                                } else {
                                    None
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let message = Message::AI {
                    content: dashflow::core::messages::MessageContent::Text(content.clone()),
                    tool_calls,
                    invalid_tool_calls,
                    usage_metadata: usage.clone(),
                    fields: Default::default(),
                };

                ChatGeneration {
                    message,
                    generation_info: Some(HashMap::new()),
                }
            })
            .collect();

        let mut llm_output = HashMap::new();
        if let Some(u) = &usage {
            llm_output.insert(
                "usage".to_string(),
                serde_json::to_value(u).unwrap_or_default(),
            );
        }

        let result = ChatResult {
            generations,
            llm_output: Some(llm_output.clone()),
        };

        // Call on_llm_end callback
        if let Some(manager) = run_manager {
            manager.on_llm_end(&llm_output, run_id, None).await?;
        }

        Ok(result)
    }

    async fn _stream(
        &self,
        messages: &[BaseMessage],
        stop: Option<&[String]>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
        _run_manager: Option<&CallbackManager>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatGenerationChunk>> + Send>>> {
        // Clone data we need for the stream (to avoid lifetime issues)
        let rate_limiter = self.rate_limiter.clone();
        let client = self.client.clone();
        let model = self.model.clone();
        let temperature = self.temperature;
        let max_tokens = self.max_tokens;
        let top_p = self.top_p;
        let frequency_penalty = self.frequency_penalty;
        let presence_penalty = self.presence_penalty;
        let stop_seqs = stop.map(<[std::string::String]>::to_vec);
        let tools_owned = tools.map(<[dashflow::core::language_models::ToolDefinition]>::to_vec);
        let tool_choice_owned = tool_choice.cloned();
        let self_tools = self.tools.clone();
        let self_tool_choice = self.tool_choice.clone();

        // Convert messages upfront
        let mut openai_messages: Vec<ChatCompletionRequestMessage> = Vec::new();
        for msg in messages {
            openai_messages.push(convert_message(msg)?);
        }

        Ok(Box::pin(stream! {
            // Apply rate limiting if configured
            if let Some(limiter) = &rate_limiter {
                limiter.acquire().await;
            }

            // Build request
            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(&model).messages(openai_messages).stream(true);

            // Add optional parameters
            if let Some(temp) = temperature {
                request.temperature(temp);
            }
            if let Some(max_tok) = max_tokens {
                request.max_tokens(max_tok);
            }
            if let Some(p) = top_p {
                request.top_p(p);
            }
            if let Some(fp) = frequency_penalty {
                request.frequency_penalty(fp);
            }
            if let Some(pp) = presence_penalty {
                request.presence_penalty(pp);
            }
            if let Some(ref stop_seqs_vec) = stop_seqs {
                request.stop(stop_seqs_vec.clone());
            }

            // Add tools if provided
            let combined_tools: Vec<ChatCompletionTool> = if let Some(ref tool_defs) = tools_owned {
                tool_defs.iter().map(convert_tool_definition).collect()
            } else {
                self_tools.unwrap_or_default()
            };

            if !combined_tools.is_empty() {
                request.tools(combined_tools);

                if let Some(ref tc) = tool_choice_owned {
                    request.tool_choice(convert_tool_choice(tc));
                } else if let Some(ref tc) = self_tool_choice {
                    request.tool_choice(tc.clone());
                }
            }

            let request = match request.build() {
                Ok(r) => r,
                Err(e) => {
                    yield Err(Error::invalid_input(format!("Failed to build request: {e}")));
                    return;
                }
            };

            // Make streaming API call
            let mut stream = match client.chat().create_stream(request).await {
                Ok(s) => s,
                Err(e) => {
                    yield Err(Error::api(format!("Replicate API error: {e}")));
                    return;
                }
            };

            // Stream responses
            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => {
                        for choice in response.choices {
                            let content = choice.delta.content.unwrap_or_default();

                            let chunk = AIMessageChunk {
                                content: content.clone(),
                                tool_calls: Vec::new(),
                                invalid_tool_calls: Vec::new(),
                                usage_metadata: None,
                                fields: Default::default(),
                            };

                            yield Ok(ChatGenerationChunk {
                                message: chunk,
                                generation_info: Some(HashMap::new()),
                            });
                        }
                    }
                    Err(e) => {
                        yield Err(Error::api(format!("Stream error: {e}")));
                        return;
                    }
                }
            }
        }))
    }

    fn identifying_params(&self) -> HashMap<String, serde_json::Value> {
        let mut params = HashMap::new();
        params.insert("model_name".to_string(), serde_json::json!(self.model));
        params.insert("provider".to_string(), serde_json::json!("replicate"));

        if let Some(temp) = self.temperature {
            params.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tok) = self.max_tokens {
            params.insert("max_tokens".to_string(), serde_json::json!(max_tok));
        }
        if let Some(p) = self.top_p {
            params.insert("top_p".to_string(), serde_json::json!(p));
        }

        params
    }

    fn llm_type(&self) -> &'static str {
        "replicate-chat"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Serializable for ChatReplicate {
    fn lc_id(&self) -> Vec<String> {
        vec![
            "dashflow".to_string(),
            "chat_models".to_string(),
            "replicate".to_string(),
            "ChatReplicate".to_string(),
        ]
    }

    fn is_lc_serializable(&self) -> bool {
        true
    }

    fn to_json(&self) -> SerializedObject {
        let mut kwargs = serde_json::Map::new();

        // Model name (required)
        kwargs.insert("model".to_string(), serde_json::json!(self.model));

        // Optional parameters
        if let Some(temp) = self.temperature {
            kwargs.insert("temperature".to_string(), serde_json::json!(temp));
        }

        if let Some(max_tok) = self.max_tokens {
            kwargs.insert("max_tokens".to_string(), serde_json::json!(max_tok));
        }

        if let Some(tp) = self.top_p {
            kwargs.insert("top_p".to_string(), serde_json::json!(tp));
        }

        if let Some(fp) = self.frequency_penalty {
            kwargs.insert("frequency_penalty".to_string(), serde_json::json!(fp));
        }

        if let Some(pp) = self.presence_penalty {
            kwargs.insert("presence_penalty".to_string(), serde_json::json!(pp));
        }

        if let Some(n) = self.n {
            kwargs.insert("n".to_string(), serde_json::json!(n));
        }

        SerializedObject::Constructor {
            lc: SERIALIZATION_VERSION,
            id: self.lc_id(),
            kwargs: serde_json::Value::Object(kwargs),
        }
    }

    fn lc_secrets(&self) -> std::collections::HashMap<String, String> {
        let mut secrets = std::collections::HashMap::new();
        secrets.insert("api_token".to_string(), "REPLICATE_API_TOKEN".to_string());
        secrets
    }
}
