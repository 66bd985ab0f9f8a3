//! Azure `OpenAI` chat model implementation

use async_openai::{
    config::AzureConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionTool,
        ChatCompletionToolChoiceOption, CreateChatCompletionRequestArgs, FunctionCall,
        FunctionObject, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_stream::stream;
use async_trait::async_trait;
use dashflow::core::{
    callbacks::CallbackManager,
    config_loader::env_vars::{
        env_string, env_string_or_default, AZURE_OPENAI_API_KEY, AZURE_OPENAI_API_VERSION,
        AZURE_OPENAI_DEPLOYMENT_NAME, AZURE_OPENAI_ENDPOINT,
    },
    error::{Error, Result},
    language_models::{
        ChatGeneration, ChatGenerationChunk, ChatModel, ChatResult, ToolChoice, ToolDefinition,
    },
    messages::{AIMessage, AIMessageChunk, BaseMessage, Message, ToolCall},
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

/// Azure `OpenAI` chat model configuration and client
///
/// This provides Azure-specific endpoints, authentication, and deployment-based model selection.
///
/// # Example
/// ```no_run
/// use dashflow_azure_openai::ChatAzureOpenAI;
/// use dashflow::core::language_models::ChatModel;
/// use dashflow::core::messages::Message;
///
/// #[tokio::main]
/// async fn main() {
///     let model = ChatAzureOpenAI::new()
///         .with_deployment_name("gpt-4")
///         .with_endpoint("https://my-resource.openai.azure.com")
///         .with_api_key("your-api-key")
///         .with_temperature(0.7);
///
///     let messages = vec![Message::human("Hello!")];
///     let result = model.generate(&messages, None, None, None, None).await.unwrap();
///     println!("{:?}", result);
/// }
/// ```
#[derive(Clone)]
pub struct ChatAzureOpenAI {
    /// Azure `OpenAI` client
    client: Arc<Client<AzureConfig>>,

    /// Deployment name (Azure-specific, maps to model)
    deployment_name: String,

    /// Azure endpoint URL (stored for builder accumulation)
    azure_endpoint: Option<String>,

    /// Azure API key (stored for builder accumulation)
    azure_api_key: Option<String>,

    /// Azure API version (stored for builder accumulation)
    azure_api_version: Option<String>,

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

    /// Response format (text, `json_object`, or `json_schema`)
    response_format: Option<ResponseFormat>,

    /// Retry policy for API calls
    retry_policy: RetryPolicy,

    /// Optional rate limiter to control request rate
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

// Custom Debug implementation to prevent API key exposure in logs
impl std::fmt::Debug for ChatAzureOpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAzureOpenAI")
            .field("client", &"Arc<Client<AzureConfig>>")
            .field("deployment_name", &self.deployment_name)
            .field("azure_endpoint", &self.azure_endpoint)
            .field("azure_api_key", &self.azure_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("azure_api_version", &self.azure_api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("n", &self.n)
            .field("tools", &self.tools)
            .field("tool_choice", &self.tool_choice)
            .field("response_format", &self.response_format)
            .field("retry_policy", &self.retry_policy)
            .field("rate_limiter", &self.rate_limiter.as_ref().map(|_| "RateLimiter"))
            .finish()
    }
}

impl ChatAzureOpenAI {
    /// Create a new `ChatAzureOpenAI` instance with environment-based configuration
    ///
    /// Requires the following environment variables:
    /// - `AZURE_OPENAI_API_KEY`
    /// - `AZURE_OPENAI_ENDPOINT` (e.g., <https://my-resource.openai.azure.com>)
    /// - `AZURE_OPENAI_DEPLOYMENT_NAME` (optional, defaults to "gpt-35-turbo")
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AzureConfig::default())
    }

    /// Create a new `ChatAzureOpenAI` instance with custom Azure configuration
    #[must_use]
    pub fn with_config(config: AzureConfig) -> Self {
        Self {
            client: Arc::new(Client::with_config(config)),
            deployment_name: env_string_or_default(AZURE_OPENAI_DEPLOYMENT_NAME, "gpt-35-turbo"),
            azure_endpoint: env_string(AZURE_OPENAI_ENDPOINT),
            azure_api_key: env_string(AZURE_OPENAI_API_KEY),
            azure_api_version: env_string(AZURE_OPENAI_API_VERSION),
            temperature: None,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            n: None,
            tools: None,
            tool_choice: None,
            response_format: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Rebuilds the client from accumulated configuration values.
    /// Called internally by builder methods to ensure all settings are preserved.
    fn rebuild_client(&mut self) {
        let mut config = AzureConfig::new().with_deployment_id(&self.deployment_name);

        if let Some(endpoint) = &self.azure_endpoint {
            config = config.with_api_base(endpoint.clone());
        }
        if let Some(api_key) = &self.azure_api_key {
            config = config.with_api_key(api_key.clone());
        }
        if let Some(api_version) = &self.azure_api_version {
            config = config.with_api_version(api_version.clone());
        } else {
            // Default API version if not explicitly set
            config = config.with_api_version("2024-10-21");
        }

        self.client = Arc::new(Client::with_config(config));
    }

    /// Set the deployment name (Azure-specific model identifier)
    #[must_use]
    pub fn with_deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = deployment_name.into();
        self.rebuild_client();
        self
    }

    /// Set the Azure endpoint URL
    ///
    /// This method accumulates with other builder methods - you can chain
    /// `.with_endpoint()`, `.with_api_key()`, `.with_api_version()` in any order
    /// and all values will be preserved.
    ///
    /// # Example
    /// ```no_run
    /// use dashflow_azure_openai::ChatAzureOpenAI;
    ///
    /// let model = ChatAzureOpenAI::new()
    ///     .with_endpoint("https://my-resource.openai.azure.com")
    ///     .with_api_key("my-key")
    ///     .with_api_version("2024-10-21");
    /// // All three values are preserved in the final model
    /// ```
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.azure_endpoint = Some(endpoint.into());
        self.rebuild_client();
        self
    }

    /// Set the API key for Azure `OpenAI`
    ///
    /// This method accumulates with other builder methods - you can chain
    /// `.with_endpoint()`, `.with_api_key()`, `.with_api_version()` in any order
    /// and all values will be preserved.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.azure_api_key = Some(api_key.into());
        self.rebuild_client();
        self
    }

    /// Set the API version (defaults to "2024-10-21")
    ///
    /// This method accumulates with other builder methods - you can chain
    /// `.with_endpoint()`, `.with_api_key()`, `.with_api_version()` in any order
    /// and all values will be preserved.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.azure_api_version = Some(version.into());
        self.rebuild_client();
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
    ///
    /// # Arguments
    /// * `tools` - Vector of tool definitions
    ///
    /// # Example
    /// ```no_run
    /// use dashflow_azure_openai::ChatAzureOpenAI;
    /// use dashflow::core::language_models::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tools = vec![
    ///     ToolDefinition {
    ///         name: "get_weather".to_string(),
    ///         description: "Get weather for a location".to_string(),
    ///         parameters: json!({
    ///             "type": "object",
    ///             "properties": {
    ///                 "location": {"type": "string"}
    ///             }
    ///         }),
    ///     }
    /// ];
    ///
    /// # #[allow(deprecated)]
    /// # fn build_model(tools: Vec<ToolDefinition>) {
    /// let model = ChatAzureOpenAI::new().with_tools(tools);
    /// # let _ = model;
    /// # }
    /// ```
    #[must_use]
    #[deprecated(
        since = "1.9.0",
        note = "Use bind_tools() from ChatModelToolBindingExt trait instead. \
                bind_tools() is type-safe and works consistently across all providers. \
                Example: `use dashflow::core::language_models::ChatModelToolBindingExt; \
                model.bind_tools(vec![Arc::new(tool)], None)`"
    )]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        let openai_tools = tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: async_openai::types::ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name,
                    description: if tool.description.is_empty() {
                        None
                    } else {
                        Some(tool.description)
                    },
                    parameters: Some(tool.parameters),
                    strict: None,
                },
            })
            .collect();
        self.tools = Some(openai_tools);
        self
    }

    /// Set the tool choice option
    ///
    /// Controls which (if any) tool is called by the model.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        use async_openai::types::{
            ChatCompletionNamedToolChoice, ChatCompletionToolChoiceOption, FunctionName,
        };

        let openai_choice = match tool_choice {
            ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
            ToolChoice::None => ChatCompletionToolChoiceOption::None,
            ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
            ToolChoice::Specific(name) => {
                ChatCompletionToolChoiceOption::Named(ChatCompletionNamedToolChoice {
                    r#type: async_openai::types::ChatCompletionToolType::Function,
                    function: FunctionName { name },
                })
            }
        };
        self.tool_choice = Some(openai_choice);
        self
    }

    /// Enable JSON mode for structured outputs
    ///
    /// When enabled, the model's output will be valid JSON.
    #[must_use]
    pub fn with_json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }

    /// Set structured output with a JSON schema
    ///
    /// # Arguments
    /// * `name` - Name for the schema
    /// * `schema` - JSON schema for the output
    /// * `strict` - Whether to enforce strict schema validation
    ///
    /// # Example
    /// ```no_run
    /// use dashflow_azure_openai::ChatAzureOpenAI;
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "name": {"type": "string"},
    ///         "age": {"type": "integer"}
    ///     },
    ///     "required": ["name", "age"]
    /// });
    ///
    /// let model = ChatAzureOpenAI::new()
    ///     .with_structured_output("Person", schema, true);
    /// ```
    pub fn with_structured_output(
        mut self,
        name: impl Into<String>,
        schema: serde_json::Value,
        strict: bool,
    ) -> Self {
        self.response_format = Some(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name: name.into(),
                description: None,
                schema: Some(schema),
                strict: Some(strict),
            },
        });
        self
    }

    /// Convert `DashFlow` messages to Azure `OpenAI` format
    fn convert_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>> {
        messages
            .iter()
            .map(|msg| match msg {
                Message::System { content, .. } => {
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(content.as_text())
                        .build()
                        .map(ChatCompletionRequestMessage::System)
                        .map_err(|e| Error::Other(format!("Failed to build system message: {e}")))
                }
                Message::Human { content, .. } => ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Text(
                        content.as_text(),
                    ))
                    .build()
                    .map(ChatCompletionRequestMessage::User)
                    .map_err(|e| Error::Other(format!("Failed to build user message: {e}"))),
                Message::AI {
                    content,
                    tool_calls,
                    ..
                } => {
                    let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                    builder.content(content.as_text());

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

                    builder
                        .build()
                        .map(ChatCompletionRequestMessage::Assistant)
                        .map_err(|e| {
                            Error::Other(format!("Failed to build assistant message: {e}"))
                        })
                }
                Message::Tool {
                    content,
                    tool_call_id,
                    ..
                } => ChatCompletionRequestToolMessageArgs::default()
                    .content(content.as_text())
                    .tool_call_id(tool_call_id.clone())
                    .build()
                    .map(ChatCompletionRequestMessage::Tool)
                    .map_err(|e| Error::Other(format!("Failed to build tool message: {e}"))),
                Message::Function { content, name, .. } => {
                    // OpenAI deprecated function messages in favor of tool messages
                    // Convert to tool message with a generated tool_call_id
                    let tool_call_id = format!("func_{name}");
                    ChatCompletionRequestToolMessageArgs::default()
                        .content(content.as_text())
                        .tool_call_id(tool_call_id)
                        .build()
                        .map(ChatCompletionRequestMessage::Tool)
                        .map_err(|e| {
                            Error::Other(format!("Failed to build tool message from function: {e}"))
                        })
                }
            })
            .collect()
    }

    /// Generate chat completions
    ///
    /// # Arguments
    /// * `messages` - The messages to send
    /// * `stop` - Per-call stop sequences (overrides instance-level)
    /// * `tools` - Per-call tool definitions (overrides instance-level)
    /// * `tool_choice` - Per-call tool choice (overrides instance-level)
    /// * `_callbacks` - Optional callback manager
    /// * `_tags` - Optional tags
    /// * `_metadata` - Optional metadata
    #[allow(clippy::too_many_arguments)] // Core chat generation API requires separate optional params for tools, callbacks, tags, metadata
    #[allow(clippy::clone_on_ref_ptr)] // Arc<Client> cloned for retry closure
    async fn generate_impl(
        &self,
        messages: &[Message],
        stop: Option<&[String]>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
        _callbacks: Option<Arc<CallbackManager>>,
        _tags: Option<Arc<[String]>>,
        _metadata: Option<Arc<HashMap<String, serde_json::Value>>>,
    ) -> Result<ChatResult> {
        // Apply rate limiting if configured
        if let Some(limiter) = &self.rate_limiter {
            let () = limiter.acquire().await;
        }

        // Convert messages to Azure OpenAI format
        let openai_messages = Self::convert_messages(messages)?;

        // Build request
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.deployment_name)
            .messages(openai_messages);

        if let Some(temp) = self.temperature {
            request_builder.temperature(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            request_builder.max_tokens(max_tokens);
        }
        if let Some(top_p) = self.top_p {
            request_builder.top_p(top_p);
        }
        if let Some(freq_penalty) = self.frequency_penalty {
            request_builder.frequency_penalty(freq_penalty);
        }
        if let Some(pres_penalty) = self.presence_penalty {
            request_builder.presence_penalty(pres_penalty);
        }
        if let Some(n) = self.n {
            request_builder.n(n);
        }

        // Per-call stop sequences override instance-level (note: async_openai uses `stop` field)
        if let Some(stop_seqs) = stop {
            if !stop_seqs.is_empty() {
                request_builder.stop(stop_seqs.to_vec());
            }
        }

        // Per-call tools override instance-level tools
        if let Some(per_call_tools) = tools {
            let openai_tools: Vec<ChatCompletionTool> = per_call_tools
                .iter()
                .map(|tool| ChatCompletionTool {
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
                })
                .collect();
            request_builder.tools(openai_tools);
        } else if let Some(instance_tools) = &self.tools {
            request_builder.tools(instance_tools.clone());
        }

        // Per-call tool_choice overrides instance-level tool_choice
        if let Some(per_call_choice) = tool_choice {
            use async_openai::types::{
                ChatCompletionNamedToolChoice, ChatCompletionToolChoiceOption, FunctionName,
            };

            let openai_choice = match per_call_choice {
                ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
                ToolChoice::None => ChatCompletionToolChoiceOption::None,
                ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
                ToolChoice::Specific(name) => {
                    ChatCompletionToolChoiceOption::Named(ChatCompletionNamedToolChoice {
                        r#type: async_openai::types::ChatCompletionToolType::Function,
                        function: FunctionName { name: name.clone() },
                    })
                }
            };
            request_builder.tool_choice(openai_choice);
        } else if let Some(instance_choice) = &self.tool_choice {
            request_builder.tool_choice(instance_choice.clone());
        }

        if let Some(response_format) = &self.response_format {
            request_builder.response_format(response_format.clone());
        }

        let request = request_builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to build chat request: {e}")))?;

        // Call API with retry logic
        let client = self.client.clone();
        let response = with_retry(&self.retry_policy, move || {
            let client = client.clone();
            let request = request.clone();
            async move {
                client
                    .chat()
                    .create(request)
                    .await
                    .map_err(|e| Error::api(format!("Azure OpenAI API error: {e}")))
            }
        })
        .await?;

        // Extract usage metadata
        let usage_metadata = response
            .usage
            .as_ref()
            .map(|usage| UsageMetadata::new(usage.prompt_tokens, usage.completion_tokens));

        // Convert response to ChatResult
        let generations: Vec<ChatGeneration> = response
            .choices
            .into_iter()
            .map(|choice| {
                let message = &choice.message;
                let mut ai_msg = AIMessage::new(message.content.clone().unwrap_or_default());

                // Extract tool calls if present
                if let Some(tool_calls) = &message.tool_calls {
                    let dashflow_tool_calls: Vec<ToolCall> = tool_calls
                        .iter()
                        .map(|tc| ToolCall {
                            id: tc.id.clone(),
                            name: tc.function.name.clone(),
                            args: serde_json::from_str(&tc.function.arguments)
                                .unwrap_or_else(|_| serde_json::json!({})),
                            tool_type: "tool_call".to_string(),
                            index: None,
                        })
                        .collect();
                    ai_msg = ai_msg.with_tool_calls(dashflow_tool_calls);
                }

                // Add usage metadata if available
                if let Some(ref usage_meta) = usage_metadata {
                    ai_msg = ai_msg.with_usage(usage_meta.clone());
                }

                ChatGeneration {
                    message: ai_msg.into(),
                    generation_info: None,
                }
            })
            .collect();

        Ok(ChatResult {
            generations,
            llm_output: None,
        })
    }
}

impl Default for ChatAzureOpenAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for ChatAzureOpenAI {
    async fn _generate(
        &self,
        messages: &[BaseMessage],
        stop: Option<&[String]>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
        _run_manager: Option<&CallbackManager>,
    ) -> Result<ChatResult> {
        self.generate_impl(messages, stop, tools, tool_choice, None, None, None)
            .await
    }

    #[allow(clippy::clone_on_ref_ptr)] // Arc<Client> cloned for stream! macro
    async fn _stream(
        &self,
        messages: &[BaseMessage],
        stop: Option<&[String]>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: Option<&ToolChoice>,
        _run_manager: Option<&CallbackManager>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatGenerationChunk>> + Send>>> {
        // Apply rate limiting if configured
        if let Some(limiter) = &self.rate_limiter {
            let () = limiter.acquire().await;
        }

        // Convert messages to Azure OpenAI format
        let openai_messages = Self::convert_messages(messages)?;

        // Build request
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.deployment_name)
            .messages(openai_messages);

        if let Some(temp) = self.temperature {
            request_builder.temperature(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            request_builder.max_tokens(max_tokens);
        }
        if let Some(top_p) = self.top_p {
            request_builder.top_p(top_p);
        }
        if let Some(freq_penalty) = self.frequency_penalty {
            request_builder.frequency_penalty(freq_penalty);
        }
        if let Some(pres_penalty) = self.presence_penalty {
            request_builder.presence_penalty(pres_penalty);
        }
        if let Some(n) = self.n {
            request_builder.n(n);
        }

        // Per-call stop sequences
        if let Some(stop_seqs) = stop {
            if !stop_seqs.is_empty() {
                request_builder.stop(stop_seqs.to_vec());
            }
        }

        // Per-call tools override instance-level tools
        if let Some(per_call_tools) = tools {
            let openai_tools: Vec<ChatCompletionTool> = per_call_tools
                .iter()
                .map(|tool| ChatCompletionTool {
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
                })
                .collect();
            request_builder.tools(openai_tools);
        } else if let Some(instance_tools) = &self.tools {
            request_builder.tools(instance_tools.clone());
        }

        // Per-call tool_choice overrides instance-level tool_choice
        if let Some(per_call_choice) = tool_choice {
            use async_openai::types::{
                ChatCompletionNamedToolChoice, ChatCompletionToolChoiceOption, FunctionName,
            };

            let openai_choice = match per_call_choice {
                ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
                ToolChoice::None => ChatCompletionToolChoiceOption::None,
                ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
                ToolChoice::Specific(name) => {
                    ChatCompletionToolChoiceOption::Named(ChatCompletionNamedToolChoice {
                        r#type: async_openai::types::ChatCompletionToolType::Function,
                        function: FunctionName { name: name.clone() },
                    })
                }
            };
            request_builder.tool_choice(openai_choice);
        } else if let Some(instance_choice) = &self.tool_choice {
            request_builder.tool_choice(instance_choice.clone());
        }

        if let Some(response_format) = &self.response_format {
            request_builder.response_format(response_format.clone());
        }

        let request = request_builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to build chat request: {e}")))?;

        let client = self.client.clone();

        let stream = stream! {
            let mut stream = match client.chat().create_stream(request).await {
                Ok(s) => s,
                Err(e) => {
                    yield Err(Error::api(format!("Azure OpenAI API error: {e}")));
                    return;
                }
            };

            // Counter for generating unique tool call IDs when streaming returns None
            let mut tool_call_counter: u32 = 0;

            while let Some(result) = stream.next().await {
                match result {
                    Ok(response) => {
                        for choice in response.choices {
                            let delta = &choice.delta;

                            let mut chunk = AIMessageChunk::new(
                                delta.content.clone().unwrap_or_default()
                            );

                            // Extract tool calls if present
                            if let Some(tool_calls) = &delta.tool_calls {
                                let dashflow_tool_calls: Vec<ToolCall> = tool_calls
                                    .iter()
                                    .map(|tc| {
                                        // Generate a unique ID if streaming doesn't provide one
                                        // Empty string IDs can break chunk merging
                                        let id = tc.id.clone().unwrap_or_else(|| {
                                            tool_call_counter += 1;
                                            format!("call_stream_{tool_call_counter}")
                                        });
                                        ToolCall {
                                            id,
                                            name: tc.function.as_ref()
                                                .and_then(|f| f.name.clone())
                                                .unwrap_or_default(),
                                            args: tc.function.as_ref()
                                                .and_then(|f| f.arguments.as_ref())
                                                .and_then(|a| serde_json::from_str(a).ok())
                                                .unwrap_or_else(|| serde_json::json!({})),
                                            tool_type: "tool_call".to_string(),
                                            index: Some(tc.index as usize),
                                        }
                                    })
                                    .collect();
                                chunk.tool_calls = dashflow_tool_calls;
                            }

                            yield Ok(ChatGenerationChunk {
                                message: chunk,
                                generation_info: None,
                            });
                        }
                    }
                    Err(e) => {
                        yield Err(Error::api(format!("Azure OpenAI stream error: {e}")));
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn llm_type(&self) -> &'static str {
        "azure-openai-chat"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn identifying_params(&self) -> HashMap<String, serde_json::Value> {
        let mut params = HashMap::new();
        params.insert(
            "deployment_name".to_string(),
            serde_json::json!(self.deployment_name),
        );
        if let Some(temp) = self.temperature {
            params.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tok) = self.max_tokens {
            params.insert("max_tokens".to_string(), serde_json::json!(max_tok));
        }
        params
    }
}

impl Serializable for ChatAzureOpenAI {
    fn lc_id(&self) -> Vec<String> {
        vec![
            "dashflow".to_string(),
            "chat_models".to_string(),
            "azure_openai".to_string(),
            "ChatAzureOpenAI".to_string(),
        ]
    }

    fn is_lc_serializable(&self) -> bool {
        true
    }

    fn to_json(&self) -> SerializedObject {
        let mut kwargs = serde_json::Map::new();

        // Deployment name (required)
        kwargs.insert(
            "deployment_name".to_string(),
            serde_json::json!(self.deployment_name),
        );

        // Optional parameters (only include if set)
        if let Some(temp) = self.temperature {
            kwargs.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tok) = self.max_tokens {
            kwargs.insert("max_tokens".to_string(), serde_json::json!(max_tok));
        }
        if let Some(top_p) = self.top_p {
            kwargs.insert("top_p".to_string(), serde_json::json!(top_p));
        }
        if let Some(freq_penalty) = self.frequency_penalty {
            kwargs.insert(
                "frequency_penalty".to_string(),
                serde_json::json!(freq_penalty),
            );
        }
        if let Some(pres_penalty) = self.presence_penalty {
            kwargs.insert(
                "presence_penalty".to_string(),
                serde_json::json!(pres_penalty),
            );
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
}
