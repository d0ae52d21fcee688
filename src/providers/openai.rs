use async_trait::async_trait;
use serde_json::Value;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionTool, ChatCompletionTools,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, FunctionCall,
        FunctionObject,
    },
    Client,
};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{AdspotError, Result};
use crate::interfaces::providers::{LlmProvider, LlmResponse, ToolCall};

#[derive(Clone)]
pub struct OpenAiProvider {
    model: String,
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            model,
            client: Client::with_config(config),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_system_message(system_prompt: &str) -> Result<Option<ChatCompletionRequestMessage>> {
        if system_prompt.is_empty() {
            return Ok(None);
        }
        let message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| AdspotError::Runtime(e.to_string()))?;
        Ok(Some(ChatCompletionRequestMessage::System(message)))
    }

    fn build_user_text_message(prompt: &str) -> Result<ChatCompletionRequestMessage> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                prompt.to_string(),
            ))
            .build()
            .map_err(|e| AdspotError::Runtime(e.to_string()))?;
        Ok(ChatCompletionRequestMessage::User(message))
    }

    fn convert_tools(tools: Vec<Value>) -> Vec<ChatCompletionTools> {
        tools
            .into_iter()
            .filter_map(|tool| {
                let tool_type = tool
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("function");
                if tool_type != "function" {
                    return None;
                }
                let function_obj = tool.get("function").cloned().unwrap_or(tool);
                let name = function_obj.get("name")?.as_str()?.to_string();
                let description = function_obj
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string());
                let parameters = function_obj.get("parameters").cloned();
                let function = FunctionObject {
                    name,
                    description,
                    parameters,
                    strict: None,
                };
                Some(ChatCompletionTools::Function(ChatCompletionTool {
                    function,
                }))
            })
            .collect()
    }

    fn extract_text_from_response(response: &CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .first()
            .ok_or_else(|| AdspotError::Runtime("No choices returned".to_string()))?
            .message
            .content
            .clone()
            .unwrap_or_default();
        Ok(message)
    }

    fn extract_tool_calls_from_response(response: &CreateChatCompletionResponse) -> Vec<ToolCall> {
        let mut calls = Vec::new();
        let Some(choice) = response.choices.first() else {
            return calls;
        };
        let message = &choice.message;
        if let Some(tool_calls) = &message.tool_calls {
            for call in tool_calls {
                match call {
                    ChatCompletionMessageToolCalls::Function(function_call) => {
                        calls.push(ToolCall {
                            name: function_call.function.name.clone(),
                            arguments: function_call.function.arguments.clone(),
                        });
                    }
                    ChatCompletionMessageToolCalls::Custom(custom_call) => {
                        calls.push(ToolCall {
                            name: custom_call.custom_tool.name.clone(),
                            arguments: custom_call.custom_tool.input.clone(),
                        });
                    }
                }
            }
        }

        // Older deployments still answer with the single `function_call` field.
        if calls.is_empty() {
            #[allow(deprecated)]
            if let Some(FunctionCall { name, arguments }) = &message.function_call {
                calls.push(ToolCall {
                    name: name.clone(),
                    arguments: arguments.clone(),
                });
            }
        }

        calls
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate_with_tools(
        &self,
        prompt: &str,
        system_prompt: &str,
        tools: Vec<Value>,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::new();
        if let Some(system) = Self::build_system_message(system_prompt)? {
            messages.push(system);
        }
        messages.push(Self::build_user_text_message(prompt)?);

        let tools = Self::convert_tools(tools);
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.clone());
        builder.messages(messages);
        if !tools.is_empty() {
            builder.tools(tools);
        }

        let request = builder
            .build()
            .map_err(|e| AdspotError::Runtime(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AdspotError::Http(e.to_string()))?;

        let text = Self::extract_text_from_response(&response)?;
        let tool_calls = Self::extract_tool_calls_from_response(&response);
        tracing::debug!(
            model = %self.model,
            tool_calls = tool_calls.len(),
            "chat completion received"
        );

        Ok(LlmResponse { text, tool_calls })
    }
}
