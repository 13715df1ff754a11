//! Google Gemini `generateContent` provider.
//!
//! Maps the conversation onto Gemini `contents`, advertises the tool
//! catalogue as function declarations and parses the first candidate back
//! into text plus tool-call requests.

use crate::agent::{Conversation, Turn};
use crate::error::LlmError;
use crate::llm::{
    build_provider_client, sanitize_api_error,
    traits::Provider,
    types::{ModelResponse, ToolCallRequest, UsageMetadata},
};
use crate::tools::{ToolResult, ToolSpec};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;

mod types;
use types::{
    Content, GeminiFunctionCall, GeminiFunctionDeclaration, GeminiFunctionResponse, GeminiTool,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, ResponsePart,
};

const PROVIDER: &str = "gemini";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.0,
            client: build_provider_client(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            Self::model_name(&self.model),
            self.api_key
        )
    }

    fn map_turn(turn: &Turn) -> Content {
        match turn {
            Turn::User { text } => Content {
                role: Some("user"),
                parts: vec![Part::text(text.clone())],
            },
            Turn::Model { text } => Content {
                role: Some("model"),
                parts: vec![Part::text(text.clone())],
            },
            Turn::ToolCalls { calls } => Content {
                role: Some("model"),
                parts: calls
                    .iter()
                    .map(|call| {
                        Part::function_call(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: Value::Object(call.arguments.clone()),
                            id: call.id.clone(),
                        })
                    })
                    .collect(),
            },
            Turn::ToolResponse { id, name, result } => {
                let response = match result {
                    ToolResult::Ok(text) => json!({ "result": text }),
                    ToolResult::Error(message) => json!({ "error": message }),
                };
                Content {
                    role: Some("user"),
                    parts: vec![Part::function_response(GeminiFunctionResponse {
                        name: name.clone(),
                        response,
                        id: id.clone(),
                    })],
                }
            }
        }
    }

    fn build_gemini_tools(tools: &[ToolSpec]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }
        Some(vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }])
    }

    fn build_request(
        conversation: &Conversation,
        tools: &[ToolSpec],
        system_instruction: Option<&str>,
        temperature: f64,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: conversation.turns().iter().map(Self::map_turn).collect(),
            system_instruction: system_instruction.map(|system| Content {
                role: None,
                parts: vec![Part::text(system.to_string())],
            }),
            tools: Self::build_gemini_tools(tools),
            generation_config: GenerationConfig { temperature },
        }
    }

    fn request_error(message: impl AsRef<str>) -> LlmError {
        LlmError::Request {
            provider: PROVIDER.to_string(),
            message: sanitize_api_error(message.as_ref()),
        }
    }

    fn transport_error(error: reqwest::Error) -> LlmError {
        // The URL carries the key in its query string.
        Self::request_error(error.without_url().to_string())
    }

    async fn call_api(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_auth_failure(status, &body) {
                tracing::debug!(%status, body = %sanitize_api_error(&body), "gemini rejected credentials");
                return Err(LlmError::Auth {
                    provider: PROVIDER.to_string(),
                });
            }
            return Err(Self::request_error(format!(
                "Gemini API error ({status}): {body}"
            )));
        }

        let result: GenerateContentResponse =
            response.json().await.map_err(Self::transport_error)?;

        if let Some(err) = result.error.as_ref() {
            let code = err.code.map(|c| format!(" ({c})")).unwrap_or_default();
            return Err(Self::request_error(format!(
                "Gemini API error{code}: {}",
                err.message
            )));
        }

        Ok(result)
    }

    fn parse_response(result: GenerateContentResponse) -> Result<ModelResponse, LlmError> {
        let usage = result.usage_metadata.map(|usage| UsageMetadata {
            prompt_token_count: usage.prompt_token_count,
            candidates_token_count: usage.candidates_token_count,
        });

        let candidate = result
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })?;

        if let Some(reason) = candidate.finish_reason.as_deref()
            && reason != "STOP"
        {
            tracing::debug!(finish_reason = reason, "gemini candidate finished early");
        }

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let (text, tool_calls) = Self::split_parts(parts);

        Ok(ModelResponse {
            text,
            tool_calls,
            usage,
        })
    }

    fn split_parts(parts: Vec<ResponsePart>) -> (Option<String>, Vec<ToolCallRequest>) {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for part in parts {
            if let Some(chunk) = part.text {
                text.push_str(&chunk);
            }
            if let Some(function_call) = part.function_call {
                tool_calls.push(ToolCallRequest {
                    id: function_call.id,
                    name: function_call.name,
                    arguments: arguments_map(function_call.args),
                });
            }
        }

        ((!text.is_empty()).then_some(text), tool_calls)
    }
}

fn arguments_map(args: Value) -> Map<String, Value> {
    match args {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("input".to_string(), other);
            wrapped
        }
    }
}

fn is_auth_failure(status: StatusCode, body: &str) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID"))
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn generate<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        system_instruction: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<ModelResponse, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let request =
                Self::build_request(conversation, tools, system_instruction, self.temperature);
            let result = self.call_api(&request).await?;
            Self::parse_response(result)
        })
    }
}
