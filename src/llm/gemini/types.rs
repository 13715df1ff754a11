use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequest {
    pub(super) contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub(super) system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) tools: Option<Vec<GeminiTool>>,
    #[serde(rename = "generationConfig")]
    pub(super) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(super) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<&'static str>,
    pub(super) parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize)]
pub(super) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    pub(super) function_call: Option<GeminiFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    pub(super) function_response: Option<GeminiFunctionResponse>,
}

impl Part {
    pub(super) fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    pub(super) fn function_call(function_call: GeminiFunctionCall) -> Self {
        Self {
            function_call: Some(function_call),
            ..Self::default()
        }
    }

    pub(super) fn function_response(function_response: GeminiFunctionResponse) -> Self {
        Self {
            function_response: Some(function_response),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct GeminiFunctionCall {
    pub(super) name: String,
    #[serde(default)]
    pub(super) args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct GeminiFunctionResponse {
    pub(super) name: String,
    pub(super) response: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeminiTool {
    #[serde(rename = "functionDeclarations")]
    pub(super) function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeminiFunctionDeclaration {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) parameters: Value,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerationConfig {
    pub(super) temperature: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub(super) candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub(super) error: Option<ApiError>,
    #[serde(rename = "usageMetadata", default)]
    pub(super) usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub(super) prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    pub(super) candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    #[serde(default)]
    pub(super) content: Option<CandidateContent>,
    #[serde(rename = "finishReason", default)]
    pub(super) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub(super) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponsePart {
    #[serde(default)]
    pub(super) text: Option<String>,
    #[serde(rename = "functionCall", default)]
    pub(super) function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub(super) code: Option<u16>,
    pub(super) message: String,
}
