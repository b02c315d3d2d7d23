use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use nyaya_core::model::ModelBackend;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Calls a hosted Gemini model through the `generateContent` REST endpoint.
///
/// Stateless: every prompt is a single-turn request. With JSON mode on, the
/// model is asked for `application/json` output so replies parse directly.
pub struct GeminiBackend {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub json_mode: bool,
    pub timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
            json_mode: true,
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(parsed: GenerateResponse) -> Result<String> {
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        match parsed.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => bail!("gemini blocked the prompt: {reason}"),
            None => bail!("gemini returned no candidates"),
        }
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        bail!("gemini returned an empty reply (finish reason: {reason})");
    }
    Ok(text)
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.json_mode.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        info!(
            model = %self.model,
            base_url = %self.base_url,
            json_mode = self.json_mode,
            prompt_len = prompt.len(),
            "calling gemini generateContent"
        );

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()?;

        let response = match client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(
                    model = %self.model,
                    timeout_secs = self.timeout_secs,
                    "gemini request timed out"
                );
                bail!("gemini request timed out after {}s", self.timeout_secs);
            },
            Err(e) => {
                warn!(model = %self.model, "gemini request failed: {}", e);
                bail!("gemini request failed: {e}");
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model = %self.model, status = %status, "gemini returned non-200: {}", body);
            bail!("gemini error {status}: {body}");
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("failed to parse gemini response")?;
        let output = extract_text(parsed)?;

        info!(
            model = %self.model,
            output_len = output.len(),
            "gemini response received"
        );
        Ok(output)
    }

    fn name(&self) -> String {
        format!("gemini:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_joins_parts() {
        let parsed = response(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        );
        assert_eq!(extract_text(parsed).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_reports_block_reason() {
        let parsed = response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_text(parsed).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_rejects_empty_candidate() {
        let parsed = response(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#);
        let err = extract_text(parsed).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let backend = GeminiBackend::new("k", "gemini-1.5-flash").with_base_url("http://x/");
        assert_eq!(
            backend.endpoint(),
            "http://x/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
