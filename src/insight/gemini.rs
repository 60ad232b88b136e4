//! A client for the Gemini `generateContent` REST endpoint.

use crate::insight::{Insight, InsightRequest};
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// `endpoint` is the API base, e.g. `https://generativelanguage.googleapis.com`.
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait::async_trait]
impl Insight for GeminiClient {
    async fn generate(&self, request: &InsightRequest) -> Result<String> {
        let url = self.url();
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::from(request))
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Unable to read the model response")?;
        trace!("Model response ({status}): {body}");
        if !status.is_success() {
            bail!("The model endpoint returned {status}: {body}");
        }
        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Unable to parse the model response")?;
        parsed.text()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl From<&InsightRequest> for GenerateRequest {
    fn from(request: &InsightRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// The text parts of the first candidate, joined.
    fn text(&self) -> Result<String> {
        let Some(content) = self.candidates.first().and_then(|c| c.content.as_ref()) else {
            match &self.prompt_feedback {
                Some(feedback) => bail!("The model returned no answer: {feedback}"),
                None => bail!("The model returned no answer"),
            }
        };
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            bail!("The model answer contained no text");
        }
        Ok(text)
    }
}
