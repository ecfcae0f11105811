//! Release-notes drafting through an Azure OpenAI chat completions deployment
//!
//! Inputs arrive base64-encoded and are passed through untouched; the model is
//! told to decode them itself.

use super::commands::ReleaseNotesArgs;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT_SECS: u64 = 300;

const SYSTEM_PROMPT: &str = "You are a professional technical writer and code expert specializing \
in generating concise and consistent release notes for software releases based on inputs from \
Base64-encoded git diff, commit messages, pull-request messages, and titles. Decode the Base64 \
strings before analyzing it.";

/// Connection settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureOpenAiSettings {
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub auth_header_name: String,
    pub auth_header_value: String,
}

impl AzureOpenAiSettings {
    pub fn from_env() -> Result<Self> {
        let endpoint = required_var("AZURE_OPENAI_ENDPOINT")?;
        let deployment = required_var("AZURE_OPENAI_DEPLOYMENT_NAME")?;
        let api_version = required_var("AZURE_OPENAI_API_VERSION")?;
        let (auth_header_name, auth_header_value) =
            parse_auth_header(&required_var("AUTH_HEADER")?)?;

        Ok(Self {
            endpoint,
            deployment,
            api_version,
            auth_header_name,
            auth_header_value,
        })
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("Missing required environment variable {}", name),
    }
}

/// Splits `"Header-Name: value"` on the first `": "`.
pub fn parse_auth_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(": ") {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("AUTH_HEADER must look like '<Header-Name>: <value>'"),
    }
}

pub fn build_request_body(args: &ReleaseNotesArgs) -> Value {
    let user_prompt = format!(
        "Generate a software release note based on a deep code and feature analyze of this full content. By default Include:\n\
         1. A title: # Release Note, do not include version information as this will be added automaticly within GitHub.\n\
         2. A top section ##Summary.\n\
         3. Sections for ### New Features, ### Bug Fixes and ### Improvements if relevant, this default structure can be overriden by the Additional context below.\n\
         - Additional context: {}\n\
         - Git diff base64: {}\n\
         - Commit messages base64: {}\n\
         - PR titles base64: {}",
        args.context, args.git_diff, args.commit_messages, args.pr_titles
    );

    let mut body = json!({
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": user_prompt }
        ],
        "temperature": args.temperature,
        "max_tokens": args.max_tokens,
        "top_p": args.top_p,
        "frequency_penalty": args.frequency_penalty,
        "presence_penalty": args.presence_penalty,
    });

    if args.response_format != "text" {
        body["response_format"] = json!({ "type": args.response_format });
    }
    if let Some(seed) = args.seed {
        body["seed"] = json!(seed);
    }

    body
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub fn extract_content(response_body: &str) -> Result<String> {
    let completion: ChatCompletion =
        serde_json::from_str(response_body).context("Failed to parse chat completion response")?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .context("Chat completion response contained no message content")
}

pub struct ReleaseNotesClient {
    settings: AzureOpenAiSettings,
    http_client: reqwest::blocking::Client,
}

impl ReleaseNotesClient {
    pub fn new(settings: AzureOpenAiSettings) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    pub fn generate(&self, args: &ReleaseNotesArgs) -> Result<String> {
        let url = self.settings.completions_url();
        let body = build_request_body(args);
        debug!(deployment = %self.settings.deployment, "Requesting release notes");

        let response = self
            .http_client
            .post(&url)
            .header(
                self.settings.auth_header_name.as_str(),
                self.settings.auth_header_value.as_str(),
            )
            .json(&body)
            .send()
            .with_context(|| format!("Failed to reach {}", self.settings.endpoint))?;

        let status = response.status();
        let text = response
            .text()
            .context("Failed to read chat completion response body")?;

        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Error: {}\n{}", status.as_u16(), text);
        }

        extract_content(&text)
    }
}

pub fn write_notes(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write release notes to {}", path.display()))?;
    info!("Release notes written to {}", path.display());
    Ok(())
}
