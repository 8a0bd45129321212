// ABOUTME: Downloads a dataset distribution under a deadline and renders a short preview
// ABOUTME: JSON payloads show their first items, everything else its first lines

use schemagov_mcp_core::{PreviewConfig, Result, SchemaGovError};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

const TRUNCATION_MARKER: &str = "\n... (truncated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    pub max_json_items: usize,
    pub max_text_lines: usize,
    pub max_fallback_chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_json_items: 10,
            max_text_lines: 15,
            max_fallback_chars: 2000,
        }
    }
}

impl From<&PreviewConfig> for PreviewLimits {
    fn from(config: &PreviewConfig) -> Self {
        Self {
            max_json_items: config.max_json_items,
            max_text_lines: config.max_text_lines,
            max_fallback_chars: config.max_fallback_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub text: String,
    /// JSON items or text lines shown; zero for the truncated fallback
    pub items: usize,
}

/// Raw body plus the header that decides how it is rendered
#[derive(Debug, Clone)]
pub struct FetchedDistribution {
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct DistributionPreviewer {
    http: reqwest::Client,
    timeout: Duration,
    limits: PreviewLimits,
}

impl DistributionPreviewer {
    pub fn new(http: reqwest::Client, timeout: Duration, limits: PreviewLimits) -> Self {
        Self {
            http,
            timeout,
            limits,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &PreviewConfig) -> Self {
        Self::new(http, Duration::from_secs(config.timeout_secs), config.into())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET the URL. The deadline covers the whole exchange including the body.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDistribution> {
        let exchange = async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| SchemaGovError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SchemaGovError::DistributionFetch {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = response
                .text()
                .await
                .map_err(|e| SchemaGovError::Transport(e.to_string()))?;

            Ok(FetchedDistribution { content_type, body })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(SchemaGovError::Timeout(self.timeout)),
        }
    }

    pub async fn preview(&self, url: &str) -> Result<Preview> {
        let fetched = self.fetch(url).await?;
        debug!(
            url = url,
            content_type = %fetched.content_type,
            bytes = fetched.body.len(),
            "Fetched distribution"
        );
        Ok(self.render(url, &fetched))
    }

    pub fn render(&self, url: &str, fetched: &FetchedDistribution) -> Preview {
        if is_json(&fetched.content_type, url) {
            render_json(&fetched.body, &self.limits)
        } else {
            render_text(&fetched.body, self.limits.max_text_lines)
        }
    }
}

pub fn is_json(content_type: &str, url: &str) -> bool {
    content_type.contains("json") || url.ends_with(".json")
}

/// Truthiness as seen by loosely typed JSON consumers
fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn unwrap_items(json: JsonValue) -> JsonValue {
    if json.is_array() {
        return json;
    }
    for field in ["results", "data"] {
        if let Some(inner) = json.get(field).filter(|v| truthy(v)) {
            return inner.clone();
        }
    }
    JsonValue::Array(vec![json])
}

fn render_json(body: &str, limits: &PreviewLimits) -> Preview {
    let items = match serde_json::from_str::<JsonValue>(body).map(unwrap_items) {
        Ok(JsonValue::Array(items)) => items,
        _ => return render_fallback(body, limits.max_fallback_chars),
    };

    let shown: Vec<JsonValue> = items.into_iter().take(limits.max_json_items).collect();
    match serde_json::to_string_pretty(&shown) {
        Ok(text) => Preview {
            text,
            items: shown.len(),
        },
        Err(_) => render_fallback(body, limits.max_fallback_chars),
    }
}

fn render_fallback(body: &str, max_chars: usize) -> Preview {
    let mut text: String = body.chars().take(max_chars).collect();
    text.push_str(TRUNCATION_MARKER);
    Preview { text, items: 0 }
}

fn render_text(body: &str, max_lines: usize) -> Preview {
    let lines: Vec<&str> = body.split('\n').take(max_lines).collect();
    Preview {
        text: lines.join("\n"),
        items: lines.len(),
    }
}
