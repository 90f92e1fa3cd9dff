use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use scraper::Html;
use serde_json::Value;

use crate::core::config::ExtractionSettings;

/// Text recognised on one page of a scanned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtractedElement {
    pub(crate) page: u32,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Extraction {
    pub(crate) elements: Vec<ExtractedElement>,
}

impl Extraction {
    /// Every element's text, each terminated by a newline.
    pub(crate) fn text(&self) -> String {
        self.elements.iter().fold(String::new(), |mut acc, element| {
            acc.push_str(&element.text);
            acc.push('\n');
            acc
        })
    }

    pub(crate) fn page_count(&self) -> usize {
        let mut pages: Vec<u32> = self.elements.iter().map(|element| element.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractionError {
    #[error("document extraction is not configured")]
    Unavailable,
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("document extraction failed: {0:#}")]
    Failed(anyhow::Error),
}

#[async_trait]
pub(crate) trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractionError>;
}

/// Used when no API key is configured.
#[derive(Debug, Default)]
pub(crate) struct UnavailableExtractor;

#[async_trait]
impl DocumentExtractor for UnavailableExtractor {
    async fn extract(&self, _path: &Path) -> Result<Extraction, ExtractionError> {
        Err(ExtractionError::Unavailable)
    }
}

/// Client for the DataLab marker API.
#[derive(Debug, Clone)]
pub(crate) struct DatalabExtractor {
    client: Client,
    api_key: String,
    base_url: String,
    mode: String,
    output_format: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    max_submit_retries: u32,
}

#[derive(Debug, Clone)]
struct MarkerJobRef {
    request_id: String,
    request_check_url: String,
}

#[derive(Debug, Clone, Default)]
struct MarkerOutput {
    markdown: Option<String>,
    chunks: Option<Value>,
}

#[async_trait]
impl DocumentExtractor for DatalabExtractor {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractionError> {
        if self.api_key.is_empty() {
            return Err(ExtractionError::Unavailable);
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ExtractionError::FileNotFound(path.to_path_buf()));
            }
            Err(err) => {
                return Err(ExtractionError::Failed(
                    anyhow::anyhow!(err).context(format!("Failed to read {}", path.display())),
                ));
            }
        };

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let output = self.run_marker(bytes, &file_name).await.map_err(ExtractionError::Failed)?;
        Ok(Extraction { elements: elements_from_output(&output) })
    }
}

impl DatalabExtractor {
    pub(crate) fn from_settings(settings: &ExtractionSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to build DataLab HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            mode: settings.mode.clone(),
            output_format: settings.output_format.clone(),
            poll_interval: Duration::from_secs(settings.poll_interval_seconds),
            max_poll_attempts: settings.max_poll_attempts,
            max_submit_retries: settings.max_submit_retries,
        })
    }

    async fn run_marker(&self, bytes: Vec<u8>, file_name: &str) -> Result<MarkerOutput> {
        let job_ref = self.submit_marker_job(&bytes, file_name).await?;
        tracing::debug!(request_id = %job_ref.request_id, "DataLab marker job submitted");
        self.poll_marker_result(&job_ref).await
    }

    async fn submit_marker_job(&self, bytes: &[u8], file_name: &str) -> Result<MarkerJobRef> {
        let endpoint = format!("{}/marker", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_submit_retries {
            let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
            let form = Form::new()
                .part("file", part)
                .text("mode", self.mode.clone())
                .text("output_format", self.output_format.clone());

            let response = self
                .client
                .post(&endpoint)
                .header("X-Api-Key", &self.api_key)
                .multipart(form)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    let raw_body =
                        resp.text().await.context("Failed to read DataLab marker response")?;
                    let parsed = serde_json::from_str::<Value>(&raw_body).map_err(|err| {
                        anyhow::anyhow!(
                            "DataLab marker returned non-JSON body (status {status}): {err}: {raw_body}"
                        )
                    })?;

                    if !status.is_success() {
                        last_error = Some(anyhow::anyhow!(
                            "DataLab marker submit failed (status {status}): {}",
                            extract_error_message(&parsed)
                        ));
                    } else if reports_failure(&parsed) {
                        last_error = Some(anyhow::anyhow!(
                            "DataLab marker submit returned success=false: {}",
                            extract_error_message(&parsed)
                        ));
                    } else if let Some(job_ref) = extract_marker_job_ref(&self.base_url, &parsed) {
                        return Ok(job_ref);
                    } else {
                        last_error = Some(anyhow::anyhow!(
                            "DataLab marker submit response missing request reference"
                        ));
                    }
                }
                Err(err) => {
                    last_error =
                        Some(anyhow::anyhow!(err).context("Failed to call DataLab marker API"));
                }
            }

            if attempt < self.max_submit_retries {
                tracing::warn!(attempt, "DataLab marker submit failed; retrying");
                tokio::time::sleep(Duration::from_secs(2_u64.saturating_pow(attempt))).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown DataLab submit error")))
    }

    async fn poll_marker_result(&self, job_ref: &MarkerJobRef) -> Result<MarkerOutput> {
        for attempt in 0..self.max_poll_attempts {
            let response = self
                .client
                .get(&job_ref.request_check_url)
                .header("X-Api-Key", &self.api_key)
                .send()
                .await
                .context("Failed to call DataLab marker result endpoint")?;

            let status_code = response.status();
            let raw_body = response.text().await.context("Failed to read DataLab poll response")?;
            let parsed: Value = serde_json::from_str(&raw_body).map_err(|err| {
                anyhow::anyhow!(
                    "DataLab poll returned non-JSON body (status {status_code}): {err}: {raw_body}"
                )
            })?;

            if !status_code.is_success() {
                return Err(anyhow::anyhow!(
                    "DataLab poll failed (status {status_code}): {}",
                    extract_error_message(&parsed)
                ));
            }

            let status = parsed
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "unknown".to_string());

            match status.as_str() {
                "complete" | "completed" => return Ok(extract_result_payload(&parsed)),
                "failed" | "error" => {
                    return Err(anyhow::anyhow!(
                        "DataLab job {} failed: {}",
                        job_ref.request_id,
                        extract_error_message(&parsed)
                    ));
                }
                _ => {}
            }

            if reports_failure(&parsed) {
                return Err(anyhow::anyhow!(
                    "DataLab job {} returned success=false: {}",
                    job_ref.request_id,
                    extract_error_message(&parsed)
                ));
            }

            if attempt + 1 >= self.max_poll_attempts {
                break;
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(anyhow::anyhow!(
            "DataLab polling timed out for request {} after {} attempts",
            job_ref.request_id,
            self.max_poll_attempts
        ))
    }
}

fn reports_failure(payload: &Value) -> bool {
    payload.get("success").and_then(Value::as_bool).is_some_and(|value| !value)
}

fn extract_marker_job_ref(base_url: &str, payload: &Value) -> Option<MarkerJobRef> {
    let request_check_url = extract_request_check_url(base_url, payload);
    let request_id = extract_request_id(payload).or_else(|| {
        request_check_url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next().map(ToString::to_string))
    })?;

    let request_check_url =
        request_check_url.unwrap_or_else(|| format!("{base_url}/marker/{request_id}"));

    Some(MarkerJobRef { request_id, request_check_url })
}

fn extract_request_check_url(base_url: &str, payload: &Value) -> Option<String> {
    let raw = payload.get("request_check_url").and_then(Value::as_str)?;
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let normalized_base = format!("{}/", base_url.trim_end_matches('/'));
    reqwest::Url::parse(&normalized_base)
        .ok()
        .and_then(|base| base.join(raw).ok())
        .map(|url| url.to_string())
}

fn extract_request_id(payload: &Value) -> Option<String> {
    ["request_id", "request_check_id"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(ToString::to_string)
}

fn extract_result_payload(payload: &Value) -> MarkerOutput {
    let container = payload.get("result").unwrap_or(payload);

    let markdown = container
        .get("markdown")
        .or_else(|| payload.get("markdown"))
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let chunks = container.get("chunks").or_else(|| payload.get("chunks")).cloned();

    MarkerOutput { markdown, chunks }
}

fn extract_error_message(payload: &Value) -> String {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}

/// Prefers the structured blocks; falls back to splitting the markdown into pages.
fn elements_from_output(output: &MarkerOutput) -> Vec<ExtractedElement> {
    let from_blocks = output.chunks.as_ref().map(elements_from_chunks).unwrap_or_default();
    if !from_blocks.is_empty() {
        return from_blocks;
    }

    output.markdown.as_deref().map(elements_from_markdown).unwrap_or_default()
}

fn elements_from_chunks(chunks: &Value) -> Vec<ExtractedElement> {
    let blocks = chunks
        .get("blocks")
        .and_then(Value::as_array)
        .or_else(|| chunks.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    blocks
        .iter()
        .filter_map(|block| {
            let page = block
                .get("page")
                .and_then(Value::as_u64)
                .and_then(|page| u32::try_from(page).ok())
                .unwrap_or(0);
            let text = match block.get("html").and_then(Value::as_str) {
                Some(html) => strip_html(html),
                None => block.get("text").and_then(Value::as_str)?.trim().to_string(),
            };
            (!text.is_empty()).then_some(ExtractedElement { page, text })
        })
        .collect()
}

fn elements_from_markdown(markdown: &str) -> Vec<ExtractedElement> {
    let mut pages: Vec<String> = vec![String::new()];
    for line in markdown.split_inclusive('\n') {
        let mut segments = line.split('\u{000c}');
        if let Some(first) = segments.next() {
            if is_page_separator(first) {
                pages.push(String::new());
                continue;
            }
            push_line(&mut pages, first);
        }
        for segment in segments {
            pages.push(String::new());
            push_line(&mut pages, segment);
        }
    }

    pages
        .into_iter()
        .map(|page| page.trim().to_string())
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| ExtractedElement { page: index as u32, text })
        .collect()
}

fn push_line(pages: &mut [String], line: &str) {
    if let Some(current) = pages.last_mut() {
        current.push_str(line);
    }
}

/// Paginated marker output separates pages with `{N}` followed by a run of dashes.
fn is_page_separator(line: &str) -> bool {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('{') else {
        return false;
    };
    let Some((number, dashes)) = rest.split_once('}') else {
        return false;
    };
    !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
        && dashes.len() >= 3
        && dashes.chars().all(|c| c == '-')
}

fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
