use crate::constants::{defaults, endpoints, headers};
use crate::error::{HeyError, Result};
use crate::llm::traits::*;
use futures::channel::mpsc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for DuckDuckGo AI Chat.
///
/// The continuation token is DuckDuckGo's `x-vqd-4` value: it is fetched from
/// the status endpoint for a new conversation and rotated by every chat reply.
pub struct DuckChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl DuckChatClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: endpoints::DUCKDUCKGO_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn common_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        map.insert("Cookie", HeaderValue::from_static("dsc=1;dcm=3"));
        map.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
        map.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
        map.insert("Sec-Fetch-Site", HeaderValue::from_static("same-origin"));
        map
    }

    /// Ask the status endpoint for a fresh conversation token.
    pub async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoints::STATUS_PATH);
        debug!(%url, "requesting new conversation token");

        let response = self
            .client
            .get(&url)
            .headers(Self::common_headers())
            .header(CACHE_CONTROL, "no-store")
            .header(headers::VQD_ACCEPT, "1")
            .header(ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .timeout(Duration::from_secs(defaults::STATUS_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HeyError::remote(format!(
                "DuckDuckGo status error ({status}): {text}"
            )));
        }

        vqd_header(response.headers())
            .ok_or_else(|| HeyError::remote("No conversation token returned by status endpoint"))
    }
}

#[derive(Debug, Serialize, Default)]
struct ChatTools {
    #[serde(rename = "NewsSearch")]
    news_search: bool,
    #[serde(rename = "VideosSearch")]
    videos_search: bool,
    #[serde(rename = "LocalSearch")]
    local_search: bool,
    #[serde(rename = "WeatherForecast")]
    weather_forecast: bool,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChatMetadata {
    tool_choice: ChatTools,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DuckChatPayload<'a> {
    model: &'a str,
    messages: &'a [Message],
    metadata: ChatMetadata,
    can_use_tools: bool,
}

#[derive(Debug, Deserialize)]
struct DuckChatChunk {
    action: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    status: Option<u16>,
}

fn vqd_header(map: &HeaderMap) -> Option<String> {
    map.get(headers::VQD)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Interpret one line of the event stream. Blank, foreign and unparseable
/// lines yield `None`.
pub(crate) fn parse_sse_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let data = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);
    if data == "[DONE]" {
        return Some(StreamEvent::Done);
    }

    let chunk: DuckChatChunk = serde_json::from_str(data).ok()?;
    match chunk.action.as_deref() {
        Some("success") => chunk
            .message
            .filter(|m| !m.is_empty())
            .map(StreamEvent::TextDelta),
        Some("error") => {
            let kind = chunk.error_type.unwrap_or_else(|| "unknown".to_string());
            Some(StreamEvent::Error(match chunk.status {
                Some(status) => format!("{status} - {kind}"),
                None => kind,
            }))
        }
        _ => None,
    }
}

/// Raw body bytes waiting to become lines. Bytes are decoded only once a
/// line is complete, so a character split across chunks stays intact.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Whatever is left after the body ends, newline or not.
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Send the event for one line. False once the stream has finished or the
/// receiver is gone.
fn forward_line(tx: &mpsc::UnboundedSender<StreamEvent>, line: &str) -> bool {
    let Some(event) = parse_sse_line(line) else {
        return true;
    };
    let finished = !matches!(event, StreamEvent::TextDelta(_));
    if tx.unbounded_send(event).is_err() {
        debug!("stream receiver dropped, stopping");
        return false;
    }
    !finished
}

#[async_trait::async_trait]
impl ChatClient for DuckChatClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        let token = match request.continuation_token {
            Some(token) => token,
            None => self.fetch_token().await?,
        };

        let url = format!("{}{}", self.base_url, endpoints::CHAT_PATH);
        let payload = DuckChatPayload {
            model: &request.model,
            messages: &request.messages,
            metadata: ChatMetadata::default(),
            can_use_tools: false,
        };

        debug!(messages = request.messages.len(), model = %request.model, "sending chat request");
        let response = self
            .client
            .post(&url)
            .headers(Self::common_headers())
            .header(headers::VQD, token)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header("Referer", format!("{}/", self.base_url))
            .header("Origin", self.base_url.as_str())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(HeyError::remote(format!(
                "DuckDuckGo chat error ({status}): {text}"
            )));
        }

        let continuation_token = vqd_header(response.headers());
        if continuation_token.is_none() {
            warn!("No new conversation token returned");
        }

        let (tx, rx) = mpsc::unbounded();

        let mut stream = response.bytes_stream();
        tokio::spawn(async move {
            use futures::StreamExt;
            let mut lines = LineBuffer::default();

            debug!("starting response stream");
            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.unbounded_send(StreamEvent::Error(e.to_string()));
                        return;
                    }
                };

                lines.push(&chunk);
                while let Some(line) = lines.next_line() {
                    if !forward_line(&tx, &line) {
                        return;
                    }
                }
            }

            if let Some(line) = lines.finish() {
                if !forward_line(&tx, &line) {
                    return;
                }
            }
            // Closing without Done lets the session report the truncation.
            debug!("response stream closed before [DONE]");
        });

        Ok(ChatStream {
            continuation_token,
            events: rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_chunk() {
        let event = parse_sse_line(r#"data: {"action":"success","message":"Hel","role":"assistant"}"#);
        assert_eq!(event, Some(StreamEvent::TextDelta("Hel".to_string())));
    }

    #[test]
    fn test_parse_done_marker() {
        assert_eq!(parse_sse_line("data: [DONE]"), Some(StreamEvent::Done));
        assert_eq!(parse_sse_line("data: [DONE]\r\n"), Some(StreamEvent::Done));
    }

    #[test]
    fn test_parse_error_chunk() {
        let event = parse_sse_line(
            r#"data: {"action":"error","type":"ERR_INVALID_VQD","status":418}"#,
        );
        assert_eq!(
            event,
            Some(StreamEvent::Error("418 - ERR_INVALID_VQD".to_string()))
        );
    }

    #[test]
    fn test_parse_skips_noise() {
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line("   "), None);
        assert_eq!(parse_sse_line("data: not json"), None);
        assert_eq!(parse_sse_line(r#"data: {"action":"success","message":""}"#), None);
        assert_eq!(parse_sse_line(r#"data: {"role":"assistant"}"#), None);
    }

    #[test]
    fn test_payload_shape() {
        let messages = vec![Message::user("hi")];
        let payload = DuckChatPayload {
            model: "m",
            messages: &messages,
            metadata: ChatMetadata::default(),
            can_use_tools: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["canUseTools"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["metadata"]["toolChoice"]["NewsSearch"], false);
    }

    #[test]
    fn test_line_buffer_keeps_split_characters() {
        let bytes = "data: café\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut lines = LineBuffer::default();
        lines.push(&bytes[..split]);
        assert_eq!(lines.next_line(), None);
        lines.push(&bytes[split..]);
        assert_eq!(lines.next_line().as_deref(), Some("data: café\n"));
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_line_buffer_finish_returns_unterminated_tail() {
        let mut lines = LineBuffer::default();
        lines.push(b"data: one\ndata: [DO");
        lines.push(b"NE]");
        assert_eq!(lines.next_line().as_deref(), Some("data: one\n"));
        assert_eq!(lines.next_line(), None);
        assert_eq!(lines.finish().as_deref(), Some("data: [DONE]"));
    }

    #[test]
    fn test_vqd_header_ignores_blank_values() {
        let mut map = HeaderMap::new();
        assert_eq!(vqd_header(&map), None);
        map.insert(headers::VQD, HeaderValue::from_static("  "));
        assert_eq!(vqd_header(&map), None);
        map.insert(headers::VQD, HeaderValue::from_static("4-abc"));
        assert_eq!(vqd_header(&map).as_deref(), Some("4-abc"));
    }
}
