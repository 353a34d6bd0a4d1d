use super::UnitBackend;
use crate::{config::Config, error::BackendError};
use std::time::Duration;
use tracing::debug;

const NAME: &str = "google";

/// Google Translate through the public `translate_a/single` endpoint.
pub struct GoogleBackend {
    http: reqwest::blocking::Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleBackend {
    pub fn new(cfg: &Config) -> Result<Self, BackendError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.google.timeout_seconds))
            .pool_max_idle_per_host(cfg.translation.concurrency)
            .build()
            .map_err(|e| BackendError::NotConfigured {
                backend: NAME.into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint: cfg.google.endpoint.clone(),
            source_lang: cfg.translation.source_lang.clone(),
            target_lang: cfg.translation.target_lang.clone(),
        })
    }
}

impl UnitBackend for GoogleBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn translate(&self, text: &str) -> Result<String, BackendError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| BackendError::Transport {
                backend: NAME.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(BackendError::Status {
                backend: NAME.into(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let value: serde_json::Value = resp.json().map_err(|e| BackendError::Malformed {
            backend: NAME.into(),
            reason: e.to_string(),
        })?;
        let out = parse_reply(&value).ok_or_else(|| BackendError::Malformed {
            backend: NAME.into(),
            reason: "no translated segments in reply".into(),
        })?;
        debug!(chars_in = text.len(), chars_out = out.len(), "google translated");
        Ok(out)
    }
}

/// The reply is `[[["seg", "orig", ...], ...], ...]`; the translation is the
/// concatenation of the first element of every segment.
fn parse_reply(value: &serde_json::Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let mut out = String::new();
    for seg in segments {
        if let Some(s) = seg.get(0).and_then(|v| v.as_str()) {
            out.push_str(s);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
