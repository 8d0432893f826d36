//! Inbound email representation.
//!
//! [`EmailMessage`] is the single input type of the parsing core. It is
//! populated by the external ingestion boundary (Gmail add-on or webhook)
//! and treated as immutable here. Missing fields are `None`; extractors
//! must treat absence as "no data", never as an empty-string mismatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inbound email as delivered by the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Subject line. May be empty.
    #[serde(default)]
    pub subject: String,
    /// Raw sender header, e.g. `"Jane Street Recruiting <nyc-programs@janestreet.com>"`.
    #[serde(default)]
    pub sender: String,
    /// HTML body, if the message carried one.
    #[serde(default)]
    pub html_body: Option<String>,
    /// Plain-text body, if the message carried one.
    #[serde(default)]
    pub text_body: Option<String>,
    /// Delivery timestamp, if the ingestion boundary recorded one.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl EmailMessage {
    /// Whether the message carries any parseable content at all.
    ///
    /// An email violating this is not an error: the pipeline degrades to
    /// absent fields with confidence 0.
    pub fn has_content(&self) -> bool {
        !self.subject.trim().is_empty()
            || self.text_body.as_deref().is_some_and(|b| !b.trim().is_empty())
            || self.html_body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }

    /// Best-effort body text: the plain-text body, else the HTML body with
    /// tags stripped, else empty.
    pub fn body_text(&self) -> String {
        if let Some(text) = self.text_body.as_deref() {
            if !text.trim().is_empty() {
                return text.to_owned();
            }
        }
        self.html_body
            .as_deref()
            .map(strip_html_tags)
            .unwrap_or_default()
    }

    /// Lowercased subject + body, used for indicator scanning.
    pub fn searchable_text(&self) -> String {
        let mut text = self.subject.to_lowercase();
        let body = self.body_text();
        if !body.is_empty() {
            text.push(' ');
            text.push_str(&body.to_lowercase());
        }
        text
    }

    /// Domain part of the sender address, e.g. `"janestreet.com"`.
    ///
    /// Handles both bare addresses and `Display Name <addr>` headers.
    pub fn sender_domain(&self) -> Option<String> {
        let addr = match (self.sender.find('<'), self.sender.find('>')) {
            (Some(start), Some(end)) if start < end => {
                &self.sender[start.saturating_add(1)..end]
            }
            _ => self.sender.as_str(),
        };
        let domain = addr.rsplit('@').next().filter(|d| *d != addr)?;
        let domain = domain.trim();
        if domain.is_empty() || !domain.contains('.') {
            return None;
        }
        Some(domain.to_lowercase())
    }

    /// Display-name part of the sender header, if present and non-trivial.
    pub fn sender_display_name(&self) -> Option<String> {
        let start = self.sender.find('<')?;
        let name = self.sender[..start].trim().trim_matches('"').trim();
        if name.is_empty() || name.contains('@') {
            return None;
        }
        Some(name.to_owned())
    }
}

/// Strip HTML tags, keeping text content with single-space separation.
///
/// A small state machine is enough here: bodies are scanned for phrases,
/// not rendered, so entity decoding is limited to the few that matter.
pub fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                // Tag boundaries separate words ("<p>Hi</p><p>there</p>").
                if !out.ends_with(' ') && !out.is_empty() {
                    out.push(' ');
                }
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
}
