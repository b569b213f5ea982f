//! message.rs: normalized representation of one email under analysis.
//!
//! Built once by a document adapter and never mutated afterwards. Two records
//! with the same `id` are the same physical message.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Anchor found in the message body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
}

impl Link {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// Plain text body.
    #[serde(default)]
    pub body: String,
    /// Address or display string, e.g. `PayPal <service@paypal.com>`.
    #[serde(default)]
    pub sender: String,
    #[serde(default, alias = "html")]
    pub raw_html: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl MessageRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn raw_html(mut self, html: impl Into<String>) -> Self {
        self.raw_html = html.into();
        self
    }

    pub fn link(mut self, text: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.push(Link::new(text, href));
        self
    }

    /// Lower-cased `subject + body`, the text all lexicon matching runs on.
    pub fn lowered_text(&self) -> String {
        let mut s = String::with_capacity(self.subject.len() + self.body.len());
        s.push_str(&self.subject);
        s.push_str(&self.body);
        s.to_lowercase()
    }

    /// Short digest of the id, safe to put in logs.
    pub fn log_id(&self) -> String {
        anon_hash(&self.id)
    }
}

/// Id for a message the platform doesn't label: a digest of what was
/// extracted, so re-extracting the same message gives the same id.
pub fn content_id(subject: &str, sender: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [subject, sender, body] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let mut out = String::from("sha256:");
    for b in hasher.finalize().iter().take(16) {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// 6-byte hex digest for logging identifiers without revealing them.
pub(crate) fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
