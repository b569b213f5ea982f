//! Document adapters: turn an observed webmail page into a `MessageRecord`.
//!
//! The platform is picked once from the page URL; everything downstream only
//! sees the `MessageAdapter` capability.

pub mod gmail;
pub mod html;
pub mod outlook;

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use crate::message::{content_id, MessageRecord};

/// One observed state of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub url: String,
    pub html: String,
}

impl DocumentSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Gmail,
    Outlook,
    Unknown,
}

impl Platform {
    pub fn detect(url_or_host: &str) -> Self {
        let lowered = url_or_host.to_ascii_lowercase();
        if lowered.contains("mail.google.com") {
            Platform::Gmail
        } else if lowered.contains("outlook") {
            Platform::Outlook
        } else {
            Platform::Unknown
        }
    }
}

pub trait MessageAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// The message currently displayed, if one can be found.
    fn extract_candidate(&self, doc: &DocumentSnapshot) -> Option<MessageRecord>;
}

pub fn adapter_for(platform: Platform) -> Box<dyn MessageAdapter> {
    match platform {
        Platform::Gmail => Box::new(gmail::GmailAdapter),
        Platform::Outlook => Box::new(outlook::OutlookAdapter),
        Platform::Unknown => Box::new(UnknownAdapter),
    }
}

/// Pages we don't know how to read.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownAdapter;

impl MessageAdapter for UnknownAdapter {
    fn platform(&self) -> Platform {
        Platform::Unknown
    }

    fn extract_candidate(&self, _doc: &DocumentSnapshot) -> Option<MessageRecord> {
        None
    }
}

/// Shared tail of the platform adapters once the elements are located.
pub(crate) fn build_record(
    platform_id: Option<String>,
    body: ElementRef<'_>,
    subject: String,
    sender: String,
) -> MessageRecord {
    let text = html::text_content(body);
    let id = platform_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| content_id(&subject, &sender, &text));
    MessageRecord {
        id,
        subject,
        body: text,
        sender,
        raw_html: body.inner_html(),
        links: html::links(body),
    }
}
