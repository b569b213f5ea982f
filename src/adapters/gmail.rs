use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::html::{attr, css, first_match, text_content};
use super::{build_record, DocumentSnapshot, MessageAdapter, Platform};
use crate::message::MessageRecord;

static BODY: Lazy<[Selector; 2]> = Lazy::new(|| [css(".a3s.aiL"), css("[data-message-id]")]);
static SUBJECT: Lazy<[Selector; 1]> = Lazy::new(|| [css(".hP")]);
static SENDER: Lazy<[Selector; 1]> = Lazy::new(|| [css(".gD")]);

#[derive(Debug, Clone, Copy, Default)]
pub struct GmailAdapter;

impl MessageAdapter for GmailAdapter {
    fn platform(&self) -> Platform {
        Platform::Gmail
    }

    fn extract_candidate(&self, doc: &DocumentSnapshot) -> Option<MessageRecord> {
        let page = Html::parse_document(&doc.html);
        let body = first_match(&page, &*BODY)?;
        let subject = first_match(&page, &*SUBJECT)
            .map(text_content)
            .unwrap_or_default();
        // Gmail puts the bare address in an `email` attribute.
        let sender = first_match(&page, &*SENDER)
            .map(|e| attr(e, "email").unwrap_or_else(|| text_content(e)))
            .unwrap_or_default();
        Some(build_record(
            attr(body, "data-message-id"),
            body,
            subject,
            sender,
        ))
    }
}
