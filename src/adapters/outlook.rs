use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::html::{css, first_match, text_content};
use super::{build_record, DocumentSnapshot, MessageAdapter, Platform};
use crate::message::MessageRecord;

static BODY: Lazy<[Selector; 2]> =
    Lazy::new(|| [css(r#"[role="document"]"#), css(".rps_9d28")]);
static SUBJECT: Lazy<[Selector; 1]> = Lazy::new(|| [css(r#"[role="heading"]"#)]);
static SENDER: Lazy<[Selector; 1]> = Lazy::new(|| [css(".K0PfK")]);

/// Outlook exposes no stable message id; records always use the content id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlookAdapter;

impl MessageAdapter for OutlookAdapter {
    fn platform(&self) -> Platform {
        Platform::Outlook
    }

    fn extract_candidate(&self, doc: &DocumentSnapshot) -> Option<MessageRecord> {
        let page = Html::parse_document(&doc.html);
        let body = first_match(&page, &*BODY)?;
        let subject = first_match(&page, &*SUBJECT)
            .map(text_content)
            .unwrap_or_default();
        let sender = first_match(&page, &*SENDER)
            .map(text_content)
            .unwrap_or_default();
        Some(build_record(None, body, subject, sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_page_same_id() {
        let page = r#"
            <div role="heading">Invoice &#35;42</div>
            <span class="K0PfK">billing@vendor.example</span>
            <div class="rps_9d28"><div>Invoice attached.</div></div>"#;
        let doc = DocumentSnapshot::new("https://outlook.office.com/mail/", page);
        let a = OutlookAdapter.extract_candidate(&doc).unwrap();
        let b = OutlookAdapter.extract_candidate(&doc).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.subject, "Invoice #42");
        assert_eq!(a.sender, "billing@vendor.example");
        assert_eq!(a.body, "Invoice attached.");
    }

    #[test]
    fn role_document_wins_over_class() {
        let page = r#"<div class="rps_9d28">second</div><div role="document">first</div>"#;
        let rec = OutlookAdapter
            .extract_candidate(&DocumentSnapshot::new("https://outlook.live.com", page))
            .unwrap();
        assert_eq!(rec.body, "first");
    }
}
