//! Feature extraction: `MessageRecord` → `FeatureVector`.
//!
//! Pure and total. Empty fields yield neutral values (zero counts, `false`,
//! ratio 0). Recomputing from an equal record yields an equal vector.

use serde::Serialize;

use crate::lexicon::{self, Lexicon};
use crate::message::{Link, MessageRecord};

/// Characters counted by `special_char_count`.
const SPECIAL_CHARS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'];

/// Minimum length of an all-caps token.
const ALL_CAPS_MIN_LEN: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    pub urgency_word_count: u32,
    pub credential_word_count: u32,
    pub suspicious_phrase_count: u32,
    pub link_count: u32,
    pub suspicious_link_count: u32,
    pub ip_literal_link_count: u32,
    pub shortened_link_count: u32,
    pub sender_domain_mismatch: bool,
    /// Uppercase ASCII letters ÷ body length, in `[0, 1]`.
    pub capital_letter_ratio: f32,
    pub special_char_count: u32,
    pub all_caps_token_count: u32,
    pub exclamation_count: u32,
    pub subject_length: u32,
    pub body_length: u32,
    pub has_attachment_hint: bool,
}

/// Per-link outcome of the three link checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkFlags {
    pub domain_mismatch: bool,
    pub ip_literal: bool,
    pub shortened: bool,
}

impl LinkFlags {
    pub fn any(&self) -> bool {
        self.domain_mismatch || self.ip_literal || self.shortened
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    lexicon: &'static Lexicon,
}

impl FeatureExtractor {
    pub fn new(lexicon: &'static Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn detection() -> Self {
        Self::new(Lexicon::detection())
    }

    pub fn training() -> Self {
        Self::new(Lexicon::training())
    }

    pub fn extract(&self, record: &MessageRecord) -> FeatureVector {
        let lowered = record.lowered_text();
        let flags = flag_links(&record.links);
        let body = record.body.as_str();

        FeatureVector {
            urgency_word_count: lexicon::count_hits(&self.lexicon.urgency, &lowered),
            credential_word_count: lexicon::count_hits(&self.lexicon.credential, &lowered),
            suspicious_phrase_count: lexicon::count_hits(
                &self.lexicon.suspicious_phrases,
                &lowered,
            ),
            link_count: record.links.len() as u32,
            suspicious_link_count: flags.iter().filter(|f| f.any()).count() as u32,
            ip_literal_link_count: flags.iter().filter(|f| f.ip_literal).count() as u32,
            shortened_link_count: flags.iter().filter(|f| f.shortened).count() as u32,
            sender_domain_mismatch: sender_domain_mismatch(&record.sender, body),
            capital_letter_ratio: capital_letter_ratio(body),
            special_char_count: body.chars().filter(|c| SPECIAL_CHARS.contains(c)).count()
                as u32,
            all_caps_token_count: all_caps_token_count(body),
            exclamation_count: (record.subject.matches('!').count() + body.matches('!').count())
                as u32,
            subject_length: record.subject.chars().count() as u32,
            body_length: body.chars().count() as u32,
            has_attachment_hint: has_attachment_hint(&record.raw_html),
        }
    }
}

/// Run the domain-mismatch, IP-literal and shortener checks on every link.
pub fn flag_links(links: &[Link]) -> Vec<LinkFlags> {
    links.iter().map(flag_link).collect()
}

pub fn flag_link(link: &Link) -> LinkFlags {
    LinkFlags {
        domain_mismatch: text_href_mismatch(link),
        ip_literal: lexicon::is_ip_literal_url(&link.href),
        shortened: lexicon::is_shortened_url(&link.href),
    }
}

/// Hrefs of flagged links, one entry per flagged link, in link order.
pub fn suspicious_links(links: &[Link]) -> Vec<String> {
    links
        .iter()
        .filter(|l| flag_link(l).any())
        .map(|l| l.href.clone())
        .collect()
}

/// Visible text names one domain, the href points at another.
fn text_href_mismatch(link: &Link) -> bool {
    if link.text.is_empty() || link.href.contains(link.text.as_str()) {
        return false;
    }
    match (
        lexicon::extract_domain(&link.text),
        lexicon::extract_domain(&link.href),
    ) {
        (Some(text_domain), Some(href_domain)) => text_domain != href_domain,
        _ => false,
    }
}

/// The body mentions a trusted brand domain the sender's domain doesn't
/// contain. First disqualifying match wins.
fn sender_domain_mismatch(sender: &str, body: &str) -> bool {
    let sender_domain = lexicon::extract_domain(sender).unwrap_or_default();
    let trusted = lexicon::trusted_domains();
    lexicon::domains_in_text(body)
        .iter()
        .any(|d| trusted.contains(d) && !sender_domain.contains(d.as_str()))
}

fn capital_letter_ratio(body: &str) -> f32 {
    let len = body.chars().count();
    if len == 0 {
        return 0.0;
    }
    let caps = body.chars().filter(|c| c.is_ascii_uppercase()).count();
    caps as f32 / len as f32
}

fn all_caps_token_count(body: &str) -> u32 {
    body.split_whitespace()
        .filter(|t| t.len() >= ALL_CAPS_MIN_LEN && t.chars().all(|c| c.is_ascii_uppercase()))
        .count() as u32
}

fn has_attachment_hint(html: &str) -> bool {
    html.contains("attachment") || html.contains("download")
}
