//! # Lexicon & pattern library
//! Static term lists (urgency, credential requests, suspicious phrases) plus
//! the URL/domain matchers shared by feature extraction and reason generation.
//!
//! Term lists live in `phishing_lexicon.json` and are embedded at compile time.
//! Matching is plain case-insensitive substring containment, not word-boundary
//! tokenization: "expire" also hits "expired" and "expires".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LexiconFile {
    detection: Lexicon,
    training: Lexicon,
    shorteners: Vec<String>,
    trusted_domains: Vec<String>,
}

static LEXICONS: Lazy<LexiconFile> = Lazy::new(|| {
    let raw = include_str!("../phishing_lexicon.json");
    serde_json::from_str::<LexiconFile>(raw).expect("valid phishing lexicon")
});

static RE_IP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid ip-url regex")
});

static RE_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:@|https?://)([^/\s>]+)").expect("valid domain regex"));

static RE_TEXT_DOMAINS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:@|https?://)([a-z0-9.-]+\.[a-z]{2,})").expect("valid text-domain regex")
});

/// One family of term lists. Detection mode and training mode use different
/// urgency vocabularies, so each gets its own instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Lexicon {
    pub urgency: Vec<String>,
    pub credential: Vec<String>,
    pub suspicious_phrases: Vec<String>,
}

impl Lexicon {
    /// Terms used when classifying real messages.
    pub fn detection() -> &'static Lexicon {
        &LEXICONS.detection
    }

    /// Terms used when scoring user-authored text in attack/training mode.
    pub fn training() -> &'static Lexicon {
        &LEXICONS.training
    }
}

/// Number of distinct `terms` contained in `lowered`. A term counts once no
/// matter how often it repeats. `lowered` must already be lower-cased.
pub fn count_hits(terms: &[String], lowered: &str) -> u32 {
    terms.iter().filter(|t| lowered.contains(t.as_str())).count() as u32
}

/// `http(s)://` followed by a dotted quad in the authority position.
pub fn is_ip_literal_url(href: &str) -> bool {
    RE_IP_URL.is_match(href)
}

/// Literal containment of any known shortener domain.
pub fn is_shortened_url(href: &str) -> bool {
    LEXICONS
        .shorteners
        .iter()
        .any(|s| href.contains(s.as_str()))
}

pub fn trusted_domains() -> &'static [String] {
    &LEXICONS.trusted_domains
}

/// First `@host` or `scheme://host` token of `text`, lower-cased.
pub fn extract_domain(text: &str) -> Option<String> {
    RE_DOMAIN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
}

/// Every `@domain.tld` / `http(s)://domain.tld` token in `text`, lower-cased,
/// deduplicated, in first-seen order.
pub fn domains_in_text(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in RE_TEXT_DOMAINS.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let d = m.as_str().to_ascii_lowercase();
            if !out.contains(&d) {
                out.push(d);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_lexicon_parses() {
        assert_eq!(Lexicon::detection().urgency.len(), 13);
        assert_eq!(Lexicon::training().urgency.len(), 10);
        assert!(trusted_domains().iter().any(|d| d == "paypal.com"));
    }

    #[test]
    fn hits_are_distinct_not_repeated() {
        let terms = vec!["urgent".to_string(), "act now".to_string()];
        assert_eq!(count_hits(&terms, "urgent urgent urgent"), 1);
        assert_eq!(count_hits(&terms, "urgent: act now"), 2);
        assert_eq!(count_hits(&terms, "nothing here"), 0);
    }

    #[test]
    fn ip_literal_only_in_authority_position() {
        assert!(is_ip_literal_url("http://203.0.113.5/login"));
        assert!(is_ip_literal_url("HTTPS://10.0.0.1"));
        assert!(!is_ip_literal_url("https://example.com/?ip=10.0.0.1"));
        assert!(!is_ip_literal_url("ftp://10.0.0.1"));
    }

    #[test]
    fn shortener_is_substring_containment() {
        assert!(is_shortened_url("http://bit.ly/abc"));
        assert!(is_shortened_url("https://tinyurl.com/x"));
        assert!(!is_shortened_url("https://example.com/path"));
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(
            extract_domain("noreply@Paypal-Security-Update.com").as_deref(),
            Some("paypal-security-update.com")
        );
        assert_eq!(
            extract_domain("PayPal <service@paypal.com>").as_deref(),
            Some("paypal.com")
        );
        assert_eq!(
            extract_domain("https://www.amazon.com/orders").as_deref(),
            Some("www.amazon.com")
        );
        assert_eq!(extract_domain("Click here"), None);
    }

    #[test]
    fn text_domains_are_deduplicated_in_order() {
        let body = "Visit https://paypal.com/a or mail help@PAYPAL.com, see http://amazon.com";
        assert_eq!(
            domains_in_text(body),
            vec!["paypal.com".to_string(), "amazon.com".to_string()]
        );
    }
}
