//! Reason generator: human-readable findings for a classified message.
//!
//! Findings are re-derived straight from the record and its feature vector;
//! the scorer's confidence is never consulted, and the thresholds here are
//! chosen independently of the scorer's. A benign verdict with reasons, or a
//! phishing verdict without any, are both legitimate outcomes.
//!
//! Built-in rules, in evaluation order:
//! 1. urgency hits above `URGENCY_REASON_THRESHOLD`
//! 2. any suspicious link (with count)
//! 3. sender-domain mismatch
//! 4. any link whose href is an IP literal
use super::features::FeatureVector;
use crate::lexicon;
use crate::message::MessageRecord;

/// Not tied to `DetectionWeights::urgency_threshold`.
pub const URGENCY_REASON_THRESHOLD: u32 = 2;

pub const REASON_URGENT: &str =
    "Contains urgent language (e.g., \"act now\", \"urgent action required\")";
pub const REASON_SENDER_MISMATCH: &str = "Sender email domain doesn't match claimed organization";
pub const REASON_IP_LINKS: &str = "Links to IP addresses instead of domain names";

pub fn suspicious_links_reason(n: u32) -> String {
    format!("Contains {n} suspicious link(s)")
}

/// Ordered reasons for `record`.
pub fn explain(record: &MessageRecord, features: &FeatureVector) -> Vec<String> {
    let mut reasons = Vec::new();

    if features.urgency_word_count > URGENCY_REASON_THRESHOLD {
        reasons.push(REASON_URGENT.to_string());
    }

    if features.suspicious_link_count > 0 {
        reasons.push(suspicious_links_reason(features.suspicious_link_count));
    }

    if features.sender_domain_mismatch {
        reasons.push(REASON_SENDER_MISMATCH.to_string());
    }

    if record
        .links
        .iter()
        .any(|l| lexicon::is_ip_literal_url(&l.href))
    {
        reasons.push(REASON_IP_LINKS.to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::features::FeatureExtractor;

    #[test]
    fn built_in_rules_keep_their_order() {
        let rec = MessageRecord::new("r")
            .sender("alerts@secure-paypal.net")
            .body("URGENT: verify now, act now or be suspended. Visit https://paypal.com")
            .link("Sign in", "http://198.51.100.7/");
        let f = FeatureExtractor::detection().extract(&rec);
        let reasons = explain(&rec, &f);
        assert_eq!(
            reasons,
            vec![
                REASON_URGENT.to_string(),
                suspicious_links_reason(1),
                REASON_SENDER_MISMATCH.to_string(),
                REASON_IP_LINKS.to_string(),
            ]
        );
    }

    #[test]
    fn urgency_reason_threshold_is_lower_than_scorer() {
        let mut f = FeatureVector::default();
        f.urgency_word_count = 3;
        let reasons = explain(&MessageRecord::default(), &f);
        assert_eq!(reasons, vec![REASON_URGENT.to_string()]);

        f.urgency_word_count = 2;
        assert!(explain(&MessageRecord::default(), &f).is_empty());
    }

    #[test]
    fn wording_alone_adds_no_reason() {
        let rec = MessageRecord::new("w")
            .sender("it@home.example")
            .body("I transferred the wireless router settings; buy a gift card for mum.");
        let f = FeatureExtractor::detection().extract(&rec);
        assert!(explain(&rec, &f).is_empty());
    }
}
