// tests/classify_examples.rs
//
// End-to-end classifier behaviour on hand-written messages plus seeded
// property checks over random feature vectors.

use std::sync::Arc;

use phishing_detector::analyze::features::FeatureExtractor;
use phishing_detector::analyze::reasons::{
    suspicious_links_reason, REASON_IP_LINKS, REASON_SENDER_MISMATCH, REASON_URGENT,
};
use phishing_detector::analyze::scoring::{detection_confidence, training_confidence};
use phishing_detector::analyze::weights::{DetectionWeights, HotReloadWeights, TrainingWeights, Weights};
use phishing_detector::analyze::{Classifier, FeatureVector};
use phishing_detector::MessageRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn ip_link_message() -> MessageRecord {
    MessageRecord::new("ex-1")
        .subject("Mailbox notice")
        .sender("it-desk@corp.example")
        .body("This is urgent. Please verify now and reply immediately.")
        .link("Login", "http://203.0.113.5/login")
}

fn paypal_lookalike() -> MessageRecord {
    MessageRecord::new("ex-2")
        .subject("Action required: account suspended")
        .sender("noreply@paypal-security-update.com")
        .body(
            "Your account is suspended and locked. Act now: verify your account at \
             https://paypal.com before access will expire.",
        )
        .link("https://paypal.com/signin", "https://paypal-security-update.com/signin")
        .link("Help", "http://bit.ly/pp-help")
}

fn meeting_note() -> MessageRecord {
    MessageRecord::new("ex-3")
        .subject("Team meeting Thursday")
        .sender("dana@corp.example")
        .body("Hi team, see you at the Thursday meeting at 10am in room 4. Thanks, Dana")
}

#[test]
fn ip_link_with_moderate_urgency_is_benign_but_explained() {
    let rec = ip_link_message();
    let f = FeatureExtractor::detection().extract(&rec);
    assert_eq!(f.urgency_word_count, 3);
    assert_eq!(f.suspicious_link_count, 1);
    assert_eq!(f.ip_literal_link_count, 1);
    assert!(!f.sender_domain_mismatch);

    let res = Classifier::builtin().classify(&rec);
    assert!((res.confidence - 0.4).abs() < 1e-6);
    assert!(!res.is_phishing);
    assert_eq!(
        res.reasons,
        vec![
            REASON_URGENT.to_string(),
            suspicious_links_reason(1),
            REASON_IP_LINKS.to_string(),
        ]
    );
    assert_eq!(res.suspicious_links, vec!["http://203.0.113.5/login".to_string()]);
}

#[test]
fn brand_lookalike_sender_is_phishing() {
    let rec = paypal_lookalike();
    let f = FeatureExtractor::detection().extract(&rec);
    assert!(f.urgency_word_count > 3);
    assert_eq!(f.suspicious_link_count, 2);
    assert!(f.sender_domain_mismatch);

    let res = Classifier::builtin().classify(&rec);
    assert_eq!(res.confidence, 1.0);
    assert!(res.is_phishing);
    assert!(res.reasons.contains(&REASON_SENDER_MISMATCH.to_string()));
    assert!(res.reasons.contains(&suspicious_links_reason(2)));
    assert_eq!(res.suspicious_links.len(), 2);
}

#[test]
fn plain_meeting_note_is_clean() {
    let rec = meeting_note();
    let f = FeatureExtractor::detection().extract(&rec);
    assert_eq!(f.urgency_word_count, 0);
    assert_eq!(f.credential_word_count, 0);
    assert_eq!(f.suspicious_phrase_count, 0);
    assert_eq!(f.link_count, 0);
    assert_eq!(f.suspicious_link_count, 0);
    assert!(!f.sender_domain_mismatch);

    let res = Classifier::builtin().classify(&rec);
    assert_eq!(res.confidence, 0.0);
    assert!(!res.is_phishing);
    assert!(res.reasons.is_empty());
    assert!(res.suspicious_links.is_empty());
}

#[test]
fn phishing_verdict_can_come_without_reasons() {
    // Link volume scores but never produces a reason.
    let weights = Weights {
        detection: DetectionWeights {
            link_count: 0.6,
            ..DetectionWeights::default()
        },
        training: TrainingWeights::default(),
    };
    let classifier = Classifier::new(Arc::new(HotReloadWeights::fixed(weights)));

    let mut rec = MessageRecord::new("many-links").body("Weekly digest");
    for i in 0..12 {
        rec = rec.link(format!("Story {i}"), format!("https://news.example/{i}"));
    }
    let res = classifier.classify(&rec);
    assert!(res.is_phishing);
    assert!(res.reasons.is_empty());
}

#[test]
fn extraction_is_pure() {
    let ex = FeatureExtractor::detection();
    for rec in [ip_link_message(), paypal_lookalike(), meeting_note()] {
        assert_eq!(ex.extract(&rec), ex.extract(&rec.clone()));
    }
}

fn random_features(rng: &mut StdRng) -> FeatureVector {
    FeatureVector {
        urgency_word_count: rng.random_range(0..15),
        credential_word_count: rng.random_range(0..15),
        suspicious_phrase_count: rng.random_range(0..10),
        link_count: rng.random_range(0..30),
        suspicious_link_count: rng.random_range(0..5),
        ip_literal_link_count: rng.random_range(0..3),
        shortened_link_count: rng.random_range(0..3),
        sender_domain_mismatch: rng.random_bool(0.5),
        capital_letter_ratio: rng.random_range(0.0..1.0),
        special_char_count: rng.random_range(0..40),
        all_caps_token_count: rng.random_range(0..10),
        exclamation_count: rng.random_range(0..20),
        subject_length: rng.random_range(0..200),
        body_length: rng.random_range(0..5000),
        has_attachment_hint: rng.random_bool(0.2),
    }
}

#[test]
fn confidences_stay_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(42);
    let dw = DetectionWeights::default();
    let tw = TrainingWeights::default();
    for _ in 0..2_000 {
        let f = random_features(&mut rng);
        let d = detection_confidence(&f, &dw);
        let t = training_confidence(&f, &tw);
        assert!((0.0..=1.0).contains(&d), "detection {d} out of range for {f:?}");
        assert!((0.0..=1.0).contains(&t), "training {t} out of range for {f:?}");

        let res = phishing_detector::ClassificationResult::new(d);
        assert_eq!(res.is_phishing, d > 0.5);
    }
}
