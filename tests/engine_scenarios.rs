//! End-to-end scenarios for the parse engine: layer precedence, rejection
//! dominance, graceful degradation, and the never-fail contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use trackmail::classify::ApplicationStatus;
use trackmail::config::TrackmailConfig;
use trackmail::email::EmailMessage;
use trackmail::engine::ParseEngine;
use trackmail::extract::SourceLayer;
use trackmail::semantic::{SemanticAnswer, SemanticError, SemanticExtractor};

fn email(subject: &str, sender: &str, body: &str) -> EmailMessage {
    EmailMessage {
        subject: subject.to_owned(),
        sender: sender.to_owned(),
        html_body: None,
        text_body: Some(body.to_owned()),
        received_at: None,
    }
}

/// Semantic adapter that always fails, for degradation tests.
struct BrokenAdapter;

#[async_trait]
impl SemanticExtractor for BrokenAdapter {
    async fn attempt(&self, _email: &EmailMessage) -> Result<SemanticAnswer, SemanticError> {
        Err(SemanticError::Timeout(Duration::from_millis(10)))
    }
    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn subject_line_layer_wins_for_tiktok() {
    let engine = ParseEngine::deterministic();
    let parse = engine
        .process(&email(
            "Thank you for applying to TikTok!",
            "talent@tiktok.com",
            "Our talent acquisition team has received your application and will be in touch.",
        ))
        .await;

    let company = &parse.extraction.company;
    assert_eq!(company.value.as_deref(), Some("TikTok"));
    assert_eq!(company.source, Some(SourceLayer::SubjectLine));
    assert!(company.confidence >= 95);
    assert_eq!(parse.dominant_layer, Some(SourceLayer::SubjectLine));
    assert_eq!(parse.classification.status, ApplicationStatus::Applied);
}

#[tokio::test]
async fn jane_street_rejection_scenario() {
    let engine = ParseEngine::deterministic();
    let parse = engine
        .process(&email(
            "Thank you for applying to IN FOCUS - Software Engineering Track",
            "nyc-programs@janestreet.com",
            "Unfortunately, after careful consideration, you have not been selected \
             for the next stage of the process. We wish you the best in your search.",
        ))
        .await;

    assert_eq!(parse.classification.status, ApplicationStatus::Rejected);
    assert!(parse.classification.confidence >= 90);
    assert!(parse
        .classification
        .indicators
        .iter()
        .any(|i| i == "not been selected"));
    assert!(parse
        .classification
        .indicators
        .iter()
        .any(|i| i == "unfortunately"));
}

#[tokio::test]
async fn rejection_dominates_interview_scheduling_phrases() {
    let engine = ParseEngine::deterministic();
    let parse = engine
        .process(&email(
            "Application update",
            "jobs@acme.com",
            "We had hoped to schedule a call with you. However, you have not been \
             selected and we will not move forward with your candidacy.",
        ))
        .await;
    assert_eq!(parse.classification.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn riot_games_company_from_subject() {
    let engine = ParseEngine::deterministic();
    let parse = engine
        .process(&email(
            "Thank you for submitting your application to our internship program here at Riot Games!",
            "Riot Games Recruiting <no-reply@riotgames.com>",
            "Thank you for your interest in the internship program here at Riot Games.",
        ))
        .await;

    let company = &parse.extraction.company;
    assert_eq!(company.value.as_deref(), Some("Riot Games"));
    assert!(matches!(
        company.source,
        Some(SourceLayer::SubjectLine) | Some(SourceLayer::Structural)
    ));
    assert!(company.confidence >= 90);
}

#[tokio::test]
async fn broken_semantic_layer_degrades_to_lexical() {
    let config = TrackmailConfig::default();
    let engine = ParseEngine::new(&config, Some(Arc::new(BrokenAdapter)));
    let parse = engine
        .process(&email(
            "Checking in",
            "recruiter@gmail.com",
            "Your interest in the Platform Engineer opening was noted. \
             We think you would be a great fit.",
        ))
        .await;

    let position = &parse.extraction.position;
    assert_eq!(position.value.as_deref(), Some("Platform Engineer"));
    assert!(matches!(
        position.source,
        Some(SourceLayer::Lexical) | Some(SourceLayer::Basic)
    ));
    assert!(position.confidence <= SourceLayer::Lexical.base_confidence());
}

#[tokio::test]
async fn unrecognizable_email_reports_absence() {
    let engine = ParseEngine::deterministic();
    let parse = engine
        .process(&email("Lunch tomorrow?", "friend@gmail.com", "See you at noon."))
        .await;

    assert_eq!(parse.extraction.company.value, None);
    assert_eq!(parse.extraction.company.confidence, 0);
    assert_eq!(parse.extraction.position.value, None);
    assert_eq!(parse.classification.status, ApplicationStatus::NotJobRelated);
    assert!(parse.confidence <= 30, "got {}", parse.confidence);
}

#[tokio::test]
async fn every_answer_is_bounded_and_attributed() {
    let engine = ParseEngine::deterministic();
    let inputs = [
        email("", "", ""),
        email("Re: Re: Fwd:", "x@y.zz", "☂☂☂"),
        email(
            "Offer of employment",
            "hr@initech.com",
            "Congratulations! We are pleased to offer you the position of Senior Engineer.",
        ),
    ];
    for input in inputs {
        let parse = engine.process(&input).await;
        assert!(parse.confidence <= 100);
        assert!(parse.classification.confidence <= 100);
        for outcome in [&parse.extraction.company, &parse.extraction.position] {
            assert!(outcome.confidence <= 100);
            // Provenance is present exactly when a value is.
            assert_eq!(outcome.value.is_some(), outcome.source.is_some());
        }
    }
}

#[tokio::test]
async fn deterministic_engine_is_idempotent() {
    let engine = ParseEngine::deterministic();
    let msg = email(
        "Interview Invitation - Backend Engineer",
        "Hooli Talent <talent@hooli.com>",
        "We would like to schedule your interview. Please share your availability.",
    );
    let first = engine.process(&msg).await;
    let second = engine.process(&msg).await;
    assert_eq!(
        serde_json::to_value(&first).expect("serializable"),
        serde_json::to_value(&second).expect("serializable")
    );
    assert_eq!(first.classification.status, ApplicationStatus::Interview);
}
