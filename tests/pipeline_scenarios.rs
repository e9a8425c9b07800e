//! End-to-end turns through the orchestrator with a scripted provider.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use site_copilot::adapters::ai::MockAIProvider;
use site_copilot::adapters::corpus::InMemoryCorpus;
use site_copilot::application::handlers::StreamError;
use site_copilot::application::{Orchestrator, OrchestratorSettings, TurnError, TurnReply};
use site_copilot::domain::conversation::{InlineImage, UserTurn};
use site_copilot::domain::engine::{Capability, EngineTier};
use site_copilot::domain::intent::Intent;
use site_copilot::domain::pipeline::TurnPhase;
use site_copilot::domain::profile::UserProfile;
use site_copilot::domain::tasks::{AgentKind, DocumentKind};
use site_copilot::ports::AIError;

fn orchestrator(provider: &MockAIProvider, corpus: &[&str]) -> Orchestrator {
    Orchestrator::new(
        OrchestratorSettings::default(),
        Arc::new(provider.clone()),
        Some(Arc::new(InMemoryCorpus::with_names(corpus.iter().copied()))),
    )
    .expect("registries cover every task")
}

fn profile(tier: EngineTier) -> UserProfile {
    UserProfile::default().with_tier(tier)
}

fn intent_json(intent: &str, role: &str, document_type: &str, sufficient: bool) -> String {
    json!({
        "intent": intent,
        "role": role,
        "documentType": document_type,
        "sufficientData": sufficient,
    })
    .to_string()
}

#[tokio::test]
async fn beam_request_without_numbers_asks_for_inputs() {
    let provider = MockAIProvider::new()
        .with_operation_response("intent", intent_json("structural", "none", "none", false))
        .with_operation_response("structural_subtask", r#"{"task":"beam_design"}"#);
    let turn = UserTurn::new("design a beam").unwrap();

    let outcome = orchestrator(&provider, &[])
        .handle_turn(&turn, &[], &profile(EngineTier::Premium), None)
        .await;

    assert_eq!(outcome.intent, Some(Intent::Structural { sufficient_data: false }));
    let Ok(TurnReply::NeedsInput(needs)) = &outcome.reply else {
        panic!("expected a clarification, got {:?}", outcome.reply);
    };
    assert_eq!(needs.specialist(), "Beam Design");
    assert_eq!(needs.missing(), ["span", "loads", "material"]);
    assert_eq!(provider.operations(), vec!["intent", "structural_subtask"]);
    assert_eq!(outcome.record.current(), TurnPhase::Completed);
}

#[tokio::test]
async fn daily_report_is_generated_on_the_compact_tier() {
    let report = json!({
        "resultType": "DAILY_SITE_REPORT",
        "summary": "Level 3 slab poured, no incidents.",
        "date": "2026-10-19",
        "weather": "Dry, 14°C",
        "workforce": [{"trade": "Concrete", "count": "12"}],
        "activities": ["Level 3 slab pour"],
        "equipment": ["Concrete pump"],
        "issues": []
    });
    let provider = MockAIProvider::new()
        .with_operation_response(
            "intent",
            intent_json("document_generation", "site_manager", "daily_site_report", true),
        )
        .with_operation_response("site_manager_subtask", r#"{"task":"daily_site_report"}"#)
        .with_operation_response("daily_site_report", report.to_string());
    let turn = UserTurn::new("create a daily report").unwrap();

    let outcome = orchestrator(&provider, &[])
        .handle_turn(&turn, &[], &profile(EngineTier::Compact), None)
        .await;

    assert_eq!(outcome.agent, AgentKind::SiteManager);
    let Ok(TurnReply::Document(payload)) = &outcome.reply else {
        panic!("expected a document, got {:?}", outcome.reply);
    };
    assert_eq!(payload.task, "Daily Site Report");
    assert_eq!(payload.kind(), DocumentKind::DailySiteReport);
    assert_eq!(
        payload.result.summary(),
        Some("Level 3 slab poured, no incidents.")
    );
}

#[tokio::test]
async fn image_analysis_is_denied_below_premium() {
    let provider = MockAIProvider::new();
    let image = InlineImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]).unwrap();
    let turn = UserTurn::new("analyze this image for hazards")
        .unwrap()
        .with_image(image);

    let outcome = orchestrator(&provider, &[])
        .handle_turn(&turn, &[], &profile(EngineTier::Advanced), None)
        .await;

    assert_eq!(outcome.agent, AgentKind::Analysis);
    match &outcome.reply {
        Err(TurnError::CapabilityDenied(denied)) => {
            assert_eq!(denied.capability, Capability::ImageAnalysis);
            assert_eq!(denied.required, EngineTier::Premium);
            assert_eq!(denied.current, EngineTier::Advanced);
        }
        other => panic!("expected capability denial, got {:?}", other),
    }
    assert_eq!(provider.call_count(), 0);
    assert_eq!(outcome.record.current(), TurnPhase::Failed);
}

#[tokio::test]
async fn premium_conversation_cites_the_selected_drawing() {
    let provider = MockAIProvider::new()
        .with_operation_response("intent", intent_json("conversation", "none", "none", true))
        .with_operation_response("corpus_selection", r#"{"document":"Structural_Drawings_Rev4.pdf"}"#)
        .with_operation_response(
            "rag_synthesis",
            "Level 5 slabs are C32/40 per sheet S-105.",
        )
        .with_stream_chunks(["Per Structural_Drawings_Rev4.pdf, ", "the slab is C32/40."]);
    let turn = UserTurn::new("slab strength on level 5").unwrap();

    let mut outcome = orchestrator(&provider, &["Structural_Drawings_Rev4.pdf"])
        .handle_turn(&turn, &[], &profile(EngineTier::Premium), None)
        .await;

    let Ok(TurnReply::Streaming(stream)) = &mut outcome.reply else {
        panic!("expected a stream");
    };
    let rag = stream.rag.as_ref().expect("context was injected");
    assert_eq!(rag.source, "Structural_Drawings_Rev4.pdf");
    assert!(rag.context.contains("C32/40"));

    let text = stream.channel.collect_text().await.unwrap();
    assert_eq!(text, "Per Structural_Drawings_Rev4.pdf, the slab is C32/40.");
    let state = stream.channel.state();
    outcome.finish_stream(state);

    assert_eq!(
        outcome.record.phases(),
        vec![
            TurnPhase::Idle,
            TurnPhase::ClassifyingIntent,
            TurnPhase::Routing,
            TurnPhase::RagLookup,
            TurnPhase::Generating,
            TurnPhase::Completed,
        ]
    );
}

#[tokio::test]
async fn compact_conversation_skips_retrieval() {
    let provider = MockAIProvider::new()
        .with_operation_response("intent", intent_json("conversation", "none", "none", true))
        .with_stream_chunks(["Curing takes about seven days."]);
    let turn = UserTurn::new("how long does concrete cure").unwrap();

    let mut outcome = orchestrator(&provider, &["Structural_Drawings_Rev4.pdf"])
        .handle_turn(&turn, &[], &profile(EngineTier::Compact), None)
        .await;

    let Ok(TurnReply::Streaming(stream)) = &mut outcome.reply else {
        panic!("expected a stream");
    };
    assert!(stream.rag.is_none());
    stream.channel.collect_text().await.unwrap();
    assert!(!provider.operations().iter().any(|op| op == "corpus_selection"));
}

#[tokio::test]
async fn cancelled_stream_ends_the_turn_as_cancelled() {
    let provider = MockAIProvider::new()
        .with_operation_response("intent", intent_json("conversation", "none", "none", true))
        .with_stream_chunks(["first ", "second ", "third"])
        .with_chunk_delay(Duration::from_millis(50));
    let turn = UserTurn::new("tell me about formwork").unwrap();

    let mut outcome = orchestrator(&provider, &[])
        .handle_turn(&turn, &[], &profile(EngineTier::Compact), None)
        .await;

    let Ok(TurnReply::Streaming(stream)) = &mut outcome.reply else {
        panic!("expected a stream");
    };
    let first = stream.channel.next_chunk().await;
    assert_eq!(first.map(Result::unwrap), Some("first ".to_string()));

    stream.cancel.cancel();
    assert!(stream.channel.next_chunk().await.is_none());
    let state = stream.channel.state();
    outcome.finish_stream(state);

    assert_eq!(outcome.record.current(), TurnPhase::Cancelled);
}

#[tokio::test]
async fn unsupported_structural_task_is_not_a_generation_failure() {
    let provider = MockAIProvider::new()
        .with_operation_response("intent", intent_json("structural", "none", "none", true))
        .with_operation_response("structural_subtask", r#"{"task":"unsupported_task"}"#);
    let turn = UserTurn::new("design a 12 m cable-stayed pylon").unwrap();

    let outcome = orchestrator(&provider, &[])
        .handle_turn(&turn, &[], &profile(EngineTier::Premium), None)
        .await;

    match &outcome.reply {
        Err(err @ TurnError::UnsupportedTask(AgentKind::Structural)) => {
            assert!(!err.user_message().is_empty());
        }
        other => panic!("expected unsupported task, got {:?}", other),
    }
}

#[tokio::test]
async fn conversation_stream_respects_the_generation_timeout() {
    let provider = MockAIProvider::new()
        .with_stream_chunks(["too late"])
        .with_delay(Duration::from_millis(1500));
    let settings = OrchestratorSettings {
        generation_timeout: Duration::from_millis(100),
        ..OrchestratorSettings::default()
    };
    let orchestrator = Orchestrator::new(settings, Arc::new(provider.clone()), None).unwrap();

    let started = std::time::Instant::now();
    let result = orchestrator
        .stream_conversation("what is the cover to footings", &[], &profile(EngineTier::Compact))
        .await;

    assert!(started.elapsed() < Duration::from_millis(1000));
    assert!(matches!(
        result,
        Err(StreamError::Provider(AIError::Timeout { .. }))
    ));
}
