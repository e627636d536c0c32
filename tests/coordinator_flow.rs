mod common;

use common::{calls, doc, transport_error, ScriptedBackend};
use doc_study_client::models::{RawMcqItem, SkipReason};
use doc_study_client::services::{mark_options, parse_mcqs_from_text};
use doc_study_client::{
    AppError, ErrorKind, McqPayload, McqRecord, OperationKind, OperationOutcome,
    OperationStatus, RequestCoordinator,
};
use std::sync::Arc;

fn setup() -> (Arc<ScriptedBackend>, RequestCoordinator<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::new());
    let coordinator = RequestCoordinator::with_shared_backend(Arc::clone(&backend));
    (backend, coordinator)
}

async fn ready_session() -> (Arc<ScriptedBackend>, RequestCoordinator<ScriptedBackend>) {
    let (backend, coordinator) = setup();
    backend.push_process(Ok("sid-1".to_string()));
    coordinator.add_documents(vec![doc("a.pdf")]);
    assert!(coordinator.process().await.is_succeeded());
    (backend, coordinator)
}

#[tokio::test]
async fn test_process_success_makes_session_ready() {
    let (backend, coordinator) = setup();
    backend.push_process(Ok("sid-1".to_string()));
    coordinator.add_documents(vec![doc("a.pdf"), doc("b.pdf")]);

    let outcome = coordinator.process().await;

    assert_eq!(outcome, OperationOutcome::Succeeded("sid-1".to_string()));
    let snapshot = coordinator.snapshot();
    assert!(snapshot.ready);
    assert_eq!(snapshot.session_id.as_deref(), Some("sid-1"));
    assert_eq!(snapshot.status(OperationKind::Process), &OperationStatus::Succeeded);
    assert_eq!(backend.uploads(), vec![vec!["a.pdf", "b.pdf"]]);
}

#[tokio::test]
async fn test_process_failure_keeps_previous_session_id() {
    let (backend, coordinator) = ready_session().await;
    coordinator.add_documents(vec![doc("b.pdf")]);
    backend.push_process(Err(transport_error("/process")));

    let outcome = coordinator.process().await;

    let report = outcome.failure().unwrap();
    assert_eq!(report.kind, ErrorKind::Transport);
    let snapshot = coordinator.snapshot();
    assert!(!snapshot.ready);
    assert_eq!(snapshot.session_id.as_deref(), Some("sid-1"));
    assert_eq!(snapshot.last_error.as_deref(), Some(report.message.as_str()));
}

#[tokio::test]
async fn test_double_ask_makes_one_remote_call() {
    let (backend, coordinator) = ready_session().await;
    backend.push_answer(Ok("Paris".to_string()));
    let gate = backend.hold();

    let first = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.ask("Capital of France?").await }
    });
    gate.entered.notified().await;
    assert_eq!(coordinator.status(OperationKind::Ask), OperationStatus::InFlight);

    let second = coordinator.ask("Capital of France?").await;
    assert_eq!(second, OperationOutcome::Skipped(SkipReason::AlreadyInFlight));

    gate.release.notify_one();
    let first = first.await.unwrap();

    assert_eq!(first, OperationOutcome::Succeeded("Paris".to_string()));
    assert_eq!(calls(&backend.ask_calls), 1);
    assert_eq!(coordinator.status(OperationKind::Ask), OperationStatus::Succeeded);
}

#[tokio::test]
async fn test_double_process_makes_one_remote_call() {
    let (backend, coordinator) = setup();
    backend.push_process(Ok("sid-1".to_string()));
    coordinator.add_documents(vec![doc("a.pdf")]);
    let gate = backend.hold();

    let first = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.process().await }
    });
    gate.entered.notified().await;

    let second = coordinator.process().await;
    assert_eq!(second, OperationOutcome::Skipped(SkipReason::AlreadyInFlight));
    assert_eq!(coordinator.status(OperationKind::Process), OperationStatus::InFlight);

    gate.release.notify_one();
    assert_eq!(
        first.await.unwrap(),
        OperationOutcome::Succeeded("sid-1".to_string())
    );
    assert_eq!(calls(&backend.process_calls), 1);
}

#[tokio::test]
async fn test_reset_keeps_in_flight_process_exclusive() {
    let (backend, coordinator) = setup();
    backend.push_process(Ok("sid-old".to_string()));
    backend.push_process(Ok("sid-new".to_string()));
    coordinator.add_documents(vec![doc("a.pdf")]);
    let gate = backend.hold();

    let first = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.process().await }
    });
    gate.entered.notified().await;

    coordinator.reset();
    coordinator.add_documents(vec![doc("b.pdf")]);

    let second = coordinator.process().await;
    assert_eq!(second, OperationOutcome::Skipped(SkipReason::AlreadyInFlight));
    assert_eq!(coordinator.status(OperationKind::Process), OperationStatus::InFlight);
    assert_eq!(calls(&backend.process_calls), 1);

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), OperationOutcome::Discarded);
    assert_eq!(coordinator.status(OperationKind::Process), OperationStatus::Idle);
    assert_eq!(coordinator.snapshot().session_id, None);

    // 旧请求返回后才能重新处理
    gate.release.notify_one();
    let third = coordinator.process().await;
    assert_eq!(third, OperationOutcome::Succeeded("sid-new".to_string()));
    assert_eq!(calls(&backend.process_calls), 2);
    assert_eq!(backend.uploads(), vec![vec!["a.pdf"], vec!["b.pdf"]]);
}

#[tokio::test]
async fn test_different_kinds_run_concurrently() {
    let (backend, coordinator) = ready_session().await;
    backend.push_answer(Ok("an answer".to_string()));
    backend.push_summary(Ok("a summary".to_string()));
    let gate = backend.hold();

    let ask = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.ask("Why?").await }
    });
    gate.entered.notified().await;

    let summary = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.summarize().await }
    });
    gate.entered.notified().await;

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.status(OperationKind::Ask), &OperationStatus::InFlight);
    assert_eq!(snapshot.status(OperationKind::Summarize), &OperationStatus::InFlight);

    gate.release.notify_one();
    gate.release.notify_one();
    let (ask, summary) = futures::join!(ask, summary);

    assert!(ask.unwrap().is_succeeded());
    assert!(summary.unwrap().is_succeeded());
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.answer.as_deref(), Some("an answer"));
    assert_eq!(snapshot.summary.as_deref(), Some("a summary"));
}

#[tokio::test]
async fn test_stale_process_result_is_discarded() {
    let (backend, coordinator) = setup();
    backend.push_process(Ok("sid-stale".to_string()));
    coordinator.add_documents(vec![doc("a.pdf")]);
    let gate = backend.hold();

    let pending = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.process().await }
    });
    gate.entered.notified().await;

    coordinator.add_documents(vec![doc("b.pdf")]);
    gate.release.notify_one();

    assert_eq!(pending.await.unwrap(), OperationOutcome::Discarded);
    let snapshot = coordinator.snapshot();
    assert!(!snapshot.ready);
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.status(OperationKind::Process), &OperationStatus::Idle);
}

#[tokio::test]
async fn test_stale_answer_is_not_restored_after_document_change() {
    let (backend, coordinator) = ready_session().await;
    backend.push_answer(Ok("old answer".to_string()));
    let gate = backend.hold();

    let pending = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.ask("Q?").await }
    });
    gate.entered.notified().await;

    coordinator.add_documents(vec![doc("b.pdf")]);
    gate.release.notify_one();

    assert_eq!(pending.await.unwrap(), OperationOutcome::Discarded);
    assert_eq!(coordinator.snapshot().answer, None);
}

#[tokio::test]
async fn test_removing_last_document_drops_session() {
    let (_backend, coordinator) = ready_session().await;

    assert!(coordinator.remove_document("a.pdf"));

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.ready);
    assert_eq!(snapshot.session_id, None);
    let ask = coordinator.ask("still there?").await;
    assert_eq!(ask.failure().unwrap().kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn test_failed_ask_can_be_retried() {
    let (backend, coordinator) = ready_session().await;
    backend.push_answer(Err(AppError::missing_field("/chat/", "answer")));
    backend.push_answer(Ok("second try".to_string()));

    let first = coordinator.ask("Q?").await;
    assert_eq!(first.failure().unwrap().kind, ErrorKind::Protocol);
    assert!(coordinator.snapshot().ready);

    let second = coordinator.ask("Q?").await;
    assert_eq!(second, OperationOutcome::Succeeded("second try".to_string()));
    assert_eq!(calls(&backend.ask_calls), 2);
}

#[tokio::test]
async fn test_summary_sentinel_for_empty_text() {
    let (backend, coordinator) = ready_session().await;
    backend.push_summary(Ok(String::new()));

    let outcome = coordinator.summarize().await;
    assert_eq!(
        outcome,
        OperationOutcome::Succeeded("No summary available.".to_string())
    );
}

#[tokio::test]
async fn test_freeform_mcqs_are_parsed_and_matched() {
    let (backend, coordinator) = ready_session().await;
    backend.push_mcqs(Ok(McqPayload::Freeform(
        "What is 2+2?\nA. 3\nB. 4\nC. 5\nD. 6\nCorrect Answer: B) 4\n\nStem only".to_string(),
    )));

    let records = coordinator.generate_mcqs().await.succeeded().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].question, "What is 2+2?");
    assert_eq!(records[0].answer, "B) 4");
    let flags: Vec<bool> = mark_options(&records[0]).iter().map(|m| m.is_correct).collect();
    assert_eq!(flags, vec![false, true, false, false]);

    assert!(records[1].options.is_empty());
    assert!(mark_options(&records[1]).is_empty());
    assert_eq!(coordinator.snapshot().mcqs, records);
}

#[tokio::test]
async fn test_structured_mcqs_pass_through() {
    let (backend, coordinator) = ready_session().await;
    let items = vec![
        RawMcqItem::from(McqRecord::new(
            "1. First",
            vec!["A) x".to_string(), "B) y".to_string()],
            "Answer: A) x",
        )),
        RawMcqItem {
            question: Some("2. Second".to_string()),
            ..Default::default()
        },
    ];
    backend.push_mcqs(Ok(McqPayload::Structured(items)));

    let records = coordinator.generate_mcqs().await.succeeded().unwrap();

    assert_eq!(
        records,
        vec![
            McqRecord::new(
                "1. First",
                vec!["A) x".to_string(), "B) y".to_string()],
                "Answer: A) x"
            ),
            McqRecord::new("2. Second", vec![], ""),
        ]
    );
}

#[test]
fn test_parser_example_without_colon() {
    let records = parse_mcqs_from_text("Q?\nA. 3\nB. 4\nThe answer is B) 4");
    assert_eq!(records[0].answer, "The answer is B) 4");
}
