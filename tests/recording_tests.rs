mod common;

use beacon_sos::{
    CoreError, IngestRequest, SessionEvent, SessionOwner, MAX_RECORDING_BYTES,
};
use common::{build_pipeline, contact, user, RecordingGateway};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

fn upload(owner: &str, session: Option<&str>, payload: Vec<u8>, emergency: bool) -> IngestRequest {
    IngestRequest {
        owner_id: owner.to_string(),
        session_id: session.map(str::to_string),
        content_type: "audio/wav".to_string(),
        declared_size: payload.len() as u64,
        payload,
        transcript: None,
        emotion_label: None,
        emergency,
    }
}

fn staging_entries(dir: &std::path::Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[tokio::test]
async fn emergency_upload_is_stored_linked_and_announced() {
    let gateway = Arc::new(RecordingGateway::default());
    let p = build_pipeline(gateway.clone());
    p.directory
        .upsert_user(user("u1", "Dana", vec![contact("A", "+1-555-0100")]))
        .await;

    let session_id = p
        .manager
        .create_session(
            SessionOwner::Owned {
                user_id: "u1".to_string(),
            },
            None,
        )
        .await
        .unwrap();
    gateway.wait_for_calls(1).await;

    let mut tracker = p.manager.subscribe(&session_id);

    let recording_id = p
        .ingestor
        .ingest(upload("u1", Some(&session_id), vec![1, 2, 3, 4], true))
        .await
        .unwrap();
    assert!(recording_id.starts_with("rec-"));

    let session = p.manager.session(&session_id).await.unwrap();
    assert_eq!(session.recording_ids, vec![recording_id.clone()]);

    match tracker.recv().await.unwrap() {
        SessionEvent::RecordingAdded {
            recording_id: announced,
            ..
        } => assert_eq!(announced, recording_id),
        other => panic!("expected recording event, got {:?}", other),
    }

    let calls = gateway.wait_for_calls(2).await;
    assert!(calls
        .iter()
        .any(|(_, body)| body.contains("EMERGENCY UPDATE") && body.contains(&recording_id)));

    // Staging spool was released after the durable write
    assert_eq!(staging_entries(p.staging.path()), 0);
}

#[tokio::test]
async fn empty_payload_is_rejected() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let err = p
        .ingestor
        .ingest(upload("u1", None, vec![], false))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoPayload));
    assert_eq!(staging_entries(p.staging.path()), 0);
}

#[tokio::test]
async fn oversized_payload_leaves_no_record_and_no_staging_file() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let mut request = upload("u1", None, vec![0u8; 64], false);
    request.declared_size = MAX_RECORDING_BYTES + 1;

    let err = p.ingestor.ingest(request).await.unwrap_err();
    assert!(matches!(err, CoreError::PayloadTooLarge { .. }));

    assert!(p.ingestor.list_recordings("u1").await.unwrap().is_empty());
    assert_eq!(staging_entries(p.staging.path()), 0);
}

#[tokio::test]
async fn unknown_owner_is_rejected() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));

    let err = p
        .ingestor
        .ingest(upload("ghost", None, vec![1, 2, 3], false))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidOwner(_)));
    assert_eq!(staging_entries(p.staging.path()), 0);
}

#[tokio::test]
async fn unknown_session_stores_the_recording_unlinked() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let recording_id = p
        .ingestor
        .ingest(upload("u1", Some("sos-missing"), vec![1, 2, 3], true))
        .await
        .unwrap();

    let summaries = p.ingestor.list_recordings("u1").await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, recording_id);
    assert_eq!(summaries[0].session_id.as_deref(), Some("sos-missing"));
}

#[tokio::test]
async fn attach_after_resolution_is_allowed() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let session_id = p
        .manager
        .create_session(SessionOwner::Anonymous, None)
        .await
        .unwrap();
    p.manager.cancel_session(&session_id, None).await.unwrap();

    // The upload was in flight when the session terminated
    let recording_id = p
        .ingestor
        .ingest(upload("u1", Some(&session_id), vec![9, 9, 9], true))
        .await
        .unwrap();

    let session = p.manager.session(&session_id).await.unwrap();
    assert_eq!(session.recording_ids, vec![recording_id]);
}

#[tokio::test]
async fn late_subscriber_misses_the_event_but_sees_the_state() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let session_id = p
        .manager
        .create_session(SessionOwner::Anonymous, None)
        .await
        .unwrap();

    let recording_id = p
        .ingestor
        .ingest(upload("u1", Some(&session_id), vec![1, 2], true))
        .await
        .unwrap();

    // Joined after the announcement: no replay...
    let mut late = p.manager.subscribe(&session_id);
    let nothing = tokio::time::timeout(Duration::from_millis(50), late.recv()).await;
    assert!(nothing.is_err());

    // ...but the state query shows the artifact
    let session = p.manager.session(&session_id).await.unwrap();
    assert_eq!(session.recording_ids, vec![recording_id]);
}

#[tokio::test]
async fn listing_is_newest_first_capped_and_payload_free() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;
    p.directory.upsert_user(user("u2", "Riley", vec![])).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(
            p.ingestor
                .ingest(upload("u1", None, vec![i as u8; 8], false))
                .await
                .unwrap(),
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    p.ingestor
        .ingest(upload("u2", None, vec![7; 8], false))
        .await
        .unwrap();

    let summaries = p.ingestor.list_recordings("u1").await.unwrap();
    assert_eq!(summaries.len(), 3);

    // Newest first
    let listed: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    expected.reverse();
    assert_eq!(listed, expected);

    for summary in &summaries {
        assert_eq!(summary.owner_id, "u1");
        assert_eq!(summary.size_bytes, 8);
        assert!(!summary.is_emergency_recording);
    }
}

#[tokio::test]
async fn payload_fetch_returns_bytes_and_media_type() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let mut request = upload("u1", None, vec![1, 2, 3, 4, 5], false);
    request.content_type = "audio/mpeg".to_string();
    let recording_id = p.ingestor.ingest(request).await.unwrap();

    let (content_type, data) = p.ingestor.fetch_payload(&recording_id).await.unwrap();
    assert_eq!(content_type, "audio/mpeg");
    assert_eq!(data, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn annotations_are_stored_verbatim() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let mut request = upload("u1", None, vec![1, 2, 3], false);
    request.transcript = Some("please help".to_string());
    request.emotion_label = Some("fear".to_string());
    p.ingestor.ingest(request).await.unwrap();

    let summaries = p.ingestor.list_recordings("u1").await.unwrap();
    assert_eq!(summaries[0].transcript.as_deref(), Some("please help"));
    assert_eq!(summaries[0].emotion_label.as_deref(), Some("fear"));
}

#[tokio::test]
async fn deletion_is_owner_only() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    p.directory.upsert_user(user("u1", "Dana", vec![])).await;

    let recording_id = p
        .ingestor
        .ingest(upload("u1", None, vec![1, 2, 3], false))
        .await
        .unwrap();

    let err = p
        .ingestor
        .delete_recording(&recording_id, "intruder")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    p.ingestor
        .delete_recording(&recording_id, "u1")
        .await
        .unwrap();

    let err = p.ingestor.fetch_payload(&recording_id).await.unwrap_err();
    assert!(matches!(err, CoreError::RecordingNotFound(_)));
}

#[tokio::test]
async fn fetch_of_unknown_recording_is_not_found() {
    let p = build_pipeline(Arc::new(RecordingGateway::default()));
    let err = p.ingestor.fetch_payload("rec-missing").await.unwrap_err();
    assert!(matches!(err, CoreError::RecordingNotFound(_)));
}
