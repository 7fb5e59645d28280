//! Integration tests for bizline-store
//!
//! These tests verify the full write/complete/read cycle for request and
//! feedback logs.

use bizline_domain::traits::LogStore;
use bizline_domain::{
    AccountId, Label, ModelVariant, NewFeedback, NewRequestLog, RequestCompletion,
};
use bizline_store::{SqliteStore, StoreError};

fn new_request(account: &str, text: &str) -> NewRequestLog {
    NewRequestLog {
        account: AccountId::new(account),
        model: ModelVariant::Gpt4,
        input_text: text.to_string(),
        created_at: 1000,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_record_and_get_request() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let id = store.record_request(new_request("user1", "Covered bank stocks")).unwrap();
    let entry = store.get_request(id).unwrap().expect("entry should exist");

    assert_eq!(entry.id, id);
    assert_eq!(entry.account, AccountId::new("user1"));
    assert_eq!(entry.model_name, "gpt-4");
    assert_eq!(entry.input_text, "Covered bank stocks");
    assert_eq!(entry.created_at, 1000);

    // Not yet completed
    assert_eq!(entry.predicted_label, None);
    assert_eq!(entry.processing_time, None);
    assert_eq!(entry.error_message, None);
}

#[test]
fn test_ids_are_sequential() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let first = store.record_request(new_request("user1", "a")).unwrap();
    let second = store.record_request(new_request("user2", "b")).unwrap();
    assert!(second > first);
}

#[test]
fn test_complete_request_with_label() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.record_request(new_request("user1", "IPO work")).unwrap();

    store
        .complete_request(
            id,
            RequestCompletion {
                predicted_label: Some("Investment Banking - Capital Markets (ECM&DCM)".to_string()),
                processing_time: 1.25,
                error_message: None,
            },
        )
        .unwrap();

    let entry = store.get_request(id).unwrap().unwrap();
    assert_eq!(
        entry.predicted_label.as_deref(),
        Some("Investment Banking - Capital Markets (ECM&DCM)")
    );
    assert_eq!(entry.processing_time, Some(1.25));
    assert_eq!(entry.error_message, None);
}

#[test]
fn test_complete_request_with_diagnostic() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.record_request(new_request("user1", "???")).unwrap();

    store
        .complete_request(
            id,
            RequestCompletion {
                predicted_label: None,
                processing_time: 0.5,
                error_message: Some("low confidence".to_string()),
            },
        )
        .unwrap();

    let entry = store.get_request(id).unwrap().unwrap();
    assert_eq!(entry.predicted_label, None);
    assert_eq!(entry.error_message.as_deref(), Some("low confidence"));
}

#[test]
fn test_complete_unknown_request() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let result = store.complete_request(
        42,
        RequestCompletion {
            predicted_label: None,
            processing_time: 0.0,
            error_message: None,
        },
    );
    assert!(matches!(result, Err(StoreError::NotFound(42))));
}

#[test]
fn test_get_missing_request() {
    let store = SqliteStore::new(":memory:").unwrap();
    assert!(store.get_request(7).unwrap().is_none());
}

#[test]
fn test_record_request_rejects_empty_account() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.record_request(new_request("", "text"));
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
}

#[test]
fn test_record_and_get_feedback() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let request_id = store.record_request(new_request("user1", "text")).unwrap();

    let label = Label::parse("Research - Equity research").unwrap();
    store
        .record_feedback(NewFeedback {
            request_id,
            account: AccountId::new("user1"),
            is_supported: false,
            corrected_label: Some(label),
            created_at: 2000,
        })
        .unwrap();
    store
        .record_feedback(NewFeedback {
            request_id,
            account: AccountId::new("user1"),
            is_supported: true,
            corrected_label: None,
            created_at: 2001,
        })
        .unwrap();

    let feedback = store.get_feedback(request_id).unwrap();
    assert_eq!(feedback.len(), 2);
    assert!(!feedback[0].is_supported);
    assert_eq!(feedback[0].corrected_label.as_deref(), Some("Research - Equity research"));
    assert!(feedback[1].is_supported);
    assert_eq!(feedback[1].corrected_label, None);
    assert_eq!(feedback[1].created_at, 2001);
}

#[test]
fn test_feedback_requires_existing_request() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let result = store.record_feedback(NewFeedback {
        request_id: 999,
        account: AccountId::new("user1"),
        is_supported: true,
        corrected_label: None,
        created_at: 0,
    });
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[test]
fn test_summary_groups_by_account() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let a = store.record_request(new_request("user1", "a")).unwrap();
    store.record_request(new_request("user1", "b")).unwrap();
    store.record_request(new_request("user2", "c")).unwrap();

    store
        .record_feedback(NewFeedback {
            request_id: a,
            account: AccountId::new("user1"),
            is_supported: true,
            corrected_label: None,
            created_at: 0,
        })
        .unwrap();

    let summary = store.summarize().unwrap();
    assert_eq!(summary.total_requests, 3);
    assert_eq!(summary.total_feedback, 1);

    assert_eq!(summary.requests_by_account.len(), 2);
    assert_eq!(summary.requests_by_account[0].account, AccountId::new("user1"));
    assert_eq!(summary.requests_by_account[0].count, 2);
    assert_eq!(summary.requests_by_account[1].account, AccountId::new("user2"));
    assert_eq!(summary.requests_by_account[1].count, 1);

    assert_eq!(summary.feedback_by_account.len(), 1);
    assert_eq!(summary.feedback_by_account[0].count, 1);
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs.db");

    let id = {
        let mut store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.database_path(), Some(path.as_path()));
        store.record_request(new_request("user3", "persisted")).unwrap()
    };

    let store = SqliteStore::new(&path).unwrap();
    let entry = store.get_request(id).unwrap().unwrap();
    assert_eq!(entry.input_text, "persisted");
    assert_eq!(entry.account, AccountId::new("user3"));
}
