//! Upload flow tests.

use std::sync::Arc;

use contratos_core::{ApiError, UploadResponse};
use contratos_fetch::{FetchError, UploadFile};

use crate::contratos::ContratosQuery;
use crate::error::UploadError;
use crate::upload::{NotificationKind, UploadFlow, UploadState, is_csv};
use crate::test_support::FakeApi;

fn csv(name: &str) -> UploadFile {
    UploadFile::new(name, b"id_contrato,nome_cliente\nC-1,Ana\n".to_vec())
}

fn api_error(errors: usize) -> FetchError {
    let errors = (1..=errors).map(|i| format!("Linha {i}: email inválido")).collect();
    ApiError::new(400, "Arquivo com erros").with_errors(errors).into()
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_is_csv() {
    assert!(is_csv(&csv("contratos.csv")));
    assert!(is_csv(&csv("CONTRATOS.CSV")));
    assert!(is_csv(&csv("a.csv").with_mime("text/csv; charset=utf-8")));
    assert!(!is_csv(&csv("contratos.xlsx")));
    assert!(!is_csv(&csv("contratos")));
    assert!(!is_csv(&csv("a.csv").with_mime("application/pdf")));
}

#[tokio::test]
async fn test_select_exactly_one_csv() {
    let flow = UploadFlow::new(FakeApi::new());

    assert_eq!(flow.select(vec![]).await, Err(UploadError::NoFile));
    assert_eq!(
        flow.select(vec![csv("a.csv"), csv("b.csv")]).await,
        Err(UploadError::TooManyFiles(2))
    );
    assert_eq!(flow.state().await, UploadState::Idle);

    let selected = flow.select(vec![csv("a.csv")]).await.unwrap();
    assert_eq!(selected.name, "a.csv");
    assert!(selected.size.ends_with(" KB"));
}

#[tokio::test]
async fn test_rejected_file_keeps_previous_selection() {
    let flow = UploadFlow::new(FakeApi::new());
    flow.select(vec![csv("ok.csv")]).await.unwrap();

    let err = flow.select(vec![csv("notes.txt")]).await.unwrap_err();
    assert!(matches!(err, UploadError::NotCsv(_)));
    assert_eq!(flow.selected().await.unwrap().name, "ok.csv");
}

#[tokio::test]
async fn test_clear_returns_to_idle() {
    let flow = UploadFlow::new(FakeApi::new());
    flow.select(vec![csv("a.csv")]).await.unwrap();
    flow.clear().await.unwrap();
    assert_eq!(flow.state().await, UploadState::Idle);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_submit_without_file_makes_no_request() {
    let api = FakeApi::new();
    let flow = UploadFlow::new(api.clone());

    let notification = flow.submit().await.unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.title, "Selecione um arquivo CSV");
    assert_eq!(api.upload_calls(), 0);
}

#[tokio::test]
async fn test_success_clears_and_invalidates() {
    let api = FakeApi::new();
    api.set_upload_result(Ok(UploadResponse { inserted: 12 })).await;
    let query = Arc::new(ContratosQuery::new(api.clone()));
    let flow = UploadFlow::new(api.clone()).with_listener(query.clone());

    query.fetch_page(&contratos_core::FilterSet::with_defaults()).await;
    assert_eq!(api.list_calls(), 1);

    flow.select(vec![csv("a.csv")]).await.unwrap();
    let notification = flow.submit().await.unwrap();

    assert!(notification.is_success());
    assert_eq!(notification.title, "Upload realizado! 12 contratos inseridos.");
    assert_eq!(flow.state().await, UploadState::Idle);

    query.fetch_page(&contratos_core::FilterSet::with_defaults()).await;
    assert_eq!(api.list_calls(), 2);
}

#[tokio::test]
async fn test_failure_keeps_file_and_lists_errors() {
    let api = FakeApi::new();
    api.set_upload_result(Err(api_error(2))).await;
    let flow = UploadFlow::new(api.clone());

    flow.select(vec![csv("a.csv")]).await.unwrap();
    let notification = flow.submit().await.unwrap();

    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.title, "Arquivo com erros");
    assert_eq!(notification.details.len(), 2);
    assert!(notification.overflow.is_none());
    assert!(matches!(flow.state().await, UploadState::Selected(_)));
}

#[tokio::test]
async fn test_failure_with_many_errors_overflows() {
    let api = FakeApi::new();
    api.set_upload_result(Err(api_error(7))).await;
    let flow = UploadFlow::new(api.clone());

    flow.select(vec![csv("a.csv")]).await.unwrap();
    let notification = flow.submit().await.unwrap();

    assert_eq!(notification.details.len(), 5);
    assert_eq!(notification.details[4], "Linha 5: email inválido");
    assert_eq!(notification.overflow.as_deref(), Some("... e mais 2 erros"));
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let api = FakeApi::new();
    api.set_upload_result(Err(ApiError::new(500, "").into())).await;
    let flow = UploadFlow::new(api.clone());

    flow.select(vec![csv("a.csv")]).await.unwrap();
    let notification = flow.submit().await.unwrap();
    assert_eq!(notification.title, "Erro ao fazer upload");
}

#[tokio::test]
async fn test_network_failure_message() {
    let api = FakeApi::new();
    api.set_upload_result(Err(FetchError::Network("refused".into()))).await;
    let flow = UploadFlow::new(api.clone());

    flow.select(vec![csv("a.csv")]).await.unwrap();
    let notification = flow.submit().await.unwrap();
    assert_eq!(notification.title, "Falha de comunicação com o servidor");
}

#[tokio::test]
async fn test_no_double_submission() {
    let api = FakeApi::new();
    let gate = api.gate_upload().await;
    api.set_upload_result(Ok(UploadResponse { inserted: 1 })).await;
    let flow = Arc::new(UploadFlow::new(api.clone()));
    flow.select(vec![csv("a.csv")]).await.unwrap();

    let f = flow.clone();
    let running = tokio::spawn(async move { f.submit().await });
    api.wait_for_upload_calls(1).await;

    assert_eq!(flow.submit().await, Err(UploadError::InProgress));
    assert_eq!(flow.clear().await, Err(UploadError::InProgress));
    assert_eq!(flow.select(vec![csv("b.csv")]).await, Err(UploadError::InProgress));

    gate.notify_one();
    assert!(running.await.unwrap().unwrap().is_success());
    assert_eq!(api.upload_calls(), 1);
}
