//! Fake API shared by the store tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use contratos_core::{
    ContratosResponse, FilterSet, LoginRequest, LoginResponse, PagedResult, UploadResponse,
    expected_total_pages,
};
use contratos_fetch::{ContratosApi, FetchError, UploadFile};
use tokio::sync::{Mutex, Notify};

/// Total rows reported by the fake list endpoint.
pub const TOTAL: u64 = 45;

/// In-memory [`ContratosApi`].
///
/// List calls for a gated page block until the gate is opened. Upload
/// returns the configured result.
#[derive(Default)]
pub struct FakeApi {
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    requested: Mutex<Vec<FilterSet>>,
    gates: Mutex<HashMap<u32, Arc<Notify>>>,
    upload_result: Mutex<Option<Result<UploadResponse, FetchError>>>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Blocks list calls for `page` until the returned gate is notified.
    pub async fn gate(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().await.insert(page, gate.clone());
        gate
    }

    /// Blocks upload calls until the returned gate is notified.
    pub async fn gate_upload(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock().await = Some(gate.clone());
        gate
    }

    pub async fn set_upload_result(&self, result: Result<UploadResponse, FetchError>) {
        *self.upload_result.lock().await = Some(result);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub async fn requested(&self) -> Vec<FilterSet> {
        self.requested.lock().await.clone()
    }

    /// Yields until at least `n` list calls have arrived.
    pub async fn wait_for_list_calls(&self, n: usize) {
        while self.list_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Yields until at least `n` upload calls have arrived.
    pub async fn wait_for_upload_calls(&self, n: usize) {
        while self.upload_calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ContratosApi for FakeApi {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, FetchError> {
        Ok(LoginResponse {
            access_token: "fake".to_string(),
        })
    }

    async fn list_contratos(&self, filters: &FilterSet) -> Result<ContratosResponse, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().await.push(filters.clone());

        let gate = self.gates.lock().await.get(&filters.page()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let limit = filters.limit();
        Ok(PagedResult {
            items: Vec::new(),
            page: filters.page(),
            limit,
            total: TOTAL,
            total_pages: u32::try_from(expected_total_pages(TOTAL, limit)).unwrap_or(u32::MAX),
        })
    }

    async fn upload_contratos(&self, _file: &UploadFile) -> Result<UploadResponse, FetchError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.upload_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.upload_result
            .lock()
            .await
            .clone()
            .unwrap_or(Ok(UploadResponse { inserted: 0 }))
    }
}
