//! Contracts API endpoints.

use async_trait::async_trait;
use contratos_core::{ContratosResponse, FilterSet, LoginRequest, LoginResponse, UploadResponse};
use tracing::{debug, info, instrument};

use crate::client::{ApiClient, ApiRequest, QueryParams, UploadFile};
use crate::error::FetchError;

/// Endpoint paths, relative to the base URL.
pub mod endpoints {
    /// `POST` credentials, returns an access token.
    pub const LOGIN: &str = "/login";
    /// `GET` a filtered, paginated list of contracts.
    pub const CONTRATOS: &str = "/contratos";
    /// `POST` a CSV file as multipart form data.
    pub const UPLOAD: &str = "/contratos/upload";
    /// Multipart field carrying the CSV file.
    pub const UPLOAD_FIELD: &str = "file";
}

/// Operations offered by the contracts backend.
#[async_trait]
pub trait ContratosApi: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, FetchError>;

    /// Fetches one page of contracts.
    async fn list_contratos(&self, filters: &FilterSet) -> Result<ContratosResponse, FetchError>;

    /// Uploads a CSV file of contracts.
    async fn upload_contratos(&self, file: &UploadFile) -> Result<UploadResponse, FetchError>;
}

#[async_trait]
impl ContratosApi for ApiClient {
    #[instrument(skip(self, request), fields(usuario = %request.usuario))]
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, FetchError> {
        let req = ApiRequest::post(endpoints::LOGIN).json(request)?;
        self.request(req).await
    }

    #[instrument(skip(self, filters), fields(page = filters.page()))]
    async fn list_contratos(&self, filters: &FilterSet) -> Result<ContratosResponse, FetchError> {
        let req = ApiRequest::get(endpoints::CONTRATOS).query(QueryParams::from(filters));
        let response: ContratosResponse = self.request(req).await?;
        debug!(
            items = response.items.len(),
            total = response.total,
            total_pages = response.total_pages,
            "Listed contracts"
        );
        Ok(response)
    }

    #[instrument(skip(self, file), fields(file = %file.file_name, bytes = file.size()))]
    async fn upload_contratos(&self, file: &UploadFile) -> Result<UploadResponse, FetchError> {
        let req = ApiRequest::post(endpoints::UPLOAD).multipart(endpoints::UPLOAD_FIELD, file.clone());
        let response: UploadResponse = self.request(req).await?;
        info!(inserted = response.inserted, "Upload accepted");
        Ok(response)
    }
}

impl ApiClient {
    /// Logs in and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns the login error, or [`FetchError::Credentials`] if the token
    /// cannot be stored.
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<LoginResponse, FetchError> {
        let response = self.login(request).await?;
        self.tokens().set_token(&response.access_token).await?;
        info!("Signed in");
        Ok(response)
    }

    /// Removes the stored token. The next request is sent without it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Credentials`] if the token store fails.
    pub async fn sign_out(&self) -> Result<(), FetchError> {
        self.tokens().remove_token().await?;
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use contratos_core::{FilterField, StatusContrato};
    use reqwest::{Request, StatusCode};
    use url::Url;

    use super::*;
    use crate::host::http::{Transport, TransportResponse};
    use crate::token::{MemoryTokenStore, TokenStore};

    struct CannedTransport {
        status: StatusCode,
        body: &'static str,
        urls: Mutex<Vec<Url>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: Request) -> Result<TransportResponse, FetchError> {
            self.urls.lock().unwrap().push(request.url().clone());
            Ok(TransportResponse::new(self.status, self.body.as_bytes().to_vec()))
        }
    }

    fn setup(status: StatusCode, body: &'static str) -> (ApiClient, Arc<CannedTransport>, Arc<MemoryTokenStore>) {
        let transport = Arc::new(CannedTransport {
            status,
            body,
            urls: Mutex::new(Vec::new()),
        });
        let tokens = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::builder()
            .base_url(Url::parse("http://api.test").unwrap())
            .transport(transport.clone())
            .tokens(tokens.clone())
            .build()
            .unwrap();
        (client, transport, tokens)
    }

    #[tokio::test]
    async fn test_list_contratos_sends_filters() {
        let body = r#"{
            "items": [{
                "id_contrato": "C-1",
                "nome_cliente": "Ana",
                "email_cliente": "ana@example.com",
                "tipo_plano": "PRO",
                "valor_mensal": "99.90",
                "status": "ATIVO",
                "data_inicio": "2024-01-15"
            }],
            "page": 2, "limit": 20, "total": 45, "totalPages": 3
        }"#;
        let (client, transport, _) = setup(StatusCode::OK, body);

        let mut filters = FilterSet::with_defaults();
        filters.set(FilterField::Status, "ATIVO").unwrap();
        filters.set_page(2);

        let response = client.list_contratos(&filters).await.unwrap();
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items[0].status, StatusContrato::Ativo);

        let url = transport.urls.lock().unwrap()[0].clone();
        assert_eq!(url.path(), "/contratos");
        assert_eq!(url.query(), Some("status=ATIVO&page=2&limit=20"));
    }

    #[tokio::test]
    async fn test_sign_in_stores_token() {
        let (client, transport, tokens) = setup(StatusCode::OK, r#"{"access_token":"jwt"}"#);

        client.sign_in(&LoginRequest::new("admin", "pw")).await.unwrap();
        assert_eq!(tokens.get_token().await.unwrap().as_deref(), Some("jwt"));
        assert_eq!(transport.urls.lock().unwrap()[0].path(), "/login");

        client.sign_out().await.unwrap();
        assert!(!tokens.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_no_token() {
        let (client, _, tokens) = setup(
            StatusCode::UNAUTHORIZED,
            r#"{"statusCode":401,"message":"Credenciais inválidas"}"#,
        );

        let err = client.sign_in(&LoginRequest::new("admin", "bad")).await.unwrap_err();
        assert_eq!(err.to_string(), "Credenciais inválidas");
        assert!(!tokens.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_upload_posts_to_upload_endpoint() {
        let (client, transport, _) = setup(StatusCode::CREATED, r#"{"inserted":12}"#);

        let file = UploadFile::new("contratos.csv", b"id\n1\n".to_vec());
        let response = client.upload_contratos(&file).await.unwrap();
        assert_eq!(response.inserted, 12);
        assert_eq!(transport.urls.lock().unwrap()[0].path(), "/contratos/upload");
    }
}
