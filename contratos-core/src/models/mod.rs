//! Domain models for the contracts client.
//!
//! ## Submodules
//!
//! - [`contrato`] - Contract records and their enumerations
//! - [`filters`] - Filter set, filter keys and query-string mapping
//! - [`page`] - Paginated results
//! - [`api`] - Endpoint payloads and the API error value

mod api;
mod contrato;
mod filters;
mod page;

pub use api::{ApiError, LoginRequest, LoginResponse, UploadResponse};
pub use contrato::{
    Contrato, FilterOption, STATUS_OPTIONS, StatusContrato, TIPO_PLANO_OPTIONS, TipoPlano,
};
pub use filters::{DEFAULT_LIMIT, DEFAULT_PAGE, FilterField, FilterSet};
pub use page::{ContratosResponse, PagedResult, Pagination, expected_total_pages};
