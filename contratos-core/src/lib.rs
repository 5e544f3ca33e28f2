// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Contratos Core
//!
//! Core types and models for the contracts administration client.
//!
//! This crate provides the foundational types used across the other
//! `contratos` crates:
//!
//! - Domain models (contracts, filters, paginated results)
//! - Wire types for the login and upload endpoints
//! - The structured API error value
//! - Display helpers for currency, dates and file sizes
//!
//! ## Key Types
//!
//! ### Contracts
//! - [`Contrato`] - A single contract record
//! - [`TipoPlano`] / [`StatusContrato`] - Plan and status enumerations
//! - [`FilterOption`] - Values offered by the plan and status filters
//!
//! ### Listing
//! - [`FilterSet`] - Named optional filters plus page and page size
//! - [`FilterField`] - The recognized filter keys
//! - [`PagedResult`] - One page of results with totals
//! - [`Pagination`] - Previous/next availability for a page
//!
//! ### API
//! - [`ApiError`] - Structured error returned for non-success responses
//! - [`LoginRequest`] / [`LoginResponse`] - Login endpoint payloads
//! - [`UploadResponse`] - Upload endpoint payload

pub mod error;
pub mod format;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Contracts
    Contrato,
    FilterOption,
    STATUS_OPTIONS,
    StatusContrato,
    TIPO_PLANO_OPTIONS,
    TipoPlano,
    // Listing
    ContratosResponse,
    DEFAULT_LIMIT,
    DEFAULT_PAGE,
    FilterField,
    FilterSet,
    PagedResult,
    Pagination,
    expected_total_pages,
    // API
    ApiError,
    LoginRequest,
    LoginResponse,
    UploadResponse,
};
