//! Tillpoint: multi-tenant point-of-sale backend.
//!
//! The core of the crate is the order lifecycle and pricing engine: order
//! creation, whole-cart item replacement, the confirm/complete/cancel state
//! machine, the append-only payment ledger, and kitchen ticket derivation.
//! Everything is tenant-scoped; the database is the single synchronization
//! point for concurrent mutations.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod pricing;
pub mod repositories;
pub mod services;
pub mod state_machine;

use std::sync::Arc;

use serde::Serialize;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
}

/// Uniform response envelope for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}
