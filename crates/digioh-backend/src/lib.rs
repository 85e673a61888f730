//! # digiOH Backend
//!
//! HTTP client for the hosted backend: the GoTrue-style auth API and the
//! PostgREST-style table API. [`BackendClient`] implements the
//! [`AuthProvider`](digioh_core::AuthProvider),
//! [`ProfileSource`](digioh_core::ProfileSource) and
//! [`ContentSource`](digioh_core::ContentSource) traits from `digioh-core`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod client;
mod rest;

pub use client::{BackendClient, BackendError};
pub use rest::{Query, parse_content_range};
