//! Perch: a self-hosted social feed server.
//!
//! Layering follows hexagonal lines: `domain` holds entities and invariants,
//! `application` holds services and repository traits, `infra` holds the
//! Postgres adapters, HTTP surface, and telemetry. Shared wire types live in
//! the `perch-api-types` crate; the reference client data layer lives in
//! `perch-client`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
