//! Portal service library crate.
//!
//! # Purpose
//! Exposes the portal HTTP surface (CSRF guard, request context, access
//! decisions, navigation and form intake) for use by the binary and tests.
//!
//! # Notes
//! Access rules themselves live in `portal-access`; this crate only binds them
//! to HTTP requests and sessions.
pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod csrf;
pub mod loader;
pub mod observability;
