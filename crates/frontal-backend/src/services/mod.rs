//! Backend service handlers for frontend-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, call the media session or one of the hosted collaborators,
//! and emit responses or notifications back to the frontend.

pub mod auth_service;
pub mod chat_service;
pub mod config_service;
pub mod media_service;
pub mod navigation_service;
pub mod progress_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
