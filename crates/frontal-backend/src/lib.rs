//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle, routes bridge messages to services,
//! and manages shared state used by asynchronous tasks: the relaxation media
//! session, the chat conversation and the hosted collaborators (accounts,
//! progress storage and chat completions).

mod app;
mod config;
pub mod conversation;
pub mod navigation;
pub mod providers;
mod runtime;
mod services;
mod state;

pub use crate::runtime::run;
