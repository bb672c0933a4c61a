//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, normalizer, dedupe and transfer calls into use-case
//!   level APIs.
//! - Keep CLI callers decoupled from file formats.

pub mod contact_service;
