//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate policy, notifications and repository calls into use-cases.
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod task_service;
