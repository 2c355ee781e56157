//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `PaymentService` which drives a payment through
//! its lifecycle: create, validate, authorize against the settlement
//! gateway, capture. It owns the storage and gateway ports and persists
//! after every transition so the stored status always reflects the last
//! completed step.

pub mod service;
