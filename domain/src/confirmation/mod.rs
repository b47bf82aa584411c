//! Confirmation domain module
//!
//! Destructive actions (deleting media, removing downloads with their files,
//! restarting services) are never executed on the first call. The tool asks
//! the confirmation gate to hold a [`PendingConfirmation`] and answers with a
//! [`ConfirmationRequired`] payload; the host shows the prompt to the human
//! and, on approval, re-invokes the tool with the same `confirmationId`.
//!
//! ```text
//! call(args)                       call(args + confirmationId)
//!    │                                   │
//!    ▼                                   ▼
//! classify ──destructive──▶ request   confirm(id) ──true──▶ execute
//!    │                        │              └──false──▶ INVALID_PARAMETERS
//!    └─safe──▶ execute        ▼
//!                        ConfirmationRequired
//! ```
//!
//! The gate itself (stateful, expiring) lives in the application layer.

pub mod entities;

pub use entities::{ConfirmationRequest, ConfirmationRequired, PendingConfirmation, Severity};
