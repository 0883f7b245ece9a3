//! Companion-service contract: accounts and transactional email.
//!
//! Nothing here touches player state. A failed email is reported to the
//! caller and otherwise ignored.

mod accounts;
mod client;

pub use accounts::{Account, AccountRegistry, MIN_PASSWORD_LEN};
pub use client::{completion_email, deadline_email, BackendClient, EmailOutcome};
