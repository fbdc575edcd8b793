//! Common utilities and shared types for chainvote.
//!
//! This crate provides foundational components used across all chainvote
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Ethereum utilities**: Wallet-address validation and personal-message
//!   signature recovery
//! - **ID generation**: ULID entity ids, login nonces, and simulated
//!   transaction hashes via [`IdGenerator`]

pub mod config;
pub mod error;
pub mod eth;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use eth::{is_wallet_address, normalize_address, personal_message_hash, recover_address};
pub use id::IdGenerator;
