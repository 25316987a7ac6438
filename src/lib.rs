//! # Bucketlist
//!
//! Backend service for account signup with TOTP multi-factor enrollment,
//! login with password + one-time-code verification, and bearer-token
//! protected profile access, backed by `PostgreSQL`.

pub mod bucketlist;
pub mod cli;
pub mod password;
pub mod store;
pub mod token;
pub mod totp;
