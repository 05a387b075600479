//! Platform - Shared security infrastructure
//!
//! Cross-domain building blocks that carry no business rules of their own:
//! - Password hashing and policy enforcement (Argon2id)
//! - Cookie construction and extraction

pub mod cookie;
pub mod password;
