//! Shared utilities and common types for the iZwi backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Input sanitization (plain text, limited rich text, JSON normalization)
//! - Common validation logic (email format, coordinates)
//! - Invite slug generation
//! - Password hashing with Argon2id
//! - Session token signing and validation
//! - Log-safe fingerprints for personal data

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod sanitize;
pub mod slug;
pub mod validation;
