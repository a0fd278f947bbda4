//! Credential hashing and verification.

pub mod digest;

pub use digest::CredentialVerifier;
