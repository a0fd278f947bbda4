//! SHA-256 credential digest verification.
//!
//! The stored credential is the unsalted uppercase-hex SHA-256 digest of
//! the password. This matches the deployed account data and is kept as-is;
//! it is a weak scheme for new systems — swapping in a salted, slow hash
//! requires re-provisioning every stored credential.

use sha2::{Digest, Sha256};

/// Hashes and verifies login credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialVerifier;

impl CredentialVerifier {
    /// Creates a new verifier instance.
    pub fn new() -> Self {
        Self
    }

    /// Digest a plaintext password into its stored form.
    pub fn hash(&self, password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest {
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }

    /// Verify a plaintext password against a stored digest.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        self.hash(password).eq_ignore_ascii_case(stored_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // SHA-256("1234"), uppercase hex.
        let verifier = CredentialVerifier::new();
        assert_eq!(
            verifier.hash("1234"),
            "03AC674216F3E15C761EE1A5E255F067953623C8B388B4459E13F978D7C846F4"
        );
    }

    #[test]
    fn test_verify_accepts_either_hex_case() {
        let verifier = CredentialVerifier::new();
        let upper = verifier.hash("s3cret");
        assert!(verifier.verify("s3cret", &upper));
        assert!(verifier.verify("s3cret", &upper.to_lowercase()));
        assert!(!verifier.verify("other", &upper));
    }
}
