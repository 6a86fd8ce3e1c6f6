//! PKCE (RFC 7636) verifier and challenge handling.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};

use crate::error::{ProviderError, ProviderResult};

/// The only challenge method we send.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Bounds on verifier length, in characters.
pub const MIN_VERIFIER_LEN: usize = 43;
pub const MAX_VERIFIER_LEN: usize = 128;

/// Random bytes behind a generated verifier (43 chars once encoded).
const GENERATED_VERIFIER_BYTES: usize = 32;

/// Random bytes behind an OAuth `state` value.
const STATE_BYTES: usize = 16;

/// A verifier together with its derived S256 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    verifier: String,
    challenge: String,
}

impl PkceChallenge {
    /// Wraps a caller supplied verifier after checking it against RFC 7636.
    pub fn from_verifier(verifier: impl Into<String>) -> ProviderResult<Self> {
        let verifier = verifier.into();
        validate_verifier(&verifier)?;
        let challenge = compute_challenge(&verifier);
        Ok(Self {
            verifier,
            challenge,
        })
    }

    /// Generates a fresh high-entropy verifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let bytes: [u8; GENERATED_VERIFIER_BYTES] = rng.random();
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// The secret sent with the token exchange.
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// The value sent as `code_challenge` on the authorization redirect.
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Always `S256`.
    pub fn method(&self) -> &'static str {
        CODE_CHALLENGE_METHOD
    }
}

/// `BASE64URL-NOPAD(SHA256(verifier))`.
pub fn compute_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Checks length (43..=128) and the unreserved character set `[A-Za-z0-9-._~]`.
pub fn validate_verifier(verifier: &str) -> ProviderResult<()> {
    let len = verifier.len();
    if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&len) {
        return Err(ProviderError::configuration(format!(
            "PKCE verifier must be {}-{} characters, got {}",
            MIN_VERIFIER_LEN, MAX_VERIFIER_LEN, len
        )));
    }
    if let Some(bad) = verifier
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')))
    {
        return Err(ProviderError::configuration(format!(
            "PKCE verifier contains invalid character {:?}",
            bad
        )));
    }
    Ok(())
}

/// Generates a random `state` value for CSRF protection.
pub fn generate_state() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; STATE_BYTES] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7636, Appendix B.
    const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const RFC_CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    #[test]
    fn rfc7636_test_vector() {
        assert_eq!(compute_challenge(RFC_VERIFIER), RFC_CHALLENGE);

        let pkce = PkceChallenge::from_verifier(RFC_VERIFIER).unwrap();
        assert_eq!(pkce.verifier(), RFC_VERIFIER);
        assert_eq!(pkce.challenge(), RFC_CHALLENGE);
        assert_eq!(pkce.method(), "S256");
    }

    #[test]
    fn challenge_is_stable() {
        let a = PkceChallenge::from_verifier(RFC_VERIFIER).unwrap();
        let b = PkceChallenge::from_verifier(RFC_VERIFIER).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generated_verifier_is_valid() {
        let pkce = PkceChallenge::generate();
        assert_eq!(pkce.verifier().len(), 43);
        assert!(validate_verifier(pkce.verifier()).is_ok());
        assert_eq!(pkce.challenge(), compute_challenge(pkce.verifier()));
        assert!(!pkce.challenge().contains('='));
    }

    #[test]
    fn generated_verifiers_differ() {
        assert_ne!(
            PkceChallenge::generate().verifier(),
            PkceChallenge::generate().verifier()
        );
    }

    #[test]
    fn verifier_length_bounds() {
        assert!(validate_verifier(&"a".repeat(42)).is_err());
        assert!(validate_verifier(&"a".repeat(43)).is_ok());
        assert!(validate_verifier(&"a".repeat(128)).is_ok());
        assert!(validate_verifier(&"a".repeat(129)).is_err());
    }

    #[test]
    fn verifier_alphabet() {
        let mut verifier = "a".repeat(42);
        verifier.push('~');
        assert!(validate_verifier(&verifier).is_ok());

        let mut verifier = "a".repeat(42);
        verifier.push('+');
        let err = validate_verifier(&verifier).unwrap_err();
        assert!(err.message().contains("'+'"));
    }

    #[test]
    fn state_is_random_and_url_safe() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 22);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
