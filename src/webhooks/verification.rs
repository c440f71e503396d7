use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::event::WebhookEvent;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECONDS: u64 = 600;

/// The only signature scheme Stripe currently signs with.
const EXPECTED_SCHEME: &str = "v1";

/// Why a webhook could not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,

    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    #[error("No signatures found with expected scheme")]
    NoSignatures,

    #[error("Timestamp outside the tolerance zone ({age_seconds} seconds)")]
    TimestampOutsideTolerance { age_seconds: i64 },

    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Turns a raw signed request into a trusted [`WebhookEvent`].
///
/// Implementations must check the signature against the exact bytes they
/// were given and only then parse them.
pub trait WebhookVerifier: Send + Sync {
    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, VerificationError>;
}

/// Verifier for the `Stripe-Signature` header scheme.
///
/// The header looks like `t=1492774577,v1=5257a8...,v0=6ffbb5...`. The signed
/// content is `"{t}.{raw body}"`, signed with HMAC-SHA256 using the endpoint
/// secret. Any one matching `v1` entry is accepted, which keeps verification
/// working while Stripe rolls the secret.
///
/// The secret is held in a [`SecretString`] so it never shows up in debug
/// output.
pub struct StripeSignatureVerifier {
    secret: SecretString,
    tolerance_seconds: u64,
}

impl StripeSignatureVerifier {
    /// Create a verifier with the default 600 second tolerance.
    #[must_use]
    pub fn new(secret: impl Into<SecretString>) -> Self {
        Self::with_tolerance(secret, DEFAULT_TOLERANCE_SECONDS)
    }

    /// Create a verifier with an explicit tolerance. `0` disables the
    /// timestamp check.
    #[must_use]
    pub fn with_tolerance(secret: impl Into<SecretString>, tolerance_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// Verify against an explicit clock reading (unix seconds).
    pub fn construct_event_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<WebhookEvent, VerificationError> {
        self.verify_signature_at(payload, signature_header, now)?;

        serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(
                target: "pickup_webhook::webhook",
                error = %e,
                "Signed webhook payload is not a Stripe event"
            );
            VerificationError::InvalidPayload(e.to_string())
        })
    }

    /// Check the header against the payload without parsing it.
    pub fn verify_signature_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), VerificationError> {
        let header = parse_signature_header(signature_header)?;

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .signatures
            .iter()
            .filter_map(|sig| hex::decode(sig).ok())
            .any(|provided| constant_time_compare(&expected, &provided));

        if !matched {
            tracing::debug!(
                target: "pickup_webhook::webhook",
                candidates = header.signatures.len(),
                "Webhook signature verification failed"
            );
            return Err(VerificationError::SignatureMismatch);
        }

        // Only stale timestamps are rejected.
        let age_seconds = now.saturating_sub(header.timestamp);
        if self.tolerance_seconds > 0
            && age_seconds > 0
            && age_seconds.unsigned_abs() > self.tolerance_seconds
        {
            return Err(VerificationError::TimestampOutsideTolerance { age_seconds });
        }

        Ok(())
    }

    /// HMAC-SHA256 over `"{timestamp}.{payload}"`, kept as raw bytes.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, VerificationError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| VerificationError::SignatureMismatch)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl WebhookVerifier for StripeSignatureVerifier {
    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, VerificationError> {
        self.construct_event_at(payload, signature_header, unix_now())
    }
}

impl std::fmt::Debug for StripeSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeSignatureVerifier")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish_non_exhaustive()
    }
}

/// Parsed `Stripe-Signature` header.
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader, VerificationError> {
    if header.trim().is_empty() {
        return Err(VerificationError::MissingHeader);
    }

    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            return Err(VerificationError::MalformedHeader);
        };

        match key.trim() {
            "t" => timestamp = value.trim().parse::<i64>().ok(),
            EXPECTED_SCHEME => signatures.push(value.trim().to_string()),
            _ => {} // v0 and future schemes
        }
    }

    let timestamp = timestamp.ok_or(VerificationError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(VerificationError::NoSignatures);
    }

    Ok(SignatureHeader { timestamp, signatures })
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
