//! Price oracle boundary.

use kf_catalog::ConstraintCatalog;
use kf_schemas::{Quote, Spec};
use std::fmt;

use crate::local::estimate_local;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`PriceOracle`] may return.
#[derive(Debug)]
pub enum OracleError {
    /// Network or transport failure.
    Transport(String),
    /// The oracle answered with a non-success HTTP status.
    Status { code: u16, body: String },
    /// No answer within the configured timeout.
    Timeout { after_ms: u64 },
    /// The response body was not the expected JSON.
    Decode(String),
    /// The response decoded but its numbers are unusable.
    Shape(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Transport(msg) => write!(f, "transport error: {msg}"),
            OracleError::Status { code, body } => {
                write!(f, "oracle http error status={code}: {body}")
            }
            OracleError::Timeout { after_ms } => write!(f, "oracle timed out after {after_ms}ms"),
            OracleError::Decode(msg) => write!(f, "decode error: {msg}"),
            OracleError::Shape(msg) => write!(f, "malformed quote: {msg}"),
        }
    }
}

impl std::error::Error for OracleError {}

// ---------------------------------------------------------------------------
// Oracle trait
// ---------------------------------------------------------------------------

/// Anything that can price a spec.
///
/// Object-safe so the order engine can hold an `Arc<dyn PriceOracle>`
/// without knowing which backend answers.
#[async_trait::async_trait]
pub trait PriceOracle: Send + Sync {
    /// Short identifier used in logs (e.g. `"vendor"`).
    fn name(&self) -> &'static str;

    async fn estimate(&self, spec: &Spec, catalog: &ConstraintCatalog)
        -> Result<Quote, OracleError>;
}

/// The local price table as an oracle. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHeuristicOracle;

#[async_trait::async_trait]
impl PriceOracle for LocalHeuristicOracle {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn estimate(
        &self,
        spec: &Spec,
        catalog: &ConstraintCatalog,
    ) -> Result<Quote, OracleError> {
        Ok(estimate_local(&spec.extended, catalog))
    }
}

/// Ask `primary`; on any error log it and ask `fallback` instead.
pub struct FallbackOracle {
    primary: Box<dyn PriceOracle>,
    fallback: Box<dyn PriceOracle>,
}

impl FallbackOracle {
    pub fn new(primary: Box<dyn PriceOracle>, fallback: Box<dyn PriceOracle>) -> Self {
        Self { primary, fallback }
    }

    /// Remote-or-local: the usual production wiring.
    pub fn with_local(primary: Box<dyn PriceOracle>) -> Self {
        Self::new(primary, Box::new(LocalHeuristicOracle))
    }
}

#[async_trait::async_trait]
impl PriceOracle for FallbackOracle {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn estimate(
        &self,
        spec: &Spec,
        catalog: &ConstraintCatalog,
    ) -> Result<Quote, OracleError> {
        match self.primary.estimate(spec, catalog).await {
            Ok(q) => Ok(q),
            Err(err) => {
                tracing::warn!(
                    oracle = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "price oracle failed; using fallback"
                );
                self.fallback.estimate(spec, catalog).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_catalog::default_spec;
    use kf_schemas::Estimator;

    struct Down;

    #[async_trait::async_trait]
    impl PriceOracle for Down {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn estimate(&self, _: &Spec, _: &ConstraintCatalog) -> Result<Quote, OracleError> {
            Err(OracleError::Timeout { after_ms: 4000 })
        }
    }

    #[tokio::test]
    async fn fallback_answers_when_primary_fails() {
        let c = ConstraintCatalog::default();
        let s = default_spec(&c);
        let oracle = FallbackOracle::with_local(Box::new(Down));
        let q = oracle.estimate(&s, &c).await.unwrap();
        assert_eq!(q.estimator, Estimator::Local);
        assert_eq!(q, estimate_local(&s.extended, &c));
    }

    #[test]
    fn error_display_is_compact() {
        let e = OracleError::Status {
            code: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(e.to_string(), "oracle http error status=502: bad gateway");
        assert_eq!(
            OracleError::Timeout { after_ms: 4000 }.to_string(),
            "oracle timed out after 4000ms"
        );
    }
}
