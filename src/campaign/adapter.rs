//! Target adapter contract
//!
//! The site-specific navigation and extraction logic lives outside this
//! crate. Adapters receive the active session and one identifier, drive the
//! target, and report a terminal outcome. At their own checkpoints they call
//! the supplied block probe with the current page state so the controller's
//! detector policy applies without the adapter knowing about it.

use crate::detector::{classify_page, Detection};
use crate::session::Session;
use async_trait::async_trait;
use thiserror::Error;

/// Terminal outcome of one collection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The subject's document was collected; carries an artifact reference
    /// (e.g. the stored file path)
    Success(String),

    /// The subject exists but has no document to collect
    NotFound,

    /// A block or challenge interrupted the attempt
    Blocked,

    /// Identifier-specific failure that is not a block
    Error(String),
}

impl CrawlOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NotFound => "not-found",
            Self::Blocked => "blocked",
            Self::Error(_) => "error",
        }
    }
}

/// Mid-attempt failures an adapter can raise
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Transient transport failure (timeout, connection reset); retried
    /// with bounded backoff
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Adapter-level failure; subject to the same bounded backoff, then
    /// recorded as an error outcome
    #[error("Adapter failure: {0}")]
    Adapter(String),
}

/// Checkpoint callback for block detection during an attempt
pub trait BlockProbe: Send + Sync {
    /// Classifies the current page state
    fn check(&self, markup: &str, url: &str) -> Detection;
}

/// Probe backed by the stateless block/CAPTCHA classifier
#[derive(Debug, Default)]
pub struct DetectorProbe;

impl BlockProbe for DetectorProbe {
    fn check(&self, markup: &str, url: &str) -> Detection {
        classify_page(markup, url)
    }
}

/// Site-specific navigation/extraction logic, injected into the controller
#[async_trait]
pub trait TargetAdapter: Send {
    /// Runs one collection attempt for the identifier
    ///
    /// The adapter polls `probe` at its checkpoints; when the probe reports
    /// a block the adapter should abandon navigation and return
    /// `CrawlOutcome::Blocked` promptly.
    async fn collect(
        &mut self,
        session: &Session,
        identifier: &str,
        probe: &dyn BlockProbe,
    ) -> Result<CrawlOutcome, AttemptError>;

    /// Re-checks the current page state after a recovery attempt
    ///
    /// Called once after the operator acknowledges a resolved challenge.
    /// Adapters that cannot re-inspect their page report `Clear` and let
    /// the retry discover any remaining block.
    async fn recheck_block(&mut self, session: &Session, probe: &dyn BlockProbe) -> Detection {
        let _ = (session, probe);
        Detection::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CrawlOutcome::Success("a.pdf".to_string()).label(), "success");
        assert_eq!(CrawlOutcome::NotFound.label(), "not-found");
        assert_eq!(CrawlOutcome::Blocked.label(), "blocked");
        assert_eq!(CrawlOutcome::Error("x".to_string()).label(), "error");
    }

    #[test]
    fn test_detector_probe_delegates() {
        let probe = DetectorProbe;
        let markup = r#"<html><body><input id="captcha"/></body></html>"#;
        assert!(probe.check(markup, "https://registry.example/").is_blocked());
        assert!(!probe
            .check("<html><body>fine</body></html>", "https://registry.example/")
            .is_blocked());
    }
}
