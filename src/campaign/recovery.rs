//! Human-assisted block recovery
//!
//! When a block or challenge is detected the campaign cannot proceed
//! automatically: the controller blocks on an explicit operator
//! acknowledgement, an unbounded wait by design. After the operator resumes,
//! the detector re-checks once; a page that is still blocked means the
//! recovery failed and the current identifier is abandoned as blocked.

use crate::{Result, VeilError};
use async_trait::async_trait;
use std::io::Write;

/// Gate the controller blocks on while the operator resolves a challenge
#[async_trait]
pub trait OperatorGate: Send {
    /// Blocks until the operator acknowledges the challenge is resolved
    async fn await_acknowledgement(&mut self, identifier: &str) -> Result<()>;
}

/// Console-backed gate: banner plus a blocking prompt on stdin
#[derive(Debug, Default)]
pub struct ConsoleGate;

#[async_trait]
impl OperatorGate for ConsoleGate {
    async fn await_acknowledgement(&mut self, identifier: &str) -> Result<()> {
        println!("\n{}", "=".repeat(50));
        println!("BLOCK OR CAPTCHA DETECTED while processing {}.", identifier);
        println!("Resolve the challenge manually, then press Enter to continue...");
        println!("{}\n", "=".repeat(50));

        // Stdin reads are blocking; keep them off the async runtime.
        tokio::task::spawn_blocking(|| {
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok::<(), std::io::Error>(())
        })
        .await
        .map_err(|e| VeilError::Console(format!("Operator prompt task failed: {}", e)))??;

        tracing::info!("Operator acknowledged recovery for {}", identifier);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gate that records acknowledgements instead of prompting
    struct RecordingGate {
        acknowledged: Vec<String>,
    }

    #[async_trait]
    impl OperatorGate for RecordingGate {
        async fn await_acknowledgement(&mut self, identifier: &str) -> Result<()> {
            self.acknowledged.push(identifier.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_gate_trait_object() {
        let mut gate: Box<dyn OperatorGate> = Box::new(RecordingGate {
            acknowledged: vec![],
        });
        gate.await_acknowledgement("18240054").await.unwrap();
    }
}
