//! Anonymity-network control channel client
//!
//! Speaks the line-oriented control protocol over a local TCP connection:
//! an optional `AUTHENTICATE` command followed by `SIGNAL NEWNYM` to request
//! a new exit identity. Responses carry a leading numeric status code; `250`
//! means success. All socket operations run under a cooperative timeout.

use crate::{Result, VeilError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

const SUCCESS_PREFIX: &str = "250";

/// Client for the anonymity-network control channel
#[derive(Debug, Clone)]
pub struct ControlChannel {
    address: String,
    password: Option<String>,
    call_timeout: Duration,

    /// Wait after a successful renewal for the new circuit to settle
    settle_delay: Duration,
}

impl ControlChannel {
    pub fn new(address: &str, password: Option<String>, call_timeout: Duration) -> Self {
        Self {
            address: address.to_string(),
            password,
            call_timeout,
            settle_delay: Duration::from_secs(5),
        }
    }

    /// Overrides the post-renewal settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Requests a new exit identity from the network
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The control channel acknowledged the renewal
    /// * `Err(VeilError::ControlChannel)` - Connection, authentication, or
    ///   signal failure; the caller keeps the current identity
    pub async fn request_new_identity(&self) -> Result<()> {
        let stream = timeout(self.call_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| {
                VeilError::ControlChannel(format!("Timed out connecting to {}", self.address))
            })?
            .map_err(|e| {
                VeilError::ControlChannel(format!("Failed to connect to {}: {}", self.address, e))
            })?;

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        if let Some(password) = &self.password {
            let command = format!("AUTHENTICATE \"{}\"\r\n", password);
            self.exchange(&mut write_half, &mut reader, &command, "AUTHENTICATE")
                .await?;
        }

        self.exchange(&mut write_half, &mut reader, "SIGNAL NEWNYM\r\n", "SIGNAL NEWNYM")
            .await?;

        tracing::info!("New exit identity acquired");
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(())
    }

    /// Sends one command and checks the response's status prefix
    async fn exchange(
        &self,
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
        command: &str,
        label: &str,
    ) -> Result<()> {
        timeout(self.call_timeout, writer.write_all(command.as_bytes()))
            .await
            .map_err(|_| VeilError::ControlChannel(format!("Timed out sending {}", label)))?
            .map_err(|e| VeilError::ControlChannel(format!("Failed to send {}: {}", label, e)))?;

        let mut line = String::new();
        timeout(self.call_timeout, reader.read_line(&mut line))
            .await
            .map_err(|_| VeilError::ControlChannel(format!("Timed out awaiting {} reply", label)))?
            .map_err(|e| VeilError::ControlChannel(format!("Failed to read {} reply: {}", label, e)))?;

        if line.starts_with(SUCCESS_PREFIX) {
            Ok(())
        } else {
            Err(VeilError::ControlChannel(format!(
                "{} rejected: {}",
                label,
                line.trim()
            )))
        }
    }
}
