//! Campaign orchestration
//!
//! This module contains the crawl controller and its collaborator seams:
//! - The target adapter contract (site-specific logic stays external)
//! - Human-assisted block recovery
//! - The per-identifier processing loop
//! - Campaign reporting

mod adapter;
mod controller;
mod recovery;
mod report;

pub use adapter::{AttemptError, BlockProbe, CrawlOutcome, DetectorProbe, TargetAdapter};
pub use controller::CampaignController;
pub use recovery::{ConsoleGate, OperatorGate};
pub use report::{CampaignEnd, CampaignReport};
