//! Campaign reporting
//!
//! Per-identifier progress lines come from the controller via `tracing`;
//! this module holds the aggregate counters and renders the final summary,
//! which is printed on every exit path: normal completion, quota halt,
//! operator interrupt, or error termination.

use crate::proxy::EndpointStats;
use std::collections::HashMap;

/// Why the campaign stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignEnd {
    /// Every identifier was attempted or skipped
    Exhausted,

    /// The daily quota denied further requests
    QuotaDenied,

    /// The operator interrupted the run
    Interrupted,
}

impl CampaignEnd {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Exhausted => "identifier list exhausted",
            Self::QuotaDenied => "daily request quota exhausted",
            Self::Interrupted => "interrupted by operator",
        }
    }
}

/// Aggregate campaign counters
#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub not_found: u32,
    pub blocked: u32,
    pub errored: u32,
    pub skipped_resume: u32,

    /// Identifiers left untouched when the campaign stopped early
    pub remaining: u32,

    pub end: CampaignEnd,
}

impl CampaignReport {
    pub fn new() -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            not_found: 0,
            blocked: 0,
            errored: 0,
            skipped_resume: 0,
            remaining: 0,
            end: CampaignEnd::Exhausted,
        }
    }

    /// Renders the final summary
    ///
    /// # Arguments
    ///
    /// * `proxy_stats` - Per-endpoint success/failure counters, keyed by address
    /// * `quota_report` - Textual quota status from the tracker
    pub fn render(&self, proxy_stats: &HashMap<String, EndpointStats>, quota_report: &str) -> String {
        let mut out = String::new();

        out.push_str(&format!("=== Campaign Summary ({}) ===\n\n", self.end.describe()));
        out.push_str(&format!("Attempted:        {}\n", self.attempted));
        out.push_str(&format!("  Collected:      {}\n", self.succeeded));
        out.push_str(&format!("  No document:    {}\n", self.not_found));
        out.push_str(&format!("  Blocked:        {}\n", self.blocked));
        out.push_str(&format!("  Errors:         {}\n", self.errored));
        out.push_str(&format!("Skipped (ledger): {}\n", self.skipped_resume));

        if self.remaining > 0 {
            match self.end {
                CampaignEnd::QuotaDenied => out.push_str(&format!(
                    "Remaining:        {} identifier(s) skipped: daily quota exhausted\n",
                    self.remaining
                )),
                _ => out.push_str(&format!("Remaining:        {} identifier(s)\n", self.remaining)),
            }
        }

        out.push_str("\nProxy statistics:\n");
        if proxy_stats.is_empty() {
            out.push_str("  (no proxies used)\n");
        } else {
            // Stable output order for operators and tests
            let mut entries: Vec<_> = proxy_stats.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            for (address, stats) in entries {
                match stats.success_rate() {
                    Some(rate) => out.push_str(&format!(
                        "  {}: {} ok, {} failed, {:.1}% success\n",
                        address, stats.success, stats.failure, rate
                    )),
                    None => out.push_str(&format!("  {}: unused\n", address)),
                }
            }
        }

        out.push_str("\nQuota:\n");
        for line in quota_report.lines() {
            out.push_str(&format!("  {}\n", line));
        }

        out
    }
}

impl Default for CampaignReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_quota_halt_names_remaining() {
        let mut report = CampaignReport::new();
        report.attempted = 4;
        report.succeeded = 3;
        report.errored = 1;
        report.remaining = 96;
        report.end = CampaignEnd::QuotaDenied;

        let rendered = report.render(&HashMap::new(), "Used: 2950 of 2950");
        assert!(rendered.contains("daily request quota exhausted"));
        assert!(rendered.contains("96 identifier(s) skipped: daily quota exhausted"));
    }

    #[test]
    fn test_render_proxy_rates() {
        let mut stats = HashMap::new();
        stats.insert(
            "socks5://127.0.0.1:9150".to_string(),
            EndpointStats {
                success: 3,
                failure: 1,
            },
        );

        let report = CampaignReport::new();
        let rendered = report.render(&stats, "");
        assert!(rendered.contains("socks5://127.0.0.1:9150: 3 ok, 1 failed, 75.0% success"));
    }

    #[test]
    fn test_render_unused_proxy() {
        let mut stats = HashMap::new();
        stats.insert("http://a:8080".to_string(), EndpointStats::default());

        let rendered = CampaignReport::new().render(&stats, "");
        assert!(rendered.contains("http://a:8080: unused"));
    }
}
