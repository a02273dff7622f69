//! Randomized browser fingerprint profiles
//!
//! Each session draws an independent profile: user agent, viewport, and
//! reported hardware properties. The exact distribution is a policy
//! parameter, not a correctness requirement; the weights below roughly
//! follow desktop browser share so no single profile stands out.

use rand::seq::SliceRandom;
use rand::Rng;

const CHROME_VERSIONS: &[&str] = &["110.0.5481", "111.0.5563", "112.0.5615", "113.0.5672"];
const FIREFOX_VERSIONS: &[&str] = &["109.0", "110.0", "111.0", "112.0", "113.0"];
const SAFARI_VERSIONS: &[&str] = &["15.6", "16.1", "16.3", "16.4"];

const OS_STRINGS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
];

const PLATFORMS: &[&str] = &["Win32", "MacIntel", "Linux x86_64"];

const VIEWPORT_WIDTHS: &[u32] = &[1366, 1440, 1536, 1920, 2048];
const VIEWPORT_HEIGHTS: &[u32] = &[768, 900, 864, 1080, 1152];
const HARDWARE_CONCURRENCY: &[u8] = &[2, 4, 6, 8];

/// One independently drawn browser identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub hardware_concurrency: u8,
    pub platform: &'static str,
}

impl FingerprintProfile {
    /// Draws a fresh randomized profile
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();

        let os = OS_STRINGS.choose(&mut rng).copied().unwrap_or(OS_STRINGS[0]);
        let roll: f64 = rng.gen();

        // Roughly 60% Chrome, 30% Firefox, 10% Safari
        let user_agent = if roll < 0.6 {
            let version = CHROME_VERSIONS.choose(&mut rng).copied().unwrap_or("112.0.5615");
            format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
                os, version
            )
        } else if roll < 0.9 {
            let version = FIREFOX_VERSIONS.choose(&mut rng).copied().unwrap_or("112.0");
            format!(
                "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
                os, version, version
            )
        } else {
            let version = SAFARI_VERSIONS.choose(&mut rng).copied().unwrap_or("16.4");
            format!(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/{} Safari/605.1.15",
                version
            )
        };

        Self {
            user_agent,
            viewport: (
                *VIEWPORT_WIDTHS.choose(&mut rng).unwrap_or(&1920),
                *VIEWPORT_HEIGHTS.choose(&mut rng).unwrap_or(&1080),
            ),
            hardware_concurrency: *HARDWARE_CONCURRENCY.choose(&mut rng).unwrap_or(&4),
            platform: PLATFORMS.choose(&mut rng).copied().unwrap_or("Win32"),
        }
    }
}
