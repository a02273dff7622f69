//! Block/CAPTCHA detection
//!
//! Stateless classification over the current page state `(markup, url)`:
//! - Structural markers: challenge-related elements and attributes
//! - Textual phrases: rate-limit / access-denied wording, case-insensitive
//! - URL-path heuristics for known challenge endpoints
//!
//! Absent elements are treated as "not present", never as an error. The
//! target serves both Czech and English denial wording, so both phrase sets
//! are matched.

use scraper::{Html, Selector};
use url::Url;

/// Structural markers that indicate a challenge page
const CHALLENGE_SELECTORS: &[&str] = &[
    "form[action*='captcha']",
    "input#captcha",
    "img[src*='captcha']",
    "div.g-recaptcha",
    "iframe[src*='challenge']",
];

/// Blocking phrases matched case-insensitively against the page text
const BLOCKING_PHRASES: &[&str] = &[
    "captcha",
    "access denied",
    "access forbidden",
    "too many requests",
    "přístup byl omezen",
    "přístup byl zakázán",
    "přístup zakázán",
    "denní limit požadavků",
    "překročil denní limit",
    "došlo k překročení",
    "omezení přístupu",
    "omezená funkčnost",
    "služba není dostupná",
];

/// URL path segments of known challenge endpoints
const CHALLENGE_PATH_SEGMENTS: &[&str] = &["captcha", "challenge", "denied", "blocked"];

/// Result of classifying a page state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No block or challenge signal found
    Clear,

    /// The page carries a block or challenge signal
    Blocked(BlockSignal),
}

impl Detection {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// What triggered a block classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSignal {
    /// A challenge-related element matched one of the structural markers
    ChallengeElement(&'static str),

    /// A blocking phrase appeared in the page text
    BlockingPhrase(&'static str),

    /// The URL points at a known challenge endpoint
    ChallengeEndpoint(String),
}

impl std::fmt::Display for BlockSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChallengeElement(selector) => write!(f, "challenge element '{}'", selector),
            Self::BlockingPhrase(phrase) => write!(f, "blocking phrase '{}'", phrase),
            Self::ChallengeEndpoint(path) => write!(f, "challenge endpoint '{}'", path),
        }
    }
}

/// Classifies the current page state
///
/// # Arguments
///
/// * `markup` - The page's HTML source
/// * `url` - The page's current URL
///
/// # Returns
///
/// `Detection::Blocked` with the first matching signal, or `Detection::Clear`.
pub fn classify_page(markup: &str, url: &str) -> Detection {
    if let Some(path) = challenge_path(url) {
        return Detection::Blocked(BlockSignal::ChallengeEndpoint(path));
    }

    let document = Html::parse_document(markup);

    for selector_str in CHALLENGE_SELECTORS {
        // Selectors are compile-time constants; a parse failure would be a bug
        // in this table, so it is skipped rather than surfaced.
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if document.select(&selector).next().is_some() {
            return Detection::Blocked(BlockSignal::ChallengeElement(selector_str));
        }
    }

    let page_text = document
        .root_element()
        .text()
        .collect::<String>()
        .to_lowercase();

    for phrase in BLOCKING_PHRASES {
        if page_text.contains(phrase) {
            return Detection::Blocked(BlockSignal::BlockingPhrase(phrase));
        }
    }

    Detection::Clear
}

/// Returns the URL path when it names a known challenge endpoint
fn challenge_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path().to_lowercase();

    CHALLENGE_PATH_SEGMENTS
        .iter()
        .any(|segment| path.contains(segment))
        .then(|| parsed.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_PAGE: &str = r#"
        <html><body>
            <h1>Company registry</h1>
            <table><tr><td>Annual report</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_clear_page() {
        let detection = classify_page(PLAIN_PAGE, "https://registry.example/search");
        assert_eq!(detection, Detection::Clear);
    }

    #[test]
    fn test_challenge_form_detected() {
        let markup = r#"<html><body><form action="/verify/captcha"><input/></form></body></html>"#;
        let detection = classify_page(markup, "https://registry.example/search");
        assert!(detection.is_blocked());
        assert!(matches!(
            detection,
            Detection::Blocked(BlockSignal::ChallengeElement(_))
        ));
    }

    #[test]
    fn test_captcha_input_detected() {
        let markup = r#"<html><body><input id="captcha" type="text"/></body></html>"#;
        assert!(classify_page(markup, "https://registry.example/").is_blocked());
    }

    #[test]
    fn test_captcha_image_detected() {
        let markup = r#"<html><body><img src="/img/captcha.png"/></body></html>"#;
        assert!(classify_page(markup, "https://registry.example/").is_blocked());
    }

    #[test]
    fn test_blocking_phrase_case_insensitive() {
        let markup = "<html><body><div>ACCESS DENIED for your network</div></body></html>";
        let detection = classify_page(markup, "https://registry.example/");
        assert!(matches!(
            detection,
            Detection::Blocked(BlockSignal::BlockingPhrase("access denied"))
        ));
    }

    #[test]
    fn test_czech_rate_limit_phrase() {
        let markup =
            "<html><body><p>Váš přístup byl omezen z důvodu velkého počtu dotazů.</p></body></html>";
        assert!(classify_page(markup, "https://registry.example/").is_blocked());
    }

    #[test]
    fn test_challenge_url_detected() {
        let detection = classify_page(PLAIN_PAGE, "https://registry.example/verify/captcha?id=7");
        assert!(matches!(
            detection,
            Detection::Blocked(BlockSignal::ChallengeEndpoint(_))
        ));
    }

    #[test]
    fn test_unparseable_url_falls_through_to_markup() {
        // A malformed URL is never an error, classification continues
        assert_eq!(classify_page(PLAIN_PAGE, "not a url"), Detection::Clear);
    }

    #[test]
    fn test_empty_markup_is_clear() {
        assert_eq!(
            classify_page("", "https://registry.example/"),
            Detection::Clear
        );
    }
}
