//! URL classification: which acquisition strategy applies to a submitted link.
//!
//! Pure and deterministic; no network access. Matching is a case-insensitive
//! substring check against fixed domain-fragment sets, which keeps short-link
//! forms (`youtu.be`, `pin.it`) working without a full URL parse.

/// The acquisition strategy a submitted URL maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// The video platform (long-form links and `youtu.be` short links).
    YouTube,
    /// The pinboard platform (`pinterest.com` and `pin.it` short links).
    Pinterest,
    /// Anything else, including inputs that are not HTTP(S) URLs at all.
    Unsupported,
}

const YOUTUBE_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];
const PINTEREST_DOMAINS: [&str; 2] = ["pinterest.com", "pin.it"];

/// Classifies a submitted string.
///
/// Inputs not starting with an `http://`/`https://` scheme marker are
/// rejected as [`Platform::Unsupported`] before any domain matching.
#[must_use]
pub fn classify(input: &str) -> Platform {
    let lowered = input.trim().to_ascii_lowercase();
    if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
        return Platform::Unsupported;
    }
    if YOUTUBE_DOMAINS.iter().any(|domain| lowered.contains(domain)) {
        return Platform::YouTube;
    }
    if PINTEREST_DOMAINS.iter().any(|domain| lowered.contains(domain)) {
        return Platform::Pinterest;
    }
    Platform::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_http_input_is_unsupported() {
        assert_eq!(classify("not a url"), Platform::Unsupported);
        assert_eq!(classify(""), Platform::Unsupported);
        assert_eq!(classify("ftp://youtube.com/watch?v=abc"), Platform::Unsupported);
        assert_eq!(classify("youtube.com/watch?v=abc"), Platform::Unsupported);
    }

    #[test]
    fn test_youtube_domains_match() {
        assert_eq!(classify("https://youtube.com/watch?v=abc123"), Platform::YouTube);
        assert_eq!(classify("https://www.youtube.com/shorts/xyz"), Platform::YouTube);
        assert_eq!(classify("https://youtu.be/abc123"), Platform::YouTube);
        assert_eq!(classify("http://youtu.be/abc123"), Platform::YouTube);
    }

    #[test]
    fn test_pinterest_domains_match() {
        assert_eq!(classify("https://pinterest.com/pin/12345/"), Platform::Pinterest);
        assert_eq!(classify("https://www.pinterest.com/pin/12345/"), Platform::Pinterest);
        assert_eq!(classify("https://pin.it/xyz"), Platform::Pinterest);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify("HTTPS://YOUTU.BE/ABC"), Platform::YouTube);
        assert_eq!(classify("https://Pin.It/XYZ"), Platform::Pinterest);
    }

    #[test]
    fn test_other_http_hosts_are_unsupported() {
        assert_eq!(classify("https://vimeo.com/12345"), Platform::Unsupported);
        assert_eq!(classify("https://example.com/video.mp4"), Platform::Unsupported);
    }

    #[test]
    fn test_leading_whitespace_is_tolerated() {
        assert_eq!(classify("  https://youtu.be/abc123  "), Platform::YouTube);
    }
}
