//! Collision-resistant local filenames for acquired media.
//!
//! Every artifact is stored as `<8-char-id>_<sanitized-title>.<ext>`. The
//! random prefix makes concurrent requests for the same media independent;
//! the sanitized title keeps the file recognisable when inspecting storage.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Maximum number of title characters kept in a filename.
const MAX_TITLE_CHARS: usize = 100;

/// Generates the 8-character random file-id prefix.
#[must_use]
pub fn file_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Replaces characters illegal in filenames with `_` and truncates the
/// result to 100 characters.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(MAX_TITLE_CHARS));
    for ch in title.chars().take(MAX_TITLE_CHARS) {
        out.push(match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        });
    }
    let trimmed = out.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        "media".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the filename stem `<id>_<sanitized-title>` without an extension.
#[must_use]
pub fn media_file_stem(title: &str) -> String {
    format!("{}_{}", file_id(), sanitize_title(title))
}

/// Builds a complete filename `<id>_<sanitized-title>.<ext>`.
#[must_use]
pub fn media_file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", media_file_stem(title))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_eight_alphanumeric_chars() {
        let id = file_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()), "{id}");
    }

    #[test]
    fn test_file_ids_differ_between_calls() {
        // Collision-resistant, not guaranteed unique; two draws matching
        // would be a 1-in-62^8 event.
        assert_ne!(file_id(), file_id());
    }

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        assert_eq!(sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn test_sanitize_keeps_spaces_and_unicode() {
        assert_eq!(sanitize_title("Никогда не сдавайся — live"), "Никогда не сдавайся — live");
    }

    #[test]
    fn test_sanitize_truncates_to_100_chars() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_title(&long).chars().count(), 100);
    }

    #[test]
    fn test_sanitize_empty_title_falls_back() {
        assert_eq!(sanitize_title(""), "media");
        assert_eq!(sanitize_title("???"), "___");
        assert_eq!(sanitize_title("   "), "media");
    }

    #[test]
    fn test_media_file_name_shape() {
        let name = media_file_name("pinterest", "mp4");
        let (stem, ext) = name.rsplit_once('.').expect("has extension");
        assert_eq!(ext, "mp4");
        let (id, title) = stem.split_once('_').expect("has id prefix");
        assert_eq!(id.len(), 8);
        assert_eq!(title, "pinterest");
    }
}
