//! Keyword-based flagging of likely-sensitive text.

use crate::Flagger;
use image::DynamicImage;

const MODULE_NAME: &str = "SENSITIVE_KEYWORD_FLAGGER";

// Case-insensitive. Ordered roughly by signal strength; the first keyword
// found is the one reported.
const KEYWORDS: &[&str] = &[
    "private",
    "key",
    "pgp",
    "wallet",
    "password",
    "ip address",
    "database",
    "passwd",
    "pwd",
    "pass",
    "ssh",
    "ftp",
    "smb",
    "root",
    "remember",
    "authentication",
    "user",
    "balance",
    "address",
    "token",
    "secret",
    "db_login",
    "session",
    "code",
];

/// Flags text containing any keyword commonly seen next to credentials,
/// keys, protocols or account details.
///
/// The search is a case-insensitive substring scan; the finding reports the
/// first listed keyword present as `Detected keyword: "<keyword>"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordFlagger;

impl KeywordFlagger {
    pub fn new() -> Self {
        Self
    }
}

impl Flagger for KeywordFlagger {
    fn module_name(&self) -> &'static str {
        MODULE_NAME
    }

    fn flag(&self, _image_id: &str, _content: &DynamicImage, text: &str) -> Option<String> {
        let haystack = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|keyword| haystack.contains(**keyword))
            .map(|keyword| format!("Detected keyword: \"{keyword}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(text: &str) -> Option<String> {
        KeywordFlagger::new().flag("img", &DynamicImage::new_rgb8(1, 1), text)
    }

    #[test]
    fn detects_keywords_regardless_of_case() {
        assert_eq!(flag("my PASSWORD is hunter2").unwrap(), "Detected keyword: \"password\"");
        assert_eq!(flag("my password is hunter2").unwrap(), "Detected keyword: \"password\"");
    }

    #[test]
    fn reports_the_first_listed_keyword() {
        // "private" precedes "key" in the list and both are present.
        assert_eq!(flag("private key attached").unwrap(), "Detected keyword: \"private\"");
    }

    #[test]
    fn detects_multi_word_keywords() {
        assert_eq!(flag("static IP address: 10.1.1.1").unwrap(), "Detected keyword: \"ip address\"");
    }

    #[test]
    fn clean_text_is_not_flagged() {
        assert!(flag("a screenshot of a sunset").is_none());
        assert!(flag("").is_none());
    }
}
