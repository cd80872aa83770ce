//! Regex-based flagging of structured sensitive data.

use crate::Flagger;
use image::DynamicImage;
use regex::Regex;
use std::sync::LazyLock;

const MODULE_NAME: &str = "PATTERN_MATCHING_FLAGGER";

const EMAIL_ADDRESS: &str = r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+";
const IPV4_ADDRESS: &str =
    r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

// Compiling a Regex is expensive and the set never changes; share one
// compiled set across all flagger instances. Order matters: the first
// matching pattern is the one reported.
static PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| vec![Regex::new(EMAIL_ADDRESS).unwrap(), Regex::new(IPV4_ADDRESS).unwrap()]);

/// Flags text matching any of a fixed set of sensitive-data patterns:
/// email addresses and IPv4 addresses.
///
/// The finding quotes both the matching text and the pattern's source form,
/// as `"<match>" matched with regex: <pattern>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternFlagger;

impl PatternFlagger {
    pub fn new() -> Self {
        Self
    }
}

impl Flagger for PatternFlagger {
    fn module_name(&self) -> &'static str {
        MODULE_NAME
    }

    fn flag(&self, _image_id: &str, _content: &DynamicImage, text: &str) -> Option<String> {
        for pattern in PATTERNS.iter() {
            if let Some(found) = pattern.find(text) {
                return Some(format!("\"{}\" matched with regex: {}", found.as_str(), pattern.as_str()));
            }
        }
        None
    }
}
