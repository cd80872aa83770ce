//! Sensitive-data flagging for the magpie scavenging pipeline.
//!
//! A [`Flagger`] inspects one image (its id, raster and OCR text) and
//! decides whether it shows signs of sensitive data such as credentials or
//! keys. Flaggers are applied in order per image; the first positive
//! finding wins under the default [`FlagPolicy`].

mod keyword;
mod pattern;
mod sentinel;

pub use self::keyword::KeywordFlagger;
pub use self::pattern::PatternFlagger;
pub use self::sentinel::FlagAll;
use image::DynamicImage;

/// An analyzer deciding, per image, whether it is sensitive and why.
///
/// Implementations must be total functions: an analyzer that cannot reach a
/// verdict reports no finding rather than failing. They should be stateless;
/// the pipeline confines each flagger instance to the hunting task, but a
/// stateless flagger stays trivially reusable across runs.
///
/// # Examples
///
/// ```
/// use image::DynamicImage;
/// use magpie_hunt::Flagger;
///
/// /// Flags screenshots that show a shell prompt.
/// struct PromptFlagger;
///
/// impl Flagger for PromptFlagger {
///     fn module_name(&self) -> &'static str {
///         "PROMPT_FLAGGER"
///     }
///
///     fn flag(&self, _image_id: &str, _content: &DynamicImage, text: &str) -> Option<String> {
///         text.lines()
///             .any(|line| line.trim_start().starts_with('$'))
///             .then(|| "shell prompt visible".to_string())
///     }
/// }
///
/// let flagger = PromptFlagger;
/// assert!(flagger.flag("id", &DynamicImage::new_rgb8(1, 1), "$ sudo -s").is_some());
/// assert!(flagger.flag("id", &DynamicImage::new_rgb8(1, 1), "a sunset").is_none());
/// ```
pub trait Flagger: Send + Sync {
    /// Stable, unique, human-readable module identifier. Recorded as the
    /// author of every finding this flagger produces.
    fn module_name(&self) -> &'static str;

    /// Analyse one image. `content` is read-only; implementations wanting
    /// to mutate the raster must work on their own copy.
    ///
    /// Returns `Some(comment)` with a human-readable justification when the
    /// image looks sensitive, `None` otherwise.
    fn flag(&self, image_id: &str, content: &DynamicImage, text: &str) -> Option<String>;
}

/// Provider of an ordered, ready-to-use flagger list.
pub trait FlaggerFactory {
    /// Initialized flaggers, in evaluation order.
    fn flaggers(&self) -> Vec<Box<dyn Flagger>>;
}

/// The built-in flagger set: pattern matching first, then keyword search.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFlaggerFactory;

impl FlaggerFactory for DefaultFlaggerFactory {
    fn flaggers(&self) -> Vec<Box<dyn Flagger>> {
        vec![Box::new(PatternFlagger::new()), Box::new(KeywordFlagger::new())]
    }
}

/// How many findings a single image may produce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FlagPolicy {
    /// Stop at the first flagger that reports a finding: one result per
    /// image.
    #[default]
    FirstMatch,
    /// Let every flagger report: an image may yield one result per flagger.
    EveryMatch,
}
