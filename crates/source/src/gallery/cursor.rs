//! Sequential base-36 image identifier generation.

/// Gallery identifiers are 6 base-36 digits (`[0-9a-z]`).
const CODE_LENGTH: usize = 6;
const RADIX: u64 = 36;
/// Number of distinct identifiers: `36^6`.
const CODE_SPACE: u64 = RADIX.pow(CODE_LENGTH as u32);

/// A cursor over the gallery's 6-character base-36 identifier space.
///
/// Seeded with a base code which is normalised on construction; each call to
/// [`advance`](Self::advance) treats the current code as a base-36 integer,
/// increments it and re-normalises. The sequence is strictly increasing
/// within the 6-character space; incrementing past `zzzzzz` wraps around to
/// `000000` (the re-encode drops to a single digit and normalisation pads it
/// back out).
///
/// The seed itself is never yielded by `advance`; it only anchors where the
/// sequence starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCursor {
    current: String,
}

impl IdCursor {
    /// Create a cursor anchored at `base_code`, normalised via [`fix`](Self::fix).
    pub fn new(base_code: &str) -> Self {
        Self { current: Self::fix(base_code) }
    }

    /// The code most recently produced (or the normalised seed, before the
    /// first [`advance`](Self::advance)).
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Increment the code by one and return the new value.
    pub fn advance(&mut self) -> &str {
        // Infallible: normalised codes only contain base-36 digits.
        let value = u64::from_str_radix(&self.current, RADIX as u32).unwrap_or(0);
        self.current = Self::fix(&encode_base36((value + 1) % CODE_SPACE));
        &self.current
    }

    /// Normalise a candidate code into the valid identifier space.
    ///
    /// Strips punctuation and whitespace, lowercases, drops most-significant
    /// characters while longer than 6, and left-pads with `'0'` while
    /// shorter. Idempotent: fixing an already-valid code returns it
    /// unchanged.
    pub fn fix(code: &str) -> String {
        let mut cleaned: String =
            code.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect();
        if cleaned.len() > CODE_LENGTH {
            // Keep the least-significant digits.
            cleaned = cleaned.split_off(cleaned.len() - CODE_LENGTH);
        }
        while cleaned.len() < CODE_LENGTH {
            cleaned.insert(0, '0');
        }
        cleaned
    }
}

fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        // Infallible: the remainder is always below the radix.
        digits.push(char::from_digit((value % RADIX) as u32, RADIX as u32).unwrap());
        value /= RADIX;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_lowercases() {
        assert_eq!(IdCursor::fix("AaBbCc"), "aabbcc");
    }

    #[test]
    fn fix_pads_short_codes() {
        assert_eq!(IdCursor::fix("ab"), "0000ab");
        assert_eq!(IdCursor::fix(""), "000000");
    }

    #[test]
    fn fix_drops_most_significant_overflow() {
        assert_eq!(IdCursor::fix("1234567"), "234567");
        assert_eq!(IdCursor::fix("abcdefghij"), "efghij");
    }

    #[test]
    fn fix_strips_punctuation_and_whitespace() {
        assert_eq!(IdCursor::fix("ab-cd"), "00abcd");
        assert_eq!(IdCursor::fix(" a b.c "), "000abc");
    }

    #[test]
    fn fix_is_idempotent() {
        for code in ["aabbcc", "000010", "zzzzzz", "0000ab"] {
            assert_eq!(IdCursor::fix(&IdCursor::fix(code)), IdCursor::fix(code));
        }
    }

    #[test]
    fn advance_increments_in_base36() {
        let mut cursor = IdCursor::new("000000");
        assert_eq!(cursor.advance(), "000001");
        assert_eq!(cursor.advance(), "000002");
    }

    #[test]
    fn advance_carries_through_the_alphabet() {
        let mut cursor = IdCursor::new("00000z");
        assert_eq!(cursor.advance(), "000010");
    }

    #[test]
    fn advance_preserves_leading_zeros() {
        let mut cursor = IdCursor::new("00009z");
        assert_eq!(cursor.advance(), "0000a0");
    }

    #[test]
    fn advance_wraps_at_the_end_of_the_space() {
        let mut cursor = IdCursor::new("zzzzzz");
        assert_eq!(cursor.advance(), "000000");
    }

    #[test]
    fn seed_is_normalised_on_construction() {
        let cursor = IdCursor::new("XY-123");
        assert_eq!(cursor.current(), "0xy123");
    }
}
