use regex::Regex;
use std::sync::OnceLock;

use super::constants::{AFIS_PATTERN, GRIDSQUARE_PATTERN};
use super::error::ExtractorError;

/// GroupKey identifies an optics group: the GridSquare a movie was taken in, and its AFIS group.
///
/// The derived ordering (GridSquare first, then AFIS) is the order in which optics groups are
/// numbered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub grid_square: String,
    pub afis: u64,
}

impl GroupKey {
    pub fn new(grid_square: &str, afis: u64) -> Self {
        Self {
            grid_square: grid_square.to_string(),
            afis,
        }
    }
}

/// KeyExtractor pulls GroupKeys out of EPU acquisition filenames.
///
/// Each pattern is searched for anywhere in the name and the first capture group is taken as the
/// value. No normalization is done on the result.
#[derive(Debug, Clone)]
pub struct KeyExtractor {
    gridsquare: Regex,
    afis: Regex,
}

impl Default for KeyExtractor {
    /// Use the standard EPU patterns
    fn default() -> Self {
        Self {
            gridsquare: Regex::new(GRIDSQUARE_PATTERN).expect("Built-in GridSquare pattern"),
            afis: Regex::new(AFIS_PATTERN).expect("Built-in AFIS pattern"),
        }
    }
}

impl KeyExtractor {
    /// Create a KeyExtractor from custom patterns. Each pattern needs at least one capture group.
    pub fn new(gridsquare_pattern: &str, afis_pattern: &str) -> Result<Self, ExtractorError> {
        Ok(Self {
            gridsquare: compile(gridsquare_pattern)?,
            afis: compile(afis_pattern)?,
        })
    }

    pub fn extract_grid_square(&self, name: &str) -> Option<String> {
        self.gridsquare
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Any Unicode decimal digits are accepted. A digit run which overflows u64 is treated as no
    /// match.
    pub fn extract_afis(&self, name: &str) -> Option<u64> {
        self.afis
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_decimal(m.as_str()))
    }

    /// Get the full key for a filename. None unless both patterns match.
    pub fn extract(&self, name: &str) -> Option<GroupKey> {
        let grid_square = self.extract_grid_square(name)?;
        let afis = self.extract_afis(name)?;
        Some(GroupKey { grid_square, afis })
    }
}

fn decimal_digit() -> &'static Regex {
    static DIGIT: OnceLock<Regex> = OnceLock::new();
    DIGIT.get_or_init(|| Regex::new(r"^\d$").expect("Built-in digit pattern"))
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    decimal_digit().is_match(c.encode_utf8(&mut buf))
}

/// Value of a Unicode decimal digit (general category Nd).
///
/// Nd characters come in contiguous runs of ten, zero through nine, so the value is the offset
/// from the start of the run, modulo ten.
fn decimal_value(c: char) -> Option<u64> {
    if let Some(d) = c.to_digit(10) {
        return Some(d as u64);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start = prev as u32;
    }
    Some(((c as u32 - start) % 10) as u64)
}

fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u64, |acc, c| {
        acc.checked_mul(10)?.checked_add(decimal_value(c)?)
    })
}

fn compile(pattern: &str) -> Result<Regex, ExtractorError> {
    let regex = Regex::new(pattern)?;
    // captures_len includes the implicit group 0
    if regex.captures_len() < 2 {
        return Err(ExtractorError::NoCaptureGroup(pattern.to_string()));
    }
    Ok(regex)
}
