//! Menu highlight color and its `"R G B"` text encoding.
//!
//! The shell stores the color as three decimal integers separated by
//! whitespace, e.g. `"255 0 0"`.  The panel lets the user type that string
//! freely, so the rules here run on every keystroke:
//!
//! - tokens are separated by spaces or tabs (runs of either collapse);
//! - there must be exactly three tokens;
//! - each token, with surrounding whitespace trimmed, must parse as an
//!   integer in `0..=255`, so a trailing line break is tolerated.
//!
//! [`is_valid_rgb`] and [`compute_preview_color`] are pure and allocation-light
//! so they can drive a live preview.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters that separate the three components.
const SEPARATORS: [char; 2] = [' ', '\t'];

/// Errors produced while parsing `"R G B"` text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuColorError {
    /// The text did not contain exactly three components.
    #[error("expected 3 color components, found {0}")]
    WrongComponentCount(usize),

    /// A component was not an integer.
    #[error("color component {0:?} is not an integer")]
    NotAnInteger(String),

    /// A component was an integer outside `0..=255`.
    #[error("color component {0} is outside 0..=255")]
    OutOfRange(i64),
}

/// An RGB triple as stored in `Control Panel\Colors\Menu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MenuColor {
    /// Default menu color for a fresh profile.
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"R G B"` text.
    ///
    /// # Errors
    ///
    /// Returns [`MenuColorError`] describing the first rule the text breaks.
    pub fn parse(text: &str) -> Result<Self, MenuColorError> {
        let tokens: Vec<&str> = text.split(SEPARATORS).filter(|t| !t.is_empty()).collect();
        let [r, g, b] = tokens.as_slice() else {
            return Err(MenuColorError::WrongComponentCount(tokens.len()));
        };

        Ok(Self {
            r: parse_component(r)?,
            g: parse_component(g)?,
            b: parse_component(b)?,
        })
    }

    /// Returns the components as an `(r, g, b)` tuple.
    pub const fn to_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl Default for MenuColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Canonical storage encoding, e.g. `"255 255 255"`.
impl fmt::Display for MenuColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

impl FromStr for MenuColor {
    type Err = MenuColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_component(token: &str) -> Result<u8, MenuColorError> {
    let token = token.trim();
    let value: i64 = token
        .parse()
        .map_err(|_| MenuColorError::NotAnInteger(token.to_string()))?;
    u8::try_from(value).map_err(|_| MenuColorError::OutOfRange(value))
}

/// Returns `true` if `text` is three whitespace-separated integers in `0..=255`.
pub fn is_valid_rgb(text: &str) -> bool {
    MenuColor::parse(text).is_ok()
}

/// Computes the preview swatch for the color field.
///
/// Returns `None` for empty or invalid text; the caller keeps whatever preview
/// it is already showing in that case.
pub fn compute_preview_color(text: &str) -> Option<MenuColor> {
    if text.is_empty() {
        return None;
    }
    MenuColor::parse(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_rgb_accepts_in_range_triples() {
        assert!(is_valid_rgb("255 0 0"));
        assert!(is_valid_rgb("0 0 0"));
        assert!(is_valid_rgb("255 255 255"));
    }

    #[test]
    fn test_is_valid_rgb_tolerates_extra_spaces_and_tabs() {
        assert!(is_valid_rgb("  10   20  30 "));
        assert!(is_valid_rgb("10\t20\t\t30"));
        assert!(is_valid_rgb("\t1 \t2 3\t"));
    }

    #[test]
    fn test_is_valid_rgb_rejects_out_of_range_component() {
        assert!(!is_valid_rgb("256 0 0"));
        assert!(!is_valid_rgb("0 -1 0"));
    }

    #[test]
    fn test_is_valid_rgb_rejects_wrong_component_count() {
        assert!(!is_valid_rgb("1 2"));
        assert!(!is_valid_rgb("1 2 3 4"));
        assert!(!is_valid_rgb(""));
        assert!(!is_valid_rgb("   "));
    }

    #[test]
    fn test_is_valid_rgb_rejects_non_integers() {
        assert!(!is_valid_rgb("a b c"));
        assert!(!is_valid_rgb("1.0 2 3"));
        assert!(!is_valid_rgb("1,2,3"));
    }

    #[test]
    fn test_newline_is_not_a_separator() {
        assert!(!is_valid_rgb("1\n2 3"));
    }

    #[test]
    fn test_trailing_line_break_is_trimmed_from_last_component() {
        assert!(is_valid_rgb("1 2 3\n"));
        assert!(is_valid_rgb("1 2 3\r\n"));
        assert_eq!(compute_preview_color("10 20 30\r\n"), Some(MenuColor::new(10, 20, 30)));
    }

    #[test]
    fn test_line_break_alone_is_not_a_fourth_component() {
        assert_eq!(
            MenuColor::parse("1 2 3 \n"),
            Err(MenuColorError::WrongComponentCount(4))
        );
    }

    #[test]
    fn test_parse_reports_component_count() {
        assert_eq!(MenuColor::parse("1 2"), Err(MenuColorError::WrongComponentCount(2)));
        assert_eq!(MenuColor::parse("1 2 3 4 5"), Err(MenuColorError::WrongComponentCount(5)));
    }

    #[test]
    fn test_parse_reports_offending_component() {
        assert_eq!(
            MenuColor::parse("1 x 3"),
            Err(MenuColorError::NotAnInteger("x".to_string()))
        );
        assert_eq!(MenuColor::parse("1 2 300"), Err(MenuColorError::OutOfRange(300)));
    }

    #[test]
    fn test_parse_accepts_leading_plus_and_zero_padding() {
        assert_eq!(MenuColor::parse("+1 002 3"), Ok(MenuColor::new(1, 2, 3)));
    }

    #[test]
    fn test_compute_preview_color_returns_parsed_bytes() {
        assert_eq!(
            compute_preview_color("0 128 255").map(MenuColor::to_tuple),
            Some((0, 128, 255))
        );
    }

    #[test]
    fn test_compute_preview_color_returns_none_for_bad_or_empty_text() {
        assert_eq!(compute_preview_color("bad"), None);
        assert_eq!(compute_preview_color(""), None);
    }

    #[test]
    fn test_display_is_canonical_storage_text() {
        assert_eq!(MenuColor::WHITE.to_string(), "255 255 255");
        assert_eq!(MenuColor::parse("  9\t8  7 ").unwrap().to_string(), "9 8 7");
    }
}
