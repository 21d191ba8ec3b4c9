//! Per-pixel chat bubble detection.
//!
//! Messaging apps draw each message on a flat colored "bubble". The
//! rules below recognize the common bubble colors from a pixel's RGB
//! values alone; no layout analysis is involved. Rules are evaluated in
//! [`BubbleRule::ORDERED`] order and the first match wins, so the
//! reported rule is stable even where the color ranges overlap.
//!
//! All comparisons are strict (`>` / `<`). Changing any of them moves
//! the classification boundary and therefore the binarized output.

use serde::{Deserialize, Serialize};

/// Classification of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelClass {
    /// Background or text of a chat message bubble.
    Bubble,
    /// Anything else on the page.
    Generic,
}

/// One bubble color heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BubbleRule {
    /// `b > 200 && g > 200 && r < 100`: blue bubble with light text.
    BlueBubble,
    /// `b > 180 && g > 180 && r > 180`: light blue bubble.
    LightBlueBubble,
    /// `r > 200 && g > 200 && b < 100`: yellow bubble with dark text.
    YellowBubble,
    /// `r < 100 && g > 180 && b < 100`: green bubble.
    GreenBubble,
    /// `|r - g| < 10 && |g - b| < 10 && r > 200`: near-white gray bubble.
    GrayBubble,
}

impl BubbleRule {
    /// Evaluation order. The first matching rule classifies the pixel.
    pub const ORDERED: [Self; 5] = [
        Self::BlueBubble,
        Self::LightBlueBubble,
        Self::YellowBubble,
        Self::GreenBubble,
        Self::GrayBubble,
    ];

    /// Whether this rule accepts the given channel values.
    #[must_use]
    pub const fn matches(self, r: u8, g: u8, b: u8) -> bool {
        match self {
            Self::BlueBubble => b > 200 && g > 200 && r < 100,
            Self::LightBlueBubble => b > 180 && g > 180 && r > 180,
            Self::YellowBubble => r > 200 && g > 200 && b < 100,
            Self::GreenBubble => r < 100 && g > 180 && b < 100,
            Self::GrayBubble => r.abs_diff(g) < 10 && g.abs_diff(b) < 10 && r > 200,
        }
    }

    /// Position of this rule in [`Self::ORDERED`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlueBubble => "blue",
            Self::LightBlueBubble => "light-blue",
            Self::YellowBubble => "yellow",
            Self::GreenBubble => "green",
            Self::GrayBubble => "gray",
        }
    }
}

/// The first rule in [`BubbleRule::ORDERED`] that matches, if any.
#[must_use]
pub fn matching_rule(r: u8, g: u8, b: u8) -> Option<BubbleRule> {
    BubbleRule::ORDERED
        .into_iter()
        .find(|rule| rule.matches(r, g, b))
}

/// Classify one pixel from its red, green and blue channels.
#[must_use]
pub fn classify(r: u8, g: u8, b: u8) -> PixelClass {
    if matching_rule(r, g, b).is_some() {
        PixelClass::Bubble
    } else {
        PixelClass::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_blue_bubble_matches_first_rule() {
        assert_eq!(matching_rule(50, 220, 220), Some(BubbleRule::BlueBubble));
        assert_eq!(classify(50, 220, 220), PixelClass::Bubble);
    }

    #[test]
    fn uniform_light_gray_is_light_blue_rule() {
        // r > 200 is false, so the gray rule cannot fire; the light-blue
        // rule accepts it because every channel exceeds 180.
        assert_eq!(
            matching_rule(190, 190, 190),
            Some(BubbleRule::LightBlueBubble)
        );
        assert!(!BubbleRule::GrayBubble.matches(190, 190, 190));
    }

    #[test]
    fn yellow_bubble() {
        assert_eq!(matching_rule(230, 220, 40), Some(BubbleRule::YellowBubble));
    }

    #[test]
    fn green_bubble() {
        assert_eq!(matching_rule(40, 200, 60), Some(BubbleRule::GreenBubble));
    }

    #[test]
    fn near_white_gray_is_reported_as_light_blue() {
        assert!(BubbleRule::GrayBubble.matches(235, 232, 238));
        assert_eq!(
            matching_rule(235, 232, 238),
            Some(BubbleRule::LightBlueBubble)
        );
    }

    #[test]
    fn gray_rule_never_wins() {
        // The gray rule implies r > 200, g > 190 and b > 180, which the
        // light-blue rule already accepts.
        for r in 201..=255u8 {
            for g in r.saturating_sub(9)..=r.saturating_add(9) {
                for b in g.saturating_sub(9)..=g.saturating_add(9) {
                    if BubbleRule::GrayBubble.matches(r, g, b) {
                        assert_eq!(
                            matching_rule(r, g, b),
                            Some(BubbleRule::LightBlueBubble)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn index_follows_evaluation_order() {
        for (i, rule) in BubbleRule::ORDERED.into_iter().enumerate() {
            assert_eq!(rule.index(), i, "{}", rule.name());
        }
    }

    #[test]
    fn dark_pixels_are_generic() {
        assert_eq!(classify(0, 0, 0), PixelClass::Generic);
        assert_eq!(classify(120, 120, 120), PixelClass::Generic);
    }

    #[test]
    fn boundaries_are_strict() {
        // b and g must exceed 200, r must be below 100.
        assert!(!BubbleRule::BlueBubble.matches(50, 200, 220));
        assert!(!BubbleRule::BlueBubble.matches(100, 220, 220));
        assert!(BubbleRule::BlueBubble.matches(99, 201, 201));

        assert!(!BubbleRule::LightBlueBubble.matches(180, 200, 200));
        assert!(BubbleRule::LightBlueBubble.matches(181, 181, 181));

        assert!(!BubbleRule::YellowBubble.matches(220, 220, 100));
        assert!(BubbleRule::YellowBubble.matches(201, 201, 99));

        assert!(!BubbleRule::GreenBubble.matches(40, 180, 60));
        assert!(BubbleRule::GreenBubble.matches(99, 181, 99));

        assert!(!BubbleRule::GrayBubble.matches(210, 200, 200));
        assert!(BubbleRule::GrayBubble.matches(209, 200, 200));
        assert!(!BubbleRule::GrayBubble.matches(200, 200, 200));
    }

    #[test]
    fn generic_when_only_two_channels_qualify() {
        // g and b above 200 but r between 100 and 180.
        assert_eq!(classify(150, 220, 220), PixelClass::Generic);
    }

    #[test]
    fn classification_agrees_with_any_rule() {
        for r in (0..=255u8).step_by(5) {
            for g in (0..=255u8).step_by(5) {
                for b in (0..=255u8).step_by(5) {
                    let any = BubbleRule::ORDERED.iter().any(|rule| rule.matches(r, g, b));
                    assert_eq!(
                        classify(r, g, b) == PixelClass::Bubble,
                        any,
                        "mismatch at ({r}, {g}, {b})",
                    );
                }
            }
        }
    }
}
