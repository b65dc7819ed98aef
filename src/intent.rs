//! Transcript classification
//!
//! Maps a lowercase transcript to one navigation intent using a fixed,
//! ordered list of keyword-containment rules. Matching is plain substring
//! containment, so "ride the rails" is a booking request and "overpriced"
//! asks for pricing.
//!
//! "pricing" is listed next to "price" because the word does not contain
//! "price", yet it is the phrase the fallback announcement tells users to say.

use serde::{Deserialize, Serialize};

/// Spoken fallback listing the commands the classifier understands
pub const UNRECOGNIZED_PHRASE: &str =
    "Sorry, I did not understand that command. Try saying book ride, pricing, about, or contact.";

/// Ordered classification rules; the first rule with any matching keyword wins
const RULES: &[(&[&str], Intent)] = &[
    (&["book", "ride"], Intent::BookRide),
    (&["price", "pricing", "cost"], Intent::ShowPricing),
    (&["about"], Intent::ShowAbout),
    (&["contact", "call"], Intent::ShowContact),
    (&["home"], Intent::GoHome),
];

/// Navigation intent derived from a transcript
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Open the booking dialog
    BookRide,
    /// Scroll to the pricing section
    ShowPricing,
    /// Scroll to the about section
    ShowAbout,
    /// Scroll to the contact section
    ShowContact,
    /// Scroll to the top of the page
    GoHome,
    /// Nothing matched
    Unrecognized,
}

impl Intent {
    /// Phrase spoken after the intent has been dispatched
    pub fn confirmation_phrase(&self) -> &'static str {
        match self {
            Intent::BookRide => "Opening booking form",
            Intent::ShowPricing => "Showing pricing information",
            Intent::ShowAbout => "Showing about section",
            Intent::ShowContact => "Showing contact information",
            Intent::GoHome => "Going to home",
            Intent::Unrecognized => UNRECOGNIZED_PHRASE,
        }
    }

    /// Check if this intent triggers a navigation action
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Intent::Unrecognized)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::BookRide => write!(f, "BookRide"),
            Intent::ShowPricing => write!(f, "ShowPricing"),
            Intent::ShowAbout => write!(f, "ShowAbout"),
            Intent::ShowContact => write!(f, "ShowContact"),
            Intent::GoHome => write!(f, "GoHome"),
            Intent::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Classify a normalized (lowercase) transcript
///
/// Total over all strings; callers lowercase before calling.
pub fn classify(transcript: &str) -> Intent {
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| transcript.contains(k)))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Unrecognized)
}

/// Lowercase a raw transcript the way the controller does before classifying
pub fn normalize(transcript: &str) -> String {
    transcript.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_or_ride_is_booking() {
        assert_eq!(classify("book a car"), Intent::BookRide);
        assert_eq!(classify("please ride downtown"), Intent::BookRide);
        assert_eq!(classify("facebook"), Intent::BookRide);
    }

    #[test]
    fn test_ride_matches_as_substring() {
        // Known over-match: no word boundaries
        assert_eq!(classify("ride the rails"), Intent::BookRide);
        assert_eq!(classify("pride and prejudice"), Intent::BookRide);
    }

    #[test]
    fn test_pricing_keywords() {
        assert_eq!(classify("show me pricing"), Intent::ShowPricing);
        assert_eq!(classify("how much does it cost"), Intent::ShowPricing);
        assert_eq!(classify("overpriced"), Intent::ShowPricing);
    }

    #[test]
    fn test_fallback_commands_are_all_recognized() {
        for spoken in ["book ride", "pricing", "about", "contact"] {
            assert_ne!(classify(spoken), Intent::Unrecognized, "{spoken}");
        }
    }

    #[test]
    fn test_about_contact_home() {
        assert_eq!(classify("what about the weather"), Intent::ShowAbout);
        assert_eq!(classify("contact us"), Intent::ShowContact);
        assert_eq!(classify("call support"), Intent::ShowContact);
        assert_eq!(classify("go to home"), Intent::GoHome);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("book at this price"), Intent::BookRide);
        assert_eq!(classify("what does it cost to call"), Intent::ShowPricing);
        assert_eq!(classify("about calling home"), Intent::ShowAbout);
        assert_eq!(classify("call home"), Intent::ShowContact);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("xyz"), Intent::Unrecognized);
        assert_eq!(classify(""), Intent::Unrecognized);
        assert_eq!(classify("   "), Intent::Unrecognized);
    }

    #[test]
    fn test_classify_expects_normalized_input() {
        assert_eq!(classify("BOOK"), Intent::Unrecognized);
        assert_eq!(classify(&normalize("BOOK")), Intent::BookRide);
    }

    #[test]
    fn test_confirmation_phrases() {
        assert_eq!(Intent::BookRide.confirmation_phrase(), "Opening booking form");
        assert_eq!(
            Intent::ShowPricing.confirmation_phrase(),
            "Showing pricing information"
        );
        assert_eq!(Intent::Unrecognized.confirmation_phrase(), UNRECOGNIZED_PHRASE);
        assert!(!Intent::Unrecognized.is_actionable());
        assert!(Intent::GoHome.is_actionable());
    }
}
