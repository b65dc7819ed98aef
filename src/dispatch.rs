//! Intent dispatch
//!
//! Executes the page action for a classified intent against the host's
//! navigation surface, then announces the outcome.

use crate::intent::Intent;
use crate::speech::SpeechAnnouncer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Page navigation surface provided by the host
pub trait NavigationSurface: Send + Sync {
    /// Smooth-scroll to the element with `id`; returns false if no such element exists
    fn scroll_to_element(&self, id: &str) -> bool;

    /// Smooth-scroll the document to its top
    fn scroll_to_top(&self);

    /// Open the booking dialog
    fn open_booking_dialog(&self);
}

/// Section identifiers the dispatcher may scroll to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionIds {
    pub pricing: String,
    pub about: String,
    pub contact: String,
}

impl Default for SectionIds {
    fn default() -> Self {
        Self {
            pricing: "pricing".to_string(),
            about: "about".to_string(),
            contact: "contact".to_string(),
        }
    }
}

impl SectionIds {
    /// Section an intent scrolls to, if it scrolls to one
    pub fn target_for(&self, intent: Intent) -> Option<&str> {
        match intent {
            Intent::ShowPricing => Some(&self.pricing),
            Intent::ShowAbout => Some(&self.about),
            Intent::ShowContact => Some(&self.contact),
            Intent::BookRide | Intent::GoHome | Intent::Unrecognized => None,
        }
    }

    /// All section identifiers
    pub fn all(&self) -> [&str; 3] {
        [&self.pricing, &self.about, &self.contact]
    }
}

/// What a dispatch did to the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The page scrolled or the booking dialog opened
    Navigated,
    /// The target section is not on the page; nothing scrolled
    TargetMissing,
    /// The intent has no page action
    NoAction,
}

/// Maps intents to page actions and spoken confirmations
#[derive(Clone)]
pub struct ActionDispatcher {
    navigation: Arc<dyn NavigationSurface>,
    announcer: SpeechAnnouncer,
    sections: SectionIds,
}

impl ActionDispatcher {
    /// Create a dispatcher over the given navigation surface
    pub fn new(
        navigation: Arc<dyn NavigationSurface>,
        announcer: SpeechAnnouncer,
        sections: SectionIds,
    ) -> Self {
        Self {
            navigation,
            announcer,
            sections,
        }
    }

    /// Run the page action for `intent`, then announce it
    pub fn dispatch(&self, intent: Intent) -> DispatchOutcome {
        let outcome = match intent {
            Intent::BookRide => {
                self.navigation.open_booking_dialog();
                DispatchOutcome::Navigated
            }
            Intent::GoHome => {
                self.navigation.scroll_to_top();
                DispatchOutcome::Navigated
            }
            Intent::ShowPricing | Intent::ShowAbout | Intent::ShowContact => {
                // target_for covers every section intent
                let id = self.sections.target_for(intent).unwrap_or_default();
                if self.navigation.scroll_to_element(id) {
                    DispatchOutcome::Navigated
                } else {
                    debug!("Section '{}' not on page, skipping scroll", id);
                    DispatchOutcome::TargetMissing
                }
            }
            Intent::Unrecognized => DispatchOutcome::NoAction,
        };

        info!("Dispatched {} ({:?})", intent, outcome);
        self.announcer.announce(intent.confirmation_phrase());
        outcome
    }

    /// Section identifiers in use
    pub fn sections(&self) -> &SectionIds {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::UNRECOGNIZED_PHRASE;
    use crate::speech::{SpeechSynthesizer, UtteranceOptions};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Page {
        present: Vec<String>,
        actions: Mutex<Vec<String>>,
    }

    impl Page {
        fn with_sections(ids: &[&str]) -> Self {
            Self {
                present: ids.iter().map(|s| s.to_string()).collect(),
                actions: Mutex::new(Vec::new()),
            }
        }
    }

    impl NavigationSurface for Page {
        fn scroll_to_element(&self, id: &str) -> bool {
            if self.present.iter().any(|p| p == id) {
                self.actions.lock().push(format!("scroll:{}", id));
                true
            } else {
                false
            }
        }

        fn scroll_to_top(&self) {
            self.actions.lock().push("top".to_string());
        }

        fn open_booking_dialog(&self) {
            self.actions.lock().push("booking".to_string());
        }
    }

    #[derive(Default)]
    struct Voice {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for Voice {
        fn speak(&self, text: &str, _options: &UtteranceOptions) -> crate::Result<()> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }
    }

    fn dispatcher(page: Arc<Page>, voice: Arc<Voice>) -> ActionDispatcher {
        ActionDispatcher::new(
            page,
            SpeechAnnouncer::new(Some(voice), UtteranceOptions::default()),
            SectionIds::default(),
        )
    }

    #[test]
    fn test_intent_action_table() {
        let page = Arc::new(Page::with_sections(&["pricing", "about", "contact"]));
        let voice = Arc::new(Voice::default());
        let dispatcher = dispatcher(page.clone(), voice.clone());

        for intent in [
            Intent::BookRide,
            Intent::ShowPricing,
            Intent::ShowAbout,
            Intent::ShowContact,
            Intent::GoHome,
        ] {
            assert_eq!(dispatcher.dispatch(intent), DispatchOutcome::Navigated);
        }

        assert_eq!(
            *page.actions.lock(),
            vec![
                "booking",
                "scroll:pricing",
                "scroll:about",
                "scroll:contact",
                "top"
            ]
        );
        assert_eq!(
            *voice.spoken.lock(),
            vec![
                "Opening booking form",
                "Showing pricing information",
                "Showing about section",
                "Showing contact information",
                "Going to home"
            ]
        );
    }

    #[test]
    fn test_unrecognized_never_navigates() {
        let page = Arc::new(Page::with_sections(&["pricing", "about", "contact"]));
        let voice = Arc::new(Voice::default());
        let dispatcher = dispatcher(page.clone(), voice.clone());

        for _ in 0..5 {
            assert_eq!(
                dispatcher.dispatch(Intent::Unrecognized),
                DispatchOutcome::NoAction
            );
        }

        assert!(page.actions.lock().is_empty());
        let spoken = voice.spoken.lock();
        assert_eq!(spoken.len(), 5);
        assert!(spoken.iter().all(|s| s == UNRECOGNIZED_PHRASE));
    }

    #[test]
    fn test_missing_section_is_skipped() {
        let page = Arc::new(Page::with_sections(&["about"]));
        let voice = Arc::new(Voice::default());
        let dispatcher = dispatcher(page.clone(), voice.clone());

        assert_eq!(
            dispatcher.dispatch(Intent::ShowContact),
            DispatchOutcome::TargetMissing
        );
        assert!(page.actions.lock().is_empty());
        assert_eq!(*voice.spoken.lock(), vec!["Showing contact information"]);
    }

    #[test]
    fn test_custom_section_ids() {
        let page = Arc::new(Page::with_sections(&["fares"]));
        let sections = SectionIds {
            pricing: "fares".to_string(),
            ..SectionIds::default()
        };
        let dispatcher = ActionDispatcher::new(page.clone(), SpeechAnnouncer::silent(), sections);

        assert_eq!(
            dispatcher.dispatch(Intent::ShowPricing),
            DispatchOutcome::Navigated
        );
        assert_eq!(*page.actions.lock(), vec!["scroll:fares"]);
        assert_eq!(dispatcher.sections().all(), ["fares", "about", "contact"]);
    }
}
