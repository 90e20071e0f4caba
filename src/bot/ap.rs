//! AP recovery

use std::time::Duration;

use crate::android::Controller;
use crate::game::ApItem;
use crate::vision::{markers, Recognizer, ScreenMatcher};

/// Restore AP with the first item in `items` that is on the recovery dialog.
///
/// Returns `false` when the list is empty or no item could be used; the
/// caller should stop the run.
pub fn recover_ap<C, M>(recognizer: &mut Recognizer<C, M>, items: &[ApItem], interval: Duration) -> bool
where
    C: Controller,
    M: ScreenMatcher,
{
    log::info!("Trying to recover AP");
    if items.is_empty() {
        log::warn!("No AP strategy given, AP ran out");
        return false;
    }

    recognizer.wait_and_refresh(interval);
    for item in items {
        if recognizer.find_and_tap(item.template_name(), None) {
            recognizer.wait_and_refresh(interval);
            recognizer.find_and_tap(markers::AP_CONFIRM, None);
            log::info!("Used {}", item);
            return true;
        }
        log::debug!("{} not available", item);
    }

    log::warn!("No AP item left among {:?}", items);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_recognizer, ScriptedMatcher};

    #[test]
    fn test_empty_strategy_stops() {
        let mut recognizer = test_recognizer(ScriptedMatcher::new());
        assert!(!recover_ap(&mut recognizer, &[], Duration::ZERO));
        assert!(recognizer.matcher().calls().is_empty());
        assert!(recognizer.controller().inputs.is_empty());
    }

    #[test]
    fn test_uses_first_available_item_in_order() {
        let mut matcher = ScriptedMatcher::new();
        matcher.set("silver_apple", 0.1);
        matcher.set("gold_apple", 0.95);
        matcher.set("rainbow_apple", 0.95);
        matcher.set(markers::AP_CONFIRM, 0.95);
        let mut recognizer = test_recognizer(matcher);

        let items = [ApItem::SilverApple, ApItem::GoldApple, ApItem::RainbowApple];
        assert!(recover_ap(&mut recognizer, &items, Duration::ZERO));

        let matcher = recognizer.matcher();
        assert_eq!(matcher.calls_to("silver_apple"), 1);
        assert_eq!(matcher.calls_to("gold_apple"), 1);
        assert_eq!(matcher.calls_to("rainbow_apple"), 0);
        assert_eq!(matcher.calls_to(markers::AP_CONFIRM), 1);
        // gold apple, then the confirm button
        assert_eq!(recognizer.controller().taps().len(), 2);
    }

    #[test]
    fn test_all_items_exhausted() {
        let mut matcher = ScriptedMatcher::new();
        matcher.set("gold_apple", 0.2);
        matcher.set("bronze_apple", 0.3);
        let mut recognizer = test_recognizer(matcher);

        let items = [ApItem::GoldApple, ApItem::BronzeApple];
        assert!(!recover_ap(&mut recognizer, &items, Duration::ZERO));
        assert!(recognizer.controller().taps().is_empty());
    }
}
