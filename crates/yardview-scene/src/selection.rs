//! Click-to-selection rules.

use std::collections::BTreeSet;

use crate::raycast::ClickResolution;

/// Selection after a click, or `None` when the click changes nothing.
///
/// - plain click on a tag selects only that tag
/// - multi-select click on a tag toggles its membership
/// - plain click on the background clears the selection
/// - multi-select click on the background is ignored
pub fn next_selection(
    current: &BTreeSet<String>,
    click: &ClickResolution,
) -> Option<BTreeSet<String>> {
    let next = match (&click.tag, click.multi_select) {
        (Some(tag), false) => BTreeSet::from([tag.clone()]),
        (Some(tag), true) => {
            let mut next = current.clone();
            if !next.remove(tag) {
                next.insert(tag.clone());
            }
            next
        }
        (None, false) => BTreeSet::new(),
        (None, true) => return None,
    };
    (next != *current).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(tag: Option<&str>, multi_select: bool) -> ClickResolution {
        ClickResolution {
            tag: tag.map(str::to_string),
            multi_select,
        }
    }

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_plain_click_replaces() {
        assert_eq!(
            next_selection(&set(&["A", "B"]), &click(Some("C"), false)),
            Some(set(&["C"]))
        );
    }

    #[test]
    fn test_multi_click_toggles() {
        assert_eq!(
            next_selection(&set(&["A"]), &click(Some("B"), true)),
            Some(set(&["A", "B"]))
        );
        assert_eq!(
            next_selection(&set(&["A", "B"]), &click(Some("A"), true)),
            Some(set(&["B"]))
        );
    }

    #[test]
    fn test_background_clicks() {
        assert_eq!(
            next_selection(&set(&["A"]), &click(None, false)),
            Some(set(&[]))
        );
        assert_eq!(next_selection(&set(&["A"]), &click(None, true)), None);
        assert_eq!(next_selection(&set(&[]), &click(None, false)), None);
    }

    #[test]
    fn test_reselecting_same_tag_is_noop() {
        assert_eq!(next_selection(&set(&["A"]), &click(Some("A"), false)), None);
    }
}
