//! Per-selector metadata used by the cascade.
//!
//! A descriptor is built once from the authored selector text. It records the
//! pseudo-classes the selector depends on, derives the text that a plain DOM
//! query engine can evaluate, and computes the specificity.

use crate::pseudo::{PseudoClassEntry, PseudoSummary};
use crate::specificity::{Specificity, compute_specificity};
use crate::tree::SelectorNode;
use crate::parse_complex_selector;
use css_media_queries::MediaScope;

/// Metadata for one selector of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorDescriptor {
    /// Selector text as authored (trimmed).
    pub raw_text: String,
    /// `raw_text` with every state-dependent pseudo-class removed.
    pub filtered_text: String,
    /// Specificity of the authored selector.
    pub specificity: Specificity,
    /// Last state-dependent pseudo-class on the key compound, e.g. `:hover`.
    pub key_pseudo_class: Option<String>,
    /// State-dependent pseudo-classes, key compound first.
    pub non_structural: Vec<PseudoClassEntry>,
    /// Structural pseudo-classes, key compound first.
    pub structural: Vec<PseudoClassEntry>,
    /// Pseudo-element name, if the selector targets one.
    pub pseudo_element: Option<String>,
    /// `@media` conditions the rule is nested in.
    pub media: MediaScope,
    /// Set for selectors using `:not(...)`; they take no part in matching or overriding.
    pub ignored: bool,
}

impl SelectorDescriptor {
    /// Describe `raw` as it appears inside `media`.
    pub fn new(raw: &str, media: MediaScope) -> Self {
        let raw_text = raw.trim().to_owned();
        let ignored = raw_text.to_ascii_lowercase().contains(":not");
        let mut summary = PseudoSummary::default();
        let mut filtered_text = raw_text.clone();

        if !ignored && raw_text.contains(':') {
            match parse_complex_selector(&raw_text) {
                Ok(sel) => {
                    SelectorNode::from_complex(&sel).accept(&mut summary, 0);
                    for entry in &summary.non_structural {
                        filtered_text = remove_first_token(&filtered_text, &entry.pseudo.token());
                    }
                }
                Err(err) => {
                    log::debug!("No pseudo-class extraction for {raw_text:?}: {err}");
                }
            }
        }

        let pseudo_class_count = summary
            .non_structural
            .len()
            .saturating_add(summary.structural.len());
        let specificity = compute_specificity(
            &filtered_text,
            pseudo_class_count,
            summary.pseudo_element.is_some(),
        );

        Self {
            raw_text,
            filtered_text,
            specificity,
            key_pseudo_class: summary.key_pseudo_class,
            non_structural: summary.non_structural,
            structural: summary.structural,
            pseudo_element: summary.pseudo_element,
            media,
            ignored,
        }
    }

    /// True when the selector depends on element state.
    #[inline]
    pub fn is_non_structural_pseudo(&self) -> bool {
        !self.non_structural.is_empty()
    }

    #[inline]
    pub fn has_pseudo_element(&self) -> bool {
        self.pseudo_element.is_some()
    }

    /// True when both selectors have the same key pseudo-class (or neither has one).
    #[inline]
    pub fn compare_key_pseudo_class(&self, other: &Self) -> bool {
        self.key_pseudo_class == other.key_pseudo_class
    }

    /// Whether an element with `tag` and the given attributes can ever be in the
    /// state named by the key pseudo-class.
    pub fn check_pseudo_compatibility<'attrs>(
        &self,
        tag: &str,
        attribute: impl Fn(&str) -> Option<&'attrs str>,
    ) -> bool {
        let Some(key) = self.key_pseudo_class.as_deref() else {
            return true;
        };
        let is_tag = |name: &str| tag.eq_ignore_ascii_case(name);
        let input_type_is = |types: &[&str]| {
            is_tag("input")
                && attribute("type").is_some_and(|value| {
                    types
                        .iter()
                        .any(|candidate| value.trim().eq_ignore_ascii_case(candidate))
                })
        };
        match key {
            ":link" | ":visited" => is_tag("a") && attribute("href").is_some(),
            ":checked" => input_type_is(&["checkbox", "radio", "option"]),
            ":focus" => is_tag("textarea") || input_type_is(&["button", "text"]),
            ":active" => is_tag("a") || is_tag("textarea") || input_type_is(&["button", "text"]),
            _ => true,
        }
    }

    /// `self` is nested under strictly more `@media` conditions than `other`.
    #[inline]
    pub fn is_media_overwrite(&self, other: &Self) -> bool {
        self.media.is_overwrite_of(&other.media)
    }

    #[inline]
    pub fn has_equal_media(&self, other: &Self) -> bool {
        self.media.same_scope(&other.media)
    }
}

/// Remove the first occurrence of a pseudo-class token, ignoring ASCII case.
///
/// The match must end on a token boundary so `:focus` does not eat the start of
/// `:focus-within`. When the token is a whole compound of a longer selector, a
/// `*` takes its place so no combinator is left dangling.
fn remove_first_token(text: &str, token: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let needle = token.to_ascii_lowercase();
    let found = lowered.match_indices(&needle).find(|(start, _)| {
        let end = start.saturating_add(needle.len());
        lowered
            .as_bytes()
            .get(end)
            .is_none_or(|&next| !(next.is_ascii_alphanumeric() || matches!(next, b'-' | b'_' | b'(')))
    });
    let Some((start, _)) = found else {
        return text.to_owned();
    };
    let end = start.saturating_add(needle.len());
    let (Some(before), Some(after)) = (text.get(..start), text.get(end..)) else {
        return text.to_owned();
    };
    let opens_compound = before
        .chars()
        .last()
        .is_none_or(|prev| prev.is_whitespace() || matches!(prev, '>' | '+' | '~' | ','));
    let closes_compound = after
        .chars()
        .next()
        .is_none_or(|next| next.is_whitespace() || matches!(next, '>' | '+' | '~' | ','));
    let whole_selector = before.trim().is_empty() && after.trim().is_empty();
    let filler = if opens_compound && closes_compound && !whole_selector {
        "*"
    } else {
        ""
    };
    format!("{before}{filler}{after}").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Specificity;

    fn describe(raw: &str) -> SelectorDescriptor {
        SelectorDescriptor::new(raw, MediaScope::unscoped())
    }

    #[test]
    fn plain_selector_has_no_pseudo_metadata() {
        let desc = describe(" div.a > p ");
        assert_eq!(desc.raw_text, "div.a > p");
        assert_eq!(desc.filtered_text, "div.a > p");
        assert!(!desc.is_non_structural_pseudo());
        assert_eq!(desc.specificity, Specificity(0, 0, 1, 2));
    }

    #[test]
    fn key_pseudo_class_is_last_on_key_compound() {
        let desc = describe("nav a:hover:FOCUS");
        assert_eq!(desc.key_pseudo_class.as_deref(), Some(":focus"));
        assert_eq!(desc.non_structural.len(), 2);
        assert_eq!(desc.filtered_text, "nav a");
        assert_eq!(desc.specificity, Specificity(0, 0, 2, 2));
    }

    #[test]
    fn ancestor_pseudo_classes_are_not_key() {
        let desc = describe("li:hover > a");
        assert_eq!(desc.key_pseudo_class, None);
        assert!(desc.is_non_structural_pseudo());
        assert_eq!(desc.non_structural[0].depth, 1);
        assert_eq!(desc.non_structural[0].owner, "li");
        assert_eq!(desc.filtered_text, "li > a");
    }

    #[test]
    fn structural_pseudo_classes_stay_in_text() {
        let desc = describe("tr:nth-child(2n):hover td:first-child");
        assert_eq!(desc.filtered_text, "tr:nth-child(2n) td:first-child");
        assert_eq!(desc.structural.len(), 2);
        assert_eq!(desc.specificity, Specificity(0, 0, 3, 2));
    }

    #[test]
    fn focus_does_not_strip_focus_within() {
        let desc = describe("form:focus-within input:focus");
        assert_eq!(desc.filtered_text, "form input");
    }

    #[test]
    fn bare_pseudo_class_filters_to_nothing_or_universal() {
        assert_eq!(describe(":hover").filtered_text, "");
        assert_eq!(describe("div :hover").filtered_text, "div *");
        assert_eq!(describe(":hover > p").filtered_text, "* > p");
        assert_eq!(describe(":focus p").filtered_text, "* p");
        assert_eq!(describe("ul > :hover + li").filtered_text, "ul > * + li");
    }

    #[test]
    fn pseudo_element_is_recorded() {
        let desc = describe("a::before");
        assert!(desc.has_pseudo_element());
        assert_eq!(desc.pseudo_element.as_deref(), Some("before"));
        assert_eq!(desc.filtered_text, "a::before");
        assert_eq!(desc.specificity, Specificity(0, 0, 0, 2));
        assert!(describe("p:after").has_pseudo_element());
    }

    #[test]
    fn negation_marks_ignored() {
        let desc = describe(".x:NOT(.y):hover");
        assert!(desc.ignored);
        assert!(desc.non_structural.is_empty());
        assert_eq!(desc.filtered_text, ".x:NOT(.y):hover");
    }

    #[test]
    fn pseudo_compatibility() {
        let attrs = |pairs: &'static [(&'static str, &'static str)]| {
            move |name: &str| {
                pairs
                    .iter()
                    .find(|pair| pair.0 == name)
                    .map(|pair| pair.1)
            }
        };
        let link = describe("a:visited");
        assert!(link.check_pseudo_compatibility("a", attrs(&[("href", "/")])));
        assert!(!link.check_pseudo_compatibility("a", attrs(&[])));
        let checked = describe(":checked");
        assert!(checked.check_pseudo_compatibility("input", attrs(&[("type", "Checkbox")])));
        assert!(!checked.check_pseudo_compatibility("input", attrs(&[("type", "text")])));
        let focus = describe("*:focus");
        assert!(focus.check_pseudo_compatibility("textarea", attrs(&[])));
        assert!(!focus.check_pseudo_compatibility("a", attrs(&[])));
        assert!(describe("a:active").check_pseudo_compatibility("a", attrs(&[])));
        assert!(describe("div:hover").check_pseudo_compatibility("div", attrs(&[])));
    }

    #[test]
    fn media_comparison() {
        let plain = describe("p");
        let print = SelectorDescriptor::new("p", MediaScope::from_preludes(["print"]));
        let nested =
            SelectorDescriptor::new("p", MediaScope::from_preludes(["print", "(min-width: 10px)"]));
        assert!(!plain.has_equal_media(&print));
        assert!(nested.is_media_overwrite(&print));
        assert!(!print.is_media_overwrite(&nested));
        assert!(print.has_equal_media(&SelectorDescriptor::new(
            "a",
            MediaScope::from_preludes(["PRINT"])
        )));
    }
}
