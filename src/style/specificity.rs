//! 6-tuple cascade specificity calculation and comparison.
//!
//! Specificity determines which rule wins when multiple rules match the
//! same style node. The 6-tuple is:
//!
//! ```text
//! (band, important, id_count, class_count, type_count, source_order)
//! ```
//!
//! Fields are ordered so that `Ord` (lexicographic) gives the correct
//! result:
//! - Higher-priority provider band wins (user > application > settings >
//!   theme > fallback)
//! - `!important` beats normal
//! - More IDs beat fewer IDs
//! - More classes/pseudo-classes beat fewer
//! - More type selectors beat fewer
//! - Later source order wins as tie-breaker

use super::cascade::Priority;
use super::model::{Selector, SelectorComponent, SelectorPart};

/// Cascade specificity, ordered from highest to lowest priority field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// The provider band, `Priority` as a number (fallback lowest).
    pub band: u8,
    /// 1 if `!important`, 0 otherwise.
    pub important: u8,
    /// Number of ID selectors (`#id`).
    pub id_count: u16,
    /// Number of class + pseudo-class selectors (`.class`, `:hover`,
    /// `:first-child`).
    pub class_count: u16,
    /// Number of type selectors (`button`, `stack`).
    pub type_count: u16,
    /// Source order within the provider (later rules win ties).
    pub source_order: u32,
}

impl Specificity {
    /// Compute specificity from a parsed selector.
    pub fn from_selector(
        selector: &Selector,
        band: Priority,
        source_order: u32,
        important: bool,
    ) -> Self {
        let mut id_count: u16 = 0;
        let mut class_count: u16 = 0;
        let mut type_count: u16 = 0;

        for part in &selector.parts {
            if let SelectorPart::Compound(compound) = part {
                for component in &compound.components {
                    match component {
                        SelectorComponent::Id(_) => id_count += 1,
                        SelectorComponent::Class(_)
                        | SelectorComponent::State(_)
                        | SelectorComponent::Structural(_) => class_count += 1,
                        SelectorComponent::Type(_) => type_count += 1,
                        SelectorComponent::Universal => {
                            // Zero specificity.
                        }
                    }
                }
            }
        }

        Self {
            band: band as u8,
            important: u8::from(important),
            id_count,
            class_count,
            type_count,
            source_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::model::{CompoundSelector, Parity, Structural};
    use crate::style::node::StateFlags;

    fn simple_selector(components: Vec<SelectorComponent>) -> Selector {
        Selector {
            parts: vec![SelectorPart::Compound(CompoundSelector { components })],
        }
    }

    #[test]
    fn counts_per_component_kind() {
        let sel = simple_selector(vec![
            SelectorComponent::Type("button".into()),
            SelectorComponent::Class("suggested".into()),
            SelectorComponent::State(StateFlags::HOVER),
            SelectorComponent::Structural(Structural::NthChild(Parity::Odd)),
            SelectorComponent::Id("ok".into()),
        ]);
        let spec = Specificity::from_selector(&sel, Priority::Application, 0, false);
        assert_eq!(spec.type_count, 1);
        assert_eq!(spec.class_count, 3);
        assert_eq!(spec.id_count, 1);
    }

    #[test]
    fn universal_has_zero_specificity() {
        let sel = simple_selector(vec![SelectorComponent::Universal]);
        let spec = Specificity::from_selector(&sel, Priority::Application, 0, false);
        assert_eq!((spec.id_count, spec.class_count, spec.type_count), (0, 0, 0));
    }

    #[test]
    fn band_beats_everything_below() {
        let id_sel = simple_selector(vec![SelectorComponent::Id("main".into())]);
        let type_sel = simple_selector(vec![SelectorComponent::Type("button".into())]);
        let theme_id = Specificity::from_selector(&id_sel, Priority::Theme, 99, true);
        let user_type = Specificity::from_selector(&type_sel, Priority::User, 0, false);
        assert!(user_type > theme_id);
    }

    #[test]
    fn important_beats_normal_within_band() {
        let sel = simple_selector(vec![SelectorComponent::Type("button".into())]);
        let important = Specificity::from_selector(&sel, Priority::Theme, 0, true);
        let normal = Specificity::from_selector(&sel, Priority::Theme, 5, false);
        assert!(important > normal);
    }

    #[test]
    fn id_beats_class_beats_type() {
        let id = simple_selector(vec![SelectorComponent::Id("x".into())]);
        let class = simple_selector(vec![SelectorComponent::Class("x".into())]);
        let ty = simple_selector(vec![SelectorComponent::Type("x".into())]);
        let id = Specificity::from_selector(&id, Priority::Theme, 0, false);
        let class = Specificity::from_selector(&class, Priority::Theme, 0, false);
        let ty = Specificity::from_selector(&ty, Priority::Theme, 0, false);
        assert!(id > class);
        assert!(class > ty);
    }

    #[test]
    fn source_order_breaks_ties() {
        let sel = simple_selector(vec![SelectorComponent::Type("button".into())]);
        let earlier = Specificity::from_selector(&sel, Priority::Theme, 0, false);
        let later = Specificity::from_selector(&sel, Priority::Theme, 1, false);
        assert!(later > earlier);
    }
}
