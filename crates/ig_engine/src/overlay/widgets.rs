//! Overlay widget storage
//!
//! One struct per registrable control kind, built at registration time and
//! replayed every frame. Bound storage is shared through reference-counted
//! cells, so the overlay holds a real stake in the memory it mutates instead
//! of a raw pointer into the caller.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Shared float storage bound to a slider
pub type SharedValue = Rc<Cell<f32>>;

/// Shared string storage bound to a text field
pub type SharedText = Rc<RefCell<String>>;

/// Opaque handle returned by widget registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub(crate) u64);

pub(crate) struct SliderWidget {
    pub(crate) label: String,
    pub(crate) value: SharedValue,
    pub(crate) lower_bound: f32,
    pub(crate) upper_bound: f32,
}

pub(crate) struct TextFieldWidget {
    pub(crate) label: String,
    pub(crate) buffer: SharedText,
    pub(crate) capacity: usize,
}

pub(crate) struct ButtonWidget {
    pub(crate) label: String,
    pub(crate) callback: Box<dyn FnMut()>,
}

/// Registry of label names used for display-label deconfliction
///
/// The UI framework routes interaction by label, so two controls sharing a
/// label would both register input when either is touched. The first
/// registration of a raw label keeps it unchanged; the Nth collision gets a
/// `" (N)"` suffix. Entries are never removed for the overlay's lifetime.
#[derive(Default)]
pub(crate) struct LabelRegistry {
    counts: HashMap<String, u32>,
}

impl LabelRegistry {
    pub(crate) fn register(&mut self, raw: &str) -> String {
        match self.counts.get_mut(raw) {
            Some(count) => {
                *count += 1;
                format!("{raw} ({count})")
            }
            None => {
                self.counts.insert(raw.to_string(), 0);
                raw.to_string()
            }
        }
    }
}

/// Trim an edited buffer back to its registered capacity, respecting char
/// boundaries
pub(crate) fn clamp_to_capacity(text: &mut String, capacity: usize) {
    if text.len() > capacity {
        let mut end = capacity;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_keeps_raw_label() {
        let mut registry = LabelRegistry::default();
        assert_eq!(registry.register("speed"), "speed");
    }

    #[test]
    fn test_collisions_get_numbered_suffixes() {
        let mut registry = LabelRegistry::default();
        assert_eq!(registry.register("speed"), "speed");
        assert_eq!(registry.register("speed"), "speed (1)");
        assert_eq!(registry.register("speed"), "speed (2)");
    }

    #[test]
    fn test_distinct_labels_never_collide() {
        let mut registry = LabelRegistry::default();
        assert_eq!(registry.register("speed"), "speed");
        assert_eq!(registry.register("heading"), "heading");
        assert_eq!(registry.register("speed"), "speed (1)");
        assert_eq!(registry.register("heading"), "heading (1)");
    }

    #[test]
    fn test_clamp_to_capacity() {
        let mut text = String::from("abcdef");
        clamp_to_capacity(&mut text, 4);
        assert_eq!(text, "abcd");

        let mut short = String::from("ab");
        clamp_to_capacity(&mut short, 4);
        assert_eq!(short, "ab");
    }

    #[test]
    fn test_clamp_respects_char_boundaries() {
        let mut text = String::from("aé"); // 'é' is two bytes, spanning 1..3
        clamp_to_capacity(&mut text, 2);
        assert_eq!(text, "a");
    }
}
