//! Slot value model for dynamic slot content
//!
//! Hosts feed data to dynamically managed slots as loosely typed values.
//! Containers are reference counted so a value can be shared between the
//! host-side store and the per-slot snapshots handed to slot handlers; the
//! copy strategy decides how much of that sharing is allowed.

use std::collections::BTreeMap;
use std::rc::Rc;

/// A loosely typed value passed to a slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    List(Rc<Vec<SlotValue>>),
    Map(Rc<BTreeMap<String, SlotValue>>),
}

impl SlotValue {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        SlotValue::Str(s.into())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, SlotValue::Null)
    }
}

impl Default for SlotValue {
    fn default() -> Self {
        SlotValue::Null
    }
}

impl From<bool> for SlotValue {
    fn from(v: bool) -> Self {
        SlotValue::Bool(v)
    }
}

impl From<f64> for SlotValue {
    fn from(v: f64) -> Self {
        SlotValue::Number(v)
    }
}

impl From<&str> for SlotValue {
    fn from(v: &str) -> Self {
        SlotValue::Str(v.into())
    }
}

/// How slot values are copied when handed to a slot handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeepCopyStrategy {
    /// Share the stored value as-is.
    #[default]
    None,
    /// Rebuild the top-level container, sharing nested containers.
    Simple,
    /// Rebuild the value recursively.
    SimpleWithRecursion,
}

impl DeepCopyStrategy {
    /// Copy a value according to this strategy.
    pub fn copy(self, value: &SlotValue) -> SlotValue {
        match self {
            DeepCopyStrategy::None => value.clone(),
            DeepCopyStrategy::Simple => match value {
                SlotValue::List(items) => SlotValue::List(Rc::new(items.as_ref().clone())),
                SlotValue::Map(entries) => SlotValue::Map(Rc::new(entries.as_ref().clone())),
                other => other.clone(),
            },
            DeepCopyStrategy::SimpleWithRecursion => match value {
                SlotValue::List(items) => SlotValue::List(Rc::new(
                    items.iter().map(|v| self.copy(v)).collect(),
                )),
                SlotValue::Map(entries) => SlotValue::Map(Rc::new(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), self.copy(v)))
                        .collect(),
                )),
                other => other.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_ignores_sharing() {
        let a = SlotValue::List(Rc::new(vec![SlotValue::Number(1.0)]));
        let b = SlotValue::List(Rc::new(vec![SlotValue::Number(1.0)]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_simple_copy_shares_nested_containers() {
        let inner = Rc::new(vec![SlotValue::Bool(true)]);
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), SlotValue::List(inner.clone()));
        let value = SlotValue::Map(Rc::new(map));

        let copied = DeepCopyStrategy::Simple.copy(&value);
        let SlotValue::Map(entries) = &copied else {
            panic!("expected a map");
        };
        let SlotValue::List(copied_inner) = &entries["k"] else {
            panic!("expected a list");
        };
        assert!(Rc::ptr_eq(copied_inner, &inner));
    }

    #[test]
    fn test_recursive_copy_rebuilds_nested_containers() {
        let inner = Rc::new(vec![SlotValue::Bool(true)]);
        let value = SlotValue::List(Rc::new(vec![SlotValue::List(inner.clone())]));

        let copied = DeepCopyStrategy::SimpleWithRecursion.copy(&value);
        let SlotValue::List(outer) = &copied else {
            panic!("expected a list");
        };
        let SlotValue::List(copied_inner) = &outer[0] else {
            panic!("expected a list");
        };
        assert!(!Rc::ptr_eq(copied_inner, &inner));
        assert_eq!(copied, value);
    }
}
