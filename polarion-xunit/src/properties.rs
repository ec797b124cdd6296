// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::IndexMap;

/// A single `<property name=".." value=".."/>` entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new `Property` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Property
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Property::new(k, v)
    }
}

/// An ordered collection of properties with unique names.
///
/// Insertion order is preserved and determines the order of `<property>` elements in the
/// serialized document. Replacing the value of an existing entry keeps its position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertySet {
    entries: IndexMap<String, String>,
}

impl PropertySet {
    /// Creates an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value of the property called `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns true if a property called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Appends `property` if no property with the same name exists.
    ///
    /// Returns true if the property was added.
    pub fn insert_if_absent(&mut self, property: impl Into<Property>) -> bool {
        let Property { name, value } = property.into();
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, value);
        true
    }

    /// Replaces the value of the property with the same name, if it exists and its value differs.
    ///
    /// Returns the previous value if a replacement happened.
    pub fn overwrite_if_present(&mut self, property: impl Into<Property>) -> Option<String> {
        let Property { name, value } = property.into();
        let current = self.entries.get_mut(&name)?;
        if *current == value {
            return None;
        }
        Some(std::mem::replace(current, value))
    }

    /// Iterates over the properties in order, as `(name, value)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the property names in order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }
}

/// Collects properties; if a name repeats, the first occurrence wins.
impl<P: Into<Property>> FromIterator<P> for PropertySet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for property in iter {
            set.insert_if_absent(property);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let mut set = PropertySet::new();
        assert!(set.insert_if_absent(("a", "1")));
        assert!(set.insert_if_absent(("b", "2")));
        assert!(!set.insert_if_absent(("a", "3")));

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn overwrite_if_present_keeps_position() {
        let mut set: PropertySet = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();

        assert_eq!(set.overwrite_if_present(("b", "20")), Some("2".to_owned()));
        assert_eq!(set.overwrite_if_present(("b", "20")), None, "unchanged value is a no-op");
        assert_eq!(set.overwrite_if_present(("d", "4")), None, "absent name is a no-op");

        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("a", "1"), ("b", "20"), ("c", "3")]
        );
    }

    #[test]
    fn from_iter_first_occurrence_wins() {
        let set: PropertySet = [("x", "1"), ("y", "2"), ("x", "3")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("x"), Some("1"));
    }
}
