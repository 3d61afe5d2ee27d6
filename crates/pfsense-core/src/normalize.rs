//! String-or-list normalization.
//!
//! Several alias fields arrive either as a list of strings or as a single
//! string with entries joined by a separator. [`DelimitedList`] accepts both
//! and always holds a list.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Separator used to split a single-string field into entries.
pub trait Delimiter {
    /// The separator.
    const SEPARATOR: &'static str;
}

/// Entries separated by a single space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space;

impl Delimiter for Space {
    const SEPARATOR: &'static str = " ";
}

/// Entries separated by `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoublePipe;

impl Delimiter for DoublePipe {
    const SEPARATOR: &'static str = "||";
}

/// A list of strings that may also be supplied as one delimited string.
pub struct DelimitedList<D> {
    items: Vec<String>,
    _delimiter: PhantomData<D>,
}

/// Alias addresses, space separated.
pub type AddressList = DelimitedList<Space>;

/// Alias entry descriptions, `||` separated.
pub type DetailList = DelimitedList<DoublePipe>;

impl<D: Delimiter> DelimitedList<D> {
    /// Wrap an existing list unchanged.
    #[must_use]
    pub const fn new(items: Vec<String>) -> Self {
        Self {
            items,
            _delimiter: PhantomData,
        }
    }

    /// Split a single string on the separator.
    ///
    /// A string without the separator becomes a one-element list, including
    /// the empty string.
    #[must_use]
    pub fn from_delimited(value: &str) -> Self {
        let items = if value.contains(D::SEPARATOR) {
            value.split(D::SEPARATOR).map(str::to_string).collect()
        } else {
            vec![value.to_string()]
        };
        Self::new(items)
    }

    /// Join the entries back into one string.
    #[must_use]
    pub fn to_delimited_string(&self) -> String {
        self.items.join(D::SEPARATOR)
    }
}

impl<D> DelimitedList<D> {
    /// Entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Consume into the entries.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }
}

// Manual impls so `D` needs no bounds of its own.
impl<D> Clone for DelimitedList<D> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _delimiter: PhantomData,
        }
    }
}

impl<D> fmt::Debug for DelimitedList<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<D> PartialEq for DelimitedList<D> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<D> Eq for DelimitedList<D> {}

impl<D> Default for DelimitedList<D> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            _delimiter: PhantomData,
        }
    }
}

impl<D: Delimiter> From<&str> for DelimitedList<D> {
    fn from(value: &str) -> Self {
        Self::from_delimited(value)
    }
}

impl<D: Delimiter> From<String> for DelimitedList<D> {
    fn from(value: String) -> Self {
        Self::from_delimited(&value)
    }
}

impl<D: Delimiter> From<Vec<String>> for DelimitedList<D> {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl<D: Delimiter> From<Vec<&str>> for DelimitedList<D> {
    fn from(items: Vec<&str>) -> Self {
        Self::new(items.into_iter().map(str::to_string).collect())
    }
}

impl<'a, D> IntoIterator for &'a DelimitedList<D> {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de, D: Delimiter> Deserialize<'de> for DelimitedList<D> {
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Self::from_delimited(&value),
            OneOrMany::Many(items) => Self::new(items),
        })
    }
}

impl<D> Serialize for DelimitedList<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.items.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_space_separated_string() {
        let list = AddressList::from("1.1.1.1 8.8.8.8");
        assert_eq!(list.as_slice(), ["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn test_double_pipe_separated_string() {
        let list = DetailList::from("cloudflare||google");
        assert_eq!(list.as_slice(), ["cloudflare", "google"]);
        assert_eq!(list.to_delimited_string(), "cloudflare||google");
    }

    #[test]
    fn test_string_without_separator() {
        assert_eq!(AddressList::from("10.0.0.1").as_slice(), ["10.0.0.1"]);
        // a single pipe is not a separator
        assert_eq!(DetailList::from("a|b").as_slice(), ["a|b"]);
        assert_eq!(AddressList::from("").as_slice(), [""]);
    }

    #[test]
    fn test_list_input_unchanged() {
        let list = AddressList::from(vec!["a b", "c"]);
        assert_eq!(list.as_slice(), ["a b", "c"]);
    }

    #[test]
    fn test_deserialize_both_shapes() {
        let from_string: AddressList = serde_json::from_value(json!("a b c")).unwrap();
        let from_list: AddressList = serde_json::from_value(json!(["a", "b", "c"])).unwrap();
        assert_eq!(from_string, from_list);
        assert_eq!(from_list.len(), 3);

        assert!(serde_json::from_value::<AddressList>(json!(42)).is_err());
    }

    #[test]
    fn test_serializes_as_list() {
        let list = DetailList::from("x||y");
        assert_eq!(serde_json::to_value(&list).unwrap(), json!(["x", "y"]));
    }
}
