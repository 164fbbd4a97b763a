use indexmap::map::{IndexMap, Iter, Keys};
use serde_json::Value;

/// Wire fields an object carried that its schema does not declare.
///
/// Keys keep the order they were read in and are written back in that order
/// after every declared field. Equality ignores order.
///
/// A wire type tag naming a type other than the one decoded is kept apart from the
/// entries and written back in place of the decoded type's own tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalData {
    entries: IndexMap<String, Value>,
    discriminator: Option<String>,
}

impl AdditionalData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces an entry. A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// The retained `"@odata.type"` tag, if the wire named a type that was not decoded.
    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn set_discriminator(&mut self, tag: Option<String>) {
        self.discriminator = tag;
    }
}

impl<'a> IntoIterator for &'a AdditionalData {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for AdditionalData {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for AdditionalData {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            discriminator: None,
        }
    }
}

impl<K: Into<String>> Extend<(K, Value)> for AdditionalData {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut data = AdditionalData::new();
        data.insert("b", 1);
        data.insert("a", 2);
        assert_eq!(data.insert("b", 3), Some(json!(1)));
        let keys: Vec<&String> = data.keys().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(data.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut data: AdditionalData = [("x", json!(1)), ("y", json!(2)), ("z", json!(3))]
            .into_iter()
            .collect();
        assert_eq!(data.remove("x"), Some(json!(1)));
        let keys: Vec<&String> = data.keys().collect();
        assert_eq!(keys, ["y", "z"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: AdditionalData = [("x", json!(1)), ("y", json!(null))].into_iter().collect();
        let b: AdditionalData = [("y", json!(null)), ("x", json!(1))].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_retained_tag_is_not_an_entry() {
        let mut data = AdditionalData::new();
        data.set_discriminator(Some("#ns.other".to_owned()));
        assert!(data.is_empty());
        assert_eq!(data.keys().count(), 0);
        assert_eq!(data.discriminator(), Some("#ns.other"));
        assert_ne!(data, AdditionalData::new());

        data.set_discriminator(None);
        assert_eq!(data, AdditionalData::new());
    }
}
