//! Ordered field/value payload for INSERT and UPDATE statements.

use crate::error::DbResult;
use crate::value::Value;
use serde::de::{Deserialize, Deserializer};
use serde::Serialize;

/// Field/value pairs in insertion order.
///
/// Re-inserting an existing field replaces its value in place, so the field
/// keeps the position it was first added at. Both the generated SQL and the
/// parameter list walk the entries in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMap {
    entries: Vec<(String, Value)>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Merge pairs, keeping only fields listed in `fields` when given.
    pub fn merge<K, V>(
        &mut self,
        entries: impl IntoIterator<Item = (K, V)>,
        fields: Option<&[&str]>,
    ) where
        K: Into<String>,
        V: Into<Value>,
    {
        for (field, value) in entries {
            let field = field.into();
            if allowed(&field, fields) {
                self.insert(field, value);
            }
        }
    }

    /// Merge the members of a JSON object in document order.
    ///
    /// Arrays and nested objects cannot be bound as parameters and are
    /// skipped. Anything other than an object contributes nothing.
    pub fn merge_json(&mut self, json: &serde_json::Value, fields: Option<&[&str]>) {
        let Some(object) = json.as_object() else {
            return;
        };
        for (field, member) in object {
            if !allowed(field, fields) {
                continue;
            }
            if let Some(value) = Value::from_json(member) {
                self.insert(field.clone(), value);
            }
        }
    }

    /// Serialize `source` to JSON and merge its members.
    pub fn merge_serialized<T: Serialize + ?Sized>(
        &mut self,
        source: &T,
        fields: Option<&[&str]>,
    ) -> DbResult<()> {
        let json = serde_json::to_value(source)?;
        self.merge_json(&json, fields);
        Ok(())
    }
}

fn allowed(field: &str, fields: Option<&[&str]>) -> bool {
    fields.is_none_or(|list| list.contains(&field))
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = DataMap::new();
        map.merge(iter, None);
        map
    }
}

impl IntoIterator for DataMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Reads a JSON-like object; non-scalar members are skipped.
impl<'de> Deserialize<'de> for DataMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut data = DataMap::new();
        data.merge_json(&serde_json::Value::Object(object), None);
        Ok(data)
    }
}

/// Build a [`DataMap`] from `field => value` pairs.
///
/// ```ignore
/// let data = pgquery::data! { "id" => 1, "name" => "John" };
/// ```
#[macro_export]
macro_rules! data {
    () => {
        $crate::DataMap::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::DataMap::new();
        $(map.insert($field, $value);)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reinsert_keeps_position() {
        let mut map = DataMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        assert_eq!(map.fields().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn merge_respects_filter() {
        let mut map = DataMap::new();
        map.merge([("id", 1), ("age", 30), ("score", 7)], Some(&["id", "score"][..]));
        assert_eq!(map.fields().collect::<Vec<_>>(), vec!["id", "score"]);
    }

    #[test]
    fn merge_json_skips_unbindable_members() {
        let mut map = DataMap::new();
        map.merge_json(
            &json!({"name": "John", "tags": ["a"], "meta": {"x": 1}, "id": 4}),
            None,
        );
        assert_eq!(map.fields().collect::<Vec<_>>(), vec!["name", "id"]);
    }

    #[test]
    fn merge_serialized_uses_struct_field_order() {
        #[derive(Serialize)]
        struct Person {
            id: i64,
            chat_id: i64,
            name: String,
        }

        let mut map = DataMap::new();
        map.merge_serialized(
            &Person {
                id: 1,
                chat_id: 9,
                name: "Mary".into(),
            },
            Some(&["id", "name"][..]),
        )
        .unwrap();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("id", &Value::Int(1)), ("name", &Value::from("Mary"))]
        );
    }

    #[test]
    fn data_macro_builds_in_order() {
        let map = crate::data! { "id" => 1, "name" => "John" };
        assert_eq!(map.fields().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(map.values().cloned().collect::<Vec<_>>(), vec![Value::Int(1), Value::from("John")]);
    }
}
