//! Render-time data for templates
//!
//! [`TemplateData`] carries four independent mappings: scalar variables,
//! lists for `{{#each}}`, booleans for `{{#if}}`, and image payloads for
//! `{{#image}}`. It is read-only input to rendering; nothing here is
//! mutated by a render.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DocxError, Result};
use crate::image::ImageSize;

/// Binary image payload plus placement options for an image placeholder
#[derive(Debug, Clone, Default)]
pub struct ImageReference {
    pub data: Vec<u8>,
    pub size: Option<ImageSize>,
    pub alignment: Option<String>,
}

/// Data supplied to a render call
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    variables: HashMap<String, Value>,
    lists: HashMap<String, Vec<Value>>,
    conditions: HashMap<String, bool>,
    images: HashMap<String, ImageReference>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar variable; any serializable value is accepted
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.variables.insert(name.into(), value);
    }

    /// Set a list for `{{#each}}`; items are usually maps
    pub fn set_list<T: Serialize>(&mut self, name: impl Into<String>, items: Vec<T>) {
        let items = items
            .into_iter()
            .map(|item| serde_json::to_value(item).unwrap_or(Value::Null))
            .collect();
        self.lists.insert(name.into(), items);
    }

    /// Set a condition for `{{#if}}`
    pub fn set_condition(&mut self, name: impl Into<String>, value: bool) {
        self.conditions.insert(name.into(), value);
    }

    /// Supply binary image data for `{{#image}}`
    pub fn set_image(&mut self, name: impl Into<String>, image: ImageReference) {
        self.images.insert(name.into(), image);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.lists.get(name).map(|v| v.as_slice())
    }

    pub fn image(&self, name: &str) -> Option<&ImageReference> {
        self.images.get(name)
    }

    /// Merge another data set into this one; the other side wins on clashes
    pub fn merge(&mut self, other: TemplateData) {
        self.variables.extend(other.variables);
        self.lists.extend(other.lists);
        self.conditions.extend(other.conditions);
        self.images.extend(other.images);
    }

    /// Build data from any serializable struct
    ///
    /// Arrays become lists, booleans become conditions, everything else
    /// becomes a scalar variable.
    pub fn from_struct<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| DocxError::Template(format!("failed to serialize data: {}", e)))?;
        let Value::Object(map) = value else {
            return Err(DocxError::Template(
                "template data must serialize to a map".to_string(),
            ));
        };

        let mut data = Self::new();
        for (key, value) in map {
            match value {
                Value::Array(items) => {
                    data.lists.insert(key, items);
                }
                Value::Bool(b) => {
                    data.conditions.insert(key, b);
                }
                other => {
                    data.variables.insert(key, other);
                }
            }
        }
        Ok(data)
    }

    /// Evaluate a condition name
    ///
    /// Falls back from the condition map to a truthy variable, then to a
    /// non-empty list. Unknown names are false.
    pub fn is_truthy(&self, name: &str) -> bool {
        if let Some(&b) = self.conditions.get(name) {
            return b;
        }
        if let Some(value) = self.variables.get(name) {
            return value_is_truthy(value);
        }
        if let Some(list) = self.lists.get(name) {
            return !list.is_empty();
        }
        false
    }
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Render a scalar for substitution into text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_variable() {
        let mut data = TemplateData::new();
        data.set_variable("name", "World");
        data.set_variable("count", 3);
        assert_eq!(data.variable("name"), Some(&Value::from("World")));
        assert_eq!(value_to_string(data.variable("count").unwrap()), "3");
    }

    #[test]
    fn test_truthiness() {
        let mut data = TemplateData::new();
        data.set_condition("yes", true);
        data.set_condition("no", false);
        data.set_variable("zero", 0);
        data.set_variable("n", 5);
        data.set_variable("empty", "");
        data.set_variable("text", "x");
        data.set_list("items", vec!["a"]);
        data.set_list("none", Vec::<String>::new());

        assert!(data.is_truthy("yes"));
        assert!(!data.is_truthy("no"));
        assert!(!data.is_truthy("zero"));
        assert!(data.is_truthy("n"));
        assert!(!data.is_truthy("empty"));
        assert!(data.is_truthy("text"));
        assert!(data.is_truthy("items"));
        assert!(!data.is_truthy("none"));
        assert!(!data.is_truthy("undefined"));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = TemplateData::new();
        base.set_variable("a", 1);
        base.set_variable("b", 1);

        let mut overlay = TemplateData::new();
        overlay.set_variable("b", 2);
        overlay.set_condition("c", true);

        base.merge(overlay);
        assert_eq!(value_to_string(base.variable("b").unwrap()), "2");
        assert_eq!(value_to_string(base.variable("a").unwrap()), "1");
        assert!(base.is_truthy("c"));
    }

    #[test]
    fn test_from_struct() {
        #[derive(Serialize)]
        struct Invoice {
            customer: String,
            paid: bool,
            items: Vec<Line>,
            total: f64,
        }
        #[derive(Serialize)]
        struct Line {
            name: String,
        }

        let data = TemplateData::from_struct(&Invoice {
            customer: "ACME".to_string(),
            paid: true,
            items: vec![Line {
                name: "widget".to_string(),
            }],
            total: 9.5,
        })
        .unwrap();

        assert_eq!(value_to_string(data.variable("customer").unwrap()), "ACME");
        assert!(data.is_truthy("paid"));
        assert_eq!(data.list("items").unwrap().len(), 1);
        assert_eq!(value_to_string(data.variable("total").unwrap()), "9.5");
    }

    #[test]
    fn test_from_struct_rejects_scalars() {
        assert!(TemplateData::from_struct(&42).is_err());
    }

    #[test]
    fn test_value_to_string_scalars() {
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&Value::from(true)), "true");
        assert_eq!(value_to_string(&Value::from("s")), "s");
        assert_eq!(value_to_string(&Value::from(1.25)), "1.25");
    }
}
