//! JSON output for built node trees
//!
//! Only attributes that were assigned appear in the output, keyed by
//! attribute name in sorted order. Lists become arrays and child nodes
//! become objects.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::{AttrValue, ConfigNode, Value};
use crate::config::OutputFormat;

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attrs.len()))?;
        for (name, value) in &self.attrs {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Single(value) => value.serialize(serializer),
            AttrValue::List(items) => serialize_items(items, serializer),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Node(node) => node.serialize(serializer),
            Value::List(items) => serialize_items(items, serializer),
            Value::Json(json) => json.serialize(serializer),
        }
    }
}

fn serialize_items<S: Serializer>(items: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

impl ConfigNode {
    /// The document rooted at this node
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attrs
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Render the document in the given output format
    pub fn to_json_string(&self, format: OutputFormat) -> serde_json::Result<String> {
        format.render(&self.to_json())
    }
}

impl AttrValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::Single(value) => value.to_json(),
            AttrValue::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Node(node) => node.to_json(),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Json(json) => json.clone(),
        }
    }
}
