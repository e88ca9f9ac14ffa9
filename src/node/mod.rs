//! Configuration Nodes
//!
//! A [`ConfigNode`] is a mutable instance of one node kind. Attribute storage
//! is keyed by attribute name; every read and write goes through the kind's
//! accessor table, so aliases (`subnet`, `Subnet`, `subnets`) all land on the
//! same `Subnets` slot.
//!
//! ```ignore
//! let mut vpc = registry.instantiate("Vpc")?;
//! vpc.set("CidrBlock", "10.0.0.0/16")?
//!     .each("subnet", ["10.0.1.0/24", "10.0.2.0/24"], |subnet, cidr| {
//!         subnet.set("CidrBlock", cidr)?;
//!         Ok(())
//!     })?;
//! ```

pub mod call;
mod serialize;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{BuilderError, Result};
use crate::names::suggest;
use crate::registry::{KindId, NodeKind, TypeRegistry};

pub use call::{Block, Call};

/// Mutable instance of a node kind
#[derive(Clone)]
pub struct ConfigNode {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) kind: KindId,
    pub(crate) attrs: BTreeMap<String, AttrValue>,
}

impl ConfigNode {
    pub(crate) fn new(registry: Arc<TypeRegistry>, kind: KindId) -> Self {
        Self { registry, kind, attrs: BTreeMap::new() }
    }

    /// Fresh node of `kind` sharing this node's registry
    pub(crate) fn spawn(&self, kind: KindId) -> Self {
        Self::new(Arc::clone(&self.registry), kind)
    }

    pub fn kind_id(&self) -> KindId {
        self.kind
    }

    pub fn kind(&self) -> &NodeKind {
        self.registry.kind(self.kind)
    }

    pub fn kind_name(&self) -> &str {
        self.kind().name()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Stored attributes, in name order. Attributes never touched are absent.
    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attrs
    }

    /// Current value of an attribute, looked up by any of its callable names
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        let key = self.kind().accessor(name).map(|a| a.attr()).unwrap_or(name);
        self.attrs.get(key)
    }

    /// Installed child node under a scalar attribute
    pub fn node_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        let key = self
            .kind()
            .accessor(name)
            .map(|a| a.attr().to_string())
            .unwrap_or_else(|| name.to_string());
        match self.attrs.get_mut(&key) {
            Some(AttrValue::Single(Value::Node(node))) => Some(node),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Dispatch a call to the accessor bound to `name`.
    ///
    /// Returns the attribute's value after the call; `None` for a list that
    /// has never been mutated.
    pub fn invoke(&mut self, name: &str, call: Call<'_>) -> Result<Option<&AttrValue>> {
        let registry = Arc::clone(&self.registry);
        let kind = registry.kind(self.kind);
        let Some(accessor) = kind.accessor(name) else {
            return Err(BuilderError::UnknownAccessor {
                kind: kind.name().to_string(),
                name: name.to_string(),
                suggestion: suggest(name, kind.accessors().names()),
            });
        };
        trace!(kind = kind.name(), accessor = name, attr = accessor.attr(), ?call, "invoke");
        accessor.apply(self, call)
    }

    /// Read an attribute by any of its callable names without mutating anything.
    ///
    /// Unlike `invoke(name, Call::new())`, which installs a fresh child on a
    /// scalar attribute, this never touches storage.
    pub fn query(&self, name: &str) -> Result<Option<&AttrValue>> {
        let kind = self.kind();
        let accessor = kind.accessor(name).ok_or_else(|| BuilderError::UnknownAccessor {
            kind: kind.name().to_string(),
            name: name.to_string(),
            suggestion: suggest(name, kind.accessors().names()),
        })?;
        Ok(self.attrs.get(accessor.attr()))
    }

    /// Assign a value (scalar) or append one item (list)
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.invoke(name, Call::value(value))?;
        Ok(self)
    }

    /// Append every item of `values` to a list attribute.
    ///
    /// Fails with `TypeMismatch` on a scalar attribute.
    pub fn append<I, V>(&mut self, name: &str, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if let Some(accessor) = self.kind().accessor(name).filter(|a| !a.is_list()) {
            return Err(BuilderError::TypeMismatch {
                attr: accessor.attr().to_string(),
                expected: self.registry.kind(accessor.target()).name().to_string(),
                found: "list of values".to_string(),
            });
        }
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.invoke(name, Call::value(Value::List(items)))?;
        Ok(self)
    }

    /// Create (list) or install (scalar) a child and configure it
    pub fn build<F>(&mut self, name: &str, mut block: F) -> Result<&mut Self>
    where
        F: FnMut(&mut ConfigNode) -> Result<()>,
    {
        let mut adapter = |child: &mut ConfigNode, _: Option<Value>| block(child);
        self.invoke(name, Call::new().block(&mut adapter))?;
        Ok(self)
    }

    /// Create one list child per item and configure each with its item
    pub fn each<I, V, F>(&mut self, name: &str, items: I, mut block: F) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
        F: FnMut(&mut ConfigNode, Value) -> Result<()>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        let mut adapter = |child: &mut ConfigNode, item: Option<Value>| match item {
            Some(item) => block(child, item),
            None => Ok(()),
        };
        self.invoke(name, Call::value(Value::List(items)).block(&mut adapter))?;
        Ok(self)
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("kind", &self.kind_name())
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
            && self.kind == other.kind
            && self.attrs == other.attrs
    }
}

/// A value held by an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Child node
    Node(ConfigNode),
    /// Positional list argument, spliced one level by list accessors
    List(Vec<Value>),
    /// Primitive leaf
    Json(serde_json::Value),
}

impl Value {
    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut ConfigNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(serde_json::Value::as_str)
    }
}

impl From<ConfigNode> for Value {
    fn from(node: ConfigNode) -> Self {
        Value::Node(node)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            other => Value::Json(other),
        }
    }
}

macro_rules! json_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_value_from!(&str, String, bool, i32, i64, u32, u64, f64);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Stored contents of one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Single(Value),
    List(Vec<Value>),
}

impl AttrValue {
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            AttrValue::Single(value) => Some(value),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            AttrValue::List(items) => Some(items),
            AttrValue::Single(_) => None,
        }
    }

    /// The child node of a scalar attribute
    pub fn as_node(&self) -> Option<&ConfigNode> {
        self.as_single().and_then(Value::as_node)
    }
}
