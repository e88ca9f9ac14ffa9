//! Accessor call arguments

use std::fmt;

use super::{ConfigNode, Value};
use crate::error::Result;

/// Configuration block. Receives the child being configured, plus the
/// originating item when a list accessor is called with values and a block.
pub type Block<'b> = &'b mut dyn FnMut(&mut ConfigNode, Option<Value>) -> Result<()>;

/// Positional values and an optional block, as passed to an accessor
#[derive(Default)]
pub struct Call<'b> {
    pub values: Vec<Value>,
    pub block: Option<Block<'b>>,
}

impl<'b> Call<'b> {
    /// No values, no block: a query
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self { values: vec![value.into()], block: None }
    }

    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self { values: values.into_iter().map(Into::into).collect(), block: None }
    }

    /// Append one more positional value
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn block(mut self, block: Block<'b>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn is_query(&self) -> bool {
        self.values.is_empty() && self.block.is_none()
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("values", &self.values)
            .field("block", &self.block.is_some())
            .finish()
    }
}

/// Splice list values into the surrounding argument list, one level deep.
///
/// `[a, [b, c], [[d]]]` becomes `[a, b, c, [d]]`.
pub(crate) fn flatten(values: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::List(items) => out.extend(items),
            Value::Json(serde_json::Value::Array(items)) => {
                out.extend(items.into_iter().map(Value::Json))
            }
            other => out.push(other),
        }
    }
    out
}
