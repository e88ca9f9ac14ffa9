//! Schema types and loading
//!
//! A schema document has two top-level sections:
//!
//! ```yaml
//! Types:
//!   String: String            # primitive (leaf) type
//!   Tag:
//!     Key: String             # scalar attribute
//!     Value: String
//!   Instance:
//!     Tags: [Tag]             # list attribute
//! Resources:
//!   "AWS::EC2::Instance":
//!     Properties:
//!       Tags: [Tag]
//! ```
//!
//! `Types` feeds the registry. `Resources` is only consulted by the lint pass.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::error::{BuilderError, Result};

/// Mapping from type name to its definition
pub type TypeSchema = BTreeMap<String, TypeDef>;

/// Resource usage sites: resource name -> section (e.g. `Properties`) -> name -> type reference
pub type ResourceSchema = BTreeMap<String, BTreeMap<String, BTreeMap<String, ResourceRef>>>;

/// Definition of a single schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDef {
    /// Leaf type with no attributes (`String: String`)
    Primitive(String),
    /// Record type: attribute name -> attribute spec
    Record(BTreeMap<String, AttrSpec>),
}

impl TypeDef {
    /// Attributes of a record type; primitives have none
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &AttrSpec)> {
        let attrs = match self {
            TypeDef::Record(attrs) => Some(attrs),
            TypeDef::Primitive(_) => None,
        };
        attrs.into_iter().flatten()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDef::Primitive(_))
    }
}

/// Reference from an attribute to another type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttrSpec", into = "RawAttrSpec")]
pub enum AttrSpec {
    /// `Attr: Type`
    ScalarRef(String),
    /// `Attr: [Type]`
    ListRef(String),
}

impl AttrSpec {
    /// Name of the referenced type
    pub fn type_name(&self) -> &str {
        match self {
            AttrSpec::ScalarRef(name) | AttrSpec::ListRef(name) => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, AttrSpec::ListRef(_))
    }
}

/// On-disk shape of an attribute spec
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAttrSpec {
    Scalar(String),
    List(Vec<String>),
}

impl TryFrom<RawAttrSpec> for AttrSpec {
    type Error = String;

    fn try_from(raw: RawAttrSpec) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawAttrSpec::Scalar(name) => Ok(AttrSpec::ScalarRef(name)),
            RawAttrSpec::List(mut names) => {
                if names.len() != 1 {
                    return Err(format!(
                        "list attribute must name exactly one element type, got {:?}",
                        names
                    ));
                }
                Ok(AttrSpec::ListRef(names.remove(0)))
            }
        }
    }
}

impl From<AttrSpec> for RawAttrSpec {
    fn from(spec: AttrSpec) -> Self {
        match spec {
            AttrSpec::ScalarRef(name) => RawAttrSpec::Scalar(name),
            AttrSpec::ListRef(name) => RawAttrSpec::List(vec![name]),
        }
    }
}

/// Type reference at a resource usage site.
///
/// Only linted, never compiled, so a list may name several element types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    /// `Name: Type`
    Single(String),
    /// `Name: [Type, ...]`
    List(Vec<String>),
}

impl ResourceRef {
    /// Every referenced type name
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            ResourceRef::Single(name) => std::slice::from_ref(name),
            ResourceRef::List(names) => names,
        };
        names.iter().map(String::as_str)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ResourceRef::List(_))
    }
}

/// Source file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(SchemaFormat::Yaml),
            "json" => Some(SchemaFormat::Json),
            _ => None,
        }
    }
}

/// A complete schema document (`Types` + `Resources`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "Types", default)]
    pub types: TypeSchema,

    #[serde(rename = "Resources", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: ResourceSchema,
}

impl SchemaDocument {
    /// Create a document with only a `Types` section
    pub fn new(types: TypeSchema) -> Self {
        Self { types, resources: BTreeMap::new() }
    }

    /// Load a schema document, picking the parser from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SchemaFormat::from_path(path).ok_or_else(|| {
            BuilderError::InvalidFormat(format!(
                "{}: expected a .yaml, .yml or .json schema file",
                path.display()
            ))
        })?;
        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse a schema document from a string
    pub fn parse(content: &str, format: SchemaFormat) -> Result<Self> {
        match format {
            SchemaFormat::Yaml => Self::from_yaml_str(content),
            SchemaFormat::Json => Self::from_json_str(content),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Fingerprint of the `Types` section
    pub fn checksum(&self) -> Checksum {
        Checksum::of(&self.types)
    }
}
