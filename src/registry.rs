//! Type Registry
//!
//! Compiles a [`TypeSchema`] into an immutable table of node kinds.
//!
//! Build runs in three passes:
//! 1. every type name gets a [`KindId`] placeholder, so references resolve
//!    regardless of declaration order
//! 2. every attribute's referenced type is resolved against the placeholders;
//!    an unknown name aborts the build with `UnresolvedTypeReference`
//! 3. the [`AccessorSynthesizer`] attaches an accessor table to each kind
//!
//! The resulting registry is shared read-only through `Arc` by every node
//! built from it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::accessor::{Accessor, AccessorSynthesizer, AccessorTable};
use crate::checksum::Checksum;
use crate::config::{BuilderConfig, NamingConfig};
use crate::error::{BuilderError, Result};
use crate::names::{suggest, PluralRules};
use crate::node::ConfigNode;
use crate::schema::{SchemaDocument, TypeDef, TypeSchema};

/// Index of a node kind within its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(usize);

impl KindId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Resolved shape of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// At most one value, overwritten on each assignment
    Scalar(KindId),
    /// Ordered values, appended across calls
    List(KindId),
}

impl AttrKind {
    /// The referenced kind
    pub fn target(&self) -> KindId {
        match self {
            AttrKind::Scalar(id) | AttrKind::List(id) => *id,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, AttrKind::List(_))
    }
}

/// An attribute whose referenced type has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttr {
    pub name: String,
    pub kind: AttrKind,
}

/// Compiled, immutable descriptor of one schema type
#[derive(Debug)]
pub struct NodeKind {
    id: KindId,
    name: String,
    /// Set for leaf types declared as `Name: Primitive`
    primitive: Option<String>,
    attributes: Vec<ResolvedAttr>,
    accessors: AccessorTable,
}

impl NodeKind {
    pub fn id(&self) -> KindId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primitive a leaf type stands for (`String` for `String: String`)
    pub fn primitive(&self) -> Option<&str> {
        self.primitive.as_deref()
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    /// Resolved attributes, in name order
    pub fn attributes(&self) -> &[ResolvedAttr] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&ResolvedAttr> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    /// Look up an accessor by any of its callable names
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }
}

/// Immutable table of node kinds compiled from one schema
#[derive(Debug)]
pub struct TypeRegistry {
    namespace: Option<String>,
    kinds: Vec<NodeKind>,
    by_name: HashMap<String, KindId>,
    fingerprint: Checksum,
}

impl TypeRegistry {
    /// Build with default naming rules
    pub fn build(schema: &TypeSchema) -> Result<Arc<Self>> {
        Self::build_with(schema, &NamingConfig::default(), None)
    }

    /// Build from a loaded document using the naming and namespace settings of `config`
    pub fn from_document(document: &SchemaDocument, config: &BuilderConfig) -> Result<Arc<Self>> {
        Self::build_with(&document.types, &config.naming, config.schema.namespace.as_deref())
    }

    /// Build with explicit naming rules and an optional namespace label
    pub fn build_with(
        schema: &TypeSchema,
        naming: &NamingConfig,
        namespace: Option<&str>,
    ) -> Result<Arc<Self>> {
        // Pass 1: placeholders
        let by_name: HashMap<String, KindId> = schema
            .keys()
            .enumerate()
            .map(|(index, name)| (name.clone(), KindId(index)))
            .collect();

        // Pass 2: resolve references
        let mut kinds = Vec::with_capacity(schema.len());
        for (index, (type_name, def)) in schema.iter().enumerate() {
            let mut attributes = Vec::new();
            for (attr_name, spec) in def.attributes() {
                let ref_name = spec.type_name();
                let target = *by_name.get(ref_name).ok_or_else(|| {
                    BuilderError::UnresolvedTypeReference {
                        type_name: type_name.clone(),
                        attr_name: attr_name.clone(),
                        ref_name: ref_name.to_string(),
                        suggestion: suggest(ref_name, schema.keys().map(String::as_str)),
                    }
                })?;
                let kind = if spec.is_list() {
                    AttrKind::List(target)
                } else {
                    AttrKind::Scalar(target)
                };
                attributes.push(ResolvedAttr { name: attr_name.clone(), kind });
            }

            let primitive = match def {
                TypeDef::Primitive(name) => Some(name.clone()),
                TypeDef::Record(_) => None,
            };

            kinds.push(NodeKind {
                id: KindId(index),
                name: type_name.clone(),
                primitive,
                attributes,
                accessors: AccessorTable::default(),
            });
        }
        debug!(kinds = kinds.len(), "resolved type references");

        // Pass 3: accessors
        let plurals = PluralRules::from_config(naming);
        let synthesizer = AccessorSynthesizer::new(&plurals, naming.case_aliases);
        for kind in &mut kinds {
            kind.accessors = synthesizer.synthesize(&kind.name, &kind.attributes);
        }

        let registry = Self {
            namespace: namespace.map(String::from),
            kinds,
            by_name,
            fingerprint: Checksum::of(schema),
        };
        info!(
            namespace = registry.namespace.as_deref().unwrap_or("-"),
            kinds = registry.kinds.len(),
            fingerprint = registry.fingerprint.short(),
            "type registry built"
        );
        Ok(Arc::new(registry))
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// SHA256 of the schema this registry was built from
    pub fn fingerprint(&self) -> &Checksum {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind by id.
    ///
    /// Ids are only handed out by this registry, so an id from another
    /// registry is a caller bug and panics when out of range.
    pub fn kind(&self, id: KindId) -> &NodeKind {
        &self.kinds[id.0]
    }

    pub fn lookup(&self, type_name: &str) -> Option<&NodeKind> {
        self.by_name.get(type_name).map(|id| self.kind(*id))
    }

    /// All kinds, in name order
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.iter()
    }

    /// Create an empty root node of the named type
    pub fn instantiate(self: &Arc<Self>, type_name: &str) -> Result<ConfigNode> {
        let id = self.by_name.get(type_name).copied().ok_or_else(|| BuilderError::UnknownType {
            name: type_name.to_string(),
            suggestion: suggest(type_name, self.by_name.keys().map(String::as_str)),
        })?;
        Ok(ConfigNode::new(Arc::clone(self), id))
    }
}
