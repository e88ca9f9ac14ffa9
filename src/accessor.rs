//! Accessor Synthesis
//!
//! Every attribute of every node kind gets one [`Accessor`], reachable under
//! each of its callable names (see [`crate::names`]). An accessor is a tagged
//! variant closed over the resolved target kind; it interprets a [`Call`]
//! against a node's storage.
//!
//! Scalar accessors install (last write wins). List accessors append, and
//! accept every call shape:
//!
//! | call                   | effect                                          |
//! |------------------------|-------------------------------------------------|
//! | `A()`                  | query, returns the current list, no allocation  |
//! | `A { block }`          | one new child, block configures it              |
//! | `A(x, [y, z])`         | appends `x, y, z` (one-level flatten)           |
//! | `A(x, y) { block }`    | one new child per item, block gets child + item |

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::error::{BuilderError, Result};
use crate::names::{accessor_names, PluralRules};
use crate::node::call::{flatten, Call};
use crate::node::{AttrValue, ConfigNode, Value};
use crate::registry::{AttrKind, KindId, ResolvedAttr, TypeRegistry};

/// Synthesized accessor for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Scalar { attr: String, target: KindId },
    List { attr: String, target: KindId },
}

impl Accessor {
    fn for_attribute(attr: &ResolvedAttr) -> Self {
        match attr.kind {
            AttrKind::Scalar(target) => Accessor::Scalar { attr: attr.name.clone(), target },
            AttrKind::List(target) => Accessor::List { attr: attr.name.clone(), target },
        }
    }

    /// Storage key this accessor reads and writes
    pub fn attr(&self) -> &str {
        match self {
            Accessor::Scalar { attr, .. } | Accessor::List { attr, .. } => attr,
        }
    }

    pub fn target(&self) -> KindId {
        match self {
            Accessor::Scalar { target, .. } | Accessor::List { target, .. } => *target,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Accessor::List { .. })
    }

    /// Run `call` against `node`, returning the attribute's value afterwards
    pub(crate) fn apply<'n>(
        &self,
        node: &'n mut ConfigNode,
        call: Call<'_>,
    ) -> Result<Option<&'n AttrValue>> {
        match self {
            Accessor::Scalar { attr, target } => apply_scalar(attr, *target, node, call),
            Accessor::List { attr, target } => apply_list(attr, *target, node, call),
        }
    }
}

fn apply_scalar<'n>(
    attr: &str,
    target: KindId,
    node: &'n mut ConfigNode,
    call: Call<'_>,
) -> Result<Option<&'n AttrValue>> {
    let Call { values, block } = call;
    let mut values = values.into_iter();

    let value = match values.next() {
        Some(value) => {
            check_kind(&node.registry, attr, target, &value)?;
            value
        }
        None => Value::Node(node.spawn(target)),
    };

    let ignored = values.count();
    if ignored > 0 {
        debug!(attr, ignored, "scalar accessor ignores extra values");
    }
    if block.is_some() && !matches!(value, Value::Node(_)) {
        return Err(BuilderError::NotANode { attr: attr.to_string() });
    }

    node.attrs.insert(attr.to_string(), AttrValue::Single(value));

    if let Some(block) = block {
        if let Some(AttrValue::Single(Value::Node(child))) = node.attrs.get_mut(attr) {
            block(child, None)?;
        }
    }
    Ok(node.attrs.get(attr))
}

fn apply_list<'n>(
    attr: &str,
    target: KindId,
    node: &'n mut ConfigNode,
    call: Call<'_>,
) -> Result<Option<&'n AttrValue>> {
    let Call { values, block } = call;

    // Pure query: never allocates an empty list
    if values.is_empty() && block.is_none() {
        return Ok(node.attrs.get(attr));
    }

    let block_only = values.is_empty();
    let items = flatten(values);
    if block.is_none() {
        for item in &items {
            check_kind(&node.registry, attr, target, item)?;
        }
    }

    let ConfigNode { registry, attrs, .. } = &mut *node;
    let list = list_slot(attrs, attr);

    match block {
        Some(block) if block_only => {
            list.push(Value::Node(ConfigNode::new(Arc::clone(registry), target)));
            if let Some(Value::Node(child)) = list.last_mut() {
                block(child, None)?;
            }
        }
        Some(block) => {
            // One child per item, never a shared node
            for item in items {
                list.push(Value::Node(ConfigNode::new(Arc::clone(registry), target)));
                if let Some(Value::Node(child)) = list.last_mut() {
                    block(child, Some(item))?;
                }
            }
        }
        None => list.extend(items),
    }

    Ok(node.attrs.get(attr))
}

/// The list stored under `attr`, allocated on first use
fn list_slot<'a>(attrs: &'a mut BTreeMap<String, AttrValue>, attr: &str) -> &'a mut Vec<Value> {
    let slot = attrs
        .entry(attr.to_string())
        .or_insert_with(|| AttrValue::List(Vec::new()));
    if let AttrValue::Single(_) = slot {
        *slot = AttrValue::List(Vec::new());
    }
    match slot {
        AttrValue::List(list) => list,
        AttrValue::Single(_) => unreachable!("slot was just replaced by a list"),
    }
}

/// Reject nodes of the wrong kind. Primitives and nested lists are trusted.
fn check_kind(registry: &Arc<TypeRegistry>, attr: &str, target: KindId, value: &Value) -> Result<()> {
    let Value::Node(node) = value else {
        return Ok(());
    };
    let same_registry = Arc::ptr_eq(registry, &node.registry);
    if same_registry && node.kind == target {
        return Ok(());
    }

    let found = if same_registry {
        node.kind_name().to_string()
    } else {
        format!("{} from another registry", node.kind_name())
    };
    Err(BuilderError::TypeMismatch {
        attr: attr.to_string(),
        expected: registry.kind(target).name().to_string(),
        found,
    })
}

/// Callable name -> accessor, for one node kind
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    by_name: HashMap<String, Accessor>,
}

impl AccessorTable {
    pub fn get(&self, name: &str) -> Option<&Accessor> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All callable names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Callable names bound to the accessor for `attr`, sorted
    pub fn names_for(&self, attr: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(_, accessor)| accessor.attr() == attr)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Builds accessor tables from resolved attributes
pub struct AccessorSynthesizer<'a> {
    plurals: &'a PluralRules,
    case_aliases: bool,
}

impl<'a> AccessorSynthesizer<'a> {
    pub fn new(plurals: &'a PluralRules, case_aliases: bool) -> Self {
        Self { plurals, case_aliases }
    }

    /// One accessor per attribute, bound under every name it earns.
    ///
    /// A name claimed by several attributes goes to the best [`NameRank`]
    /// (declared names beat derived aliases), then to the first attribute in
    /// name order.
    ///
    /// [`NameRank`]: crate::names::NameRank
    pub fn synthesize(&self, kind_name: &str, attributes: &[ResolvedAttr]) -> AccessorTable {
        let mut candidates = Vec::new();
        for attr in attributes {
            let accessor = Accessor::for_attribute(attr);
            for (name, rank) in accessor_names(&attr.name, attr.kind.is_list(), self.plurals, self.case_aliases) {
                candidates.push((rank, name, accessor.clone()));
            }
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut table = AccessorTable::default();
        for (rank, name, accessor) in candidates {
            match table.by_name.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(accessor);
                }
                Entry::Occupied(existing) => {
                    debug!(
                        kind = kind_name,
                        name = %existing.key(),
                        kept = existing.get().attr(),
                        shadowed = accessor.attr(),
                        ?rank,
                        "accessor name already bound"
                    );
                }
            }
        }

        debug!(kind = kind_name, attributes = attributes.len(), names = table.len(), "synthesized accessors");
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDocument;

    fn registry(yaml: &str) -> Arc<TypeRegistry> {
        TypeRegistry::build(&SchemaDocument::from_yaml_str(yaml).unwrap().types).unwrap()
    }

    #[test]
    fn test_exact_name_beats_singular_alias() {
        // `Policies` singularizes to `Policy`, which is also a declared attribute
        let registry = registry(
            "Types:\n  String: String\n  Role:\n    Policy: String\n    Policies: [String]\n",
        );
        let role = registry.lookup("Role").unwrap();
        assert_eq!(role.accessor("Policy").unwrap().attr(), "Policy");
        assert_eq!(role.accessor("policy").unwrap().attr(), "Policy");
        assert_eq!(role.accessor("Policies").unwrap().attr(), "Policies");
        assert_eq!(role.accessors().names_for("Policies"), vec!["Policies", "policies"]);
    }

    #[test]
    fn test_table_names() {
        let registry = registry("Types:\n  String: String\n  Tag:\n    Key: String\n    Values: [String]\n");
        let tag = registry.lookup("Tag").unwrap();
        assert_eq!(
            tag.accessors().names(),
            vec!["Key", "Value", "Values", "key", "value", "values"]
        );
        let values = tag.accessor("value").unwrap();
        assert!(values.is_list());
        assert_eq!(values.target(), registry.lookup("String").unwrap().id());
    }

    #[test]
    fn test_list_accessor_without_block_checks_node_kinds() {
        let registry = registry(
            "Types:\n  Tag:\n    Key: Tag\n  Vpc:\n    Tags: [Tag]\n",
        );
        let mut vpc = registry.instantiate("Vpc").unwrap();
        let other_vpc = registry.instantiate("Vpc").unwrap();

        let err = vpc.append("Tags", [other_vpc]).unwrap_err();
        assert!(matches!(err, BuilderError::TypeMismatch { ref expected, ref found, .. }
            if expected == "Tag" && found == "Vpc"));
        // Rejected calls leave no trace
        assert!(vpc.attributes().is_empty());
    }

    #[test]
    fn test_nodes_from_another_registry_are_rejected() {
        let yaml = "Types:\n  Tag:\n    Key: Tag\n  Vpc:\n    Tag: Tag\n";
        let a = registry(yaml);
        let b = registry(yaml);
        let mut vpc = a.instantiate("Vpc").unwrap();
        let foreign = b.instantiate("Tag").unwrap();

        match vpc.set("Tag", foreign) {
            Err(BuilderError::TypeMismatch { found, .. }) => assert!(found.contains("another registry")),
            other => panic!("Expected TypeMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_scalar_block_requires_node() {
        let registry = registry("Types:\n  String: String\n  Tag:\n    Key: String\n");
        let mut tag = registry.instantiate("Tag").unwrap();
        let mut block = |_: &mut ConfigNode, _: Option<Value>| -> Result<()> { Ok(()) };
        let err = tag.invoke("Key", Call::value("k").block(&mut block)).unwrap_err();
        assert!(matches!(err, BuilderError::NotANode { .. }));
        assert!(tag.attr("Key").is_none());
    }
}
