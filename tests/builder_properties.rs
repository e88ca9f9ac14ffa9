//! Builder Properties
//!
//! End-to-end behavior of compiled schemas: reference resolution, accessor
//! aliasing, every accessor call shape, and the serialized document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use schema_builder::{
    AttrValue, BuilderError, Call, ConfigNode, OutputFormat, SchemaDocument, TypeRegistry, Value,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn aws() -> Arc<TypeRegistry> {
    let document = SchemaDocument::from_path(fixture("aws_types.yaml")).unwrap();
    TypeRegistry::build(&document.types).unwrap()
}

fn list_len(node: &ConfigNode, name: &str) -> usize {
    node.attr(name).and_then(AttrValue::as_list).map(<[Value]>::len).unwrap_or(0)
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_forward_references_resolve() {
    let registry = aws();
    // Instance is declared before BlockDeviceMapping, EbsBlockDevice and Tag
    let instance = registry.lookup("Instance").unwrap();
    let mappings = instance.attribute("BlockDeviceMappings").unwrap();
    assert!(mappings.kind.is_list());
    assert_eq!(registry.kind(mappings.kind.target()).name(), "BlockDeviceMapping");

    let mapping = registry.lookup("BlockDeviceMapping").unwrap();
    let ebs = mapping.attribute("Ebs").unwrap();
    assert!(!ebs.kind.is_list());
    assert_eq!(registry.kind(ebs.kind.target()).name(), "EbsBlockDevice");
}

#[test]
fn test_unresolved_reference_fails() {
    let document = SchemaDocument::from_path(fixture("unresolved.yaml")).unwrap();
    let err = TypeRegistry::build(&document.types).unwrap_err();
    match err {
        BuilderError::UnresolvedTypeReference { type_name, attr_name, ref_name, suggestion } => {
            assert_eq!(type_name, "Vpc");
            assert_eq!(attr_name, "Subnets");
            assert_eq!(ref_name, "Subnett");
            assert_eq!(suggestion.as_deref(), Some("Subnet"));
        }
        other => panic!("Expected UnresolvedTypeReference, got {:?}", other),
    }
}

#[test]
fn test_fingerprint_is_stable_across_formats() {
    let yaml = SchemaDocument::from_path(fixture("aws_types.yaml")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("aws_types.json");
    std::fs::write(&json_path, serde_json::to_string(&yaml).unwrap()).unwrap();
    let json = SchemaDocument::from_path(&json_path).unwrap();

    let a = TypeRegistry::build(&yaml.types).unwrap();
    let b = TypeRegistry::build(&json.types).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint(), &yaml.checksum());
}

// =============================================================================
// Accessor aliasing
// =============================================================================

#[rstest]
#[case("Tags")]
#[case("tags")]
#[case("Tag")]
#[case("tag")]
fn test_list_aliases_share_storage(#[case] name: &str) {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    instance.build(name, |_| Ok(())).unwrap();
    instance.build("Tags", |_| Ok(())).unwrap();

    assert_eq!(list_len(&instance, "Tags"), 2);
    assert_eq!(instance.attributes().len(), 1);
}

#[test]
fn test_uncountable_list_keeps_its_name() {
    let registry = aws();
    let group = registry.lookup("SecurityGroup").unwrap();
    assert_eq!(
        group.accessors().names_for("SecurityGroupIngress"),
        vec!["SecurityGroupIngress", "securityGroupIngress"]
    );
}

// =============================================================================
// Call shapes
// =============================================================================

#[test]
fn test_query_is_a_no_op() {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    instance.set("ImageId", "ami-1").unwrap();
    let before = instance.to_json();

    assert!(instance.query("Tags").unwrap().is_none());
    assert!(instance.query("tag").unwrap().is_none());
    let image = instance.query("imageId").unwrap().cloned();
    assert_eq!(image, Some(AttrValue::Single(Value::from("ami-1"))));

    assert_eq!(instance.to_json(), before);
    assert_eq!(instance.attributes().len(), 1);
}

#[test]
fn test_query_leaves_scalar_children_untouched() {
    let registry = aws();
    let mut mapping = registry.instantiate("BlockDeviceMapping").unwrap();
    assert!(mapping.query("Ebs").unwrap().is_none());
    assert!(mapping.is_empty());

    mapping
        .build("Ebs", |ebs| {
            ebs.set("VolumeSize", 8)?;
            Ok(())
        })
        .unwrap();
    let ebs = mapping.query("ebs").unwrap().and_then(AttrValue::as_node).unwrap();
    assert_eq!(ebs.to_json(), json!({"VolumeSize": 8}));
    assert_eq!(mapping.to_json(), json!({"Ebs": {"VolumeSize": 8}}));
}

#[test]
fn test_values_flatten_one_level() {
    let registry = aws();
    let mut spread = registry.instantiate("Instance").unwrap();
    let mut nested = registry.instantiate("Instance").unwrap();

    spread
        .invoke("SecurityGroups", Call::values(["sg-1", "sg-2", "sg-3"]))
        .unwrap();
    nested
        .invoke("SecurityGroups", Call::value("sg-1").arg(vec!["sg-2", "sg-3"]))
        .unwrap();
    assert_eq!(spread, nested);

    // Only one level is spliced
    let mut deep = registry.instantiate("Instance").unwrap();
    deep.invoke(
        "securityGroup",
        Call::value("sg-1").arg(Value::List(vec![Value::from("sg-2"), Value::from(vec!["sg-3"])])),
    )
    .unwrap();
    assert_eq!(deep.to_json(), json!({"SecurityGroups": ["sg-1", "sg-2", ["sg-3"]]}));
}

#[test]
fn test_block_only_creates_one_child() {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    let mut calls = 0;
    instance
        .build("BlockDeviceMapping", |mapping| {
            calls += 1;
            mapping.set("DeviceName", "/dev/sda1")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(list_len(&instance, "BlockDeviceMappings"), 1);
}

#[rstest]
#[case(vec!["a"])]
#[case(vec!["a", "b", "c"])]
fn test_values_with_block_create_one_child_per_item(#[case] keys: Vec<&str>) {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    instance
        .each("Tags", keys.clone(), |tag, key| {
            tag.set("Key", key)?.set("Value", "x")?;
            Ok(())
        })
        .unwrap();

    let tags = instance.attr("Tags").unwrap().as_list().unwrap();
    assert_eq!(tags.len(), keys.len());
    for (tag, key) in tags.iter().zip(&keys) {
        let tag = tag.as_node().unwrap();
        assert_eq!(tag.kind_name(), "Tag");
        assert_eq!(tag.attr("Key").unwrap().as_single(), Some(&Value::from(*key)));
    }
}

#[test]
fn test_block_receives_each_item() {
    let registry = aws();
    let mut group = registry.instantiate("SecurityGroup").unwrap();
    let mut seen = Vec::new();
    let mut block = |rule: &mut ConfigNode, item: Option<Value>| -> schema_builder::Result<()> {
        let port = item.unwrap();
        seen.push(port.clone());
        rule.set("FromPort", port.clone())?.set("ToPort", port)?;
        Ok(())
    };
    group
        .invoke("SecurityGroupIngress", Call::value(22).arg(vec![80, 443]).block(&mut block))
        .unwrap();

    assert_eq!(seen, vec![Value::from(22), Value::from(80), Value::from(443)]);
    assert_eq!(
        group.to_json(),
        json!({"SecurityGroupIngress": [
            {"FromPort": 22, "ToPort": 22},
            {"FromPort": 80, "ToPort": 80},
            {"FromPort": 443, "ToPort": 443}
        ]})
    );
}

#[test]
fn test_distinct_items_without_block() {
    let registry = aws();
    let mut first = registry.instantiate("Tag").unwrap();
    first.set("Key", "team").unwrap();
    let mut second = registry.instantiate("Tag").unwrap();
    second.set("Key", "env").unwrap();

    let mut instance = registry.instantiate("Instance").unwrap();
    instance.append("Tags", [first, second]).unwrap();

    // Each item lands once, in order; none is repeated
    assert_eq!(instance.to_json(), json!({"Tags": [{"Key": "team"}, {"Key": "env"}]}));
}

#[test]
fn test_lists_append_across_calls() {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    instance.set("SecurityGroup", "sg-1").unwrap();
    instance.append("securityGroups", ["sg-2", "sg-3"]).unwrap();
    instance.set("SecurityGroups", "sg-4").unwrap();
    assert_eq!(list_len(&instance, "SecurityGroups"), 4);
}

#[test]
fn test_scalar_overwrite() {
    let registry = aws();
    let mut mapping = registry.instantiate("BlockDeviceMapping").unwrap();
    mapping
        .build("Ebs", |ebs| {
            ebs.set("VolumeSize", 8)?;
            Ok(())
        })
        .unwrap();
    mapping
        .build("ebs", |ebs| {
            ebs.set("VolumeType", "gp3")?;
            Ok(())
        })
        .unwrap();

    // The second call installs a fresh instance
    assert_eq!(mapping.to_json(), json!({"Ebs": {"VolumeType": "gp3"}}));
}

#[test]
fn test_scalar_extra_values_are_ignored() {
    let registry = aws();
    let mut tag = registry.instantiate("Tag").unwrap();
    tag.invoke("Key", Call::value("first").arg("second")).unwrap();
    assert_eq!(tag.to_json(), json!({"Key": "first"}));
}

#[test]
fn test_wrong_node_kind_is_rejected() {
    let registry = aws();
    let mut mapping = registry.instantiate("BlockDeviceMapping").unwrap();
    let tag = registry.instantiate("Tag").unwrap();

    match mapping.set("Ebs", tag) {
        Err(BuilderError::TypeMismatch { attr, expected, found }) => {
            assert_eq!(attr, "Ebs");
            assert_eq!(expected, "EbsBlockDevice");
            assert_eq!(found, "Tag");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other.map(|_| ())),
    }
    assert!(mapping.is_empty());
}

#[test]
fn test_block_errors_propagate() {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    let err = instance
        .build("Tag", |tag| {
            tag.set("Kye", "oops")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnknownAccessor { ref kind, .. } if kind == "Tag"));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_document_round_trip() {
    let registry = aws();
    let mut instance = registry.instantiate("Instance").unwrap();
    instance
        .set("ImageId", "ami-0abc")
        .unwrap()
        .append("SecurityGroups", ["sg-web"])
        .unwrap()
        .build("BlockDeviceMapping", |mapping| {
            mapping.set("DeviceName", "/dev/xvda")?.build("Ebs", |ebs| {
                ebs.set("VolumeSize", 20)?.set("VolumeType", "gp3")?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap()
        .each("Tag", ["Name"], |tag, key| {
            tag.set("Key", key)?.set("Value", "web")?;
            Ok(())
        })
        .unwrap();

    let expected = json!({
        "BlockDeviceMappings": [
            {"DeviceName": "/dev/xvda", "Ebs": {"VolumeSize": 20, "VolumeType": "gp3"}}
        ],
        "ImageId": "ami-0abc",
        "SecurityGroups": ["sg-web"],
        "Tags": [{"Key": "Name", "Value": "web"}]
    });
    assert_eq!(instance.to_json(), expected);

    let rendered = instance.to_json_string(OutputFormat::Pretty).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed, expected);
}
