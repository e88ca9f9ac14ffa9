//! Schema Linting
//!
//! Advisory checks over a loaded [`SchemaDocument`]. Findings never fail a
//! registry build; callers decide what to do with them.
//!
//! ## Lints
//! 1. **UNKNOWN_TYPE**: a `Resources` entry or a record attribute in `Types`
//!    references a type that is not declared
//! 2. **SHADOWED_ALIAS**: the singular alias of a list attribute equals the
//!    name of another attribute on the same type, so the alias is unreachable

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::names::PluralRules;
use crate::schema::{AttrSpec, SchemaDocument, SchemaFormat};

/// Result of linting a schema
#[derive(Debug, Default)]
pub struct LintResult {
    pub schema_id: String,
    pub warnings: Vec<LintWarning>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings with the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a LintWarning> + 'a {
        self.warnings.iter().filter(move |w| w.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub code: &'static str,
    pub message: String,
    pub path: String,
}

pub const UNKNOWN_TYPE: &str = "UNKNOWN_TYPE";
pub const SHADOWED_ALIAS: &str = "SHADOWED_ALIAS";

/// The schema linter
#[derive(Default)]
pub struct SchemaLinter {
    plurals: PluralRules,
}

impl SchemaLinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use configured inflection rules for alias checks
    pub fn with_plurals(plurals: PluralRules) -> Self {
        Self { plurals }
    }

    /// Lint a schema document
    pub fn lint(&self, schema_id: &str, document: &SchemaDocument) -> LintResult {
        let mut result = LintResult {
            schema_id: schema_id.to_string(),
            ..Default::default()
        };

        self.check_resources(document, &mut result);
        self.check_types(document, &mut result);

        for warning in &result.warnings {
            warn!(schema = schema_id, code = warning.code, path = %warning.path, "{}", warning.message);
        }
        result
    }

    fn check_resources(&self, document: &SchemaDocument, result: &mut LintResult) {
        for (resource, sections) in &document.resources {
            for (section, attrs) in sections {
                for (name, reference) in attrs {
                    let path = format!("Resources.{}.{}.{}", resource, section, name);
                    for type_name in reference.type_names() {
                        check_reference(document, type_name, &path, result);
                    }
                }
            }
        }
    }

    fn check_types(&self, document: &SchemaDocument, result: &mut LintResult) {
        for (type_name, def) in &document.types {
            let attrs: BTreeMap<&String, &AttrSpec> = def.attributes().collect();
            for (name, spec) in &attrs {
                let path = format!("Types.{}.{}", type_name, name);
                check_reference(document, spec.type_name(), &path, result);

                if spec.is_list() {
                    let singular = self.plurals.singularize(name);
                    if singular != name.as_str() && attrs.contains_key(&singular) {
                        result.warnings.push(LintWarning {
                            code: SHADOWED_ALIAS,
                            message: format!(
                                "singular alias '{}' of list attribute '{}' is shadowed by attribute '{}'",
                                singular, name, singular
                            ),
                            path,
                        });
                    }
                }
            }
        }
    }
}

fn check_reference(document: &SchemaDocument, type_name: &str, path: &str, result: &mut LintResult) {
    if !document.types.contains_key(type_name) {
        result.warnings.push(LintWarning {
            code: UNKNOWN_TYPE,
            message: format!("unknown type {}", type_name),
            path: path.to_string(),
        });
    }
}

/// Lint every schema file (.yaml, .yml, .json) under a directory.
///
/// Files that fail to load are logged and skipped. Only results with
/// findings are returned.
pub fn lint_schemas(schema_dir: &Path, linter: &SchemaLinter) -> Vec<LintResult> {
    let mut results = Vec::new();

    for entry in walkdir::WalkDir::new(schema_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && SchemaFormat::from_path(e.path()).is_some())
    {
        let path = entry.path();
        let document = match SchemaDocument::from_path(path) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable schema");
                continue;
            }
        };

        let schema_id = path
            .strip_prefix(schema_dir)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string());

        let result = linter.lint(&schema_id, &document);
        debug!(schema = %schema_id, warnings = result.warnings.len(), "linted");
        if result.has_warnings() {
            results.push(result);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(yaml: &str) -> SchemaDocument {
        SchemaDocument::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_unknown_resource_property_type() {
        let doc = document(
            r#"
Types:
  String: String
  Tag:
    Key: String
Resources:
  AWS::EC2::Instance:
    Properties:
      ImageId: String
      Tags: [Tga]
      Volumes: [Tag, Volume]
"#,
        );
        let result = SchemaLinter::new().lint("ec2", &doc);
        let warnings: Vec<_> = result.with_code(UNKNOWN_TYPE).collect();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].path, "Resources.AWS::EC2::Instance.Properties.Tags");
        assert_eq!(warnings[0].message, "unknown type Tga");
        // Each element type of a multi-type list is checked
        assert_eq!(warnings[1].path, "Resources.AWS::EC2::Instance.Properties.Volumes");
        assert_eq!(warnings[1].message, "unknown type Volume");
    }

    #[test]
    fn test_unknown_type_attribute_reference() {
        let doc = document("Types:\n  String: String\n  Tag:\n    Key: Strin\n");
        let result = SchemaLinter::new().lint("types", &doc);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, UNKNOWN_TYPE);
        assert_eq!(result.warnings[0].path, "Types.Tag.Key");
    }

    #[test]
    fn test_shadowed_alias() {
        let doc = document(
            "Types:\n  String: String\n  Role:\n    Policy: String\n    Policies: [String]\n",
        );
        let result = SchemaLinter::new().lint("iam", &doc);
        let warnings: Vec<_> = result.with_code(SHADOWED_ALIAS).collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "Types.Role.Policies");
    }

    #[test]
    fn test_clean_schema() {
        let doc = document("Types:\n  String: String\n  Tag:\n    Key: String\n    Values: [String]\n");
        let result = SchemaLinter::new().lint("clean", &doc);
        assert!(result.is_clean());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_lint_schemas_walks_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.yaml"), "Types:\n  String: String\n").unwrap();
        std::fs::write(dir.path().join("bad.json"), r#"{"Types": {"Tag": {"Key": "Nope"}}}"#).unwrap();
        std::fs::write(dir.path().join("broken.yml"), "Types: [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Types: {}").unwrap();

        let results = lint_schemas(dir.path(), &SchemaLinter::new());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].schema_id, "bad.json");
    }
}
