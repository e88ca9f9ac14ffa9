//! Schema Builder
//!
//! Compiles a declarative type schema into a nested builder API whose nodes
//! serialize to JSON.
//!
//! ## Features
//!
//! - **Forward References**: types may reference types declared later, or themselves
//! - **Synthesized Accessors**: every attribute is reachable by its name, its
//!   case alias, and (for lists) its singular form
//! - **Call Shapes**: one accessor handles assignment, appending, nested blocks and queries
//! - **Lint Pass**: advisory warnings for unknown type references and shadowed aliases
//! - **Fingerprints**: SHA256 of the compiled schema
//!
//! ## Example
//!
//! ```text
//! Types:                       let registry = TypeRegistry::build(&types)?;
//!   String: String             let mut vpc = registry.instantiate("Vpc")?;
//!   Vpc:                       vpc.set("CidrBlock", "10.0.0.0/16")?
//!     CidrBlock: String           .build("subnet", |s| { s.set("CidrBlock", "10.0.1.0/24")?; Ok(()) })?;
//!     Subnets: [Subnet]
//!   Subnet:                    // {"CidrBlock":"10.0.0.0/16","Subnets":[{"CidrBlock":"10.0.1.0/24"}]}
//!     CidrBlock: String        let json = vpc.to_json();
//! ```

pub mod accessor;
pub mod checksum;
pub mod config;
pub mod error;
pub mod lint;
pub mod names;
pub mod node;
pub mod registry;
pub mod schema;

pub use accessor::{Accessor, AccessorSynthesizer, AccessorTable};
pub use checksum::Checksum;
pub use config::{BuilderConfig, NamingConfig, OutputFormat};
pub use error::{BuilderError, Result};
pub use lint::{lint_schemas, LintResult, LintWarning, SchemaLinter};
pub use names::{Alias, PluralRules};
pub use node::{AttrValue, Block, Call, ConfigNode, Value};
pub use registry::{AttrKind, KindId, NodeKind, ResolvedAttr, TypeRegistry};
pub use schema::{AttrSpec, ResourceRef, SchemaDocument, SchemaFormat, TypeDef, TypeSchema};
