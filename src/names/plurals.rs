//! Singular/plural inflection for accessor aliasing
//!
//! Resolution order, checked against the whole name and then its last
//! PascalCase word:
//! 1. uncountable words are returned unchanged
//! 2. irregular words use the lookup table
//! 3. otherwise the first matching suffix rule applies
//!
//! The prefix of a compound name (`SecurityGroup` in `SecurityGroupIngress`)
//! is never touched, and the casing of the input is preserved.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::config::NamingConfig;

/// Singular and plural forms of a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub singular: String,
    pub plural: String,
}

/// Inflection rules
pub struct PluralRules {
    /// lowercase singular -> plural
    irregular_plurals: HashMap<String, String>,
    /// lowercase plural -> singular
    irregular_singulars: HashMap<String, String>,
    /// lowercase words with identical singular and plural forms
    uncountable: HashSet<String>,
    singular_rules: Vec<(Regex, &'static str)>,
    plural_rules: Vec<(Regex, &'static str)>,
}

impl Default for PluralRules {
    fn default() -> Self {
        Self::new()
    }
}

impl PluralRules {
    pub fn new() -> Self {
        let mut rules = Self {
            irregular_plurals: HashMap::new(),
            irregular_singulars: HashMap::new(),
            uncountable: [
                "data", "metadata", "information", "equipment", "series", "species",
                "news", "ingress", "egress", "settings", "status",
            ]
            .into_iter()
            .map(String::from)
            .collect(),

            // First match wins
            singular_rules: vec![
                (Regex::new(r"(?i)(ss)$").unwrap(), "$1"),
                (Regex::new(r"(?i)(alias|status|bus|address)es$").unwrap(), "$1"),
                (Regex::new(r"(?i)(ind)ices$").unwrap(), "${1}ex"),
                (Regex::new(r"(?i)(matr|vert)ices$").unwrap(), "${1}ix"),
                (Regex::new(r"(?i)([^aeiouy]|qu)ies$").unwrap(), "${1}y"),
                (Regex::new(r"(?i)(x|ch|sh|ss)es$").unwrap(), "$1"),
                (Regex::new(r"(?i)([^s])s$").unwrap(), "$1"),
            ],
            plural_rules: vec![
                (Regex::new(r"(?i)(alias|status|bus)$").unwrap(), "${1}es"),
                (Regex::new(r"(?i)(matr|vert|ind)(ix|ex)$").unwrap(), "${1}ices"),
                (Regex::new(r"(?i)([^aeiouy]|qu)y$").unwrap(), "${1}ies"),
                (Regex::new(r"(?i)(x|ch|ss|sh)$").unwrap(), "${1}es"),
                (Regex::new(r"(?i)s$").unwrap(), "s"),
                (Regex::new(r"$").unwrap(), "s"),
            ],
        };

        for (singular, plural) in [
            ("person", "people"),
            ("child", "children"),
            ("man", "men"),
            ("mouse", "mice"),
        ] {
            rules.add_irregular(singular, plural);
        }
        rules
    }

    /// Defaults plus the irregular and uncountable words from configuration
    pub fn from_config(config: &NamingConfig) -> Self {
        let mut rules = Self::new();
        for (singular, plural) in &config.irregular {
            rules.add_irregular(singular, plural);
        }
        for word in &config.uncountable {
            rules.uncountable.insert(word.to_lowercase());
        }
        rules
    }

    /// Register an irregular pair, overriding the suffix rules for both forms
    pub fn add_irregular(&mut self, singular: &str, plural: &str) {
        self.irregular_plurals.insert(singular.to_lowercase(), plural.to_string());
        self.irregular_singulars.insert(plural.to_lowercase(), singular.to_string());
    }

    /// Both alias forms of a name
    pub fn alias(&self, name: &str) -> Alias {
        Alias {
            singular: self.singularize(name),
            plural: self.pluralize(name),
        }
    }

    pub fn singularize(&self, name: &str) -> String {
        self.inflect(name, &self.irregular_singulars, &self.irregular_plurals, &self.singular_rules)
    }

    pub fn pluralize(&self, name: &str) -> String {
        self.inflect(name, &self.irregular_plurals, &self.irregular_singulars, &self.plural_rules)
    }

    /// `table` maps the source form to the target form. Words that are keys of
    /// `already` are in the target form and come back unchanged.
    fn inflect(
        &self,
        name: &str,
        table: &HashMap<String, String>,
        already: &HashMap<String, String>,
        rules: &[(Regex, &'static str)],
    ) -> String {
        if name.is_empty() {
            return String::new();
        }

        // Whole name first, then the last word of a compound
        for (prefix, word) in [("", name), split_last_word(name)] {
            if word.is_empty() {
                continue;
            }
            let lower = word.to_lowercase();
            if self.uncountable.contains(&lower) || already.contains_key(&lower) {
                return name.to_string();
            }
            if let Some(target) = table.get(&lower) {
                return format!("{}{}", prefix, match_case(word, target));
            }
        }

        for (pattern, replacement) in rules {
            if pattern.is_match(name) {
                return pattern.replace(name, *replacement).into_owned();
            }
        }
        name.to_string()
    }
}

/// Split `SecurityGroupIngress` into (`SecurityGroup`, `Ingress`).
///
/// A run of capitals stays with the word that follows it (`DBSubnet` -> `DB`, `Subnet`
/// only when a lowercase letter follows the run).
fn split_last_word(name: &str) -> (&str, &str) {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    for i in (1..chars.len()).rev() {
        let (idx, c) = chars[i];
        let prev = chars[i - 1].1;
        if c.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit()) {
            return (&name[..idx], &name[idx..]);
        }
        if c.is_uppercase()
            && prev.is_uppercase()
            && chars.get(i + 1).map(|(_, n)| n.is_lowercase()).unwrap_or(false)
        {
            return (&name[..idx], &name[idx..]);
        }
        if c == '_' || c == '-' {
            let split = idx + c.len_utf8();
            return (&name[..split], &name[split..]);
        }
    }
    ("", name)
}

/// Apply the casing of `original` to `replacement`: all-caps stays all-caps,
/// otherwise only the first letter follows the original.
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().count() > 1 && original.chars().all(|c| !c.is_lowercase()) {
        return replacement.to_uppercase();
    }
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(r)) if first.is_uppercase() => r.to_uppercase().chain(chars).collect(),
        (Some(_), Some(r)) => r.to_lowercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
