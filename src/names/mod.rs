//! Accessor Naming
//!
//! Computes the callable names wired to each attribute:
//! - the attribute name itself (`SubnetIds`)
//! - its case alias, first letter swapped (`subnetIds`)
//! - for list attributes, the singular form and its case alias (`SubnetId`, `subnetId`)
//!
//! Also provides "did you mean" suggestions for unknown type and accessor names.

pub mod plurals;

pub use plurals::{Alias, PluralRules};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Why a name is bound to an accessor, in priority order.
///
/// When two attributes produce the same name, the lower rank keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameRank {
    /// The attribute's declared name
    Exact,
    /// First letter swapped
    CaseAlias,
    /// Singular form of a list attribute
    Singular,
    /// Singular form, first letter swapped
    SingularCaseAlias,
}

/// Swap the case of the first character (`Subnets` <-> `subnets`)
pub fn swap_first_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// All callable names for an attribute, with the reason each one exists.
///
/// Duplicates (e.g. an uncountable list whose singular equals its name, or a
/// name starting with a digit) are dropped, keeping the best rank.
pub fn accessor_names(
    attr_name: &str,
    is_list: bool,
    plurals: &PluralRules,
    case_aliases: bool,
) -> Vec<(String, NameRank)> {
    let mut names: Vec<(String, NameRank)> = vec![(attr_name.to_string(), NameRank::Exact)];
    if case_aliases {
        names.push((swap_first_case(attr_name), NameRank::CaseAlias));
    }
    if is_list {
        let singular = plurals.alias(attr_name).singular;
        if case_aliases {
            names.push((swap_first_case(&singular), NameRank::SingularCaseAlias));
        }
        names.push((singular, NameRank::Singular));
    }

    names.sort_by(|a, b| a.1.cmp(&b.1));
    let mut seen = std::collections::HashSet::new();
    names.retain(|(name, _)| !name.is_empty() && seen.insert(name.clone()));
    names
}

/// Closest candidate to `needle`, if any scores at all
pub fn suggest<'a, I>(needle: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut best: Option<(i64, &str)> = None;

    for candidate in candidates {
        // Score both directions so typos and truncations both match
        let score = matcher
            .fuzzy_match(candidate, needle)
            .into_iter()
            .chain(matcher.fuzzy_match(needle, candidate))
            .max();
        if let Some(score) = score {
            if best.map(|(b, _)| score > b).unwrap_or(true) {
                best = Some((score, candidate));
            }
        }
    }

    best.map(|(_, name)| name.to_string())
}
