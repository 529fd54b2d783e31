//! # Context Filter Module / 上下文过滤模块
//!
//! Intersects the variants allowed by the global configuration with the
//! variants a test case asks for.
//!
//! 将全局配置允许的变体与测试用例要求的变体求交集。

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::variant::{Variant, expand};

/// Returns the contexts to execute, based on the variants selected by the
/// configuration and the ones declared by a test case.
///
/// - No test preference: every configured variant except explicit ones.
/// - Otherwise: configured variants the test also names, explicit ones included.
///
/// 根据配置选择的变体和测试用例声明的变体，返回需要执行的上下文。
pub fn filter_contexts<V: Variant>(config_variants: &[V], test_variants: &[V]) -> Vec<V> {
    if test_variants.is_empty() {
        return config_variants
            .iter()
            .copied()
            .filter(|v| !v.is_explicit())
            .collect();
    }
    config_variants
        .iter()
        .copied()
        .filter(|v| test_variants.contains(v))
        .collect()
}

/// Picks a single variant for a test that accepts any variant of the axis.
///
/// The first configured preferred variant wins, then the first configured
/// variant at all. Explicit variants are never picked.
pub fn select_any<V: Variant>(config_variants: &[V]) -> Vec<V> {
    let candidates = filter_contexts(config_variants, &[]);
    candidates
        .iter()
        .copied()
        .find(|v| v.is_preferred())
        .or_else(|| candidates.first().copied())
        .into_iter()
        .collect()
}

/// Returns `true` when `test_type` belongs to the expansion of the
/// configured test types.
pub fn test_type_selected<V: Variant>(config_types: &[V], test_type: V) -> bool {
    let requested = expand(&[config_types]);
    test_type.iter().any(|leaf| requested.contains(&leaf))
}

/// A test case's declaration for one axis.
/// 测试用例在某一轴上的声明。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<V: Variant> {
    /// No preference: every configured, non-explicit variant.
    All,
    /// One variant is enough; preferred ones first.
    Any,
    /// Only the named variants (composites are expanded).
    Only(Vec<V>),
}

impl<V: Variant> Default for Selection<V> {
    fn default() -> Self {
        Selection::All
    }
}

impl<V: Variant> Selection<V> {
    /// Resolves the declaration against the configured variants.
    pub fn resolve(&self, config_variants: &[V]) -> Vec<V> {
        match self {
            Selection::All => filter_contexts(config_variants, &[]),
            Selection::Any => select_any(config_variants),
            Selection::Only(named) => {
                let named = expand(&[named.as_slice()]);
                // an empty list here means "none", not "no preference"
                if named.is_empty() {
                    return Vec::new();
                }
                filter_contexts(config_variants, &named)
            }
        }
    }
}

impl<V: Variant + Serialize> Serialize for Selection<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("all"),
            Selection::Any => serializer.serialize_str("any"),
            Selection::Only(named) => named.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Keyword(String),
    List(Vec<String>),
}

impl<'de, V: Variant + std::str::FromStr> Deserialize<'de> for Selection<V>
where
    V::Err: std::fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parse = |name: &str| -> Result<V, D::Error> {
            name.parse::<V>().map_err(serde::de::Error::custom)
        };
        match RawSelection::deserialize(deserializer)? {
            RawSelection::Keyword(word) => match word.trim().to_ascii_lowercase().as_str() {
                "all" => Ok(Selection::All),
                "any" => Ok(Selection::Any),
                _ => Ok(Selection::Only(vec![parse(&word)?])),
            },
            RawSelection::List(names) => {
                if names.is_empty() {
                    return Ok(Selection::All);
                }
                names
                    .iter()
                    .map(|name| parse(name))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Selection::Only)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variant::{BuildKind, FsKind, TestType};

    #[test]
    fn no_preference_drops_explicit_variants() {
        let config = [FsKind::Pmem, FsKind::Non, FsKind::Nonpmem];
        assert_eq!(
            filter_contexts(&config, &[]),
            vec![FsKind::Pmem, FsKind::Nonpmem]
        );
    }

    #[test]
    fn named_variants_are_intersected() {
        let config = [FsKind::Pmem, FsKind::Non];
        assert_eq!(filter_contexts(&config, &[FsKind::Non]), vec![FsKind::Non]);
        assert_eq!(
            filter_contexts(&config, &[FsKind::Nonpmem]),
            Vec::<FsKind>::new()
        );
    }

    #[test]
    fn any_prefers_preferred_variants() {
        let config = [BuildKind::StaticDebug, BuildKind::Nondebug, BuildKind::Debug];
        assert_eq!(select_any(&config), vec![BuildKind::Nondebug]);

        let config = [FsKind::Non, FsKind::Nonpmem];
        assert_eq!(select_any(&config), vec![FsKind::Nonpmem]);

        assert!(select_any::<FsKind>(&[FsKind::Non]).is_empty());
    }

    #[test]
    fn selection_only_expands_composites() {
        let selection = Selection::Only(vec![TestType::Check]);
        let config = [TestType::Short, TestType::Long];
        assert_eq!(selection.resolve(&config), vec![TestType::Short]);
    }

    #[test]
    fn test_type_membership_uses_expansion() {
        assert!(test_type_selected(&[TestType::Check], TestType::Medium));
        assert!(!test_type_selected(&[TestType::Check], TestType::Long));
        assert!(test_type_selected(&[TestType::Long, TestType::Short], TestType::Long));
    }

    #[test]
    fn selection_deserializes_keywords_and_lists() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            fs: Selection<FsKind>,
        }

        let any: Holder = toml::from_str(r#"fs = "any""#).unwrap();
        assert_eq!(any.fs, Selection::Any);

        let list: Holder = toml::from_str(r#"fs = ["non", "pmem"]"#).unwrap();
        assert_eq!(list.fs, Selection::Only(vec![FsKind::Non, FsKind::Pmem]));

        let single: Holder = toml::from_str(r#"fs = "nonpmem""#).unwrap();
        assert_eq!(single.fs, Selection::Only(vec![FsKind::Nonpmem]));

        let missing: Holder = toml::from_str("").unwrap();
        assert_eq!(missing.fs, Selection::All);

        assert!(toml::from_str::<Holder>(r#"fs = ["tmpfs"]"#).is_err());
    }
}
