//! # Variant Axes Module / 变体轴模块
//!
//! A test runs against one variant from each of three independent axes:
//! the build flavour of the library, the filesystem the test directory lives
//! on, and the duration class of the test. A variant may stand for several
//! other variants of the same axis (`check` covers `short` and `medium`);
//! expansion flattens such composites down to leaf variants.
//!
//! 测试会在三个独立轴上各选一个变体运行：库的构建类型、测试目录所在的文件系统
//! 以及测试的时长类别。一个变体可以代表同一轴上的多个其他变体（`check` 包含
//! `short` 和 `medium`），展开操作会把这些组合变体展平为叶子变体。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::core::error::HarnessError;

/// The independent dimensions of test configuration.
/// 测试配置的独立维度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Build,
    Fs,
    TestType,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Build => "build",
            Axis::Fs => "fs",
            Axis::TestType => "test_type",
        };
        f.write_str(name)
    }
}

/// A named option along one test axis.
///
/// Identity is the enum value itself, so equality and hashing deduplicate
/// variants the same way a set of tags would.
///
/// 测试轴上的一个具名选项。变体的身份就是枚举值本身。
pub trait Variant: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The axis every value of this type belongs to.
    const AXIS: Axis;

    /// Every variant available on the current platform, leaves and composites.
    fn all() -> &'static [Self];

    /// Lowercase name used in configuration files and log lines.
    fn name(self) -> &'static str;

    /// Preferred when a test accepts any variant of this axis.
    fn is_preferred(self) -> bool {
        false
    }

    /// Only selected when a test names it directly.
    fn is_explicit(self) -> bool {
        false
    }

    /// Variants this one stands for, as declared. Empty for a leaf.
    fn declared_includes(self) -> &'static [Self] {
        &[]
    }

    /// Flattened member table of the axis, computed once.
    fn registry() -> &'static Registry<Self>;

    /// Fully expanded leaf members. A leaf yields exactly itself.
    fn members(self) -> &'static [Self] {
        Self::registry().members(self)
    }

    /// Iterates over the expanded members.
    fn iter(self) -> std::iter::Copied<std::slice::Iter<'static, Self>> {
        self.members().iter().copied()
    }

    /// `true` when the variant declares no includes of its own.
    fn is_leaf(self) -> bool {
        self.declared_includes().is_empty()
    }
}

/// Precomputed member lists for every variant of one axis.
/// 某一轴上所有变体的预计算成员列表。
#[derive(Debug)]
pub struct Registry<V: Variant> {
    members: HashMap<V, Vec<V>>,
}

impl<V: Variant> Registry<V> {
    /// Builds the table by recursively flattening declared includes.
    pub fn build(variants: &[V]) -> Self {
        let mut members = HashMap::with_capacity(variants.len());
        for &variant in variants {
            let mut flat = Vec::new();
            let mut seen = HashSet::new();
            let mut visiting = Vec::new();
            flatten(variant, &mut flat, &mut seen, &mut visiting);
            members.insert(variant, flat);
        }
        Self { members }
    }

    /// Returns the flattened members of `variant`.
    ///
    /// Variants outside `V::all()` (platform-excluded ones) are not registered;
    /// they resolve to an empty list.
    pub fn members(&self, variant: V) -> &[V] {
        self.members.get(&variant).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn flatten<V: Variant>(variant: V, out: &mut Vec<V>, seen: &mut HashSet<V>, visiting: &mut Vec<V>) {
    // a cycle in the static tables would recurse forever
    assert!(
        !visiting.contains(&variant),
        "cyclic includes for {} variant '{}'",
        V::AXIS,
        variant
    );

    let includes = variant.declared_includes();
    if includes.is_empty() {
        if seen.insert(variant) {
            out.push(variant);
        }
        return;
    }

    visiting.push(variant);
    for &inner in includes {
        flatten(inner, out, seen, visiting);
    }
    visiting.pop();
}

/// Flattens groups of variants into a deduplicated list of leaf variants.
///
/// Order carries no meaning; the first occurrence of each leaf decides its
/// position so that output stays deterministic.
///
/// 将多组变体展平为去重后的叶子变体列表。顺序没有语义，保留首次出现的位置。
pub fn expand<V: Variant>(groups: &[&[V]]) -> Vec<V> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.iter())
        .flat_map(|&variant| variant.iter())
        .filter(|&leaf| seen.insert(leaf))
        .collect()
}

/// Parses a variant of any axis by its name, accepting the listed aliases.
fn parse_variant<V: Variant>(s: &str, aliases: &[(&str, V)]) -> Result<V, HarnessError> {
    let wanted = s.trim().to_ascii_lowercase();
    V::all()
        .iter()
        .copied()
        .find(|v| v.name() == wanted)
        .or_else(|| {
            aliases
                .iter()
                .find(|(alias, _)| *alias == wanted)
                .map(|(_, v)| *v)
        })
        .ok_or_else(|| HarnessError::UnknownVariant {
            axis: V::AXIS,
            name: s.to_string(),
        })
}

/// Implements `Display`, `FromStr` and string-based serde for a variant enum.
macro_rules! variant_strings {
    ($ty:ty, $aliases:expr) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = HarnessError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_variant(s, $aliases)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Build flavour of the library under test.
/// 被测库的构建类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildKind {
    Debug,
    Nondebug,
    StaticDebug,
    StaticNondebug,
}

#[cfg(not(windows))]
const BUILD_KINDS: &[BuildKind] = &[
    BuildKind::Debug,
    BuildKind::Nondebug,
    BuildKind::StaticDebug,
    BuildKind::StaticNondebug,
];

// Static builds are not produced on Windows.
#[cfg(windows)]
const BUILD_KINDS: &[BuildKind] = &[BuildKind::Debug, BuildKind::Nondebug];

static BUILD_REGISTRY: Lazy<Registry<BuildKind>> = Lazy::new(|| Registry::build(BUILD_KINDS));

impl Variant for BuildKind {
    const AXIS: Axis = Axis::Build;

    fn all() -> &'static [Self] {
        BUILD_KINDS
    }

    fn name(self) -> &'static str {
        match self {
            BuildKind::Debug => "debug",
            BuildKind::Nondebug => "nondebug",
            BuildKind::StaticDebug => "static_debug",
            BuildKind::StaticNondebug => "static_nondebug",
        }
    }

    fn is_preferred(self) -> bool {
        matches!(self, BuildKind::Debug | BuildKind::Nondebug)
    }

    fn registry() -> &'static Registry<Self> {
        &BUILD_REGISTRY
    }
}

variant_strings!(BuildKind, &[]);

/// Filesystem the test directory is placed on.
/// 测试目录所在的文件系统。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FsKind {
    Pmem,
    Nonpmem,
    /// No filesystem is used; the test must not touch a test directory.
    Non,
}

const FS_KINDS: &[FsKind] = &[FsKind::Pmem, FsKind::Nonpmem, FsKind::Non];

static FS_REGISTRY: Lazy<Registry<FsKind>> = Lazy::new(|| Registry::build(FS_KINDS));

impl Variant for FsKind {
    const AXIS: Axis = Axis::Fs;

    fn all() -> &'static [Self] {
        FS_KINDS
    }

    fn name(self) -> &'static str {
        match self {
            FsKind::Pmem => "pmem",
            FsKind::Nonpmem => "nonpmem",
            FsKind::Non => "non",
        }
    }

    fn is_preferred(self) -> bool {
        self == FsKind::Pmem
    }

    fn is_explicit(self) -> bool {
        self == FsKind::Non
    }

    fn registry() -> &'static Registry<Self> {
        &FS_REGISTRY
    }
}

variant_strings!(FsKind, &[("none", FsKind::Non)]);

/// Duration class of a test.
/// 测试的时长类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestType {
    Short,
    Medium,
    Long,
    /// The default selection of a regular `check` run.
    Check,
}

const TEST_TYPES: &[TestType] = &[
    TestType::Short,
    TestType::Medium,
    TestType::Long,
    TestType::Check,
];

static TEST_TYPE_REGISTRY: Lazy<Registry<TestType>> = Lazy::new(|| Registry::build(TEST_TYPES));

impl Variant for TestType {
    const AXIS: Axis = Axis::TestType;

    fn all() -> &'static [Self] {
        TEST_TYPES
    }

    fn name(self) -> &'static str {
        match self {
            TestType::Short => "short",
            TestType::Medium => "medium",
            TestType::Long => "long",
            TestType::Check => "check",
        }
    }

    fn declared_includes(self) -> &'static [Self] {
        match self {
            TestType::Check => &[TestType::Short, TestType::Medium],
            _ => &[],
        }
    }

    fn registry() -> &'static Registry<Self> {
        &TEST_TYPE_REGISTRY
    }
}

variant_strings!(TestType, &[]);
