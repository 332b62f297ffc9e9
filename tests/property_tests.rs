//! Property-based tests for propbind using proptest.
//!
//! These tests verify round-trip properties of the field types, key
//! composition through prefixes and nested configurations, and the algebra
//! of error accumulation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use propbind::types::{
    format_duration, parse_duration, BoolType, Charset, CharsetType, Day, DayType,
    DigestAlgorithm, DigestType, DurationType, EnumField, EnumType, FieldType, IntType, PathType,
    ServiceRegistry, ServiceType, TimeZone, TimeZoneType,
};
use propbind::{
    Config, MapSource, PrefixSource, PropertiesError, PropertiesErrors, PropertiesFile,
    Properties, Registry, Result, Source,
};
use stillwater::Semigroup;

// ============================================================================
// Generators
// ============================================================================

fn arb_duration() -> impl Strategy<Value = Duration> {
    (0u64..10_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| Duration::new(secs, nanos))
}

fn arb_day() -> impl Strategy<Value = Day> {
    (0i32..=9999, 1u32..=12, 1u32..=31)
        .prop_filter_map("day exists", |(y, m, d)| Day::from_ymd(y, m, d))
}

fn arb_offset() -> impl Strategy<Value = i32> {
    (-18 * 60..=18 * 60).prop_map(|minutes: i32| minutes * 60)
}

fn arb_time_zone() -> impl Strategy<Value = TimeZone> {
    let regions: Vec<String> = chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.name().to_string())
        .filter(|name| !matches!(name.as_str(), "UTC" | "GMT" | "UT"))
        .collect();
    prop_oneof![
        arb_offset().prop_map(TimeZone::Offset),
        (prop::sample::select(vec!["UTC", "GMT", "UT"]), arb_offset()).prop_map(
            |(prefix, offset)| TimeZone::Prefixed {
                prefix: prefix.to_string(),
                offset,
            }
        ),
        prop::sample::select(regions).prop_map(TimeZone::Region),
    ]
}

/// A charset and one of the names it answers to, in random letter case.
fn arb_charset_name() -> impl Strategy<Value = (Charset, String)> {
    let names: Vec<(Charset, &'static str)> = Charset::ALL
        .into_iter()
        .flat_map(|c| {
            std::iter::once(c.name())
                .chain(c.aliases().iter().copied())
                .map(move |n| (c, n))
        })
        .collect();
    (prop::sample::select(names), any::<u64>()).prop_map(|((charset, name), mask)| {
        let name = name
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                if (mask >> (i % 64)) & 1 == 1 {
                    ch.to_ascii_lowercase()
                } else {
                    ch
                }
            })
            .collect();
        (charset, name)
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Fast,
    Safe,
    Off,
}

impl EnumField for Mode {
    fn variants() -> &'static [Self] {
        &[Mode::Fast, Mode::Safe, Mode::Off]
    }

    fn name(&self) -> &'static str {
        match self {
            Mode::Fast => "FAST",
            Mode::Safe => "SAFE",
            Mode::Off => "OFF",
        }
    }
}

fn arb_segment() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}"
}

fn arb_error() -> impl Strategy<Value = PropertiesError> {
    prop_oneof![
        Just(PropertiesError::NotSet),
        Just(PropertiesError::NoSources),
        arb_segment().prop_map(|key| PropertiesError::DuplicateKey { key }),
    ]
}

fn arb_errors() -> impl Strategy<Value = PropertiesErrors> {
    prop::collection::vec(arb_error(), 1..5).prop_map(|errors| {
        let mut iter = errors.into_iter();
        let first = PropertiesErrors::single(iter.next().unwrap_or(PropertiesError::NotSet));
        iter.fold(first, |acc, e| acc.combine(PropertiesErrors::single(e)))
    })
}

// ============================================================================
// Field type round trips
// ============================================================================

proptest! {
    #[test]
    fn prop_int_render_parse_roundtrip(value in any::<i32>()) {
        let int = IntType::new(i32::MIN);
        prop_assert_eq!(int.parse(&int.render(&value)).unwrap(), value);
    }

    #[test]
    fn prop_int_below_minimum_is_rejected(minimum in -1000i32..1000, below in 1i32..1000) {
        let int = IntType::new(minimum);
        let value = minimum - below;
        let rejection = int.check(&value).unwrap_err();
        prop_assert_eq!(
            rejection.detail(),
            format!("must be an integer greater or equal {}, but was {}", minimum, value)
        );
        prop_assert!(int.check(&minimum).is_ok());
    }

    #[test]
    fn prop_duration_format_parse_roundtrip(duration in arb_duration()) {
        let rendered = format_duration(duration);
        prop_assert_eq!(parse_duration(&rendered), Some(duration));
    }

    #[test]
    fn prop_duration_bounds_are_inclusive(a in arb_duration(), b in arb_duration()) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let bounded = DurationType::new(min, max);
        prop_assert!(bounded.check(&min).is_ok());
        prop_assert!(bounded.check(&max).is_ok());
        prop_assert!(bounded.check(&(max + Duration::from_nanos(1))).is_err());
    }

    #[test]
    fn prop_day_render_parse_roundtrip(day in arb_day()) {
        prop_assert_eq!(DayType.parse(&DayType.render(&day)).unwrap(), day);
    }

    #[test]
    fn prop_bool_render_parse_roundtrip(value in any::<bool>()) {
        prop_assert_eq!(BoolType.parse(&BoolType.render(&value)).unwrap(), value);
    }

    #[test]
    fn prop_time_zone_render_parse_roundtrip(zone in arb_time_zone()) {
        prop_assert!(TimeZoneType.check(&zone).is_ok());
        let rendered = TimeZoneType.render(&zone);
        prop_assert_eq!(TimeZoneType.parse(&rendered).unwrap(), zone);
    }

    #[test]
    fn prop_charset_names_and_aliases_resolve((charset, name) in arb_charset_name()) {
        prop_assert_eq!(CharsetType.parse(&name).unwrap(), charset);
        prop_assert_eq!(CharsetType.parse(&CharsetType.render(&charset)).unwrap(), charset);
    }

    #[test]
    fn prop_enum_render_parse_roundtrip(mode in prop::sample::select(Mode::variants().to_vec())) {
        let modes = EnumType::<Mode>::new();
        prop_assert_eq!(modes.parse(&modes.render(&mode)).unwrap(), mode);
    }

    #[test]
    fn prop_digest_render_parse_roundtrip(algorithm in prop::sample::select(DigestAlgorithm::ALL.to_vec())) {
        prop_assert_eq!(DigestType.parse(&DigestType.render(&algorithm)).unwrap(), algorithm);
    }

    #[test]
    fn prop_path_parse_render_roundtrip(raw in "[a-zA-Z0-9_./-]{1,30}") {
        let path = PathType.parse(&raw).unwrap();
        prop_assert_eq!(&path, &PathBuf::from(&raw));
        prop_assert_eq!(PathType.render(&path), raw);
    }

    #[test]
    fn prop_service_render_parse_roundtrip(
        names in prop::collection::btree_set(arb_segment(), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let registry = names.iter().fold(ServiceRegistry::<String, usize>::new(), |registry, name| {
            let tag = name.clone();
            registry.with(name.clone(), move |n| format!("{}#{}", tag, n))
        });
        let services = ServiceType::new(&registry);
        let names: Vec<&String> = names.iter().collect();
        let name = pick.get(&names);

        let factory = services.parse(name).unwrap();
        prop_assert_eq!(services.render(&factory), name.as_str());
        prop_assert_eq!(factory.create(3), format!("{}#3", name));
        prop_assert_eq!(services.parse(&services.render(&factory)).unwrap(), factory);
    }
}

// ============================================================================
// Key composition
// ============================================================================

proptest! {
    #[test]
    fn prop_prefix_source_composes_keys(
        prefix in arb_segment(),
        key in arb_segment(),
        value in "[a-z0-9]{0,10}",
    ) {
        let inner: Arc<dyn Source> = Arc::new(
            MapSource::new("test").with(format!("{}.{}", prefix, key), value.clone()),
        );
        let view = PrefixSource::new(inner, prefix.clone());

        prop_assert_eq!(view.get(&key), Some(value));
        let keys = view.key_set().unwrap_or_default();
        prop_assert!(keys.contains(&key));
        prop_assert_eq!(keys.len(), 1);
    }

    #[test]
    fn prop_properties_file_reads_simple_pairs(
        pairs in prop::collection::btree_map(arb_segment(), "[a-zA-Z0-9/]{0,12}", 0..8),
    ) {
        let content: String = pairs
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect();
        let source = PropertiesFile::string("test", content).unwrap();

        for (k, v) in &pairs {
            prop_assert_eq!(source.get(k), Some(v.clone()));
        }
        prop_assert_eq!(source.key_set().unwrap_or_default().len(), pairs.len());
    }
}

// ============================================================================
// Nested key flattening
// ============================================================================

thread_local! {
    static CHAIN_PREFIXES: RefCell<VecDeque<String>> = const { RefCell::new(VecDeque::new()) };
}

/// Nests itself once per prefix queued in `CHAIN_PREFIXES`, then declares
/// two leaf fields.
struct Chain {
    leaf: i32,
    other: String,
}

impl Properties for Chain {
    fn describe(fields: &mut Registry<'_>) -> Result<Self> {
        match CHAIN_PREFIXES.with(|prefixes| prefixes.borrow_mut().pop_front()) {
            Some(prefix) => fields.nested::<Chain>(&prefix),
            None => Ok(Self {
                leaf: fields.int("leaf", Some(0), 0)?,
                other: fields.string("other", Some("none"))?,
            }),
        }
    }
}

proptest! {
    #[test]
    fn prop_nested_keys_flatten_at_any_depth(
        prefixes in prop::collection::vec(arb_segment(), 0..6),
        leaf in 0i32..1000,
    ) {
        let path: String = prefixes.iter().map(|p| format!("{}.", p)).collect();
        CHAIN_PREFIXES.with(|queue| *queue.borrow_mut() = prefixes.iter().cloned().collect());

        let source = MapSource::new("test").with(format!("{}leaf", path), leaf.to_string());
        let config = Config::<Chain>::load(source).unwrap();

        prop_assert_eq!(config.leaf, leaf);
        prop_assert_eq!(config.other.as_str(), "none");
        prop_assert_eq!(config.fields().len(), 2);
        prop_assert_eq!(config.fields()[0].key(), format!("{}leaf", path));
        prop_assert_eq!(config.fields()[1].key(), format!("{}other", path));
        prop_assert!(config.fields()[0].is_specified());
        prop_assert!(!config.fields()[1].is_specified());
        prop_assert!(config.orphaned_keys().unwrap().is_empty());
    }
}

// ============================================================================
// Consistency checks
// ============================================================================

struct Named {
    _name: String,
}

impl Properties for Named {
    fn describe(fields: &mut Registry<'_>) -> Result<Self> {
        Ok(Self {
            _name: fields.string("name", None)?,
        })
    }
}

proptest! {
    #[test]
    fn prop_inconsistency_messages_mirror(a in "[a-z]{1,8}", b in "[A-Z]{1,8}") {
        let left = Config::<Named>::load(MapSource::new("left").with("name", a.clone())).unwrap();
        let right = Config::<Named>::load(MapSource::new("right").with("name", b.clone())).unwrap();

        prop_assert_eq!(
            left.ensure_equality(&right).unwrap_err().to_string(),
            format!("inconsistent initialization for name between left and right, expected {} but got {}.", a, b)
        );
        prop_assert_eq!(
            right.ensure_equality(&left).unwrap_err().to_string(),
            format!("inconsistent initialization for name between right and left, expected {} but got {}.", b, a)
        );
    }

    #[test]
    fn prop_equal_values_are_consistent(name in "[a-z]{0,8}") {
        let left = Config::<Named>::load(MapSource::new("left").with("name", name.clone())).unwrap();
        let right = Config::<Named>::load(MapSource::new("right").with("name", name)).unwrap();
        prop_assert!(left.ensure_equality(&right).is_ok());
    }
}

// ============================================================================
// Error accumulation
// ============================================================================

proptest! {
    #[test]
    fn prop_errors_combine_is_associative(
        a in arb_errors(),
        b in arb_errors(),
        c in arb_errors(),
    ) {
        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        let left: Vec<String> = left.iter().map(|e| e.to_string()).collect();
        let right: Vec<String> = right.iter().map(|e| e.to_string()).collect();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_errors_combine_adds_lengths(a in arb_errors(), b in arb_errors()) {
        let expected = a.len() + b.len();
        prop_assert_eq!(a.combine(b).len(), expected);
    }
}
