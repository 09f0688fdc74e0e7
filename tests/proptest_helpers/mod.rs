#![allow(dead_code)]

use std::collections::HashSet;

use ijroi::roi::Point;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Points whose bounding box fits the format's signed 16-bit offsets.
pub fn arb_points(max_len: usize) -> BoxedStrategy<Vec<Point<i16>>> {
    (-12000i16..=12000, -12000i16..=12000)
        .prop_flat_map(move |(row0, col0)| {
            proptest::collection::vec((0i16..=4000, 0i16..=4000), 1..=max_len).prop_map(
                move |offsets| {
                    offsets
                        .into_iter()
                        .map(|(dr, dc)| Point::new(row0 + dr, col0 + dc))
                        .collect()
                },
            )
        })
        .boxed()
}

/// Names mixing single-unit characters with ones stored as surrogate pairs.
pub fn arb_name() -> BoxedStrategy<String> {
    proptest::string::string_regex("[A-Za-z0-9_\\- éøµ🦀𝔸]{1,24}")
        .expect("valid name regex")
        .boxed()
}

/// Uniquely named point sets, sorted by name.
pub fn arb_named_sets(max_sets: usize, max_len: usize) -> BoxedStrategy<Vec<(String, Vec<Point<i16>>)>> {
    proptest::collection::hash_set(arb_name(), 1..=max_sets)
        .prop_flat_map(move |names: HashSet<String>| {
            let mut names: Vec<String> = names.into_iter().collect();
            names.sort();
            let count = names.len();
            proptest::collection::vec(arb_points(max_len), count..=count).prop_map(
                move |point_sets| names.clone().into_iter().zip(point_sets).collect(),
            )
        })
        .boxed()
}
