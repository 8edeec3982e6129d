//! # Property-Based Tests
//!
//! Invariants of the offline data layer that must hold for any input.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use exoai_core::{
    Class, ClassProbabilities, ClassificationHistoryEntry, DatasetQuery, HistoryStore,
    MemoryStore, Mission, PredictionResult, ResponseContract, ShapContribution, TransitSignal,
    csv, dataset::apply_query, heuristic, primitives::CLASS_ORDER, primitives::MISSION_CYCLE,
    substitute,
};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn mission_strategy() -> impl Strategy<Value = Option<Mission>> {
    prop_oneof![
        Just(None),
        Just(Some(Mission::Kepler)),
        Just(Some(Mission::K2)),
        Just(Some(Mission::Tess)),
    ]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Row i is labelled and attributed by i mod 3, for any row count.
    #[test]
    fn dataset_rows_cycle_labels_and_missions(n in 0usize..300, seed in any::<u64>()) {
        let rows = substitute::dataset_rows(n, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(rows.len(), n);
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.label, CLASS_ORDER[i % 3]);
            prop_assert_eq!(row.mission, MISSION_CYCLE[i % 3]);
            prop_assert!(row.id.starts_with(row.mission.id_prefix()));
        }
    }

    /// Every generated feature lies in its substitute range.
    #[test]
    fn dataset_features_stay_in_range(seed in any::<u64>()) {
        let rows = substitute::dataset_rows(30, &mut StdRng::seed_from_u64(seed));
        for row in &rows {
            for spec in exoai_core::primitives::FEATURES {
                let value = row.feature(spec.name).expect("known feature");
                prop_assert!(value >= spec.range.0 && value < spec.range.1,
                    "{} = {} outside {:?}", spec.name, value, spec.range);
            }
        }
    }

    /// Paging never returns more than the limit and never more than total.
    #[test]
    fn dataset_pages_respect_query(
        mission in mission_strategy(),
        page in 0u32..12,
        limit in 0u32..700,
        seed in any::<u64>(),
    ) {
        let query = DatasetQuery { mission, page, limit, search: None };
        let result = substitute::dataset(&query, &mut StdRng::seed_from_u64(seed));
        result.check().expect("contract");
        prop_assert!(result.rows.len() <= limit.clamp(1, 500) as usize);
        prop_assert!(result.rows.iter().all(|r| mission.is_none_or(|m| r.mission == m)));

        let expected_total = match mission {
            None => 100,
            Some(Mission::Kepler) => 34,
            Some(_) => 33,
        };
        prop_assert_eq!(result.total, expected_total);
    }

    /// Concatenating all pages reproduces the filtered set in order.
    #[test]
    fn dataset_pages_partition_rows(limit in 1u32..40, seed in any::<u64>()) {
        let rows = substitute::dataset_rows(100, &mut StdRng::seed_from_u64(seed));
        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let query = DatasetQuery { page, limit, ..DatasetQuery::default() };
            let chunk = apply_query(rows.clone(), &query);
            if chunk.rows.is_empty() {
                break;
            }
            collected.extend(chunk.rows);
            page += 1;
        }
        prop_assert_eq!(collected, rows);
    }

    /// Heuristic probabilities are a valid distribution whose max is the class.
    #[test]
    fn heuristic_outputs_valid_distribution(
        depth in -100.0f64..10_000.0,
        radius in -1.0f64..30.0,
        period in -1.0f64..1000.0,
    ) {
        let (class, probabilities) = heuristic::classify(TransitSignal::new(depth, radius, period));
        probabilities.check().expect("contract");
        prop_assert_eq!(probabilities.max().0, class);
    }

    /// Confirmed implies the candidate thresholds would also have held.
    #[test]
    fn confirmed_is_stricter_than_candidate(
        depth in 0.0f64..10_000.0,
        radius in 0.0f64..30.0,
        period in 0.0f64..1000.0,
    ) {
        let (class, _) = heuristic::classify(TransitSignal::new(depth, radius, period));
        if class == Class::Confirmed {
            prop_assert!(depth > heuristic::CANDIDATE_MIN_DEPTH);
            prop_assert!(radius > heuristic::CANDIDATE_MIN_RADIUS);
        }
    }

    /// Substitute predictions carry one SHAP entry per input key.
    #[test]
    fn prediction_shap_matches_inputs(
        features in btree_map("[a-z_]{1,16}", -1.0e4f64..1.0e4, 0..12),
        seed in any::<u64>(),
    ) {
        let request = exoai_core::PredictionRequest::new(features.clone());
        let result = substitute::prediction(&request, &mut StdRng::seed_from_u64(seed));
        result.check().expect("contract");
        let keys: Vec<&str> = result.shap_contributions.iter().map(|c| c.feature.as_str()).collect();
        let expected: Vec<&str> = features.keys().map(String::as_str).collect();
        prop_assert_eq!(keys, expected);
        prop_assert!(result
            .shap_contributions
            .iter()
            .all(|c| (-0.3..0.3).contains(&c.contribution)));
    }

    /// CSV header is the first record's keys; later records follow that order.
    #[test]
    fn csv_export_uses_first_record_column_order(
        columns in vec("[a-z]{1,8}", 1..6),
        extra in vec(any::<u32>(), 1..5),
    ) {
        let mut columns = columns;
        columns.sort();
        columns.dedup();
        prop_assume!(columns.len() >= 2);

        let first: Map<String, Value> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), Value::from(i as u64)))
            .collect();
        // Later records list their keys in reverse and drop the first column.
        let later: Vec<Map<String, Value>> = extra
            .iter()
            .map(|n| {
                columns
                    .iter()
                    .skip(1)
                    .rev()
                    .map(|c| (c.clone(), Value::from(u64::from(*n))))
                    .collect()
            })
            .collect();

        let mut records = vec![first];
        records.extend(later);
        let text = csv::export_records(&records);
        let parsed = csv::parse(&text).expect("parse back");

        prop_assert_eq!(&parsed[0], &columns);
        prop_assert_eq!(parsed.len(), records.len());
        for (row, n) in parsed.iter().skip(1).zip(&extra) {
            prop_assert_eq!(row.len(), columns.len());
            prop_assert_eq!(row[0].as_str(), "");
            prop_assert!(row.iter().skip(1).all(|cell| cell == &n.to_string()));
        }
    }

    /// A stored classification reads back identically.
    #[test]
    fn history_round_trips(
        features in btree_map("[a-z_]{1,12}", -1.0e6f64..1.0e6, 1..10),
        confirmed in 0.0f64..1.0,
        contribution in -0.3f64..0.3,
    ) {
        let candidate = (1.0 - confirmed) / 2.0;
        let result = PredictionResult {
            predicted_class: Class::Candidate,
            class_probabilities: ClassProbabilities::new(confirmed, candidate, 1.0 - confirmed - candidate),
            shap_contributions: features
                .iter()
                .map(|(k, v)| ShapContribution { feature: k.clone(), value: *v, contribution })
                .collect(),
            rationale: "round trip".to_string(),
        };
        let entry = ClassificationHistoryEntry::new(features, result);

        let history = HistoryStore::new(MemoryStore::new());
        history.save_last(&entry).expect("save");
        prop_assert_eq!(history.load_last().expect("load"), Some(entry));
    }

    /// Batch annotation appends two columns to every row.
    #[test]
    fn batch_annotation_appends_two_columns(
        depths in vec(0.0f64..6000.0, 0..20),
    ) {
        let mut input = String::from("transit_depth,planetary_radius,orbital_period\n");
        for d in &depths {
            input.push_str(&format!("{d},1.5,20\n"));
        }
        let out = csv::annotate_predictions(&input).expect("valid csv");
        let rows = csv::parse(&out).expect("parse back");
        prop_assert_eq!(rows.len(), depths.len() + 1);
        prop_assert!(rows.iter().all(|r| r.len() == 5));
        for (row, d) in rows.iter().skip(1).zip(&depths) {
            let signal = TransitSignal::new(*d, 1.5, 20.0);
            let (class, _) = heuristic::classify(signal);
            prop_assert_eq!(row[3].as_str(), class.as_str());
        }
    }
}

#[test]
fn documented_heuristic_examples() {
    let cases = [
        ((1200.0, 1.2, 365.0), Class::Confirmed, (0.75, 0.20, 0.05)),
        ((600.0, 0.4, 50.0), Class::Candidate, (0.30, 0.60, 0.10)),
        ((100.0, 0.1, 0.0), Class::FalsePositive, (0.10, 0.20, 0.70)),
    ];
    for ((depth, radius, period), class, (c, k, f)) in cases {
        let features: BTreeMap<String, f64> = [
            ("transit_depth".to_string(), depth),
            ("planetary_radius".to_string(), radius),
            ("orbital_period".to_string(), period),
        ]
        .into_iter()
        .collect();
        let (got, probabilities) = heuristic::classify(TransitSignal::from_features(&features));
        assert_eq!(got, class);
        assert_eq!(probabilities, ClassProbabilities::new(c, k, f));
    }
}
