//! Property-based tests for trueno-pipeline
//!
//! - Composite key equality and hashing are structural
//! - Origin tagging preserves every adapter log entry
//! - Metric rows survive the table round trip in first-seen column order
//! - Run with ProptestConfig::with_cases(100)

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use trueno_pipeline::figure::Figure;
use trueno_pipeline::keys::{AbstractionLevel, AdapterKey, Column, DataOrigin, ProcessPhase, TableKey};
use trueno_pipeline::store::{tag_origin, AdapterLogs};
use trueno_pipeline::table::{column_values, MetricRow, TableBuilder};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

fn arb_origin() -> impl Strategy<Value = DataOrigin> {
    prop::sample::select(DataOrigin::ALL.to_vec())
}

fn arb_level() -> impl Strategy<Value = AbstractionLevel> {
    prop::sample::select(AbstractionLevel::ALL.to_vec())
}

fn arb_phase() -> impl Strategy<Value = ProcessPhase> {
    prop::sample::select(ProcessPhase::ALL.to_vec())
}

fn arb_table_key() -> impl Strategy<Value = TableKey> {
    (arb_origin(), arb_level(), arb_phase())
        .prop_map(|(origin, level, phase)| TableKey::new(origin, level, phase))
}

/// Adapter logs with up to 8 distinct keys, each a single-row table.
fn arb_adapter_logs() -> impl Strategy<Value = AdapterLogs> {
    prop::collection::hash_set((arb_level(), arb_phase()), 0..=8).prop_map(|keys| {
        keys.into_iter()
            .map(|(level, phase)| {
                let table = [MetricRow::new().with(Column::Loss, 1.0)]
                    .into_iter()
                    .collect::<TableBuilder>()
                    .build()
                    .unwrap();
                (AdapterKey::new(level, phase), table)
            })
            .collect()
    })
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: keys built from equal components are equal and hash equally
    #[test]
    fn prop_table_key_structural_equality(key in arb_table_key()) {
        let rebuilt = TableKey::new(key.origin(), key.abstraction_level(), key.phase());
        prop_assert_eq!(key, rebuilt);
        prop_assert_eq!(hash_of(&key), hash_of(&rebuilt));
    }

    /// Property: keys differing in any component are unequal
    #[test]
    fn prop_table_key_components_distinguish(a in arb_table_key(), b in arb_table_key()) {
        let same_components = a.origin() == b.origin()
            && a.abstraction_level() == b.abstraction_level()
            && a.phase() == b.phase();
        prop_assert_eq!(a == b, same_components);
    }

    /// Property: origin tagging keeps the size and the local key of every entry
    #[test]
    fn prop_origin_tagging_preserves_entries(logs in arb_adapter_logs(), origin in arb_origin()) {
        let local_keys: Vec<AdapterKey> = logs.keys().copied().collect();
        let store = tag_origin(logs, origin);

        prop_assert_eq!(store.len(), local_keys.len());
        for key in local_keys {
            prop_assert!(store.contains(&key.with_origin(origin)));
        }
    }

    /// Property: two origins never collide when merged
    #[test]
    fn prop_distinct_origins_union_disjointly(logs in arb_adapter_logs()) {
        let size = logs.len();
        let trainer = tag_origin(logs.clone(), DataOrigin::Trainer);
        let model = tag_origin(logs, DataOrigin::Model);
        prop_assert_eq!(trainer.union(model).len(), 2 * size);
    }

    /// Property: table rows keep their values, missing cells are null
    #[test]
    fn prop_rows_round_trip_through_tables(
        losses in prop::collection::vec(prop::option::of(-1e6f64..1e6), 1..32)
    ) {
        let table = losses
            .iter()
            .map(|loss| {
                let row = MetricRow::new().with(Column::Mae, 0.0);
                match loss {
                    Some(loss) => row.with(Column::Loss, *loss),
                    None => row,
                }
            })
            .collect::<TableBuilder>()
            .build()
            .unwrap();

        prop_assert_eq!(table.num_rows(), losses.len());
        if losses.iter().any(Option::is_some) {
            prop_assert_eq!(column_values(&table, &Column::Loss).unwrap(), losses);
        }
    }

    /// Property: line figures keep only complete points
    #[test]
    fn prop_line_figure_drops_incomplete_points(
        ys in prop::collection::vec(prop::option::of(0.0f64..10.0), 0..32)
    ) {
        let xs: Vec<Option<f64>> = (0..ys.len()).map(|i| Some(i as f64)).collect();
        let figure = Figure::line("epoch", "loss", &xs, &ys);
        prop_assert_eq!(
            figure.series()[0].points().len(),
            ys.iter().filter(|y| y.is_some()).count()
        );
    }
}
