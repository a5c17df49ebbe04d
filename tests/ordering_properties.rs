// tests/ordering_properties.rs

use proptest::prelude::*;

use predictor_scheduler::domain::Predictor;
use predictor_scheduler::ordering::order_predictors;
use predictor_scheduler_test_utils::builders::PredictorBuilder;

// Small value ranges so that sequence and group collisions are common.
fn predictors_strategy() -> impl Strategy<Value = Vec<Predictor>> {
    proptest::collection::vec((0i64..4, 0u8..3), 0..20).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (sequence, group))| {
                PredictorBuilder::new(&format!("p{i:02}"))
                    .sequence(sequence)
                    .group(&format!("g{group}"))
                    .build()
            })
            .collect()
    })
}

fn ids(predictors: &[Predictor]) -> Vec<String> {
    predictors.iter().map(|p| p.id.clone()).collect()
}

proptest! {
    #[test]
    fn test_order_is_independent_of_input_order(
        predictors in predictors_strategy(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = predictors.clone();
        // Deterministic shuffle driven by the seed.
        let len = shuffled.len();
        if len > 1 {
            let mut state = seed;
            for i in (1..len).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }
        }

        prop_assert_eq!(ids(&order_predictors(predictors)), ids(&order_predictors(shuffled)));
    }

    #[test]
    fn test_order_is_sorted_by_sequence_group_then_id(predictors in predictors_strategy()) {
        let ordered = order_predictors(predictors.clone());

        prop_assert_eq!(ordered.len(), predictors.len());
        for pair in ordered.windows(2) {
            let a = (&pair[0].scheduling.sequence, &pair[0].scheduling.group_key, &pair[0].id);
            let b = (&pair[1].scheduling.sequence, &pair[1].scheduling.group_key, &pair[1].id);
            prop_assert!(a <= b, "{:?} should not come after {:?}", a, b);
        }
    }
}

#[test]
fn test_example_scenario_order() {
    let ordered = order_predictors(vec![
        PredictorBuilder::new("c").sequence(2).build(),
        PredictorBuilder::new("b").sequence(1).build(),
        PredictorBuilder::new("a").sequence(1).build(),
    ]);

    assert_eq!(ids(&ordered), vec!["a", "b", "c"]);
}
