// src/ordering.rs

//! Deterministic run order for predictors.

use std::cmp::Ordering;

use crate::domain::Predictor;

/// Compare by `(sequence, group_key, id)`, all ascending.
pub fn compare(a: &Predictor, b: &Predictor) -> Ordering {
    a.scheduling
        .sequence
        .cmp(&b.scheduling.sequence)
        .then_with(|| a.scheduling.group_key.cmp(&b.scheduling.group_key))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort predictors into run order.
///
/// The result depends only on the set of predictors, not on the order they
/// arrived in.
pub fn order_predictors(mut predictors: Vec<Predictor>) -> Vec<Predictor> {
    predictors.sort_by(compare);
    predictors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scheduling;

    fn predictor(id: &str, sequence: i64, group_key: &str) -> Predictor {
        Predictor {
            id: id.to_string(),
            name: format!("Predictor {id}"),
            scheduling: Scheduling {
                sequence,
                group_key: group_key.to_string(),
            },
            payload: serde_json::Value::Null,
        }
    }

    fn ids(predictors: &[Predictor]) -> Vec<&str> {
        predictors.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_sequence_then_group_then_id() {
        let ordered = order_predictors(vec![
            predictor("c", 2, "a"),
            predictor("b", 1, "z"),
            predictor("d", 1, "a"),
            predictor("a", 1, "a"),
        ]);

        assert_eq!(ids(&ordered), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn negative_sequences_sort_first() {
        let ordered = order_predictors(vec![predictor("x", 0, ""), predictor("y", -1, "")]);
        assert_eq!(ids(&ordered), vec!["y", "x"]);
    }
}
