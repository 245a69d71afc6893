use std::collections::HashMap;

use sqlx::prelude::FromRow;

/// One ingredient line pulled from a cart recipe, as flat as the store
/// returns it.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// One output row of the shopping list: identical (name, unit) pairs merged,
/// amounts summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: u64,
}

/// Merge cart lines by (name, measurement_unit) and sum the amounts.
///
/// Ingredients with the same name but different units stay separate lines.
/// The result is sorted by (name, unit), so equal inputs always produce the
/// same output regardless of the order the store returned the rows in.
/// Individual amounts are bounded to 32767 at write time; the u64 total
/// leaves plenty of headroom for any realistic cart.
pub fn aggregate(lines: Vec<CartLine>) -> Vec<AggregatedLine> {
    let mut groups: HashMap<(String, String), u64> = HashMap::new();

    for line in lines {
        let key = (line.name, line.measurement_unit);
        *groups.entry(key).or_insert(0) += line.amount.max(0) as u64;
    }

    let mut result: Vec<AggregatedLine> = groups
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| AggregatedLine {
            name,
            measurement_unit,
            total_amount,
        })
        .collect();

    result.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
    });

    result
}

/// Render aggregated lines as the plain-text shopping list export.
///
/// One `"{name} {unit} - {total}"` row per line, newline separated, no
/// trailing newline. An empty list renders as the empty string.
pub fn render(lines: &[AggregatedLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} {} - {}",
                line.name, line.measurement_unit, line.total_amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_merges_same_name_and_unit() {
        let result = aggregate(vec![line("Flour", "g", 200), line("Flour", "g", 300)]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Flour");
        assert_eq!(result[0].measurement_unit, "g");
        assert_eq!(result[0].total_amount, 500);
    }

    #[test]
    fn test_same_name_different_unit_stays_separate() {
        let result = aggregate(vec![line("Sugar", "g", 50), line("Sugar", "tsp", 2)]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].measurement_unit, "g");
        assert_eq!(result[0].total_amount, 50);
        assert_eq!(result[1].measurement_unit, "tsp");
        assert_eq!(result[1].total_amount, 2);
    }

    #[test]
    fn test_no_duplicate_keys_in_output() {
        let result = aggregate(vec![
            line("Eggs", "pcs", 2),
            line("Flour", "g", 100),
            line("Eggs", "pcs", 4),
            line("Flour", "g", 100),
            line("Eggs", "pcs", 1),
        ]);

        let mut keys: Vec<(&str, &str)> = result
            .iter()
            .map(|l| (l.name.as_str(), l.measurement_unit.as_str()))
            .collect();
        let total_keys = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), total_keys);
    }

    #[test]
    fn test_total_is_preserved_across_grouping() {
        let lines = vec![
            line("Eggs", "pcs", 2),
            line("Flour", "g", 100),
            line("Eggs", "pcs", 4),
            line("Milk", "ml", 250),
            line("Flour", "g", 400),
        ];
        let input_total: i64 = lines.iter().map(|l| l.amount).sum();

        let result = aggregate(lines);
        let output_total: u64 = result.iter().map(|l| l.total_amount).sum();

        assert_eq!(output_total, input_total as u64);
    }

    #[test]
    fn test_deterministic_order_regardless_of_input_order() {
        let forward = aggregate(vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 50),
            line("Eggs", "pcs", 2),
        ]);
        let reversed = aggregate(vec![
            line("Eggs", "pcs", 2),
            line("Sugar", "g", 50),
            line("Flour", "g", 200),
        ]);

        assert_eq!(forward, reversed);
        assert_eq!(forward[0].name, "Eggs");
        assert_eq!(forward[1].name, "Flour");
        assert_eq!(forward[2].name, "Sugar");
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        // Capitals sort before lowercase, matching the persisted collation
        let result = aggregate(vec![line("apple", "pcs", 1), line("Zucchini", "pcs", 1)]);

        assert_eq!(result[0].name, "Zucchini");
        assert_eq!(result[1].name, "apple");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(vec![]).is_empty());
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_two_recipes_with_shared_ingredient() {
        // Recipe 1: Flour 200g, Sugar 50g; Recipe 2: Flour 300g, Eggs 2pcs
        let result = aggregate(vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 50),
            line("Flour", "g", 300),
            line("Eggs", "pcs", 2),
        ]);

        assert_eq!(render(&result), "Eggs pcs - 2\nFlour g - 500\nSugar g - 50");
    }

    #[test]
    fn test_upper_bound_amounts_do_not_overflow() {
        // The same max-amount line from three recipes
        let result = aggregate(vec![
            line("Rice", "g", 32767),
            line("Rice", "g", 32767),
            line("Rice", "g", 32767),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_amount, 98301);
        assert_eq!(render(&result), "Rice g - 98301");
    }
}
