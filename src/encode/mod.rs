//! Feature encoding: raw input → feature vector aligned to the canonical
//! column list.
//!
//! The candidate set is the one-hot expansion of the eight categorical fields
//! (columns named `fieldname_value`) unioned with the four numeric fields
//! (`year`, `month`, `day`, `week`). Reindexing against the canonical list
//! copies matching candidates, zero-fills canonical columns with no candidate,
//! and drops candidates with no canonical counterpart.
//!
//! A categorical value never observed at training time therefore contributes
//! nothing: its one-hot column is silently dropped and the model sees "none of
//! the known levels" for that field. That quietly degrades prediction quality
//! without signaling an error; it is preserved, documented behavior (see
//! DESIGN.md), and the tests below pin it down.

use std::collections::HashMap;

use crate::domain::{CanonicalColumns, FeatureVector, RawInput};

/// Encode one raw input against the canonical column list.
///
/// Infallible by contract: the output length always equals
/// `columns.len()`, whatever values the input holds.
pub fn encode(input: &RawInput, columns: &CanonicalColumns) -> FeatureVector {
    let candidates = expand(input);
    let values = columns
        .iter()
        .map(|name| candidates.get(name).copied().unwrap_or(0.0))
        .collect();
    FeatureVector::new(values)
}

/// One-hot expansion plus numeric fields, keyed by column name.
fn expand(input: &RawInput) -> HashMap<String, f64> {
    let mut out = HashMap::new();

    out.insert("year".to_string(), f64::from(input.year));
    out.insert("month".to_string(), f64::from(input.month));
    out.insert("day".to_string(), f64::from(input.day));
    out.insert("week".to_string(), f64::from(input.week));

    for (field, value) in input.categorical_fields() {
        out.insert(format!("{field}_{value}"), 1.0);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketSelection;

    fn input() -> RawInput {
        RawInput {
            selection: MarketSelection {
                region: "Arusha".to_string(),
                district: "Arusha City".to_string(),
                market: "Arusha Urban".to_string(),
                category: "cereals and tubers".to_string(),
                commodity: "Maize".to_string(),
                unit: "KG".to_string(),
                priceflag: "actual".to_string(),
                pricetype: "Retail".to_string(),
            },
            year: 2024,
            month: 1,
            day: 1,
            week: 1,
        }
    }

    fn columns() -> CanonicalColumns {
        CanonicalColumns::new(
            [
                "year",
                "month",
                "day",
                "week",
                "admin1_Arusha",
                "admin1_Dodoma",
                "commodity_Maize",
                "commodity_Rice",
                "pricetype_Retail",
                "pricetype_Wholesale",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    #[test]
    fn output_length_always_matches_canonical_columns() {
        let cols = columns();
        let fv = encode(&input(), &cols);
        assert_eq!(fv.len(), cols.len());

        // Even an input with nothing in common with the canonical list.
        let mut other = input();
        other.selection.region = "Atlantis".to_string();
        other.selection.commodity = "Ambrosia".to_string();
        assert_eq!(encode(&other, &cols).len(), cols.len());
    }

    #[test]
    fn known_values_set_exactly_one_column_per_field() {
        let cols = columns();
        let fv = encode(&input(), &cols);
        let v = fv.as_slice();

        assert_eq!(v[cols.position("admin1_Arusha").unwrap()], 1.0);
        assert_eq!(v[cols.position("admin1_Dodoma").unwrap()], 0.0);
        assert_eq!(v[cols.position("commodity_Maize").unwrap()], 1.0);
        assert_eq!(v[cols.position("commodity_Rice").unwrap()], 0.0);
        assert_eq!(v[cols.position("pricetype_Retail").unwrap()], 1.0);
        assert_eq!(v[cols.position("pricetype_Wholesale").unwrap()], 0.0);
    }

    #[test]
    fn numeric_fields_copy_their_values() {
        let cols = columns();
        let fv = encode(&input(), &cols);
        let v = fv.as_slice();

        assert_eq!(v[cols.position("year").unwrap()], 2024.0);
        assert_eq!(v[cols.position("month").unwrap()], 1.0);
        assert_eq!(v[cols.position("day").unwrap()], 1.0);
        assert_eq!(v[cols.position("week").unwrap()], 1.0);
    }

    #[test]
    fn unseen_level_leaves_the_field_all_zero() {
        let cols = columns();
        let mut unseen = input();
        unseen.selection.commodity = "Sorghum".to_string();

        let fv = encode(&unseen, &cols);
        let v = fv.as_slice();
        assert_eq!(v[cols.position("commodity_Maize").unwrap()], 0.0);
        assert_eq!(v[cols.position("commodity_Rice").unwrap()], 0.0);
    }

    #[test]
    fn candidates_without_canonical_counterpart_are_dropped() {
        // The input's district/unit/etc. columns have no canonical entry here;
        // they must simply vanish rather than perturb the output.
        let cols = columns();
        let fv = encode(&input(), &cols);
        assert_eq!(fv.len(), cols.len());
        let ones = fv.as_slice().iter().filter(|&&x| x == 1.0).count();
        // admin1, commodity, pricetype hits plus the four numeric fields
        // (month/day/week happen to be 1.0 for this input).
        assert_eq!(ones, 6);
    }
}
