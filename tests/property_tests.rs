/// Property-based tests using proptest
/// Tests invariants of the lookup pipeline that should hold for all inputs
use bigdecimal::BigDecimal;
use proptest::prelude::*;
use rust_cupos_api::aggregate::aggregate;
use rust_cupos_api::lookup::{filter_by_locality, locality_options, lookup, LocalitySelection};
use rust_cupos_api::models::Record;
use rust_cupos_api::normalize::normalize_phone;
use rust_cupos_api::planner::breakdown;

fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec!["100589", "200100", " 100589", "300"]),
        prop::sample::select(vec!["Bogota", "Cali", "Medellin"]),
        0u32..1_000_000,
        0u32..1_000_000,
        0u32..1_000_000,
    )
        .prop_map(|(identifier, locality, assigned, used, available)| Record {
            identifier: identifier.to_string(),
            locality: locality.to_string(),
            assigned_quota: BigDecimal::from(assigned),
            used_quota: BigDecimal::from(used),
            available_quota: BigDecimal::from(available),
            ..Record::default()
        })
}

// Property: lookup returns exactly the records with the trimmed identifier
proptest! {
    #[test]
    fn lookup_is_exact(
        records in prop::collection::vec(arb_record(), 0..40),
        query in prop::sample::select(vec!["100589", "200100", "300", "999"])
    ) {
        let found = lookup(&records, query);
        let expected = records.iter().filter(|r| r.identifier.trim() == query).count();

        prop_assert_eq!(found.len(), expected);
        prop_assert!(found.iter().all(|r| r.identifier.trim() == query));
    }

    #[test]
    fn unknown_identifiers_are_not_found(records in prop::collection::vec(arb_record(), 0..40)) {
        prop_assert!(lookup(&records, "does-not-exist").is_empty());
    }
}

// Property: selecting every available locality changes nothing
proptest! {
    #[test]
    fn full_locality_selection_is_idempotent(records in prop::collection::vec(arb_record(), 0..40)) {
        let subset = lookup(&records, "100589");
        let all = LocalitySelection::Only(locality_options(&subset));

        let filtered = filter_by_locality(&subset, &all);
        prop_assert_eq!(&filtered, &subset);
        prop_assert_eq!(filter_by_locality(&filtered, &all), subset);
    }
}

// Property: aggregating a partition equals aggregating the whole
proptest! {
    #[test]
    fn sums_are_additive(
        records in prop::collection::vec(arb_record(), 0..40),
        split in 0usize..40
    ) {
        let subset: Vec<&Record> = records.iter().collect();
        let split = split.min(subset.len());
        let (left, right) = subset.split_at(split);

        let whole = aggregate(&subset);
        let merged = aggregate(left).merge(aggregate(right));
        prop_assert_eq!(whole, merged);
    }
}

// Property: breakdown counts and percentages cover the subset
proptest! {
    #[test]
    fn breakdown_covers_subset(
        values in prop::collection::vec(prop::sample::select(vec!["Bogota", "Cali", "Medellin"]), 1..60)
    ) {
        let entries = breakdown(&values);
        let total: usize = entries.iter().map(|e| e.count).sum();
        let share: f64 = entries.iter().map(|e| e.percentage).sum();

        prop_assert_eq!(total, values.len());
        prop_assert!((share - 100.0).abs() <= 0.1 * entries.len() as f64);
        prop_assert!(entries.windows(2).all(|w| w[0].count >= w[1].count));
    }
}

// Property: phone normalization never panics and yields digits only
proptest! {
    #[test]
    fn phone_normalization_never_panics(phone in "\\PC*") {
        let normalized = normalize_phone(Some(phone.as_str()));
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn formatted_phones_keep_their_digits(
        area in 300u32..=350u32,
        rest in 1_000_000u32..=9_999_999u32,
        sep in prop::sample::select(vec!["", "-", " ", "."])
    ) {
        let digits = format!("{}{}", area, rest);
        let formatted = format!("{}{}{}", area, sep, rest);
        prop_assert_eq!(normalize_phone(Some(formatted.as_str())), digits.clone());
        let float_like = format!("{}.0", digits);
        prop_assert_eq!(normalize_phone(Some(float_like.as_str())), digits);
    }
}
