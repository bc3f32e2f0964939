//! Provider catalog tests — roster loading, filtering, and sorting.
//!
//! The filtering contract: the result is always a subset of the input,
//! empty criteria match everything, and each sort key yields the
//! documented order.

mod common;

use carelink::models::provider::*;
use common::*;

fn sample(id: i64, spec: &str, rating: f64, address: &str, distance: &str, fee: i64) -> Provider {
    Provider {
        id,
        name: format!("Dr. Test {id}"),
        specialization: spec.to_string(),
        rating,
        review_count: 10,
        address: address.to_string(),
        distance: distance.to_string(),
        consultation_fee: fee,
        years_experience: 8,
    }
}

fn roster() -> Vec<Provider> {
    vec![
        sample(1, "Cardiologist", 4.8, "123 Medical Center Dr, Springfield", "2.5 km", 150),
        sample(2, "Dermatologist", 4.6, "456 Health Plaza, Shelbyville", "3.8 km", 120),
        sample(3, "Pediatrician", 4.9, "789 Care Ave, Springfield", "1.2 km", 100),
        sample(4, "Cardiologist", 4.2, "321 Wellness Blvd, Springfield", "nearby", 90),
    ]
}

#[test]
fn test_empty_filter_returns_full_input_in_order() {
    let input = roster();
    let result = filter_and_sort(input.clone(), &CatalogQuery::default());

    assert_eq!(result.len(), input.len());
    let ids: Vec<i64> = result.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_result_is_subset_of_input() {
    let input = roster();
    let input_ids: Vec<i64> = input.iter().map(|p| p.id).collect();

    for filter in ["card", "derm", "zzz", ""] {
        let query = CatalogQuery {
            specialization: filter.to_string(),
            ..Default::default()
        };
        let result = filter_and_sort(input.clone(), &query);
        assert!(result.iter().all(|p| input_ids.contains(&p.id)));
    }
}

#[test]
fn test_specialization_filter_is_case_insensitive_substring() {
    let query = CatalogQuery {
        specialization: "CARDIO".to_string(),
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|p| p.specialization == "Cardiologist"));
}

#[test]
fn test_location_filter_matches_address() {
    let query = CatalogQuery {
        location: "shelbyville".to_string(),
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, 2);
}

#[test]
fn test_no_match_yields_empty_not_error() {
    let query = CatalogQuery {
        specialization: "astrologist".to_string(),
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);
    assert!(result.is_empty());
}

#[test]
fn test_rating_sort_is_non_increasing() {
    let query = CatalogQuery {
        sort: SortKey::Rating,
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);

    for pair in result.windows(2) {
        assert!(pair[0].rating >= pair[1].rating);
    }
    assert_eq!(result[0].id, 3);
}

#[test]
fn test_distance_sort_is_ascending_with_unparsable_last() {
    let query = CatalogQuery {
        sort: SortKey::Distance,
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);

    let ids: Vec<i64> = result.iter().map(|p| p.id).collect();
    // "nearby" has no numeric prefix and sorts last
    assert_eq!(ids, vec![3, 1, 2, 4]);
}

#[test]
fn test_price_sort_is_ascending() {
    let query = CatalogQuery {
        sort: SortKey::Price,
        ..Default::default()
    };
    let result = filter_and_sort(roster(), &query);

    for pair in result.windows(2) {
        assert!(pair[0].consultation_fee <= pair[1].consultation_fee);
    }
}

#[test]
fn test_parse_distance_reads_numeric_prefix() {
    assert_eq!(parse_distance("2.5 km"), Some(2.5));
    assert_eq!(parse_distance("12 km"), Some(12.0));
    assert_eq!(parse_distance("nearby"), None);
    assert_eq!(parse_distance(""), None);
}

#[test]
fn test_sort_key_parses_closed_set() {
    assert_eq!(SortKey::parse("rating"), SortKey::Rating);
    assert_eq!(SortKey::parse("distance"), SortKey::Distance);
    assert_eq!(SortKey::parse("price"), SortKey::Price);
    assert_eq!(SortKey::parse("bogus"), SortKey::Default);
    assert_eq!(SortKey::parse(""), SortKey::Default);
}

#[test]
fn test_roster_loads_in_insertion_order() {
    let (_dir, conn) = setup_test_db();

    let a = seed_provider(&conn, "Dr. A", "Cardiologist", 4.1, "5.0 km", 100);
    let b = seed_provider(&conn, "Dr. B", "Dermatologist", 4.9, "1.0 km", 200);

    let roster = find_all(&conn).expect("Failed to load roster");
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].id, a);
    assert_eq!(roster[1].id, b);
}

#[test]
fn test_find_by_id_returns_none_for_unknown() {
    let (_dir, conn) = setup_test_db();

    let result = find_by_id(&conn, 9999).expect("Query failed");
    assert!(result.is_none());
}

#[test]
fn test_find_by_id_returns_full_record() {
    let (_dir, conn) = setup_test_db();

    let id = seed_provider(&conn, "Dr. Full", "Pediatrician", 4.7, "2.2 km", 110);
    let p = find_by_id(&conn, id)
        .expect("Query failed")
        .expect("Provider not found");

    assert_eq!(p.name, "Dr. Full");
    assert_eq!(p.specialization, "Pediatrician");
    assert_eq!(p.consultation_fee, 110);
    assert_eq!(p.distance, "2.2 km");
}
