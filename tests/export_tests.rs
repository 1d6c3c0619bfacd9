mod fixtures;

use fixtures::{assigned_candidate, result_with_assigned, square_zone};
use geojson::Value;
use serde_json::json;
use territory_planner::export;
use territory_planner::models::{OverallMetrics, RepMetrics};

fn austin_assigned() -> territory_planner::models::AssignedCandidate {
    let mut assigned = assigned_candidate("Acme", -97.7431, 30.2672, "r1");
    assigned.candidate.source.address = "123 Main St".to_string();
    assigned.candidate.source.city = "Austin".to_string();
    assigned.candidate.source.county = "Travis".to_string();
    assigned.candidate.source.state = "TX".to_string();
    assigned.candidate.source.zip = "78701".to_string();
    assigned.candidate.score = 6.0;
    assigned.distance_proxy_miles = 2.5;
    assigned
}

fn sample_metrics(rep_id: &str) -> RepMetrics {
    RepMetrics {
        rep_id: rep_id.to_string(),
        rep_name: format!("Rep {rep_id}"),
        weighted_score: 6.0,
        target_score: 6.0,
        percent_to_target: 0.0,
        business_count: 1,
        small_business_count: 1,
        medium_business_count: 0,
        large_business_count: 0,
        average_distance: 2.5,
        max_distance: 2.5,
        within_fairness_tolerance: true,
        contiguity_pass: true,
    }
}

#[test]
fn test_run_log_json_uses_explicit_latitude_longitude_fields() {
    let mut result = result_with_assigned(vec![austin_assigned()]);
    result.rep_metrics = vec![sample_metrics("r1")];
    result.overall = OverallMetrics {
        included_count: 1,
        ..OverallMetrics::default()
    };

    let mut buffer = Vec::new();
    export::write_run_log_json(&mut buffer, &result).unwrap();
    let log: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(log["run_id"], json!("20250825120000"));
    assert_eq!(log["assigned"][0]["source"]["name"], json!("Acme"));
    assert_eq!(log["assigned"][0]["point"]["latitude"], json!(30.2672));
    assert_eq!(log["assigned"][0]["point"]["longitude"], json!(-97.7431));
    assert_eq!(log["assigned"][0]["rep_id"], json!("r1"));
    assert_eq!(log["assigned"][0]["zone_name"], json!("VNN"));
    assert_eq!(log["rep_metrics"][0]["rep_id"], json!("r1"));
    assert_eq!(log["overall"]["included_count"], json!(1));
}

#[test]
fn test_assignment_csv_carries_one_row_per_business() {
    let result = result_with_assigned(vec![austin_assigned()]);

    let mut buffer = Vec::new();
    export::write_assignments_csv(&mut buffer, &result).unwrap();
    let csv = String::from_utf8(buffer).unwrap();

    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "rep_id,entity_id,address,city,county,state,zip,building_type,score,distance_proxy"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("r1,Acme,123 Main St,Austin,Travis,TX,78701,Small Business,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_summary_csv_carries_one_row_per_rep() {
    let mut result = result_with_assigned(vec![austin_assigned()]);
    result.rep_metrics = vec![sample_metrics("r1"), sample_metrics("r2")];

    let mut buffer = Vec::new();
    export::write_summary_csv(&mut buffer, &result).unwrap();
    let csv = String::from_utf8(buffer).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // header + two reps
    assert!(lines[0].starts_with("rep_id,rep_name,weighted_score"));
    assert!(lines[1].starts_with("r1,Rep r1,"));
    assert!(lines[2].starts_with("r2,Rep r2,"));
}

#[test]
fn test_feature_collection_tags_territories_with_rep_id_only() {
    let zones = vec![square_zone("VNN", -98.0, 30.0, -97.0, 31.0)];
    let result = result_with_assigned(vec![
        assigned_candidate("a", -97.7, 30.2, "r1"),
        assigned_candidate("b", -97.6, 30.2, "r1"),
        assigned_candidate("c", -97.7, 30.3, "r1"),
    ]);

    let collection = export::territory_feature_collection(&result, Some(&zones), false);

    assert_eq!(collection.features.len(), 1);
    let feature = &collection.features[0];
    let properties = feature.properties.as_ref().unwrap();
    assert_eq!(properties["rep_id"], json!("r1"));
    assert!(!properties.contains_key("feature_type"));
    assert!(matches!(
        feature.geometry.as_ref().unwrap().value,
        Value::MultiPolygon(_)
    ));
}

#[test]
fn test_assignment_point_features_carry_a_joined_location() {
    let result = result_with_assigned(vec![austin_assigned()]);

    let collection = export::territory_feature_collection(&result, None, true);

    // One territory polygon plus one assignment point.
    assert_eq!(collection.features.len(), 2);
    let point = collection
        .features
        .iter()
        .find(|f| {
            f.properties
                .as_ref()
                .is_some_and(|p| p.get("feature_type") == Some(&json!("assignment")))
        })
        .unwrap();

    let properties = point.properties.as_ref().unwrap();
    assert_eq!(properties["rep_id"], json!("r1"));
    assert_eq!(properties["latitude"], json!(30.2672));
    assert_eq!(properties["longitude"], json!(-97.7431));
    assert_eq!(properties["location"], json!("123 Main St, Austin, TX, 78701"));
    assert!(matches!(
        point.geometry.as_ref().unwrap().value,
        Value::Point(_)
    ));
}

#[test]
fn test_blank_address_parts_are_dropped_from_the_location() {
    let mut assigned = austin_assigned();
    assigned.candidate.source.address = String::new();
    assigned.candidate.source.zip = "  ".to_string();
    let result = result_with_assigned(vec![assigned]);

    let collection = export::territory_feature_collection(&result, None, true);
    let point = collection
        .features
        .iter()
        .find(|f| {
            f.properties
                .as_ref()
                .is_some_and(|p| p.get("feature_type") == Some(&json!("assignment")))
        })
        .unwrap();

    assert_eq!(
        point.properties.as_ref().unwrap()["location"],
        json!("Austin, TX")
    );
}
