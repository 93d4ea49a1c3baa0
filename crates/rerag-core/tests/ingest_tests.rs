use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

use rerag_core::ingest::{load_records, RecordChunker};
use rerag_core::types::{validate, ChunkCategory};

const RECORD: &str = r#"{
  "project_detail": {
    "project_name": "GOLDEN HEIGHTS",
    "registration_number": "P51700012345",
    "date_of_registration": "2022-03-15",
    "project_type": "Residential",
    "project_location": "Panvel",
    "proposed_completion_date_original": "2026-12-31",
    "is_this_project_being_developed_in_multiple_phases": "No",
    "landowner_types_in_the_project": "Individual",
    "are_there_any_investor_other_than_the_promoter_in_the_project": "No"
  },
  "project_area_detail": {
    "state_ut": "Maharashtra",
    "district": "Raigarh",
    "taluka": "Panvel",
    "village": "Adai",
    "pin_code": 410206,
    "latitude": "18.9894",
    "longitude": "73.1175"
  },
  "project_land_area_detail": {
    "land_area_for_project_applied_for_this_registration_sq_mts": "4047.0",
    "final_plot_bearing_no_cts_number_survey_number": "Survey 12/3"
  },
  "promoter_details": {
    "name_of_partnership": "Guru Sai Developer",
    "promoter_type": "Partnership"
  },
  "building_details": [
    { "identification_of_building_wing_as_per_sanctioned_plan": "Tower A",
      "sanctioned_apartments_unit_nrr": 120,
      "total_no_of_building_sanctioned_habitable_floor": 22 },
    { "identification_of_building_wing_as_per_sanctioned_plan": "Tower B",
      "sanctioned_apartments_unit_nrr": 80 }
  ],
  "apartments_summary": [
    { "identification_of_building_wing_as_per_sanctioned_plan": "Tower A",
      "total_apartments_unit_nrr": "120",
      "total_no_of_residential_apartments_units": 110,
      "total_no_of_nonresidential_apartments_units": 10,
      "total_no_of_sold_units": 90,
      "total_no_of_unsold_units": 30 }
  ]
}"#;

fn one_line(json: &str) -> String {
    json.replace('\n', " ")
}

#[test]
fn load_records_reads_jsonl_file() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("projects.jsonl");
    fs::write(&path, format!("{}\n\nnot valid json\n", one_line(RECORD))).expect("write");

    let records = load_records(&path).expect("load");
    assert_eq!(records.len(), 1, "bad line is skipped, blank line ignored");
    assert_eq!(
        records[0].project_detail.registration_number.text().as_deref(),
        Some("P51700012345")
    );
}

#[test]
fn load_records_scans_directories() {
    let tmp = TempDir::new().expect("tempdir");
    fs::write(tmp.path().join("b.jsonl"), format!("{}\n", one_line(RECORD))).expect("write");
    fs::write(tmp.path().join("a.jsonl"), format!("{}\n", one_line(RECORD))).expect("write");
    fs::write(tmp.path().join("ignore.txt"), "not jsonl").expect("write");

    let records = load_records(tmp.path()).expect("load");
    assert_eq!(records.len(), 2);
}

#[test]
fn chunker_fans_one_record_into_categories() {
    let record = serde_json::from_str(&one_line(RECORD)).expect("parse");
    let chunks = RecordChunker::new().chunk_record(&record, "P51700012345");

    validate(&chunks).expect("chunk set is valid");

    let categories: HashSet<ChunkCategory> = chunks.iter().map(|c| c.category).collect();
    for expected in [
        ChunkCategory::Registration,
        ChunkCategory::Status,
        ChunkCategory::Timeline,
        ChunkCategory::Location,
        ChunkCategory::Geolocation,
        ChunkCategory::LandArea,
        ChunkCategory::Plot,
        ChunkCategory::Promoter,
        ChunkCategory::Legal,
        ChunkCategory::Building,
        ChunkCategory::Apartment,
        ChunkCategory::Summary,
        ChunkCategory::QuickFact,
        ChunkCategory::Statistic,
    ] {
        assert!(categories.contains(&expected), "missing {expected} chunk");
    }

    let buildings: Vec<_> =
        chunks.iter().filter(|c| c.category == ChunkCategory::Building).collect();
    assert_eq!(buildings.len(), 2, "one chunk per sanctioned building");
    assert_eq!(buildings[0].id, "P51700012345:building:0");
    assert_eq!(buildings[1].id, "P51700012345:building:1");
}

#[test]
fn chunker_is_deterministic_across_runs() {
    let record: rerag_core::ingest::ProjectRecord =
        serde_json::from_str(&one_line(RECORD)).expect("parse");
    let chunker = RecordChunker::new();
    let first = chunker.chunk_record(&record, "P51700012345");
    let second = chunker.chunk_record(&record, "P51700012345");
    let ids_a: Vec<_> = first.iter().map(|c| c.id.clone()).collect();
    let ids_b: Vec<_> = second.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids_a, ids_b);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.text, b.text);
    }
}

#[test]
fn statistic_chunk_rolls_up_unit_totals() {
    let record: rerag_core::ingest::ProjectRecord =
        serde_json::from_str(&one_line(RECORD)).expect("parse");
    let chunks = RecordChunker::new().chunk_record(&record, "P51700012345");
    let stats = chunks
        .iter()
        .find(|c| c.category == ChunkCategory::Statistic)
        .expect("statistics chunk");
    assert!(stats.text.contains("Total Units: 120"));
    assert!(stats.text.contains("Residential Units: 110"));
    assert!(stats.text.contains("Commercial Units: 10"));
}
