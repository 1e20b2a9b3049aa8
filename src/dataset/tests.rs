use super::*;
use crate::BestiaryError;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "name,type1,type2,classfication,generation,hp,attack,defense,sp_attack,sp_defense,speed,abilities,height_m,weight_kg,percentage_male";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("should create temp file");
    writeln!(file, "{}", HEADER).expect("should write header");
    for row in rows {
        writeln!(file, "{}", row).expect("should write row");
    }
    file
}

#[test]
fn loads_complete_row() {
    let file = write_csv(&[
        "Bulbasaur,grass,poison,Seed Creature,1,45,49,49,65,65,45,\"['Overgrow', 'Chlorophyll']\",0.7,6.9,88.1",
    ]);

    let records = load_records(file.path()).expect("should load records");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.name, "Bulbasaur");
    assert_eq!(record.primary_type, "grass");
    assert_eq!(record.secondary_type.as_deref(), Some("poison"));
    assert_eq!(record.classification, "Seed Creature");
    assert_eq!(record.generation, 1);
    assert_eq!(record.hp, 45);
    assert_eq!(record.speed, 45);
    assert_eq!(record.height_m, 0.7);
    assert_eq!(record.percentage_male, Some(88.1));
}

#[test]
fn empty_optional_fields_become_none() {
    let file = write_csv(&[
        "Magnemite,electric,steel,Magnet Creature,1,25,35,70,95,55,45,\"['Magnet Pull']\",0.3,6.0,",
        "Pikachu,electric,,Mouse Creature,1,35,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0",
    ]);

    let records = load_records(file.path()).expect("should load records");
    assert_eq!(records[0].percentage_male, None);
    assert_eq!(records[0].secondary_type.as_deref(), Some("steel"));
    assert_eq!(records[1].secondary_type, None);
    assert_eq!(records[1].percentage_male, Some(50.0));
}

#[test]
fn missing_required_field_names_field_and_row() {
    let file = write_csv(&[
        "Pikachu,electric,,Mouse Creature,1,35,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0",
        ",electric,,Mouse Creature,1,35,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0",
    ]);

    let err = load_records(file.path()).expect_err("should fail on empty name");
    match err {
        BestiaryError::DataIntegrity { field, row, .. } => {
            assert_eq!(field, "name");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_stat_is_a_data_integrity_error() {
    let file = write_csv(&[
        "Pikachu,electric,,Mouse Creature,1,not-a-number,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0",
    ]);

    let err = load_records(file.path()).expect_err("should fail on bad hp");
    match err {
        BestiaryError::DataIntegrity { field, row, problem } => {
            assert_eq!(field, "hp");
            assert_eq!(row, 0);
            assert!(problem.contains("not-a-number"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn accepts_corrected_classification_header() {
    let mut file = NamedTempFile::new().expect("should create temp file");
    writeln!(
        file,
        "name,type1,type2,classification,generation,hp,attack,defense,sp_attack,sp_defense,speed,abilities,height_m,weight_kg,percentage_male"
    )
    .expect("should write header");
    writeln!(
        file,
        "Pikachu,electric,,Mouse Creature,1,35,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0"
    )
    .expect("should write row");

    let records = load_records(file.path()).expect("should load records");
    assert_eq!(records[0].classification, "Mouse Creature");
}

#[test]
fn missing_file_is_a_config_error() {
    let err = load_records("/definitely/not/here.csv").expect_err("should fail");
    assert!(matches!(err, BestiaryError::Config(_)));
}

#[test]
fn raw_rows_round_trip_through_parse() {
    let file = write_csv(&[
        "Pikachu,electric,,Mouse Creature,1,35,55,40,50,50,90,\"['Static']\",0.4,6.0,50.0",
    ]);

    let (headers, rows) = read_raw_rows(file.path()).expect("should read raw rows");
    assert_eq!(rows.len(), 1);

    let record = parse_record(&rows[0], &headers, 0).expect("should parse");
    assert_eq!(record.name, "Pikachu");
}
