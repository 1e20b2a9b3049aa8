use super::*;
use crate::dataset::CreatureRecord;

fn sample_record() -> CreatureRecord {
    CreatureRecord {
        name: "Bulbasaur".to_string(),
        primary_type: "grass".to_string(),
        secondary_type: Some("poison".to_string()),
        classification: "Seed Creature".to_string(),
        generation: 1,
        hp: 45,
        attack: 49,
        defense: 49,
        sp_attack: 65,
        sp_defense: 65,
        speed: 45,
        abilities: "['Overgrow', 'Chlorophyll']".to_string(),
        height_m: 0.7,
        weight_kg: 6.9,
        percentage_male: Some(88.1),
    }
}

#[test]
fn renders_full_record() {
    let doc = render_document(&sample_record());

    assert!(doc.starts_with("The creature Bulbasaur is a grass and poison type."));
    assert!(doc.contains("It is a Seed Creature and was introduced in Generation 1."));
    assert!(doc.contains(
        "HP of 45, Attack of 49, Defense of 49, Special Attack of 65, Special Defense of 65, and Speed of 45."
    ));
    assert!(doc.contains("Its abilities include: ['Overgrow', 'Chlorophyll']."));
    assert!(doc.contains("Its height is 0.7 meters and its weight is 6.9 kilograms."));
    assert!(doc.ends_with("This creature has a male gender percentage of 88.1."));
}

#[test]
fn omits_conjunction_without_secondary_type() {
    let record = CreatureRecord {
        secondary_type: None,
        ..sample_record()
    };
    let doc = render_document(&record);

    assert!(doc.contains("is a grass type."));
    assert!(!doc.contains(" and  type."));
    assert!(!doc.contains("grass and"));
}

#[test]
fn conjunction_present_iff_secondary_type_present() {
    let with = render_document(&sample_record());
    let without = render_document(&CreatureRecord {
        secondary_type: None,
        ..sample_record()
    });

    assert!(with.contains("grass and poison type."));
    assert!(without.contains("grass type."));
}

#[test]
fn missing_percentage_renders_sentinel() {
    let record = CreatureRecord {
        percentage_male: None,
        ..sample_record()
    };
    let doc = render_document(&record);

    assert!(doc.ends_with("This creature is genderless."));
    assert!(!doc.contains("NaN"));
    assert!(!doc.contains("null"));
}

#[test]
fn rendering_is_deterministic() {
    let record = sample_record();
    assert_eq!(render_document(&record), render_document(&record));
}

#[test]
fn whole_number_measurements_render_plainly() {
    let record = CreatureRecord {
        height_m: 2.0,
        weight_kg: 210.0,
        ..sample_record()
    };
    let doc = render_document(&record);

    assert!(doc.contains("Its height is 2 meters and its weight is 210 kilograms."));
}
