// Document builder
// Renders one dataset row into the natural-language document that gets
// embedded and retrieved. Pure and deterministic by contract.

#[cfg(test)]
mod tests;

use crate::dataset::CreatureRecord;

/// Sentinel rendered when a creature has no male/female split.
pub const GENDERLESS_SENTINEL: &str = "genderless";

/// Render a record into its document string.
///
/// The " and <type>" conjunction is omitted entirely when there is no
/// secondary type, and a missing male percentage renders as
/// [`GENDERLESS_SENTINEL`], so no null-ish token can reach the index.
#[inline]
pub fn render_document(record: &CreatureRecord) -> String {
    let type_clause = match &record.secondary_type {
        Some(secondary) => format!("{} and {}", record.primary_type, secondary),
        None => record.primary_type.clone(),
    };

    let gender_clause = match record.percentage_male {
        Some(percentage) => format!(
            "This creature has a male gender percentage of {}.",
            percentage
        ),
        None => format!("This creature is {}.", GENDERLESS_SENTINEL),
    };

    format!(
        "The creature {name} is a {type_clause} type. \
         It is a {classification} and was introduced in Generation {generation}. \
         It has the following base stats: HP of {hp}, Attack of {attack}, Defense of {defense}, \
         Special Attack of {sp_attack}, Special Defense of {sp_defense}, and Speed of {speed}. \
         Its abilities include: {abilities}. \
         Its height is {height} meters and its weight is {weight} kilograms. \
         {gender_clause}",
        name = record.name,
        classification = record.classification,
        generation = record.generation,
        hp = record.hp,
        attack = record.attack,
        defense = record.defense,
        sp_attack = record.sp_attack,
        sp_defense = record.sp_defense,
        speed = record.speed,
        abilities = record.abilities,
        height = record.height_m,
        weight = record.weight_kg,
    )
}
