//! Prompts for floor-plan room extraction
//!
//! Language convention:
//! - English for model instructions (extract, output, measure)
//! - Russian for room names, since plans are labelled in Russian and the
//!   downstream keyword rules (кухня, коридор, холл, гостиная) match them

use smeta_types::Hints;

/// System instructions for a single floor-plan page
pub const ROOM_EXTRACTION_PROMPT: &str = r#"You are an expert quantity surveyor reading apartment floor plans.

Extract every room visible on this page.

Rules:
- Copy room names exactly as labelled on the plan (usually Russian: "Спальня", "Кухня", "Коридор", "Санузел").
- area_m2 is the floor area written on the plan. If only dimensions are given, multiply them.
- perimeter_m only when wall lengths are readable; omit otherwise, do not guess.
- is_wet_zone is true for bathrooms, WCs, shower rooms and laundry rooms.
- height_m only when a room-specific ceiling height is written.
- total_area_m2 is the total area stated on the plan, or the sum of room areas when none is stated.
- ceiling_height_m only when a general ceiling height is stated.
- bathrooms_count counts bathrooms and WCs.

Output ONLY a JSON object, no prose, in this shape:
{
  "total_area_m2": <number>,
  "ceiling_height_m": <number or omit>,
  "rooms": [
    {"name": "<label>", "area_m2": <number>, "perimeter_m": <number or omit>, "is_wet_zone": <bool>, "height_m": <number or omit>}
  ],
  "bathrooms_count": <integer>,
  "notes": "<short remark or omit>"
}"#;

/// User message for one page; embeds the declared project parameters.
pub fn build_user_instruction(hints: Option<&Hints>) -> String {
    let mut text = String::from("Analyze this floor plan page and extract the rooms.");

    if let Some(h) = hints {
        text.push_str("\n\nDeclared project parameters (use them to sanity-check your reading, never copy them blindly):\n");
        text.push_str(&format!("- Total floor area: {} m²\n", h.floor_area_m2));
        text.push_str(&format!("- Living rooms: {}\n", h.living_rooms_count));
        text.push_str(&format!(
            "- Kitchen-living room: {}\n",
            if h.has_kitchen_living { "yes" } else { "no" }
        ));
        text.push_str(&format!("- Bathrooms: {}\n", h.bathrooms_count));
        if let Some(height) = h.ceiling_height_m {
            text.push_str(&format!("- Ceiling height: {} m\n", height));
        }
    }

    text
}

/// System instructions followed by the user instruction, as one text prompt
pub fn build_page_prompt(hints: Option<&Hints>) -> String {
    format!("{}\n\n{}", ROOM_EXTRACTION_PROMPT, build_user_instruction(hints))
}
