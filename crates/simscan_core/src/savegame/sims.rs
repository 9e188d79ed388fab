//! Per-sim record extraction from zone data.
//!
//! Sim blobs are protobuf-shaped with a stable field layout. Extraction runs
//! in two passes: pass 1 registers every sim id so pass 2 can resolve
//! partner references to already-seen sims, then pass 2 decodes each record
//! in full. A blob that fails any individual decode step loses that field,
//! not the whole record; a blob without an id or names is not a sim record
//! at all and is skipped.

use std::collections::{HashMap, HashSet};

use super::tables;
use super::types::{AgeBracket, Gender, NeedEntry, SimRecord, SkillEntry, SkinTone};
use crate::wire::{FieldMap, FieldValue};

// Sim record fields.
const F_SIM_ID: u32 = 1;
const F_FIRST_NAME: u32 = 5;
const F_LAST_NAME: u32 = 6;
const F_GENDER: u32 = 7;
const F_AGE: u32 = 8;
const F_SKIN_TONES: u32 = 12;
const F_PARTNER_ID: u32 = 15;
const F_TRAITS: u32 = 18;
const F_ATTRIBUTES: u32 = 30;
const F_AGE_MINUTES: u32 = 34;
const F_IS_PLAYED: u32 = 42;
const F_MOOD: u32 = 53;
const F_OCCULT: u32 = 63;

// Attribute container sub-fields.
const F_COMMODITY_TRACKER: u32 = 2;
const F_RANKED_STATS: u32 = 13;
const F_STAT_ENTRY: u32 = 1;
const F_STAT_ID: u32 = 1;
const F_STAT_VALUE: u32 = 2;

/// Anything shorter cannot hold an id plus two non-empty names.
const MIN_SIM_BLOB_LEN: usize = 10;

const MINUTES_PER_DAY: u64 = 1440;

/// Cross-referencing state assembled by the zone-level passes before sims
/// are extracted.
pub(crate) struct ExtractionContext<'a> {
    pub relationship_counts: &'a HashMap<u64, u32>,
    pub sim_households: &'a HashMap<u64, String>,
    pub household_worlds: &'a HashMap<String, String>,
    pub played_households: &'a HashSet<String>,
}

pub(crate) fn extract_sims(sim_blobs: &[&[u8]], ctx: &ExtractionContext<'_>) -> Vec<SimRecord> {
    // Pass 1: parse and register ids so partner lookups can resolve in
    // either direction.
    let mut parsed: Vec<(FieldMap, String, String)> = Vec::new();
    let mut names_by_id: HashMap<u64, String> = HashMap::new();

    for blob in sim_blobs {
        if blob.len() < MIN_SIM_BLOB_LEN {
            continue;
        }
        let map = FieldMap::parse(blob, 1);
        let first = map.get_string(F_FIRST_NAME).unwrap_or_default();
        let last = map.get_string(F_LAST_NAME).unwrap_or_default();
        if first.is_empty() || last.is_empty() {
            continue;
        }
        if let Some(id) = map.get_fixed64(F_SIM_ID) {
            names_by_id
                .entry(id)
                .or_insert_with(|| format!("{} {}", first, last));
        }
        parsed.push((map, first, last));
    }

    // Pass 2: full record per sim.
    let mut sims = Vec::with_capacity(parsed.len());
    for (index, (map, first, last)) in parsed.into_iter().enumerate() {
        let sim_id = map.get_fixed64(F_SIM_ID).unwrap_or(0);

        let partner_name = map
            .get_fixed64(F_PARTNER_ID)
            .and_then(|id| names_by_id.get(&id))
            .cloned()
            .unwrap_or_default();

        let household = ctx
            .sim_households
            .get(&sim_id)
            .cloned()
            .unwrap_or_default();
        let world = ctx
            .household_worlds
            .get(&household)
            .cloned()
            .unwrap_or_default();

        let attributes = map
            .get_bytes(F_ATTRIBUTES)
            .map(|raw| FieldMap::parse(raw, 1));
        let (skills, needs) = match &attributes {
            Some(attrs) => (extract_skills(attrs), extract_needs(attrs)),
            None => (Vec::new(), Vec::new()),
        };

        let is_played = map.get_varint(F_IS_PLAYED) == Some(1)
            || ctx.played_households.contains(&household);

        sims.push(SimRecord {
            sim_id,
            first_name: first,
            last_name: last,
            gender: Gender::from_raw(map.get_varint(F_GENDER).unwrap_or(0)),
            age: AgeBracket::from_raw(map.get_varint(F_AGE).unwrap_or(0)),
            occult: !map.values(F_OCCULT).is_empty(),
            partner_name,
            household,
            world,
            family_role: None,
            family_members: Vec::new(),
            relationship_count: ctx.relationship_counts.get(&sim_id).copied().unwrap_or(0),
            relationship_label: String::new(),
            skin_tone: extract_skin_tone(&map),
            trait_count: count_traits(&map),
            skills,
            needs,
            mood: map.get_float(F_MOOD).map(tables::mood_summary),
            age_days: map.get_varint(F_AGE_MINUTES).unwrap_or(0) / MINUTES_PER_DAY,
            is_played,
            index,
        });
    }

    sims
}

/// Skin tone is stored as a comma-separated list of float weights; the
/// strongest weight picks the display bucket.
fn extract_skin_tone(map: &FieldMap) -> SkinTone {
    let max_weight = map
        .get_string(F_SKIN_TONES)
        .map(|text| {
            text.split(',')
                .filter_map(|part| part.trim().parse::<f32>().ok())
                .fold(0.0f32, f32::max)
        })
        .unwrap_or(0.0);
    SkinTone::from_max_weight(max_weight)
}

/// Approximate trait cardinality: one level of sub-parse, counting varint
/// leaves across every sub-field. Not a validated trait-id list.
fn count_traits(map: &FieldMap) -> usize {
    let Some(raw) = map.get_bytes(F_TRAITS) else {
        return 0;
    };
    let traits = FieldMap::parse(raw, 1);
    traits
        .iter()
        .flat_map(|(_, values)| values.iter())
        .filter(|value| matches!(value, FieldValue::Varint(_)))
        .count()
}

fn extract_skills(attrs: &FieldMap) -> Vec<SkillEntry> {
    let Some(ranked_raw) = attrs.get_bytes(F_RANKED_STATS) else {
        return Vec::new();
    };
    let ranked = FieldMap::parse(ranked_raw, 1);

    let mut skills: Vec<SkillEntry> = Vec::new();
    for entry_raw in ranked.bytes_values(F_STAT_ENTRY) {
        let entry = FieldMap::parse(entry_raw, 1);
        let Some(id) = entry.get_varint(F_STAT_ID) else {
            continue;
        };
        // XP is the raw bit pattern of an IEEE-754 float, not an integer.
        let xp = entry.get_float(F_STAT_VALUE).unwrap_or(0.0);
        let curve = tables::xp_curve(id);
        let (name, is_mod_skill) = match tables::skill_name(id) {
            Some(known) => (known.to_string(), false),
            // Third-party and DLC skill ids still count and level.
            None => (format!("Mod-Skill #{}", id % 10_000), true),
        };
        let candidate = SkillEntry {
            name,
            level: tables::level_for_xp(curve, xp),
            max_level: curve.len() as u32,
            xp,
            is_mod_skill,
        };

        // Duplicate names keep only the highest-XP instance.
        match skills.iter_mut().find(|s| s.name == candidate.name) {
            Some(existing) => {
                if candidate.xp > existing.xp {
                    *existing = candidate;
                }
            }
            None => skills.push(candidate),
        }
    }

    skills.sort_by(|a, b| {
        a.is_mod_skill
            .cmp(&b.is_mod_skill)
            .then(b.xp.total_cmp(&a.xp))
    });
    skills
}

fn extract_needs(attrs: &FieldMap) -> Vec<NeedEntry> {
    let Some(tracker_raw) = attrs.get_bytes(F_COMMODITY_TRACKER) else {
        return Vec::new();
    };
    let tracker = FieldMap::parse(tracker_raw, 1);

    let mut needs = Vec::new();
    for entry_raw in tracker.bytes_values(F_STAT_ENTRY) {
        let entry = FieldMap::parse(entry_raw, 1);
        let Some(id) = entry.get_varint(F_STAT_ID) else {
            continue;
        };
        let Some(need) = tables::need_for(id) else {
            continue;
        };
        let value = entry.get_float(F_STAT_VALUE).unwrap_or(0.0);
        needs.push(NeedEntry {
            name: need.name.to_string(),
            value,
            emoji: need.emoji.to_string(),
            percent: tables::need_percent(value),
        });
    }

    needs.sort_by(|a, b| b.value.total_cmp(&a.value));
    needs
}
