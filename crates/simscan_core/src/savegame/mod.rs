//! Save-game analysis.
//!
//! A save is a DBPF archive whose Zone resource (type 0x0D) holds the whole
//! simulation state as one protobuf-shaped blob. Analysis reads the zone,
//! builds the world/household cross-reference maps, extracts every sim
//! record, and runs the family-role post-pass. Malformed sub-blobs cost only
//! their own unit; the coarse failures a caller can act on (missing file, no
//! archive, no zone) surface as [`CoreError`] values meant for display.

mod roles;
mod sims;
mod tables;
mod types;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::cache::AnalysisCache;
use crate::dbpf;
use crate::error::{CoreError, CoreErrorCode};
use crate::wire::{FieldMap, FieldValue};

use sims::ExtractionContext;

pub use types::{
    AgeBracket, AnalysisStats, FamilyMember, FamilyRole, Gender, MoodSummary, NeedEntry,
    SaveAnalysis, SimRecord, SkillEntry, SkinTone,
};

/// DBPF resource type of the Zone record.
pub const ZONE_RESOURCE_TYPE: u32 = 0x0D;

// Top-level zone fields.
const F_RELATIONSHIP_SERVICE: u32 = 2;
const F_NEIGHBORHOODS: u32 = 4;
const F_HOUSEHOLDS: u32 = 5;
const F_SIMS: u32 = 6;

// Neighborhood blob.
const F_NH_NAME: u32 = 3;
const F_NH_REGION: u32 = 4;
const F_NH_LOTS: u32 = 5;
const F_LOT_ZONE_ID: u32 = 2;

// Household blob.
const F_HH_MEMBERS: u32 = 2;
const F_HH_NAME: u32 = 3;
const F_HH_HOME_ZONE: u32 = 4;
const F_HH_PREMADE: u32 = 14;
const F_HH_PLAYED: u32 = 31;

// Relationship descent: service -> graph -> table -> repeated pairs.
const F_REL_GRAPH: u32 = 8;
const F_REL_TABLE: u32 = 13;
const F_REL_PAIR: u32 = 1;
const F_REL_SIM_A: u32 = 1;
const F_REL_SIM_B: u32 = 2;

/// Analyze a save file from scratch.
pub fn analyze(path: &Path) -> Result<SaveAnalysis, CoreError> {
    if !path.is_file() {
        return Err(CoreError::new(
            CoreErrorCode::Io,
            format!("save file not found: {}", path.display()),
        ));
    }

    let entries = dbpf::read_entries(path);
    if entries.is_empty() {
        return Err(CoreError::new(
            CoreErrorCode::NoArchive,
            "no DBPF data in save file",
        ));
    }

    let Some(zone_entry) = entries
        .iter()
        .find(|e| e.resource_type == ZONE_RESOURCE_TYPE)
    else {
        return Err(CoreError::new(
            CoreErrorCode::NoZoneData,
            "save file has no zone resource",
        ));
    };

    let zone_data = dbpf::read_entry_data(path, zone_entry);
    if zone_data.is_empty() {
        return Err(CoreError::new(CoreErrorCode::NoZoneData, "zone data empty"));
    }

    let zone = FieldMap::parse(&zone_data, 1);

    let zone_worlds = map_zone_worlds(&zone);
    let (household_worlds, sim_households, played_households) =
        map_households(&zone, &zone_worlds);
    let relationship_counts = count_relationships(&zone);

    let sim_blobs: Vec<&[u8]> = zone.bytes_values(F_SIMS).collect();
    let ctx = ExtractionContext {
        relationship_counts: &relationship_counts,
        sim_households: &sim_households,
        household_worlds: &household_worlds,
        played_households: &played_households,
    };
    let mut sims = sims::extract_sims(&sim_blobs, &ctx);
    roles::assign_family_roles(&mut sims);

    let worlds = scan_worlds(&zone);

    let mut households: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for sim in &sims {
        if !sim.household.is_empty() {
            households
                .entry(sim.household.clone())
                .or_default()
                .push(sim.full_name());
        }
    }

    let mut played: Vec<String> = played_households.into_iter().collect();
    played.sort();

    let stats = AnalysisStats {
        sim_count: sims.len(),
        household_count: households.len(),
        played_household_count: played.len(),
        world_count: worlds.len(),
    };

    Ok(SaveAnalysis {
        sims,
        households,
        played_households: played,
        worlds,
        stats,
    })
}

/// Analyze with a disk-backed cache: an up-to-date entry for the file's
/// current mtime, size and schema skips the archive entirely.
pub fn analyze_with_cache(
    path: &Path,
    cache: &mut AnalysisCache,
) -> Result<SaveAnalysis, CoreError> {
    if let Some(hit) = cache.get(path) {
        return Ok(hit.clone());
    }

    let analysis = analyze(path)?;
    cache.put(path, analysis.clone());
    // A cache that cannot be written never fails the analysis.
    let _ = cache.persist();
    Ok(analysis)
}

/// Map every lot's zone id to a world name, via the neighborhood records.
/// A neighborhood with no readable display name falls back to the static
/// region-id table.
fn map_zone_worlds(zone: &FieldMap) -> HashMap<u64, String> {
    let mut zone_worlds = HashMap::new();
    for nh_raw in zone.bytes_values(F_NEIGHBORHOODS) {
        let nh = FieldMap::parse(nh_raw, 1);

        // Display names survive bad bytes via replacement decoding; one
        // mangled name must not sink the rest of the extraction.
        let mut world = nh
            .get_bytes(F_NH_NAME)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default();
        if world.is_empty() {
            world = nh
                .get_varint(F_NH_REGION)
                .and_then(tables::region_world)
                .map(str::to_string)
                .unwrap_or_default();
        }
        if world.is_empty() {
            continue;
        }

        for lot_raw in nh.bytes_values(F_NH_LOTS) {
            let lot = FieldMap::parse(lot_raw, 1);
            if let Some(zone_id) = lot.get_fixed64(F_LOT_ZONE_ID) {
                zone_worlds.insert(zone_id, world.clone());
            }
        }
    }
    zone_worlds
}

type HouseholdMaps = (
    HashMap<String, String>,
    HashMap<u64, String>,
    HashSet<String>,
);

fn map_households(zone: &FieldMap, zone_worlds: &HashMap<u64, String>) -> HouseholdMaps {
    let mut household_worlds = HashMap::new();
    let mut sim_households = HashMap::new();
    let mut played = HashSet::new();

    for hh_raw in zone.bytes_values(F_HOUSEHOLDS) {
        let hh = FieldMap::parse(hh_raw, 1);
        let Some(name) = hh.get_string(F_HH_NAME).filter(|n| !n.is_empty()) else {
            continue;
        };

        if let Some(home_zone) = hh.get_fixed64(F_HH_HOME_ZONE)
            && let Some(world) = zone_worlds.get(&home_zone)
        {
            household_worlds.insert(name.clone(), world.clone());
        }

        for value in hh.values(F_HH_MEMBERS) {
            if let FieldValue::Fixed64(sim_id) = value {
                sim_households.entry(*sim_id).or_insert_with(|| name.clone());
            }
        }

        // The played flag alone is not enough: premade gallery households
        // can carry a stale one, so field 14 must also be zero.
        let played_flag = hh.get_varint(F_HH_PLAYED).unwrap_or(0) > 0;
        let premade_marker = hh.get_varint(F_HH_PREMADE).unwrap_or(0);
        if played_flag && premade_marker == 0 {
            played.insert(name);
        }
    }

    (household_worlds, sim_households, played)
}

/// Count relationship pairs per sim id. The service/graph/table levels are
/// single-valued for this purpose; only the first blob at each is followed.
fn count_relationships(zone: &FieldMap) -> HashMap<u64, u32> {
    let mut counts = HashMap::new();

    let Some(service_raw) = zone.get_bytes(F_RELATIONSHIP_SERVICE) else {
        return counts;
    };
    let service = FieldMap::parse(service_raw, 1);
    let Some(graph_raw) = service.get_bytes(F_REL_GRAPH) else {
        return counts;
    };
    let graph = FieldMap::parse(graph_raw, 1);
    let Some(table_raw) = graph.get_bytes(F_REL_TABLE) else {
        return counts;
    };
    let table = FieldMap::parse(table_raw, 1);

    for pair_raw in table.bytes_values(F_REL_PAIR) {
        let pair = FieldMap::parse(pair_raw, 1);
        if let (Some(a), Some(b)) = (
            pair.get_varint(F_REL_SIM_A),
            pair.get_varint(F_REL_SIM_B),
        ) {
            *counts.entry(a).or_insert(0) += 1;
            *counts.entry(b).or_insert(0) += 1;
        }
    }

    counts
}

/// Coarse world list: an ASCII keyword search over the raw neighborhood
/// blobs, first keyword wins per blob, de-duplicated across blobs. Kept
/// separate from the per-sim world attribution, which uses the lot mapping.
fn scan_worlds(zone: &FieldMap) -> Vec<String> {
    let mut worlds = Vec::new();
    for nh_raw in zone.bytes_values(F_NEIGHBORHOODS) {
        for (keyword, world) in tables::WORLD_KEYWORDS {
            if contains_bytes(nh_raw, keyword.as_bytes()) {
                if !worlds.iter().any(|w| w == world) {
                    worlds.push((*world).to_string());
                }
                break;
            }
        }
    }
    worlds
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
