//! Tray-folder portrait indexing.
//!
//! The tray folder holds saved households next to the portrait images of
//! their members. Portraits are SGI files whose names embed the member's
//! instance id after a `!`; household files carry the member names and ids.
//! Indexing joins the two so callers can look a portrait up by sim name,
//! with a co-membership pass to recover sims that were renamed in a save
//! after being placed in the tray.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::wire::FieldMap;

const HOUSEHOLD_HEADER_LEN: usize = 16;

// Household-binary fields.
const F_HH_SIMS: u32 = 2;
const F_SIM_INSTANCE: u32 = 1;
const F_SIM_FIRST: u32 = 3;
const F_SIM_LAST: u32 = 4;

/// One member of a tray household, with its portrait if the matching SGI
/// file exists in the folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayMember {
    pub name: String,
    pub portrait: Option<PathBuf>,
}

/// Index of a tray folder: sim name to portrait path, plus the household
/// groupings the names came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrayIndex {
    /// First full-name match wins; a contested name belongs to the first
    /// household file processed.
    pub portraits: BTreeMap<String, PathBuf>,
    pub households: Vec<Vec<TrayMember>>,
}

impl TrayIndex {
    /// Scan `tray_dir` once, non-recursively. An unreadable directory yields
    /// an empty index.
    pub fn build(tray_dir: &Path) -> TrayIndex {
        let mut paths: Vec<PathBuf> = fs::read_dir(tray_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .collect()
            })
            .unwrap_or_default();
        // Directory order is filesystem-dependent; sorting keeps the
        // first-household-wins rule stable across scans.
        paths.sort();

        // Pass 1: portrait files, keyed by the embedded instance id.
        let mut by_instance: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in &paths {
            if !has_extension(path, "sgi") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some((_, instance)) = stem.split_once('!') {
                by_instance.insert(instance.to_ascii_lowercase(), path.clone());
            }
        }

        // Pass 2: household files resolve names against those instances.
        let mut index = TrayIndex::default();
        for path in &paths {
            if !has_extension(path, "householdbinary") {
                continue;
            }
            let members = read_household_members(path, &by_instance);
            if members.is_empty() {
                continue;
            }
            for member in &members {
                if let Some(portrait) = &member.portrait {
                    index
                        .portraits
                        .entry(member.name.clone())
                        .or_insert_with(|| portrait.clone());
                }
            }
            index.households.push(members);
        }

        index
    }

    /// Recover portraits for sims renamed after being saved to the tray.
    ///
    /// For each save household with unmatched members, the tray household
    /// with the largest name overlap against the already-matched members is
    /// taken as the same family. Its leftover members are paired up only
    /// when the counts line up exactly, or when a single tray member is
    /// left; anything more ambiguous stays unresolved.
    pub fn match_renamed_sims(
        &self,
        save_households: &BTreeMap<String, Vec<String>>,
    ) -> BTreeMap<String, PathBuf> {
        let mut extra = BTreeMap::new();

        for members in save_households.values() {
            let matched: Vec<&String> = members
                .iter()
                .filter(|name| self.portraits.contains_key(*name))
                .collect();
            let unmatched: Vec<&String> = members
                .iter()
                .filter(|name| !self.portraits.contains_key(*name))
                .collect();
            if unmatched.is_empty() || matched.is_empty() {
                continue;
            }

            let matched_set: HashSet<&str> =
                matched.iter().map(|name| name.as_str()).collect();
            let Some(group) = self.best_overlap_group(&matched_set) else {
                continue;
            };

            let leftovers: Vec<&TrayMember> = group
                .iter()
                .filter(|member| !matched_set.contains(member.name.as_str()))
                .collect();

            if leftovers.len() == unmatched.len() {
                // Positional 1:1: member order is assumed stable between
                // the tray file and the save.
                for (save_name, tray_member) in unmatched.iter().zip(&leftovers) {
                    if let Some(portrait) = &tray_member.portrait {
                        extra.insert((*save_name).clone(), portrait.clone());
                    }
                }
            } else if let [only] = leftovers.as_slice() {
                if let Some(portrait) = &only.portrait {
                    extra.insert(unmatched[0].clone(), portrait.clone());
                }
            }
        }

        extra
    }

    /// Tray household sharing the most member names with `matched_set`.
    /// Zero overlap is no evidence at all, so it returns nothing.
    fn best_overlap_group(&self, matched_set: &HashSet<&str>) -> Option<&Vec<TrayMember>> {
        self.households
            .iter()
            .map(|group| {
                let overlap = group
                    .iter()
                    .filter(|member| matched_set.contains(member.name.as_str()))
                    .count();
                (overlap, group)
            })
            .filter(|(overlap, _)| *overlap > 0)
            .max_by_key(|(overlap, _)| *overlap)
            .map(|(_, group)| group)
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn read_household_members(
    path: &Path,
    by_instance: &BTreeMap<String, PathBuf>,
) -> Vec<TrayMember> {
    let Ok(raw) = fs::read(path) else {
        return Vec::new();
    };
    if raw.len() <= HOUSEHOLD_HEADER_LEN {
        return Vec::new();
    }

    let outer = FieldMap::parse(&raw[HOUSEHOLD_HEADER_LEN..], 2);
    let mut members = Vec::new();
    for sim_raw in outer.bytes_values(F_HH_SIMS) {
        let sim = FieldMap::parse(sim_raw, 1);
        let first = sim.get_string(F_SIM_FIRST).unwrap_or_default();
        // "." is the placeholder the game writes for unnamed slots.
        if first.is_empty() || first == "." {
            continue;
        }
        let Some(instance) = sim.get_fixed64(F_SIM_INSTANCE) else {
            continue;
        };
        let last = sim.get_string(F_SIM_LAST).unwrap_or_default();

        let name = format!("{} {}", first, last).trim().to_string();
        let portrait = by_instance.get(&format!("0x{:016x}", instance)).cloned();
        members.push(TrayMember { name, portrait });
    }
    members
}
