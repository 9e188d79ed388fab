//! JSON and text rendering for analysis results.
//!
//! The core crate produces plain data; everything user-facing is built here
//! so the CLI and any other surface print identical output. JSON is emitted
//! with a fixed key order so renders diff cleanly between runs.

use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use simscan_core::dbpf::ArchiveEntry;
use simscan_core::savegame::{SaveAnalysis, SimRecord};
use simscan_core::tray::TrayIndex;

const SIM_COL_NAME: usize = 26;
const SIM_COL_AGE: usize = 13;
const SIM_COL_GENDER: usize = 9;
const SIM_COL_HOUSEHOLD: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

pub fn render_analysis_json(analysis: &SaveAnalysis, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(analysis_json(analysis)),
    }
}

pub fn render_analysis_text(analysis: &SaveAnalysis) -> String {
    let mut out = String::new();

    writeln!(
        &mut out,
        "{} sims, {} households ({} played), {} worlds",
        analysis.stats.sim_count,
        analysis.stats.household_count,
        analysis.stats.played_household_count,
        analysis.stats.world_count
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    let header = format!(
        "{:<a$}{:<b$}{:<c$}{:<d$}Played",
        "Name",
        "Age",
        "Gender",
        "Household",
        a = SIM_COL_NAME,
        b = SIM_COL_AGE,
        c = SIM_COL_GENDER,
        d = SIM_COL_HOUSEHOLD
    );
    writeln!(&mut out, "{header}").expect("writing to String cannot fail");
    for sim in &analysis.sims {
        writeln!(&mut out, "{}", sim_row(sim)).expect("writing to String cannot fail");
    }

    if !analysis.worlds.is_empty() {
        writeln!(&mut out).expect("writing to String cannot fail");
        writeln!(&mut out, "Worlds: {}", analysis.worlds.join(", "))
            .expect("writing to String cannot fail");
    }
    if !analysis.played_households.is_empty() {
        writeln!(
            &mut out,
            "Played households: {}",
            analysis.played_households.join(", ")
        )
        .expect("writing to String cannot fail");
    }

    out
}

pub fn render_sim_detail_text(sim: &SimRecord) -> String {
    let mut out = String::new();

    writeln!(&mut out, "{}", sim.full_name()).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  {} {}, {} days old, skin tone {}",
        sim.age,
        sim.gender,
        sim.age_days,
        sim.skin_tone.as_str()
    )
    .expect("writing to String cannot fail");
    if let Some(mood) = &sim.mood {
        writeln!(&mut out, "  Mood: {} {} ({:.1})", mood.emoji, mood.label, mood.value)
            .expect("writing to String cannot fail");
    }
    if let Some(role) = sim.family_role {
        writeln!(&mut out, "  Family role: {role}").expect("writing to String cannot fail");
    }
    for member in &sim.family_members {
        writeln!(&mut out, "    {} ({})", member.name, member.role)
            .expect("writing to String cannot fail");
    }
    writeln!(
        &mut out,
        "  Relationships: {} ({})",
        sim.relationship_count, sim.relationship_label
    )
    .expect("writing to String cannot fail");

    if !sim.skills.is_empty() {
        writeln!(&mut out, "  Skills:").expect("writing to String cannot fail");
        for skill in &sim.skills {
            writeln!(
                &mut out,
                "    {}: {}/{} ({} XP)",
                skill.name, skill.level, skill.max_level, skill.xp as i64
            )
            .expect("writing to String cannot fail");
        }
    }
    if !sim.needs.is_empty() {
        writeln!(&mut out, "  Needs:").expect("writing to String cannot fail");
        for need in &sim.needs {
            writeln!(
                &mut out,
                "    {} {}: {:.0}%",
                need.emoji, need.name, need.percent
            )
            .expect("writing to String cannot fail");
        }
    }

    out
}

pub fn render_entries_json(entries: &[ArchiveEntry]) -> JsonValue {
    JsonValue::Array(entries.iter().map(entry_json).collect())
}

pub fn render_entries_text(entries: &[ArchiveEntry]) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{:<12}{:<12}{:<20}{:>10}  Compressed",
        "Type", "Group", "Instance", "Size"
    )
    .expect("writing to String cannot fail");
    for entry in entries {
        writeln!(
            &mut out,
            "{:<12}{:<12}{:<20}{:>10}  {}",
            format!("0x{:08x}", entry.resource_type),
            format!("0x{:08x}", entry.group),
            format!("0x{:016x}", entry.instance),
            entry.size,
            if entry.compressed { "yes" } else { "no" }
        )
        .expect("writing to String cannot fail");
    }
    writeln!(&mut out, "{} entries", entries.len()).expect("writing to String cannot fail");
    out
}

pub fn render_tray_json(index: &TrayIndex) -> JsonValue {
    let mut out = JsonMap::new();

    let mut portraits = JsonMap::new();
    for (name, path) in &index.portraits {
        portraits.insert(
            name.clone(),
            JsonValue::String(path.display().to_string()),
        );
    }
    out.insert("portraits".to_string(), JsonValue::Object(portraits));

    out.insert(
        "households".to_string(),
        JsonValue::Array(
            index
                .households
                .iter()
                .map(|group| {
                    JsonValue::Array(
                        group
                            .iter()
                            .map(|member| {
                                let mut m = JsonMap::new();
                                m.insert(
                                    "name".to_string(),
                                    JsonValue::String(member.name.clone()),
                                );
                                m.insert(
                                    "portrait".to_string(),
                                    match &member.portrait {
                                        Some(path) => {
                                            JsonValue::String(path.display().to_string())
                                        }
                                        None => JsonValue::Null,
                                    },
                                );
                                JsonValue::Object(m)
                            })
                            .collect(),
                    )
                })
                .collect(),
        ),
    );

    JsonValue::Object(out)
}

pub fn render_tray_text(index: &TrayIndex) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{} portraits across {} households",
        index.portraits.len(),
        index.households.len()
    )
    .expect("writing to String cannot fail");
    for (number, group) in index.households.iter().enumerate() {
        writeln!(&mut out, "Household {}:", number + 1).expect("writing to String cannot fail");
        for member in group {
            let marker = if member.portrait.is_some() { "*" } else { " " };
            writeln!(&mut out, "  {marker} {}", member.name)
                .expect("writing to String cannot fail");
        }
    }
    out
}

fn sim_row(sim: &SimRecord) -> String {
    let row = format!(
        "{:<a$}{:<b$}{:<c$}{:<d$}{}",
        fit_column(&sim.full_name(), SIM_COL_NAME),
        sim.age.as_str(),
        sim.gender.as_str(),
        fit_column(&sim.household, SIM_COL_HOUSEHOLD),
        if sim.is_played { "yes" } else { "no" },
        a = SIM_COL_NAME,
        b = SIM_COL_AGE,
        c = SIM_COL_GENDER,
        d = SIM_COL_HOUSEHOLD
    );
    row.trim_end().to_string()
}

fn analysis_json(analysis: &SaveAnalysis) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    let mut stats = JsonMap::new();
    stats.insert(
        "sims".to_string(),
        JsonValue::from(analysis.stats.sim_count),
    );
    stats.insert(
        "households".to_string(),
        JsonValue::from(analysis.stats.household_count),
    );
    stats.insert(
        "played_households".to_string(),
        JsonValue::from(analysis.stats.played_household_count),
    );
    stats.insert(
        "worlds".to_string(),
        JsonValue::from(analysis.stats.world_count),
    );
    out.insert("stats".to_string(), JsonValue::Object(stats));

    out.insert(
        "sims".to_string(),
        JsonValue::Array(analysis.sims.iter().map(sim_json).collect()),
    );

    let mut households = JsonMap::new();
    for (name, members) in &analysis.households {
        households.insert(
            name.clone(),
            JsonValue::Array(
                members
                    .iter()
                    .map(|member| JsonValue::String(member.clone()))
                    .collect(),
            ),
        );
    }
    out.insert("households".to_string(), JsonValue::Object(households));

    out.insert(
        "played_households".to_string(),
        JsonValue::Array(
            analysis
                .played_households
                .iter()
                .map(|name| JsonValue::String(name.clone()))
                .collect(),
        ),
    );
    out.insert(
        "worlds".to_string(),
        JsonValue::Array(
            analysis
                .worlds
                .iter()
                .map(|world| JsonValue::String(world.clone()))
                .collect(),
        ),
    );

    out
}

fn sim_json(sim: &SimRecord) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "sim_id".to_string(),
        JsonValue::String(format!("0x{:016x}", sim.sim_id)),
    );
    m.insert("name".to_string(), JsonValue::String(sim.full_name()));
    m.insert(
        "gender".to_string(),
        JsonValue::String(sim.gender.to_string()),
    );
    m.insert("age".to_string(), JsonValue::String(sim.age.to_string()));
    m.insert("age_days".to_string(), JsonValue::from(sim.age_days));
    m.insert(
        "skin_tone".to_string(),
        JsonValue::String(sim.skin_tone.as_str().to_string()),
    );
    m.insert("occult".to_string(), JsonValue::Bool(sim.occult));
    m.insert(
        "household".to_string(),
        JsonValue::String(sim.household.clone()),
    );
    m.insert("world".to_string(), JsonValue::String(sim.world.clone()));
    m.insert(
        "partner".to_string(),
        if sim.partner_name.is_empty() {
            JsonValue::Null
        } else {
            JsonValue::String(sim.partner_name.clone())
        },
    );
    m.insert(
        "family_role".to_string(),
        match sim.family_role {
            Some(role) => JsonValue::String(role.to_string()),
            None => JsonValue::Null,
        },
    );
    m.insert(
        "family".to_string(),
        JsonValue::Array(
            sim.family_members
                .iter()
                .map(|member| {
                    let mut fm = JsonMap::new();
                    fm.insert("name".to_string(), JsonValue::String(member.name.clone()));
                    fm.insert(
                        "role".to_string(),
                        JsonValue::String(member.role.to_string()),
                    );
                    JsonValue::Object(fm)
                })
                .collect(),
        ),
    );
    m.insert(
        "relationships".to_string(),
        JsonValue::from(sim.relationship_count),
    );
    m.insert(
        "relationship_label".to_string(),
        JsonValue::String(sim.relationship_label.clone()),
    );
    m.insert("traits".to_string(), JsonValue::from(sim.trait_count));
    m.insert(
        "skills".to_string(),
        JsonValue::Array(
            sim.skills
                .iter()
                .map(|skill| {
                    let mut sm = JsonMap::new();
                    sm.insert("name".to_string(), JsonValue::String(skill.name.clone()));
                    sm.insert("level".to_string(), JsonValue::from(skill.level));
                    sm.insert("max_level".to_string(), JsonValue::from(skill.max_level));
                    sm.insert("xp".to_string(), JsonValue::from(skill.xp));
                    sm.insert("mod_skill".to_string(), JsonValue::Bool(skill.is_mod_skill));
                    JsonValue::Object(sm)
                })
                .collect(),
        ),
    );
    m.insert(
        "needs".to_string(),
        JsonValue::Array(
            sim.needs
                .iter()
                .map(|need| {
                    let mut nm = JsonMap::new();
                    nm.insert("name".to_string(), JsonValue::String(need.name.clone()));
                    nm.insert("value".to_string(), JsonValue::from(need.value));
                    nm.insert("percent".to_string(), JsonValue::from(need.percent));
                    nm.insert("emoji".to_string(), JsonValue::String(need.emoji.clone()));
                    JsonValue::Object(nm)
                })
                .collect(),
        ),
    );
    m.insert(
        "mood".to_string(),
        match &sim.mood {
            Some(mood) => {
                let mut mm = JsonMap::new();
                mm.insert("value".to_string(), JsonValue::from(mood.value));
                mm.insert("label".to_string(), JsonValue::String(mood.label.clone()));
                mm.insert("emoji".to_string(), JsonValue::String(mood.emoji.clone()));
                JsonValue::Object(mm)
            }
            None => JsonValue::Null,
        },
    );
    m.insert("played".to_string(), JsonValue::Bool(sim.is_played));
    JsonValue::Object(m)
}

fn entry_json(entry: &ArchiveEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "type".to_string(),
        JsonValue::String(format!("0x{:08x}", entry.resource_type)),
    );
    m.insert(
        "group".to_string(),
        JsonValue::String(format!("0x{:08x}", entry.group)),
    );
    m.insert(
        "instance".to_string(),
        JsonValue::String(format!("0x{:016x}", entry.instance)),
    );
    m.insert("offset".to_string(), JsonValue::from(entry.offset));
    m.insert("size".to_string(), JsonValue::from(entry.size));
    m.insert("compressed".to_string(), JsonValue::Bool(entry.compressed));
    m.insert("mem_size".to_string(), JsonValue::from(entry.mem_size));
    JsonValue::Object(m)
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width.saturating_sub(1) {
        return value.to_string();
    }
    if width <= 4 {
        return value.chars().take(width.saturating_sub(1)).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 4) {
        out.push(ch);
    }
    out.push_str("...");
    out
}
