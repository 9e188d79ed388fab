//! Family-role post-pass.
//!
//! Runs over the complete sim list after extraction, grouping by household
//! name. This is the only mutation a built `SimRecord` sees: `family_role`,
//! `family_members`, and `relationship_label` are annotated here.

use std::collections::{BTreeMap, HashSet};

use super::types::{FamilyMember, FamilyRole, SimRecord};

pub(crate) fn assign_family_roles(sims: &mut [SimRecord]) {
    let mut by_household: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, sim) in sims.iter().enumerate() {
        by_household
            .entry(sim.household.clone())
            .or_default()
            .push(i);
    }

    for (household, members) in &by_household {
        // Sims with no household attribution are each on their own.
        if household.is_empty() {
            for &i in members {
                sims[i].family_role = Some(FamilyRole::Loner);
            }
            continue;
        }

        let roles: Vec<FamilyRole> = classify_household(sims, members);
        for (&i, role) in members.iter().zip(&roles) {
            sims[i].family_role = Some(*role);
        }

        // Cross-reference: every member lists the others with their roles.
        for (slot, &i) in members.iter().enumerate() {
            let mut family = Vec::with_capacity(members.len() - 1);
            for (other_slot, &j) in members.iter().enumerate() {
                if other_slot == slot {
                    continue;
                }
                family.push(FamilyMember {
                    name: sims[j].full_name(),
                    role: roles[other_slot],
                });
            }
            sims[i].family_members = family;
        }
    }

    for sim in sims.iter_mut() {
        sim.relationship_label = relationship_label(sim.relationship_count).to_string();
    }
}

fn classify_household(sims: &[SimRecord], members: &[usize]) -> Vec<FamilyRole> {
    if members.len() == 1 {
        return vec![FamilyRole::Loner];
    }

    let adult_count = members.iter().filter(|&&i| sims[i].age.is_adult()).count();
    let has_child = adult_count < members.len();

    // A partner set links both ends of every non-empty partner reference.
    let mut partner_set: HashSet<String> = HashSet::new();
    for &i in members {
        if !sims[i].partner_name.is_empty() {
            partner_set.insert(sims[i].full_name());
            partner_set.insert(sims[i].partner_name.clone());
        }
    }

    members
        .iter()
        .map(|&i| {
            let sim = &sims[i];
            if sim.age.is_adult() {
                if has_child {
                    FamilyRole::Parent
                } else if adult_count >= 2 && partner_set.contains(&sim.full_name()) {
                    FamilyRole::Partner
                } else if adult_count >= 2 {
                    let shares_last_name = members.iter().any(|&j| {
                        j != i && sims[j].age.is_adult() && sims[j].last_name == sim.last_name
                    });
                    if shares_last_name {
                        FamilyRole::Sibling
                    } else {
                        FamilyRole::Roommate
                    }
                } else {
                    FamilyRole::Loner
                }
            } else if adult_count > 0 {
                FamilyRole::Child
            } else {
                // Children-only household.
                FamilyRole::Sibling
            }
        })
        .collect()
}

pub(crate) fn relationship_label(count: u32) -> &'static str {
    match count {
        0 => "None",
        1..=3 => "Few",
        4..=8 => "Some",
        9..=15 => "Many",
        _ => "Very Many",
    }
}
