//! Candidate selection and build plan assembly
//!
//! Both halves are pure: they only look at the declared members of a group and
//! what each member's detection produced.

use super::model::{BuildPlan, BuildPlanEntry, BuildpackRef, Group, Provision, Requirement};
use super::report::Disqualification;
use std::collections::HashSet;

/// What one passing buildpack adds to the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub buildpack: BuildpackRef,
    pub requires: Vec<Requirement>,
    pub provides: Vec<Provision>,

    /// False for a composite's own declarations: the composite is replaced by
    /// its children in the final group.
    pub in_group: bool,
}

impl Contribution {
    pub fn new(buildpack: BuildpackRef, requires: Vec<Requirement>, provides: Vec<Provision>) -> Self {
        Self {
            buildpack,
            requires,
            provides,
            in_group: true,
        }
    }

    fn provides_name(&self, name: &str) -> bool {
        self.provides.iter().any(|p| p.name == name)
    }
}

/// Detection result of one declared member of a candidate group.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAttempt {
    pub buildpack: BuildpackRef,
    /// `None` when detection failed; a composite may contribute several entries
    pub contributions: Option<Vec<Contribution>>,
}

impl MemberAttempt {
    pub fn passed(buildpack: BuildpackRef, contributions: Vec<Contribution>) -> Self {
        Self {
            buildpack,
            contributions: Some(contributions),
        }
    }

    pub fn failed(buildpack: BuildpackRef) -> Self {
        Self {
            buildpack,
            contributions: None,
        }
    }

    pub fn is_required_failure(&self) -> bool {
        self.contributions.is_none() && !self.buildpack.optional
    }
}

/// Applies the exclusion rule to a candidate's attempts and validates the
/// requires/provides closure of what survives.
///
/// Failed optional members are dropped, a failed required member disqualifies
/// the candidate, and every requirement left must be provided by some
/// surviving buildpack.
pub fn select_survivors(attempts: Vec<MemberAttempt>) -> Result<Vec<Contribution>, Disqualification> {
    let survivors = select_members(attempts)?;
    check_closure(&survivors)?;
    Ok(survivors)
}

/// The exclusion rule alone. Used for the sub-groups of a composite, whose
/// requirements may be provided by siblings of the composite.
pub fn select_members(attempts: Vec<MemberAttempt>) -> Result<Vec<Contribution>, Disqualification> {
    let mut survivors = Vec::new();
    for attempt in attempts {
        match attempt.contributions {
            Some(contributions) => survivors.extend(contributions),
            None if attempt.buildpack.optional => continue,
            None => {
                return Err(Disqualification::RequiredBuildpackFailed {
                    buildpack: attempt.buildpack,
                })
            }
        }
    }

    if !survivors.iter().any(|c| c.in_group) {
        return Err(Disqualification::NoBuildpacks);
    }

    Ok(survivors)
}

/// Every requirement must be provided by some contribution of the same
/// flattened group.
pub fn check_closure(survivors: &[Contribution]) -> Result<(), Disqualification> {
    let provided: HashSet<&str> = survivors
        .iter()
        .flat_map(|c| c.provides.iter().map(|p| p.name.as_str()))
        .collect();
    for contribution in survivors {
        if let Some(missing) = contribution
            .requires
            .iter()
            .find(|r| !provided.contains(r.name.as_str()))
        {
            return Err(Disqualification::UnsatisfiedRequirement {
                name: missing.name.clone(),
                required_by: contribution.buildpack.clone(),
            });
        }
    }
    Ok(())
}

/// The flattened group formed by a winning set of contributions.
pub fn winning_group(contributions: &[Contribution]) -> Group {
    Group::new(
        contributions
            .iter()
            .filter(|c| c.in_group)
            .map(|c| c.buildpack.clone())
            .collect(),
    )
}

/// Merges the requirements of a winning group into a build plan.
///
/// Entries appear in the order their name is first required; providers keep
/// group order and appear once per entry.
pub fn assemble(contributions: &[Contribution]) -> BuildPlan {
    let mut entries: Vec<BuildPlanEntry> = Vec::new();

    for contribution in contributions {
        for requirement in &contribution.requires {
            match entries
                .iter()
                .position(|e| e.name() == Some(requirement.name.as_str()))
            {
                Some(index) => entries[index].requires.push(requirement.clone()),
                None => entries.push(BuildPlanEntry {
                    providers: Vec::new(),
                    requires: vec![requirement.clone()],
                }),
            }
        }
    }

    for entry in &mut entries {
        let Some(name) = entry.name().map(str::to_string) else {
            continue;
        };
        for contribution in contributions.iter().filter(|c| c.provides_name(&name)) {
            if !entry.providers.contains(&contribution.buildpack) {
                entry.providers.push(contribution.buildpack.clone());
            }
        }
    }

    BuildPlan { entries }
}
