//! Primitives operating on per-read genotype fragments.
//!
//! A fragment is a [`Haplotype`] with calls only at the sites its read (or read
//! pair) covers. Candidates are grown one site at a time from the fragments
//! consistent with them, and the two partial assemblies are finally joined.

use super::{Allele, Haplotype};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Pattern at a site subset mapped to the indices of its supporting fragments.
pub type PatternCounts = BTreeMap<Vec<Allele>, Vec<usize>>;

/// Candidate haplotype mapped to the fragments consistent with it.
pub type HaplotypeGroups = BTreeMap<Haplotype, Vec<Haplotype>>;

/// Support count per joined haplotype.
pub type JoinSupport = BTreeMap<Haplotype, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    FivePrime,
    ThreePrime,
}

/// Groups fragments fully resolved at `positions` by their alleles there.
pub fn extract_hap(fragments: &[Haplotype], positions: &[usize]) -> PatternCounts {
    let mut counts = PatternCounts::new();
    for (index, fragment) in fragments.iter().enumerate() {
        if let Some(pattern) = fragment.project(positions) {
            counts.entry(pattern).or_default().push(index);
        }
    }
    counts
}

/// Drops patterns seen in fewer than `min_support` fragments.
pub fn filter_hap(counts: PatternCounts, min_support: usize) -> PatternCounts {
    counts
        .into_iter()
        .filter(|(_, support)| support.len() >= min_support)
        .collect()
}

/// Places a seed pattern at `positions` of an otherwise unknown haplotype.
pub fn embed_seed(pattern: &[Allele], positions: &[usize], len: usize) -> Haplotype {
    let mut hap = Haplotype::unknown(len);
    for (&pos, &allele) in positions.iter().zip(pattern) {
        hap.set(pos, allele);
    }
    hap
}

/// Assigns each fragment to every candidate it overlaps without disagreement.
pub fn group_haps(fragments: &[Haplotype], candidates: &[Haplotype]) -> HaplotypeGroups {
    let mut groups = HaplotypeGroups::new();
    for candidate in candidates {
        let members = fragments
            .iter()
            .filter(|f| f.overlaps(candidate) && f.is_consistent_with(candidate))
            .cloned()
            .collect_vec();
        groups.insert(candidate.clone(), members);
    }
    groups
}

pub fn extend_hap_5p(groups: &HaplotypeGroups, min_support: usize) -> Vec<Haplotype> {
    extend(groups, Direction::FivePrime, min_support)
}

pub fn extend_hap_3p(groups: &HaplotypeGroups, min_support: usize) -> Vec<Haplotype> {
    extend(groups, Direction::ThreePrime, min_support)
}

fn extend(groups: &HaplotypeGroups, direction: Direction, min_support: usize) -> Vec<Haplotype> {
    let mut extended = Vec::new();
    for (candidate, members) in groups {
        for hap in extend_candidate(candidate, members, direction, min_support) {
            if !extended.contains(&hap) {
                extended.push(hap);
            }
        }
    }
    extended
}

/// Minimum number of sites a fragment must share with a candidate before its
/// allele can open an alternative branch.
pub const MIN_BRANCH_ANCHOR: usize = 2;

/// Per-allele read tally at the next site of a candidate.
#[derive(Debug, Default, Clone, Copy)]
struct AlleleTally {
    /// All group members resolved at the site.
    total: usize,
    /// Members sharing at least `MIN_BRANCH_ANCHOR` resolved sites with the candidate.
    anchored: usize,
}

fn shared_sites(fragment: &Haplotype, candidate: &Haplotype) -> usize {
    candidate
        .resolved_positions()
        .filter(|&pos| fragment.is_resolved_at(pos))
        .count()
}

/// Grows a candidate by one site with its best-supported allele. The other
/// allele opens a second branch only when `min_support` fragments anchored on
/// `MIN_BRANCH_ANCHOR` candidate sites carry it; reads touching a single site
/// cannot splice another copy onto the candidate.
fn extend_candidate(
    candidate: &Haplotype,
    members: &[Haplotype],
    direction: Direction,
    min_support: usize,
) -> Vec<Haplotype> {
    let next_pos = match direction {
        Direction::FivePrime => candidate.first_resolved().and_then(|p| p.checked_sub(1)),
        Direction::ThreePrime => candidate
            .last_resolved()
            .map(|p| p + 1)
            .filter(|&p| p < candidate.len()),
    };
    let Some(next_pos) = next_pos else {
        return vec![candidate.clone()];
    };

    let mut ref_tally = AlleleTally::default();
    let mut var_tally = AlleleTally::default();
    for member in members {
        let tally = match member.get(next_pos) {
            Allele::Reference => &mut ref_tally,
            Allele::Variant => &mut var_tally,
            Allele::Unknown => continue,
        };
        tally.total += 1;
        if shared_sites(member, candidate) >= MIN_BRANCH_ANCHOR {
            tally.anchored += 1;
        }
    }

    let mut ranked = [(Allele::Reference, ref_tally), (Allele::Variant, var_tally)]
        .into_iter()
        .sorted_by(|a, b| b.1.total.cmp(&a.1.total))
        .collect_vec();
    let (best_allele, best_tally) = ranked.remove(0);
    if best_tally.total < min_support {
        return vec![candidate.clone()];
    }

    let extend_with = |allele: Allele| {
        let mut hap = candidate.clone();
        hap.set(next_pos, allele);
        hap
    };
    let mut extended = vec![extend_with(best_allele)];
    extended.extend(
        ranked
            .into_iter()
            .filter(|(_, tally)| tally.anchored >= min_support)
            .map(|(allele, _)| extend_with(allele)),
    );
    extended
}

/// Extends candidates in one direction for at most `max_rounds` rounds,
/// stopping early once no candidates remain or the set stops changing.
pub fn extend_rounds(
    fragments: &[Haplotype],
    mut candidates: Vec<Haplotype>,
    direction: Direction,
    max_rounds: usize,
    min_support: usize,
) -> Vec<Haplotype> {
    for round in 1..=max_rounds {
        if candidates.is_empty() {
            break;
        }
        let groups = group_haps(fragments, &candidates);
        let extended = match direction {
            Direction::FivePrime => extend_hap_5p(&groups, min_support),
            Direction::ThreePrime => extend_hap_3p(&groups, min_support),
        };
        log::trace!(
            "{:?} round {}: {}",
            direction,
            round,
            extended.iter().join(",")
        );
        if extended == candidates {
            break;
        }
        candidates = extended;
    }
    candidates
}

/// Joins 5'- and 3'-anchored partial haplotypes that agree where both are
/// resolved and overlap inside `[left_bound, right_bound)`.
pub fn join_subblocks(
    fragments: &[Haplotype],
    hap_5p: &[Haplotype],
    hap_3p: &[Haplotype],
    left_bound: usize,
    right_bound: usize,
) -> (Vec<Haplotype>, JoinSupport) {
    let mut joined: Vec<Haplotype> = Vec::new();
    let mut push_unique = |hap: Haplotype| {
        if !joined.contains(&hap) {
            joined.push(hap);
        }
    };

    let mut paired_3p = vec![false; hap_3p.len()];
    for left in hap_5p {
        let mut paired = false;
        for (index, right) in hap_3p.iter().enumerate() {
            if left.is_consistent_with(right)
                && left.overlaps_within(right, left_bound, right_bound)
            {
                push_unique(left.merge(right));
                paired_3p[index] = true;
                paired = true;
            }
        }
        if !paired {
            push_unique(left.clone());
        }
    }
    for (right, _) in hap_3p.iter().zip(&paired_3p).filter(|(_, paired)| !**paired) {
        push_unique(right.clone());
    }

    let support = joined
        .iter()
        .map(|hap| {
            let count = fragments
                .iter()
                .filter(|f| {
                    f.is_consistent_with(hap) && f.overlaps_within(hap, left_bound, right_bound)
                })
                .count();
            (hap.clone(), count)
        })
        .collect();

    (joined, support)
}
