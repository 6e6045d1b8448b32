//! Bidirectional assembly of full-length haplotypes from read fragments.
//!

use super::haplotype::{
    fragments::{embed_seed, extend_rounds, extract_hap, filter_hap, join_subblocks},
    Direction, Haplotype, JoinSupport,
};
use super::region::RegionConfig;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledHaplotypes {
    pub full_haplotypes: Vec<Haplotype>,
    pub hap_5p: Vec<Haplotype>,
    pub hap_3p: Vec<Haplotype>,
    pub support: JoinSupport,
}

/// Assembles haplotypes from a 5'-side seed and a 3'-side seed independently,
/// then joins the two partial assemblies.
///
/// Each pass first grows the seed outwards to the nearest end of the region
/// and then across the region, for at most `max_extension_rounds` rounds per
/// direction. Unresolved positions stay unknown.
pub fn assemble_haplotypes(fragments: &[Haplotype], region: &RegionConfig) -> AssembledHaplotypes {
    let hap_5p = assemble_from_seed(
        fragments,
        region,
        &region.seed_5p,
        [Direction::FivePrime, Direction::ThreePrime],
    );
    log::debug!(
        "5' anchored assembly: {} haplotypes [{}]",
        hap_5p.len(),
        hap_5p.iter().join(",")
    );

    let hap_3p = assemble_from_seed(
        fragments,
        region,
        &region.seed_3p,
        [Direction::ThreePrime, Direction::FivePrime],
    );
    log::debug!(
        "3' anchored assembly: {} haplotypes [{}]",
        hap_3p.len(),
        hap_3p.iter().join(",")
    );

    let (left_bound, right_bound) = region.join_bounds;
    let (full_haplotypes, support) =
        join_subblocks(fragments, &hap_5p, &hap_3p, left_bound, right_bound);
    log::debug!(
        "Joined haplotypes: [{}]",
        full_haplotypes
            .iter()
            .map(|h| format!("{}({})", h, support.get(h).copied().unwrap_or(0)))
            .join(",")
    );

    AssembledHaplotypes {
        full_haplotypes,
        hap_5p,
        hap_3p,
        support,
    }
}

fn assemble_from_seed(
    fragments: &[Haplotype],
    region: &RegionConfig,
    seed_sites: &[usize],
    directions: [Direction; 2],
) -> Vec<Haplotype> {
    let seeds = filter_hap(extract_hap(fragments, seed_sites), region.min_support);
    let mut candidates = seeds
        .keys()
        .map(|pattern| embed_seed(pattern, seed_sites, region.num_sites))
        .collect_vec();
    log::trace!(
        "Seeds at sites {:?}: [{}]",
        seed_sites,
        candidates.iter().join(",")
    );

    for direction in directions {
        candidates = extend_rounds(
            fragments,
            candidates,
            direction,
            region.max_extension_rounds,
            region.min_support,
        );
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phasing::haplotype::Allele;

    fn hap(s: &str) -> Haplotype {
        s.parse().unwrap()
    }

    /// Overlapping three-site windows tiling each copy, `depth` times over.
    fn tile_fragments(copies: &[&str], depth: usize) -> Vec<Haplotype> {
        let mut fragments = Vec::new();
        for copy in copies {
            let copy = hap(copy);
            for start in 0..=copy.len() - 3 {
                let window = (0..copy.len())
                    .map(|i| {
                        if (start..start + 3).contains(&i) {
                            copy.get(i)
                        } else {
                            Allele::Unknown
                        }
                    })
                    .collect_vec();
                for _ in 0..depth {
                    fragments.push(Haplotype::new(window.clone()));
                }
            }
        }
        fragments
    }

    #[test]
    fn assembles_three_distinct_copies() {
        let fragments = tile_fragments(&["1111112111", "1111111111", "2222222222"], 5);
        let assembled = assemble_haplotypes(&fragments, &RegionConfig::gba());

        let sorted = |haps: &[Haplotype]| haps.iter().map(|h| h.to_string()).sorted().collect_vec();
        assert_eq!(
            sorted(&assembled.hap_5p),
            vec!["11111111xx", "11111121xx", "22222222xx"]
        );
        assert_eq!(
            sorted(&assembled.hap_3p),
            vec!["xx11111111", "xx11112111", "xx22222222"]
        );
        let mut full = assembled
            .full_haplotypes
            .iter()
            .map(|h| h.to_string())
            .collect_vec();
        full.sort();
        assert_eq!(full, vec!["1111111111", "1111112111", "2222222222"]);
        assert!(assembled.support[&hap("1111112111")] > 0);
    }

    #[test]
    fn partial_assemblies_stay_within_round_cap() {
        let fragments = tile_fragments(&["1111111111"], 3);
        let assembled = assemble_haplotypes(&fragments, &RegionConfig::gba());
        assert_eq!(assembled.hap_5p, vec![hap("11111111xx")]);
        assert_eq!(assembled.hap_3p, vec![hap("xx11111111")]);
        assert_eq!(assembled.full_haplotypes, vec![hap("1111111111")]);
    }

    #[test]
    fn single_read_seeds_are_ignored() {
        let fragments = vec![hap("1111111111")];
        let assembled = assemble_haplotypes(&fragments, &RegionConfig::gba());
        assert!(assembled.hap_5p.is_empty());
        assert!(assembled.hap_3p.is_empty());
        assert!(assembled.full_haplotypes.is_empty());
    }

    #[test]
    fn empty_fragments_yield_no_haplotypes() {
        let assembled = assemble_haplotypes(&[], &RegionConfig::gba());
        assert!(assembled.full_haplotypes.is_empty());
        assert!(assembled.support.is_empty());
    }
}
