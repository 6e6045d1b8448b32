//! Carrier classification of assembled haplotypes.
//!
//! Each variant-bearing haplotype is run through three scenarios in order:
//! depth at its flanking sites (scenario 1), the composition of the complete
//! haplotype set (scenario 2) and depth at its allele switch points
//! (scenario 3). The carrier flag is per sample and never cleared once set.

use super::depth::{carrier_from_assembled_haps, DepthBlock, DepthModel};
use super::haplotype::{Allele, Haplotype, Transition};
use super::region::RegionConfig;
use arrayvec::ArrayVec;
use itertools::Itertools;

/// Variant call for one assembled haplotype.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCall {
    pub haplotype: Haplotype,
    pub variants: Vec<String>,
    pub blocks: Vec<DepthBlock>,
    pub is_carrier: bool,
}

/// Classification state and results for one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleCalls {
    pub haplotypes: Vec<Haplotype>,
    pub calls: Vec<VariantCall>,
    pub is_carrier: bool,
    pub deletion_bp_in_gene: bool,
}

/// Variant-bearing haplotypes (in assembly order, duplicates collapsed) and
/// the variant sites at which each carries the variant allele.
pub type VariantSitesInHaps = Vec<(Haplotype, Vec<usize>)>;

pub fn variant_sites_in_haps(
    region: &RegionConfig,
    haplotypes: &[Haplotype],
) -> VariantSitesInHaps {
    let mut var_index_in_haps: VariantSitesInHaps = Vec::new();
    for hap in haplotypes {
        if var_index_in_haps.iter().any(|(h, _)| h == hap) {
            continue;
        }
        let sites = region
            .variant_sites
            .iter()
            .copied()
            .filter(|&site| hap.get(site) == Allele::Variant)
            .collect_vec();
        if !sites.is_empty() {
            var_index_in_haps.push((hap.clone(), sites));
        }
    }
    var_index_in_haps
}

/// Curated names of the variants a haplotype carries, with known co-occurring
/// sets reported under their compound name.
pub fn get_variants_gba(region: &RegionConfig, hap: &Haplotype) -> Vec<String> {
    let variants = (0..hap.len())
        .filter(|&pos| hap.get(pos) == Allele::Variant)
        .filter_map(|pos| region.variant_index(pos))
        .map(|index| region.variant_names[index].clone())
        .collect_vec();

    match region
        .compound_variants
        .iter()
        .find(|compound| compound.components == variants)
    {
        Some(compound) => vec![compound.name.clone()],
        None => variants,
    }
}

pub struct Classifier<'a> {
    region: &'a RegionConfig,
    depth: &'a DepthModel<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(region: &'a RegionConfig, depth: &'a DepthModel<'a>) -> Self {
        Self { region, depth }
    }

    /// Flags a deletion breakpoint inside the gene for samples with fewer than
    /// four copies when a fully resolved haplotype switches once from variant
    /// to reference.
    pub fn check_deletion_bp_in_gene(
        &self,
        state: &mut SampleCalls,
        var_index_in_haps: &VariantSitesInHaps,
    ) {
        if self.depth.total_cn() >= 4 {
            return;
        }
        for (hap, _) in var_index_in_haps {
            if hap.count_transition(Transition::VarToRef) == 1
                && !hap.has_transition(Transition::RefToVar)
                && !hap.has_unknown()
            {
                log::debug!("Deletion breakpoint within gene: {}", hap);
                state.deletion_bp_in_gene = true;
            }
        }
    }

    /// Classifies one haplotype and appends its variant call to `state`.
    pub fn assess_hap(
        &self,
        state: &mut SampleCalls,
        hap: &Haplotype,
        var_index_in_haps: &VariantSitesInHaps,
        full_haplotypes: &[Haplotype],
    ) {
        let region = self.region;
        let (fully_assembled, var_sites_haps) =
            self.depth.assess_assembled_haps(region, full_haplotypes);
        let good_var_indices = var_index_in_haps
            .iter()
            .find(|(h, _)| h == hap)
            .map(|(_, sites)| sites.as_slice())
            .unwrap_or_default();

        // Scenario 1: depth at the flanking sites of each variant
        let threshold =
            if region.trusted_hap_threshold.contains(hap) && full_haplotypes.len() <= 4 {
                region.cn_likelihood_threshold_loose
            } else {
                region.cn_likelihood_threshold
            };
        let (found_variant_in_short_hap, mut block_result) = self
            .depth
            .get_depth_for_blocks(region, good_var_indices, threshold);

        if found_variant_in_short_hap {
            log::debug!("{}: carrier from flanking-site depth", hap);
            state.is_carrier = true;
        } else if var_index_in_haps.len() == 1 && fully_assembled {
            // Scenario 2: one variant haplotype in a complete assembly
            if carrier_from_assembled_haps(&var_sites_haps) {
                log::debug!("{}: carrier from assembled haplotypes", hap);
                state.is_carrier = true;
            }
        }

        // Scenario 3: depth at switch points not covered by flanking sites
        if !state.is_carrier && self.checks_switch_points(hap) {
            for (transition, switch_point) in switch_points(hap) {
                let switch_block = self.depth.get_depth_for_block(
                    &[switch_point, switch_point + 1],
                    transition.reference_offset(),
                );
                if switch_block.exceeds(region.cn_likelihood_threshold) {
                    log::debug!("{}: carrier from switch point at {}", hap, switch_point);
                    state.is_carrier = true;
                }
                if !block_result.contains(&switch_block) {
                    block_result.push(switch_block);
                }
            }
        }

        state.calls.push(var_call_per_haplotype(
            hap,
            get_variants_gba(region, hap),
            block_result,
            state.is_carrier,
        ));
    }

    fn checks_switch_points(&self, hap: &Haplotype) -> bool {
        self.region.trusted_hap_switch_point.contains(hap)
            || hap.has_single_switch(Transition::RefToVar)
            || hap.has_single_switch(Transition::VarToRef)
    }
}

/// First occurrence of each kind of switch, `12` before `21`.
fn switch_points(hap: &Haplotype) -> ArrayVec<(Transition, usize), 2> {
    Transition::ALL
        .into_iter()
        .filter_map(|t| hap.first_transition(t).map(|pos| (t, pos)))
        .collect()
}

pub fn var_call_per_haplotype(
    hap: &Haplotype,
    variants: Vec<String>,
    blocks: Vec<DepthBlock>,
    is_carrier: bool,
) -> VariantCall {
    VariantCall {
        haplotype: hap.clone(),
        variants,
        blocks,
        is_carrier,
    }
}
