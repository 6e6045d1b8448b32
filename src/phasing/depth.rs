//! Read-count evidence for gene copy number over small site blocks.
//!

use super::haplotype::{Allele, Haplotype};
use super::region::RegionConfig;
use crate::utils::single_copy_likelihood;
use itertools::Itertools;
use std::hash::{Hash, Hasher};

/// Read counts over a block of sites and the likelihood that exactly one copy
/// carries the gene allele there.
#[derive(Debug, Clone)]
pub struct DepthBlock {
    pub sites: Vec<usize>,
    pub gene_reads: usize,
    pub total_reads: usize,
    pub likelihood: Option<f64>,
}

impl DepthBlock {
    /// A missing likelihood never exceeds a threshold.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.likelihood.is_some_and(|l| l > threshold)
    }
}

impl PartialEq for DepthBlock {
    fn eq(&self, other: &Self) -> bool {
        self.sites == other.sites
            && self.gene_reads == other.gene_reads
            && self.total_reads == other.total_reads
            && self.likelihood.map(f64::to_bits) == other.likelihood.map(f64::to_bits)
    }
}

impl Eq for DepthBlock {}

impl Hash for DepthBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sites.hash(state);
        self.gene_reads.hash(state);
        self.total_reads.hash(state);
        self.likelihood.map(f64::to_bits).hash(state);
    }
}

/// Depth state of one sample: its fragments and total copy number.
pub struct DepthModel<'a> {
    fragments: &'a [Haplotype],
    total_cn: u32,
}

impl<'a> DepthModel<'a> {
    pub fn new(fragments: &'a [Haplotype], total_cn: u32) -> Self {
        Self {
            fragments,
            total_cn,
        }
    }

    pub fn total_cn(&self) -> u32 {
        self.total_cn
    }

    /// Counts reads resolved at every site of `sites`; gene reads carry the
    /// reference allele at each of `gene_sites`.
    fn count_block(&self, sites: &[usize], gene_sites: &[usize]) -> DepthBlock {
        let covering = self
            .fragments
            .iter()
            .filter(|f| sites.iter().all(|&s| f.is_resolved_at(s)))
            .collect_vec();
        let gene_reads = covering
            .iter()
            .filter(|f| gene_sites.iter().all(|&s| f.get(s) == Allele::Reference))
            .count();
        let total_reads = covering.len();

        DepthBlock {
            sites: sites.to_vec(),
            gene_reads,
            total_reads,
            likelihood: single_copy_likelihood(gene_reads, total_reads, self.total_cn),
        }
    }

    /// Depth at a switch point. The switching haplotype carries the reference
    /// allele at `sites[allele_index]`, so gene copies are counted at the
    /// remaining sites of the block.
    pub fn get_depth_for_block(&self, sites: &[usize], allele_index: usize) -> DepthBlock {
        let gene_sites = sites
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != allele_index)
            .map(|(_, &s)| s)
            .collect_vec();
        self.count_block(sites, &gene_sites)
    }

    /// Depth at a flanking-site block: gene reads are reference at all its sites.
    pub fn get_depth_for_flanking_block(&self, sites: &[usize]) -> DepthBlock {
        self.count_block(sites, sites)
    }

    /// Evaluates every flanking block configured for `variant_positions`, each
    /// block once, and reports whether any exceeds `cn_threshold`.
    pub fn get_depth_for_blocks(
        &self,
        region: &RegionConfig,
        variant_positions: &[usize],
        cn_threshold: f64,
    ) -> (bool, Vec<DepthBlock>) {
        let blocks = variant_positions
            .iter()
            .filter_map(|pos| region.flanking_sites.get(pos))
            .flatten()
            .unique()
            .map(|sites| self.get_depth_for_flanking_block(sites))
            .collect_vec();
        let found = blocks.iter().any(|b| b.exceeds(cn_threshold));
        (found, blocks)
    }

    /// Projects each haplotype on the variant sites. The assembly is complete
    /// when there is one haplotype per copy and no variant site is unknown.
    pub fn assess_assembled_haps(
        &self,
        region: &RegionConfig,
        full_haplotypes: &[Haplotype],
    ) -> (bool, Vec<Haplotype>) {
        let var_sites_haps = full_haplotypes
            .iter()
            .map(|h| h.restrict(&region.variant_sites))
            .collect_vec();
        let fully_assembled = full_haplotypes.len() == self.total_cn as usize
            && var_sites_haps.iter().all(|h| h.is_fully_resolved());
        (fully_assembled, var_sites_haps)
    }
}

/// A sample is a carrier when exactly one assembled copy is reference at all
/// variant sites.
pub fn carrier_from_assembled_haps(var_sites_haps: &[Haplotype]) -> bool {
    var_sites_haps
        .iter()
        .filter(|h| h.alleles().iter().all(|&a| a == Allele::Reference))
        .count()
        == 1
}
