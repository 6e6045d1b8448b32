//! Per-read genotype fragments from an indexed BAM.
//!

use super::sites::{Site, SiteCatalog};
use crate::phasing::haplotype::{Allele, Haplotype};
use crate::utils::Result;
use rust_htslib::bam::{self, pileup::Alignment, Read};
use std::collections::{btree_map::Entry, BTreeMap};

const MAX_PILEUP_DEPTH: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadFilter {
    pub min_mapq: u8,
    pub min_baseq: u8,
}

impl Default for ReadFilter {
    fn default() -> Self {
        Self {
            min_mapq: 0,
            min_baseq: 10,
        }
    }
}

impl ReadFilter {
    fn passes(&self, alignment: &Alignment) -> bool {
        if alignment.is_del() || alignment.is_refskip() {
            return false;
        }
        let record = alignment.record();
        if record.is_secondary()
            || record.is_supplementary()
            || record.is_duplicate()
            || record.is_quality_check_failed()
            || record.mapq() < self.min_mapq
        {
            return false;
        }
        match alignment.qpos() {
            Some(qpos) => record.qual().get(qpos).is_some_and(|&q| q >= self.min_baseq),
            None => false,
        }
    }
}

/// Allele a base supports at a site, `None` for any third base.
pub fn call_base(site: &Site, base: u8) -> Option<Allele> {
    match base.to_ascii_uppercase() {
        b if b == site.ref_base => Some(Allele::Reference),
        b if b == site.alt_base => Some(Allele::Variant),
        _ => None,
    }
}

/// Records `allele` for a read at `pos`; disagreeing mates leave the site unknown.
fn record_call(
    calls: &mut BTreeMap<Vec<u8>, (Haplotype, Vec<bool>)>,
    qname: &[u8],
    num_sites: usize,
    pos: usize,
    allele: Allele,
) {
    let (hap, conflicted) = match calls.entry(qname.to_vec()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            entry.insert((Haplotype::unknown(num_sites), vec![false; num_sites]))
        }
    };
    if conflicted[pos] {
        return;
    }
    match hap.get(pos) {
        Allele::Unknown => hap.set(pos, allele),
        existing if existing != allele => {
            hap.set(pos, Allele::Unknown);
            conflicted[pos] = true;
        }
        _ => {}
    }
}

/// Genotypes every read (merging mates by name) at each catalog site.
/// Fragments without a single called site are dropped.
pub fn extract_fragments(
    bam: &mut bam::IndexedReader,
    catalog: &SiteCatalog,
    filter: &ReadFilter,
) -> Result<Vec<Haplotype>> {
    let num_sites = catalog.len();
    let mut calls = BTreeMap::new();

    for (pos, site) in catalog.sites.iter().enumerate() {
        let region = &site.region;
        if let Err(msg) = bam.fetch((region.contig.as_str(), region.start, region.end)) {
            log::warn!("Fetch error at site {}: {}", site.id, msg);
            continue;
        }

        let mut pileups = bam.pileup();
        pileups.set_max_depth(MAX_PILEUP_DEPTH);
        let mut num_called = 0;
        for pileup in pileups {
            let pileup = pileup.map_err(|e| e.to_string())?;
            if pileup.pos() != region.start {
                continue;
            }
            for alignment in pileup.alignments() {
                if !filter.passes(&alignment) {
                    continue;
                }
                let Some(qpos) = alignment.qpos() else {
                    continue;
                };
                let record = alignment.record();
                if let Some(allele) = call_base(site, record.seq()[qpos]) {
                    record_call(&mut calls, record.qname(), num_sites, pos, allele);
                    num_called += 1;
                }
            }
        }
        log::trace!("Site {}: {} reads called", site.id, num_called);
    }

    Ok(calls
        .into_values()
        .map(|(hap, _)| hap)
        .filter(|hap| hap.first_resolved().is_some())
        .collect())
}
