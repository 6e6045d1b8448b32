use crate::phasing::{
    assembler::assemble_haplotypes,
    classifier::{variant_sites_in_haps, Classifier, SampleCalls},
    depth::DepthModel,
    haplotype::Haplotype,
    reads::{extract_fragments, ReadFilter, SiteCatalog},
    region::RegionConfig,
    sample::Sample,
};
use crate::utils::{get_sample_name, open_indexed_bam, Result};
use itertools::Itertools;
use rust_htslib::bam::{self, Read};

pub struct Params {
    pub region: RegionConfig,
    pub sites: SiteCatalog,
    pub read_filter: ReadFilter,
}

/// Assembles and classifies the haplotypes of one sample.
pub fn analyze_fragments(
    fragments: &[Haplotype],
    total_cn: u32,
    region: &RegionConfig,
) -> SampleCalls {
    let assembled = assemble_haplotypes(fragments, region);
    let full_haplotypes = assembled.full_haplotypes;

    let mut state = SampleCalls {
        haplotypes: full_haplotypes.clone(),
        ..Default::default()
    };

    let depth = DepthModel::new(fragments, total_cn);
    let classifier = Classifier::new(region, &depth);
    let var_index_in_haps = variant_sites_in_haps(region, &full_haplotypes);
    log::debug!(
        "{} of {} assembled haplotypes carry variants",
        var_index_in_haps.len(),
        full_haplotypes.len()
    );

    classifier.check_deletion_bp_in_gene(&mut state, &var_index_in_haps);
    for (hap, _) in &var_index_in_haps {
        classifier.assess_hap(&mut state, hap, &var_index_in_haps, &full_haplotypes);
    }

    state
}

pub fn analyze_sample(sample: &Sample, params: &Params) -> Result<SampleCalls> {
    let mut bam = open_indexed_bam(&sample.reads_path)?;
    if let Some(header_name) = get_sample_name(&bam::Header::from_template(bam.header())) {
        if header_name != sample.id {
            log::warn!(
                "{}: read group sample name is {}",
                sample.id,
                header_name
            );
        }
    }
    let fragments = extract_fragments(&mut bam, &params.sites, &params.read_filter)?;
    log::debug!("{}: {} fragments", sample.id, fragments.len());

    if fragments.is_empty() {
        log::warn!("{}: No reads cover the phasing sites", sample.id);
    }

    let calls = analyze_fragments(&fragments, sample.total_cn, &params.region);
    log::info!(
        "{}: total_cn={} haplotypes=[{}] carrier={}",
        sample.id,
        sample.total_cn,
        calls.haplotypes.iter().join(","),
        calls.is_carrier
    );
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phasing::haplotype::Allele;

    fn tile_fragments(copies: &[&str], depth: usize) -> Vec<Haplotype> {
        let mut fragments = Vec::new();
        for copy in copies {
            let copy: Haplotype = copy.parse().unwrap();
            for start in 0..=copy.len() - 3 {
                let mut window = Haplotype::unknown(copy.len());
                for pos in start..start + 3 {
                    window.set(pos, copy.get(pos));
                }
                fragments.extend(std::iter::repeat(window).take(depth));
            }
        }
        fragments
    }

    #[test]
    fn trusted_haplotype_at_three_copies_is_a_carrier() {
        let fragments = tile_fragments(&["1111112111", "1111111111", "2222222222"], 5);
        let calls = analyze_fragments(&fragments, 3, &RegionConfig::gba());

        let mut haplotypes = calls.haplotypes.iter().map(|h| h.to_string()).collect_vec();
        haplotypes.sort();
        assert_eq!(haplotypes, vec!["1111111111", "1111112111", "2222222222"]);
        assert_eq!(calls.calls.len(), 2);
        assert!(calls.is_carrier);
        let call = calls
            .calls
            .iter()
            .find(|c| c.haplotype.to_string() == "1111112111")
            .unwrap();
        assert!(call.is_carrier);
        assert_eq!(call.variants, vec!["D448H"]);
        let block = &call.blocks[0];
        assert_eq!(block.sites, vec![6, 7]);
        assert_eq!((block.gene_reads, block.total_reads), (10, 30));
        assert!(block.exceeds(RegionConfig::gba().cn_likelihood_threshold_loose));
    }

    #[test]
    fn reference_only_sample_has_no_calls() {
        let fragments = tile_fragments(&["1111111111", "1111111111"], 4);
        let calls = analyze_fragments(&fragments, 2, &RegionConfig::gba());
        assert_eq!(calls.haplotypes.len(), 1);
        assert!(calls.calls.is_empty());
        assert!(!calls.is_carrier);
        assert!(!calls.deletion_bp_in_gene);
    }

    #[test]
    fn no_fragments_degrade_to_empty_calls() {
        let calls = analyze_fragments(&[], 3, &RegionConfig::gba());
        assert!(calls.haplotypes.is_empty());
        assert!(calls.calls.is_empty());
        assert!(!calls.is_carrier);
    }

    #[test]
    fn unresolved_positions_survive_assembly() {
        // seeds present only on the 5' side
        let mut fragments = tile_fragments(&["1122111111"], 3);
        fragments.retain(|f| f.last_resolved().unwrap() < 6);
        let calls = analyze_fragments(&fragments, 2, &RegionConfig::gba());
        assert_eq!(calls.haplotypes.len(), 1);
        assert_eq!(calls.haplotypes[0].get(9), Allele::Unknown);
        assert_eq!(calls.calls[0].variants, vec!["RecNciI"]);
    }
}
