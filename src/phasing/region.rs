use super::haplotype::{Allele, Haplotype};
use crate::utils::{Preset, Result};
use std::collections::BTreeMap;

pub const MIN_SUPPORT: usize = 2;
pub const MAX_EXTENSION_ROUNDS: usize = 4;
pub const CN_LIKELIHOOD_THRESHOLD: f64 = 0.8;
pub const CN_LIKELIHOOD_THRESHOLD_LOOSE: f64 = 0.6;

/// Named combination of co-occurring variant calls reported as a single allele.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundVariant {
    pub components: Vec<String>,
    pub name: String,
}

/// Site layout, curated names and calling thresholds for one gene region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub num_sites: usize,
    /// Positions (into the haplotype string) of sites with a curated variant.
    pub variant_sites: Vec<usize>,
    /// Curated name for each entry of `variant_sites`.
    pub variant_names: Vec<String>,
    pub compound_variants: Vec<CompoundVariant>,
    /// Haplotypes called with the loose copy-number threshold.
    pub trusted_hap_threshold: Vec<Haplotype>,
    /// Haplotypes whose switch points are always checked for depth.
    pub trusted_hap_switch_point: Vec<Haplotype>,
    /// Site blocks used to measure depth for each variant site.
    pub flanking_sites: BTreeMap<usize, Vec<Vec<usize>>>,
    pub seed_5p: Vec<usize>,
    pub seed_3p: Vec<usize>,
    /// Half-open window `[start, end)` the two partial assemblies are joined on.
    pub join_bounds: (usize, usize),
    pub max_extension_rounds: usize,
    pub min_support: usize,
    pub cn_likelihood_threshold: f64,
    pub cn_likelihood_threshold_loose: f64,
}

impl RegionConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Gba => Self::gba(),
        }
    }

    /// Ten differentiating sites across exons 9-11, variants at sites 2, 3, 6 and 7.
    pub fn gba() -> Self {
        use Allele::{Reference as R, Variant as V};
        let trusted = vec![
            Haplotype::new(vec![R, R, R, R, R, R, V, R, R, R]),
            Haplotype::new(vec![R, R, V, R, R, R, R, R, R, R]),
            Haplotype::new(vec![R, R, R, V, R, R, R, R, R, R]),
            Haplotype::new(vec![R, R, R, R, R, R, R, V, V, R]),
        ];

        let to_strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let compound_variants = vec![
            CompoundVariant {
                components: to_strings(&["A495P", "L483P"]),
                name: "RecNciI".to_string(),
            },
            CompoundVariant {
                components: to_strings(&["A495P", "L483P", "D448H"]),
                name: "RecTL".to_string(),
            },
            CompoundVariant {
                components: to_strings(&["A495P", "L483P", "D448H", "c.1263del"]),
                name: "c.1263del+RecTL".to_string(),
            },
        ];

        let flanking_sites = BTreeMap::from([
            (2, vec![vec![2, 3]]),
            (3, vec![vec![2, 3]]),
            (6, vec![vec![6, 7]]),
            (7, vec![vec![6, 7]]),
        ]);

        RegionConfig {
            num_sites: 10,
            variant_sites: vec![2, 3, 6, 7],
            variant_names: to_strings(&["A495P", "L483P", "D448H", "c.1263del"]),
            compound_variants,
            trusted_hap_threshold: trusted.clone(),
            trusted_hap_switch_point: trusted,
            flanking_sites,
            seed_5p: vec![2, 3],
            seed_3p: vec![6, 7],
            join_bounds: (2, 8),
            max_extension_rounds: MAX_EXTENSION_ROUNDS,
            min_support: MIN_SUPPORT,
            cn_likelihood_threshold: CN_LIKELIHOOD_THRESHOLD,
            cn_likelihood_threshold_loose: CN_LIKELIHOOD_THRESHOLD_LOOSE,
        }
    }

    pub fn with_thresholds(mut self, standard: Option<f64>, loose: Option<f64>) -> Self {
        if let Some(standard) = standard {
            self.cn_likelihood_threshold = standard;
        }
        if let Some(loose) = loose {
            self.cn_likelihood_threshold_loose = loose;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.variant_sites.len() != self.variant_names.len() {
            return Err(format!(
                "Expected one name per variant site, found {} sites and {} names",
                self.variant_sites.len(),
                self.variant_names.len()
            ));
        }

        if let Some(pos) = self
            .variant_sites
            .iter()
            .chain(self.seed_5p.iter())
            .chain(self.seed_3p.iter())
            .chain(self.flanking_sites.values().flatten().flatten())
            .find(|&&pos| pos >= self.num_sites)
        {
            return Err(format!(
                "Site position {} is outside the {}-site region",
                pos, self.num_sites
            ));
        }

        let (start, end) = self.join_bounds;
        if start >= end || end > self.num_sites {
            return Err(format!("Invalid join bounds [{}, {})", start, end));
        }

        if let Some(hap) = self
            .trusted_hap_threshold
            .iter()
            .chain(self.trusted_hap_switch_point.iter())
            .find(|h| h.len() != self.num_sites)
        {
            return Err(format!(
                "Trusted haplotype {} does not span {} sites",
                hap, self.num_sites
            ));
        }

        for threshold in [
            self.cn_likelihood_threshold,
            self.cn_likelihood_threshold_loose,
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(format!(
                    "Copy-number likelihood threshold must be within [0, 1], got {}",
                    threshold
                ));
            }
        }

        Ok(())
    }

    /// Index into `variant_sites` for a haplotype position.
    pub fn variant_index(&self, pos: usize) -> Option<usize> {
        self.variant_sites.iter().position(|&site| site == pos)
    }
}
