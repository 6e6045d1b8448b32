use crate::utils::Result;
use rust_htslib::bam::{self, Read};
use std::{collections::HashSet, path::Path};

pub fn is_bam_mapped(bam_header: &bam::Header) -> bool {
    // Fetching by region needs @SQ lines in the header.
    String::from_utf8_lossy(&bam_header.to_bytes())
        .lines()
        .any(|line| line.starts_with("@SQ"))
}

/// Opens a coordinate-sorted, indexed BAM or CRAM for region queries.
pub fn open_indexed_bam(reads_path: &Path) -> Result<bam::IndexedReader> {
    let bam = bam::IndexedReader::from_path(reads_path)
        .map_err(|e| format!("Failed to open {}: {}", reads_path.display(), e))?;
    let header = bam::Header::from_template(bam.header());
    if !is_bam_mapped(&header) {
        return Err(format!(
            "Input is not aligned to a reference: {}",
            reads_path.display()
        ));
    }
    Ok(bam)
}

/// Sample name from the `SM` tags of the read groups, if exactly one is present.
pub fn get_sample_name(bam_header: &bam::Header) -> Option<String> {
    let header_hashmap = bam_header.to_hashmap();
    let sample_names: HashSet<String> = header_hashmap
        .get("RG")
        .into_iter()
        .flatten()
        .filter_map(|rg_field| rg_field.get("SM").cloned())
        .collect();

    match sample_names.len() {
        1 => sample_names.into_iter().next(),
        0 => {
            log::debug!("No sample names found");
            None
        }
        _ => {
            log::warn!("Multiple sample names found");
            None
        }
    }
}
