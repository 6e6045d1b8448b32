use super::region_config;
use crate::cli::PhaseArgs;
use crate::phasing::{reads::read_fragments_from_path, workflows::analyze_fragments, writers::TsvWriter};
use crate::utils::Result;

pub fn phase(args: PhaseArgs) -> Result<()> {
    let region = region_config(&args.region)?;
    let fragments = read_fragments_from_path(&args.fragments_path, region.num_sites)?;
    log::info!(
        "{}: {} fragments, total_cn={}",
        args.sample_name,
        fragments.len(),
        args.total_cn
    );

    let calls = analyze_fragments(&fragments, args.total_cn, &region);

    let mut writer = match &args.output_path {
        Some(path) => TsvWriter::new(path)?,
        None => TsvWriter::to_stdout()?,
    };
    writer.write(&args.sample_name, &calls)?;
    writer.flush()
}
