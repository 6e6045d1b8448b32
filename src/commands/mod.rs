pub mod call;
pub mod phase;

use crate::cli::RegionArgs;
use crate::phasing::region::RegionConfig;
use crate::utils::Result;

fn region_config(args: &RegionArgs) -> Result<RegionConfig> {
    let region = RegionConfig::from_preset(args.preset)
        .with_thresholds(args.cn_threshold, args.cn_threshold_loose);
    region.validate()?;
    log::debug!(
        "Region {:?}: {} sites, thresholds {}/{}",
        args.preset,
        region.num_sites,
        region.cn_likelihood_threshold,
        region.cn_likelihood_threshold_loose
    );
    Ok(region)
}
