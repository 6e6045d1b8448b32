mod bam_utils;
mod io_utils;
mod math;
mod presets;
mod readers;
mod region;
mod util;

pub use bam_utils::{get_sample_name, is_bam_mapped, open_indexed_bam};
pub use io_utils::create_writer;
pub use math::{gene_cn_posteriors, log_sum_exp, single_copy_likelihood, READ_ERROR_RATE};
pub use presets::Preset;
pub use readers::open_text_reader;
pub use region::GenomicRegion;
pub use util::{handle_error_and_exit, join_or_missing, Result};
