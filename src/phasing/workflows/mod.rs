mod sample;

pub use sample::{analyze_fragments, analyze_sample, Params};
