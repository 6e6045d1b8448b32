mod allele;
pub mod fragments;

pub use allele::{Allele, Haplotype, Transition};
pub use fragments::{Direction, HaplotypeGroups, JoinSupport, PatternCounts};
