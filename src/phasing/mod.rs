pub mod assembler;
pub mod classifier;
pub mod depth;
pub mod haplotype;
pub mod reads;
pub mod region;
pub mod sample;
pub mod workflows;
pub mod writers;
