mod fragment_file;
mod pileup;
mod sites;

pub use fragment_file::{read_fragments, read_fragments_from_path};
pub use pileup::{call_base, extract_fragments, ReadFilter};
pub use sites::{Site, SiteCatalog};
