use crate::utils::Result;

/// Zero-based, half-open interval on a contig.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicRegion {
    pub contig: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicRegion {
    pub fn new(contig: impl Into<String>, start: u32, end: u32) -> Result<Self> {
        if start >= end {
            return Err(format!("Invalid region: start {} >= end {}", start, end));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    /// Parses `contig:start-end`.
    pub fn from_string(encoding: &str) -> Result<Self> {
        let error_msg = || format!("Invalid region encoding: {}", encoding);
        let (contig, span) = encoding.rsplit_once(':').ok_or_else(error_msg)?;
        let (start, end) = span.split_once('-').ok_or_else(error_msg)?;
        if contig.is_empty() || contig.contains(':') {
            return Err(error_msg());
        }

        let start: u32 = start.parse().map_err(|_| error_msg())?;
        let end: u32 = end.parse().map_err(|_| error_msg())?;

        Self::new(contig, start, end)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::GenomicRegion;

    #[test]
    fn parse_single_base_region() {
        let region = GenomicRegion::from_string("chr1:155235000-155235001").unwrap();
        assert_eq!(region.contig, "chr1");
        assert_eq!(region.start, 155235000);
        assert_eq!(region.len(), 1);
    }

    #[test]
    fn reject_extra_separators() {
        assert_eq!(
            GenomicRegion::from_string("chr:1:100-200"),
            Err("Invalid region encoding: chr:1:100-200".to_string())
        );
        assert!(GenomicRegion::from_string("chr1:100").is_err());
    }

    #[test]
    fn reject_non_numeric_start() {
        assert_eq!(
            GenomicRegion::from_string("chr1:a-200"),
            Err("Invalid region encoding: chr1:a-200".to_string())
        );
    }

    #[test]
    fn reject_empty_interval() {
        assert_eq!(
            GenomicRegion::from_string("chr1:200-200"),
            Err("Invalid region: start 200 >= end 200".to_string())
        );
        assert!(GenomicRegion::new("chr1", 200, 100).is_err());
    }
}
