use crate::utils::{open_text_reader, GenomicRegion, Result};
use std::{collections::HashMap, io::BufRead, path::Path};

/// One differentiating site; `ref_base` marks the gene allele (`1`) and
/// `alt_base` the variant allele (`2`).
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: String,
    pub region: GenomicRegion,
    pub ref_base: u8,
    pub alt_base: u8,
}

impl Site {
    pub fn from_line(line: &str) -> Result<Self> {
        const EXPECTED_FIELD_COUNT: usize = 4;
        let split_line: Vec<&str> = line.split_whitespace().collect();
        if split_line.len() != EXPECTED_FIELD_COUNT {
            return Err(format!(
                "Expected {} fields in the format 'chrom start end info', found {}: {}",
                EXPECTED_FIELD_COUNT,
                split_line.len(),
                line
            ));
        }

        let (chrom, start, end, info_fields) = match &split_line[..] {
            [chrom, start, end, info_fields] => (*chrom, *start, *end, *info_fields),
            _ => unreachable!(),
        };

        let region = GenomicRegion::from_string(&format!("{}:{}-{}", chrom, start, end))?;
        if region.len() != 1 {
            return Err(format!(
                "Site {}:{}-{} must span exactly one base",
                chrom, start, end
            ));
        }

        let fields = decode_fields(info_fields)?;
        let get_field = |key: &str| {
            fields
                .get(key)
                .ok_or_else(|| format!("{} field missing", key))
                .map(|s| s.to_string())
        };

        let id = get_field("ID")?;
        let ref_base = decode_base(&get_field("REF")?)?;
        let alt_base = decode_base(&get_field("ALT")?)?;
        if ref_base == alt_base {
            return Err(format!("REF and ALT bases are identical for site {}", id));
        }

        Ok(Site {
            id,
            region,
            ref_base,
            alt_base,
        })
    }
}

/// Ordered sites of the region; position in the catalog is the haplotype index.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteCatalog {
    pub sites: Vec<Site>,
}

impl SiteCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_text_reader(path)?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut sites = Vec::new();
        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let site = Site::from_line(&line)
                .map_err(|e| format!("Error at sites line {}: {}", line_number + 1, e))?;
            sites.push(site);
        }

        if sites.is_empty() {
            return Err("Site catalog is empty".to_string());
        }
        Ok(Self { sites })
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn check_site_count(&self, expected: usize) -> Result<()> {
        if self.len() != expected {
            return Err(format!(
                "Site catalog lists {} sites but the region expects {}",
                self.len(),
                expected
            ));
        }
        Ok(())
    }
}

fn decode_base(encoding: &str) -> Result<u8> {
    match encoding.to_ascii_uppercase().as_bytes() {
        [base @ (b'A' | b'C' | b'G' | b'T')] => Ok(*base),
        _ => Err(format!("Invalid base '{}'", encoding)),
    }
}

fn decode_fields(info_fields: &str) -> Result<HashMap<&str, String>> {
    let mut fields = HashMap::new();
    for field_encoding in info_fields.split(';') {
        let (name, value) = decode_info_field(field_encoding)?;
        if fields.insert(name, value.to_string()).is_some() {
            return Err(format!("Duplicate field name: '{}'", name));
        }
    }
    Ok(fields)
}

fn decode_info_field(encoding: &str) -> Result<(&str, &str)> {
    let error_message = || format!("Field must be in 'name=value' format: '{}'", encoding);
    match encoding.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => Ok((name, value)),
        _ => Err(error_message()),
    }
}
