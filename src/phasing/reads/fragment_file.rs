use crate::phasing::haplotype::Haplotype;
use crate::utils::{open_text_reader, Result};
use std::{io::BufRead, path::Path};

/// Reads one fragment per line, either `name<TAB>haplotype` or a bare haplotype.
pub fn read_fragments<R: BufRead>(reader: R, num_sites: usize) -> Result<Vec<Haplotype>> {
    let mut fragments = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let encoding = match line.rsplit_once('\t') {
            Some((_name, hap)) => hap,
            None => line,
        };
        let fragment = encoding
            .parse::<Haplotype>()
            .map_err(|e| format!("Error at fragments line {}: {}", line_number + 1, e))?;
        if fragment.len() != num_sites {
            return Err(format!(
                "Error at fragments line {}: expected {} sites, found {}",
                line_number + 1,
                num_sites,
                fragment.len()
            ));
        }
        fragments.push(fragment);
    }
    Ok(fragments)
}

pub fn read_fragments_from_path(path: &Path, num_sites: usize) -> Result<Vec<Haplotype>> {
    let reader = open_text_reader(path)?;
    read_fragments(reader, num_sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_named_and_bare_fragments() {
        let data = "read1\txx11xxxxxx\n# comment\nxxxxxx21xx\n\n";
        let fragments = read_fragments(std::io::Cursor::new(data), 10).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].to_string(), "xx11xxxxxx");
        assert_eq!(fragments[1].to_string(), "xxxxxx21xx");
    }

    #[test]
    fn reject_fragments_of_wrong_length() {
        let data = "read1\txx11xxxxxx\nread2\txx11\n";
        let err = read_fragments(std::io::Cursor::new(data), 10).unwrap_err();
        assert_eq!(err, "Error at fragments line 2: expected 10 sites, found 4");
    }

    #[test]
    fn reject_invalid_symbols() {
        let data = "read1\txx13xxxxxx\n";
        assert!(read_fragments(std::io::Cursor::new(data), 10).is_err());
    }
}
