use super::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip")
}

/// Opens a plain or gzip-compressed text file for line reading.
pub fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if !is_gzipped(path) {
        return Ok(BufReader::new(Box::new(file)));
    }
    let gz_decoder = MultiGzDecoder::new(file);
    if gz_decoder.header().is_none() {
        return Err(format!("Invalid gzip header: {}", path.to_string_lossy()));
    }
    Ok(BufReader::new(Box::new(gz_decoder)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{BufRead, Write};

    #[test]
    fn read_gzipped_and_plain_files_alike() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("sites.bed");
        std::fs::write(&plain, "a\nb\n").unwrap();

        let gzipped = dir.path().join("sites.bed.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(b"a\nb\n").unwrap();
        encoder.finish().unwrap();

        for path in [plain, gzipped] {
            let lines: Vec<String> = open_text_reader(&path)
                .unwrap()
                .lines()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(lines, vec!["a", "b"]);
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = open_text_reader(Path::new("/nonexistent/manifest.tsv")).err().unwrap();
        assert!(err.starts_with("/nonexistent/manifest.tsv"));
    }
}
