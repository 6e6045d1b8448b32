use crate::utils::{open_text_reader, Result};
use crossbeam_channel::Sender;
use std::{
    io::BufRead,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub reads_path: PathBuf,
    pub total_cn: u32,
}

impl Sample {
    /// Parses a `sample<TAB>bam<TAB>total_cn` manifest line.
    pub fn from_line(line: &str) -> Result<Self> {
        const EXPECTED_FIELD_COUNT: usize = 3;
        let split_line: Vec<&str> = line.split('\t').map(|s| s.trim()).collect();
        let (id, reads_path, total_cn) = match &split_line[..] {
            [id, reads_path, total_cn] => (*id, *reads_path, *total_cn),
            _ => {
                return Err(format!(
                    "Expected {} tab-separated fields in the format 'sample bam total_cn', found {}: {}",
                    EXPECTED_FIELD_COUNT,
                    split_line.len(),
                    line
                ))
            }
        };

        if id.is_empty() {
            return Err("Sample name cannot be an empty string".to_string());
        }

        let total_cn = total_cn
            .parse::<u32>()
            .map_err(|e| format!("Invalid total copy number '{}': {}", total_cn, e))?;

        Ok(Sample {
            id: id.to_string(),
            reads_path: PathBuf::from(reads_path),
            total_cn,
        })
    }
}

fn is_skipped(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

pub fn stream_samples_into_channel(
    manifest_path: &Path,
    sender: Sender<Result<Sample>>,
) -> Result<()> {
    let reader = open_text_reader(manifest_path)?;

    for (line_number, result_line) in reader.lines().enumerate() {
        let line = match result_line {
            Ok(line) => line,
            Err(err) => {
                let error = format!("Error at manifest line {}: {}", line_number + 1, err);
                sender
                    .send(Err(error))
                    .map_err(|e| format!("Failed to send error through channel: {}", e))?;
                return Ok(());
            }
        };
        if is_skipped(&line) {
            continue;
        }

        let sample = Sample::from_line(&line)
            .map_err(|e| format!("Error at manifest line {}: {}", line_number + 1, e));
        sender
            .send(sample)
            .map_err(|e| format!("Failed to send sample through channel: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Write;

    #[test]
    fn parse_manifest_line() {
        let sample = Sample::from_line("NA12878\t/data/NA12878.bam\t4").unwrap();
        assert_eq!(sample.id, "NA12878");
        assert_eq!(sample.reads_path, PathBuf::from("/data/NA12878.bam"));
        assert_eq!(sample.total_cn, 4);
    }

    #[test]
    fn parse_manifest_line_rejects_bad_fields() {
        assert!(Sample::from_line("NA12878\t/data/NA12878.bam").is_err());
        assert!(Sample::from_line("NA12878\t/data/NA12878.bam\tfour").is_err());
        assert!(Sample::from_line("\t/data/NA12878.bam\t4").is_err());
    }

    #[test]
    fn stream_skips_comments_and_reports_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# sample\tbam\ttotal_cn").unwrap();
        writeln!(file, "s1\ts1.bam\t4").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "s2\ts2.bam").unwrap();
        writeln!(file, "s3\ts3.bam\t3").unwrap();
        file.flush().unwrap();

        let (sender, receiver) = unbounded();
        stream_samples_into_channel(file.path(), sender).unwrap();
        let results: Vec<_> = receiver.into_iter().collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, "s1");
        assert!(results[1]
            .as_ref()
            .unwrap_err()
            .starts_with("Error at manifest line 4"));
        assert_eq!(results[2].as_ref().unwrap().total_cn, 3);
    }
}
