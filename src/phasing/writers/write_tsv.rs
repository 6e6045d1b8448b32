//! Defines the `TsvWriter` struct for writing per-haplotype carrier calls.
//!

use crate::phasing::{
    classifier::{SampleCalls, VariantCall},
    depth::DepthBlock,
};
use crate::utils::{join_or_missing, Result};
use std::{
    env,
    fs::File,
    io::{self, BufWriter, Write},
};

const COLUMNS: [&str; 7] = [
    "sample",
    "haplotype",
    "variants",
    "is_carrier",
    "sample_carrier",
    "deletion_bp_in_gene",
    "depth_blocks",
];

pub struct TsvWriter {
    writer: BufWriter<Box<dyn Write + Send>>,
}

impl TsvWriter {
    /// Creates `output_path` and writes the header.
    pub fn new(output_path: &str) -> Result<TsvWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Invalid TSV output path {}: {}", output_path, e))?;
        Self::from_writer(Box::new(file))
    }

    pub fn to_stdout() -> Result<TsvWriter> {
        Self::from_writer(Box::new(io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Result<TsvWriter> {
        let mut tsv_writer = TsvWriter {
            writer: BufWriter::new(writer),
        };
        tsv_writer.write_header()?;
        Ok(tsv_writer)
    }

    fn write_header(&mut self) -> Result<()> {
        let command_line = env::args().collect::<Vec<_>>().join(" ");
        writeln!(
            self.writer,
            "##{}Version={}\n##{}Command={}\n{}",
            env!("CARGO_PKG_NAME"),
            *crate::cli::FULL_VERSION,
            env!("CARGO_PKG_NAME"),
            command_line,
            COLUMNS.join("\t")
        )
        .map_err(|e| e.to_string())
    }

    /// Writes one row per variant call. A sample without calls still gets a
    /// row so that every analysed sample appears in the output.
    pub fn write(&mut self, sample_id: &str, calls: &SampleCalls) -> Result<()> {
        if calls.calls.is_empty() {
            return self.write_row(&[
                sample_id,
                ".",
                ".",
                "false",
                &calls.is_carrier.to_string(),
                &calls.deletion_bp_in_gene.to_string(),
                ".",
            ]);
        }
        for call in &calls.calls {
            self.write_call(sample_id, calls, call)?;
        }
        Ok(())
    }

    fn write_call(&mut self, sample_id: &str, calls: &SampleCalls, call: &VariantCall) -> Result<()> {
        self.write_row(&[
            sample_id,
            &call.haplotype.to_string(),
            &join_or_missing(&call.variants, ","),
            &call.is_carrier.to_string(),
            &calls.is_carrier.to_string(),
            &calls.deletion_bp_in_gene.to_string(),
            &join_or_missing(call.blocks.iter().map(encode_block), ";"),
        ])
    }

    fn write_row(&mut self, fields: &[&str]) -> Result<()> {
        writeln!(self.writer, "{}", fields.join("\t")).map_err(|e| e.to_string())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| e.to_string())
    }
}

/// `sites:gene/total:likelihood`, e.g. `6-7:10/30:0.9870`.
fn encode_block(block: &DepthBlock) -> String {
    let sites = block
        .sites
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("-");
    let likelihood = match block.likelihood {
        Some(l) => format!("{:.4}", l),
        None => ".".to_string(),
    };
    format!(
        "{}:{}/{}:{}",
        sites, block.gene_reads, block.total_reads, likelihood
    )
}
