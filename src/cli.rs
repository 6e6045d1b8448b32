use crate::utils::{Preset, Result};
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="gbaphase",
          version=&**FULL_VERSION,
          about="GBA haplotype assembler and carrier caller",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2021-{}
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Phase and classify samples from aligned reads")]
    Call(CallArgs),
    #[clap(about = "Phase and classify a single sample from pre-computed fragments")]
    Phase(PhaseArgs),
}

/// Calling parameters shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct RegionArgs {
    #[clap(help_heading("Advanced"))]
    #[clap(long = "preset")]
    #[clap(value_name = "PRESET")]
    #[clap(help = "Gene region to phase")]
    #[clap(default_value = "gba")]
    pub preset: Preset,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "cn-threshold")]
    #[clap(value_name = "PROB")]
    #[clap(help = "Minimum single-copy likelihood to call a carrier")]
    #[arg(value_parser = ensure_unit_float)]
    pub cn_threshold: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "cn-threshold-loose")]
    #[clap(value_name = "PROB")]
    #[clap(help = "Single-copy likelihood threshold for trusted haplotypes")]
    #[arg(value_parser = ensure_unit_float)]
    pub cn_threshold_loose: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("call")))]
#[command(arg_required_else_help(true))]
pub struct CallArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "manifest")]
    #[clap(help = "Tab-separated manifest: sample, BAM path, total copy number")]
    #[clap(value_name = "MANIFEST")]
    #[arg(value_parser = check_file_exists)]
    pub manifest_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "sites")]
    #[clap(help = "BED file with differentiating site coordinates")]
    #[clap(value_name = "SITES")]
    #[arg(value_parser = check_file_exists)]
    pub sites_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-mapq")]
    #[clap(value_name = "MAPQ")]
    #[clap(help = "Minimum mapping quality of reads used for phasing")]
    #[clap(default_value = "0")]
    pub min_mapq: u8,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-baseq")]
    #[clap(value_name = "BASEQ")]
    #[clap(help = "Minimum base quality at a site")]
    #[clap(default_value = "10")]
    pub min_baseq: u8,

    #[command(flatten)]
    pub region: RegionArgs,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("phase")))]
#[command(arg_required_else_help(true))]
pub struct PhaseArgs {
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "fragments")]
    #[clap(help = "Fragments file, one haplotype string per line")]
    #[clap(value_name = "FRAGMENTS")]
    #[arg(value_parser = check_file_exists)]
    pub fragments_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "total-cn")]
    #[clap(help = "Total copy number of gene and pseudogene")]
    #[clap(value_name = "CN")]
    #[arg(value_parser = total_cn_in_range)]
    pub total_cn: u32,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output TSV path (default: stdout)")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<String>,

    #[clap(long = "sample-name")]
    #[clap(value_name = "SAMPLE_NAME")]
    #[clap(help = "Sample name")]
    #[clap(default_value = "sample")]
    #[arg(value_parser = check_sample_name_nonempty)]
    pub sample_name: String,

    #[command(flatten)]
    pub region: RegionArgs,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn total_cn_in_range(s: &str) -> Result<u32> {
    let total_cn: u32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid copy number", s))?;
    if total_cn >= 1 {
        Ok(total_cn)
    } else {
        Err("Total copy number must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_sample_name_nonempty(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        Err("Sample name cannot be an empty string".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}
