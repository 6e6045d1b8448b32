use gbaphase::{
    cli::{PhaseArgs, RegionArgs},
    commands::phase::phase,
    phasing::{
        haplotype::Haplotype, reads::read_fragments_from_path, region::RegionConfig,
        workflows::analyze_fragments,
    },
    utils::Preset,
};
use std::{fs, io::Write, path::Path};

/// Every 3-site window of each copy, `depth` times.
fn tiled_fragment_lines(copies: &[&str], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (copy_index, copy) in copies.iter().enumerate() {
        for start in 0..=copy.len() - 3 {
            let window: String = copy
                .char_indices()
                .map(|(i, c)| if (start..start + 3).contains(&i) { c } else { 'x' })
                .collect();
            for read in 0..depth {
                lines.push(format!("copy{}_{}_{}\t{}", copy_index, start, read, window));
            }
        }
    }
    lines
}

fn write_fragments(path: &Path, lines: &[String]) {
    let mut file = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

fn region_args() -> RegionArgs {
    RegionArgs {
        preset: Preset::Gba,
        cn_threshold: None,
        cn_threshold_loose: None,
    }
}

fn data_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with("##"))
        .skip(1)
        .map(|l| l.split('\t').map(|f| f.to_string()).collect())
        .collect()
}

#[test]
fn phase_command_reports_trusted_carrier() {
    let dir = tempfile::tempdir().unwrap();
    let fragments_path = dir.path().join("fragments.tsv");
    let output_path = dir.path().join("calls.tsv");
    write_fragments(
        &fragments_path,
        &tiled_fragment_lines(&["1111112111", "1111111111", "2222222222"], 5),
    );

    phase(PhaseArgs {
        fragments_path,
        total_cn: 3,
        output_path: Some(output_path.to_string_lossy().to_string()),
        sample_name: "HG002".to_string(),
        region: region_args(),
    })
    .unwrap();

    let rows = data_rows(&output_path);
    assert_eq!(rows.len(), 2);
    let carrier_row = rows.iter().find(|r| r[1] == "1111112111").unwrap();
    assert_eq!(carrier_row[0], "HG002");
    assert_eq!(carrier_row[2], "D448H");
    assert_eq!(carrier_row[3], "true");
    assert_eq!(carrier_row[4], "true");
    assert!(carrier_row[6].starts_with("6-7:10/30:"));

    let pseudogene_row = rows.iter().find(|r| r[1] == "2222222222").unwrap();
    assert_eq!(pseudogene_row[2], "c.1263del+RecTL");
}

#[test]
fn phase_command_rejects_malformed_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let fragments_path = dir.path().join("fragments.tsv");
    write_fragments(&fragments_path, &["r1\txx11x".to_string()]);

    let err = phase(PhaseArgs {
        fragments_path,
        total_cn: 3,
        output_path: Some(dir.path().join("calls.tsv").to_string_lossy().to_string()),
        sample_name: "s".to_string(),
        region: region_args(),
    })
    .unwrap_err();
    assert!(err.contains("expected 10 sites"));
}

#[test]
fn fragments_from_file_match_in_memory_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let fragments_path = dir.path().join("fragments.tsv");
    let lines = tiled_fragment_lines(&["1122111111", "1111111111", "1111111111", "1111111111"], 3);
    write_fragments(&fragments_path, &lines);

    let region = RegionConfig::gba();
    let from_file = read_fragments_from_path(&fragments_path, region.num_sites).unwrap();
    let in_memory: Vec<Haplotype> = lines
        .iter()
        .map(|l| l.split('\t').nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(from_file, in_memory);

    let calls = analyze_fragments(&from_file, 4, &region);
    assert_eq!(calls.calls.len(), 1);
    assert_eq!(calls.calls[0].variants, vec!["RecNciI"]);
    assert!(!calls.deletion_bp_in_gene);
}
