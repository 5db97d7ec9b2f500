//! Test pose scores against the reference poses in data/.

use std::{path::Path, time::Duration};

use clap::ValueEnum;
use csv::Reader;

use posematch::{
    evaluate::{evaluate_files, EvalConfig, ParallelMode},
    loader::{FileFormat, LoadOptions},
    search::Objective,
};

const TOLERANCE: f64 = 1e-6;

struct Reference {
    query: String,
    template: String,
    format: FileFormat,
    objective: Objective,
    hydrogens: bool,
    rmsd: f64,
    ls_score: f64,
}

fn load_reference() -> Vec<Reference> {
    // Set up CSV reader for data/reference.csv.
    let mut reader =
        Reader::from_path(Path::new("data").join("reference.csv")).expect("reference.csv does not exist.");

    // Load expected score records.
    let mut references = Vec::new();
    for result in reader.records() {
        let record = result.expect("reference.csv is malformed.");
        references.push(Reference {
            query: record[0].to_string(),
            template: record[1].to_string(),
            format: <FileFormat as ValueEnum>::from_str(&record[2], true).expect("unknown format"),
            objective: <Objective as ValueEnum>::from_str(&record[3], true).expect("unknown objective"),
            hydrogens: record[4].parse().expect("non-boolean hydrogens flag"),
            rmsd: record[5].parse().expect("non-numeric rmsd"),
            ls_score: record[6].parse().expect("non-numeric ls_score"),
        });
    }
    references
}

fn test_reference_poses(parallel: ParallelMode) {
    // Score every reference pair and track those whose scores differ from
    // the expected values.
    let mut incorrect = Vec::new();
    for reference in load_reference() {
        let options = LoadOptions {
            hydrogens: reference.hydrogens,
            ..LoadOptions::default()
        };
        let config = EvalConfig {
            objective: reference.objective,
            time_budget: Duration::from_secs(60),
            parallel,
        };
        let eval = evaluate_files(
            &Path::new("data").join(&reference.query),
            &Path::new("data").join(&reference.template),
            Some(reference.format),
            &options,
            &config,
        )
        .unwrap_or_else(|e| panic!("failed to score {}: {e}", reference.query));

        assert!(!eval.timed_out, "{} timed out", reference.query);
        if (eval.rmsd - reference.rmsd).abs() > TOLERANCE
            || (eval.ls_score - reference.ls_score).abs() > TOLERANCE
        {
            incorrect.push((reference, eval.rmsd, eval.ls_score));
        }
    }

    // If any scores are off, report and fail the test.
    let mut error_details = String::new();
    for (reference, rmsd, ls_score) in &incorrect {
        error_details.push_str(&format!(
            "{} ({:?}, hydrogens = {}): rmsd {rmsd:.9} != {:.9}, ls-score {ls_score:.9} != {:.9}\n",
            reference.query, reference.objective, reference.hydrogens, reference.rmsd, reference.ls_score
        ));
    }
    assert!(incorrect.is_empty(), "{}", error_details);
}

#[test]
fn reference_poses() {
    test_reference_poses(ParallelMode::Always);
}

#[test]
fn reference_poses_serial() {
    test_reference_poses(ParallelMode::None);
}

#[test]
fn format_inferred_from_extension() {
    let eval = evaluate_files(
        Path::new("data/ethanol_query.sdf"),
        Path::new("data/ethanol_template.sdf"),
        None,
        &LoadOptions::default(),
        &EvalConfig::default(),
    )
    .expect("failed to score ethanol");
    assert_eq!(eval.query_atoms, 3);
    assert!((eval.rmsd - 0.087462925).abs() < TOLERANCE);
}

#[test]
fn alignment_is_a_bijection() {
    let eval = evaluate_files(
        Path::new("data/mesitylene_query.mol2"),
        Path::new("data/mesitylene_template.mol2"),
        None,
        &LoadOptions::default(),
        &EvalConfig::default(),
    )
    .expect("failed to score mesitylene");
    let mut templates: Vec<_> = eval.alignment.iter().map(|p| p.template_index).collect();
    templates.sort_unstable();
    assert_eq!(templates, (0..eval.template_atoms).collect::<Vec<_>>());
    assert!(eval
        .alignment
        .iter()
        .enumerate()
        .all(|(i, p)| p.query_index == i));
}
