use std::{path::Path, time::Duration};

use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    evaluate::{evaluate_files, EvalConfig, ParallelMode, DEFAULT_TIME_BUDGET},
    loader::{FileFormat, LoadOptions},
    search::Objective,
};

fn parse_format(format: Option<&str>) -> PyResult<Option<FileFormat>> {
    match format.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(None),
        Some("mol2") => Ok(Some(FileFormat::Mol2)),
        Some("sdf") => Ok(Some(FileFormat::Sdf)),
        Some("pdb") => Ok(Some(FileFormat::Pdb)),
        Some(other) => Err(PyValueError::new_err(format!("unknown format {other:?}"))),
    }
}

fn parse_objective(objective: &str) -> PyResult<Objective> {
    match objective.to_ascii_lowercase().as_str() {
        "rmsd" => Ok(Objective::Rmsd),
        "ls-score" | "lsscore" | "ls_score" => Ok(Objective::LsScore),
        other => Err(PyValueError::new_err(format!("unknown objective {other:?}"))),
    }
}

/// Score the pose in `query_path` against the one in `template_path` and
/// return `(rmsd, ls_score)`.
#[pyfunction]
#[pyo3(signature = (query_path, template_path, format=None, objective="rmsd", hydrogens=false, bond_types=true, max_minutes=None))]
fn evaluate(
    query_path: &str,
    template_path: &str,
    format: Option<&str>,
    objective: &str,
    hydrogens: bool,
    bond_types: bool,
    max_minutes: Option<f64>,
) -> PyResult<(f64, f64)> {
    let options = LoadOptions {
        hydrogens,
        bond_types,
    };
    let time_budget = match max_minutes {
        Some(m) if m.is_finite() && m > 0.0 => Duration::from_secs_f64(m * 60.0),
        Some(m) => {
            return Err(PyValueError::new_err(format!(
                "max_minutes must be positive, got {m}"
            )))
        }
        None => DEFAULT_TIME_BUDGET,
    };
    let config = EvalConfig {
        objective: parse_objective(objective)?,
        time_budget,
        parallel: ParallelMode::None,
    };

    let eval = evaluate_files(
        Path::new(query_path),
        Path::new(template_path),
        parse_format(format)?,
        &options,
        &config,
    )
    .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((eval.rmsd, eval.ls_score))
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn posematch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;

    Ok(())
}
