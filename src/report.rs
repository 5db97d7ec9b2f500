//! Human-readable and CSV output of an [`Evaluation`].

use std::io::{self, Write};

use crate::evaluate::Evaluation;

const RULE: &str = "------------------------------------------------";

/// Print `distance` in eight characters, trading decimals for integer digits.
fn format_distance(distance: f64) -> String {
    let mut precision = 6;
    let mut limit = 10.0;
    while distance >= limit && precision > 0 {
        precision -= 1;
        limit *= 10.0;
    }
    format!("{distance:8.precision$}")
}

/// Write the score summary: atom counts, RMSD and LS-score.
pub fn write_summary<W: Write>(out: &mut W, eval: &Evaluation) -> io::Result<()> {
    writeln!(out, "Structure 1: {} atoms.", eval.query_atoms)?;
    writeln!(out, "Structure 2: {} atoms.", eval.template_atoms)?;
    writeln!(out)?;
    writeln!(out, "RMSD: {:8.6}", eval.rmsd)?;
    writeln!(out, "LS-score: {:8.6} (d0 = {:8.6})", eval.ls_score, eval.d0)?;
    if eval.timed_out {
        writeln!(out, "Warning: the time budget ran out; the mapping may not be optimal.")?;
    }
    Ok(())
}

/// Write the per-atom distance table of the best mapping.
pub fn write_table<W: Write>(out: &mut W, eval: &Evaluation) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Distances of the best atom mapping:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "         Structure 1                Structure 2 ")?;
    writeln!(out, "        -------------              -------------")?;
    writeln!(out, "ind.    oind.   aname   distance   oind.   aname")?;
    writeln!(out, "{RULE}")?;
    for (i, pair) in eval.alignment.iter().enumerate() {
        writeln!(
            out,
            "{:4}    {:5}    {:>4}   {}   {:5}    {:>4}",
            i + 1,
            pair.query_original,
            pair.query_name,
            format_distance(pair.distance()),
            pair.template_original,
            pair.template_name,
        )?;
    }
    writeln!(out, "{RULE}")?;
    writeln!(out, "* 'oind': atom index in input file")?;
    writeln!(out, "* 'aname': atom name in input file")?;
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// Write the mapping as CSV, one row per query atom.
pub fn write_csv<W: Write>(out: W, eval: &Evaluation) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "query_index",
        "query_original",
        "query_name",
        "template_index",
        "template_original",
        "template_name",
        "distance",
    ])?;
    for pair in &eval.alignment {
        writer.write_record([
            pair.query_index.to_string(),
            pair.query_original.to_string(),
            pair.query_name.clone(),
            pair.template_index.to_string(),
            pair.template_original.to_string(),
            pair.template_name.clone(),
            format!("{:.6}", pair.distance()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
