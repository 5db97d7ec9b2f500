//! Error types for loading ligands and evaluating poses.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or parse a ligand file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} input at line {line}: {reason}")]
    Malformed {
        format: &'static str,
        line: usize,
        reason: String,
    },

    #[error("no atoms left after loading")]
    NoAtoms,

    #[error("in {path:?}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Attach the offending file's path to a parse error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            e @ (LoadError::Io { .. } | LoadError::InFile { .. }) => e,
            e => LoadError::InFile {
                path: path.into(),
                source: Box::new(e),
            },
        }
    }
}

/// Failure to evaluate a query pose against its template.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("the ligands have different atom counts ({query} in query, {template} in template)")]
    AtomCountMismatch { query: usize, template: usize },

    #[error("the ligands do not share the same topology: query atom {query_atom} has no equivalent template group")]
    UnmatchedGroup { query_atom: usize },

    #[error("the ligands do not share the same topology: no complete mapping for a group of {group_size} atoms{}", budget_note(.timed_out))]
    NoCompleteMapping { group_size: usize, timed_out: bool },

    #[error("query atom {query_atom} is {problem} in the final alignment")]
    InconsistentAlignment {
        query_atom: usize,
        problem: &'static str,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

fn budget_note(timed_out: &bool) -> &'static str {
    if *timed_out {
        " before the time budget ran out"
    } else {
        ""
    }
}
