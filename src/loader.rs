//! Parse ligand poses from MOL2, SDF (V2000 molfile) and PDB files.
//!
//! All three parsers read the first molecule of their input, drop hydrogens
//! unless asked to keep them, and number kept atoms in file order. MOL2 and
//! SDF carry explicit bonds; PDB coordinates come without connectivity, so
//! every atom pair is marked [`BondType::Unknown`] and bonds are later
//! inferred from geometry.

use std::{collections::HashMap, fs, ops::Range, path::Path, str::FromStr};

use clap::ValueEnum;

use crate::{
    error::LoadError,
    ligand::{Atom, BondType, Ligand},
};

/// Supported ligand file formats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum FileFormat {
    /// Tripos MOL2.
    Mol2,
    /// MDL SDF / molfile, V2000 connection table.
    Sdf,
    /// PDB `ATOM`/`HETATM` records.
    Pdb,
}

impl FileFormat {
    /// Guess the format from a file extension, falling back to MOL2.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("sdf" | "sd" | "mol") => FileFormat::Sdf,
            Some("pdb" | "ent") => FileFormat::Pdb,
            _ => FileFormat::Mol2,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FileFormat::Mol2 => "MOL2",
            FileFormat::Sdf => "SDF",
            FileFormat::Pdb => "PDB",
        }
    }
}

/// Options shared by all parsers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep hydrogen atoms.
    pub hydrogens: bool,
    /// Record bond orders; when unset every bond is recorded as single.
    pub bond_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            hydrogens: false,
            bond_types: true,
        }
    }
}

/// Read and parse the ligand stored at `path`.
pub fn load(path: &Path, format: FileFormat, options: &LoadOptions) -> Result<Ligand, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match format {
        FileFormat::Mol2 => parse_mol2_str(&contents, options),
        FileFormat::Sdf => parse_sdf_str(&contents, options),
        FileFormat::Pdb => parse_pdb_str(&contents, options),
    };
    parsed.map_err(|e| e.in_file(path))
}

fn malformed(format: FileFormat, line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        format: format.name(),
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: FromStr>(
    text: &str,
    format: FileFormat,
    line: usize,
    what: &str,
) -> Result<T, LoadError> {
    text.trim()
        .parse()
        .map_err(|_| malformed(format, line, format!("invalid {what} {:?}", text.trim())))
}

/// Fixed-width column of `line`, clipped to the line's length.
fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).unwrap_or("")
}

fn parse_coords(
    fields: [&str; 3],
    format: FileFormat,
    line: usize,
) -> Result<[f64; 3], LoadError> {
    Ok([
        parse_field(fields[0], format, line, "x coordinate")?,
        parse_field(fields[1], format, line, "y coordinate")?,
        parse_field(fields[2], format, line, "z coordinate")?,
    ])
}

fn mol2_bond_type(code: &str, bond_types: bool) -> BondType {
    let bond = match code.to_ascii_lowercase().as_str() {
        "1" => BondType::Single,
        "2" => BondType::Double,
        "3" => BondType::Triple,
        "am" => BondType::Amide,
        "ar" => BondType::Aromatic,
        "du" => BondType::Dummy,
        "nc" => BondType::NotConnected,
        _ => BondType::Single,
    };
    if bond_types || bond == BondType::NotConnected {
        bond
    } else {
        BondType::Single
    }
}

/// Parse the first molecule of a Tripos MOL2 file.
pub fn parse_mol2_str(input: &str, options: &LoadOptions) -> Result<Ligand, LoadError> {
    const FORMAT: FileFormat = FileFormat::Mol2;

    enum Section {
        Atom,
        Bond,
        Other,
    }

    let mut section = Section::Other;
    let mut seen_molecule = false;
    let mut atoms = Vec::new();
    let mut kept: HashMap<usize, usize> = HashMap::new();
    let mut bonds = Vec::new();

    for (line_no, line) in input.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        if let Some(tag) = line.trim().strip_prefix("@<TRIPOS>") {
            section = match tag.trim() {
                "ATOM" => Section::Atom,
                "BOND" => Section::Bond,
                "MOLECULE" if seen_molecule => break,
                "MOLECULE" => {
                    seen_molecule = true;
                    Section::Other
                }
                _ => Section::Other,
            };
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match section {
            Section::Atom => {
                if fields.len() < 6 {
                    continue;
                }
                let id: usize = parse_field(fields[0], FORMAT, line_no, "atom id")?;
                let coords = parse_coords([fields[2], fields[3], fields[4]], FORMAT, line_no)?;
                let simple_type = fields[5].split_once('.').map_or(fields[5], |(t, _)| t);
                let atom = Atom::new(fields[1], simple_type, coords, id);
                if atom.is_hydrogen() && !options.hydrogens {
                    continue;
                }
                kept.insert(id, atoms.len());
                atoms.push(atom);
            }
            Section::Bond => {
                if fields.len() < 4 {
                    continue;
                }
                let a: usize = parse_field(fields[1], FORMAT, line_no, "bond origin")?;
                let b: usize = parse_field(fields[2], FORMAT, line_no, "bond target")?;
                // Bonds to dropped atoms are dropped too.
                let (Some(&i), Some(&j)) = (kept.get(&a), kept.get(&b)) else {
                    continue;
                };
                bonds.push((i, j, mol2_bond_type(fields[3], options.bond_types)));
            }
            Section::Other => {}
        }
    }

    if atoms.is_empty() {
        return Err(LoadError::NoAtoms);
    }
    let mut lig = Ligand::new(atoms);
    for (i, j, bond) in bonds {
        lig.add_bond(i, j, bond);
    }
    Ok(lig)
}

/// Parse the first molecule of an SDF file (V2000 connection table).
pub fn parse_sdf_str(input: &str, options: &LoadOptions) -> Result<Ligand, LoadError> {
    const FORMAT: FileFormat = FileFormat::Sdf;

    let lines: Vec<&str> = input.lines().collect();
    let Some(counts) = lines.get(3) else {
        return Err(malformed(FORMAT, lines.len(), "missing counts line"));
    };
    let num_atoms: usize = parse_field(column(counts, 0..3), FORMAT, 4, "atom count")?;
    let num_bonds: usize = parse_field(column(counts, 3..6), FORMAT, 4, "bond count")?;
    let bond_start = 4 + num_atoms;
    if lines.len() < bond_start + num_bonds {
        return Err(malformed(
            FORMAT,
            lines.len(),
            format!("expected {num_atoms} atom and {num_bonds} bond lines"),
        ));
    }

    let mut atoms = Vec::with_capacity(num_atoms);
    let mut kept: Vec<Option<usize>> = Vec::with_capacity(num_atoms);
    for (k, line) in lines[4..bond_start].iter().enumerate() {
        let line_no = k + 5;
        let coords = parse_coords(
            [column(line, 0..10), column(line, 10..20), column(line, 20..30)],
            FORMAT,
            line_no,
        )?;
        let Some(symbol) = column(line, 30..line.len()).split_whitespace().next() else {
            return Err(malformed(FORMAT, line_no, "missing element symbol"));
        };
        let atom = Atom::new(symbol, symbol, coords, k + 1);
        if atom.is_hydrogen() && !options.hydrogens {
            kept.push(None);
            continue;
        }
        kept.push(Some(atoms.len()));
        atoms.push(atom);
    }

    let mut bonds = Vec::with_capacity(num_bonds);
    for (k, line) in lines[bond_start..bond_start + num_bonds].iter().enumerate() {
        let line_no = bond_start + k + 1;
        let a: usize = parse_field(column(line, 0..3), FORMAT, line_no, "bond origin")?;
        let b: usize = parse_field(column(line, 3..6), FORMAT, line_no, "bond target")?;
        let code: u8 = parse_field(column(line, 6..9), FORMAT, line_no, "bond type")?;

        let endpoint = |x: usize| {
            x.checked_sub(1)
                .and_then(|x| kept.get(x).copied())
                .ok_or_else(|| malformed(FORMAT, line_no, format!("no atom {x}")))
        };
        let (Some(i), Some(j)) = (endpoint(a)?, endpoint(b)?) else {
            continue;
        };

        let bond = if !options.bond_types {
            BondType::Single
        } else {
            match code {
                1 => BondType::Single,
                2 => BondType::Double,
                3 => BondType::Triple,
                4 => BondType::Aromatic,
                _ => BondType::Unknown,
            }
        };
        bonds.push((i, j, bond));
    }

    if atoms.is_empty() {
        return Err(LoadError::NoAtoms);
    }
    let mut lig = Ligand::new(atoms);
    for (i, j, bond) in bonds {
        lig.add_bond(i, j, bond);
    }
    Ok(lig)
}

/// Element of a PDB atom whose element columns are blank, guessed from the
/// four-character atom name field. Names of one-letter elements start in the
/// field's second column (` C1 `, `1HG `), two-letter ones in the first
/// (`CL1 `).
fn element_from_atom_name(field: &str) -> String {
    let letters = field
        .chars()
        .skip_while(|c| !c.is_ascii_alphabetic())
        .take_while(|c| c.is_ascii_alphabetic());
    if field.starts_with(|c: char| c.is_ascii_alphabetic()) {
        letters.take(2).collect()
    } else {
        letters.take(1).collect()
    }
}

/// Parse the `ATOM`/`HETATM` records of the first model of a PDB file.
pub fn parse_pdb_str(input: &str, options: &LoadOptions) -> Result<Ligand, LoadError> {
    const FORMAT: FileFormat = FileFormat::Pdb;

    let mut atoms = Vec::new();
    for (line_no, line) in input.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        if line.starts_with("END") {
            break;
        }
        if !(line.starts_with("ATOM") || line.starts_with("HETATM")) || line.len() < 54 {
            continue;
        }

        let coords = parse_coords(
            [column(line, 30..38), column(line, 38..46), column(line, 46..54)],
            FORMAT,
            line_no,
        )?;
        let serial: usize = parse_field(column(line, 6..11), FORMAT, line_no, "atom serial")?;
        let name_field = column(line, 12..16);
        let element = match column(line, 76..78).trim() {
            "" => element_from_atom_name(name_field),
            e => e.to_string(),
        };
        let name = name_field.trim();

        let atom = Atom::new(name, &element, coords, serial);
        if atom.is_hydrogen() && !options.hydrogens {
            continue;
        }
        atoms.push(atom);
    }

    if atoms.is_empty() {
        return Err(LoadError::NoAtoms);
    }
    Ok(Ligand::with_unknown_connectivity(atoms))
}
