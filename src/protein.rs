//! Protein sequence and backbone geometry parsed from PDB files.

use crate::{AMINO_ACIDS, error::AnnotatorError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A protein as this session sees it: the one-letter sequence plus one
/// alpha-carbon position per residue for the structure panel.
///
/// Parsing walks `ATOM` records in file order and counts a residue once per
/// (chain id, residue sequence number) pair, the way the sequence was
/// extracted when the record was first stored. Non-standard residue names
/// become `X`.
#[derive(Clone, Debug, Default)]
pub struct ProteinSequence {
    name: Option<String>,
    sequence: String,
    ca_positions: Vec<[f32; 3]>,
}

impl ProteinSequence {
    /// Loads a PDB file from a local path or an http(s) URL.
    pub fn from_pdb_source(source: &str) -> Result<Self, AnnotatorError> {
        let text = if source.starts_with("http://") || source.starts_with("https://") {
            reqwest::blocking::get(source)?.text()?
        } else {
            fs::read_to_string(source)?
        };
        let name = Path::new(source)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string());
        Self::from_pdb_text(&text, name)
    }

    pub fn from_pdb_text(text: &str, name: Option<String>) -> Result<Self, AnnotatorError> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut sequence = String::new();
        let mut ca_positions: Vec<[f32; 3]> = Vec::new();
        let mut current_residue: Option<(String, String)> = None;

        for line in text.lines() {
            if !line.starts_with("ATOM") {
                continue;
            }
            let atom_name = column(line, 12..16);
            let res_name = column(line, 17..20);
            let chain_id = column(line, 21..22);
            let res_seq = column(line, 22..26);

            let key = (chain_id, res_seq);
            if seen.insert(key.clone()) {
                sequence.push(AMINO_ACIDS.one_letter_or_x(&res_name));
                // First atom of the residue anchors its position until the
                // alpha carbon shows up.
                ca_positions.push(coordinates(line));
                current_residue = Some(key);
            } else if atom_name == "CA" && current_residue.as_ref() == Some(&key) {
                if let Some(last) = ca_positions.last_mut() {
                    *last = coordinates(line);
                }
            }
        }

        if sequence.is_empty() {
            return Err(AnnotatorError::LoadFailure(
                "no ATOM records found".to_string(),
            ));
        }
        Ok(Self {
            name,
            sequence,
            ca_positions,
        })
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn residue(&self, index: usize) -> Option<char> {
        self.sequence.chars().nth(index)
    }

    pub fn ca_positions(&self) -> &[[f32; 3]] {
        &self.ca_positions
    }
}

fn column(line: &str, range: std::ops::Range<usize>) -> String {
    line.get(range).unwrap_or("").trim().to_string()
}

fn coordinates(line: &str) -> [f32; 3] {
    let coordinate =
        |range: std::ops::Range<usize>| column(line, range).parse::<f32>().unwrap_or(0.0);
    [
        coordinate(30..38),
        coordinate(38..46),
        coordinate(46..54),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDB: &str = "\
HEADER    TEST PEPTIDE
ATOM      1  N   MET A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  MET A   1      11.639   6.071  -5.147  1.00  0.00           C
ATOM      3  C   MET A   1      10.737   5.211  -4.269  1.00  0.00           C
ATOM      4  N   GLY A   2       9.850   4.477  -4.937  1.00  0.00           N
ATOM      5  CA  GLY A   2       8.934   3.591  -4.236  1.00  0.00           C
ATOM      6  N   MSE A   3       8.112   2.787  -5.102  1.00  0.00           N
HETATM    7  O   HOH A  90       0.000   0.000   0.000  1.00  0.00           O
TER
END
";

    #[test]
    fn test_sequence_extraction() {
        let protein = ProteinSequence::from_pdb_text(PDB, None).unwrap();
        // One letter per (chain, residue number), unknown residue becomes X,
        // HETATM records are ignored.
        assert_eq!(protein.sequence(), "MGX");
        assert_eq!(protein.len(), 3);
    }

    #[test]
    fn test_ca_position_overrides_first_atom() {
        let protein = ProteinSequence::from_pdb_text(PDB, None).unwrap();
        assert_eq!(protein.ca_positions().len(), 3);
        // Residue 1 position comes from its CA, not its leading N.
        assert_eq!(protein.ca_positions()[0], [11.639, 6.071, -5.147]);
        // Residue 3 has no CA record, so its first atom stands in.
        assert_eq!(protein.ca_positions()[2], [8.112, 2.787, -5.102]);
    }

    #[test]
    fn test_empty_input_is_load_failure() {
        let result = ProteinSequence::from_pdb_text("REMARK nothing here\n", None);
        assert!(matches!(result, Err(AnnotatorError::LoadFailure(_))));
    }

    #[test]
    fn test_demo_peptide_file() {
        let protein = ProteinSequence::from_pdb_source("test_files/demo_peptide.pdb").unwrap();
        assert_eq!(protein.name().clone().unwrap(), "demo_peptide");
        assert_eq!(protein.sequence(), "MELAKGSWFVDR");
        assert_eq!(protein.ca_positions().len(), 12);
    }
}
