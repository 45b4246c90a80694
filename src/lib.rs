use amino_acids::AminoAcids;
use lazy_static::lazy_static;

pub mod amino_acids;
pub mod annotation;
pub mod annotation_list;
pub mod app;
pub mod error;
pub mod protein;
pub mod sequence_view;
pub mod session;
pub mod store;
pub mod structure_panel;
pub mod structure_view;

lazy_static! {
    // Amino acid residue codes
    pub static ref AMINO_ACIDS: AminoAcids = AminoAcids::default();
}
