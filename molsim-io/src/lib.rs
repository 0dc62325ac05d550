//! Dataset loading for molsim.
//!
//! Datasets are CSV files with a header row. Each data row becomes a
//! [`MoleculeRecord`] carrying an identifier, a SMILES descriptor and any
//! number of pass-through columns:
//!
//! ```text
//! cmpd_id,SMILES,Name
//! COMP1,CC(=O)OC1=CC=CC=C1C(=O)O,Aspirin
//! ```

pub mod dataset;

pub use dataset::{
    ColumnSpec, Dataset, DatasetSchema, MoleculeRecord, DEFAULT_DESCRIPTOR_COLUMN,
    DEFAULT_ID_COLUMN,
};
