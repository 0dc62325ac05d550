//! Tabular molecule datasets.
//!
//! A dataset is a CSV file with a header row, one compound per data row. Two
//! columns are required: an identifier column and a structure descriptor
//! (SMILES) column. All other columns are carried through as text.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ::csv::{ReaderBuilder, StringRecord};
use molsim_core::{hash, Annotated, MolsimError, Result};

/// Canonical name of the identifier column.
pub const DEFAULT_ID_COLUMN: &str = "cmpd_id";

/// Canonical name of the descriptor column.
pub const DEFAULT_DESCRIPTOR_COLUMN: &str = "SMILES";

/// Which header names hold the identifier and the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Matched exactly.
    pub id_column: String,
    /// Matched exactly first, then as a case-insensitive substring.
    pub descriptor_column: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        ColumnSpec {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            descriptor_column: DEFAULT_DESCRIPTOR_COLUMN.to_string(),
        }
    }
}

impl ColumnSpec {
    pub fn new(id_column: impl Into<String>, descriptor_column: impl Into<String>) -> Self {
        ColumnSpec {
            id_column: id_column.into(),
            descriptor_column: descriptor_column.into(),
        }
    }
}

/// Resolved header of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    columns: Vec<String>,
    id_index: usize,
    descriptor_index: usize,
}

impl DatasetSchema {
    /// Resolve the required columns against a header row.
    pub fn resolve(columns: Vec<String>, wanted: &ColumnSpec) -> Result<Self> {
        let id_index = columns
            .iter()
            .position(|c| *c == wanted.id_column)
            .ok_or_else(|| {
                MolsimError::Schema(format!(
                    "missing identifier column '{}' (found: {})",
                    wanted.id_column,
                    columns.join(", ")
                ))
            })?;

        let needle = wanted.descriptor_column.to_lowercase();
        let descriptor_index = columns
            .iter()
            .position(|c| *c == wanted.descriptor_column)
            .or_else(|| {
                columns
                    .iter()
                    .position(|c| c.to_lowercase().contains(&needle))
            })
            .ok_or_else(|| {
                MolsimError::Schema(format!(
                    "missing descriptor column '{}' (found: {})",
                    wanted.descriptor_column,
                    columns.join(", ")
                ))
            })?;

        Ok(DatasetSchema {
            columns,
            id_index,
            descriptor_index,
        })
    }

    /// Header names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn id_column(&self) -> &str {
        &self.columns[self.id_index]
    }

    pub fn descriptor_column(&self) -> &str {
        &self.columns[self.descriptor_index]
    }

    /// Position of the first column with this exact name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// One data row of a dataset.
///
/// Holds every cell of its row, always exactly as many as the header has
/// columns, plus a shared handle to the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeRecord {
    row: usize,
    values: Vec<String>,
    schema: Arc<DatasetSchema>,
}

impl MoleculeRecord {
    /// Zero-based data row index (the header is not counted).
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn id(&self) -> &str {
        &self.values[self.schema.id_index]
    }

    /// The structure descriptor, unvalidated.
    pub fn descriptor(&self) -> &str {
        &self.values[self.schema.descriptor_index]
    }

    /// Value of the first column with this exact name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.schema.index_of(column).map(|i| self.values[i].as_str())
    }

    /// All `(column, value)` pairs in original column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.schema
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }

    /// Pass-through fields: every column except the identifier and the
    /// descriptor, in original order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let (id, desc) = (self.schema.id_index, self.schema.descriptor_index);
        self.fields()
            .enumerate()
            .filter(move |&(i, _)| i != id && i != desc)
            .map(|(_, field)| field)
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }
}

impl Annotated for MoleculeRecord {
    fn name(&self) -> &str {
        self.id()
    }
}

/// A loaded dataset: schema, records in file order and the content digest
/// of the bytes they were parsed from.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<DatasetSchema>,
    records: Vec<MoleculeRecord>,
    digest: String,
}

impl Dataset {
    /// Read and parse a dataset file.
    ///
    /// The file is read exactly once; the digest covers the same bytes that
    /// are parsed. A missing or unreadable file is
    /// [`MolsimError::DatasetNotFound`].
    pub fn load(path: impl AsRef<Path>, wanted: &ColumnSpec) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MolsimError::DatasetNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Dataset::from_bytes(&bytes, wanted)?;
        tracing::debug!(
            path = %path.display(),
            rows = dataset.len(),
            digest = %dataset.digest,
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse a dataset from in-memory CSV bytes.
    pub fn from_bytes(bytes: &[u8], wanted: &ColumnSpec) -> Result<Self> {
        let digest = hash::sha256(bytes);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| MolsimError::Parse(e.to_string()))?;
        if headers.is_empty() {
            return Err(MolsimError::Schema("dataset has no header row".into()));
        }
        let columns: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let schema = Arc::new(DatasetSchema::resolve(columns, wanted)?);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| MolsimError::Parse(e.to_string()))?;
            records.push(MoleculeRecord {
                row,
                values: fit_to_width(&record, schema.width()),
                schema: Arc::clone(&schema),
            });
        }

        Ok(Dataset {
            schema,
            records,
            digest,
        })
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    pub fn records(&self) -> &[MoleculeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoleculeRecord> {
        self.records.iter()
    }

    /// SHA-256 of the file contents, lowercase hex.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a MoleculeRecord;
    type IntoIter = std::slice::Iter<'a, MoleculeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Pad short rows with empty cells and drop cells beyond the header.
fn fit_to_width(record: &StringRecord, width: usize) -> Vec<String> {
    let mut values: Vec<String> = record.iter().take(width).map(|s| s.to_string()).collect();
    values.resize(width, String::new());
    values
}
