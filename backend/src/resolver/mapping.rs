//! Column mapping: which source column feeds which canonical field.
//!
//! A mapping is built once per file and not modified afterwards. It can be
//! saved to JSON and re-applied to a later file with the same headers, which
//! skips fuzzy resolution entirely.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ResolveError, ResolveResult};
use crate::models::SourceColumn;
use crate::schema::CanonicalField;

/// A source column claimed by a field, with the score that won it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedColumn {
    pub column: SourceColumn,
    pub score: f64,
}

/// Canonical field -> source column.
///
/// At most one column per field and at most one field per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    matches: BTreeMap<CanonicalField, MatchedColumn>,
}

/// On-disk form of a mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingFile {
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    pub fields: Vec<MappingEntry>,
}

/// One line of a mapping file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Output header, e.g. `"Variant SKU"`.
    pub field: String,
    /// Source header as found in the file.
    pub column: String,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl ColumnMapping {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a column for a field.
    ///
    /// Fails if either side is already taken.
    pub(crate) fn claim(
        &mut self,
        field: CanonicalField,
        column: SourceColumn,
        score: f64,
    ) -> ResolveResult<()> {
        if self.matches.values().any(|m| m.column.index == column.index) {
            return Err(ResolveError::DuplicateColumn(column.name));
        }
        if self.matches.contains_key(&field) {
            return Err(ResolveError::DuplicateField(field.header().to_string()));
        }
        self.matches.insert(field, MatchedColumn { column, score });
        Ok(())
    }

    /// Matched column for a field.
    pub fn get(&self, field: CanonicalField) -> Option<&MatchedColumn> {
        self.matches.get(&field)
    }

    /// Source column for a field.
    pub fn column(&self, field: CanonicalField) -> Option<&SourceColumn> {
        self.matches.get(&field).map(|m| &m.column)
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.matches.contains_key(&field)
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Mapped fields in output column order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &MatchedColumn)> {
        self.matches.iter().map(|(f, m)| (*f, m))
    }

    /// Required fields with no column.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|f| f.is_required() && !self.is_mapped(*f))
            .collect()
    }

    /// Source columns no field claimed.
    pub fn unmatched<'a>(&self, columns: &'a [SourceColumn]) -> Vec<&'a SourceColumn> {
        let claimed: HashSet<usize> = self.matches.values().map(|m| m.column.index).collect();
        columns
            .iter()
            .filter(|c| !claimed.contains(&c.index))
            .collect()
    }

    /// Fail with the full list of missing required fields.
    pub fn ensure_complete(&self, columns: &[SourceColumn]) -> ResolveResult<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ResolveError::MissingRequired {
            missing: missing.iter().map(|f| f.header().to_string()).collect(),
            found: columns.iter().map(|c| c.name.clone()).collect(),
        })
    }

    /// Serializable form.
    pub fn to_file(&self) -> MappingFile {
        MappingFile {
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            fields: self
                .iter()
                .map(|(field, m)| MappingEntry {
                    field: field.header().to_string(),
                    column: m.column.name.clone(),
                    index: Some(m.column.index),
                    score: Some(m.score),
                })
                .collect(),
        }
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: &Path) -> ResolveResult<()> {
        let content = serde_json::to_string_pretty(&self.to_file())?;
        fs::write(path, content)?;
        info!(path = %path.display(), fields = self.len(), "mapping saved");
        Ok(())
    }

    /// Re-bind a saved mapping to the headers of a new file.
    ///
    /// Columns are matched by exact header name; the stored index is only
    /// informational. Computed fields cannot be mapped. Required-field
    /// completeness is checked.
    pub fn from_file(file: &MappingFile, columns: &[SourceColumn]) -> ResolveResult<Self> {
        let mut mapping = Self::new();

        for entry in &file.fields {
            let field = CanonicalField::from_header(&entry.field)
                .ok_or_else(|| ResolveError::UnknownField(entry.field.clone()))?;
            if !field.is_mappable() {
                return Err(ResolveError::UnmappableField(entry.field.clone()));
            }
            let column = columns
                .iter()
                .find(|c| c.name == entry.column)
                .ok_or_else(|| ResolveError::ColumnNotFound {
                    field: entry.field.clone(),
                    column: entry.column.clone(),
                })?;
            mapping.claim(field, column.clone(), entry.score.unwrap_or(1.0))?;
        }

        mapping.ensure_complete(columns)?;
        Ok(mapping)
    }

    /// Load a mapping file and bind it to `columns`.
    pub fn load(path: &Path, columns: &[SourceColumn]) -> ResolveResult<Self> {
        let content = fs::read_to_string(path)?;
        let file: MappingFile = serde_json::from_str(&content)?;
        Self::from_file(&file, columns)
    }
}
