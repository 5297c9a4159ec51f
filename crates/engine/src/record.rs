//! Record Model - fields, schema, records and the dataset that owns them
//!
//! Key invariants:
//! - Field order is display order and is never alphabetized
//! - Every record key is one of the dataset's field names
//! - Records are immutable once the dataset is built
//! - Classification is declared per field; undeclared fields are single-valued text

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::FacetError;

/// Separator for multi-valued cells unless the schema says otherwise
pub const DEFAULT_DELIMITER: char = ',';

/// Group label used when a pinned record has no value for the group field
pub const DEFAULT_GROUP_FALLBACK: &str = "Unknown";

// =============================================================================
// FieldKind / Field
// =============================================================================

/// How a field's raw cell content is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Sorts numerically when every offered value parses
    Numeric,
    /// Single-valued text, exact match after trimming
    #[default]
    Text,
    /// Delimited list of independent values inside one cell
    MultiText,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Numeric)
    }

    pub fn is_multi_valued(self) -> bool {
        matches!(self, FieldKind::MultiText)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
            Self::MultiText => write!(f, "multi_text"),
        }
    }
}

/// A dataset column: name plus classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

// =============================================================================
// Schema
// =============================================================================

/// Declared field classifications and the designated identity/group fields.
///
/// Declarations for fields the dataset doesn't carry are ignored, so one
/// schema can serve several exports of the same catalogue.
#[derive(Debug, Clone)]
pub struct Schema {
    kinds: FxHashMap<String, FieldKind>,
    delimiter: char,
    identity: (String, String),
    group: Option<String>,
    group_fallback: String,
    hidden: FxHashSet<String>,
}

impl Schema {
    /// Schema whose records are identified by the pair `(first, second)`
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            kinds: FxHashMap::default(),
            delimiter: DEFAULT_DELIMITER,
            identity: (first.into(), second.into()),
            group: None,
            group_fallback: DEFAULT_GROUP_FALLBACK.to_string(),
            hidden: FxHashSet::default(),
        }
    }

    pub fn with_kind(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.kinds.insert(field.into(), kind);
        self
    }

    pub fn with_numeric<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.kinds.insert(field.into(), FieldKind::Numeric);
        }
        self
    }

    pub fn with_multi_valued<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.kinds.insert(field.into(), FieldKind::MultiText);
        }
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Field whose value clusters pinned records in the comparison view
    pub fn with_group(mut self, field: impl Into<String>) -> Self {
        self.group = Some(field.into());
        self
    }

    pub fn with_group_fallback(mut self, label: impl Into<String>) -> Self {
        self.group_fallback = label.into();
        self
    }

    /// Hidden fields stay filterable but are left out of facet panels
    pub fn with_hidden<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Declared kind, or single-valued text when undeclared
    pub fn kind_of(&self, field: &str) -> FieldKind {
        self.kinds.get(field).copied().unwrap_or_default()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn identity(&self) -> (&str, &str) {
        (&self.identity.0, &self.identity.1)
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn group_fallback(&self) -> &str {
        &self.group_fallback
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.hidden.contains(field)
    }
}

// =============================================================================
// RecordId
// =============================================================================

/// Composite identity of a record (e.g. model number + chipset).
///
/// Ordering is lexicographic by first component, then second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub first: String,
    pub second: String,
}

impl RecordId {
    /// Separator used by the textual form `first__second`
    pub const SEPARATOR: &'static str = "__";

    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Parse the textual form `first__second` (split at the first separator)
    pub fn parse(s: &str) -> Option<Self> {
        let (first, second) = s.split_once(Self::SEPARATOR)?;
        Some(Self::new(first.trim(), second.trim()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, Self::SEPARATOR, self.second)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One row: field name -> raw cell text. Absent keys are missing cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: FxHashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Raw cell content, untouched
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Trimmed cell content (None when the cell is absent)
    pub fn value(&self, field: &str) -> Option<&str> {
        self.raw(field).map(str::trim)
    }

    /// Non-empty trimmed parts of a multi-valued cell
    pub fn parts<'a>(&'a self, field: &str, delimiter: char) -> impl Iterator<Item = &'a str> + 'a {
        self.raw(field)
            .into_iter()
            .flat_map(move |cell| cell.split(delimiter))
            .map(str::trim)
            .filter(|part| !part.is_empty())
    }

    /// Values this record contributes to `field`, decomposed by kind.
    ///
    /// Empty cells contribute nothing.
    pub fn facet_values<'a>(&'a self, field: &str, schema: &Schema) -> Vec<&'a str> {
        if schema.kind_of(field).is_multi_valued() {
            self.parts(field, schema.delimiter()).collect()
        } else {
            self.value(field)
                .filter(|v| !v.is_empty())
                .into_iter()
                .collect()
        }
    }

    /// Identity under the given schema; missing components become empty strings
    pub fn id(&self, schema: &Schema) -> RecordId {
        let (first, second) = schema.identity();
        RecordId::new(
            self.value(first).unwrap_or_default(),
            self.value(second).unwrap_or_default(),
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Ordered fields plus ordered records. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    fields: Vec<Field>,
    records: Vec<Record>,
    schema: Schema,
    /// identity -> index of the first record carrying it
    index: FxHashMap<RecordId, usize>,
}

impl Dataset {
    /// Build a dataset, checking that every record key is a declared field and
    /// that the schema's identity/group fields exist.
    pub fn new(
        field_names: Vec<String>,
        records: Vec<Record>,
        schema: Schema,
    ) -> Result<Self, FacetError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for name in &field_names {
            if !seen.insert(name.as_str()) {
                return Err(FacetError::InvalidSchema(format!(
                    "field '{name}' is declared twice"
                )));
            }
        }

        let (first, second) = schema.identity();
        for id_field in [first, second] {
            if !seen.contains(id_field) {
                return Err(FacetError::InvalidSchema(format!(
                    "identity field '{id_field}' is not in the field list"
                )));
            }
        }
        if first == second {
            return Err(FacetError::InvalidSchema(format!(
                "identity fields must differ, got '{first}' twice"
            )));
        }
        if let Some(group) = schema.group() {
            if !seen.contains(group) {
                return Err(FacetError::InvalidSchema(format!(
                    "group field '{group}' is not in the field list"
                )));
            }
        }

        for (i, record) in records.iter().enumerate() {
            if let Some(stray) = record.keys().find(|k| !seen.contains(k)) {
                return Err(FacetError::SchemaMismatch {
                    record: i,
                    field: stray.to_string(),
                });
            }
        }

        let mut index = FxHashMap::default();
        for (i, record) in records.iter().enumerate() {
            index.entry(record.id(&schema)).or_insert(i);
        }

        let fields = field_names
            .into_iter()
            .map(|name| {
                let kind = schema.kind_of(&name);
                Field { name, kind }
            })
            .collect();

        Ok(Self {
            fields,
            records,
            schema,
            index,
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Like `field`, but misuse surfaces as `UnknownField`
    pub fn require_field(&self, name: &str) -> Result<&Field, FacetError> {
        self.field(name)
            .ok_or_else(|| FacetError::UnknownField(name.to_string()))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve an identity to its (first) record
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new("Model", "Chip")
            .with_multi_valued(["Cert"])
            .with_numeric(["RAM"])
            .with_group("Vendor")
    }

    fn fields() -> Vec<String> {
        ["Model", "Chip", "Vendor", "Cert", "RAM"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_undeclared_field_is_text() {
        let s = schema();
        assert_eq!(s.kind_of("Vendor"), FieldKind::Text);
        assert_eq!(s.kind_of("Cert"), FieldKind::MultiText);
        assert_eq!(s.kind_of("RAM"), FieldKind::Numeric);
        assert_eq!(s.kind_of("nope"), FieldKind::Text);
    }

    #[test]
    fn test_parts_trim_and_drop_empty() {
        let r = Record::new().with("Cert", " FCC, CE ,,  KC ");
        let parts: Vec<&str> = r.parts("Cert", ',').collect();
        assert_eq!(parts, vec!["FCC", "CE", "KC"]);
        assert_eq!(r.parts("Missing", ',').count(), 0);
    }

    #[test]
    fn test_facet_values_by_kind() {
        let s = schema();
        let r = Record::new()
            .with("Cert", "FCC, CE")
            .with("Vendor", "  Nordic ")
            .with("Chip", "");
        assert_eq!(r.facet_values("Cert", &s), vec!["FCC", "CE"]);
        assert_eq!(r.facet_values("Vendor", &s), vec!["Nordic"]);
        assert!(r.facet_values("Chip", &s).is_empty(), "empty cell contributes nothing");
        assert!(r.facet_values("RAM", &s).is_empty(), "absent cell contributes nothing");
    }

    #[test]
    fn test_record_id_roundtrip_text() {
        let id = RecordId::new("M1 (A)", "nRF52832");
        assert_eq!(id.to_string(), "M1 (A)__nRF52832");
        assert_eq!(RecordId::parse("M1 (A)__nRF52832"), Some(id));
        assert_eq!(RecordId::parse("no-separator"), None);
    }

    #[test]
    fn test_record_id_ordering() {
        let a = RecordId::new("M1", "S2");
        let b = RecordId::new("M1", "S10");
        let c = RecordId::new("M2", "S0");
        // Lexicographic, not numeric
        assert!(b < a);
        assert!(a < c);
    }

    #[test]
    fn test_dataset_rejects_stray_key() {
        let records = vec![Record::new().with("Model", "M1").with("Colour", "red")];
        let err = Dataset::new(fields(), records, schema()).unwrap_err();
        assert_eq!(
            err,
            FacetError::SchemaMismatch {
                record: 0,
                field: "Colour".to_string()
            }
        );
    }

    #[test]
    fn test_dataset_rejects_missing_identity_field() {
        let err = Dataset::new(vec!["Model".to_string()], vec![], schema()).unwrap_err();
        assert!(err.to_string().contains("'Chip'"));
    }

    #[test]
    fn test_dataset_rejects_duplicate_field() {
        let mut names = fields();
        names.push("Vendor".to_string());
        let err = Dataset::new(names, vec![], schema()).unwrap_err();
        assert!(matches!(err, FacetError::InvalidSchema(_)));
    }

    #[test]
    fn test_dataset_preserves_field_order_and_kinds() {
        let ds = Dataset::new(fields(), vec![], schema()).unwrap();
        let names: Vec<&str> = ds.field_names().collect();
        assert_eq!(names, vec!["Model", "Chip", "Vendor", "Cert", "RAM"]);
        assert_eq!(ds.field("Cert").unwrap().kind, FieldKind::MultiText);
        assert!(matches!(
            ds.require_field("Nope"),
            Err(FacetError::UnknownField(f)) if f == "Nope"
        ));
    }

    #[test]
    fn test_find_first_record_for_identity() {
        let records = vec![
            Record::new().with("Model", "M1").with("Chip", "S1").with("Vendor", "A"),
            Record::new().with("Model", "M1").with("Chip", "S1").with("Vendor", "B"),
        ];
        let ds = Dataset::new(fields(), records, schema()).unwrap();
        let found = ds.find(&RecordId::new("M1", "S1")).unwrap();
        assert_eq!(found.value("Vendor"), Some("A"));
        assert!(ds.find(&RecordId::new("M9", "S1")).is_none());
    }
}
