//! Header mapping from source spreadsheets to canonical question fields.

use std::collections::HashMap;
use std::fmt;

use crate::models::Label;

/// Canonical column of the normalised question table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Index,
    Question,
    Option(Label),
    Correct,
    Reference,
    Clause,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Index => f.write_str("index"),
            Field::Question => f.write_str("question"),
            Field::Option(label) => write!(f, "{}", label),
            Field::Correct => f.write_str("correct"),
            Field::Reference => f.write_str("reference"),
            Field::Clause => f.write_str("clause"),
        }
    }
}

/// Columns a table must provide after normalisation.
pub const REQUIRED_FIELDS: [Field; 3] = [Field::Question, Field::Correct, Field::Option(Label::A)];

/// Source header aliases, matched after trimming and lowercasing.
const ALIASES: &[(&str, Field)] = &[
    ("tt", Field::Index),
    ("câu hỏi", Field::Question),
    ("phương án a", Field::Option(Label::A)),
    ("phương án b", Field::Option(Label::B)),
    ("phương án c", Field::Option(Label::C)),
    ("phương án d", Field::Option(Label::D)),
    ("phương án e", Field::Option(Label::E)),
    ("đ.án đúng", Field::Correct),
    ("số văn bản tham chiếu (kèm trích yếu văn bản)", Field::Reference),
    ("điều khoản tham chiếu cụ thể", Field::Clause),
    ("index", Field::Index),
    ("question", Field::Question),
    ("a", Field::Option(Label::A)),
    ("b", Field::Option(Label::B)),
    ("c", Field::Option(Label::C)),
    ("d", Field::Option(Label::D)),
    ("e", Field::Option(Label::E)),
    ("correct", Field::Correct),
    ("reference", Field::Reference),
    ("clause", Field::Clause),
];

/// Resolves a raw header cell to its canonical field.
pub fn canonical_field(header: &str) -> Option<Field> {
    let normalized = header.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, field)| *field)
}

/// Column positions of the canonical fields within one header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Builds the map from a header row. The first occurrence of a field wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions = HashMap::new();
        for (position, header) in headers.into_iter().enumerate() {
            if let Some(field) = canonical_field(header) {
                positions.entry(field).or_insert(position);
            }
        }
        Self { positions }
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    /// Required fields absent from this header row, in declaration order.
    pub fn missing_required(&self) -> Vec<Field> {
        REQUIRED_FIELDS
            .iter()
            .filter(|field| !self.positions.contains_key(*field))
            .copied()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}
