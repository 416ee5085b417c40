use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::bank::QuestionBank;
use super::schema::{canonical_field, ColumnMap, Field};
use crate::models::{Label, Question, QuestionOption};

/// How many leading rows may precede the header row (title rows etc).
const HEADER_SCAN_ROWS: usize = 5;

/// Worksheet read from workbooks; the first sheet is used when absent.
const PREFERRED_SHEET: &str = "Sheet1";

/// Errors raised while turning a question file into a [`QuestionBank`].
#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a readable workbook: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("unsupported question file format '{extension}' (expected .xlsx, .xls, .ods, .csv, .tsv or .json)")]
    UnsupportedFormat { extension: String },

    #[error("missing required columns: {}", join_fields(.missing))]
    MissingColumns { missing: Vec<Field> },

    #[error("{} contains no questions", .path.display())]
    Empty { path: PathBuf },
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One data row keyed by canonical field.
type Row = HashMap<Field, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Workbook,
    Csv { delimiter: u8 },
    Json,
}

fn detect_format(path: &Path) -> Result<Format, DataFormatError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Format::Workbook),
        "csv" => Ok(Format::Csv { delimiter: b',' }),
        "tsv" => Ok(Format::Csv { delimiter: b'\t' }),
        "json" => Ok(Format::Json),
        _ => Err(DataFormatError::UnsupportedFormat { extension }),
    }
}

/// Reads and normalises a question file without consulting the cache.
pub fn load<P: AsRef<Path>>(path: P) -> Result<QuestionBank, DataFormatError> {
    let path = path.as_ref();

    let rows = match detect_format(path)? {
        Format::Workbook => read_workbook_rows(path)?,
        Format::Csv { delimiter } => read_csv_rows(path, delimiter)?,
        Format::Json => read_json_rows(path)?,
    };

    let questions = build_questions(rows);
    if questions.is_empty() {
        return Err(DataFormatError::Empty {
            path: path.to_path_buf(),
        });
    }

    let bank = QuestionBank::new(questions);
    info!(path = %path.display(), questions = bank.len(), "loaded question bank");
    Ok(bank)
}

fn bank_cache() -> &'static Mutex<HashMap<PathBuf, Arc<QuestionBank>>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<QuestionBank>>>> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Loads a question file once per process.
///
/// Later calls for the same file return the same [`Arc`] without reading
/// the file again. Failed loads are not cached.
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<Arc<QuestionBank>, DataFormatError> {
    let path = path.as_ref();
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    if let Some(bank) = bank_cache()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        debug!(path = %key.display(), "question bank served from cache");
        return Ok(Arc::clone(bank));
    }

    let bank = Arc::new(load(path)?);
    let mut cache = bank_cache().lock().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(key).or_insert(bank)))
}

fn read_csv_rows(path: &Path, delimiter: u8) -> Result<Vec<Row>, DataFormatError> {
    let csv_error = |source| DataFormatError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    rows_from_table(records)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Row>, DataFormatError> {
    let workbook_error = |source| DataFormatError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let sheet_names = workbook.sheet_names();
    let sheet = sheet_names
        .iter()
        .find(|name| name.as_str() == PREFERRED_SHEET)
        .or_else(|| sheet_names.first())
        .cloned()
        .ok_or_else(|| DataFormatError::Empty {
            path: path.to_path_buf(),
        })?;
    debug!(sheet = %sheet, "reading worksheet");

    let range = workbook.worksheet_range(&sheet).map_err(workbook_error)?;
    let records = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    rows_from_table(records)
}

fn workbook_cell(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Locates the header row and keys every following row by canonical field.
fn rows_from_table(records: Vec<Vec<String>>) -> Result<Vec<Row>, DataFormatError> {
    let mut best: Option<ColumnMap> = None;
    let mut header_at = None;

    for (position, record) in records.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let map = ColumnMap::from_headers(record.iter().map(String::as_str));
        if map.is_complete() {
            best = Some(map);
            header_at = Some(position);
            break;
        }
        let better = best
            .as_ref()
            .is_none_or(|b| map.missing_required().len() < b.missing_required().len());
        if better {
            best = Some(map);
        }
    }

    let columns = best.unwrap_or_default();
    let Some(header_at) = header_at else {
        return Err(DataFormatError::MissingColumns {
            missing: columns.missing_required(),
        });
    };
    debug!(header_row = header_at, "found header row");

    let fields = [
        Field::Index,
        Field::Question,
        Field::Option(Label::A),
        Field::Option(Label::B),
        Field::Option(Label::C),
        Field::Option(Label::D),
        Field::Option(Label::E),
        Field::Correct,
        Field::Reference,
        Field::Clause,
    ];

    let rows = records
        .into_iter()
        .skip(header_at + 1)
        .map(|record| {
            fields
                .iter()
                .filter_map(|field| {
                    let cell = record.get(columns.position(*field)?)?;
                    Some((*field, cell.clone()))
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

fn read_json_rows(path: &Path) -> Result<Vec<Row>, DataFormatError> {
    let content = fs::read_to_string(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let objects: Vec<Map<String, Value>> =
        serde_json::from_str(&content).map_err(|source| DataFormatError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let columns = ColumnMap::from_headers(objects.iter().flat_map(|object| object.keys().map(String::as_str)));
    if !columns.is_complete() {
        return Err(DataFormatError::MissingColumns {
            missing: columns.missing_required(),
        });
    }

    let rows = objects
        .iter()
        .map(|object| {
            let mut row = Row::new();
            for (key, value) in object {
                if let Some(field) = canonical_field(key) {
                    row.entry(field).or_insert_with(|| json_cell(value));
                }
            }
            row
        })
        .collect();

    Ok(rows)
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell(row: &Row, field: Field) -> Option<String> {
    row.get(&field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_index(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        // Spreadsheet exports often write integer cells as "12.0".
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.fract() == 0.0)
            .map(|value| value as i64)
    })
}

/// Turns rows into questions.
///
/// Ids come from the index column. Rows without a usable index, or whose
/// index repeats an earlier one, are numbered after the largest explicit id.
fn build_questions(rows: Vec<Row>) -> Vec<Question> {
    let explicit_ids: Vec<Option<i64>> = rows
        .iter()
        .map(|row| cell(row, Field::Index).as_deref().and_then(parse_index))
        .collect();
    let mut next_free_id = explicit_ids.iter().flatten().max().copied().unwrap_or(0).max(0) + 1;
    let mut seen_ids = HashSet::new();
    let mut questions = Vec::with_capacity(rows.len());

    for (ordinal, (row, explicit_id)) in rows.into_iter().zip(explicit_ids).enumerate() {
        let Some(text) = cell(&row, Field::Question) else {
            debug!(row = ordinal + 1, "dropping row without question text");
            continue;
        };

        let id = match explicit_id {
            Some(id) if seen_ids.insert(id) => id,
            _ => {
                let id = next_free_id;
                next_free_id += 1;
                seen_ids.insert(id);
                if let Some(duplicate) = explicit_id {
                    warn!(row = ordinal + 1, duplicate, renumbered = id, "duplicate question index");
                }
                id
            }
        };

        let options = Label::ALL
            .iter()
            .filter_map(|label| {
                cell(&row, Field::Option(*label)).map(|text| QuestionOption {
                    label: *label,
                    text,
                })
            })
            .collect();

        let question = Question {
            id,
            text,
            options,
            correct: cell(&row, Field::Correct).unwrap_or_default().to_uppercase(),
            reference: cell(&row, Field::Reference),
            clause: cell(&row, Field::Clause),
        };

        if question.correct_label().is_none() {
            warn!(
                id = question.id,
                correct = %question.correct,
                "correct answer does not name a present option"
            );
        }

        questions.push(question);
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_row_after_title_row() {
        let records = table(&[
            &["Question bank 2025", "", ""],
            &["TT", "Câu hỏi", "Phương án A", "Phương án B", "Đ.án đúng", "Unnamed: 10"],
            &["1", "What is 2+2?", "3", "4", " b ", ""],
        ]);

        let questions = build_questions(rows_from_table(records).unwrap());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[0].text, "What is 2+2?");
        assert_eq!(questions[0].correct, "B");
        assert_eq!(questions[0].options.len(), 2);
    }

    #[test]
    fn test_missing_columns_reported() {
        let records = table(&[&["question", "A"], &["Why?", "Because"]]);

        match rows_from_table(records) {
            Err(DataFormatError::MissingColumns { missing }) => {
                assert_eq!(missing, vec![Field::Correct]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_rows_without_text_dropped_and_options_omitted() {
        let records = table(&[
            &["index", "question", "A", "B", "C", "correct", "reference", "clause"],
            &["1", "", "x", "y", "", "A", "", ""],
            &["2", "Second", "x", "", "z", "c", "Decree 5", " Art. 3 "],
        ]);

        let questions = build_questions(rows_from_table(records).unwrap());
        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.id, 2);
        assert_eq!(question.labels().collect::<Vec<_>>(), vec![Label::A, Label::C]);
        assert_eq!(question.correct_label(), Some(Label::C));
        assert_eq!(question.reference.as_deref(), Some("Decree 5"));
        assert_eq!(question.clause.as_deref(), Some("Art. 3"));
    }

    #[test]
    fn test_missing_index_numbered_after_explicit_ids() {
        let records = table(&[
            &["question", "A", "correct", "TT"],
            &["First", "x", "A", "7.0"],
            &["Second", "x", "A", "n/a"],
        ]);

        let questions = build_questions(rows_from_table(records).unwrap());
        assert_eq!(questions[0].id, 7);
        assert_eq!(questions[1].id, 8);
    }

    #[test]
    fn test_fallback_ids_never_clash_with_explicit_ones() {
        let mut rows: Vec<Vec<&str>> = vec![
            vec!["TT", "question", "A", "correct"],
            vec!["2", "Two", "x", "A"],
            vec!["", "Blank index", "x", "A"],
            vec!["2", "Repeated index", "x", "A"],
        ];
        let numbered: Vec<String> = (103..=110).map(|id: i64| id.to_string()).collect();
        for id in &numbered {
            rows.push(vec![id.as_str(), "Numbered", "x", "A"]);
        }
        let records = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        let questions = build_questions(rows_from_table(records).unwrap());
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let distinct: HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());
        assert_eq!(&ids[..3], &[2, 111, 112]);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("bank.CSV")).unwrap(),
            Format::Csv { delimiter: b',' }
        );
        assert_eq!(detect_format(Path::new("bank.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("bank.XLSX")).unwrap(), Format::Workbook);
        assert!(matches!(
            detect_format(Path::new("bank.txt")),
            Err(DataFormatError::UnsupportedFormat { .. })
        ));
    }
}
