//! Reads board game dimensions from tabular files.
//!
//! Supported inputs are a JSON array of row objects and comma or tab
//! separated tables with a header row. Each row needs `Name`, `Width` and
//! `Height` (header match ignores case). Rows with a blank or missing field
//! are skipped; rows with a value that is present but unusable fail the load.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::{BoardGame, ValidationError};

const NAME_COLUMN: &str = "name";
const WIDTH_COLUMN: &str = "width";
const HEIGHT_COLUMN: &str = "height";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of rows")]
    NotAnArray,
    #[error("header has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row}: '{value}' in column {column} is not a number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: {source}")]
    InvalidGame {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error("unsupported file type '{0}' (use .json, .csv, .tsv or .txt)")]
    UnsupportedFormat(String),
}

/// Games read from a table.
#[derive(Debug, Clone, Default)]
pub struct LoadedGames {
    /// Games in file order
    pub games: Vec<BoardGame>,
    /// Rows skipped for a missing field, numbered like the rows in `LoadError`
    pub dropped_rows: Vec<usize>,
}

/// Loads games from a file, choosing the parser by extension.
pub fn load_games_from_path(path: impl AsRef<Path>) -> Result<LoadedGames, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let delimiter = match extension.as_str() {
        "json" => None,
        "csv" => Some(','),
        "tsv" | "txt" => Some('\t'),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match delimiter {
        None => parse_games_json(&content),
        Some(delimiter) => parse_games_delimited(&content, delimiter),
    }
}

/// Parses a JSON array of `{ "Name": ..., "Width": ..., "Height": ... }` rows.
///
/// Numbers may also be given as numeric strings. Rows are numbered by their
/// 1-based position in the array.
pub fn parse_games_json(content: &str) -> Result<LoadedGames, LoadError> {
    let rows = match serde_json::from_str::<Value>(content)? {
        Value::Array(rows) => rows,
        _ => return Err(LoadError::NotAnArray),
    };

    let mut loaded = LoadedGames::default();
    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;
        let cell = |column: &str| -> Option<String> {
            let object = row.as_object()?;
            let value = object
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(column))
                .map(|(_, value)| value)?;
            match value {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            }
        };

        let fields = (cell(NAME_COLUMN), cell(WIDTH_COLUMN), cell(HEIGHT_COLUMN));
        push_row(&mut loaded, row_number, fields)?;
    }
    Ok(loaded)
}

/// Parses a delimited table whose first non-empty line is the header.
///
/// Rows are numbered by their 1-based line in `content`, blank lines included.
///
/// Fields may be wrapped in double quotes to contain the delimiter; a doubled
/// quote inside a quoted field stands for one quote character.
pub fn parse_games_delimited(content: &str, delimiter: char) -> Result<LoadedGames, LoadError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Ok(LoadedGames::default());
    };
    let header = split_record(header_line, delimiter);
    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or(LoadError::MissingColumn(name))
    };
    let name_idx = column(NAME_COLUMN)?;
    let width_idx = column(WIDTH_COLUMN)?;
    let height_idx = column(HEIGHT_COLUMN)?;

    let mut loaded = LoadedGames::default();
    for (line_number, line) in lines {
        let record = split_record(line, delimiter);
        let cell = |i: usize| record.get(i).cloned();
        push_row(
            &mut loaded,
            line_number,
            (cell(name_idx), cell(width_idx), cell(height_idx)),
        )?;
    }
    Ok(loaded)
}

fn push_row(
    loaded: &mut LoadedGames,
    row: usize,
    (name, width, height): (Option<String>, Option<String>, Option<String>),
) -> Result<(), LoadError> {
    let present = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let (Some(name), Some(width), Some(height)) = (present(name), present(width), present(height))
    else {
        loaded.dropped_rows.push(row);
        return Ok(());
    };

    let width = parse_number(&width, row, "Width")?;
    let height = parse_number(&height, row, "Height")?;
    let game = BoardGame::new(name, width, height)
        .map_err(|source| LoadError::InvalidGame { row, source })?;
    loaded.games.push(game);
    Ok(())
}

fn parse_number(raw: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
        row,
        column,
        value: raw.to_string(),
    })
}

fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}
