use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::{StarFileError, TableError};

/// StarTable is the contents of a single `loop_` in a STAR file.
///
/// Values are kept as the raw text tokens found in the file, so columns which are never touched
/// are written back exactly as they were read (modulo whitespace).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StarTable {
    /// Create an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get the value of a single cell
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Iterate over all of the values of a column, in row order
    ///
    /// Returns None if the column does not exist
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    /// Append a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowLength {
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Add a column filled with `default`, returning its index.
    ///
    /// If the column already exists it is left untouched.
    pub fn add_column(&mut self, name: &str, default: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in self.rows.iter_mut() {
            row.push(default.to_string());
        }
        self.columns.len() - 1
    }

    /// Overwrite (or append) a whole column. There must be one value per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                found: values.len(),
                expected: self.rows.len(),
            });
        }
        let idx = self.add_column(name, "");
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarBody {
    Loop(StarTable),
    Pairs(Vec<(String, String)>),
}

/// A `data_` block: either a table or a list of key/value pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarBlock {
    pub name: String,
    pub version: Option<String>,
    pub body: StarBody,
}

impl StarBlock {
    pub fn new_loop(name: &str, version: Option<String>, table: StarTable) -> Self {
        Self {
            name: name.to_string(),
            version,
            body: StarBody::Loop(table),
        }
    }

    pub fn table(&self) -> Option<&StarTable> {
        match &self.body {
            StarBody::Loop(table) => Some(table),
            StarBody::Pairs(_) => None,
        }
    }
}

/// StarFile is an in-memory representation of a RELION style STAR file.
///
/// Blocks are kept in file order. Each block remembers the `# version` comment which preceded it
/// so that it can be reproduced when the file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarFile {
    pub blocks: Vec<StarBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Pairs,
    LoopHeaders,
    LoopData,
}

impl StarFile {
    /// Read and parse a STAR file from disk
    pub fn read(path: &Path) -> Result<Self, StarFileError> {
        if !path.exists() {
            return Err(StarFileError::BadFilePath(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Write the file to disk, replacing anything already at path
    pub fn write(&self, path: &Path) -> Result<(), StarFileError> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Find a block by name (without the `data_` prefix)
    pub fn block(&self, name: &str) -> Option<&StarBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

impl FromStr for StarFile {
    type Err = StarFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut blocks: Vec<StarBlock> = Vec::new();
        let mut pending_version: Option<String> = None;
        let mut state = ParseState::Pairs;

        for (idx, raw_line) in s.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if let Some(version) = parse_version(comment) {
                    pending_version = Some(version);
                }
                continue;
            }

            if let Some(name) = line.strip_prefix("data_") {
                blocks.push(StarBlock {
                    name: name.trim().to_string(),
                    version: pending_version.take(),
                    body: StarBody::Pairs(Vec::new()),
                });
                state = ParseState::Pairs;
                continue;
            }

            let Some(block) = blocks.last_mut() else {
                return Err(StarFileError::StrayValue(line_number));
            };

            if line.starts_with("loop_") {
                match &block.body {
                    StarBody::Pairs(pairs) if pairs.is_empty() => (),
                    _ => return Err(StarFileError::MixedBlock(line_number)),
                }
                block.body = StarBody::Loop(StarTable::default());
                state = ParseState::LoopHeaders;
                continue;
            }

            let is_key = line.starts_with('_');
            let tokens = tokenize(line, line_number)?;
            match (&mut block.body, state) {
                (StarBody::Loop(table), ParseState::LoopHeaders) if is_key => {
                    // Headers look like `_rlnName #1`; the index is implied by the order
                    table.columns.push(tokens[0].clone());
                }
                (StarBody::Loop(_), _) if is_key => {
                    return Err(StarFileError::HeaderAfterData(line_number));
                }
                (StarBody::Loop(table), _) => {
                    if tokens.len() != table.columns.len() {
                        return Err(StarFileError::BadRowLength {
                            line: line_number,
                            found: tokens.len(),
                            expected: table.columns.len(),
                        });
                    }
                    table.rows.push(tokens);
                    state = ParseState::LoopData;
                }
                (StarBody::Pairs(pairs), _) if is_key => {
                    let mut tokens = tokens.into_iter();
                    let key = tokens.next().unwrap_or_default();
                    match tokens.next() {
                        Some(value) => pairs.push((key, value)),
                        None => return Err(StarFileError::MissingValue(line_number)),
                    }
                }
                (StarBody::Pairs(_), _) => return Err(StarFileError::StrayValue(line_number)),
            }
        }

        Ok(Self { blocks })
    }
}

/// Parse the body of a `# version 30001` comment
fn parse_version(comment: &str) -> Option<String> {
    let mut parts = comment.split_whitespace();
    if parts.next()? != "version" {
        return None;
    }
    parts.next().map(String::from)
}

/// Split a line into whitespace separated tokens, honoring single and double quotes.
///
/// A quote only closes a value when it is followed by whitespace or the end of the line.
fn tokenize(line: &str, line_number: usize) -> Result<Vec<String>, StarFileError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, next)) = chars.next() {
                if next != c {
                    value.push(next);
                    continue;
                }
                match chars.peek() {
                    Some(&(_, after)) if !after.is_whitespace() => value.push(next),
                    _ => {
                        closed = true;
                        break;
                    }
                }
            }
            if !closed {
                return Err(StarFileError::UnterminatedQuote(line_number));
            }
            tokens.push(value);
        } else {
            let mut end = line.len();
            while let Some(&(idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    end = idx;
                    break;
                }
                chars.next();
            }
            tokens.push(line[start..end].to_string());
        }
    }
    Ok(tokens)
}

/// A quote character can delimit a value as long as it never appears followed by whitespace
fn can_delimit(value: &str, quote: char) -> bool {
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote && chars.peek().is_some_and(|next| next.is_whitespace()) {
            return false;
        }
    }
    true
}

/// Quote any value which would not survive being re-read as a bare token
fn quote(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '"', '\''])
        || value.starts_with("data_")
        || value.starts_with("loop_");
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    if !can_delimit(value, '"') && can_delimit(value, '\'') {
        Cow::Owned(format!("'{value}'"))
    } else {
        Cow::Owned(format!("\"{value}\""))
    }
}

impl fmt::Display for StarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "loop_ ")?;
        for (idx, column) in self.columns.iter().enumerate() {
            writeln!(f, "{column} #{} ", idx + 1)?;
        }

        let formatted: Vec<Vec<Cow<'_, str>>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| quote(v)).collect())
            .collect();
        let mut widths = vec![0; self.columns.len()];
        for row in formatted.iter() {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.chars().count());
            }
        }

        let last = self.columns.len().saturating_sub(1);
        for row in formatted.iter() {
            for (idx, value) in row.iter().enumerate() {
                if idx == last {
                    write!(f, "{value}")?;
                } else {
                    write!(f, "{value:<width$} ", width = widths[idx])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for StarBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        if let Some(version) = &self.version {
            writeln!(f, "# version {version}")?;
            writeln!(f)?;
        }
        writeln!(f, "data_{}", self.name)?;
        writeln!(f)?;
        match &self.body {
            StarBody::Loop(table) => write!(f, "{table}")?,
            StarBody::Pairs(pairs) => {
                let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in pairs {
                    writeln!(f, "{key:<width$} {}", quote(value))?;
                }
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for StarFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.blocks.iter() {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
