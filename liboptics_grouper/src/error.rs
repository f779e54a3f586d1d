use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StarFileError {
    #[error("StarFile failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not open StarFile because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("StarFile found a value outside of any loop at line {0}")]
    StrayValue(usize),
    #[error("StarFile found a loop in a block which already has key/value pairs at line {0}")]
    MixedBlock(usize),
    #[error("StarFile found a header after the loop data had started at line {0}")]
    HeaderAfterData(usize),
    #[error("StarFile found a row with {found} values at line {line}; expected {expected}")]
    BadRowLength {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("StarFile found a key without a value at line {0}")]
    MissingValue(usize),
    #[error("StarFile found an unterminated quoted value at line {0}")]
    UnterminatedQuote(usize),
    #[error("StarFile does not contain a data table")]
    NoDataTable,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("StarTable was given a row with {found} values; expected {expected}")]
    RowLength { found: usize, expected: usize },
    #[error("StarTable was given {found} values for column {column}; expected {expected}")]
    ColumnLength {
        column: String,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("KeyExtractor failed to compile pattern: {0}")]
    BadPattern(#[from] regex::Error),
    #[error("KeyExtractor pattern {0:?} has no capture group")]
    NoCaptureGroup(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config contains an invalid pattern: {0}")]
    PatternError(#[from] ExtractorError),
    #[error("Config does not list any filename columns")]
    NoNameColumns,
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor could not find input file {0:?}")]
    BadFilePath(PathBuf),
    #[error("Processor failed due to StarFile error: {0}")]
    StarError(#[from] StarFileError),
    #[error("Processor failed due to table error: {0}")]
    TableError(#[from] TableError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor could not find a micrograph name column; looked for {0:?}")]
    MissingNameColumn(Vec<String>),
    #[error("Processor failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}
