use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::ProcessorError;
use super::extractor::{GroupKey, KeyExtractor};
use super::optics_groups::OpticsGroups;
use super::particles::{read_particles, write_particles, MetadataBundle};
use super::rewriter::{build_optics_table, set_optics_column};
use super::star_file::StarTable;

/// What happened during a call to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub output_path: PathBuf,
    pub n_rows: usize,
    pub n_groups: usize,
    pub n_failed: usize,
}

/// Find which of the candidate filename columns the table has. The first match wins.
pub fn find_name_column<'a>(
    table: &StarTable,
    candidates: &'a [String],
) -> Result<&'a str, ProcessorError> {
    candidates
        .iter()
        .find(|c| table.has_column(c))
        .map(|c| c.as_str())
        .ok_or_else(|| ProcessorError::MissingNameColumn(candidates.to_vec()))
}

/// Extract the key for every row of the table, warning about any rows which fail.
///
/// Progress is reported as the fraction of rows processed, roughly every 1%.
fn extract_keys<F: FnMut(f32)>(
    table: &StarTable,
    name_column: &str,
    extractor: &KeyExtractor,
    progress: &mut F,
) -> Vec<Option<GroupKey>> {
    let n_rows = table.n_rows();
    let flush_val = (n_rows / 100).max(1);
    let mut keys = Vec::with_capacity(n_rows);
    let Some(names) = table.column_values(name_column) else {
        return vec![None; n_rows];
    };
    for (idx, name) in names.enumerate() {
        let key = extractor.extract(name);
        if key.is_none() {
            log::warn!("Could not extract GridSquare/AFIS from {name}");
        }
        keys.push(key);
        if (idx + 1) % flush_val == 0 {
            progress((idx + 1) as f32 / n_rows as f32);
        }
    }
    progress(1.0);
    keys
}

/// The main routine of optics_grouper.
///
/// Reads the STAR file at `input_path`, assigns an optics group to every row based on the
/// GridSquare and AFIS group found in its filename, and writes the result (along with a new
/// optics table) to the output path given by the config. `progress` recieves the fraction of
/// rows which have been processed.
pub fn process<F: FnMut(f32)>(
    config: &Config,
    input_path: &Path,
    mut progress: F,
) -> Result<ProcessSummary, ProcessorError> {
    if !input_path.exists() {
        return Err(ProcessorError::BadFilePath(input_path.to_path_buf()));
    }
    let extractor = config.extractor()?;

    let file_size = std::fs::metadata(input_path)?.len();
    log::info!(
        "Reading {} ({})...",
        input_path.to_string_lossy(),
        human_bytes::human_bytes(file_size as f64)
    );
    let (mut table, bundle) = read_particles(input_path)?;
    log::info!(
        "Found {} rows in data_{} and {} optics groups in data_optics",
        table.n_rows(),
        bundle.table_name,
        bundle.optics.n_rows()
    );

    let name_column = find_name_column(&table, &config.name_columns)?;
    log::info!("Using filename column {name_column}");

    let keys = extract_keys(&table, name_column, &extractor, &mut progress);
    let n_failed = keys.iter().filter(|k| k.is_none()).count();

    let groups = OpticsGroups::from_keys(keys.iter().map(Option::as_ref))
        .with_fallback(config.fallback_group);
    log::info!(
        "Found {} unique GridSquare/AFIS combinations:",
        groups.len()
    );
    for (group, key) in groups.iter() {
        log::info!(
            "  OpticsGroup {group}: GridSquare_{}, AFIS_{}",
            key.grid_square,
            key.afis
        );
    }
    if n_failed > 0 {
        log::warn!(
            "{n_failed} rows could not be parsed and were assigned optics group {}",
            groups.fallback()
        );
    }

    let ids: Vec<u32> = keys.iter().map(|k| groups.group_id(k.as_ref())).collect();
    set_optics_column(&mut table, &ids)?;
    let optics = build_optics_table(&bundle.optics, &groups, &config.optics_placeholder)?;
    let bundle = MetadataBundle { optics, ..bundle };

    let output_path = config.get_output_path(input_path);
    write_particles(&table, &bundle, &output_path)?;
    log::info!("Output written to: {}", output_path.to_string_lossy());
    log::info!("Created {} optics groups", groups.len());

    Ok(ProcessSummary {
        output_path,
        n_rows: table.n_rows(),
        n_groups: groups.len(),
        n_failed,
    })
}
