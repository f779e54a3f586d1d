use std::path::Path;

use super::constants::{DEFAULT_STAR_VERSION, OPTICS_BLOCK_NAME};
use super::error::StarFileError;
use super::star_file::{StarBlock, StarBody, StarFile, StarTable};

/// Everything in a RELION data STAR file other than the data rows themselves.
///
/// The optics table is the only part which is expected to be replaced; the remaining fields are
/// carried through so the file can be written back out in the same shape it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBundle {
    pub version: Option<String>,
    pub optics_headers: Vec<String>,
    pub optics: StarTable,
    pub data_headers: Vec<String>,
    pub table_name: String,
    /// Blocks which are neither the optics nor the data table (i.e. data_general)
    pub extra_blocks: Vec<StarBlock>,
}

/// Read a movies/micrographs/particles STAR file, splitting it into the data table and metadata
pub fn read_particles(path: &Path) -> Result<(StarTable, MetadataBundle), StarFileError> {
    let star = StarFile::read(path)?;
    split_particles(star)
}

/// Split a parsed STAR file into the data table and metadata.
///
/// The optics table is the `data_optics` block, if there is one. The data table is the first other
/// block which contains a loop.
pub fn split_particles(star: StarFile) -> Result<(StarTable, MetadataBundle), StarFileError> {
    let mut optics_block: Option<StarBlock> = None;
    let mut data_block: Option<(String, Option<String>, StarTable)> = None;
    let mut extra_blocks: Vec<StarBlock> = Vec::new();

    for block in star.blocks {
        if block.name == OPTICS_BLOCK_NAME && optics_block.is_none() {
            optics_block = Some(block);
            continue;
        }
        match block.body {
            StarBody::Loop(table) if data_block.is_none() => {
                data_block = Some((block.name, block.version, table));
            }
            body => extra_blocks.push(StarBlock { body, ..block }),
        }
    }

    let Some((table_name, data_version, table)) = data_block else {
        return Err(StarFileError::NoDataTable);
    };

    let (optics_version, optics) = match optics_block {
        Some(StarBlock {
            version,
            body: StarBody::Loop(optics),
            ..
        }) => (version, optics),
        Some(block) => {
            // An optics block with no loop is kept as-is rather than being thrown away
            log::warn!("Optics block does not contain a table; treating it as empty");
            extra_blocks.insert(0, block);
            (None, StarTable::default())
        }
        None => (None, StarTable::default()),
    };

    let bundle = MetadataBundle {
        version: optics_version.or(data_version),
        optics_headers: optics.columns().to_vec(),
        optics,
        data_headers: table.columns().to_vec(),
        table_name,
        extra_blocks,
    };
    Ok((table, bundle))
}

/// Reassemble a STAR file: the optics block, then the data block, then any extra blocks
pub fn join_particles(table: &StarTable, bundle: &MetadataBundle) -> StarFile {
    let version = bundle
        .version
        .clone()
        .or_else(|| Some(DEFAULT_STAR_VERSION.to_string()));
    let mut blocks = Vec::with_capacity(bundle.extra_blocks.len() + 2);
    if !bundle.optics.columns().is_empty() {
        blocks.push(StarBlock::new_loop(
            OPTICS_BLOCK_NAME,
            version.clone(),
            bundle.optics.clone(),
        ));
    }
    blocks.push(StarBlock::new_loop(
        &bundle.table_name,
        version,
        table.clone(),
    ));
    blocks.extend(bundle.extra_blocks.iter().cloned());
    StarFile { blocks }
}

/// Write the data table and metadata to a STAR file
pub fn write_particles(
    table: &StarTable,
    bundle: &MetadataBundle,
    path: &Path,
) -> Result<(), StarFileError> {
    join_particles(table, bundle).write(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_join() {
        let text = "
# version 30001

data_optics

loop_
_rlnOpticsGroupName #1
_rlnOpticsGroup #2
opticsGroup1 1

# version 30001

data_micrographs

loop_
_rlnMicrographName #1
_rlnOpticsGroup #2
a.mrc 1
b.mrc 1

data_general

_rlnImageSizeX 4096
";
        let star: StarFile = text.parse().unwrap();
        let (table, bundle) = split_particles(star.clone()).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(bundle.table_name, "micrographs");
        assert_eq!(bundle.version.as_deref(), Some("30001"));
        assert_eq!(
            bundle.optics_headers,
            vec!["_rlnOpticsGroupName", "_rlnOpticsGroup"]
        );
        assert_eq!(bundle.data_headers, vec!["_rlnMicrographName", "_rlnOpticsGroup"]);
        assert_eq!(bundle.extra_blocks.len(), 1);
        assert_eq!(bundle.extra_blocks[0].name, "general");

        let joined = join_particles(&table, &bundle);
        assert_eq!(joined.blocks.len(), 3);
        assert_eq!(joined.blocks[0].name, "optics");
        assert_eq!(joined.blocks[1].name, "micrographs");
        assert_eq!(joined.block("micrographs").unwrap().table(), Some(&table));
    }

    #[test]
    fn test_no_optics_block() {
        let star: StarFile = "data_\nloop_\n_rlnMicrographName #1\na.mrc\n"
            .parse()
            .unwrap();
        let (table, bundle) = split_particles(star).unwrap();
        assert_eq!(table.n_rows(), 1);
        assert_eq!(bundle.table_name, "");
        assert!(bundle.optics.columns().is_empty());
        assert!(bundle.version.is_none());

        // Without optics columns only the data block is written
        let joined = join_particles(&table, &bundle);
        assert_eq!(joined.blocks.len(), 1);
        assert_eq!(joined.blocks[0].version.as_deref(), Some(DEFAULT_STAR_VERSION));
    }

    #[test]
    fn test_optics_block_without_loop() {
        let text = "
# version 30001

data_optics

_rlnOpticsGroup 1

# version 30001

data_movies

loop_
_rlnMicrographMovieName #1
a.tiff
";
        let star: StarFile = text.parse().unwrap();
        let (table, bundle) = split_particles(star).unwrap();
        assert_eq!(table.n_rows(), 1);
        assert_eq!(bundle.table_name, "movies");
        assert!(bundle.optics.columns().is_empty());
        assert!(bundle.optics.is_empty());
        // Version falls back to the data block's
        assert_eq!(bundle.version.as_deref(), Some("30001"));

        assert_eq!(bundle.extra_blocks.len(), 1);
        let kept = &bundle.extra_blocks[0];
        assert_eq!(kept.name, "optics");
        assert_eq!(
            kept.body,
            StarBody::Pairs(vec![("_rlnOpticsGroup".to_string(), "1".to_string())])
        );

        // Written back after the data block, unchanged
        let joined = join_particles(&table, &bundle);
        assert_eq!(joined.blocks.len(), 2);
        assert_eq!(joined.blocks[0].name, "movies");
        assert_eq!(&joined.blocks[1], kept);
    }

    #[test]
    fn test_no_data_table() {
        let star: StarFile = "data_optics\nloop_\n_rlnOpticsGroup #1\n1\n".parse().unwrap();
        assert!(matches!(
            split_particles(star),
            Err(StarFileError::NoDataTable)
        ));
    }
}
