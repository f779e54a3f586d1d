// Column names used by RELION 3.1+ STAR files
pub const OPTICS_GROUP_COLUMN: &str = "_rlnOpticsGroup";
pub const OPTICS_GROUP_NAME_COLUMN: &str = "_rlnOpticsGroupName";
pub const MOVIE_NAME_COLUMN: &str = "_rlnMicrographMovieName";
pub const MICROGRAPH_NAME_COLUMN: &str = "_rlnMicrographName";

// Block names
pub const OPTICS_BLOCK_NAME: &str = "optics";
pub const DEFAULT_STAR_VERSION: &str = "30001";

// EPU acquisition filename patterns. Capture group 1 is the value of interest.
// GridSquare_XXXXXXX
pub const GRIDSQUARE_PATTERN: &str = r"GridSquare_(\w+)";
// Data_......._*_........_......_fractions, where * is the AFIS group
pub const AFIS_PATTERN: &str = r"Data_[^_]+_(\d+)_[^_]+_[^_]+_fractions";

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_optics_groups";
pub const STAR_EXTENSION: &str = "star";

/// Optics group given to rows whose filename could not be parsed
pub const FALLBACK_OPTICS_GROUP: u32 = 1;
/// Value used for optics columns when there is no template row to copy from
pub const OPTICS_PLACEHOLDER_VALUE: &str = "1.000000";
