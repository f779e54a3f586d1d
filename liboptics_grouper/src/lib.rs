//! # optics_grouper
//!
//! optics_grouper assigns RELION optics groups to movies (or micrographs, or particles) based
//! on where they were collected. It takes a STAR file whose filenames follow the EPU naming
//! convention, finds the GridSquare and AFIS (aberration-free image shift) group of every
//! movie, and gives each distinct (GridSquare, AFIS) combination its own optics group. The
//! result is written to a new STAR file alongside the input, with a freshly built
//! `data_optics` table containing one entry per group.
//!
//! ## Installation
//!
//! Currently the only method of install is from source. If you have not used Rust before, you
//! will most likely need to install the Rust tool chain. See the
//! [Rust docs](https://www.rust-lang.org/tools/install) for installation instructions.
//!
//! To build and install the CLI use `cargo install --path ./optics_grouper_cli` from the top
//! level optics_grouper repository.
//!
//! ## Use
//!
//! ```bash
//! optics_grouper_cli movies.star
//! ```
//!
//! writes `movies_optics_groups.star` next to `movies.star`.
//!
//! ## Filename patterns
//!
//! Two patterns are searched for in the `_rlnMicrographMovieName` column (or
//! `_rlnMicrographName` if there is no movie column):
//!
//! - GridSquare: `GridSquare_(\w+)`
//! - AFIS group: `Data_[^_]+_(\d+)_[^_]+_[^_]+_fractions`
//!
//! A typical EPU movie path such as
//! `Movies/GridSquare_8754321/Data/FoilHole_8771234_Data_8761122_27_20240101_101010_fractions.tiff`
//! belongs to GridSquare `8754321`, AFIS group `27`. Groups are numbered from 1 in order of
//! GridSquare, then AFIS group, so the numbering is the same every time the same data is run.
//!
//! Movies whose names do not match both patterns are reported and placed in optics group 1.
//!
//! ## Configuration
//!
//! The patterns and naming can be changed with a YAML configuration file (see
//! `optics_grouper_cli new`). The format is as follows:
//!
//! ```yml
//! gridsquare_pattern: GridSquare_(\w+)
//! afis_pattern: Data_[^_]+_(\d+)_[^_]+_[^_]+_fractions
//! name_columns:
//! - _rlnMicrographMovieName
//! - _rlnMicrographName
//! output_suffix: _optics_groups
//! output_path: null
//! fallback_group: 1
//! optics_placeholder: '1.000000'
//! ```
//!
//! Setting `fallback_group` to 0 keeps unparseable movies out of the real optics groups.
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod optics_groups;
pub mod particles;
pub mod process;
pub mod rewriter;
pub mod star_file;
