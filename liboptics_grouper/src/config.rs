use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::ConfigError;
use super::extractor::KeyExtractor;

/// Structure representing the application configuration. Contains the filename patterns and
/// output naming.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gridsquare_pattern: String,
    pub afis_pattern: String,
    pub name_columns: Vec<String>,
    pub output_suffix: String,
    pub output_path: Option<PathBuf>,
    pub fallback_group: u32,
    pub optics_placeholder: String,
}

impl Default for Config {
    /// Generate a new Config object using the standard EPU naming
    fn default() -> Self {
        Self {
            gridsquare_pattern: String::from(GRIDSQUARE_PATTERN),
            afis_pattern: String::from(AFIS_PATTERN),
            name_columns: vec![
                String::from(MOVIE_NAME_COLUMN),
                String::from(MICROGRAPH_NAME_COLUMN),
            ],
            output_suffix: String::from(DEFAULT_OUTPUT_SUFFIX),
            output_path: None,
            fallback_group: FALLBACK_OPTICS_GROUP,
            optics_placeholder: String::from(OPTICS_PLACEHOLDER_VALUE),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        let config = serde_yaml::from_str::<Self>(&yaml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Check that the patterns compile and there is something to look for
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name_columns.is_empty() {
            return Err(ConfigError::NoNameColumns);
        }
        self.extractor()?;
        Ok(())
    }

    /// Build the KeyExtractor described by this config
    pub fn extractor(&self) -> Result<KeyExtractor, ConfigError> {
        Ok(KeyExtractor::new(
            &self.gridsquare_pattern,
            &self.afis_pattern,
        )?)
    }

    /// Get the path the output file should be written to.
    ///
    /// An explicit output_path always wins; otherwise the input's extension is replaced by
    /// `<suffix>.star`
    pub fn get_output_path(&self, input_path: &Path) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => derive_output_path(input_path, &self.output_suffix),
        }
    }
}

/// `dir/name.star` -> `dir/name<suffix>.star`
pub fn derive_output_path(input_path: &Path, suffix: &str) -> PathBuf {
    let mut name = input_path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    name.push(".");
    name.push(STAR_EXTENSION);
    input_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_output_path() {
        let config = Config::default();
        assert_eq!(
            config.get_output_path(Path::new("job003/movies.star")),
            PathBuf::from("job003/movies_optics_groups.star")
        );
        assert_eq!(
            config.get_output_path(Path::new("movies")),
            PathBuf::from("movies_optics_groups.star")
        );

        let explicit = Config {
            output_path: Some(PathBuf::from("out/grouped.star")),
            ..Config::default()
        };
        assert_eq!(
            explicit.get_output_path(Path::new("movies.star")),
            PathBuf::from("out/grouped.star")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_output_path_keeps_non_utf8_stem() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new("job003").join(OsStr::from_bytes(b"mov\xffies.star"));
        let output = derive_output_path(&input, DEFAULT_OUTPUT_SUFFIX);
        assert_eq!(
            output.file_name().unwrap().as_bytes(),
            b"mov\xffies_optics_groups.star"
        );
        assert_eq!(output.parent(), Some(Path::new("job003")));
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = Config {
            fallback_group: 0,
            ..Config::default()
        };
        config.write_config_file(&path).unwrap();
        assert_eq!(Config::read_config_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("fallback_group: 0\n").unwrap();
        assert_eq!(config.fallback_group, 0);
        assert_eq!(config.afis_pattern, AFIS_PATTERN);
    }

    #[test]
    fn test_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::read_config_file(&dir.path().join("missing.yaml")),
            Err(ConfigError::BadFilePath(_))
        ));

        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "gridsquare_pattern: 'GridSquare_\\w+'\n").unwrap();
        assert!(matches!(
            Config::read_config_file(&path),
            Err(ConfigError::PatternError(_))
        ));

        std::fs::write(&path, "name_columns: []\n").unwrap();
        assert!(matches!(
            Config::read_config_file(&path),
            Err(ConfigError::NoNameColumns)
        ));
    }
}
