use super::MergeAppError;
use config::{Config, Environment, File, FileFormat};
use gtfs_merge_core::merge::MergeConfig;

/// prefix of environment variables read into the merge configuration, e.g.
/// `GTFS_MERGE_SURROGATE_OFFSET`.
pub const ENV_PREFIX: &str = "GTFS_MERGE";

/// values set on the command line, which take precedence over the
/// configuration file and the environment.
#[derive(Clone, Debug, Default)]
pub struct MergeOverrides {
    pub marker: Option<String>,
    pub surrogate_offset: Option<u64>,
    pub parallelism: Option<usize>,
    pub skip_fare_rules: bool,
    pub normalized_timezone: Option<String>,
    pub show_progress: bool,
}

/// builds the merge configuration from, in increasing precedence, the
/// defaults, an optional TOML file, `GTFS_MERGE_*` environment variables
/// and the command line.
pub fn load_merge_config(
    config_file: Option<&str>,
    overrides: &MergeOverrides,
) -> Result<MergeConfig, MergeAppError> {
    let mut builder = Config::builder();
    if let Some(path) = config_file {
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    }
    builder = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .set_override_option("marker", overrides.marker.clone())
        .and_then(|b| b.set_override_option("surrogate_offset", overrides.surrogate_offset))
        .and_then(|b| {
            b.set_override_option("parallelism", overrides.parallelism.map(|p| p as u64))
        })
        .and_then(|b| {
            b.set_override_option(
                "normalized_timezone",
                overrides.normalized_timezone.clone(),
            )
        })
        .map_err(|e| MergeAppError::ConfigReadError {
            msg: String::from("failed applying command line arguments"),
            source: e,
        })?;
    if overrides.skip_fare_rules {
        builder = builder
            .set_override("include_fare_rules", false)
            .map_err(|e| MergeAppError::ConfigReadError {
                msg: String::from("failed applying --skip-fare-rules"),
                source: e,
            })?;
    }
    if overrides.show_progress {
        builder = builder
            .set_override("show_progress", true)
            .map_err(|e| MergeAppError::ConfigReadError {
                msg: String::from("failed applying --show-progress"),
                source: e,
            })?;
    }

    let source_name = config_file.unwrap_or("<defaults>");
    let config = builder
        .build()
        .map_err(|e| MergeAppError::ConfigReadError {
            msg: format!("failed reading '{source_name}'"),
            source: e,
        })?;
    config
        .try_deserialize::<MergeConfig>()
        .map_err(|e| MergeAppError::ConfigReadError {
            msg: format!("failed deserializing merge configuration from '{source_name}'"),
            source: e,
        })
}
