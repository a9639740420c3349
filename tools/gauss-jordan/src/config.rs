use inversion::InversionConfig;
use serde::Deserialize;
use std::path::Path;

/// The prefix used by environment variables overriding the configuration.
pub const ENV_PREFIX: &str = "GAUSS_JORDAN";

/// The main config type.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    /// The inversion parameters.
    #[serde(default)]
    pub inversion: InversionConfig,

    /// The matrix to invert.
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// What to print once done.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load the configuration, optionally from a YAML file.
    ///
    /// Any of the configuration properties can also be overridden by using environment variables. For example,
    /// `inversion.process_count` can be set by using `GAUSS_JORDAN__INVERSION__PROCESS_COUNT=4`. Note the double
    /// underscores to delimit segments and single underscores to refer to fields.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_environment(path, Self::environment())
    }

    /// The environment source used by [Config::load].
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).separator("__")
    }

    /// Load the configuration from an optional YAML file and an environment source.
    ///
    /// Values coming from the environment take precedence over the ones in the file.
    pub fn load_with_environment(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Yaml));
        }
        builder.add_source(environment).build()?.try_deserialize()
    }
}

/// The matrix configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MatrixConfig {
    /// The number of rows and columns.
    #[serde(default = "default_size")]
    pub size: usize,

    /// The seed for the random entries. A random one is picked if not set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { size: default_size(), seed: None }
    }
}

fn default_size() -> usize {
    5
}

/// The output configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Whether to print the input matrix, its inverse and their product.
    #[serde(default)]
    pub print_matrices: bool,
}
