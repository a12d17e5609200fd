use std::{env, path::PathBuf};

/// Environment variable naming the root directory for compiled artifacts.
pub const COMPILE_PATH_VAR: &str = "GERSHWIN_COMPILE_PATH";

/// Extension given to compiled artifacts.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "clj";

/// Runtime settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Where `compile` writes its artifacts.  Compiling without one is an error, loading doesn't
    /// need it.
    pub compile_path: Option<PathBuf>,

    pub artifact_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            compile_path: None,
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }
}

impl Config {
    /// Settings taken from the process environment.
    pub fn from_env() -> Config {
        let compile_path = env::var_os(COMPILE_PATH_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Config {
            compile_path,
            ..Config::default()
        }
    }

    pub fn with_compile_path(mut self, path: impl Into<PathBuf>) -> Config {
        self.compile_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_compile_path() {
        let config = Config::default();

        assert!(config.compile_path.is_none());
        assert_eq!(config.artifact_extension, "clj");
    }

    #[test]
    fn compile_path_can_be_set() {
        let config = Config::default().with_compile_path("/tmp/out");

        assert_eq!(config.compile_path, Some(PathBuf::from("/tmp/out")));
    }
}
