//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A parameter set which can check its own invariants after being loaded.
pub trait Validate {
    /// Check the parameters, returning a description of the first violated invariant.
    fn validate(&self) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (NAV_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "params" directory in the software root.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned + Validate,
{
    // Get the params dir
    let mut path = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned + Validate,
    F: AsRef<Path>,
{
    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e)),
    };

    from_str(params_str.as_str())
}

/// Parse and validate parameters from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned + Validate,
{
    // Parse the string into the parameter struct
    let params: P = match toml::from_str(params_str) {
        Ok(p) => p,
        Err(e) => return Err(LoadError::DeserialiseError(e)),
    };

    params.validate().map_err(LoadError::InvalidParams)?;

    Ok(params)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Gains {
        k_p: f64,
        k_i: f64,
    }

    impl Validate for Gains {
        fn validate(&self) -> Result<(), String> {
            if self.k_p < 0.0 || self.k_i < 0.0 {
                return Err("gains must be non-negative".into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_from_str() {
        let g: Gains = from_str("k_p = 8.0\nk_i = 0.5\n").unwrap();
        assert_eq!(g.k_p, 8.0);
        assert_eq!(g.k_i, 0.5);

        assert!(matches!(
            from_str::<Gains>("k_p = -1.0\nk_i = 0.5\n"),
            Err(LoadError::InvalidParams(_))
        ));
        assert!(matches!(
            from_str::<Gains>("k_p = \"eight\"\n"),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gains.toml");
        std::fs::write(&path, "k_p = 1.0\nk_i = 2.0\n").unwrap();

        let g: Gains = load_from_path(&path).unwrap();
        assert_eq!(g.k_i, 2.0);

        assert!(matches!(
            load_from_path::<Gains, _>(dir.path().join("missing.toml")),
            Err(LoadError::FileLoadError(_))
        ));
    }
}
