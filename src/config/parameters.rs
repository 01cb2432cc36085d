//! Kinetic parameter sets keyed by rate-constant name

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A set of kinetic parameters (e.g. `CL`, `V1`, `KA`) keyed by name
///
/// Names are case-insensitive: keys are stored uppercase, so `cl` and `CL`
/// address the same entry. Which names are required is determined entirely by
/// the [`ModelConfig`](crate::config::ModelConfig) handed to the model
/// builder; entries beyond the required set are ignored.
///
/// # Example
///
/// ```
/// use pksol::config::Parameters;
///
/// let params = Parameters::new().with("CL", 5.0).with("v", 50.0);
/// assert_eq!(params.get("cl"), Some(5.0));
/// assert_eq!(params.get("V"), Some(50.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, f64>", into = "HashMap<String, f64>")]
pub struct Parameters {
    values: HashMap<String, f64>,
}

impl Parameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, consuming and returning the set for chaining
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or overwrite a parameter
    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_ascii_uppercase(), value);
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&name.to_ascii_uppercase()).copied()
    }

    /// Whether a parameter is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_uppercase())
    }

    /// Number of parameters in the set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fetch a required parameter, rejecting absent or unusable values
    ///
    /// Values must be finite and non-negative; zero is accepted here and only
    /// rejected later if the parameter ends up as a divisor.
    pub(crate) fn require(&self, name: &'static str) -> Result<f64, ConfigurationError> {
        let value = self
            .get(name)
            .ok_or_else(|| ConfigurationError::missing_parameter(name))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::invalid_parameter(name, value));
        }
        Ok(value)
    }
}

impl From<HashMap<String, f64>> for Parameters {
    fn from(map: HashMap<String, f64>) -> Self {
        let mut params = Self::new();
        for (name, value) in map {
            params.insert(&name, value);
        }
        params
    }
}

impl From<Parameters> for HashMap<String, f64> {
    fn from(params: Parameters) -> Self {
        params.values
    }
}

impl FromIterator<(&'static str, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (&'static str, f64)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
