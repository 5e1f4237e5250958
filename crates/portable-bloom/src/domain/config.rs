//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```
//! use portable_bloom::{BloomConfigBuilder, BloomFilter, ProbeGenerator};
//!
//! let config = BloomConfigBuilder::new()
//!     .ideal_element_count(100_000)
//!     .error_rate(0.001)
//!     .generator(ProbeGenerator::Mersenne)
//!     .build()
//!     .expect("Valid config");
//!
//! let filter = BloomFilter::from_config(&config).expect("Valid filter");
//! assert_eq!(filter.num_probes(), 10);
//! ```

use crate::domain::parameters::FilterParameters;
use crate::domain::probes::ProbeGenerator;
use crate::error::FilterError;
use serde::{Deserialize, Serialize};

/// Bloom filter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Expected number of elements (n)
    pub ideal_element_count: u64,
    /// Target false positive rate (p), strictly between 0 and 1
    pub error_rate: f64,
    /// Probe generator used for add/contains
    pub generator: ProbeGenerator,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            ideal_element_count: 1000,
            error_rate: 0.001,
            generator: ProbeGenerator::Murmur,
        }
    }
}

impl BloomConfig {
    /// Create a new configuration with validation
    pub fn new(
        ideal_element_count: u64,
        error_rate: f64,
        generator: ProbeGenerator,
    ) -> Result<Self, FilterError> {
        let config = Self {
            ideal_element_count,
            error_rate,
            generator,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate that the configuration derives a usable filter
    pub fn validate(&self) -> Result<(), FilterError> {
        self.parameters().map(|_| ())
    }

    /// Derived sizing for this configuration
    pub fn parameters(&self) -> Result<FilterParameters, FilterError> {
        FilterParameters::derive(self.ideal_element_count, self.error_rate)
    }

    /// Parse a configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FilterError::InvalidParameter(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the expected element count
    pub fn with_ideal_element_count(mut self, count: u64) -> Self {
        self.ideal_element_count = count;
        self
    }

    /// Builder-style method to set the error rate
    pub fn with_error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate;
        self
    }

    /// Builder-style method to set the probe generator
    pub fn with_generator(mut self, generator: ProbeGenerator) -> Self {
        self.generator = generator;
        self
    }
}

/// Builder for BloomConfig with validation
#[derive(Default)]
pub struct BloomConfigBuilder {
    ideal_element_count: Option<u64>,
    error_rate: Option<f64>,
    generator: Option<ProbeGenerator>,
}

impl BloomConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of elements (must be > 0)
    pub fn ideal_element_count(mut self, count: u64) -> Self {
        self.ideal_element_count = Some(count);
        self
    }

    /// Set the target false positive rate (must be in (0, 1))
    pub fn error_rate(mut self, rate: f64) -> Self {
        self.error_rate = Some(rate);
        self
    }

    /// Set the probe generator
    pub fn generator(mut self, generator: ProbeGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the BloomConfig, validating all parameters
    pub fn build(self) -> Result<BloomConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> BloomConfig {
        let defaults = BloomConfig::default();

        BloomConfig {
            ideal_element_count: self
                .ideal_element_count
                .unwrap_or(defaults.ideal_element_count),
            error_rate: self.error_rate.unwrap_or(defaults.error_rate),
            generator: self.generator.unwrap_or(defaults.generator),
        }
    }
}
