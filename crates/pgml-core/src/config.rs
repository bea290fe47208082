//! # Evaluation Configuration
//!
//! Knobs that change how formulas are evaluated, never what they mean.
//!
//! Configuration can be built in code, parsed from TOML, or read from the
//! environment:
//!
//! ```toml
//! empty_domain = "reject"
//! memoize = true
//! ```
//!
//! | Variable            | Values                 | Default    |
//! |---------------------|------------------------|------------|
//! | `PGML_EMPTY_DOMAIN` | `extremal`, `reject`   | `extremal` |
//! | `PGML_MEMOIZE`      | `true/false`, `1/0`    | `false`    |

use crate::PgmlError;
use serde::Deserialize;

/// Environment variable selecting the empty domain policy.
pub const ENV_EMPTY_DOMAIN: &str = "PGML_EMPTY_DOMAIN";

/// Environment variable toggling memoization.
pub const ENV_MEMOIZE: &str = "PGML_MEMOIZE";

/// What Box and Diamond return when the model has no worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDomainPolicy {
    /// Min over nothing is 1, max over nothing is 0.
    ///
    /// The world index is not checked in this case: Box and Diamond on a
    /// zero-world model return these values for any `world`.
    #[default]
    Extremal,
    /// Fail with `PgmlError::EmptyDomain`.
    Reject,
}

impl EmptyDomainPolicy {
    fn parse(raw: &str) -> Result<Self, PgmlError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "extremal" => Ok(Self::Extremal),
            "reject" => Ok(Self::Reject),
            other => Err(PgmlError::Config(format!(
                "{}: unknown policy '{}' (expected extremal or reject)",
                ENV_EMPTY_DOMAIN, other
            ))),
        }
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Policy for modal aggregation over zero worlds.
    pub empty_domain: EmptyDomainPolicy,
    /// Cache `(node, world, track)` results within one evaluation call.
    pub memoize: bool,
}

impl EvalConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, PgmlError> {
        toml::from_str(source).map_err(|e| PgmlError::Config(e.to_string()))
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, PgmlError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unset keys take their default values; set but unparseable keys fail.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PgmlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_EMPTY_DOMAIN) {
            config.empty_domain = EmptyDomainPolicy::parse(&raw)?;
        }

        if let Some(raw) = lookup(ENV_MEMOIZE) {
            config.memoize = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(PgmlError::Config(format!(
                        "{}: expected a boolean, got '{}'",
                        ENV_MEMOIZE, other
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Set the empty domain policy.
    #[must_use]
    pub fn with_empty_domain(mut self, policy: EmptyDomainPolicy) -> Self {
        self.empty_domain = policy;
        self
    }

    /// Enable or disable memoization.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}
