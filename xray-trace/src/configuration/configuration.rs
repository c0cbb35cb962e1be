// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, path::PathBuf, str::FromStr};

use super::sources::{CompositeConfigSourceResult, CompositeSource, ConfigSourceOrigin};
use crate::constants::{
    XRAY_CONTEXT_MISSING, XRAY_LOG_LEVEL, XRAY_SAMPLING_RULES_PATH, XRAY_SERVICE_NAME,
};
use crate::log::LevelFilter;

/// What instrumentation does when it needs an active trace context and none exists.
///
/// Chosen once when the configuration is built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ContextMissingStrategy {
    /// Surface the missing context as an error to the caller
    RuntimeError,
    /// Log the missing context and carry on
    #[default]
    LogError,
}

impl FromStr for ContextMissingStrategy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("runtime_error") {
            Ok(ContextMissingStrategy::RuntimeError)
        } else if s.eq_ignore_ascii_case("log_error") {
            Ok(ContextMissingStrategy::LogError)
        } else {
            Err("context missing strategy should be one of RUNTIME_ERROR, LOG_ERROR")
        }
    }
}

impl fmt::Display for ContextMissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self {
            ContextMissingStrategy::RuntimeError => "RUNTIME_ERROR",
            ContextMissingStrategy::LogError => "LOG_ERROR",
        };
        write!(f, "{strategy}")
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
/// Configuration for the X-Ray tracing crates
///
/// # Usage
/// ```
/// use xray_trace::Config;
///
/// // This pulls configuration from the environment
/// let mut builder = Config::builder();
///
/// // Manual overrides
/// builder
///     .set_service_name("checkout".to_string())
///     .set_sampling_rules_path("/etc/xray/sampling.json".into());
///
/// let config = builder.build();
/// assert_eq!(config.service_name(), "checkout");
/// ```
pub struct Config {
    /// Name of the instrumented service
    service_name: String,
    /// Local sampling manifest. The bundled manifest is used when unset
    sampling_rules_path: Option<PathBuf>,
    context_missing: ContextMissingStrategy,
    log_level: LevelFilter,
    /// Where the sampling manifest path came from
    sampling_rules_origin: ConfigSourceOrigin,
}

impl Config {
    fn from_sources(sources: &CompositeSource) -> Self {
        let default = Config::default();

        /// Helper function to convert a CompositeConfigSourceResult<T> into an Option<T>
        /// Values that failed to parse are reported and skipped
        fn to_val<T>(res: CompositeConfigSourceResult<T>) -> Option<T> {
            for err in &res.errors {
                crate::xray_warn!(
                    "Configuration: ignoring {}={:?} from {:?}: {}",
                    res.name,
                    err.value,
                    err.origin,
                    err.error
                );
            }
            res.value.map(|c| c.value)
        }

        let (sampling_rules_path, sampling_rules_origin) = match sources
            .get(XRAY_SAMPLING_RULES_PATH)
            .value
            .filter(|c| !c.value.trim().is_empty())
        {
            Some(c) => (Some(PathBuf::from(c.value)), c.origin),
            None => (default.sampling_rules_path, default.sampling_rules_origin),
        };

        Self {
            service_name: to_val(sources.get(XRAY_SERVICE_NAME)).unwrap_or(default.service_name),
            sampling_rules_path,
            context_missing: to_val(sources.get_parse(XRAY_CONTEXT_MISSING))
                .unwrap_or(default.context_missing),
            log_level: to_val(sources.get_parse(XRAY_LOG_LEVEL)).unwrap_or(default.log_level),
            sampling_rules_origin,
        }
    }

    fn builder_with_sources(sources: &CompositeSource) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::from_sources(sources),
        }
    }

    /// Creates a new builder to set overrides detected configuration
    pub fn builder() -> ConfigBuilder {
        Self::builder_with_sources(&CompositeSource::default_sources())
    }

    /// Name reported for the instrumented service. Read by the instrumentation layer that
    /// records segments, the sampling crates do not use it.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn sampling_rules_path(&self) -> Option<&std::path::Path> {
        self.sampling_rules_path.as_deref()
    }

    pub fn sampling_rules_origin(&self) -> ConfigSourceOrigin {
        self.sampling_rules_origin
    }

    /// Behavior of the instrumentation layer when it needs a trace context and none is
    /// active. Sampling decisions do not depend on it.
    pub fn context_missing(&self) -> ContextMissingStrategy {
        self.context_missing
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_name: "unnamed-rust-service".to_string(),
            sampling_rules_path: None,
            context_missing: ContextMissingStrategy::default(),
            log_level: LevelFilter::default(),
            sampling_rules_origin: ConfigSourceOrigin::Default,
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Finalizes the builder and returns the configuration
    ///
    /// This also applies the configured log level to the `xray_*!` macros.
    pub fn build(self) -> Config {
        crate::log::set_max_level(self.config.log_level);
        self.config
    }

    pub fn set_service_name(&mut self, service_name: String) -> &mut Self {
        self.config.service_name = service_name;
        self
    }

    pub fn set_sampling_rules_path(&mut self, path: PathBuf) -> &mut Self {
        self.config.sampling_rules_path = Some(path);
        self.config.sampling_rules_origin = ConfigSourceOrigin::Code;
        self
    }

    pub fn set_context_missing(&mut self, strategy: ContextMissingStrategy) -> &mut Self {
        self.config.context_missing = strategy;
        self
    }

    pub fn set_log_level(&mut self, log_level: LevelFilter) -> &mut Self {
        self.config.log_level = log_level;
        self
    }
}
