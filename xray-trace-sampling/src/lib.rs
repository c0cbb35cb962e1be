// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local, rule based trace sampling
//!
//! This crate provides:
//! - Case insensitive glob matching of request attributes
//! - Per-second reservoirs bounding the number of guaranteed samples
//! - Sampling manifests: ordered rules plus a mandatory default rule
//! - A strategy deciding, per request, whether its trace should be recorded
//!
//! ```
//! use xray_trace_sampling::LocalizedStrategy;
//!
//! let strategy = LocalizedStrategy::from_slice(
//!     br#"{"version": 1, "default": {"fixed_target": 1, "rate": 0.05}, "rules": []}"#,
//! )
//! .unwrap();
//!
//! let _keep = strategy.should_trace("checkout", "/cart", "POST");
//! ```

pub mod constants;
pub mod error;
pub mod glob_matcher;
pub mod localized_strategy;
pub mod manifest;
pub mod reservoir;
pub mod sampling_rule;

// Re-exports for convenient usage
pub use constants::SamplingMechanism;
pub use error::{ManifestError, ValidationError};
pub use glob_matcher::{wildcard_match, GlobMatcher};
pub use localized_strategy::{
    LocalizedStrategy, SamplingDecision, SamplingRequest, SamplingStrategy,
};
pub use manifest::{RuleManifest, SamplingManifestConfig, SamplingRuleConfig};
pub use reservoir::{Reservoir, ReservoirConfigError};
pub use sampling_rule::{RuleId, SamplingRule};
