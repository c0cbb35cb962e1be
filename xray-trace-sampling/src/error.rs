// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

use crate::reservoir::ReservoirConfigError;
use crate::sampling_rule::RuleId;

/// A manifest could not be turned into a sampling strategy
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read sampling manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed sampling manifest: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid sampling manifest: {0}")]
    Validation(#[from] ValidationError),
}

/// A manifest parsed correctly but breaks one of the manifest rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unsupported version {0}, only version 1 is supported")]
    UnsupportedVersion(i64),

    #[error("missing default rule")]
    MissingDefaultRule,

    #[error("default rule must not specify match patterns")]
    DefaultRuleHasPatterns,

    #[error("{rule} has a negative fixed_target ({fixed_target})")]
    NegativeFixedTarget { rule: RuleId, fixed_target: i64 },

    #[error("{rule} has an invalid rate ({rate})")]
    InvalidRate { rule: RuleId, rate: f64 },

    #[error("{rule}: {source}")]
    Reservoir {
        rule: RuleId,
        #[source]
        source: ReservoirConfigError,
    },
}
