// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared constants for the xray-trace-sampling crate

/// Sampling rate limits
pub mod rate {
    /// Maximum sampling rate
    pub const MAX_SAMPLE_RATE: f64 = 1.0;
    /// Minimum sampling rate
    pub const MIN_SAMPLE_RATE: f64 = 0.0;
}

/// Pattern matching constants
pub mod pattern {
    /// Marker for a pattern left unset in the manifest (empty string)
    pub const NO_RULE: &str = "";
    /// Pattern matching any subject, including the empty one
    pub const MATCH_ALL: &str = "*";
}

/// Reservoir constants
pub mod reservoir {
    /// Exclusive upper bound on a reservoir's capacity. Also the multiplier used to pack the
    /// epoch second next to the per-second counter in a single `u64`.
    pub const MAX_RATE: u64 = 100_000_000;
}

/// Manifest constants
pub mod manifest {
    /// The only manifest version this crate understands
    pub const SUPPORTED_VERSION: i64 = 1;

    /// Sample the first request every second, then 5% of the rest
    pub const DEFAULT_MANIFEST: &[u8] = include_bytes!("../resources/default_sampling_rules.json");
}

/// Sampling mechanism identifiers
///
/// These identify which mechanism was responsible for a positive sampling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SamplingMechanism {
    /// The matched rule still had reservoir capacity for the current second
    Reservoir = 0,

    /// The reservoir was exhausted and the rule's fallback rate selected the request
    FallbackRate = 1,
}
