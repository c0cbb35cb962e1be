// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::constants::rate::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use crate::constants::SamplingMechanism;
use crate::glob_matcher::GlobMatcher;
use crate::reservoir::{Reservoir, ReservoirConfigError};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// Uniform draw in `[0, 1)`
fn random_unit() -> f64 {
    RNG.with(|rng| rng.borrow_mut().gen::<f64>())
}

/// Identifies which rule of a manifest made a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// Position of the rule in the manifest's `rules` list
    Rule(usize),
    /// The manifest's default rule
    Default,
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleId::Rule(index) => write!(f, "rule #{index}"),
            RuleId::Default => write!(f, "default rule"),
        }
    }
}

/// A sampling rule: which requests it applies to, and how many of them it keeps
#[derive(Debug)]
pub struct SamplingRule {
    service_name: GlobMatcher,
    url_path: GlobMatcher,
    http_method: GlobMatcher,

    /// Requests guaranteed to be sampled every second
    fixed_target: u64,
    /// Probability of sampling once `fixed_target` is exhausted for the second
    rate: f64,

    description: Option<String>,
    reservoir: Reservoir,
}

impl SamplingRule {
    /// Creates a new sampling rule, along with a reservoir of `fixed_target` samples per second
    pub fn new(
        service_name: &str,
        url_path: &str,
        http_method: &str,
        fixed_target: u64,
        rate: f64,
    ) -> Result<Self, ReservoirConfigError> {
        Ok(SamplingRule {
            service_name: GlobMatcher::new(service_name),
            url_path: GlobMatcher::new(url_path),
            http_method: GlobMatcher::new(http_method),
            fixed_target,
            rate,
            description: None,
            reservoir: Reservoir::new(fixed_target)?,
        })
    }

    pub(crate) fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn service_name(&self) -> &str {
        self.service_name.pattern()
    }

    pub fn url_path(&self) -> &str {
        self.url_path.pattern()
    }

    pub fn http_method(&self) -> &str {
        self.http_method.pattern()
    }

    pub fn fixed_target(&self) -> u64 {
        self.fixed_target
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Checks if this rule applies to the request. All three patterns are matched case
    /// insensitively and must all match.
    pub fn applies_to(&self, service_name: &str, url_path: &str, http_method: &str) -> bool {
        self.service_name.matches(service_name)
            && self.url_path.matches(url_path)
            && self.http_method.matches(http_method)
    }

    /// Decides whether a request this rule applies to should be sampled
    pub fn sample(&self) -> bool {
        self.sample_with_mechanism().is_some()
    }

    /// Like [`SamplingRule::sample`], also reporting which mechanism kept the request.
    ///
    /// The reservoir is always consulted first, the rate only applies to the overflow.
    pub fn sample_with_mechanism(&self) -> Option<SamplingMechanism> {
        if self.reservoir.take() {
            return Some(SamplingMechanism::Reservoir);
        }
        self.sample_rate().then_some(SamplingMechanism::FallbackRate)
    }

    fn sample_rate(&self) -> bool {
        // Fast-path for sample rate of 0.0 (always drop) or 1.0 (always sample)
        if self.rate <= MIN_SAMPLE_RATE {
            return false;
        }
        if self.rate >= MAX_SAMPLE_RATE {
            return true;
        }
        random_unit() < self.rate
    }
}
