// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;

use xray_trace::{xray_debug, Config};

use crate::constants::SamplingMechanism;
use crate::error::ManifestError;
use crate::manifest::RuleManifest;
use crate::sampling_rule::RuleId;

/// The attributes of an inbound request that sampling rules match against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingRequest<'a> {
    pub service_name: &'a str,
    pub url_path: &'a str,
    pub http_method: &'a str,
}

impl<'a> SamplingRequest<'a> {
    pub fn new(service_name: &'a str, url_path: &'a str, http_method: &'a str) -> Self {
        SamplingRequest {
            service_name,
            url_path,
            http_method,
        }
    }
}

/// Outcome of a sampling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingDecision {
    /// The rule that made the decision
    pub rule: RuleId,
    /// Why the request was sampled, `None` if it was not
    pub mechanism: Option<SamplingMechanism>,
}

impl SamplingDecision {
    pub fn is_sampled(&self) -> bool {
        self.mechanism.is_some()
    }
}

/// Decides, per request, whether its trace should be recorded
pub trait SamplingStrategy: Send + Sync {
    fn decide(&self, request: &SamplingRequest<'_>) -> SamplingDecision;
}

/// Samples requests with the rules of a local manifest.
///
/// Rules are evaluated in manifest order and the first one that applies decides. Requests no
/// rule applies to are decided by the manifest's default rule.
///
/// Cloning is cheap and clones share the rules' reservoirs.
#[derive(Debug, Clone)]
pub struct LocalizedStrategy {
    manifest: Arc<RuleManifest>,
}

impl LocalizedStrategy {
    /// Creates a strategy from the bundled manifest: the first request every second is
    /// sampled, then 5% of the rest
    pub fn new() -> Result<Self, ManifestError> {
        RuleManifest::bundled().map(Self::from_manifest)
    }

    /// Creates a strategy from an already validated manifest
    pub fn from_manifest(manifest: RuleManifest) -> Self {
        LocalizedStrategy {
            manifest: Arc::new(manifest),
        }
    }

    /// Creates a strategy from the JSON bytes of a manifest
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        RuleManifest::from_slice(bytes).map(Self::from_manifest)
    }

    /// Creates a strategy from a JSON manifest on the local filesystem
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        RuleManifest::from_path(path).map(Self::from_manifest)
    }

    /// Creates a strategy from the manifest path of the configuration, or from the bundled
    /// manifest if no path is configured
    pub fn from_config(config: &Config) -> Result<Self, ManifestError> {
        match config.sampling_rules_path() {
            Some(path) => {
                xray_debug!(
                    "Sampling: using manifest {} (from {:?})",
                    path.display(),
                    config.sampling_rules_origin()
                );
                Self::from_path(path)
            }
            None => {
                xray_debug!("Sampling: no manifest configured, using the bundled rules");
                Self::new()
            }
        }
    }

    pub fn manifest(&self) -> &RuleManifest {
        &self.manifest
    }

    /// Returns whether a request with these attributes should be traced
    pub fn should_trace(&self, service_name: &str, url_path: &str, http_method: &str) -> bool {
        self.decide(&SamplingRequest::new(service_name, url_path, http_method))
            .is_sampled()
    }
}

impl SamplingStrategy for LocalizedStrategy {
    fn decide(&self, request: &SamplingRequest<'_>) -> SamplingDecision {
        let (rule_id, rule) = self.manifest.find_matching_rule(
            request.service_name,
            request.url_path,
            request.http_method,
        );
        SamplingDecision {
            rule: rule_id,
            mechanism: rule.sample_with_mechanism(),
        }
    }
}
