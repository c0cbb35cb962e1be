// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};
use xray_trace::{xray_debug, xray_warn};

use crate::constants::manifest::{DEFAULT_MANIFEST, SUPPORTED_VERSION};
use crate::constants::pattern::NO_RULE;
use crate::error::{ManifestError, ValidationError};
use crate::sampling_rule::{RuleId, SamplingRule};

/// Configuration for a single sampling rule, as written in a manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SamplingRuleConfig {
    /// Service name pattern to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// URL path pattern to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,

    /// HTTP method pattern to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    /// Requests sampled every second before `rate` applies
    #[serde(default)]
    pub fixed_target: i64,

    /// The sample rate to apply once `fixed_target` is exhausted (0.0-1.0)
    #[serde(default)]
    pub rate: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Display for SamplingRuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::json!(self))
    }
}

impl SamplingRuleConfig {
    fn has_patterns(&self) -> bool {
        [&self.service_name, &self.url_path, &self.http_method]
            .into_iter()
            .any(|pattern| pattern.as_deref().is_some_and(|p| p != NO_RULE))
    }

    fn into_rule(self, id: RuleId) -> Result<SamplingRule, ValidationError> {
        if self.fixed_target < 0 {
            return Err(ValidationError::NegativeFixedTarget {
                rule: id,
                fixed_target: self.fixed_target,
            });
        }
        if self.rate.is_nan() || self.rate < 0.0 {
            return Err(ValidationError::InvalidRate {
                rule: id,
                rate: self.rate,
            });
        }

        let rule = SamplingRule::new(
            self.service_name.as_deref().unwrap_or(NO_RULE),
            self.url_path.as_deref().unwrap_or(NO_RULE),
            self.http_method.as_deref().unwrap_or(NO_RULE),
            self.fixed_target as u64,
            self.rate,
        )
        .map_err(|source| ValidationError::Reservoir { rule: id, source })?;

        Ok(rule.with_description(self.description))
    }
}

/// A sampling manifest as read from JSON, before validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SamplingManifestConfig {
    #[serde(default)]
    pub version: i64,

    /// Rule applied when no rule of `rules` applies. Must not carry patterns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SamplingRuleConfig>,

    /// Rules evaluated in order, the first one that applies decides
    #[serde(default)]
    pub rules: Vec<SamplingRuleConfig>,
}

impl SamplingManifestConfig {
    /// Parse from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A validated, immutable set of sampling rules
#[derive(Debug)]
pub struct RuleManifest {
    version: i64,
    default_rule: SamplingRule,
    rules: Vec<SamplingRule>,
}

impl RuleManifest {
    /// Validates a parsed manifest. Either every rule, reservoir included, is built or the
    /// whole manifest is rejected.
    pub fn new(config: SamplingManifestConfig) -> Result<Self, ValidationError> {
        if config.version != SUPPORTED_VERSION {
            return Err(ValidationError::UnsupportedVersion(config.version));
        }

        let default = config.default.ok_or(ValidationError::MissingDefaultRule)?;
        if default.has_patterns() {
            return Err(ValidationError::DefaultRuleHasPatterns);
        }
        let default_rule = default.into_rule(RuleId::Default)?;

        let rules = config
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule.into_rule(RuleId::Rule(index)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleManifest {
            version: config.version,
            default_rule,
            rules,
        })
    }

    /// Parses and validates a JSON manifest
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let manifest = SamplingManifestConfig::from_slice(bytes)
            .map_err(ManifestError::from)
            .and_then(|config| Self::new(config).map_err(ManifestError::from));

        match &manifest {
            Ok(manifest) => xray_debug!(
                "Sampling: loaded manifest with {} rules",
                manifest.rules.len()
            ),
            Err(e) => xray_warn!("Sampling: rejected manifest: {e}"),
        }
        manifest
    }

    /// Reads, parses and validates a JSON manifest from the filesystem
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            xray_warn!("Sampling: unable to read manifest {}: {source}", path.display());
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        xray_debug!("Sampling: loading manifest from {}", path.display());
        Self::from_slice(&bytes)
    }

    /// The manifest bundled with this crate: the first request every second is sampled, then
    /// 5% of the rest
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::from_slice(DEFAULT_MANIFEST)
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn default_rule(&self) -> &SamplingRule {
        &self.default_rule
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[SamplingRule] {
        &self.rules
    }

    /// Finds the first rule that applies to the request, falling back to the default rule
    pub fn find_matching_rule(
        &self,
        service_name: &str,
        url_path: &str,
        http_method: &str,
    ) -> (RuleId, &SamplingRule) {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.applies_to(service_name, url_path, http_method))
            .map(|(index, rule)| (RuleId::Rule(index), rule))
            .unwrap_or((RuleId::Default, &self.default_rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservoir::{Reservoir, ReservoirConfigError};

    fn oversized_reservoir_error() -> ReservoirConfigError {
        Reservoir::new(100_000_000).unwrap_err()
    }

    fn parse(json: &str) -> Result<RuleManifest, ManifestError> {
        RuleManifest::from_slice(json.as_bytes())
    }

    fn validation_error(json: &str) -> ValidationError {
        match parse(json) {
            Err(ManifestError::Validation(e)) => e,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"
        {
            "version": 1,
            "default": {"fixed_target": 1, "rate": 0.05},
            "rules": [
                {
                    "description": "admin traffic",
                    "service_name": "web-*",
                    "http_method": "POST",
                    "url_path": "/admin/*",
                    "fixed_target": 10,
                    "rate": 0.5,
                    "host": "ignored"
                },
                {
                    "service_name": "*",
                    "http_method": "*",
                    "url_path": "*",
                    "fixed_target": 0,
                    "rate": 0.01
                }
            ]
        }
        "#;

        let config = SamplingManifestConfig::from_slice(json.as_bytes()).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].service_name.as_deref(), Some("web-*"));
        assert_eq!(config.rules[0].description.as_deref(), Some("admin traffic"));
        assert_eq!(config.rules[1].rate, 0.01);

        let manifest = RuleManifest::new(config).unwrap();
        assert_eq!(manifest.version(), 1);
        assert_eq!(manifest.default_rule().fixed_target(), 1);
        assert_eq!(manifest.default_rule().rate(), 0.05);
        assert_eq!(manifest.rules().len(), 2);
        assert_eq!(manifest.rules()[0].url_path(), "/admin/*");
        assert_eq!(manifest.rules()[0].fixed_target(), 10);
        assert_eq!(manifest.rules()[0].description(), Some("admin traffic"));
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest =
            parse(r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":[]}"#).unwrap();
        assert!(manifest.rules().is_empty());

        // `rules` may be omitted entirely
        let manifest = parse(r#"{"version":1,"default":{"fixed_target":0,"rate":0}}"#).unwrap();
        assert!(manifest.rules().is_empty());
    }

    #[test]
    fn test_bundled_manifest() {
        let manifest = RuleManifest::bundled().unwrap();
        assert_eq!(manifest.version(), 1);
        assert_eq!(manifest.default_rule().fixed_target(), 1);
        assert_eq!(manifest.default_rule().rate(), 0.05);
        assert!(manifest.rules().is_empty());
    }

    #[test]
    fn test_unsupported_version() {
        assert_eq!(
            validation_error(r#"{"version":2,"default":{"fixed_target":1,"rate":0.05}}"#),
            ValidationError::UnsupportedVersion(2)
        );
        assert_eq!(
            validation_error(r#"{"default":{"fixed_target":1,"rate":0.05}}"#),
            ValidationError::UnsupportedVersion(0)
        );
        assert_eq!(
            validation_error(r#"{"version":-1,"default":{"fixed_target":1,"rate":0.05}}"#),
            ValidationError::UnsupportedVersion(-1)
        );
    }

    #[test]
    fn test_missing_default_rule() {
        assert_eq!(
            validation_error(r#"{"version":1,"rules":[]}"#),
            ValidationError::MissingDefaultRule
        );
    }

    #[test]
    fn test_default_rule_with_patterns() {
        for pattern in ["service_name", "url_path", "http_method"] {
            let json = format!(
                r#"{{"version":1,"default":{{"{pattern}":"x","fixed_target":1,"rate":0.05}}}}"#
            );
            assert_eq!(
                validation_error(&json),
                ValidationError::DefaultRuleHasPatterns,
                "for {pattern}"
            );
        }

        // explicitly empty patterns are fine
        let manifest = parse(
            r#"{"version":1,"default":{"service_name":"","url_path":"","http_method":"","fixed_target":1,"rate":0.05}}"#,
        )
        .unwrap();
        assert!(manifest.default_rule().applies_to("", "", ""));
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(
            validation_error(r#"{"version":1,"default":{"fixed_target":-1,"rate":0.05}}"#),
            ValidationError::NegativeFixedTarget {
                rule: RuleId::Default,
                fixed_target: -1
            }
        );
        assert_eq!(
            validation_error(r#"{"version":1,"default":{"fixed_target":1,"rate":-0.5}}"#),
            ValidationError::InvalidRate {
                rule: RuleId::Default,
                rate: -0.5
            }
        );
        assert_eq!(
            validation_error(
                r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},
                    "rules":[{"service_name":"*","url_path":"*","http_method":"*","fixed_target":-3,"rate":0.1}]}"#
            ),
            ValidationError::NegativeFixedTarget {
                rule: RuleId::Rule(0),
                fixed_target: -3
            }
        );
    }

    #[test]
    fn test_oversized_reservoir_rejects_whole_manifest() {
        assert_eq!(
            validation_error(r#"{"version":1,"default":{"fixed_target":100000000,"rate":0.05}}"#),
            ValidationError::Reservoir {
                rule: RuleId::Default,
                source: oversized_reservoir_error(),
            }
        );

        let err = validation_error(
            r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":[
                {"service_name":"a","url_path":"*","http_method":"*","fixed_target":5,"rate":0.1},
                {"service_name":"b","url_path":"*","http_method":"*","fixed_target":100000000,"rate":0.1}
            ]}"#,
        );
        assert_eq!(
            err,
            ValidationError::Reservoir {
                rule: RuleId::Rule(1),
                source: oversized_reservoir_error(),
            }
        );
        assert!(err.to_string().starts_with("rule #1: reservoir of 100000000"));
    }

    #[test]
    fn test_malformed_manifest() {
        for json in [
            "",
            "not json",
            r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":{}}"#,
            r#"{"version":"1","default":{"fixed_target":1,"rate":0.05}}"#,
            r#"{"version":1,"default":{"fixed_target":1.5,"rate":0.05}}"#,
        ] {
            assert!(
                matches!(parse(json), Err(ManifestError::Format(_))),
                "expected format error for {json:?}"
            );
        }
    }

    #[test]
    fn test_find_matching_rule_is_first_match() {
        let manifest = parse(
            r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":[
                {"service_name":"*","url_path":"/admin/*","http_method":"*","fixed_target":0,"rate":0},
                {"service_name":"*","url_path":"*","http_method":"*","fixed_target":0,"rate":1}
            ]}"#,
        )
        .unwrap();

        let (id, rule) = manifest.find_matching_rule("svc", "/admin/x", "GET");
        assert_eq!(id, RuleId::Rule(0));
        assert_eq!(rule.url_path(), "/admin/*");

        let (id, _) = manifest.find_matching_rule("svc", "/public", "GET");
        assert_eq!(id, RuleId::Rule(1));
    }

    #[test]
    fn test_find_matching_rule_falls_back_to_default() {
        let manifest = parse(
            r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":[
                {"service_name":"checkout","url_path":"*","http_method":"GET","fixed_target":0,"rate":0}
            ]}"#,
        )
        .unwrap();

        let (id, rule) = manifest.find_matching_rule("billing", "/invoices", "GET");
        assert_eq!(id, RuleId::Default);
        assert_eq!(rule.rate(), 0.05);
    }

    #[test]
    fn test_config_serialization() {
        let config = SamplingManifestConfig {
            version: 1,
            default: Some(SamplingRuleConfig {
                fixed_target: 1,
                rate: 0.05,
                ..Default::default()
            }),
            rules: vec![SamplingRuleConfig {
                service_name: Some("checkout".to_string()),
                url_path: Some("*".to_string()),
                http_method: Some("GET".to_string()),
                fixed_target: 2,
                rate: 0.1,
                description: None,
            }],
        };

        let json = config.to_json().unwrap();
        assert!(json.contains(r#""default":{"fixed_target":1,"rate":0.05}"#));
        assert!(RuleManifest::from_slice(json.as_bytes()).is_ok());
        assert_eq!(
            config.rules[0].to_string(),
            r#"{"fixed_target":2,"http_method":"GET","rate":0.1,"service_name":"checkout","url_path":"*"}"#
        );
    }
}
