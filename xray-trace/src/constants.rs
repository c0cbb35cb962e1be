// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Names of the configuration keys read from the environment

/// Path of a local sampling manifest
pub const XRAY_SAMPLING_RULES_PATH: &str = "XRAY_SAMPLING_RULES_PATH";
/// Name of the instrumented service
pub const XRAY_SERVICE_NAME: &str = "XRAY_SERVICE_NAME";
/// `RUNTIME_ERROR` or `LOG_ERROR`
pub const XRAY_CONTEXT_MISSING: &str = "XRAY_CONTEXT_MISSING";
/// `DEBUG`, `INFO`, `WARN`, `ERROR` or `OFF`
pub const XRAY_LOG_LEVEL: &str = "XRAY_LOG_LEVEL";
