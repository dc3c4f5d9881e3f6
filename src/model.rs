use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Host-runner result document
// ---------------------------------------------------------------------------

/// Final status of a single test method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    /// Canonical status string written to the store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test method invocation as reported by the host runner.
///
/// Data-driven tests appear once per parameter set; the first parameter
/// value disambiguates the invocations in the composed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub class_name: String,
    pub method_name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    pub start_millis: i64,
    pub end_millis: i64,
    pub status: TestStatus,
}

impl TestOutcome {
    /// Composes the ledger key: `<class>#<method>`, suffixed with
    /// `@<firstParameterValue>` for data-driven invocations.
    #[must_use]
    pub fn test_key(&self) -> String {
        match self.parameters.first() {
            Some(first) => format!("{}#{}@{}", self.class_name, self.method_name, first),
            None => format!("{}#{}", self.class_name, self.method_name),
        }
    }

    /// Wall-clock duration in milliseconds, clamped to zero when the
    /// runner reports a negative interval.
    #[must_use]
    pub fn duration_millis(&self) -> i64 {
        (self.end_millis - self.start_millis).max(0)
    }
}

/// Placeholder left behind when the build system never expanded the
/// platform property.
const PLATFORM_PLACEHOLDER: &str = "current.platform";
/// Placeholder left behind when the build system never expanded the
/// build-number property.
const BUILD_PLACEHOLDER: &str = "current.build";

/// Run metadata reported alongside each suite.
///
/// Build number and platform arrive as raw strings and may be absent or
/// contain unexpanded build-property placeholders; the `resolved_*`
/// accessors apply the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub component: String,
    pub version: String,
    #[serde(default)]
    pub build_number: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl RunMetadata {
    /// True when the version carries a pre-release snapshot marker.
    /// Matched case-insensitively: Maven-style versions conventionally
    /// upper-case it, but that is not guaranteed.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.version.to_ascii_lowercase().contains("snapshot")
    }

    /// Platform identifier, defaulting to `DEFAULT` when absent, empty,
    /// or unexpanded.
    #[must_use]
    pub fn resolved_platform(&self) -> String {
        match self.platform.as_deref() {
            Some(raw) if !raw.trim().is_empty() && !raw.contains(PLATFORM_PLACEHOLDER) => {
                raw.to_owned()
            }
            _ => "DEFAULT".to_owned(),
        }
    }

    /// Build number, defaulting to 1 when absent, empty, or unexpanded.
    ///
    /// A present but unparseable value is an error: publishing the suite
    /// under a fabricated build number would silently misfile results.
    pub fn resolved_build_number(&self) -> crate::error::LedgerResult<i64> {
        match self.build_number.as_deref() {
            Some(raw) if !raw.trim().is_empty() && !raw.contains(BUILD_PLACEHOLDER) => raw
                .trim()
                .parse::<i64>()
                .map_err(|error| {
                    crate::error::LedgerError::InvalidMetadata(format!(
                        "build number `{raw}` is not an integer: {error}"
                    ))
                }),
            _ => Ok(1),
        }
    }
}

/// One suite's worth of results: metadata plus the three result sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResult {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    #[serde(default)]
    pub passed: Vec<TestOutcome>,
    #[serde(default)]
    pub failed: Vec<TestOutcome>,
    #[serde(default)]
    pub skipped: Vec<TestOutcome>,
}

impl SuiteResult {
    /// Total number of invocations across the three result sets.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.passed.len() + self.failed.len() + self.skipped.len()
    }
}

/// Top-level document emitted by the host runner at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDocument {
    pub suites: Vec<SuiteResult>,
}

// ---------------------------------------------------------------------------
// Ledger rows
// ---------------------------------------------------------------------------

/// The flattened row handed to a [`crate::storage::ResultStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub component: String,
    pub version: String,
    pub build_number: i64,
    pub platform: String,
    pub test_key: String,
    pub duration_millis: i64,
    pub status: String,
}

/// A [`TestRecord`] as read back from the SQLite ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: i64,
    pub recorded_at_rfc3339: String,
    #[serde(flatten)]
    pub record: TestRecord,
}

/// Counters accumulated over one publish pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSummary {
    pub suites_seen: usize,
    pub suites_suppressed: usize,
    pub suites_failed: usize,
    pub records_published: usize,
    pub records_failed: usize,
}
