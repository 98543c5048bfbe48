//! Test reporting.
//!
//! The fixture layer talks to a [`ReportSink`]: it attaches files to a test
//! and records the test's outcome. [`ArtifactReporter`] is the file-based
//! sink shipped with the crate; it lays results out as
//!
//! ```text
//! <root>/<test>/<attachment>
//! <root>/<test>-result.json
//! ```

use crate::case::TestCase;
use crate::result::{E2eError, E2eResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

/// MIME type of trace archives
pub const ZIP_MIME: &str = "application/zip";

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// An assertion failed
    Failed,
    /// The test could not run to its assertions (browser, navigation, driver errors)
    Broken,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing or broken
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        !self.is_passed()
    }

    /// Status for a test that ended with `error`
    #[must_use]
    pub const fn for_error(error: &E2eError) -> Self {
        match error {
            E2eError::AssertionFailed { .. } => Self::Failed,
            _ => Self::Broken,
        }
    }
}

/// A file attached to a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name
    pub name: String,
    /// Where the sink stored the file
    pub path: PathBuf,
    /// MIME type
    pub mime: String,
}

/// Outcome of one test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// Test metadata
    pub case: TestCase,
    /// Test status
    pub status: TestStatus,
    /// Duration of test execution
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Files attached to the test
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Timestamp when the test completed
    pub finished_at: DateTime<Utc>,
}

impl TestRecord {
    /// Create a passing record
    #[must_use]
    pub fn passed(case: TestCase, duration: Duration) -> Self {
        Self {
            case,
            status: TestStatus::Passed,
            duration,
            error: None,
            attachments: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// Create a failing record
    #[must_use]
    pub fn failed(
        case: TestCase,
        status: TestStatus,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            case,
            status,
            duration,
            error: Some(error.into()),
            attachments: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.case.name
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Collaborator that receives attachments and test outcomes.
pub trait ReportSink: Send + Sync + Debug {
    /// Attach the file at `path` to `test`.
    ///
    /// The sink keeps its own copy; the caller may delete `path` afterwards.
    fn attach(&self, test: &str, name: &str, path: &Path, mime: &str) -> E2eResult<Attachment>;

    /// Record the outcome of a test, together with everything attached to it
    fn record(&self, record: TestRecord) -> E2eResult<()>;
}

/// Directory-backed [`ReportSink`]
#[derive(Debug)]
pub struct ArtifactReporter {
    root: PathBuf,
    pending: Mutex<HashMap<String, Vec<Attachment>>>,
    records: Mutex<Vec<TestRecord>>,
}

impl ArtifactReporter {
    /// Reporter writing under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pending: Mutex::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Output directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Records received so far
    #[must_use]
    pub fn records(&self) -> Vec<TestRecord> {
        lock(&self.records).clone()
    }

    /// Record for `test`, if one was received
    #[must_use]
    pub fn record_for(&self, test: &str) -> Option<TestRecord> {
        lock(&self.records)
            .iter()
            .rev()
            .find(|r| r.name() == test)
            .cloned()
    }

    /// Get number of passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        lock(&self.records)
            .iter()
            .filter(|r| r.status.is_passed())
            .count()
    }

    /// Get number of failed or broken tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        lock(&self.records)
            .iter()
            .filter(|r| r.status.is_failed())
            .count()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        let total = lock(&self.records).len();
        format!("{}/{} passed", self.passed_count(), total)
    }

    /// Path of the result file for `test`
    #[must_use]
    pub fn result_path(&self, test: &str) -> PathBuf {
        self.root.join(format!("{test}-result.json"))
    }
}

impl ReportSink for ArtifactReporter {
    fn attach(&self, test: &str, name: &str, path: &Path, mime: &str) -> E2eResult<Attachment> {
        let file_name = path.file_name().ok_or_else(|| E2eError::Fixture {
            message: format!("attachment {} has no file name", path.display()),
        })?;
        let dir = self.root.join(test);
        std::fs::create_dir_all(&dir)?;
        let stored = dir.join(file_name);
        let _ = std::fs::copy(path, &stored)?;

        let attachment = Attachment {
            name: name.to_string(),
            path: stored,
            mime: mime.to_string(),
        };
        lock(&self.pending)
            .entry(test.to_string())
            .or_default()
            .push(attachment.clone());
        Ok(attachment)
    }

    fn record(&self, mut record: TestRecord) -> E2eResult<()> {
        if let Some(attached) = lock(&self.pending).remove(record.name()) {
            record.attachments.extend(attached);
        }
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(self.result_path(record.name()), json)?;
        info!(
            test = record.name(),
            status = ?record.status,
            attachments = record.attachments.len(),
            "test recorded"
        );
        lock(&self.records).push(record);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_for_error() {
            assert_eq!(
                TestStatus::for_error(&E2eError::assertion("expected 6")),
                TestStatus::Failed
            );
            assert_eq!(
                TestStatus::for_error(&E2eError::ElementNotFound {
                    selector: "#user-name".to_string()
                }),
                TestStatus::Broken
            );
            assert!(TestStatus::Broken.is_failed());
            assert!(!TestStatus::Passed.is_failed());
        }
    }

    mod artifact_tests {
        use super::*;

        #[test]
        fn test_attach_copies_file() {
            let out = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let local = scratch.path().join("trace_t.zip");
            std::fs::write(&local, b"PK").unwrap();

            let reporter = ArtifactReporter::new(out.path());
            let attachment = reporter
                .attach("t", "Trace: view with a trace viewer", &local, ZIP_MIME)
                .unwrap();
            std::fs::remove_file(&local).unwrap();

            assert_eq!(attachment.path, out.path().join("t").join("trace_t.zip"));
            assert_eq!(std::fs::read(&attachment.path).unwrap(), b"PK");
        }

        #[test]
        fn test_record_collects_pending_attachments() {
            let out = tempfile::tempdir().unwrap();
            let local = out.path().join("shot.png");
            std::fs::write(&local, [0x89, b'P']).unwrap();

            let reporter = ArtifactReporter::new(out.path().join("results"));
            let _ = reporter.attach("t", "shot", &local, "image/png").unwrap();
            reporter
                .record(TestRecord::failed(
                    TestCase::new("t"),
                    TestStatus::Failed,
                    Duration::from_millis(12),
                    "boom",
                ))
                .unwrap();

            let record = reporter.record_for("t").unwrap();
            assert_eq!(record.attachments.len(), 1);
            assert_eq!(record.attachments[0].mime, "image/png");

            let json: serde_json::Value =
                serde_json::from_slice(&std::fs::read(reporter.result_path("t")).unwrap())
                    .unwrap();
            assert_eq!(json["status"], "failed");
            assert_eq!(json["duration"], 12);
            assert_eq!(json["error"], "boom");
        }

        #[test]
        fn test_counts_and_summary() {
            let out = tempfile::tempdir().unwrap();
            let reporter = ArtifactReporter::new(out.path());
            reporter
                .record(TestRecord::passed(TestCase::new("a"), Duration::ZERO))
                .unwrap();
            reporter
                .record(TestRecord::failed(
                    TestCase::new("b"),
                    TestStatus::Broken,
                    Duration::ZERO,
                    "driver gone",
                ))
                .unwrap();
            assert_eq!(reporter.passed_count(), 1);
            assert_eq!(reporter.failed_count(), 1);
            assert_eq!(reporter.summary(), "1/2 passed");
            assert!(reporter.record_for("a").unwrap().attachments.is_empty());
        }

        #[test]
        fn test_attach_missing_file_fails() {
            let out = tempfile::tempdir().unwrap();
            let reporter = ArtifactReporter::new(out.path());
            let err = reporter
                .attach("t", "gone", &out.path().join("nope.zip"), ZIP_MIME)
                .unwrap_err();
            assert!(matches!(err, E2eError::Io(_)));
        }
    }
}
