//! Per-test metadata: severity, feature, story and tags.
//!
//! Metadata is descriptive only. It is written into the test record and
//! never changes how a test runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How bad a failure of the test is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks further testing
    Blocker,
    /// Core flow broken
    Critical,
    /// Regular functionality
    #[default]
    Normal,
    /// Secondary functionality
    Minor,
    /// Cosmetic
    Trivial,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        };
        f.write_str(label)
    }
}

/// Description of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique test name, used for artifact file names
    pub name: String,
    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Feature under test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// User story
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    /// Failure severity
    pub severity: Severity,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Source file of the test, included in its trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TestCase {
    /// Case with only a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            feature: None,
            story: None,
            severity: Severity::default(),
            tags: Vec::new(),
            source: None,
        }
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the feature
    #[must_use]
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    /// Set the story
    #[must_use]
    pub fn story(mut self, story: impl Into<String>) -> Self {
        self.story = Some(story.into());
        self
    }

    /// Set the severity
    #[must_use]
    pub const fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the source file, usually `file!()`
    #[must_use]
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Name reduced to `[A-Za-z0-9_-]`, safe as a file name
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// File name of this test's trace archive
    #[must_use]
    pub fn trace_file_name(&self) -> String {
        format!("trace_{}.zip", self.file_stem())
    }
}
