//! Trivy report parsing
//!
//! A Trivy JSON report is an array of scan targets. The array is consumed one
//! element at a time so that only the records kept by the [`ReadPolicy`] are
//! held in memory.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Instant;

use serde::de::{self, Deserializer as _, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// One scanned target (image, lockfile, filesystem path) and its findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanTarget {
    #[serde(rename = "Target")]
    pub name: String,

    /// Findings, passed through untouched. Trivy writes `null` for clean targets.
    #[serde(rename = "Vulnerabilities", default)]
    pub vulnerabilities: Option<Vec<Value>>,

    /// Other target fields (`Class`, `Type`, ...) preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanTarget {
    pub fn vulnerability_count(&self) -> usize {
        self.vulnerabilities.as_ref().map_or(0, Vec::len)
    }
}

/// Which targets of a report are kept for indexing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Keep only the final target of the array
    #[default]
    LastOnly,
    /// Keep every target, each indexed as its own document
    All,
}

/// Result of reading a report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTargets {
    /// Number of targets present in the report
    pub total: usize,
    /// Targets kept under the read policy, in report order
    pub retained: Vec<ScanTarget>,
}

impl ReportTargets {
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Read a report file from disk.
///
/// The file is closed before this returns, on success and on error.
pub fn read_report(path: &Path, policy: ReadPolicy) -> Result<ReportTargets> {
    let start = Instant::now();
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Cannot open report {}: {}", path.display(), e))
    })?;
    let targets = parse_targets(BufReader::new(file), policy)?;
    log::debug!(
        "Reading trivy report took {:.2} seconds ({} targets)",
        start.elapsed().as_secs_f64(),
        targets.total
    );
    Ok(targets)
}

/// Parse a report from any reader, element by element
pub fn parse_targets<R: Read>(reader: R, policy: ReadPolicy) -> Result<ReportTargets> {
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let targets = deserializer.deserialize_seq(TargetCollector { policy })?;
    deserializer.end()?;
    Ok(targets)
}

struct TargetCollector {
    policy: ReadPolicy,
}

impl<'de> Visitor<'de> for TargetCollector {
    type Value = ReportTargets;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array of scan targets")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut targets = ReportTargets::default();

        while let Some(target) = seq.next_element::<ScanTarget>()? {
            targets.total += 1;
            match self.policy {
                ReadPolicy::LastOnly => {
                    targets.retained.clear();
                    targets.retained.push(target);
                }
                ReadPolicy::All => targets.retained.push(target),
            }
        }

        Ok(targets)
    }

    fn visit_map<A>(self, _map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        Err(de::Error::custom(
            "expected a JSON array of scan targets, found an object",
        ))
    }
}
