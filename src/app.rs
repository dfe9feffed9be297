use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::Package;
use crate::error::PartsError;
use crate::inventory::scan_inventory;
use crate::sources::SourceRegistry;
use crate::specification::PackageSpecification;

#[derive(Debug, Clone, Serialize)]
pub struct InventoryResult {
    pub package: String,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub package: String,
    pub requested: Vec<String>,
    pub retrieved: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub package: String,
    pub declared: usize,
    pub with_sequence: usize,
    pub available: usize,
    pub found_in_directory: usize,
    pub unused: Vec<String>,
    pub missing: Vec<String>,
    pub retrieved: Vec<String>,
    pub still_missing: Vec<String>,
    pub finished_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            elapsed: None,
        }
    }

    pub fn with_elapsed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            message: message.into(),
            elapsed: Some(elapsed),
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App {
    config: ResolvedConfig,
    sources: SourceRegistry,
}

impl App {
    pub fn new(config: ResolvedConfig, sources: SourceRegistry) -> Self {
        Self { config, sources }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn open_package(&self, root: &Utf8Path) -> Result<Package, PartsError> {
        Package::open(root, &self.config.namespace_base)
    }

    pub fn inventory(
        &self,
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Result<InventoryResult, PartsError> {
        let parts = scan_inventory(package, &self.config.cache_files.genbank)?;
        sink.event(ProgressEvent::new(format!(
            "  Found {} available parts",
            parts.len()
        )));
        Ok(InventoryResult {
            package: package.root().to_string(),
            parts,
        })
    }

    pub fn fetch(&self, package: &Package, ids: &[String], sink: &dyn ProgressSink) -> FetchResult {
        let retrieved = self.sources.retrieve_parts(ids, package, sink);
        sink.event(ProgressEvent::new(format!(
            "Retrieved {} out of {} requested parts",
            retrieved.len(),
            ids.len()
        )));
        FetchResult {
            package: package.root().to_string(),
            requested: ids.to_vec(),
            retrieved,
        }
    }

    pub fn import_parts(
        &self,
        package: &Package,
        sink: &dyn ProgressSink,
    ) -> Result<ImportReport, PartsError> {
        let specification = PackageSpecification::load(package)?;
        let package_parts = specification.basic_parts()?;
        sink.event(ProgressEvent::new(format!(
            "  Package specification contains {} parts",
            package_parts.len()
        )));

        let inventory = self.inventory(package, sink)?.parts;

        let declared: BTreeSet<&str> = package_parts.iter().map(|p| p.identity.as_str()).collect();
        let with_sequence: BTreeSet<&str> = package_parts
            .iter()
            .filter(|p| p.has_sequence)
            .map(|p| p.identity.as_str())
            .collect();
        let without_sequence: BTreeSet<&str> = package_parts
            .iter()
            .filter(|p| !p.has_sequence)
            .map(|p| p.identity.as_str())
            .collect();
        let available: BTreeSet<&str> = inventory.iter().map(String::as_str).collect();

        let both = declared.intersection(&available).count();
        let unused: Vec<String> = available
            .difference(&declared)
            .map(|id| id.to_string())
            .collect();
        let missing: Vec<String> = without_sequence
            .difference(&available)
            .map(|id| id.to_string())
            .collect();

        sink.event(ProgressEvent::new(format!(
            " {} have sequences in specification, {} found in directory, {} not found",
            with_sequence.len(),
            both,
            missing.len()
        )));
        sink.event(ProgressEvent::new(format!(
            " {} parts in directory are not used in package",
            unused.len()
        )));
        if !unused.is_empty() {
            sink.event(ProgressEvent::new(format!(
                " Found {} unused parts: {}",
                unused.len(),
                unused.join(" ")
            )));
        }

        let mut report = ImportReport {
            package: package.root().to_string(),
            declared: declared.len(),
            with_sequence: with_sequence.len(),
            available: inventory.len(),
            found_in_directory: both,
            unused,
            missing,
            retrieved: Vec::new(),
            still_missing: Vec::new(),
            finished_at: String::new(),
        };

        if report.missing.is_empty() {
            sink.event(ProgressEvent::new("No missing sequences"));
            report.finished_at = iso_timestamp();
            return Ok(report);
        }

        sink.event(ProgressEvent::new("Attempting to download missing parts"));
        // BTreeSet iteration already yields the missing IDs sorted.
        let start = Instant::now();
        let retrieved = self.sources.retrieve_parts(&report.missing, package, sink);
        sink.event(ProgressEvent::with_elapsed(
            format!(
                "Retrieved {} out of {} missing sequences",
                retrieved.len(),
                report.missing.len()
            ),
            start.elapsed(),
        ));
        sink.event(ProgressEvent::new(format!("{retrieved:?}")));

        let got: BTreeSet<&str> = retrieved.iter().map(String::as_str).collect();
        report.still_missing = report
            .missing
            .iter()
            .filter(|id| !got.contains(id.as_str()))
            .cloned()
            .collect();
        if !report.still_missing.is_empty() {
            let listing: String = report
                .still_missing
                .iter()
                .map(|id| format!(" {id}\n"))
                .collect();
            sink.event(ProgressEvent::new(format!("Still missing:{listing}")));
        }

        report.retrieved = retrieved;
        report.finished_at = iso_timestamp();
        Ok(report)
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
