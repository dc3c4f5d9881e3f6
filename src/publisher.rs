//! The adapter core: turns a host-runner result document into ledger rows.
//!
//! One record is written per test method invocation (data-driven variants
//! included), in result-set order: passed, failed, skipped. A snapshot
//! version suppresses the whole suite unless snapshot publishing is
//! enabled. Store failures are per-record: logged, counted, and skipped
//! over so the remaining results still land.

use crate::config::PublisherConfig;
use crate::error::LedgerResult;
use crate::model::{PublishSummary, RunDocument, SuiteResult, TestOutcome, TestRecord};
use crate::storage::ResultStore;

pub struct ResultPublisher<'a> {
    store: &'a dyn ResultStore,
    config: PublisherConfig,
}

impl<'a> ResultPublisher<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ResultStore, config: PublisherConfig) -> Self {
        Self { store, config }
    }

    /// Publish every suite in the document, returning the accumulated
    /// counters. Only I/O-level failures of the document itself surface
    /// as errors; suite- and record-level faults are absorbed into the
    /// summary.
    pub fn publish_document(&self, document: &RunDocument) -> LedgerResult<PublishSummary> {
        tracing::info!(
            suites = document.suites.len(),
            "end of tests, publishing results"
        );

        let mut summary = PublishSummary::default();
        for suite in &document.suites {
            self.publish_suite(suite, &mut summary);
        }

        tracing::info!(
            published = summary.records_published,
            failed = summary.records_failed,
            suppressed = summary.suites_suppressed,
            "result publishing complete"
        );
        Ok(summary)
    }

    /// Publish one suite's result sets.
    pub fn publish_suite(&self, suite: &SuiteResult, summary: &mut PublishSummary) {
        summary.suites_seen += 1;
        let metadata = &suite.metadata;

        if metadata.is_snapshot() && !self.config.publish_snapshots {
            tracing::warn!(
                component = %metadata.component,
                version = %metadata.version,
                "snapshot version, results will not be published"
            );
            summary.suites_suppressed += 1;
            return;
        }

        let build_number = match metadata.resolved_build_number() {
            Ok(build_number) => build_number,
            Err(error) => {
                tracing::error!(
                    component = %metadata.component,
                    version = %metadata.version,
                    error = %error,
                    "skipping suite with unusable metadata"
                );
                summary.suites_failed += 1;
                return;
            }
        };
        let platform = metadata.resolved_platform();

        tracing::debug!(
            component = %metadata.component,
            version = %metadata.version,
            build_number,
            platform = %platform,
            outcomes = suite.outcome_count(),
            "storing suite results"
        );

        for outcome in suite
            .passed
            .iter()
            .chain(suite.failed.iter())
            .chain(suite.skipped.iter())
        {
            let record = TestRecord {
                component: metadata.component.clone(),
                version: metadata.version.clone(),
                build_number,
                platform: platform.clone(),
                test_key: outcome.test_key(),
                duration_millis: outcome.duration_millis(),
                status: outcome.status.as_str().to_owned(),
            };
            self.store_record(outcome, record, summary);
        }
    }

    fn store_record(
        &self,
        outcome: &TestOutcome,
        record: TestRecord,
        summary: &mut PublishSummary,
    ) {
        tracing::debug!(
            test_key = %record.test_key,
            status = %record.status,
            duration_millis = record.duration_millis,
            "storing result"
        );

        match self.store.insert(&record) {
            Ok(()) => summary.records_published += 1,
            Err(error) => {
                // Keep going: one bad row must not lose the rest of the set.
                tracing::error!(
                    test_key = %record.test_key,
                    status = %outcome.status,
                    error = %error,
                    code = error.code(),
                    "failed to store result"
                );
                summary.records_failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunMetadata, TestStatus};
    use crate::storage::MemoryStore;

    fn outcome(method: &str, status: TestStatus, params: &[&str]) -> TestOutcome {
        TestOutcome {
            class_name: "org.acme.CartTest".to_owned(),
            method_name: method.to_owned(),
            parameters: params.iter().map(|p| (*p).to_owned()).collect(),
            start_millis: 10_000,
            end_millis: 10_250,
            status,
        }
    }

    fn suite(version: &str) -> SuiteResult {
        SuiteResult {
            metadata: RunMetadata {
                component: "cart".to_owned(),
                version: version.to_owned(),
                build_number: Some("3".to_owned()),
                platform: Some("rhel-9".to_owned()),
            },
            passed: vec![
                outcome("addItem", TestStatus::Passed, &[]),
                outcome("addItem", TestStatus::Passed, &["sku-7"]),
            ],
            failed: vec![outcome("checkout", TestStatus::Failed, &[])],
            skipped: vec![outcome("applyCoupon", TestStatus::Skipped, &[])],
        }
    }

    fn publish(
        store: &MemoryStore,
        config: PublisherConfig,
        suites: Vec<SuiteResult>,
    ) -> PublishSummary {
        let publisher = ResultPublisher::new(store, config);
        publisher
            .publish_document(&RunDocument { suites })
            .expect("publish")
    }

    #[test]
    fn publishes_all_result_sets_in_order() {
        let store = MemoryStore::new();
        let summary = publish(&store, PublisherConfig::default(), vec![suite("1.2.0")]);

        assert_eq!(summary.records_published, 4);
        assert_eq!(summary.records_failed, 0);
        assert_eq!(summary.suites_suppressed, 0);

        let records = store.records();
        let keys: Vec<&str> = records.iter().map(|r| r.test_key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "org.acme.CartTest#addItem",
                "org.acme.CartTest#addItem@sku-7",
                "org.acme.CartTest#checkout",
                "org.acme.CartTest#applyCoupon",
            ]
        );
        assert_eq!(records[2].status, "FAILED");
        assert_eq!(records[3].status, "SKIPPED");
        assert_eq!(records[0].build_number, 3);
        assert_eq!(records[0].platform, "rhel-9");
        assert_eq!(records[0].duration_millis, 250);
    }

    #[test]
    fn snapshot_suite_never_touches_the_store() {
        let store = MemoryStore::new();
        let summary = publish(
            &store,
            PublisherConfig::default(),
            vec![suite("1.2.0-SNAPSHOT")],
        );

        assert!(store.is_empty());
        assert_eq!(summary.suites_suppressed, 1);
        assert_eq!(summary.records_published, 0);
    }

    #[test]
    fn snapshot_suite_publishes_when_enabled() {
        let store = MemoryStore::new();
        let config = PublisherConfig {
            publish_snapshots: true,
            ..PublisherConfig::default()
        };
        let summary = publish(&store, config, vec![suite("1.2.0-SNAPSHOT")]);

        assert_eq!(summary.suites_suppressed, 0);
        assert_eq!(summary.records_published, 4);
    }

    #[test]
    fn insert_failure_does_not_halt_iteration() {
        let store = MemoryStore::new();
        store.fail_on("org.acme.CartTest#checkout");
        let summary = publish(&store, PublisherConfig::default(), vec![suite("1.2.0")]);

        assert_eq!(summary.records_published, 3);
        assert_eq!(summary.records_failed, 1);
        // The skipped-set record after the failing one still landed.
        assert!(store
            .records()
            .iter()
            .any(|r| r.test_key == "org.acme.CartTest#applyCoupon"));
    }

    #[test]
    fn unusable_build_number_skips_only_that_suite() {
        let store = MemoryStore::new();
        let mut bad = suite("1.2.0");
        bad.metadata.build_number = Some("not-a-number".to_owned());
        let good = suite("1.3.0");

        let summary = publish(&store, PublisherConfig::default(), vec![bad, good]);

        assert_eq!(summary.suites_seen, 2);
        assert_eq!(summary.suites_failed, 1);
        assert_eq!(summary.records_published, 4);
        assert!(store.records().iter().all(|r| r.version == "1.3.0"));
    }

    #[test]
    fn placeholder_metadata_resolves_to_defaults() {
        let store = MemoryStore::new();
        let mut placeholder = suite("1.2.0");
        placeholder.metadata.build_number = Some("${current.build}".to_owned());
        placeholder.metadata.platform = Some("${current.platform}".to_owned());

        publish(&store, PublisherConfig::default(), vec![placeholder]);

        let records = store.records();
        assert!(records.iter().all(|r| r.build_number == 1));
        assert!(records.iter().all(|r| r.platform == "DEFAULT"));
    }

    #[test]
    fn accounting_adds_up_across_suites() {
        let store = MemoryStore::new();
        store.fail_on("org.acme.CartTest#addItem@sku-7");
        let summary = publish(
            &store,
            PublisherConfig::default(),
            vec![suite("1.2.0"), suite("2.0.0-SNAPSHOT"), suite("1.3.0")],
        );

        assert_eq!(summary.suites_seen, 3);
        assert_eq!(summary.suites_suppressed, 1);
        // Two published suites x 4 outcomes, one injected failure each.
        assert_eq!(summary.records_published + summary.records_failed, 8);
        assert_eq!(summary.records_failed, 2);
    }
}
