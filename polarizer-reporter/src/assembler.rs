// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles a Polarion XUnit report from raw run results.

use crate::{
    aggregator::{AggregatedSuite, SuiteAggregator},
    classify::SuiteCounters,
    config::XUnitConfig,
    errors::MappingError,
    ledger::BadTestLedger,
    mapping::MappingTable,
    properties::{reconcile, report_properties},
    run_results::RunResults,
};
use polarion_xunit::{Report, TestSuite};
use std::{fmt, time::Duration};
use tracing::{info, warn};

/// Generates a report from raw run results.
#[derive(Debug)]
pub struct ReportGenerator<'cfg> {
    config: &'cfg XUnitConfig,
    mapping: &'cfg MappingTable,
    ledger: BadTestLedger,
}

impl<'cfg> ReportGenerator<'cfg> {
    /// Creates a generator that records unmapped tests in the configured ledger.
    pub fn new(config: &'cfg XUnitConfig, mapping: &'cfg MappingTable) -> Self {
        Self {
            config,
            mapping,
            ledger: BadTestLedger::new(config.bad_test_ledger.clone()),
        }
    }

    /// Records unmapped tests in `ledger` instead.
    pub fn with_ledger(mut self, ledger: BadTestLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Returns the ledger unmapped tests are recorded in.
    pub fn ledger(&self) -> &BadTestLedger {
        &self.ledger
    }

    /// Generates the report.
    ///
    /// The ledger is cleared first. Nothing is returned if any suite fails with a
    /// [`MappingError`].
    pub fn generate(&self, results: &RunResults) -> Result<Report, MappingError> {
        self.ledger.reset();

        let aggregator = SuiteAggregator::new(&self.config.project, self.mapping, &self.ledger);
        let aggregated = results
            .suites
            .iter()
            .map(|suite| aggregator.aggregate(suite))
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = Report::new();
        reconcile(&mut report.properties, &report_properties(self.config));

        let mut totals = RunTotals::default();
        let mut time = Duration::ZERO;
        for suite in aggregated {
            let test_suite = totals.add_suite(suite);
            time += test_suite.time.unwrap_or_default();
            if let Some(timestamp) = test_suite.timestamp {
                if report.timestamp.is_none_or(|earliest| timestamp < earliest) {
                    report.timestamp = Some(timestamp);
                }
            }
            report.add_test_suite(test_suite);
        }
        report.set_time(time);

        info!("{totals}");
        Ok(report)
    }
}

/// Run-wide totals, accumulated suite by suite.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunTotals {
    /// The number of tests.
    pub tests: usize,

    /// The number of passed tests.
    ///
    /// After each suite, `tests - (skips + errors + fails)` over the running totals is added.
    pub passes: usize,

    /// The number of failures.
    pub fails: usize,

    /// The number of errors.
    pub errors: usize,

    /// The number of skipped tests.
    pub skips: usize,
}

impl RunTotals {
    /// Adds `suite` to the totals and returns its XUnit suite with the counts filled in.
    ///
    /// The suite's own passes are derived as `total - (fails + errors + skips)`. If the suite
    /// reports more non-passing tests than it has tests, its total is raised to match.
    pub fn add_suite(&mut self, suite: AggregatedSuite) -> TestSuite {
        let AggregatedSuite {
            mut test_suite,
            counters,
        } = suite;

        if !counters.is_consistent() {
            warn!(
                "suite {}: total number of tests != passes + fails + errors + skips ({counters})",
                test_suite.name
            );
        }

        let non_passing = counters.non_passing();
        let total = counters.total.max(non_passing);
        let counters = SuiteCounters {
            total,
            passes: total - non_passing,
            ..counters
        };

        self.tests += counters.total;
        self.fails += counters.fails;
        self.errors += counters.errors;
        self.skips += counters.skips;
        // Passes accumulate what the running totals derive after each suite.
        self.passes += self
            .tests
            .saturating_sub(self.skips + self.errors + self.fails);

        test_suite.tests = counters.total;
        test_suite.failures = counters.fails;
        test_suite.errors = counters.errors;
        test_suite.skipped = counters.skips;
        test_suite
    }
}

impl fmt::Display for RunTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errors: {}, failures: {}, success: {}, skips: {}",
            self.errors, self.fails, self.passes, self.skips
        )
    }
}
