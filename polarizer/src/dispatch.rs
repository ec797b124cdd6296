// Copyright (c) The polarizer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    exit_codes::PolarizerExitCode,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use polarizer_reporter::{
    assembler::ReportGenerator,
    augment::{augment, read_xunit},
    config::XUnitConfig,
    helpers::{ReportDestination, write_report},
    ledger::BadTestLedger,
    mapping::MappingTable,
    run_results::RunResults,
};
use std::io::Write;
use tracing::{debug, warn};

/// Generates XUnit reports for the Polarion XUnit importer.
///
/// Every test case in the report is stamped with its Polarion id, looked up in the mapping file
/// named by the configuration. The path of the written report is printed to stdout.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct PolarizerApp {
    /// Reporter configuration (.yaml, .yml, .json or .toml)
    #[arg(value_name = "CONFIG", env = "POLARIZER_CONFIG")]
    config: Utf8PathBuf,

    /// Input document: an XUnit report, or run results with `--input-kind results`
    #[arg(value_name = "INPUT")]
    input: Utf8PathBuf,

    /// Kind of input document
    #[arg(long, value_enum, default_value_t, value_name = "KIND")]
    input_kind: InputKind,

    /// Write the report to this path instead of a generated file
    #[arg(long, short, value_name = "PATH", conflicts_with = "output_dir")]
    output: Option<Utf8PathBuf>,

    /// Directory to generate the report file in [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    output_dir: Option<Utf8PathBuf>,

    /// Ledger for tests missing from the mapping file [default: from config]
    ///
    /// Only used with `--input-kind results`: augmenting an XUnit document fails on the first
    /// unmapped test instead.
    #[arg(long, value_name = "PATH")]
    ledger: Option<Utf8PathBuf>,

    #[command(flatten)]
    output_opts: OutputOpts,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum InputKind {
    /// An existing XUnit document, augmented with Polarion ids
    #[default]
    Xunit,

    /// Raw run results, assembled into a new report
    Results,
}

impl PolarizerApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output_opts.init()
    }

    /// Executes the app.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = XUnitConfig::from_path(&self.config)?;
        let mapping = MappingTable::from_path(&config.mapping)?;
        debug!(
            "loaded {} mapping entries from `{}`",
            mapping.len(),
            config.mapping
        );

        let report = match self.input_kind {
            InputKind::Xunit => {
                if let Some(ledger) = &self.ledger {
                    warn!("ignoring --ledger {ledger}: it only applies to --input-kind results");
                }
                let mut report = read_xunit(&self.input)?;
                augment(&config, &mapping, &mut report)?;
                report
            }
            InputKind::Results => {
                let results = RunResults::from_path(&self.input)?;
                let mut generator = ReportGenerator::new(&config, &mapping);
                if let Some(ledger) = self.ledger {
                    generator = generator.with_ledger(BadTestLedger::new(ledger));
                }
                generator.generate(&results)?
            }
        };

        let destination = match self.output {
            Some(path) => ReportDestination::Path(path),
            None => {
                let dir = match self.output_dir {
                    Some(dir) => dir,
                    None => Utf8PathBuf::try_from(std::env::temp_dir())
                        .map_err(|err| ExpectedError::TempDirInvalidUtf8 { err })?,
                };
                ReportDestination::TempFileIn(dir)
            }
        };
        let path = write_report(&report, &destination)?;

        let mut stdout = output_writer.stdout_writer();
        writeln!(stdout, "{path}")
            .and_then(|()| stdout.flush())
            .map_err(|err| ExpectedError::WriteOutputError { err })?;

        Ok(PolarizerExitCode::OK)
    }
}
