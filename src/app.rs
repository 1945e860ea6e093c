use std::{
    io::{BufWriter, Write, stdout},
    path::Path,
};

use crate::{
    common::error::AppError,
    config::Config,
    io::{reader, report, storage::JsonStorage, writer},
    worker::processor::Processor,
};

/// Counters for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub rejected: usize,
    pub failed_saves: usize,
}

pub fn run<I, S>(args: I) -> Result<RunSummary, AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(|s| s.into()).collect();
    let config = Config::load_or_init(&Config::default_path())?;
    let input = args.get(1).map(Path::new);

    let stdout = stdout();
    let out = BufWriter::new(stdout.lock());
    run_with(&config, input, out)
}

/// Loads the ledger, applies the commands in `input` (if any), saving after
/// every mutation, then writes per-person balances to `out` and the markdown
/// summary when a report directory is configured.
///
/// Rejected commands and failed saves are logged and counted, never fatal.
pub fn run_with<W: Write>(
    config: &Config,
    input: Option<&Path>,
    out: W,
) -> Result<RunSummary, AppError> {
    let storage = JsonStorage::new(&config.data_file);
    let mut doc = storage.load()?;
    let mut ledger = doc.to_ledger(config.settlement);
    let mut summary = RunSummary::default();

    if let Some(path) = input {
        let file = std::fs::File::open(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);
        let mut processor = Processor::new();

        for command in reader::read_commands(&mut rdr) {
            let applied = command.and_then(|c| processor.process(&mut ledger, c));
            match applied {
                Ok(applied) => {
                    summary.applied += 1;
                    if !applied.mutated() {
                        continue;
                    }
                    doc.sync_from(&ledger);
                    if let Err(e) = storage.save(&doc) {
                        summary.failed_saves += 1;
                        tracing::warn!(error = %e, "change kept in memory but not saved");
                    }
                }
                Err(e) => {
                    summary.rejected += 1;
                    tracing::warn!(error = %e, "command rejected");
                }
            }
        }
    }

    writer::write_balances(out, &ledger.groups())?;

    if let Some(dir) = &config.report_dir {
        if let Err(e) = report::write_debts_summary(dir, &ledger, &config.currency) {
            tracing::warn!(error = %e, "debts summary not written");
        }
    }

    tracing::info!(
        applied = summary.applied,
        rejected = summary.rejected,
        failed_saves = summary.failed_saves,
        "batch finished"
    );
    Ok(summary)
}
