//! The batch loop: reconcile every path, report each outcome, tally a summary.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use tds_reconcile::Reconciler;
use tracing::{error, info};

/// Per-run tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub renamed: usize,
    pub duplicates_removed: usize,
    pub failed: usize,
}

/// Reconcile `paths` in order. Rename notices go to `out`; failures, including
/// a notice that could not be written, are logged and do not stop the batch.
pub fn run_retag<W: Write>(
    reconciler: &Reconciler,
    paths: &[PathBuf],
    out: &mut W,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for path in paths {
        summary.processed += 1;
        match reconciler.process(path) {
            Ok(done) => {
                if done.duplicate_removed {
                    summary.duplicates_removed += 1;
                }
                if let Some(notice) = &done.rename {
                    summary.renamed += 1;
                    // The rename already happened; only the report is lost.
                    if let Err(e) = writeln!(out, "{notice}") {
                        summary.failed += 1;
                        error!(
                            kind = "NOTICE_WRITE_FAILED",
                            path = %path.display(),
                            notice = %notice,
                            "can't write rename notice: {e}"
                        );
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                error!(kind = e.kind(), path = %path.display(), "{e}");
            }
        }
    }

    out.flush().context("flush stdout failed")?;
    info!(
        processed = summary.processed,
        renamed = summary.renamed,
        duplicates_removed = summary.duplicates_removed,
        failed = summary.failed,
        "retag finished"
    );
    Ok(summary)
}
