use std::path::{Path, PathBuf};

use crate::foundation::error::ReelError;

/// Result of applying one operation to many inputs.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files produced, in input order.
    pub succeeded: Vec<PathBuf>,
    /// Inputs that failed, with their error.
    pub failed: Vec<(PathBuf, ReelError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `op` on every input, isolating failures per input.
pub fn run_batch<F>(label: &str, inputs: &[PathBuf], mut op: F) -> BatchReport
where
    F: FnMut(&Path) -> Result<Vec<PathBuf>, ReelError>,
{
    let mut report = BatchReport::default();
    for input in inputs {
        match op(input) {
            Ok(outputs) => report.succeeded.extend(outputs),
            Err(err) => {
                tracing::warn!(
                    op = label,
                    input = %input.display(),
                    error = %err,
                    "skipping input"
                );
                report.failed.push((input.clone(), err));
            }
        }
    }
    tracing::info!(
        op = label,
        inputs = inputs.len(),
        outputs = report.succeeded.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    report
}

#[cfg(test)]
#[path = "../tests/unit/batch.rs"]
mod tests;
