use std::path::PathBuf;

use dgt_batch::GradedBatch;

/// Everything one `grade` run produced, for the summary printer and the
/// exit-code mapping.
#[derive(Debug)]
pub struct GradeOutcome {
    pub batch: GradedBatch,
    pub output_dir: PathBuf,
    pub report_paths: Vec<PathBuf>,
    pub dry_run: bool,
}

impl GradeOutcome {
    pub fn has_errors(&self) -> bool {
        self.batch.has_errors()
    }

    pub fn has_failures(&self) -> bool {
        self.batch.has_failures()
    }
}
