use std::{
    ffi::OsString,
    fmt::Display,
    path::Path,
    process::{Command, ExitStatus},
};

use tracing::{debug, info};

use crate::*;

pub const QSUB: &str = "qsub";

/// Hands an assembled script over to the scheduler.
pub trait Submitter {
    fn submit(&self, script: &Path) -> Result<()>;
}

/// The submission command ran but exited unsuccessfully.
#[derive(Debug)]
pub struct SubmitError {
    pub command: String,
    pub status: ExitStatus,
}

impl SubmitError {
    /// Exit code to hand back to our caller: the submission command's own code,
    /// or 1 if it was killed by a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.code().filter(|&c| c != 0).unwrap_or(1)
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` failed with {}", self.command, self.status)
    }
}

impl std::error::Error for SubmitError {}

/// Runs `qsub <script>` (or a stand-in program) in the foreground.
#[derive(Clone, Debug)]
pub struct Qsub {
    program: OsString,
}

impl Default for Qsub {
    fn default() -> Self {
        Qsub::new(QSUB)
    }
}

impl Qsub {
    pub fn new(program: impl Into<OsString>) -> Self {
        Qsub {
            program: program.into(),
        }
    }

    pub fn command(&self, script: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(script);
        cmd
    }
}

impl Submitter for Qsub {
    fn submit(&self, script: &Path) -> Result<()> {
        let mut cmd = self.command(script);
        debug!(command = %DisplayCmd(&cmd), "running submission command");
        let status = cmd
            .status()
            .with_context(|| format!("failed to run {}", self.program.to_string_lossy()))?;
        info!(%status, "submission command finished");

        if !status.success() {
            return Err(SubmitError {
                command: DisplayCmd(&cmd).to_string(),
                status,
            }
            .into());
        }
        Ok(())
    }
}

/// Prints what would be submitted instead of submitting it.
#[derive(Clone, Debug, Default)]
pub struct DryRun {
    pub qsub: Qsub,
}

impl Submitter for DryRun {
    fn submit(&self, script: &Path) -> Result<()> {
        println!("assembled {}", script.display());
        println!("would run: {}", DisplayCmd(&self.qsub.command(script)));
        Ok(())
    }
}

/// Assembles the job's submission script and submits it.  The script is left
/// on disk whether or not submission succeeds.
pub fn assemble_and_submit(
    job: &JobRequest,
    tmp_dir: &Path,
    submitter: &dyn Submitter,
) -> Result<AssembledScript> {
    let script = assemble(job, tmp_dir)?;
    submitter.submit(&script.path).with_context(|| {
        format!(
            "failed to submit {} (the script has been kept)",
            script.path.display()
        )
    })?;
    Ok(script)
}
