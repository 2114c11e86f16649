use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::Builder;
use tracing::info;

use crate::*;

/// Renders the `#PBS` directive block that goes in front of the user's script.
/// The trailing blank line separates it from the script body.
pub fn render_preamble(job: &JobRequest) -> String {
    format!(
        "#PBS -N {}            # job name\n\
         #PBS -l walltime={}   # duration of the job\n\
         #PBS -q {}            # queue name (where job is submitted)\n\
         #PBS -j oe            # combine output and error messages into a single file\n\
         #PBS -o {}            # output file name\n\
         \n",
        job.name, job.duration, job.queue, job.output
    )
}

/// A submission script written to disk.  The file outlives the process so it
/// can be inspected after submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledScript {
    pub path: PathBuf,
}

/// Writes the preamble followed by the job's script to a fresh `pbs-*.sh` file
/// in `tmp_dir`, with the same permission bits as the job's script.
pub fn assemble(job: &JobRequest, tmp_dir: &Path) -> Result<AssembledScript> {
    let body = fs::read(&job.script).context_read(&job.script)?;
    let permissions = fs::metadata(&job.script)
        .context_read(&job.script)?
        .permissions();

    let mut contents = render_preamble(job).into_bytes();
    contents.extend_from_slice(&body);

    let mut file = Builder::new()
        .prefix("pbs-")
        .suffix(".sh")
        .tempfile_in(tmp_dir)
        .with_context(|| format!("failed to create temp file in {}", tmp_dir.display()))?;
    file.write_all(&contents).context_write(file.path())?;
    file.flush().context_write(file.path())?;
    file.as_file()
        .set_permissions(permissions)
        .with_context(|| format!("failed to set permissions of {}", file.path().display()))?;

    let (_, path) = file.keep().context("failed to keep temp file")?;
    info!(path = %path.display(), script = %job.script.display(), "assembled submission script");
    Ok(AssembledScript { path })
}
