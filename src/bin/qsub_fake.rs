use std::{io::Write, time::SystemTime};

use clap::Parser;
use pbs_tools::*;

/// Stand-in for qsub on machines without PBS.  Checks the script and prints a
/// fake job id.  Set QSUB_FAKE_LOG to record every submitted script path.
#[derive(Parser)]
#[clap(name = "qsub-fake")]
struct Args {
    #[clap(parse(from_os_str))]
    script: std::path::PathBuf,
}

const LOG_VAR: &str = "QSUB_FAKE_LOG";

fn get_fake_id() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

fn main() -> Result<()> {
    let args = Args::parse();
    {
        let script = std::fs::read_to_string(&args.script).context_read(&args.script)?;
        if script.is_empty() {
            bail!("Batch script is empty!")
        }
        if script.chars().all(char::is_whitespace) {
            bail!("Batch script contains only whitespace!")
        }
        if !script.lines().any(|l| l.starts_with("#PBS")) {
            bail!("This does not look like a PBS script.  No #PBS directives found")
        }
    }

    if let Some(log) = std::env::var_os(LOG_VAR) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log)
            .context_write(&log)?;
        writeln!(f, "{}", args.script.display()).context_write(&log)?;
    }

    println!("{}.fake-server", get_fake_id());
    Ok(())
}
