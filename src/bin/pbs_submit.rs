use std::{path::Path, process::ExitCode};

use clap::Parser;
use pbs_tools::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Submit a custom script using PBS
#[derive(Parser, Clone, Debug)]
#[clap(name = "pbs-submit", version)]
struct ClArgs {
    #[clap(flatten)]
    job: JobOptions,
    /// Print the submission command and the generated script.
    #[clap(short = 'v', long)]
    show_script: bool,
    /// Write the submission script but don't submit it.
    #[clap(short = 'd', long)]
    dry_run: bool,
    /// Program used to submit the script [default: qsub]
    #[clap(long, value_name = "PROGRAM")]
    qsub: Option<String>,
}

struct ShowScript<'a> {
    qsub: &'a Qsub,
    inner: &'a dyn Submitter,
}

impl Submitter for ShowScript<'_> {
    fn submit(&self, script: &Path) -> Result<()> {
        let contents = std::fs::read(script).context_read(script)?;
        println!("# {:-^80}", " COMMAND ");
        println!("{}", DisplayCmd(&self.qsub.command(script)));
        println!("# {:-^80}", format!(" SCRIPT ({}) ", script.display()));
        print!("{}", String::from_utf8_lossy(&contents));
        self.inner.submit(script)
    }
}

fn run(args: ClArgs) -> Result<()> {
    let defaults = Defaults::load()?;
    let job = JobRequest::resolve(args.job, &defaults)?;
    let qsub = Qsub::new(args.qsub.as_deref().unwrap_or_else(|| defaults.qsub()));

    let dry_run = DryRun { qsub: qsub.clone() };
    let mut submitter: &dyn Submitter = if args.dry_run { &dry_run } else { &qsub };
    let show_script;
    if args.show_script {
        show_script = ShowScript {
            qsub: &qsub,
            inner: submitter,
        };
        submitter = &show_script;
    }

    assemble_and_submit(&job, &defaults.tmp_dir(), submitter)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = ClArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            let code = e
                .chain()
                .find_map(|c| c.downcast_ref::<SubmitError>())
                .map(SubmitError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
