//! Command-line arguments of `bbque-alloc`.

use clap::Parser;

use bbque_ras::{AppContext, Job, JobId};

/// Requests a node allocation for one job from the BarbequeRTRM resource
/// manager and prints it as JSON.
///
/// The resource manager endpoint is read from `BBQUE_IP` and `BBQUE_PORT`.
#[derive(Parser, Debug)]
#[command(name = "bbque-alloc", version)]
pub(crate) struct Cli {
    /// Identifier of the job to allocate nodes for.
    #[arg(long, value_name = "ID")]
    pub(crate) job_id: u32,
    /// Processes requested by one application component; repeat per
    /// component.
    #[arg(long = "np", value_name = "PROCS", required = true)]
    pub(crate) procs: Vec<u32>,
}

impl Cli {
    /// Job descriptor with one component per `--np` value.
    pub(crate) fn job(&self) -> Job {
        Job::with_apps(
            JobId::new(self.job_id),
            self.procs.iter().map(|count| Some(AppContext::new(*count))),
        )
    }
}
