use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, default_value = "all")]
    pub mode: Mode,
    /// Serve without building the index from the catalog first.
    #[arg(long, default_value_t = false)]
    pub skip_rebuild: bool,
    /// Print a signed admin token valid for this many days and exit.
    #[arg(long, value_name = "DAYS")]
    pub issue_admin_token: Option<i64>,
}

/// `api` serves HTTP without the periodic refresh job; the index is then
/// only rebuilt at startup or through the admin endpoints.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    All,
    Api,
}

impl Mode {
    pub fn run_worker(self) -> bool {
        matches!(self, Mode::All)
    }
}
