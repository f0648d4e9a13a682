use anyhow::Result;
use tracing::debug;

use ledgercast::config::Config;
use ledgercast::{logging, run, Ledger};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::load()?;
    logging::init(&config.log_level);

    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }

    let db_path = config.database_path()?;
    debug!(path = %db_path.display(), "opening ledger");
    let mut ledger = Ledger::open(&db_path)?;
    run::as_cli(&args, &mut ledger, &config)
}
