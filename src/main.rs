// src/main.rs

use buildgraph::{cli, logging, run};

fn main() {
    match run_main() {
        Ok(outcome) if outcome.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("buildgraph error: {err:?}");
            std::process::exit(1);
        }
    }
}

fn run_main() -> anyhow::Result<buildgraph::engine::RunOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)
}
