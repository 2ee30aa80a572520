use anyhow::Result;
use clap::Parser;
use futures::executor;

use route_mill::helpers::{bootstrap, logging};

pub use db_model::persist;

mod blocks;
mod enrich;
mod error;
mod ident;
mod stage;
mod validity;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[clap(flatten)]
    logging: logging::Params,

    #[clap(flatten)]
    persist: persist::Params,

    #[clap(flatten)]
    stage: stage::Params,
}

fn main() -> Result<()> {
    bootstrap::run(Cli::parse, |cli: &Cli| &cli.logging, do_run)
}

fn do_run(cli: Cli) -> Result<()> {
    persist::initialize(&cli.persist)?;
    executor::block_on(stage::run(cli.stage))
}
