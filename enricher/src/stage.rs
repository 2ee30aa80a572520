use anyhow::{anyhow, Context, Result};
use clap::Args;
use log::info;
use tokio::task::{self, JoinHandle};
use tokio::try_join;

use db_model::announce::PairCount;
use db_model::persist;

use crate::error::PipelineError;
use crate::{blocks, enrich, ident, validity};

#[derive(Args, Debug, Clone)]
#[group(id = "stage")]
pub struct Params {
    /// Target announcement volume per processing block. A prefix heavier
    /// than this still gets a block, its own oversized one.
    /// Environment variable: MAX_BLOCK_SIZE
    #[arg(
        long,
        env = "MAX_BLOCK_SIZE",
        default_value_t = 100,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub max_block_size: i64,
}

/// Runs the four stages in dependency order. Identifier assignment and
/// validity classification share only the read-only pair projection and
/// write disjoint tables, so they fan out concurrently; the partitioner
/// needs the assigned prefixes, and the join needs everything.
pub async fn run(params: Params) -> Result<()> {
    let (pair_counts, roa_count) = {
        let mut conn = persist::connect("stage_preload")?;
        let pair_counts = ident::persist::load_pair_counts(&mut conn)?;
        let roa_count = validity::persist::count_roas(&mut conn)?;
        (pair_counts, roa_count)
    };
    check_preconditions(&pair_counts, roa_count)?;
    info!(
        "Starting pipeline run over {} distinct (prefix, origin) pairs",
        pair_counts.len()
    );

    let ident_input = pair_counts.clone();
    let ident_handle = task::spawn_blocking(move || ident::run(ident_input));
    let validity_handle = task::spawn_blocking(move || validity::run(pair_counts));
    let (assignment, verdicts) = try_join!(flatten(ident_handle), flatten(validity_handle))?;

    let block_list = blocks::run(&assignment.prefixes, params.max_block_size)?;
    let enriched_rows = enrich::run(&assignment, &verdicts, &block_list)?;

    info!(
        "Pipeline run complete: {} prefixes in {} blocks, {} enriched announcements ready for extrapolation",
        assignment.prefixes.len(),
        block_list.iter().map(|b| b.block_id).max().map(|id| id + 1).unwrap_or(0),
        enriched_rows,
    );
    Ok(())
}

/// Both source tables must hold data before any stage starts. An empty ROA
/// table would otherwise slip through as an all-`UNKNOWN` dataset that is
/// indistinguishable from a legitimately unclassifiable one.
fn check_preconditions(pair_counts: &[PairCount], roa_count: i64) -> Result<(), PipelineError> {
    if pair_counts.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "the announcement table",
        });
    }
    if roa_count == 0 {
        return Err(PipelineError::EmptyInput {
            what: "the ROA table",
        });
    }
    Ok(())
}

async fn flatten<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(anyhow!(join_err)).context("a pipeline stage task panicked"),
    }
}
