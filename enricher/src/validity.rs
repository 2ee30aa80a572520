use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use itertools::Itertools;
use log::{debug, info};

use db_model::announce::{PairCount, Roa};
use db_model::validity::{ValidityRecord, Verdict};
use db_model::Asn;
use ipnet::IpNet;
use route_mill::helpers::ip::IsDefaultRoute;

use crate::error::PipelineError;

pub mod persist;

pub fn run(pair_counts: Vec<PairCount>) -> Result<Vec<ValidityRecord>> {
    let mut conn = db_model::persist::connect("validity")?;
    let all_roas = persist::load_roas(&mut conn)?;
    let current = current_snapshot(all_roas);
    debug!("Matching against {} current ROAs", current.len());

    let records = classify_all(&pair_counts, &current)?;
    persist::save(&mut conn, &records)?;
    let invalid = records
        .iter()
        .filter(|rec| rec.verdict.is_invalid())
        .count();
    info!(
        "Classified ROA validity for {} pairs, {} invalid: {}",
        records.len(),
        invalid,
        summarize(&records),
    );
    Ok(records)
}

/// Verdict breakdown in leniency order, for the run log and the reporting
/// collaborators' sanity checks.
pub fn summarize(records: &[ValidityRecord]) -> String {
    let mut counts: BTreeMap<Verdict, usize> = BTreeMap::new();
    for rec in records {
        *counts.entry(rec.verdict).or_default() += 1;
    }
    counts
        .iter()
        .map(|(verdict, count)| format!("{} {}", count, verdict))
        .join(", ")
}

/// Only ROAs of the newest collector snapshot are eligible for matching.
/// Superseded snapshots stay in the table for the collectors' bookkeeping
/// but must not influence verdicts.
pub fn current_snapshot(roas: Vec<Roa>) -> Vec<Roa> {
    let Some(latest) = roas.iter().map(|roa| roa.created_at).max() else {
        return vec![];
    };
    roas.into_iter()
        .filter(|roa| roa.created_at == latest)
        .collect()
}

/// Produces exactly one verdict per distinct `(prefix, origin)` pair.
///
/// A pair covered by several ROAs (nested or equal authorized prefixes from
/// different origins) keeps the most lenient verdict; [Verdict]'s variant
/// order makes that a `min()`. Pairs with no covering ROA are recorded as
/// `Unknown` explicitly, never left absent — the join stage counts on
/// totality.
pub fn classify_all(
    pairs: &[PairCount],
    current_roas: &[Roa],
) -> Result<Vec<ValidityRecord>, PipelineError> {
    let distinct: BTreeSet<(IpNet, Asn)> = pairs
        .iter()
        .filter(|pair| !pair.prefix.is_default_route())
        .map(|pair| (pair.prefix, pair.origin))
        .collect();
    if distinct.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "the distinct (prefix, origin) projection",
        });
    }

    Ok(distinct
        .into_iter()
        .map(|(prefix, origin)| ValidityRecord {
            prefix,
            origin,
            verdict: classify_pair(&prefix, origin, current_roas),
        })
        .collect())
}

fn classify_pair(prefix: &IpNet, origin: Asn, current_roas: &[Roa]) -> Verdict {
    current_roas
        .iter()
        .filter(|roa| covers(roa, prefix))
        .map(|roa| classify_against(prefix, origin, roa))
        .min()
        .unwrap_or(Verdict::Unknown)
}

/// A ROA covers an announced prefix when its own prefix contains or equals
/// it, as an address-range subset test. Address families never mix.
fn covers(roa: &Roa, announced: &IpNet) -> bool {
    roa.prefix.contains(announced)
}

fn classify_against(prefix: &IpNet, origin: Asn, roa: &Roa) -> Verdict {
    let origin_authorized = origin == roa.asn;
    let length_authorized = i16::from(prefix.prefix_len()) <= roa.max_length;
    match (origin_authorized, length_authorized) {
        (true, true) => Verdict::Valid,
        (true, false) => Verdict::InvalidByLength,
        (false, true) => Verdict::InvalidByOrigin,
        (false, false) => Verdict::InvalidByAll,
    }
}
