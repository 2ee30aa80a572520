use std::collections::HashMap;

use anyhow::Result;
use log::info;

use db_model::announce::Announcement;
use db_model::enriched::{Decoration, EnrichedAnnouncement};
use db_model::meta::BlockAssignment;
use db_model::validity::{ValidityRecord, Verdict};
use db_model::Asn;
use ipnet::IpNet;

use crate::error::PipelineError;
use crate::ident::IdentAssignment;

pub mod persist;

pub fn run(
    assignment: &IdentAssignment,
    verdicts: &[ValidityRecord],
    blocks: &[BlockAssignment],
) -> Result<usize> {
    let mut conn = db_model::persist::connect("enrich")?;
    let announcements = persist::load_announcements(&mut conn)?;
    let enriched = decorate(announcements, assignment, verdicts, blocks)?;
    persist::save(&mut conn, &enriched)?;
    info!("Enriched {} announcements", enriched.len());
    Ok(enriched.len())
}

/// Attaches identifiers, block assignment, verdict and the monitor ASN (the
/// path's first hop, i.e. the collecting peer) to every announcement row.
///
/// The join is a decoration, never a filter: every input row appears in the
/// output exactly once, and a row that cannot be fully decorated means an
/// upstream stage is corrupt, which aborts the run instead of emitting
/// partial data.
pub fn decorate(
    announcements: Vec<Announcement>,
    assignment: &IdentAssignment,
    verdicts: &[ValidityRecord],
    blocks: &[BlockAssignment],
) -> Result<Vec<EnrichedAnnouncement>, PipelineError> {
    if announcements.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "the announcement table",
        });
    }
    let lookup = JoinLookup::build(assignment, verdicts, blocks)?;

    let expected_rows = announcements.len();
    let mut enriched = Vec::with_capacity(expected_rows);
    for announcement in announcements {
        enriched.push(decorate_one(announcement, &lookup)?);
    }

    if enriched.len() != expected_rows {
        return Err(PipelineError::invariant(format!(
            "join emitted {} rows for {} announcements",
            enriched.len(),
            expected_rows,
        )));
    }
    Ok(enriched)
}

fn decorate_one(
    announcement: Announcement,
    lookup: &JoinLookup,
) -> Result<EnrichedAnnouncement, PipelineError> {
    let monitor_asn = announcement.monitor_asn().ok_or_else(|| {
        // A collected announcement always records at least the reporting peer
        PipelineError::invariant(format!(
            "announcement {} has an empty AS path",
            announcement.id
        ))
    })?;

    let pair = (announcement.prefix, announcement.origin);
    let missing = || PipelineError::MissingMetadata {
        prefix: announcement.prefix,
        origin: announcement.origin,
    };
    let &prefix_origin_id = lookup.pair_ids.get(&pair).ok_or_else(missing)?;
    let &(prefix_id, block_id) = lookup.by_prefix.get(&announcement.prefix).ok_or_else(missing)?;
    let &origin_id = lookup.origin_ids.get(&announcement.origin).ok_or_else(missing)?;
    let &verdict = lookup.verdicts.get(&pair).ok_or_else(missing)?;

    Ok(EnrichedAnnouncement::decorate(
        announcement,
        Decoration {
            monitor_asn,
            prefix_id,
            origin_id,
            prefix_origin_id,
            block_id,
            verdict,
        },
    ))
}

struct JoinLookup {
    pair_ids: HashMap<(IpNet, Asn), i64>,
    origin_ids: HashMap<Asn, i64>,
    by_prefix: HashMap<IpNet, (i64, i32)>,
    verdicts: HashMap<(IpNet, Asn), Verdict>,
}

impl JoinLookup {
    fn build(
        assignment: &IdentAssignment,
        verdicts: &[ValidityRecord],
        blocks: &[BlockAssignment],
    ) -> Result<Self, PipelineError> {
        let pair_ids = assignment
            .pairs
            .iter()
            .map(|meta| ((meta.prefix, meta.origin), meta.prefix_origin_id))
            .collect();
        let origin_ids = assignment
            .origins
            .iter()
            .map(|meta| (meta.origin, meta.origin_id))
            .collect();

        let block_ids: HashMap<IpNet, i32> = blocks
            .iter()
            .map(|assignment| (assignment.prefix, assignment.block_id))
            .collect();
        let mut by_prefix = HashMap::with_capacity(assignment.prefixes.len());
        for meta in &assignment.prefixes {
            let &block_id = block_ids.get(&meta.prefix).ok_or_else(|| {
                PipelineError::invariant(format!("prefix {} has no block", meta.prefix))
            })?;
            by_prefix.insert(meta.prefix, (meta.prefix_id, block_id));
        }

        let mut verdict_map = HashMap::with_capacity(verdicts.len());
        for record in verdicts {
            let duplicate = verdict_map
                .insert((record.prefix, record.origin), record.verdict)
                .is_some();
            if duplicate {
                // would silently inflate the join's row count
                return Err(PipelineError::invariant(format!(
                    "duplicate verdict row for ({}, AS{})",
                    record.prefix, record.origin,
                )));
            }
        }

        Ok(Self {
            pair_ids,
            origin_ids,
            by_prefix,
            verdicts: verdict_map,
        })
    }
}
