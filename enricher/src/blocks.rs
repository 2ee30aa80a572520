use anyhow::Result;
use itertools::Itertools;
use log::{debug, info};

use db_model::meta::{BlockAssignment, PrefixMeta};

use crate::error::PipelineError;

pub mod persist;

pub fn run(prefixes: &[PrefixMeta], max_block_size: i64) -> Result<Vec<BlockAssignment>> {
    let assignments = pack(prefixes, max_block_size)?;
    let block_count = assignments
        .iter()
        .map(|assignment| assignment.block_id)
        .max()
        .map(|highest| highest + 1)
        .unwrap_or(0);

    let mut conn = db_model::persist::connect("blocks")?;
    persist::save(&mut conn, &assignments)?;
    info!(
        "Packed {} prefixes into {} blocks (capacity {})",
        assignments.len(),
        block_count,
        max_block_size,
    );
    Ok(assignments)
}

/// First-fit-decreasing bin packing of whole prefixes, weighted by
/// announcement volume.
///
/// Packing whole prefixes is what upholds the co-location guarantee: every
/// `(prefix, origin)` pair of a prefix ends up in that prefix's block, so
/// the extrapolation engine sees all competing origins within one unit of
/// work. Block count and fill are outputs of the heuristic; callers supply
/// only the capacity, and a block exceeding it is best-effort territory,
/// not an error.
///
/// Prefixes heavier than the capacity get a block of their own rather than
/// failing the run.
pub fn pack(
    prefixes: &[PrefixMeta],
    max_block_size: i64,
) -> Result<Vec<BlockAssignment>, PipelineError> {
    if prefixes.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "the prefix list to partition",
        });
    }
    if max_block_size < 1 {
        return Err(PipelineError::invariant(format!(
            "block capacity must be positive, got {}",
            max_block_size
        )));
    }

    let mut descending = prefixes.iter().collect_vec();
    // Weight-descending; ties break on the prefix so packing is reproducible.
    descending.sort_by(|a, b| {
        b.announcement_count
            .cmp(&a.announcement_count)
            .then_with(|| a.prefix.cmp(&b.prefix))
    });

    let mut remaining_capacity: Vec<i64> = vec![];
    let mut assignments = Vec::with_capacity(prefixes.len());
    for meta in descending {
        let weight = meta.announcement_count;
        let slot = remaining_capacity
            .iter()
            .position(|&remaining| remaining >= weight);
        let block_id = match slot {
            Some(index) => {
                remaining_capacity[index] -= weight;
                index
            }
            None => {
                if weight > max_block_size {
                    debug!(
                        "Prefix {} ({} announcements) exceeds block capacity {}, gets its own oversized block",
                        meta.prefix, weight, max_block_size,
                    );
                }
                remaining_capacity.push(max_block_size - weight);
                remaining_capacity.len() - 1
            }
        };
        assignments.push(BlockAssignment {
            prefix: meta.prefix,
            block_id: block_id as i32,
        });
    }

    verify_complete(prefixes, &assignments)?;
    Ok(assignments)
}

/// Every input prefix must land in exactly one block. The packer guarantees
/// this by construction, but a split or dropped prefix would silently break
/// the engine's per-block processing, so it is cheap to make sure.
fn verify_complete(
    prefixes: &[PrefixMeta],
    assignments: &[BlockAssignment],
) -> Result<(), PipelineError> {
    if prefixes.len() != assignments.len() {
        return Err(PipelineError::invariant(format!(
            "block partitioner saw {} prefixes but produced {} assignments",
            prefixes.len(),
            assignments.len(),
        )));
    }
    let mut seen = assignments.iter().map(|a| a.prefix).collect_vec();
    seen.sort();
    seen.dedup();
    if seen.len() != prefixes.len() {
        return Err(PipelineError::invariant(
            "a prefix was assigned to more than one block".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use db_model::test_utils::net;
    use ipnet::IpNet;

    fn meta(prefix: &str, count: i64) -> PrefixMeta {
        PrefixMeta {
            prefix: net(prefix),
            announcement_count: count,
            prefix_id: 0,
        }
    }

    fn block_of(assignments: &[BlockAssignment], prefix: &str) -> i32 {
        let wanted: IpNet = net(prefix);
        assignments
            .iter()
            .find(|a| a.prefix == wanted)
            .expect("prefix to be assigned")
            .block_id
    }

    #[test]
    fn capacity_one_separates_prefixes() -> Result<(), PipelineError> {
        // given
        let prefixes = vec![meta("10.0.0.0/24", 1), meta("10.0.1.0/24", 1)];

        // when
        let assignments = pack(&prefixes, 1)?;

        // then
        assert_that!(assignments).has_length(2);
        assert_that!(block_of(&assignments, "10.0.0.0/24"))
            .is_not_equal_to(block_of(&assignments, "10.0.1.0/24"));
        Ok(())
    }

    #[test]
    fn fills_up_to_capacity() -> Result<(), PipelineError> {
        // given
        let prefixes = vec![
            meta("10.0.0.0/24", 60),
            meta("10.0.1.0/24", 40),
            meta("10.0.2.0/24", 30),
        ];

        // when
        let assignments = pack(&prefixes, 100)?;

        // then: 60+40 fill block 0, 30 opens block 1
        assert_that!(block_of(&assignments, "10.0.0.0/24")).is_equal_to(0);
        assert_that!(block_of(&assignments, "10.0.1.0/24")).is_equal_to(0);
        assert_that!(block_of(&assignments, "10.0.2.0/24")).is_equal_to(1);
        Ok(())
    }

    #[test]
    fn oversized_prefix_gets_solo_block() -> Result<(), PipelineError> {
        // given
        let prefixes = vec![meta("10.0.0.0/24", 500), meta("10.0.1.0/24", 10)];

        // when
        let assignments = pack(&prefixes, 100)?;

        // then
        let heavy = block_of(&assignments, "10.0.0.0/24");
        let light = block_of(&assignments, "10.0.1.0/24");
        assert_that!(heavy).is_not_equal_to(light);
        Ok(())
    }

    #[test]
    fn block_ids_are_sequential_from_zero() -> Result<(), PipelineError> {
        // given
        let prefixes = vec![
            meta("10.0.0.0/24", 80),
            meta("10.0.1.0/24", 80),
            meta("10.0.2.0/24", 80),
        ];

        // when
        let assignments = pack(&prefixes, 100)?;

        // then
        let mut ids: Vec<i32> = assignments.iter().map(|a| a.block_id).collect();
        ids.sort();
        assert_that!(ids).is_equal_to(vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn light_prefix_backfills_earlier_block() -> Result<(), PipelineError> {
        // given
        let prefixes = vec![
            meta("10.0.0.0/24", 70),
            meta("10.0.1.0/24", 60),
            meta("10.0.2.0/24", 25),
        ];

        // when
        let assignments = pack(&prefixes, 100)?;

        // then: first-fit sends the 25 back into block 0 next to the 70
        assert_that!(block_of(&assignments, "10.0.2.0/24"))
            .is_equal_to(block_of(&assignments, "10.0.0.0/24"));
        Ok(())
    }

    #[test]
    fn empty_prefix_list_fails_fast() {
        // when
        let result = pack(&[], 100);

        // then
        assert_that!(result).is_equal_to(Err(PipelineError::EmptyInput {
            what: "the prefix list to partition",
        }));
    }
}
