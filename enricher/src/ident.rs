use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use log::info;

use db_model::announce::PairCount;
use db_model::meta::{OriginMeta, PrefixMeta, PrefixOriginMeta};
use db_model::Asn;
use ipnet::IpNet;
use route_mill::helpers::ip::IsDefaultRoute;

use crate::error::PipelineError;

pub mod persist;

/// Dense, zero-based identifiers for the three domains derived from the
/// distinct `(prefix, origin)` projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentAssignment {
    pub prefixes: Vec<PrefixMeta>,
    pub origins: Vec<OriginMeta>,
    pub pairs: Vec<PrefixOriginMeta>,
}

pub fn run(pair_counts: Vec<PairCount>) -> Result<IdentAssignment> {
    let assignment = assign(pair_counts)?;
    let mut conn = db_model::persist::connect("ident")?;
    persist::save(&mut conn, &assignment)?;
    info!(
        "Assigned identifiers to {} prefixes, {} origins, {} pairs",
        assignment.prefixes.len(),
        assignment.origins.len(),
        assignment.pairs.len(),
    );
    Ok(assignment)
}

/// Ranks each domain independently and densely, starting at zero.
///
/// Identifier order is a deliberate design choice: prefixes rank in the
/// natural order of [IpNet] (address family, then network address, then
/// prefix length), origins rank numerically, pairs rank by (prefix, origin).
/// This makes identifiers reproducible run-to-run over identical input,
/// which the downstream engine does not require but which makes debugging a
/// great deal less miserable.
///
/// Zero-length prefixes are the reserved default-route no-op and never
/// receive an identifier, in any domain.
pub fn assign(pair_counts: Vec<PairCount>) -> Result<IdentAssignment, PipelineError> {
    let mut by_pair: BTreeMap<(IpNet, Asn), i64> = BTreeMap::new();
    for pair in pair_counts {
        if pair.prefix.is_default_route() {
            continue;
        }
        *by_pair.entry((pair.prefix, pair.origin)).or_default() += pair.announcement_count;
    }
    if by_pair.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "the distinct (prefix, origin) projection",
        });
    }

    let mut prefix_counts: BTreeMap<IpNet, i64> = BTreeMap::new();
    let mut origin_set: BTreeSet<Asn> = BTreeSet::new();
    for ((prefix, origin), count) in &by_pair {
        *prefix_counts.entry(*prefix).or_default() += count;
        origin_set.insert(*origin);
    }

    let assignment = IdentAssignment {
        prefixes: prefix_counts
            .into_iter()
            .enumerate()
            .map(|(rank, (prefix, announcement_count))| PrefixMeta {
                prefix,
                announcement_count,
                prefix_id: rank as i64,
            })
            .collect(),
        origins: origin_set
            .into_iter()
            .enumerate()
            .map(|(rank, origin)| OriginMeta {
                origin,
                origin_id: rank as i64,
            })
            .collect(),
        pairs: by_pair
            .into_keys()
            .enumerate()
            .map(|(rank, (prefix, origin))| PrefixOriginMeta {
                prefix,
                origin,
                prefix_origin_id: rank as i64,
            })
            .collect(),
    };
    verify_density(&assignment)?;
    Ok(assignment)
}

/// Each identifier domain must be exactly {0, .., n-1}. Enumeration gives us
/// that by construction, but a gap here corrupts the engine's array indexing
/// badly enough that we check anyway before signaling completion.
fn verify_density(assignment: &IdentAssignment) -> Result<(), PipelineError> {
    check_dense(
        "prefix_id",
        assignment.prefixes.iter().map(|meta| meta.prefix_id),
    )?;
    check_dense(
        "origin_id",
        assignment.origins.iter().map(|meta| meta.origin_id),
    )?;
    check_dense(
        "prefix_origin_id",
        assignment.pairs.iter().map(|meta| meta.prefix_origin_id),
    )
}

fn check_dense(domain: &str, ids: impl Iterator<Item = i64>) -> Result<(), PipelineError> {
    for (expected, actual) in ids.enumerate() {
        if expected as i64 != actual {
            return Err(PipelineError::invariant(format!(
                "{} domain is not dense: expected {}, found {}",
                domain, expected, actual
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use db_model::test_utils::*;

    #[test]
    fn ids_are_dense_and_zero_based() -> Result<()> {
        // given
        let pairs = vec![
            gen_pair("10.0.1.0/24", 64501, 3),
            gen_pair("10.0.0.0/24", 64502, 2),
            gen_pair("10.0.0.0/24", 64501, 5),
        ];

        // when
        let assignment = assign(pairs)?;

        // then
        assert_that!(assignment.prefixes).has_length(2);
        assert_that!(assignment.origins).has_length(2);
        assert_that!(assignment.pairs).has_length(3);
        let prefix_ids: Vec<i64> = assignment.prefixes.iter().map(|m| m.prefix_id).collect();
        assert_that!(prefix_ids).is_equal_to(vec![0, 1]);
        let pair_ids: Vec<i64> = assignment.pairs.iter().map(|m| m.prefix_origin_id).collect();
        assert_that!(pair_ids).is_equal_to(vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn prefix_count_sums_over_origins() -> Result<()> {
        // given
        let pairs = vec![
            gen_pair("10.0.0.0/24", 64501, 5),
            gen_pair("10.0.0.0/24", 64502, 2),
        ];

        // when
        let assignment = assign(pairs)?;

        // then
        assert_that!(assignment.prefixes).has_length(1);
        assert_that!(assignment.prefixes[0].announcement_count).is_equal_to(7);
        Ok(())
    }

    #[test]
    fn order_is_deterministic() -> Result<()> {
        // given
        let forwards = vec![
            gen_pair("10.0.0.0/24", 64501, 1),
            gen_pair("192.0.2.0/25", 64502, 1),
            gen_pair("2001:db8::/32", 64503, 1),
        ];
        let mut backwards = forwards.clone();
        backwards.reverse();

        // when
        let first = assign(forwards)?;
        let second = assign(backwards)?;

        // then
        assert_that!(second).is_equal_to(first.clone());
        // v4 sorts before v6 in IpNet's natural order
        assert_that!(first.prefixes[0].prefix).is_equal_to(net("10.0.0.0/24"));
        assert_that!(first.prefixes[2].prefix).is_equal_to(net("2001:db8::/32"));
        Ok(())
    }

    #[test]
    fn default_route_never_gets_an_id() -> Result<()> {
        // given
        let pairs = vec![
            gen_pair("0.0.0.0/0", 64500, 9),
            gen_pair("::/0", 64500, 4),
            gen_pair("10.0.0.0/24", 64501, 1),
        ];

        // when
        let assignment = assign(pairs)?;

        // then
        assert_that!(assignment.pairs).has_length(1);
        assert_that!(assignment.origins).has_length(1);
        assert_that!(assignment.origins[0].origin).is_equal_to(64501);
        Ok(())
    }

    #[test]
    fn empty_input_fails_fast() {
        // when
        let result = assign(vec![]);

        // then
        assert_that!(result).is_err();
    }

    #[test]
    fn only_default_routes_fails_fast() {
        // given
        let pairs = vec![gen_pair("0.0.0.0/0", 64500, 9)];

        // when
        let result = assign(pairs);

        // then
        assert_that!(result).is_equal_to(Err(PipelineError::EmptyInput {
            what: "the distinct (prefix, origin) projection",
        }));
    }
}
