use anyhow::{Context, Result};
use diesel::dsl::count_star;
use diesel::prelude::*;
use ipnet::IpNet;
use tracing::instrument;

use db_model::announce::PairCount;
use db_model::persist::dsl::masklen;
use db_model::persist::DieselErrorFixCause;
use db_model::Asn;

use super::IdentAssignment;

/// Postgres caps bind parameters at 16 bits, so bulk inserts go in chunks.
pub const INSERT_CHUNK: usize = 4096;

/// Loads the distinct `(prefix, origin)` projection with per-pair
/// announcement counts. Default routes are dropped here already so that
/// neither consumer of the projection ever sees them.
#[instrument(skip_all)]
pub fn load_pair_counts(conn: &mut PgConnection) -> Result<Vec<PairCount>> {
    use db_model::schema::announcement::dsl::*;

    let rows: Vec<(IpNet, Asn, i64)> = announcement
        .filter(masklen(prefix).gt(0_i64))
        .group_by((prefix, origin))
        .select((prefix, origin, count_star()))
        .load(conn)
        .fix_cause()
        .context("while loading the distinct (prefix, origin) projection")?;

    Ok(rows
        .into_iter()
        .map(|(net, asn, cnt)| PairCount {
            prefix: net,
            origin: asn,
            announcement_count: cnt,
        })
        .collect())
}

/// Replaces the three identifier tables in one transaction, so the next
/// stage either sees the complete new assignment or the old one.
#[instrument(skip_all, fields(pairs = assignment.pairs.len()))]
pub fn save(conn: &mut PgConnection, assignment: &IdentAssignment) -> Result<()> {
    use db_model::schema::{origin_meta, prefix_meta, prefix_origin_meta};

    conn.transaction(|conn| -> Result<()> {
        diesel::delete(prefix_meta::table)
            .execute(conn)
            .fix_cause()?;
        diesel::delete(origin_meta::table)
            .execute(conn)
            .fix_cause()?;
        diesel::delete(prefix_origin_meta::table)
            .execute(conn)
            .fix_cause()?;

        for chunk in assignment.prefixes.chunks(INSERT_CHUNK) {
            diesel::insert_into(prefix_meta::table)
                .values(chunk)
                .execute(conn)
                .fix_cause()?;
        }
        for chunk in assignment.origins.chunks(INSERT_CHUNK) {
            diesel::insert_into(origin_meta::table)
                .values(chunk)
                .execute(conn)
                .fix_cause()?;
        }
        for chunk in assignment.pairs.chunks(INSERT_CHUNK) {
            diesel::insert_into(prefix_origin_meta::table)
                .values(chunk)
                .execute(conn)
                .fix_cause()?;
        }
        Ok(())
    })
    .context("while saving the identifier assignment")
}
