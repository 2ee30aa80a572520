use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::instrument;

use db_model::announce::Roa;
use db_model::persist::DieselErrorFixCause;
use db_model::validity::ValidityRecord;

use crate::ident::persist::INSERT_CHUNK;

/// Loads the full ROA table; snapshot filtering happens in
/// [super::current_snapshot] so that its semantics live in tested code
/// rather than in a query.
#[instrument(skip_all)]
pub fn load_roas(conn: &mut PgConnection) -> Result<Vec<Roa>> {
    use db_model::schema::roa::dsl::*;

    roa.select(Roa::as_select())
        .load(conn)
        .fix_cause()
        .context("while loading ROAs")
}

/// Cheap emptiness probe for the orchestrator's precondition check.
#[instrument(skip_all)]
pub fn count_roas(conn: &mut PgConnection) -> Result<i64> {
    use db_model::schema::roa::dsl::*;

    roa.count()
        .get_result(conn)
        .fix_cause()
        .context("while counting ROAs")
}

#[instrument(skip_all, fields(records = records.len()))]
pub fn save(conn: &mut PgConnection, records: &[ValidityRecord]) -> Result<()> {
    use db_model::schema::roa_validity;

    conn.transaction(|conn| -> Result<()> {
        diesel::delete(roa_validity::table)
            .execute(conn)
            .fix_cause()?;
        for chunk in records.chunks(INSERT_CHUNK) {
            diesel::insert_into(roa_validity::table)
                .values(chunk)
                .execute(conn)
                .fix_cause()?;
        }
        Ok(())
    })
    .context("while saving validity verdicts")
}
