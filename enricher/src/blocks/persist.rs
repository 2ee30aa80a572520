use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::instrument;

use db_model::meta::BlockAssignment;
use db_model::persist::DieselErrorFixCause;

use crate::ident::persist::INSERT_CHUNK;

#[instrument(skip_all, fields(assignments = assignments.len()))]
pub fn save(conn: &mut PgConnection, assignments: &[BlockAssignment]) -> Result<()> {
    use db_model::schema::prefix_block;

    conn.transaction(|conn| -> Result<()> {
        diesel::delete(prefix_block::table)
            .execute(conn)
            .fix_cause()?;
        for chunk in assignments.chunks(INSERT_CHUNK) {
            diesel::insert_into(prefix_block::table)
                .values(chunk)
                .execute(conn)
                .fix_cause()?;
        }
        Ok(())
    })
    .context("while saving block assignments")
}
