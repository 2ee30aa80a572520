use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::instrument;

use db_model::announce::Announcement;
use db_model::enriched::EnrichedAnnouncement;
use db_model::persist::dsl::masklen;
use db_model::persist::DieselErrorFixCause;

use crate::error::PipelineError;
use crate::ident::persist::INSERT_CHUNK;

/// Loads every announcement except default-route rows, mirroring the filter
/// of the distinct-pair projection. The join's row-count invariant is
/// checked against this same filtered set.
#[instrument(skip_all)]
pub fn load_announcements(conn: &mut PgConnection) -> Result<Vec<Announcement>> {
    use db_model::schema::announcement::dsl::*;

    announcement
        .filter(masklen(prefix).gt(0_i64))
        .select(Announcement::as_select())
        .load(conn)
        .fix_cause()
        .context("while loading announcements for enrichment")
}

#[instrument(skip_all, fields(rows = enriched.len()))]
pub fn save(conn: &mut PgConnection, enriched: &[EnrichedAnnouncement]) -> Result<()> {
    use db_model::schema::enriched_announcement;

    let inserted = conn
        .transaction(|conn| -> Result<usize> {
            diesel::delete(enriched_announcement::table)
                .execute(conn)
                .fix_cause()?;
            let mut total = 0;
            for chunk in enriched.chunks(INSERT_CHUNK) {
                total += diesel::insert_into(enriched_announcement::table)
                    .values(chunk)
                    .execute(conn)
                    .fix_cause()?;
            }
            Ok(total)
        })
        .context("while saving enriched announcements")?;

    if inserted != enriched.len() {
        return Err(PipelineError::invariant(format!(
            "inserted {} enriched rows, expected {}",
            inserted,
            enriched.len(),
        ))
        .into());
    }
    Ok(())
}
