use chrono::NaiveDateTime;
use diesel::prelude::*;
use ipnet::IpNet;

use crate::Asn;

/// One observed route announcement, as collected from the MRT dumps.
/// Duplicates across monitors are expected and preserved; this table is
/// read-only for the pipeline.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::announcement)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Announcement {
    pub id: i64,
    pub prefix: IpNet,
    pub as_path: Vec<Asn>,
    pub origin: Asn,
    pub recv_time: NaiveDateTime,
}

impl Announcement {
    /// The AS that observed and reported this announcement, i.e. the first
    /// hop of the recorded path. Not the origin, which sits at the end.
    pub fn monitor_asn(&self) -> Option<Asn> {
        self.as_path.first().copied()
    }
}

/// A Route Origin Authorization as collected from the RPKI repositories.
/// Only the rows of the newest snapshot (maximum `created_at` over the whole
/// table) take part in validity classification.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::roa)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Roa {
    pub id: i64,
    pub asn: Asn,
    pub prefix: IpNet,
    pub max_length: i16,
    pub created_at: NaiveDateTime,
}

/// Row of the distinct `(prefix, origin)` projection of [Announcement],
/// carrying how many announcement rows the pair stands for. This is the
/// shared input of identifier assignment and validity classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCount {
    pub prefix: IpNet,
    pub origin: Asn,
    pub announcement_count: i64,
}
