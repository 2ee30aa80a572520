use chrono::NaiveDateTime;
use diesel::prelude::*;
use ipnet::IpNet;

use crate::{announce::Announcement, validity::Verdict, Asn};

/// The artifact the extrapolation engine consumes: one row per (non-default)
/// announcement, decorated with dense identifiers, block assignment and ROA
/// validity. `block_id` drives the engine's block-at-a-time loop.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::enriched_announcement)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnrichedAnnouncement {
    pub id: i64,
    pub prefix: IpNet,
    pub as_path: Vec<Asn>,
    pub origin: Asn,
    pub recv_time: NaiveDateTime,
    pub monitor_asn: Asn,
    pub prefix_id: i64,
    pub origin_id: i64,
    pub prefix_origin_id: i64,
    pub block_id: i32,
    pub verdict: Verdict,
}

pub struct Decoration {
    pub monitor_asn: Asn,
    pub prefix_id: i64,
    pub origin_id: i64,
    pub prefix_origin_id: i64,
    pub block_id: i32,
    pub verdict: Verdict,
}

impl EnrichedAnnouncement {
    pub fn decorate(ann: Announcement, deco: Decoration) -> Self {
        Self {
            id: ann.id,
            prefix: ann.prefix,
            as_path: ann.as_path,
            origin: ann.origin,
            recv_time: ann.recv_time,
            monitor_asn: deco.monitor_asn,
            prefix_id: deco.prefix_id,
            origin_id: deco.origin_id,
            prefix_origin_id: deco.prefix_origin_id,
            block_id: deco.block_id,
            verdict: deco.verdict,
        }
    }
}
