use diesel::prelude::*;
use ipnet::IpNet;

use crate::Asn;

/// Dense, zero-based identifier plus bin-packing weight for one distinct
/// announced prefix.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::prefix_meta)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(prefix))]
pub struct PrefixMeta {
    pub prefix: IpNet,
    pub announcement_count: i64,
    pub prefix_id: i64,
}

/// Dense, zero-based identifier for one distinct origin AS.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = crate::schema::origin_meta)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(origin))]
pub struct OriginMeta {
    pub origin: Asn,
    pub origin_id: i64,
}

/// Dense, zero-based identifier for one distinct `(prefix, origin)` pair.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::prefix_origin_meta)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(prefix, origin))]
pub struct PrefixOriginMeta {
    pub prefix: IpNet,
    pub origin: Asn,
    pub prefix_origin_id: i64,
}

/// Assignment of one prefix to its processing block. All `(prefix, origin)`
/// pairs of a prefix share its block, which is what lets the extrapolation
/// engine compare competing origins within a single unit of work.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::prefix_block)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(prefix))]
pub struct BlockAssignment {
    pub prefix: IpNet,
    pub block_id: i32,
}
