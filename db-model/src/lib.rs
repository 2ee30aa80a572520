pub mod announce;
pub mod enriched;
pub mod meta;
pub mod persist;
pub mod schema;
pub mod test_utils;
pub mod validity;

pub use schema::sql_types;

/// Autonomous System Number. BGP carries 32-bit ASNs, Postgres has no
/// unsigned types, so we store them as `Int8` like everything else ASN-ish.
pub type Asn = i64;
