use diesel::prelude::*;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::Asn;

/// ROA validity verdict for one `(prefix, origin)` pair.
///
/// The variant order is load-bearing: it is the leniency order used for
/// conflict resolution when several current ROAs cover the same pair. The
/// derived `Ord` makes "most lenient covering verdict wins" a plain `min()`,
/// so `Valid` must stay first and `InvalidByAll` last.
#[derive(
    diesel_derive_enum::DbEnum,
    strum::Display,
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[ExistingTypePath = "crate::sql_types::ValidityVerdict"]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    // Important: Used in the database, do not change incompatibly!
    Valid,
    /// No current ROA covers the pair. Explicitly recorded, never absent.
    Unknown,
    InvalidByOrigin,
    InvalidByLength,
    /// Both the origin and the announced length are unauthorized.
    InvalidByAll,
}

impl Verdict {
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            Verdict::InvalidByOrigin | Verdict::InvalidByLength | Verdict::InvalidByAll
        )
    }
}

/// Exactly one row per distinct `(prefix, origin)` pair. Queried directly by
/// the reporting collaborators, and joined back onto announcements by the
/// enrichment stage, which relies on the at-most-one-row guarantee.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::roa_validity)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(prefix, origin))]
pub struct ValidityRecord {
    pub prefix: IpNet,
    pub origin: Asn,
    pub verdict: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;

    #[test]
    fn leniency_order_is_variant_order() {
        // given
        let mut verdicts = vec![
            Verdict::InvalidByAll,
            Verdict::Unknown,
            Verdict::InvalidByOrigin,
            Verdict::Valid,
            Verdict::InvalidByLength,
        ];

        // when
        verdicts.sort();

        // then
        assert_that!(verdicts).is_equal_to(vec![
            Verdict::Valid,
            Verdict::Unknown,
            Verdict::InvalidByOrigin,
            Verdict::InvalidByLength,
            Verdict::InvalidByAll,
        ]);
    }

    #[test]
    fn unknown_is_not_invalid() {
        // given
        let not_invalid = [Verdict::Valid, Verdict::Unknown];
        let invalid = [
            Verdict::InvalidByOrigin,
            Verdict::InvalidByLength,
            Verdict::InvalidByAll,
        ];

        // then
        assert_that!(not_invalid.iter().any(|v| v.is_invalid())).is_false();
        assert_that!(invalid.iter().all(|v| v.is_invalid())).is_true();
    }

    #[test]
    fn displays_as_screaming_snake_case() {
        // when / then
        assert_that!(Verdict::InvalidByLength.to_string())
            .is_equal_to("INVALID_BY_LENGTH".to_string());
        assert_that!(Verdict::Valid.to_string()).is_equal_to("VALID".to_string());
    }

    #[test]
    fn lenient_wins_via_min() {
        // given
        let covering = [Verdict::InvalidByOrigin, Verdict::Valid];

        // when
        let verdict = covering.iter().min().copied();

        // then
        assert_that!(verdict).is_equal_to(Some(Verdict::Valid));
    }
}
