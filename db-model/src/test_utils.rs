use chrono::NaiveDateTime;
use ipnet::IpNet;

use crate::{
    announce::{Announcement, PairCount, Roa},
    Asn,
};

pub fn net(input: &str) -> IpNet {
    input.parse().expect(input)
}

pub fn ts(unix_secs: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp(unix_secs, 0)
        .expect("timestamp in range")
        .naive_utc()
}

pub fn gen_announcement(id: i64, prefix: &str, as_path: &[Asn]) -> Announcement {
    let as_path = as_path.to_vec();
    let origin = *as_path.last().unwrap_or(&0);
    Announcement {
        id,
        prefix: net(prefix),
        as_path,
        origin,
        recv_time: ts(1_700_000_000),
    }
}

pub fn gen_roa(asn: Asn, prefix: &str, max_length: i16, created_secs: i64) -> Roa {
    Roa {
        id: 0,
        asn,
        prefix: net(prefix),
        max_length,
        created_at: ts(created_secs),
    }
}

pub fn gen_pair(prefix: &str, origin: Asn, announcement_count: i64) -> PairCount {
    PairCount {
        prefix: net(prefix),
        origin,
        announcement_count,
    }
}
