//! Sticky percentage buckets and random draws
//!
//! A client is identified by `serviceAccountId`, or by `mac` when the
//! account is missing or blank. The key is hashed with SipHash-2-4 under
//! fixed keys so bucket assignment is stable across calls and restarts.

use rand::Rng;
use siphasher::sip::SipHasher24;
use std::collections::HashMap;
use std::hash::Hasher;

pub const SERVICE_ACCOUNT_ID_PARAM: &str = "serviceAccountId";
pub const MAC_PARAM: &str = "mac";

const SIP_KEY_0: u64 = 0x0706_0504_0302_0100;
const SIP_KEY_1: u64 = 0x0f0e_0d0c_0b0a_0908;

/// Identifying attribute of the client, if any
pub fn client_key(params: &HashMap<String, String>) -> Option<&str> {
    let non_blank = |name: &str| {
        params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    };
    non_blank(SERVICE_ACCOUNT_ID_PARAM).or_else(|| non_blank(MAC_PARAM))
}

fn sip_hash(key: &str) -> i64 {
    let mut hasher = SipHasher24::new_with_keys(SIP_KEY_0, SIP_KEY_1);
    hasher.write(key.as_bytes());
    hasher.finish() as i64
}

/// True when `key` falls inside the first `percent` percent of the hash space
pub fn percent_matches(key: &str, percent: f64) -> bool {
    let threshold = ((i64::MAX / 10_000) as f64 * percent * 100.0).floor();
    if threshold < 0.0 {
        return false;
    }
    (threshold as u64) >= sip_hash(key).unsigned_abs()
}

/// Independent draw: true with probability `percent` / 100
pub fn random_matches(percent: f64) -> bool {
    rand::thread_rng().gen_range(0.0..100.0) < percent
}
