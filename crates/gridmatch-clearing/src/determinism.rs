//! Settlement fingerprinting.
//!
//! Two runs over the same snapshot must produce the same fills. The
//! `settlement_root` is a SHA-256 over the fills in execution order, so two
//! settlement reports can be compared without diffing their payloads.

use gridmatch_types::{Fill, amount};
use sha2::{Digest, Sha256};

const DOMAIN: &[u8] = b"gridmatch:settlement_root:v1:";

/// Compute the settlement root over a sequence of fills.
///
/// Covers sequence number, both parties, quantity, price and the three money
/// amounts. Money is hashed in its six-place text form so that `1` and
/// `1.000000` hash identically. Order matters.
#[must_use]
pub fn compute_settlement_root(fills: &[Fill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update((fills.len() as u64).to_le_bytes());

    for fill in fills {
        hasher.update(fill.seq.to_le_bytes());
        update_str(&mut hasher, fill.buyer.as_str());
        update_str(&mut hasher, fill.seller.as_str());
        hasher.update(fill.quantity.to_le_bytes());
        hasher.update(fill.price.to_le_bytes());
        update_str(&mut hasher, &amount::format(fill.trade_value));
        update_str(&mut hasher, &amount::format(fill.fee));
        update_str(&mut hasher, &amount::format(fill.seller_credit));
    }

    hasher.finalize().into()
}

/// Recompute the root and compare.
#[must_use]
pub fn verify_settlement_root(fills: &[Fill], expected_root: &[u8; 32]) -> bool {
    compute_settlement_root(fills) == *expected_root
}

// Length-prefixed so ("ab", "c") and ("a", "bc") differ.
fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
