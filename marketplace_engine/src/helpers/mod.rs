//! Small, pure helpers used by the order flow: order-number generation, cart grouping and the
//! platform revenue split.
use mps_common::Naira;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::db_types::{CartLine, OrderNumber};

/// The seller's cut of every settled order. The remaining 20% is the platform fee.
pub const SELLER_SHARE_PERCENT: i64 = 80;

const ORDER_NUMBER_PREFIX: &str = "ORD-";
const ORDER_NUMBER_LEN: usize = 10;

/// Generates a fresh human-readable order number, e.g. `ORD-9K27DQ01XA`.
///
/// 36^10 possibilities make collisions vanishingly rare; the UNIQUE constraint on the orders
/// table catches the rest.
pub fn new_order_number() -> OrderNumber {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    OrderNumber::from(format!("{ORDER_NUMBER_PREFIX}{suffix}"))
}

/// Partitions cart lines by seller id. The grouping is stable: sellers appear in first-seen
/// order, and lines keep their cart order within each bucket.
pub fn group_cart_by_seller(lines: &[CartLine]) -> Vec<(String, Vec<CartLine>)> {
    let mut groups: Vec<(String, Vec<CartLine>)> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|(seller_id, _)| seller_id == &line.product.seller_id) {
            Some((_, bucket)) => bucket.push(line.clone()),
            None => groups.push((line.product.seller_id.clone(), vec![line.clone()])),
        }
    }
    groups
}

/// The seller's share of a gross order amount, rounded down to whole kobo.
pub fn seller_share(gross: Naira) -> Naira {
    Naira::from(gross.value() * SELLER_SHARE_PERCENT / 100)
}

/// The platform's share. Defined as the remainder so that `seller_share + platform_fee == gross`
/// for every amount.
pub fn platform_fee(gross: Naira) -> Naira {
    gross - seller_share(gross)
}

#[cfg(test)]
mod test {
    use mps_common::Naira;

    use super::*;
    use crate::db_types::{CartLine, CartProduct};

    fn line(product_id: &str, seller_id: &str, price: i64, quantity: i64) -> CartLine {
        CartLine {
            product: CartProduct { id: product_id.into(), price: Naira::from(price), seller_id: seller_id.into() },
            quantity,
        }
    }

    #[test]
    fn order_numbers_have_the_expected_shape() {
        let number = new_order_number();
        let s = number.as_str();
        assert!(s.starts_with("ORD-"));
        assert_eq!(s.len(), 4 + ORDER_NUMBER_LEN);
        assert!(s[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn grouping_is_stable_and_loses_no_lines() {
        let cart =
            vec![line("p1", "alice", 100, 1), line("p2", "bob", 200, 2), line("p3", "alice", 300, 1), line("p4", "carol", 50, 4)];
        let groups = group_cart_by_seller(&cart);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "alice");
        assert_eq!(groups[1].0, "bob");
        assert_eq!(groups[2].0, "carol");
        assert_eq!(groups[0].1, vec![cart[0].clone(), cart[2].clone()]);
        let total_lines: usize = groups.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(total_lines, cart.len());
    }

    #[test]
    fn split_preserves_the_gross_amount() {
        for gross in [0i64, 1, 99, 100, 101, 12_345, 1_000_000_001] {
            let gross = Naira::from(gross);
            assert_eq!(seller_share(gross) + platform_fee(gross), gross);
        }
        assert_eq!(seller_share(Naira::from(10_000)), Naira::from(8_000));
        assert_eq!(platform_fee(Naira::from(10_000)), Naira::from(2_000));
        // Odd kobo amounts round in the platform's favour
        assert_eq!(seller_share(Naira::from(101)), Naira::from(80));
        assert_eq!(platform_fee(Naira::from(101)), Naira::from(21));
    }
}
