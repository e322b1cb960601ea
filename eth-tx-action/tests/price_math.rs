use ethers::types::{I256, U256};
use eth_tx_action::bounty::bounty_usd_from_labels;
use eth_tx_action::convert::{format_wei, normalize_price, usd_to_wei};
use pretty_assertions::assert_eq;

#[test]
fn test_bounty_label_to_wei() {
    // ETH/USD 1850.12345678 (8 decimals)
    let price = normalize_price(I256::from(185_012_345_678i64), 8).unwrap();
    let usd = bounty_usd_from_labels(&["bug", "BOUNTY: $250", "help-wanted"]).unwrap();
    assert_eq!(usd, 250.0);

    let wei = usd_to_wei(usd, price).unwrap();
    assert!(wei > U256::zero());
    // 250 / 1850.12345678 ≈ 0.135126 ETH
    assert!(format_wei(wei).starts_with("0.13512"), "{}", format_wei(wei));
}

#[test]
fn test_price_feed_unit_equivalence() {
    let price = normalize_price(I256::from(123_456_789_012i64), 8).unwrap();
    assert_eq!(price, 1234.56789012);

    let wei = usd_to_wei(price, price).unwrap();
    let one = U256::exp10(18);
    let diff = if wei > one { wei - one } else { one - wei };
    assert!(diff < U256::from(1_000u64));
}
