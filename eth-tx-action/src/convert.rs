use ethers::types::{I256, U256};
use ethers::utils::format_ether;
use thiserror::Error;

/// 10^38 ещё помещается в u128, дальше масштаб не считаем.
pub const MAX_FEED_DECIMALS: u8 = 38;

/// Fixed-point precision of the native currency (wei per ETH = 10^18).
pub const NATIVE_DECIMALS: usize = 18;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("price must be a positive finite number, got {0}")]
    NonPositivePrice(f64),

    #[error("usd amount must be a non-negative finite number, got {0}")]
    InvalidAmount(f64),

    #[error("price feed answer must be positive, got {0}")]
    NonPositiveAnswer(I256),

    #[error("price feed answer does not fit into 128 bits: {0}")]
    AnswerTooLarge(I256),

    #[error("price feed decimals out of range (max 38): {0}")]
    DecimalsOutOfRange(u8),

    #[error("cannot parse `{value}` as ether: {reason}")]
    Parse { value: String, reason: String },
}

/// answer / 10^decimals. Масштаб считается точно в целых, во float переводим один раз.
pub fn normalize_price(answer: I256, decimals: u8) -> Result<f64, ConvertError> {
    if answer <= I256::zero() {
        return Err(ConvertError::NonPositiveAnswer(answer));
    }
    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(ConvertError::DecimalsOutOfRange(decimals))?;

    let raw = answer.into_raw();
    if raw > U256::from(u128::MAX) {
        return Err(ConvertError::AnswerTooLarge(answer));
    }

    Ok(raw.as_u128() as f64 / scale as f64)
}

/// Converts a USD amount into wei at `price` USD per ETH.
///
/// The ETH amount is computed in floating point, rendered with exactly 18
/// fractional digits (round-to-nearest at the last digit) and parsed back as
/// an integer wei value, so sub-wei amounts collapse to zero.
pub fn usd_to_wei(usd_amount: f64, price: f64) -> Result<U256, ConvertError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ConvertError::NonPositivePrice(price));
    }
    if !usd_amount.is_finite() || usd_amount < 0.0 {
        return Err(ConvertError::InvalidAmount(usd_amount));
    }

    let eth_per_usd = 1.0 / price;
    let total_eth = eth_per_usd * usd_amount;
    if !total_eth.is_finite() {
        return Err(ConvertError::InvalidAmount(usd_amount));
    }
    // -0.0 отформатировался бы как "-0.000…"
    if total_eth == 0.0 {
        return Ok(U256::zero());
    }

    let fixed = format!("{total_eth:.prec$}", prec = NATIVE_DECIMALS);
    parse_eth_amount(&fixed)
}

/// Decimal ETH string (`"1"`, `"0.25"`, `".5"`) to wei.
///
/// Only unsigned plain decimals with at most 18 fractional digits are
/// accepted. Arithmetic is checked, so amounts beyond `U256` are an error
/// rather than an overflow.
pub fn parse_eth_amount(raw: &str) -> Result<U256, ConvertError> {
    let s = raw.trim();
    let fail = |reason: &str| ConvertError::Parse {
        value: s.to_string(),
        reason: reason.to_string(),
    };

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(fail("expected a decimal number"));
    }
    let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !digits(int_part) || !digits(frac_part) {
        return Err(fail("expected an unsigned decimal number"));
    }
    if frac_part.len() > NATIVE_DECIMALS {
        return Err(fail("more than 18 fractional digits"));
    }

    let too_large = || fail("the number is too large for the type");
    let whole = if int_part.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_part).map_err(|_| too_large())?
    };
    let frac = if frac_part.is_empty() {
        U256::zero()
    } else {
        // "25" -> 25 * 10^16
        U256::from_dec_str(frac_part).map_err(|_| too_large())?
            * U256::exp10(NATIVE_DECIMALS - frac_part.len())
    };

    whole
        .checked_mul(U256::exp10(NATIVE_DECIMALS))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(too_large)
}

/// wei -> "1.000000000000000000"
pub fn format_wei(wei: U256) -> String {
    format_ether(wei)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wei(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    #[test]
    fn normalizes_chainlink_answer() {
        let p = normalize_price(I256::from(123_456_789_012i64), 8).unwrap();
        assert_eq!(p, 1234.56789012);
    }

    #[test]
    fn normalize_rejects_non_positive_answer() {
        assert!(matches!(
            normalize_price(I256::zero(), 8),
            Err(ConvertError::NonPositiveAnswer(_))
        ));
        assert!(matches!(
            normalize_price(I256::from(-5i64), 8),
            Err(ConvertError::NonPositiveAnswer(_))
        ));
    }

    #[test]
    fn normalize_rejects_huge_decimals() {
        assert_eq!(
            normalize_price(I256::from(1i64), 39),
            Err(ConvertError::DecimalsOutOfRange(39))
        );
        assert!(normalize_price(I256::from(1i64), 38).is_ok());
    }

    #[test]
    fn same_usd_as_price_is_about_one_eth() {
        let price = 1234.56789012;
        let out = usd_to_wei(price, price).unwrap();
        let one = U256::exp10(18);
        let diff = if out > one { out - one } else { one - out };
        assert!(diff <= U256::from(1_000u64), "got {out}");
    }

    #[test]
    fn exact_values_convert_exactly() {
        assert_eq!(usd_to_wei(1000.0, 2000.0).unwrap(), wei("500000000000000000"));
        assert_eq!(usd_to_wei(100.0, 400.0).unwrap(), wei("250000000000000000"));
    }

    #[test]
    fn zero_usd_is_zero_wei() {
        assert_eq!(usd_to_wei(0.0, 1800.0).unwrap(), U256::zero());
        assert_eq!(usd_to_wei(-0.0, 1800.0).unwrap(), U256::zero());
    }

    #[test]
    fn sub_wei_amount_rounds_to_zero() {
        assert_eq!(usd_to_wei(1e-16, 3000.0).unwrap(), U256::zero());
    }

    #[test]
    fn bad_price_is_an_error() {
        for p in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                usd_to_wei(10.0, p),
                Err(ConvertError::NonPositivePrice(_))
            ));
        }
    }

    #[test]
    fn huge_result_is_an_error_not_an_overflow() {
        // 1e70 ETH: целая часть влезает в U256, умножение на 10^18 уже нет
        assert!(matches!(
            usd_to_wei(1e70, 1.0),
            Err(ConvertError::Parse { .. })
        ));
        assert!(usd_to_wei(1e70, 1e-10).is_err());
    }

    #[test]
    fn bad_usd_is_an_error() {
        assert!(matches!(
            usd_to_wei(-1.0, 1800.0),
            Err(ConvertError::InvalidAmount(_))
        ));
        assert!(matches!(
            usd_to_wei(f64::NAN, 1800.0),
            Err(ConvertError::InvalidAmount(_))
        ));
    }

    #[test]
    fn monotonic_in_usd_and_price() {
        let price = 1873.21;
        let mut prev = U256::zero();
        for usd in [0.0, 0.01, 1.0, 5.5, 250.0, 10_000.0, 1e9] {
            let cur = usd_to_wei(usd, price).unwrap();
            assert!(cur >= prev, "usd={usd}");
            prev = cur;
        }

        let mut prev = U256::MAX;
        for price in [0.5, 1.0, 99.99, 1873.21, 4000.0, 1e7] {
            let cur = usd_to_wei(250.0, price).unwrap();
            assert!(cur <= prev, "price={price}");
            prev = cur;
        }
    }

    #[test]
    fn parses_plain_eth_amounts() {
        assert_eq!(parse_eth_amount("1").unwrap(), U256::exp10(18));
        assert_eq!(parse_eth_amount(" 0.25 ").unwrap(), wei("250000000000000000"));
        assert_eq!(parse_eth_amount(".5").unwrap(), wei("500000000000000000"));
        assert_eq!(parse_eth_amount("2.").unwrap(), wei("2000000000000000000"));
        assert_eq!(parse_eth_amount("0.000000000000000001").unwrap(), U256::one());
    }

    #[test]
    fn eth_amount_rejects_signs_and_garbage() {
        for s in ["-1", "-0.5", "+1", "", ".", "1e18", "1.2.3", "abc", "1,5"] {
            assert!(
                matches!(parse_eth_amount(s), Err(ConvertError::Parse { .. })),
                "{s:?}"
            );
        }
        assert!(parse_eth_amount("0.0000000000000000001").is_err());
    }

    #[test]
    fn eth_amount_overflow_is_an_error() {
        assert!(matches!(
            parse_eth_amount(&"1".repeat(70)),
            Err(ConvertError::Parse { .. })
        ));
        assert!(parse_eth_amount(&"9".repeat(80)).is_err());
        // 10^59 * 10^18 < 2^256, 10^60 * 10^18 уже нет
        assert!(parse_eth_amount(&format!("1{}", "0".repeat(59))).is_ok());
        assert!(parse_eth_amount(&format!("1{}", "0".repeat(60))).is_err());
    }

    #[test]
    fn fixed_string_round_trips_through_wei() {
        let s = "0.123456789012345678";
        let w = parse_eth_amount(s).unwrap();
        assert_eq!(w, wei("123456789012345678"));
        assert_eq!(format_wei(w), s);
    }
}
