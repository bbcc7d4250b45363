/// Currency helpers for GBP amounts.
///
/// All monetary values in the database are stored in pence (1 pound = 100
/// pence) to avoid floating-point precision issues. Fee rates are expressed
/// in basis points (1 bps = 0.01%) and applied with integer arithmetic,
/// rounding half up at the pence.

/// Convert pounds to pence (multiply by 100)
pub fn pounds_to_pence(pounds: f64) -> i64 {
    (pounds * 100.0).round() as i64
}

/// Convert pence to pounds (divide by 100)
pub fn pence_to_pounds(pence: i64) -> f64 {
    pence as f64 / 100.0
}

/// Format pence as a pound string with 2 decimal places
pub fn format_pence(pence: i64) -> String {
    format!("£{:.2}", pence_to_pounds(pence))
}

/// Apply a basis-point rate to an amount in pence, rounding half up.
pub fn fee_pence(amount_pence: i64, rate_bps: u32) -> i64 {
    (amount_pence * rate_bps as i64 + 5_000) / 10_000
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub platform_fee_pence: i64,
    pub escrow_fee_pence: i64,
    pub net_amount_pence: i64,
}

/// Compute the fee split for an escrow payment. Called exactly once, at
/// payment creation; the result is frozen on the row and never recomputed.
pub fn split_fees(amount_pence: i64, platform_bps: u32, escrow_bps: u32) -> FeeBreakdown {
    let platform_fee_pence = fee_pence(amount_pence, platform_bps);
    let escrow_fee_pence = fee_pence(amount_pence, escrow_bps);
    FeeBreakdown {
        platform_fee_pence,
        escrow_fee_pence,
        net_amount_pence: amount_pence - platform_fee_pence - escrow_fee_pence,
    }
}

/// Validate and parse an amount string to pence
pub fn parse_amount_to_pence(amount_str: &str) -> Result<i64, String> {
    amount_str
        .parse::<f64>()
        .map_err(|_| "Invalid amount format".to_string())
        .and_then(|amount| {
            if amount < 0.0 {
                Err("Amount cannot be negative".to_string())
            } else {
                Ok(pounds_to_pence(amount))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_to_pence() {
        assert_eq!(pounds_to_pence(100.0), 10000);
        assert_eq!(pounds_to_pence(0.50), 50);
        assert_eq!(pounds_to_pence(123.45), 12345);
    }

    #[test]
    fn test_pence_to_pounds() {
        assert_eq!(pence_to_pounds(10000), 100.0);
        assert_eq!(pence_to_pounds(50), 0.50);
        assert_eq!(pence_to_pounds(12345), 123.45);
    }

    #[test]
    fn test_format_pence() {
        assert_eq!(format_pence(10000), "£100.00");
        assert_eq!(format_pence(50), "£0.50");
        assert_eq!(format_pence(12345), "£123.45");
    }

    #[test]
    fn test_fee_pence_rounds_half_up() {
        // 5% of £8.00
        assert_eq!(fee_pence(800, 500), 40);
        // 2% of 25p = 0.5p, rounds up to 1p
        assert_eq!(fee_pence(25, 200), 1);
        // 2% of 24p = 0.48p, rounds down
        assert_eq!(fee_pence(24, 200), 0);
    }

    #[test]
    fn test_split_fees_800_pounds() {
        // £800 at 5% platform / 2% escrow: £40 + £16, net £744.
        let fees = split_fees(80000, 500, 200);
        assert_eq!(fees.platform_fee_pence, 4000);
        assert_eq!(fees.escrow_fee_pence, 1600);
        assert_eq!(fees.net_amount_pence, 74400);
    }

    #[test]
    fn test_split_fees_conserves_money() {
        for amount in [1, 99, 101, 12345, 80000, 1_000_000] {
            let fees = split_fees(amount, 500, 200);
            assert_eq!(
                fees.platform_fee_pence + fees.escrow_fee_pence + fees.net_amount_pence,
                amount
            );
            assert!(fees.platform_fee_pence + fees.escrow_fee_pence <= amount);
        }
    }

    #[test]
    fn test_parse_amount_to_pence() {
        assert_eq!(parse_amount_to_pence("100.00"), Ok(10000));
        assert_eq!(parse_amount_to_pence("0.50"), Ok(50));
        assert_eq!(
            parse_amount_to_pence("-100"),
            Err("Amount cannot be negative".to_string())
        );
        assert_eq!(
            parse_amount_to_pence("abc"),
            Err("Invalid amount format".to_string())
        );
    }
}
