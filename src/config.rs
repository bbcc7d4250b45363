#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Fee policy, in basis points. Policy, not law: ops can retune these
    // without touching code, and existing payments keep their frozen fees.
    pub platform_fee_bps: u32,
    pub escrow_fee_bps: u32,
    pub currency: String,
    // Payout rail configuration
    pub active_payout_provider: String,
    pub stripe_secret_key: String,
    pub paypal_secret_key: String,
    // Housekeeping
    pub notification_retention_days: i32,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let platform_fee_bps = std::env::var("PLATFORM_FEE_BPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(500);
        let escrow_fee_bps = std::env::var("ESCROW_FEE_BPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(200);
        let currency = std::env::var("CURRENCY").unwrap_or_else(|_| "GBP".to_string());

        let active_payout_provider =
            std::env::var("ACTIVE_PAYOUT_PROVIDER").unwrap_or_else(|_| "manual".to_string());
        let stripe_secret_key =
            std::env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| "test_secret_key".to_string());
        let paypal_secret_key =
            std::env::var("PAYPAL_SECRET_KEY").unwrap_or_else(|_| "test_secret_key".to_string());

        let notification_retention_days = std::env::var("NOTIFICATION_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(30);

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            platform_fee_bps,
            escrow_fee_bps,
            currency,
            active_payout_provider,
            stripe_secret_key,
            paypal_secret_key,
            notification_retention_days,
        }
    }
}
