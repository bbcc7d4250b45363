mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use routes::create_router;
use service::{
    bidding_service::BiddingService, escrow_service::EscrowService, job_service::JobService,
    notification_service::NotificationService, payout_provider::PayoutProviderService,
    payout_service::PayoutService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub bidding_service: Arc<BiddingService>,
    pub job_service: Arc<JobService>,
    pub escrow_service: Arc<EscrowService>,
    pub payout_service: Arc<PayoutService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(db_client_arc.clone()));
        let payout_provider = Arc::new(PayoutProviderService::new(&config));

        let escrow_service = Arc::new(EscrowService::new(
            db_client_arc.clone(),
            notification_service.clone(),
            config.platform_fee_bps,
            config.escrow_fee_bps,
            config.currency.clone(),
        ));

        let bidding_service = Arc::new(BiddingService::new(
            db_client_arc.clone(),
            notification_service.clone(),
        ));

        let job_service = Arc::new(JobService::new(
            db_client_arc.clone(),
            escrow_service.clone(),
            notification_service.clone(),
        ));

        let payout_service = Arc::new(PayoutService::new(
            db_client_arc.clone(),
            payout_provider,
            notification_service.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            bidding_service,
            job_service,
            escrow_service,
            payout_service,
            notification_service,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await?;
    tracing::info!("connected to the database");

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state.clone()).layer(cors);

    // Housekeeping: purge old read notifications on an interval.
    tokio::spawn(service::background_jobs::start_notification_purge_job(
        app_state.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await?;
    tracing::info!("server is running on http://localhost:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
