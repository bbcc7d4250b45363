pub mod background_jobs;
pub mod bidding_service;
pub mod error;
pub mod escrow_service;
pub mod events;
pub mod job_service;
pub mod notification_service;
pub mod payout_provider;
pub mod payout_service;
