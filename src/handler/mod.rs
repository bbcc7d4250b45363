pub mod jobs;
pub mod notifications;
pub mod payments;
pub mod payouts;
