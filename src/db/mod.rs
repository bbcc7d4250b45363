pub mod chatdb;
pub mod db;
pub mod jobdb;
pub mod notificationdb;
pub mod paymentdb;
pub mod payoutdb;
pub mod userdb;
