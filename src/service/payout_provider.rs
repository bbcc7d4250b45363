use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{config::Config, models::paymentmodel::PayoutMethod, service::error::ServiceError};

/// External payment rail for vendor payouts. The core treats this as an
/// opaque, fallible collaborator: a transfer either yields an external
/// reference or an error, and nothing here participates in the ledger's
/// own invariants.
#[derive(Debug)]
pub struct PayoutProviderService {
    client: reqwest::Client,
    stripe_secret_key: String,
    paypal_secret_key: String,
    active_provider: String, // "stripe", "paypal" or "manual"
}

#[derive(Debug, Serialize, Deserialize)]
struct StripeTransferResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PaypalBatchHeader {
    payout_batch_id: String,
}

#[derive(Debug, Deserialize)]
struct PaypalPayoutResponse {
    batch_header: PaypalBatchHeader,
}

impl PayoutProviderService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            stripe_secret_key: config.stripe_secret_key.clone(),
            paypal_secret_key: config.paypal_secret_key.clone(),
            active_provider: config.active_payout_provider.clone(),
        }
    }

    /// Send funds to a vendor destination. Returns the rail's reference for
    /// the transfer.
    pub async fn send_funds(
        &self,
        amount_pence: i64,
        currency: &str,
        destination: &str,
        method: PayoutMethod,
    ) -> Result<String, ServiceError> {
        let reference = generate_payout_reference();

        match self.active_provider.as_str() {
            "stripe" => {
                self.stripe_transfer(amount_pence, currency, destination, &reference)
                    .await
            }
            "paypal" => {
                self.paypal_payout(amount_pence, currency, destination, &reference)
                    .await
            }
            // Manual settlement: the operations team moves the money
            // out-of-band and the reference is the audit handle.
            "manual" => {
                tracing::info!(
                    %reference,
                    amount_pence,
                    method = method.to_str(),
                    "manual payout recorded for {}",
                    destination
                );
                Ok(reference)
            }
            other => Err(ServiceError::ExternalService(format!(
                "Unknown payout provider: {}",
                other
            ))),
        }
    }

    async fn stripe_transfer(
        &self,
        amount_pence: i64,
        currency: &str,
        destination: &str,
        reference: &str,
    ) -> Result<String, ServiceError> {
        let params = [
            ("amount", amount_pence.to_string()),
            ("currency", currency.to_lowercase()),
            ("destination", destination.to_string()),
            ("transfer_group", reference.to_string()),
        ];

        let response = self
            .client
            .post("https://api.stripe.com/v1/transfers")
            .bearer_auth(&self.stripe_secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("Stripe request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalService(format!(
                "Stripe transfer failed ({}): {}",
                status, body
            )));
        }

        let transfer: StripeTransferResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("Stripe response invalid: {}", e)))?;

        Ok(transfer.id)
    }

    async fn paypal_payout(
        &self,
        amount_pence: i64,
        currency: &str,
        destination: &str,
        reference: &str,
    ) -> Result<String, ServiceError> {
        let body = serde_json::json!({
            "sender_batch_header": {
                "sender_batch_id": reference,
                "email_subject": "You have a payout",
            },
            "items": [{
                "recipient_type": "PAYPAL_ID",
                "amount": {
                    "value": format!("{}.{:02}", amount_pence / 100, amount_pence % 100),
                    "currency": currency,
                },
                "receiver": destination,
            }],
        });

        let response = self
            .client
            .post("https://api.paypal.com/v1/payments/payouts")
            .bearer_auth(&self.paypal_secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("PayPal request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalService(format!(
                "PayPal payout failed ({}): {}",
                status, body
            )));
        }

        let payout: PaypalPayoutResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("PayPal response invalid: {}", e)))?;

        Ok(payout.batch_header.payout_batch_id)
    }
}

fn generate_payout_reference() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..12)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!("po_{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_prefix_and_length() {
        let reference = generate_payout_reference();
        assert!(reference.starts_with("po_"));
        assert_eq!(reference.len(), 15);
    }
}
