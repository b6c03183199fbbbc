//! Delegated-order adapter for PayPal Orders v2.
//!
//! Flow: create an order (intent `CAPTURE`), send the payer to the `approve`
//! link, then capture once they return. Every call is authenticated with a
//! client-credentials bearer token from [`TokenManager`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::credentials::{endpoint, CredentialStore, PayPalCredentials};
use crate::error::PaymentError;
use crate::intent::{amount_text, is_present, PaymentIntent, PaymentStatus, Provider};
use crate::provider::{require_reference, ProviderAdapter};
use crate::reply::{decode, transport_error, UpstreamReply};
use crate::token::TokenManager;

pub const MISSING_ORDER_FIELDS: &str = "Amount, returnUrl, and cancelUrl are required";
pub const MISSING_ORDER_ID: &str = "Order ID is required";
const CREATE_FAILED: &str = "PayPal order creation failed";
const CREATE_ERROR: &str = "Failed to create PayPal order";
const CAPTURE_FAILED: &str = "PayPal capture failed";
const CAPTURE_ERROR: &str = "Failed to capture PayPal order";
const LOOKUP_FAILED: &str = "PayPal order lookup failed";
const LOOKUP_ERROR: &str = "Failed to verify PayPal order";

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    intent: &'static str,
    purchase_units: [PurchaseUnit<'a>; 1],
    application_context: ApplicationContext<'a>,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit<'a> {
    amount: Money<'a>,
}

#[derive(Debug, Serialize)]
struct Money<'a> {
    currency_code: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct ApplicationContext<'a> {
    brand_name: &'a str,
    landing_page: &'static str,
    user_action: &'static str,
    return_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

/// Order resource as returned by create, capture and get.
#[derive(Debug, Deserialize)]
struct OrderReply {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    payer: Value,
    #[serde(default)]
    purchase_units: Value,
    #[serde(default)]
    create_time: Option<String>,
    #[serde(default)]
    update_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "approvalUrl")]
    pub approval_url: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedOrder {
    pub success: bool,
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: String,
    pub payer: Value,
    pub purchase_units: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: String,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub payer: Value,
    pub purchase_units: Value,
}

#[derive(Debug, Clone)]
pub struct PayPalAdapter {
    http: reqwest::Client,
    credentials: Arc<CredentialStore>,
    tokens: TokenManager,
}

/// Amount text, return URL and cancel URL, all present and non-empty.
pub fn require_create(intent: &PaymentIntent) -> Result<(String, &str, &str), PaymentError> {
    let amount = intent
        .amount
        .as_ref()
        .filter(|a| is_present(Some(*a)))
        .and_then(amount_text);
    let return_url = intent.return_url.as_deref().filter(|u| !u.is_empty());
    let cancel_url = intent.cancel_url.as_deref().filter(|u| !u.is_empty());
    match (amount, return_url, cancel_url) {
        (Some(amount), Some(return_url), Some(cancel_url)) => Ok((amount, return_url, cancel_url)),
        _ => Err(PaymentError::validation(MISSING_ORDER_FIELDS)),
    }
}

impl PayPalAdapter {
    pub fn new(http: reqwest::Client, credentials: Arc<CredentialStore>, tokens: TokenManager) -> Self {
        Self {
            http,
            credentials,
            tokens,
        }
    }

    fn client(&self) -> Result<&PayPalCredentials, PaymentError> {
        self.credentials
            .paypal
            .as_ref()
            .ok_or_else(|| PaymentError::Auth("PayPal client credentials are not configured".into()))
    }

    fn base_url(&self) -> &str {
        &self.credentials.paypal_base_url
    }

    fn order_url(&self, order_id: &str, suffix: &str) -> String {
        endpoint(
            self.base_url(),
            &format!("/v2/checkout/orders/{}{suffix}", urlencoding::encode(order_id)),
        )
    }

    async fn bearer(&self) -> Result<(String, &PayPalCredentials), PaymentError> {
        let client = self.client()?;
        let token = self.tokens.acquire_token(client, self.base_url()).await?;
        Ok((token.secret().to_string(), client))
    }

    /// A 401 on an order call means the cached token went stale; drop it so
    /// the next request exchanges credentials again.
    async fn note_rejection(&self, status: u16, client: &PayPalCredentials) {
        if status == 401 {
            self.tokens.invalidate(client, self.base_url()).await;
        }
    }

    /// Create an order and return its approval link.
    pub async fn create_order(&self, intent: &mut PaymentIntent) -> Result<CreatedOrder, PaymentError> {
        let (amount, return_url, cancel_url) = require_create(intent)?;
        let (token, client) = self.bearer().await?;

        let body = OrderRequest {
            intent: "CAPTURE",
            purchase_units: [PurchaseUnit {
                amount: Money {
                    currency_code: &intent.currency,
                    value: &amount,
                },
            }],
            application_context: ApplicationContext {
                brand_name: &self.credentials.paypal_brand_name,
                landing_page: "BILLING",
                user_action: "PAY_NOW",
                return_url,
                cancel_url,
            },
        };

        let resp = self
            .http
            .post(endpoint(self.base_url(), "/v2/checkout/orders"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(CREATE_ERROR, e))?;

        let order: OrderReply = match decode(resp, CREATE_ERROR).await? {
            UpstreamReply::Accepted(order) => order,
            UpstreamReply::Rejected { status, details } => {
                tracing::warn!(status, details = %details, "PayPal rejected order creation");
                self.note_rejection(status, client).await;
                return Err(PaymentError::upstream(CREATE_FAILED, details));
            }
        };

        let approval_url = order
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone())
            .ok_or_else(|| {
                tracing::error!(order_id = %order.id, "PayPal order has no approve link");
                PaymentError::internal(CREATE_ERROR, "PayPal response did not include an approval link")
            })?;

        intent.assign_reference(order.id.clone())?;
        intent.advance(PaymentStatus::from_order_status(&order.status))?;
        tracing::info!(order_id = %order.id, status = %order.status, "PayPal order created");

        Ok(CreatedOrder {
            order_id: order.id,
            approval_url,
            status: order.status,
        })
    }

    /// Capture an approved order. Each call reaches PayPal; there is no
    /// local de-duplication.
    pub async fn capture_order(&self, intent: &mut PaymentIntent) -> Result<CapturedOrder, PaymentError> {
        let order_id = require_reference(intent, MISSING_ORDER_ID)?.to_string();
        let (token, client) = self.bearer().await?;

        let resp = self
            .http
            .post(self.order_url(&order_id, "/capture"))
            .bearer_auth(&token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| transport_error(CAPTURE_ERROR, e))?;

        let order: OrderReply = match decode(resp, CAPTURE_ERROR).await? {
            UpstreamReply::Accepted(order) => order,
            UpstreamReply::Rejected { status, details } => {
                tracing::warn!(status, order_id = %order_id, details = %details, "PayPal rejected capture");
                self.note_rejection(status, client).await;
                return Err(PaymentError::upstream(CAPTURE_FAILED, details));
            }
        };

        intent.advance(PaymentStatus::from_order_status(&order.status))?;
        tracing::info!(order_id = %order.id, status = %order.status, "PayPal order captured");

        Ok(CapturedOrder {
            success: true,
            order_id: order.id,
            status: order.status,
            payer: order.payer,
            purchase_units: order.purchase_units,
        })
    }

    /// Read an order without changing it.
    pub async fn verify_by_id(&self, intent: &mut PaymentIntent) -> Result<OrderDetails, PaymentError> {
        let order_id = require_reference(intent, MISSING_ORDER_ID)?.to_string();
        let (token, client) = self.bearer().await?;

        let resp = self
            .http
            .get(self.order_url(&order_id, ""))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| transport_error(LOOKUP_ERROR, e))?;

        let order: OrderReply = match decode(resp, LOOKUP_ERROR).await? {
            UpstreamReply::Accepted(order) => order,
            UpstreamReply::Rejected { status, details } => {
                tracing::warn!(status, order_id = %order_id, details = %details, "PayPal order lookup rejected");
                self.note_rejection(status, client).await;
                return Err(PaymentError::upstream(LOOKUP_FAILED, details));
            }
        };

        intent.advance(PaymentStatus::from_order_status(&order.status))?;

        Ok(OrderDetails {
            order_id: order.id,
            status: order.status,
            create_time: order.create_time,
            update_time: order.update_time,
            payer: order.payer,
            purchase_units: order.purchase_units,
        })
    }
}

impl ProviderAdapter for PayPalAdapter {
    type Initiated = CreatedOrder;
    type Verified = OrderDetails;
    type Captured = CapturedOrder;

    fn provider(&self) -> Provider {
        Provider::DelegatedOrder
    }

    async fn initiate(&self, intent: &mut PaymentIntent) -> Result<CreatedOrder, PaymentError> {
        self.create_order(intent).await
    }

    async fn verify(&self, intent: &mut PaymentIntent) -> Result<OrderDetails, PaymentError> {
        self.verify_by_id(intent).await
    }

    async fn capture(&self, intent: &mut PaymentIntent) -> Result<CapturedOrder, PaymentError> {
        self.capture_order(intent).await
    }
}
