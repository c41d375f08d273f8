//! JSON-over-HTTPS implementation of [`BackendClient`].
//!
//! Every operation is a `POST {base_url}/Client/{Operation}` with a JSON body.
//! Authorized calls carry the session's entitlement token in `X-Authorization`.
//! Responses use a common envelope:
//!
//! ```text
//! {"code":200,"status":"OK","data":{...}}
//! {"code":400,"status":"BadRequest","error":"InvalidParams","errorMessage":"..."}
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use warden_core::{EntitlementToken, InventorySnapshot, ProviderCredential, ProviderKind, Session};

use crate::backend::{AppStoreValidation, BackendClient, GooglePlayValidation};
use crate::error::BackendError;

const AUTH_HEADER: &str = "X-Authorization";

pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
    title_id: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    code: u16,
    #[serde(default)]
    status: String,
    data: Option<T>,
    error: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoginData {
    play_fab_id: String,
    session_ticket: String,
    #[serde(default)]
    newly_created: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InventoryData {
    #[serde(default)]
    inventory: Vec<ItemInstance>,
    #[serde(default)]
    virtual_currency: BTreeMap<String, i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemInstance {
    item_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurrencyData {
    balance: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionData {
    #[serde(default)]
    function_result: serde_json::Value,
    error: Option<FunctionError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

impl HttpBackendClient {
    /// # Errors
    ///
    /// Returns `BackendError::NotConfigured` if `base_url` or `title_id` is
    /// empty, or the HTTP client cannot be built.
    pub fn new(base_url: &str, title_id: &str, timeout: Duration) -> Result<Self, BackendError> {
        if base_url.is_empty() || title_id.is_empty() {
            return Err(BackendError::NotConfigured(
                "base_url and title_id are required".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            title_id: title_id.to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        token: Option<&EntitlementToken>,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let url = format!("{}/Client/{operation}", self.base_url);
        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token.expose());
        }

        tracing::debug!(operation, "backend request");
        let resp = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("{operation}: {e}")))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("{operation}: read body: {e}")))?;

        parse_envelope(operation, status, &text)
    }

    async fn login_call(
        &self,
        operation: &str,
        kind: ProviderKind,
        body: serde_json::Value,
    ) -> Result<Session, BackendError> {
        let data: LoginData = self.call(operation, None, body).await?;
        if data.session_ticket.is_empty() {
            return Err(BackendError::MalformedResponse(format!(
                "{operation}: empty session ticket"
            )));
        }
        Ok(
            Session::new(data.play_fab_id, EntitlementToken::new(data.session_ticket), kind)
                .with_newly_created(data.newly_created),
        )
    }
}

/// Decode a response body into the envelope's `data`, mapping error envelopes.
fn parse_envelope<T: DeserializeOwned>(
    operation: &str,
    http_status: u16,
    body: &str,
) -> Result<T, BackendError> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        if http_status >= 400 {
            BackendError::Rejected {
                code: http_status,
                message: format!("{operation}: {}", truncate(body, 200)),
            }
        } else {
            BackendError::MalformedResponse(format!("{operation}: {e}"))
        }
    })?;

    if envelope.error.is_some() || envelope.code >= 400 || http_status >= 400 {
        let message = envelope
            .error_message
            .or(envelope.error)
            .unwrap_or(envelope.status);
        return Err(BackendError::Rejected {
            code: envelope.code.max(http_status),
            message,
        });
    }

    envelope
        .data
        .ok_or_else(|| BackendError::MalformedResponse(format!("{operation}: missing data")))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn to_snapshot(data: InventoryData) -> Result<InventorySnapshot, BackendError> {
    let mut currencies = BTreeMap::new();
    for (code, balance) in data.virtual_currency {
        let balance = u64::try_from(balance).map_err(|_| {
            BackendError::MalformedResponse(format!("negative balance {balance} for {code}"))
        })?;
        currencies.insert(code, balance);
    }
    let owned_items: BTreeSet<String> = data.inventory.into_iter().map(|i| i.item_id).collect();
    Ok(InventorySnapshot::new(currencies, owned_items))
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn login(
        &self,
        credential: &ProviderCredential,
        create_account: bool,
    ) -> Result<Session, BackendError> {
        let title = &self.title_id;
        match credential {
            ProviderCredential::SocialToken { token } => {
                self.login_call(
                    "LoginWithFacebook",
                    ProviderKind::SocialToken,
                    serde_json::json!({
                        "TitleId": title,
                        "AccessToken": token,
                        "CreateAccount": create_account,
                    }),
                )
                .await
            }
            ProviderCredential::PlatformAccount { server_auth_code } => {
                self.login_call(
                    "LoginWithGoogleAccount",
                    ProviderKind::PlatformAccount,
                    serde_json::json!({
                        "TitleId": title,
                        "ServerAuthCode": server_auth_code,
                        "CreateAccount": create_account,
                    }),
                )
                .await
            }
            ProviderCredential::Device { device_id } => {
                self.login_call(
                    "LoginWithCustomID",
                    ProviderKind::Device,
                    serde_json::json!({
                        "TitleId": title,
                        "CustomId": device_id,
                        "CreateAccount": create_account,
                    }),
                )
                .await
            }
            ProviderCredential::Password { username, password } => {
                self.login_with_password(username, password).await
            }
        }
    }

    async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        self.login_call(
            "LoginWithPlayFab",
            ProviderKind::Password,
            serde_json::json!({
                "TitleId": self.title_id,
                "Username": username,
                "Password": password,
            }),
        )
        .await
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<Session, BackendError> {
        let mut body = serde_json::json!({
            "TitleId": self.title_id,
            "Username": username,
            "Password": password,
            "RequireBothUsernameAndEmail": false,
        });
        if let Some(email) = email {
            body["Email"] = serde_json::Value::from(email);
        }
        let session = self
            .login_call("RegisterPlayFabUser", ProviderKind::Password, body)
            .await?;
        Ok(session.with_newly_created(true))
    }

    async fn validate_google_play_purchase(
        &self,
        session: &Session,
        request: &GooglePlayValidation,
    ) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .call(
                "ValidateGooglePlayPurchase",
                Some(&session.entitlement_token),
                serde_json::json!({
                    "CurrencyCode": request.currency_code,
                    "PurchasePrice": request.purchase_price,
                    "ReceiptJson": request.receipt_json,
                    "Signature": request.signature,
                }),
            )
            .await?;
        Ok(())
    }

    async fn validate_app_store_purchase(
        &self,
        session: &Session,
        request: &AppStoreValidation,
    ) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .call(
                "ValidateIOSReceipt",
                Some(&session.entitlement_token),
                serde_json::json!({
                    "CurrencyCode": request.currency_code,
                    "PurchasePrice": request.purchase_price,
                    "ReceiptData": request.receipt_data,
                }),
            )
            .await?;
        Ok(())
    }

    async fn get_inventory(&self, session: &Session) -> Result<InventorySnapshot, BackendError> {
        let data: InventoryData = self
            .call(
                "GetUserInventory",
                Some(&session.entitlement_token),
                serde_json::json!({}),
            )
            .await?;
        to_snapshot(data)
    }

    async fn credit_currency(
        &self,
        session: &Session,
        code: &str,
        amount: u32,
    ) -> Result<u64, BackendError> {
        let data: CurrencyData = self
            .call(
                "AddUserVirtualCurrency",
                Some(&session.entitlement_token),
                serde_json::json!({ "VirtualCurrency": code, "Amount": amount }),
            )
            .await?;
        u64::try_from(data.balance).map_err(|_| {
            BackendError::MalformedResponse(format!("negative balance {} for {code}", data.balance))
        })
    }

    async fn execute_function(
        &self,
        session: &Session,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let data: FunctionData = self
            .call(
                "ExecuteCloudScript",
                Some(&session.entitlement_token),
                serde_json::json!({ "FunctionName": name, "FunctionParameter": args }),
            )
            .await?;
        if let Some(error) = data.error {
            let message = if error.message.is_empty() {
                error.error
            } else {
                error.message
            };
            return Err(BackendError::FunctionFailed {
                function: name.to_string(),
                message,
            });
        }
        Ok(data.function_result)
    }
}
