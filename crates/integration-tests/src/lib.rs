//! Integration tests for the Royal Florist storefront client.
//!
//! The tests drive a real [`Storefront`] over HTTP against [`MockShop`], an
//! in-process axum server that imitates the shop and account services:
//! accounts, one-time codes, bearer tokens, catalog, carts, wishlists and the
//! payment gateway's order and signature checks.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p royal-florist-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `otp_flows` - Registration, code sign-in and password reset
//! - `shopping` - Catalog, cart, wishlist and profile
//! - `checkout` - Payment order, collection and verification
//! - `session_persistence` - Sessions surviving a restart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use royal_florist_storefront::notify::Notifier;
use royal_florist_storefront::session::Storage;
use royal_florist_storefront::{Storefront, StorefrontConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// The code the mock sends for every OTP request.
pub const OTP: &str = "123456";

/// Public key returned with every payment order.
pub const KEY_ID: &str = "rzp_test_mock";

/// Seeded catalog: `(id, name, price, category)`.
pub const PRODUCTS: [(&str, &str, u64, &str); 3] = [
    ("p-red-roses", "Red Roses", 499, "c-roses"),
    ("p-white-roses", "White Roses", 650, "c-roses"),
    ("p-lily-basket", "Lily Basket", 799, "c-lilies"),
];

/// Seeded categories: `(id, name)`.
pub const CATEGORIES: [(&str, &str); 2] = [("c-roses", "Roses"), ("c-lilies", "Lilies")];

type Reply = (StatusCode, Json<Value>);
type Shared = Arc<Mutex<ShopState>>;

/// A registered customer.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "address": self.address,
        })
    }
}

#[derive(Debug, Default)]
struct ShopState {
    accounts: HashMap<String, Account>,
    pending_names: HashMap<String, String>,
    otps: HashMap<String, String>,
    verified: HashSet<String>,
    tokens: HashMap<String, String>,
    carts: HashMap<String, Vec<(String, u32)>>,
    wishlists: HashMap<String, Vec<String>>,
    orders: HashMap<String, u64>,
    last_order: Option<Value>,
    paid: Vec<String>,
    calls: HashMap<String, usize>,
}

impl ShopState {
    fn product(id: &str) -> Option<(&'static str, &'static str, u64, &'static str)> {
        PRODUCTS.iter().copied().find(|(pid, ..)| *pid == id)
    }

    fn issue_token(&mut self, email: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), email.to_string());
        token
    }

    fn grant(&mut self, email: &str) -> Result<Json<Value>, Reply> {
        let user = self
            .accounts
            .get(email)
            .map(Account::to_json)
            .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
        let token = self.issue_token(email);
        Ok(Json(json!({ "token": token, "user": user })))
    }

    fn check_otp(&mut self, body: &Value) -> Result<String, Reply> {
        let email = field(body, "email");
        if self.otps.get(email).map(String::as_str) != Some(field(body, "otp")) {
            return Err(reject(StatusCode::BAD_REQUEST, "Invalid OTP"));
        }
        self.otps.remove(email);
        Ok(email.to_string())
    }

    fn bearer(&self, headers: &HeaderMap) -> Result<String, Reply> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token))
            .cloned()
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }

    fn cart_total(&self, email: &str) -> u64 {
        self.carts
            .get(email)
            .into_iter()
            .flatten()
            .filter_map(|(id, qty)| Self::product(id).map(|(_, _, price, _)| price * u64::from(*qty)))
            .sum()
    }

    fn cart_json(&self, email: &str) -> Value {
        let items: Vec<Value> = self
            .carts
            .get(email)
            .into_iter()
            .flatten()
            .filter_map(|(id, qty)| {
                let (pid, name, price, _) = Self::product(id)?;
                Some(json!({
                    "productId": pid,
                    "productName": name,
                    "image": format!("/img/{pid}.png"),
                    "unitPrice": price,
                    "quantity": qty,
                    "itemTotal": price * u64::from(*qty),
                }))
            })
            .collect();
        json!({ "items": items, "totalPrice": self.cart_total(email) })
    }

    fn wishlist_json(&self, email: &str) -> Value {
        let items: Vec<Value> = self
            .wishlists
            .get(email)
            .into_iter()
            .flatten()
            .filter_map(|id| {
                let (pid, name, price, _) = Self::product(id)?;
                Some(json!({ "productId": pid, "name": name, "price": price }))
            })
            .collect();
        Value::Array(items)
    }
}

/// In-process stand-in for the florist shop API.
pub struct MockShop {
    base: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockShop {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns the bind error if no local port is available.
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let base = Url::parse(&format!("http://{addr}/"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base,
            state,
            server,
        })
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Client configuration pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if the auth base cannot be derived.
    pub fn config(&self) -> Result<StorefrontConfig, Box<dyn std::error::Error>> {
        Ok(StorefrontConfig::new(self.base.clone())?)
    }

    /// A storefront talking to this server.
    ///
    /// # Errors
    ///
    /// Returns the configuration or storefront error.
    pub fn connect(
        &self,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Storefront, Box<dyn std::error::Error>> {
        Ok(Storefront::with_storage(self.config()?, storage, notifier)?)
    }

    /// Create an account directly, skipping the registration flow.
    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                id: uuid::Uuid::new_v4().simple().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone: None,
                address: None,
            },
        );
    }

    #[must_use]
    pub fn account(&self, email: &str) -> Option<Account> {
        self.lock().accounts.get(email).cloned()
    }

    /// How often `"METHOD /path"` was called.
    #[must_use]
    pub fn calls(&self, route: &str) -> usize {
        self.lock().calls.get(route).copied().unwrap_or_default()
    }

    /// Total number of requests served.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Quantities in the server cart of `email`.
    #[must_use]
    pub fn cart_lines(&self, email: &str) -> Vec<(String, u32)> {
        self.lock().carts.get(email).cloned().unwrap_or_default()
    }

    /// The body of the most recent create-order call.
    #[must_use]
    pub fn last_order(&self) -> Option<Value> {
        self.lock().last_order.clone()
    }

    /// Orders whose payment was verified.
    #[must_use]
    pub fn paid_orders(&self) -> Vec<String> {
        self.lock().paid.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ShopState> {
        lock(&self.state)
    }
}

impl Drop for MockShop {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The signature the gateway would produce for an authorized payment.
#[must_use]
pub fn signature(order_id: &str, payment_id: &str) -> String {
    format!("sig:{order_id}|{payment_id}")
}

fn lock(state: &Shared) -> MutexGuard<'_, ShopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reject(status: StatusCode, msg: &str) -> Reply {
    (status, Json(json!({ "msg": msg })))
}

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/register/verify-otp", post(register_verify))
        .route("/api/auth/register/set-password", post(register_set_password))
        .route("/api/auth/login", post(login))
        .route("/api/auth/auth/login/send-otp", post(send_otp))
        .route("/api/auth/auth/login/verify-otp", post(login_verify))
        .route("/api/auth/forgot/send-otp", post(send_otp))
        .route("/api/auth/forgot/verify-otp", post(forgot_verify))
        .route("/api/auth/forgot/reset-password", post(reset_password))
        .route("/api/auth/profile", get(profile))
        .route("/api/profile/me", put(update_profile))
        .route("/api/categories/getCategories", get(categories))
        .route("/api/products/getProducts", get(products))
        .route("/api/cart/me", get(cart))
        .route("/api/cart/add", post(cart_add))
        .route("/api/cart/update", post(cart_update))
        .route("/api/cart/remove", post(cart_remove))
        .route("/api/wishlist", get(wishlist))
        .route("/api/wishlist/add", post(wishlist_add))
        .route("/api/wishlist/remove/{id}", delete(wishlist_remove))
        .route("/api/payments/razorpay/create-order", post(create_order))
        .route("/api/payments/razorpay/verify", post(verify_payment))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), count_calls))
        .with_state(state)
}

async fn count_calls(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    *lock(&state).calls.entry(route).or_default() += 1;
    next.run(request).await
}

// =============================================================================
// Account service
// =============================================================================

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = field(&body, "email").to_string();
    if shop.accounts.contains_key(&email) {
        return Err(reject(StatusCode::CONFLICT, "User already exists"));
    }
    shop.pending_names
        .insert(email.clone(), field(&body, "name").to_string());
    shop.otps.insert(email, OTP.to_string());
    Ok(Json(json!({ "msg": "OTP sent to your email" })))
}

async fn register_verify(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.check_otp(&body)?;
    shop.verified.insert(email);
    Ok(Json(json!({ "msg": "OTP verified" })))
}

async fn register_set_password(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = field(&body, "email").to_string();
    if !shop.verified.remove(&email) {
        return Err(reject(StatusCode::BAD_REQUEST, "OTP not verified"));
    }
    let name = shop.pending_names.remove(&email).unwrap_or_default();
    shop.accounts.insert(
        email.clone(),
        Account {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name,
            email,
            password: field(&body, "newPassword").to_string(),
            phone: None,
            address: None,
        },
    );
    Ok(Json(json!({ "msg": "Registration completed" })))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = field(&body, "email");
    let matches = shop
        .accounts
        .get(email)
        .is_some_and(|account| account.password == field(&body, "password"));
    if !matches {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    shop.grant(email)
}

async fn send_otp(State(state): State<Shared>, Json(body): Json<Value>) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = field(&body, "email").to_string();
    if !shop.accounts.contains_key(&email) {
        return Err(reject(StatusCode::NOT_FOUND, "User not found"));
    }
    shop.otps.insert(email, OTP.to_string());
    Ok(Json(json!({ "msg": "OTP sent" })))
}

async fn login_verify(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.check_otp(&body)?;
    shop.grant(&email)
}

async fn forgot_verify(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.check_otp(&body)?;
    shop.verified.insert(email);
    Ok(Json(json!({})))
}

async fn reset_password(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = field(&body, "email").to_string();
    if !shop.verified.remove(&email) {
        return Err(reject(StatusCode::BAD_REQUEST, "OTP not verified"));
    }
    let password = field(&body, "newPassword").to_string();
    if let Some(account) = shop.accounts.get_mut(&email) {
        account.password = password;
    }
    Ok(Json(json!({ "msg": "Password reset successful" })))
}

// =============================================================================
// Shop service
// =============================================================================

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Reply> {
    let shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let user = shop.accounts.get(&email).map(Account::to_json);
    Ok(Json(json!({ "user": user })))
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let account = shop
        .accounts
        .get_mut(&email)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    account.phone = Some(field(&body, "phone").to_string());
    account.address = body.get("address").cloned();
    Ok(Json(json!({ "msg": "Profile updated", "user": account.to_json() })))
}

async fn categories() -> Json<Value> {
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|(id, name)| json!({ "_id": id, "name": name, "icon": format!("/icons/{id}.svg") }))
        .collect();
    Json(json!({ "categories": categories }))
}

async fn products() -> Json<Value> {
    let products: Vec<Value> = PRODUCTS
        .iter()
        .map(|(id, name, price, category)| {
            json!({ "_id": id, "name": name, "price": price, "category": category })
        })
        .collect();
    Json(Value::Array(products))
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Reply> {
    let shop = lock(&state);
    let email = shop.bearer(&headers)?;
    if shop.carts.get(&email).is_none_or(Vec::is_empty) {
        return Ok(Json(json!({ "cart": null })));
    }
    Ok(Json(json!({ "cart": shop.cart_json(&email) })))
}

async fn cart_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let id = field(&body, "productId");
    if ShopState::product(id).is_none() {
        return Err(reject(StatusCode::NOT_FOUND, "Product not found"));
    }
    let lines = shop.carts.entry(email.clone()).or_default();
    match lines.iter_mut().find(|(pid, _)| pid == id) {
        Some((_, qty)) => *qty += 1,
        None => lines.push((id.to_string(), 1)),
    }
    Ok(Json(json!({ "msg": "Item added to cart", "cart": shop.cart_json(&email) })))
}

async fn cart_update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let id = field(&body, "productId");
    let action = field(&body, "action");
    let lines = shop.carts.entry(email.clone()).or_default();
    let Some((_, qty)) = lines.iter_mut().find(|(pid, _)| pid == id) else {
        return Err(reject(StatusCode::NOT_FOUND, "Item not in cart"));
    };
    match action {
        "inc" => *qty += 1,
        "dec" => *qty -= 1,
        _ => return Err(reject(StatusCode::BAD_REQUEST, "Invalid action")),
    }
    lines.retain(|(_, qty)| *qty > 0);
    Ok(Json(json!({ "cart": shop.cart_json(&email) })))
}

async fn cart_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let id = field(&body, "productId");
    shop.carts
        .entry(email.clone())
        .or_default()
        .retain(|(pid, _)| pid != id);
    Ok(Json(json!({ "cart": shop.cart_json(&email) })))
}

async fn wishlist(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Reply> {
    let shop = lock(&state);
    let email = shop.bearer(&headers)?;
    Ok(Json(json!({ "items": shop.wishlist_json(&email) })))
}

async fn wishlist_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let id = field(&body, "productId").to_string();
    if ShopState::product(&id).is_none() {
        return Err(reject(StatusCode::NOT_FOUND, "Product not found"));
    }
    let list = shop.wishlists.entry(email.clone()).or_default();
    if !list.contains(&id) {
        list.push(id);
    }
    Ok(Json(json!({ "msg": "Added", "items": shop.wishlist_json(&email) })))
}

async fn wishlist_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    shop.wishlists
        .entry(email.clone())
        .or_default()
        .retain(|pid| *pid != id);
    Ok(Json(json!({ "msg": "Removed", "items": shop.wishlist_json(&email) })))
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let total = shop.cart_total(&email);
    if total == 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "Cart is empty"));
    }
    #[allow(clippy::cast_precision_loss)]
    let expected = total as f64;
    let sent = body.get("totalAmount").and_then(Value::as_f64);
    if sent.is_none_or(|amount| (amount - expected).abs() > f64::EPSILON) {
        return Err(reject(StatusCode::BAD_REQUEST, "Amount mismatch"));
    }

    let order_id = format!("order_{}", shop.orders.len() + 1);
    shop.orders.insert(order_id.clone(), total);
    shop.last_order = Some(body);
    Ok(Json(json!({
        "orderId": order_id,
        "keyId": KEY_ID,
        "totalAmount": total,
        "currency": "INR",
    })))
}

async fn verify_payment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    let mut shop = lock(&state);
    let email = shop.bearer(&headers)?;
    let order_id = field(&body, "razorpay_order_id");
    let payment_id = field(&body, "razorpay_payment_id");
    let valid = shop.orders.contains_key(order_id)
        && field(&body, "razorpay_signature") == signature(order_id, payment_id);
    if !valid {
        return Err(reject(StatusCode::BAD_REQUEST, "Invalid payment signature"));
    }

    shop.paid.push(order_id.to_string());
    shop.carts.remove(&email);
    Ok(Json(json!({ "msg": "Payment verified" })))
}
