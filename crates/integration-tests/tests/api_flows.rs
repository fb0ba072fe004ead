//! End-to-end flows against a real database.
//!
//! Skipped unless `GM_TEST_DATABASE_URL` points at a scratch database.

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sqlx::PgPool;

use giftmart_admin::db::{AdminUserRepository, SellerRepository};
use giftmart_admin::services::auth::hash_password;
use giftmart_core::{AdminRole, Email, SellerId};
use giftmart_integration_tests::{
    body_json, database_app, empty_request, json_request, send, session_cookie,
};

const PASSWORD: &str = "jasmine-garland-2026";

fn stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Money fields serialize as strings.
fn amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn seed_seller(pool: &PgPool, commission_rate: Option<Decimal>) -> i32 {
    let stamp = stamp();
    sqlx::query_scalar(
        r"INSERT INTO market.seller (name, email, store_name, is_approved, commission_rate)
          VALUES ('Meera Iyer', $1, $2, TRUE, $3)
          RETURNING id",
    )
    .bind(format!("seller-{stamp}@giftmart.test"))
    .bind(format!("Diya House {stamp}"))
    .bind(commission_rate)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_customer(pool: &PgPool) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO market.customer (name, email) VALUES ('Arjun Rao', $1) RETURNING id",
    )
    .bind(format!("customer-{}@giftmart.test", stamp()))
    .fetch_one(pool)
    .await
    .unwrap()
}

/// One order with a single line item sold by `seller_id`.
async fn seed_order(
    pool: &PgPool,
    customer_id: i32,
    seller_id: i32,
    status: &str,
    total: Decimal,
    delivered_at: Option<DateTime<Utc>>,
    payment_id: Option<&str>,
) -> i32 {
    let order_id: i32 = sqlx::query_scalar(
        r"INSERT INTO market.customer_order
              (customer_id, total_amount, status, payment_id, delivered_at)
          VALUES ($1, $2, $3::market.order_status, $4, $5)
          RETURNING id",
    )
    .bind(customer_id)
    .bind(total)
    .bind(status)
    .bind(payment_id)
    .bind(delivered_at)
    .fetch_one(pool)
    .await
    .unwrap();
    sqlx::query(
        r"INSERT INTO market.order_item (order_id, seller_id, product_name, quantity, unit_price)
          VALUES ($1, $2, 'Silk rakhi hamper', 1, $3)",
    )
    .bind(order_id)
    .bind(seller_id)
    .bind(total)
    .execute(pool)
    .await
    .unwrap();
    order_id
}

/// Create an admin with a unique email and log in; returns the cookie.
async fn login_as(app: &axum::Router, pool: &sqlx::PgPool, role: AdminRole) -> String {
    let email = Email::parse(&format!("flow-{}@giftmart.test", stamp())).unwrap();
    AdminUserRepository::new(pool)
        .create(&email, "Flow Tester", role, &hash_password(PASSWORD).unwrap())
        .await
        .unwrap();

    let response = send(
        app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            &json!({ "email": email.as_str(), "password": PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).unwrap()
}

#[tokio::test]
async fn test_login_and_read_dashboard() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(&app, empty_request("GET", "/api/admin/auth/me", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "admin");

    let response = send(
        &app,
        empty_request("GET", "/api/admin/dashboard/stats", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert!(stats["totalOrders"].is_number());
    assert!(stats["monthlyRevenue"].is_array());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let _ = login_as(&app, &pool, AdminRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            &json!({ "email": "nobody@giftmart.test", "password": "wrong-password-1" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/admin/categories",
            &json!({ "name": "Hampers" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, empty_request("GET", "/api/admin/categories", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_category_validation_and_create() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/admin/categories",
            &json!({ "name": "Hampers", "commissionRate": 140 }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "commissionRate must be between 0 and 100"
    );

    let stamp = stamp();
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/admin/categories",
            &json!({ "name": format!("Hampers {stamp}"), "commissionRate": 12.5 }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["category"]["name"], format!("Hampers {stamp}"));
}

#[tokio::test]
async fn test_missing_ticket_is_not_found() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(
        &app,
        empty_request("GET", "/api/support/tickets/2147483000", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_settings_default_on_first_read() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(&app, empty_request("GET", "/api/settings/site", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let site = body_json(response).await;
    assert_eq!(site["currency"], "INR");

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/settings/tax",
            &json!({
                "taxRates": [{ "name": "GST", "rate": 180, "category": "all", "isDefault": true }]
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Seller money
// =============================================================================

#[tokio::test]
async fn test_ledger_hold_window_boundary() {
    let Some((_app, pool)) = database_app().await else {
        return;
    };
    let seller = seed_seller(&pool, None).await;
    let customer = seed_customer(&pool).await;
    let delivered_at: DateTime<Utc> = "2026-01-10T06:30:00Z".parse().unwrap();
    seed_order(
        &pool,
        customer,
        seller,
        "delivered",
        Decimal::from(250),
        Some(delivered_at),
        Some("pay_hold_1"),
    )
    .await;

    let repo = SellerRepository::new(&pool);
    let at_cutoff = repo
        .ledger_totals(SellerId::new(seller), delivered_at)
        .await
        .unwrap();
    assert_eq!(at_cutoff.released_gross, Decimal::ZERO);
    assert_eq!(at_cutoff.held_gross, Decimal::from(250));

    let after_cutoff = repo
        .ledger_totals(SellerId::new(seller), delivered_at + Duration::microseconds(1))
        .await
        .unwrap();
    assert_eq!(after_cutoff.released_gross, Decimal::from(250));
    assert_eq!(after_cutoff.held_gross, Decimal::ZERO);
}

#[tokio::test]
async fn test_payout_request_and_processing() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;
    let seller = seed_seller(&pool, Some(Decimal::TEN)).await;
    let customer = seed_customer(&pool).await;
    let now = Utc::now();
    seed_order(
        &pool,
        customer,
        seller,
        "delivered",
        Decimal::from(1000),
        Some(now - Duration::days(8)),
        Some("pay_released"),
    )
    .await;
    seed_order(
        &pool,
        customer,
        seller,
        "delivered",
        Decimal::from(500),
        Some(now - Duration::days(2)),
        Some("pay_held"),
    )
    .await;

    let response = send(
        &app,
        empty_request("GET", &format!("/api/admin/sellers/{seller}/ledger"), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ledger = body_json(response).await;
    assert_eq!(amount(&ledger["gross"]), Decimal::from(1000));
    assert_eq!(amount(&ledger["available"]), Decimal::from(900));
    assert_eq!(amount(&ledger["held"]), Decimal::from(450));

    let request = |body: Value| json_request("POST", "/api/admin/finance/payouts", &body, Some(&cookie));

    let response = send(&app, request(json!({ "sellerId": seller, "amount": "0.004" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "amount cannot have more than 2 decimal places"
    );

    let response = send(&app, request(json!({ "sellerId": seller, "amount": 950 }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Amount exceeds available balance"), "{message}");

    let response = send(&app, request(json!({ "sellerId": seller, "amount": 400 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payout_id = body_json(response).await["payout"]["id"].as_i64().unwrap();
    let uri = format!("/api/admin/finance/payouts/{payout_id}");

    let response = send(
        &app,
        json_request("PATCH", &uri, &json!({ "status": "completed" }), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "transactionId is required to complete a payout"
    );

    let response = send(
        &app,
        json_request(
            "PATCH",
            &uri,
            &json!({ "status": "completed", "transactionId": "UTR2026101900042" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["payout"]["status"], "completed");

    let response = send(
        &app,
        json_request("PATCH", &uri, &json!({ "status": "rejected" }), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        empty_request("GET", &format!("/api/admin/sellers/{seller}/ledger"), Some(&cookie)),
    )
    .await;
    let ledger = body_json(response).await;
    assert_eq!(amount(&ledger["paid"]), Decimal::from(400));
    assert_eq!(amount(&ledger["available"]), Decimal::from(500));
}

// =============================================================================
// Orders and stock
// =============================================================================

#[tokio::test]
async fn test_order_status_transitions() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;
    let seller = seed_seller(&pool, None).await;
    let customer = seed_customer(&pool).await;

    let pending = seed_order(&pool, customer, seller, "pending", Decimal::from(799), None, None).await;
    let response = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/admin/orders/{pending}/status"),
            &json!({ "status": "delivered" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Cannot change order status from pending to delivered"
    );

    let unpaid =
        seed_order(&pool, customer, seller, "cancelled", Decimal::from(799), None, None).await;
    let response = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/admin/orders/{unpaid}/status"),
            &json!({ "status": "refunded" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let paid = seed_order(
        &pool,
        customer,
        seller,
        "cancelled",
        Decimal::from(799),
        None,
        Some("pay_refund_1"),
    )
    .await;
    let response = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/admin/orders/{paid}/status"),
            &json!({ "status": "refunded" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bulk_stock_update() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;
    let seller = seed_seller(&pool, None).await;
    let product: i32 = sqlx::query_scalar(
        "INSERT INTO market.product (seller_id, name, price, stock) VALUES ($1, 'Brass diya', 499, 5) RETURNING id",
    )
    .bind(seller)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = send(
        &app,
        json_request("POST", "/api/admin/inventory/bulk", &json!({ "updates": [] }), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "updates must not be empty");

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/admin/inventory/bulk",
            &json!({ "updates": [
                { "productId": product, "stock": 12 },
                { "productId": 2_147_483_000, "stock": 3 }
            ] }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["modifiedCount"], 1);

    let stock: i32 = sqlx::query_scalar("SELECT stock FROM market.product WHERE id = $1")
        .bind(product)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stock, 12);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_records_can_be_deleted() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/notifications/order-alerts",
            &json!({ "alertType": "delivery_delayed", "message": "Courier delayed at Pune hub" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let alert_id = body_json(response).await["alert"]["id"].as_i64().unwrap();
    let uri = format!("/api/notifications/order-alerts/{alert_id}");

    let response = send(&app, empty_request("GET", "/api/notifications", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let hub = body_json(response).await;
    assert!(hub["orderAlerts"].as_array().unwrap().iter().any(|a| a["id"] == alert_id));

    let response = send(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for uri in [
        "/api/notifications/system-updates/2147483000",
        "/api/notifications/vendor-requests/2147483000",
        "/api/notifications/complaints/2147483000",
    ] {
        let response = send(&app, empty_request("DELETE", uri, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_email_settings_mask_and_keep_credentials() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::SuperAdmin).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/settings/email",
            &json!({
                "provider": "smtp",
                "smtp": { "host": "smtp.giftmart.test", "password": "s3cret-smtp-pass" }
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["settings"]["smtp"]["password"], "********");

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/settings/email",
            &json!({
                "provider": "smtp",
                "fromName": "GiftMart",
                "smtp": { "host": "smtp.giftmart.test", "password": "********" }
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored: Option<String> = sqlx::query_scalar(
        "SELECT value -> 'smtp' ->> 'password' FROM market.setting WHERE key = 'email'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored.as_deref(), Some("s3cret-smtp-pass"));

    let response = send(&app, empty_request("GET", "/api/settings", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let overview = body_json(response).await;
    assert_eq!(overview["email"]["smtp"]["password"], "********");
    assert_eq!(overview["email"]["fromName"], "GiftMart");
    assert!(overview["paymentGateways"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_gateway_needs_credentials_to_enable() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::SuperAdmin).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/settings/payment-gateways/paytm",
            &json!({ "isActive": true, "credentials": { "keyId": "", "keySecret": "" } }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/settings/payment-gateways/stripe",
            &json!({
                "isActive": false,
                "credentials": { "keyId": "pk_test_51", "keySecret": "sk_test_51" }
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let gateway = body_json(response).await["gateway"].clone();
    assert_eq!(gateway["credentials"]["keySecret"], "********");
    assert_eq!(gateway["displayName"], "Stripe");
}

#[tokio::test]
async fn test_system_roles_cannot_be_deleted() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::SuperAdmin).await;

    let response = send(&app, empty_request("GET", "/api/settings/roles", Some(&cookie))).await;
    let roles = body_json(response).await;
    let super_admin = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["roleName"] == "Super Admin")
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/settings/roles/{super_admin}"), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Cannot delete system role");

    let name = format!("Packers {}", stamp());
    let body = json!({ "roleName": name, "permissions": { "orders": { "view": true } } });
    let response = send(&app, json_request("POST", "/api/settings/roles", &body, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let role = body_json(response).await["role"].clone();
    assert_eq!(role["permissions"]["orders"]["view"], true);
    assert_eq!(role["permissions"]["orders"]["refund"], false);
    assert_eq!(role["isSystemRole"], false);

    let response = send(&app, json_request("POST", "/api/settings/roles", &body, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let uri = format!("/api/settings/roles/{}", role["id"]);
    let response = send(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_key_secret_shown_once() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::SuperAdmin).await;
    let name = format!("Storefront {}", stamp());

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/settings/api-keys",
            &json!({ "apiName": name, "allowedOrigins": ["https://shop.giftmart.test"] }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["apiSecret"].as_str().unwrap().len(), 64);
    assert!(created["apiKey"]["apiKey"].as_str().unwrap().starts_with("gng_"));
    assert!(created["apiKey"].get("secretHash").is_none());
    let id = created["apiKey"]["id"].as_i64().unwrap();

    let response = send(&app, empty_request("GET", "/api/settings/api-keys", Some(&cookie))).await;
    let keys = body_json(response).await;
    let listed = keys
        .as_array()
        .unwrap()
        .iter()
        .find(|k| k["id"] == id)
        .unwrap();
    assert_eq!(listed["apiName"], name.as_str());
    assert!(listed.get("apiSecret").is_none());

    let response = send(
        &app,
        empty_request("PATCH", &format!("/api/settings/api-keys/{id}/toggle"), Some(&cookie)),
    )
    .await;
    assert_eq!(body_json(response).await["apiKey"]["isActive"], false);

    let uri = format!("/api/settings/api-keys/{id}");
    let response = send(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, empty_request("DELETE", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seller_shipping_settings() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;
    let seller = seed_seller(&pool, None).await;
    let uri = format!("/api/admin/sellers/{seller}/shipping");

    let response = send(&app, empty_request("GET", &uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let defaults = body_json(response).await;
    assert_eq!(amount(&defaults["freeShippingThreshold"]), Decimal::from(500));

    let response = send(
        &app,
        json_request(
            "PUT",
            &uri,
            &json!({ "codSettings": { "minOrderValue": 5000, "maxOrderValue": 1000 } }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(
            "PUT",
            &uri,
            &json!({
                "processingTime": 3,
                "shippingZones": [{ "zoneName": "South", "rate": 49, "deliveryDays": 3 }]
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", &uri, Some(&cookie))).await;
    let saved = body_json(response).await;
    assert_eq!(saved["processingTime"], 3);
    assert_eq!(saved["shippingZones"][0]["zoneName"], "South");

    let response = send(
        &app,
        empty_request("GET", "/api/admin/sellers/2147483000/shipping", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Support content
// =============================================================================

#[tokio::test]
async fn test_vendor_message_reply_thread() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;
    let seller = seed_seller(&pool, None).await;
    let message: i64 = sqlx::query_scalar::<_, i32>(
        r"INSERT INTO market.vendor_message (seller_id, subject, message)
          VALUES ($1, 'Payout delay', 'When will last week''s payout arrive?')
          RETURNING id",
    )
    .bind(seller)
    .fetch_one(&pool)
    .await
    .unwrap()
    .into();

    let response = send(
        &app,
        json_request(
            "POST",
            &format!("/api/support/vendor-messages/{message}/reply"),
            &json!({ "message": "It is being processed today." }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        empty_request("GET", "/api/support/vendor-messages?status=replied", Some(&cookie)),
    )
    .await;
    let threads = body_json(response).await;
    let thread = threads
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == message)
        .unwrap();
    assert_eq!(thread["status"], "replied");
    assert_eq!(thread["replies"][0]["isAdmin"], true);
    assert!(thread["storeName"].as_str().unwrap().starts_with("Diya House"));

    let response = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/support/vendor-messages/{message}/status"),
            &json!({ "status": "closed" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(body_json(response).await["vendorMessage"]["status"], "closed");

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/support/vendor-messages/2147483000/reply",
            &json!({ "message": "Hello" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_templates_stay_on_their_channel() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/support/email-templates",
            &json!({ "name": "Welcome", "body": "Hello {{name}}" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "subject is required");

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/support/sms-templates",
            &json!({ "name": "OTP", "message": "Your GiftMart code is {{otp}}" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let template = body_json(response).await["template"].clone();
    assert_eq!(template["channel"], "sms");
    assert_eq!(template["variables"], json!(["{{otp}}"]));

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/support/email-templates/{}", template["id"]),
            &json!({ "name": "OTP", "subject": "Code", "body": "Code {{otp}}" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        empty_request(
            "DELETE",
            &format!("/api/support/sms-templates/{}", template["id"]),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_help_doc_views_and_system_status() {
    let Some((app, pool)) = database_app().await else {
        return;
    };
    let cookie = login_as(&app, &pool, AdminRole::Admin).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/support/help-docs",
            &json!({
                "title": "Packing fragile gifts",
                "content": "Use double-walled boxes for glassware.",
                "category": "shipping",
                "tags": ["Packing", " packing ", "glass"]
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await["helpDoc"].clone();
    assert_eq!(doc["tags"], json!(["packing", "glass"]));

    let view = format!("/api/support/help-docs/{}/view", doc["id"]);
    send(&app, empty_request("POST", &view, Some(&cookie))).await;
    let response = send(&app, empty_request("POST", &view, Some(&cookie))).await;
    assert_eq!(body_json(response).await["views"], 2);

    let response = send(
        &app,
        json_request(
            "PUT",
            "/api/support/system-status",
            &json!({ "service": "Search", "status": "degraded", "message": "Slow index" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["systemStatus"]["search"], "degraded");

    let response = send(&app, empty_request("GET", "/api/support", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let overview = body_json(response).await;
    assert_eq!(overview["systemStatus"]["api"], "operational");
    assert!(overview["helpDocs"].is_array());
}
