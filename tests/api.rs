use std::sync::Arc;

use abrental_web::{
    app, cache::SessionCache, db::MemoryStore, payments::Payments, pricing::QuoteBuilder,
    seed_default_catalog, AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    seed_default_catalog(store.as_ref()).await.unwrap();
    app(AppState {
        store,
        sessions: SessionCache::default(),
        pricing: Arc::new(QuoteBuilder::default()),
        payments: Payments::sandbox(),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, email: &str, country: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "correct horse",
            "name": "Test Guest",
            "country": country,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

fn ids(listings: &Value) -> Vec<String> {
    listings
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["listings"], 10);
    assert_eq!(body["countries"], 6);
}

#[tokio::test]
async fn test_listings_priced_in_viewer_currency() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/listings/1?country=NG", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "289");
    assert_eq!(body["display_price"]["amount"], 456_620);
    assert_eq!(body["display_price"]["symbol"], "₦");

    // Unknown display country falls back to USD
    let (_, body) = send(&app, Method::GET, "/api/listings/1?country=FR", None, None).await;
    assert_eq!(body["display_price"]["amount"], 289);
    assert_eq!(body["display_price"]["currency_code"], "USD");

    let (status, _) = send(&app, Method::GET, "/api/listings/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_on_usd_price() {
    let app = test_app().await;

    // Browsing in NGN does not change which listings match a USD range
    let filter = json!({ "max_price": "200" });
    let uri = "/api/listings/search?country=NG";
    let (status, ngn) = send(&app, Method::POST, uri, None, Some(filter.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, usd) = send(&app, Method::POST, "/api/listings/search", None, Some(filter)).await;

    assert_eq!(ids(&ngn), vec!["5", "7", "10"]);
    assert_eq!(ids(&ngn), ids(&usd));

    let filter = json!({ "country": "US", "guests": 8, "amenities": ["Pool"] });
    let (_, body) = send(&app, Method::POST, "/api/listings/search", None, Some(filter)).await;
    assert_eq!(ids(&body), vec!["2", "4"]);
}

#[tokio::test]
async fn test_explore_sections() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/listings/explore", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["budget"]), vec!["10", "7", "5", "9", "1"]);
    assert_eq!(ids(&body["luxury"]), vec!["4", "2", "6", "8", "3"]);
}

#[tokio::test]
async fn test_pricing_quote_endpoint() {
    let app = test_app().await;
    let (status, quote) = send(
        &app,
        Method::POST,
        "/api/pricing/quote",
        None,
        Some(json!({ "nightly_price_usd": "200", "nights": 2, "guest_country": "NG" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["subtotal_usd"], "400");
    assert_eq!(quote["display_currency"], "NGN");
    assert_eq!(quote["display_total"]["amount"], 707_840);
    assert_eq!(quote["gateway"], "Paystack");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pricing/quote",
        None,
        Some(json!({ "nightly_price_usd": "200", "nights": -1, "guest_country": "NG" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_quote_converts_components_independently() {
    let app = test_app().await;
    let (status, quote) = send(
        &app,
        Method::GET,
        "/api/listings/1/quote?check_in=2026-03-10&check_out=2026-03-13&country=GB",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["nights"], 3);
    assert_eq!(quote["display_subtotal"]["amount"], 685);
    assert_eq!(quote["display_service_fee"]["amount"], 82);
    assert_eq!(quote["display_total"]["amount"], 767);
    assert_eq!(quote["gateway"], "Stripe");
}

#[tokio::test]
async fn test_convert_and_gateway_endpoints() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pricing/convert",
        None,
        Some(json!({ "amount_usd": "100", "country": "GB" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "amount": 79, "currency_code": "GBP", "symbol": "£" }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pricing/convert",
        None,
        Some(json!({ "amount_usd": "100", "country": "FR" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, "/api/pricing/gateway/ke", None, None).await;
    assert_eq!(body, json!({ "country_code": "KE", "gateway": "Paystack" }));
    let (_, body) = send(&app, Method::GET, "/api/pricing/gateway/FR", None, None).await;
    assert_eq!(body["gateway"], "Stripe");

    let (_, body) = send(&app, Method::GET, "/api/pricing/countries", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[2]["code"], "NG");
    assert_eq!(body[2]["symbol"], "₦");
    assert_eq!(body[2]["gateway"], "Paystack");
}

#[tokio::test]
async fn test_favorites_require_session() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::GET, "/api/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, "/api/favorites", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = sign_up(&app, "fav@example.com", "US").await;
    send(&app, Method::POST, "/api/favorites/1", Some(&token), None).await;
    let (_, body) = send(&app, Method::POST, "/api/favorites/7", Some(&token), None).await;
    assert_eq!(body["favorites"], json!(["1", "7"]));

    let (_, body) = send(&app, Method::DELETE, "/api/favorites/1", Some(&token), None).await;
    assert_eq!(body["favorites"], json!(["7"]));

    let (status, _) = send(&app, Method::POST, "/api/favorites/missing", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sign_out_revokes_session() {
    let app = test_app().await;
    let token = sign_up(&app, "out@example.com", "GB").await;

    let (status, profile) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["country_code"], "GB");

    let (status, _) = send(&app, Method::POST, "/api/auth/signout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "out@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_paystack_checkout_flow() {
    let app = test_app().await;
    let token = sign_up(&app, "ada@example.com", "NG").await;

    // 180 USD x 2 nights = 360, fee 43.2, total 403.2 -> 637056 NGN
    let (status, booking) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&token),
        Some(json!({
            "listing_id": "7",
            "check_in": "2026-06-01",
            "check_out": "2026-06-03",
            "guests": 2,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["nights"], 2);
    assert_eq!(booking["currency_code"], "NGN");
    assert_eq!(booking["display_total"], 637_056);
    assert_eq!(booking["gateway"], "Paystack");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, init) = send(
        &app,
        Method::POST,
        "/api/payments/initialize",
        Some(&token),
        Some(json!({ "booking_id": booking_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(init["gateway"], "Paystack");
    assert_eq!(init["amount_minor"], 63_705_600);
    assert_eq!(init["currency"], "NGN");
    assert!(init["authorization_url"].is_string());
    let reference = init["reference"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/payments/verify",
        Some(&token),
        Some(json!({ "booking_id": booking_id, "reference": "ps_wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, confirmed) = send(
        &app,
        Method::POST,
        "/api/payments/verify",
        Some(&token),
        Some(json!({ "booking_id": booking_id, "reference": reference })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    // Paid bookings can be neither paid again nor cancelled
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/payments/initialize",
        Some(&token),
        Some(json!({ "booking_id": booking_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let uri = format!("/api/bookings/{}/cancel", booking_id);
    let (status, _) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::GET, "/api/bookings", Some(&token), None).await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stripe_booking_and_cancel() {
    let app = test_app().await;
    let token = sign_up(&app, "sam@example.com", "US").await;

    let (status, booking) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&token),
        Some(json!({ "listing_id": "10", "check_in": "2026-06-01", "check_out": "2026-06-04" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 89 x 3 = 267, fee 32.04, total 299.04
    assert_eq!(booking["display_total"], 299);
    assert_eq!(booking["gateway"], "Stripe");

    let uri = format!("/api/bookings/{}/cancel", booking["id"].as_str().unwrap());
    let (status, cancelled) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
}

#[tokio::test]
async fn test_booking_validation() {
    let app = test_app().await;
    let token = sign_up(&app, "val@example.com", "US").await;

    let same_day =
        json!({ "listing_id": "1", "check_in": "2026-06-01", "check_out": "2026-06-01" });
    let (status, _) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(same_day)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reversed =
        json!({ "listing_id": "1", "check_in": "2026-06-05", "check_out": "2026-06-01" });
    let (status, _) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(reversed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let crowded = json!({
        "listing_id": "5",
        "check_in": "2026-06-01",
        "check_out": "2026-06-02",
        "guests": 3,
    });
    let (status, _) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(crowded)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quote_accepts_numeric_prices() {
    let app = test_app().await;
    let (status, quote) = send(
        &app,
        Method::POST,
        "/api/pricing/quote",
        None,
        Some(json!({ "nightly_price_usd": 200, "nights": 2, "guest_country": "NG" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["display_total"]["amount"], 707_840);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pricing/convert",
        None,
        Some(json!({ "amount_usd": 100, "country": "GB" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 79);
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = test_app().await;

    // Largest representable price; two nights overflow
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/pricing/quote",
        None,
        Some(json!({ "nightly_price_usd": "79228162514264337593543950335", "nights": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pricing/convert",
        None,
        Some(json!({ "amount_usd": "100000000000000000000", "country": "US" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancelled_booking_stays_cancelled_after_payment() {
    let app = test_app().await;
    let token = sign_up(&app, "late@example.com", "GH").await;

    let (_, booking) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&token),
        Some(json!({ "listing_id": "9", "check_in": "2026-07-01", "check_out": "2026-07-02" })),
    )
    .await;
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (_, init) = send(
        &app,
        Method::POST,
        "/api/payments/initialize",
        Some(&token),
        Some(json!({ "booking_id": booking_id })),
    )
    .await;
    let reference = init["reference"].as_str().unwrap().to_string();

    let uri = format!("/api/bookings/{}/cancel", booking_id);
    let (status, _) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/payments/verify",
        Some(&token),
        Some(json!({ "booking_id": booking_id, "reference": reference })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::GET, "/api/bookings", Some(&token), None).await;
    assert_eq!(body["bookings"][0]["status"], "cancelled");
}
