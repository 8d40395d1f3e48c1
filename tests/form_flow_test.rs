// ============================================================================
// Browser Form Flow Tests
// ============================================================================
//
// End-to-end coverage of the browser path: token issuance, the admission
// gate, validation with value echo, and the forward to the notification
// endpoint (which in these tests is the same spawned server).
//
// ============================================================================

use axum::http::StatusCode;
use intake_server::csrf::now_millis;
use serde_json::{json, Value};

mod test_utils;
use test_utils::*;

struct IssuedToken {
    payload: String,
    cookie: String,
    set_cookie: String,
}

/// Fetches a CSRF pair the way a form render would.
async fn fetch_csrf(client: &reqwest::Client, address: &str) -> IssuedToken {
    let response = client
        .get(format!("{}/api/csrf-token", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("csrf-token response must set the signature cookie")
        .to_str()
        .unwrap()
        .to_string();
    let cookie = set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string();

    let body: Value = response.json().await.unwrap();
    IssuedToken {
        payload: body["csrfToken"].as_str().unwrap().to_string(),
        cookie,
        set_cookie,
    }
}

fn booking_form(token: &IssuedToken, form_ts: u64) -> Vec<(&'static str, String)> {
    vec![
        ("firstName", "Ada".to_string()),
        ("lastName", "Lovelace".to_string()),
        ("email", "ada@example.com".to_string()),
        ("phone", "(555) 123-4567".to_string()),
        ("address", "12 Analytical Way".to_string()),
        ("details", "Refinish the stair treads".to_string()),
        ("referrer", String::new()),
        ("form_ts", form_ts.to_string()),
        ("csrf_token", token.payload.clone()),
    ]
}

#[tokio::test]
async fn test_csrf_cookie_attributes() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    assert!(token.cookie.starts_with("csrf_sig="));
    assert!(token.set_cookie.contains("HttpOnly"));
    assert!(token.set_cookie.contains("SameSite=Lax"));
    assert!(token.set_cookie.contains("Path=/"));
    assert!(token.set_cookie.contains("Max-Age=600"));
    // Development mode leaves the cookie usable over plain HTTP
    assert!(!token.set_cookie.contains("Secure"));

    // Payload is "<millis>.<nonce>"
    let ts: u64 = token.payload.split('.').next().unwrap().parse().unwrap();
    assert!(ts <= now_millis());
}

#[tokio::test]
async fn test_degraded_issuance_without_signing_secret() {
    let app = spawn_app(|config| {
        config.signing_secret = None;
    })
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/csrf-token", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().get("set-cookie").is_none());
    let body: Value = response.json().await.unwrap();
    assert!(body["csrfToken"].is_null());
}

#[tokio::test]
async fn test_booking_form_happy_path() {
    let email = spawn_provider(StatusCode::OK, json!({"id": "msg-1"})).await;
    let slack = spawn_provider(StatusCode::OK, json!({"ok": true})).await;

    let app = spawn_app(|config| {
        config.email.api_url = Some(email.url.clone());
        config.slack.bot_token = Some("xoxb-test".to_string());
        config.slack.booking_channel_id = Some("C012345".to_string());
        config.slack.api_url = Some(slack.url.clone());
    })
    .await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    // A render timestamp 4 seconds in the past clears the time trap
    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .header("origin", app.address.trim_start_matches("http://").to_string())
        .form(&booking_form(&token, now_millis() - 4000))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    assert_eq!(email.hit_count(), 1);
    assert_eq!(slack.hit_count(), 1);
}

#[tokio::test]
async fn test_honeypot_rejects_even_with_valid_everything_else() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let mut form = booking_form(&token, now_millis() - 4000);
    for field in form.iter_mut() {
        if field.0 == "referrer" {
            field.1 = "https://spam.example".to_string();
        }
    }

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Please fill out all required fields with valid values."
    );
}

#[tokio::test]
async fn test_too_fast_submission_rejected() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&booking_form(&token, now_millis() - 1000))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_tampered_csrf_token_rejected() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let mut form = booking_form(&token, now_millis() - 4000);
    for field in form.iter_mut() {
        if field.0 == "csrf_token" {
            // Rewrite the timestamp half of the payload
            field.1 = format!("{}.forged", now_millis());
        }
    }

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_mismatched_origin_rejected() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .header("origin", "https://evil.example.net")
        .form(&booking_form(&token, now_millis() - 4000))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_invalid_field_echoes_sanitized_values() {
    let app = spawn_app(|_| {}).await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let mut form = booking_form(&token, now_millis() - 4000);
    for field in form.iter_mut() {
        if field.0 == "email" {
            field.1 = "not-an-email".to_string();
        }
    }

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Please fill out all required fields with valid values."
    );
    // Sanitized values come back so the form can be re-rendered populated;
    // the invalid email is normalized to empty
    assert_eq!(body["values"]["firstName"], "Ada");
    assert_eq!(body["values"]["email"], "");
}

#[tokio::test]
async fn test_forward_failure_maps_to_422() {
    let app = spawn_app(|config| {
        // Nothing listens there
        config.notify_api_url = "http://127.0.0.1:9".to_string();
    })
    .await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&booking_form(&token, now_millis() - 4000))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["values"]["firstName"], "Ada");
}

#[tokio::test]
async fn test_forward_surfaces_partial_dispatch_failure() {
    // Email deliverable, Slack unconfigured: the notify endpoint answers
    // 500 and the browser layer folds that into a 422 mentioning only the
    // chat failure
    let email = spawn_provider(StatusCode::OK, json!({"id": "msg-1"})).await;

    let app = spawn_app(|config| {
        config.email.api_url = Some(email.url.clone());
    })
    .await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let response = client
        .post(format!("{}/forms/booking-request", app.address))
        .header("cookie", &token.cookie)
        .form(&booking_form(&token, now_millis() - 4000))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Slack not configured"));
    assert!(!error.contains("Email HTTP"));

    // The email still went out exactly once
    assert_eq!(email.hit_count(), 1);
}

#[tokio::test]
async fn test_testimonial_form_happy_path() {
    let email = spawn_provider(StatusCode::OK, json!({"id": "msg-1"})).await;
    let slack = spawn_provider(StatusCode::OK, json!({"ok": true})).await;

    let app = spawn_app(|config| {
        config.email.api_url = Some(email.url.clone());
        config.slack.bot_token = Some("xoxb-test".to_string());
        config.slack.testimonials_channel_id = Some("C099999".to_string());
        config.slack.api_url = Some(slack.url.clone());
    })
    .await;
    let client = reqwest::Client::new();

    let token = fetch_csrf(&client, &app.address).await;

    let form = vec![
        ("name", "Grace Hopper".to_string()),
        ("projectDetails", "Deck restoration".to_string()),
        ("dateOfProject", "2024-05-01".to_string()),
        ("location", String::new()),
        (
            "selectedOption",
            "Outstanding work from start to finish.".to_string(),
        ),
        ("additionalComments", String::new()),
        ("signature", "Grace Hopper".to_string()),
        ("dateSubmitted", "2024-05-20".to_string()),
        ("referrer", String::new()),
        ("form_ts", (now_millis() - 4000).to_string()),
        ("csrf_token", token.payload.clone()),
    ];

    let response = client
        .post(format!("{}/forms/testimonial", app.address))
        .header("cookie", &token.cookie)
        .form(&form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(email.hit_count(), 1);
    assert_eq!(slack.hit_count(), 1);
}
