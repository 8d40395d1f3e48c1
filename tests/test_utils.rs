#![allow(dead_code)]

use axum::{extract::Json, http::StatusCode, routing::post, Router};
use intake_server::config::{Config, EmailConfig, Environment, SlackConfig};
use intake_server::context::AppContext;
use intake_server::routes;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const SIGNING_SECRET: &str = "test-signing-secret-0123456789abcdef";
pub const BOOKING_SECRET: &str = "test-booking-shared-secret";
pub const TESTIMONIAL_SECRET: &str = "test-testimonial-shared-secret";

pub struct TestApp {
    pub address: String,
}

/// Mock notification provider endpoint: counts requests, records the last
/// body and answers with a canned response.
pub struct MockProvider {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    pub last_body: Arc<Mutex<Option<Value>>>,
}

impl MockProvider {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Spawns an HTTP endpoint standing in for a delivery provider, answering
/// every POST with the given status and body.
pub async fn spawn_provider(status: StatusCode, body: Value) -> MockProvider {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));

    let app = Router::new().route("/", {
        let hits = hits.clone();
        let last_body = last_body.clone();
        post(move |Json(request): Json<Value>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            *last_body.lock().unwrap() = Some(request);
            (status, axum::Json(body))
        })
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider {
        url: format!("http://{}", addr),
        hits,
        last_body,
    }
}

/// A configuration with every secret set and both channels unconfigured;
/// tests override what they exercise.
pub fn test_config(port: u16) -> Config {
    Config {
        port,
        environment: Environment::Development,
        rust_log: "info".to_string(),
        signing_secret: Some(SIGNING_SECRET.to_string()),
        booking_api_secret: Some(BOOKING_SECRET.to_string()),
        testimonial_api_secret: Some(TESTIMONIAL_SECRET.to_string()),
        notify_api_url: format!("http://127.0.0.1:{}", port),
        email: EmailConfig {
            from: "booking@intake.test".to_string(),
            recipients: vec!["owner@intake.test".to_string()],
            api_url: None,
            api_token: None,
        },
        slack: SlackConfig {
            bot_token: None,
            booking_channel_id: None,
            testimonials_channel_id: None,
            api_url: None,
        },
        log_hash_salt: "test-salt".to_string(),
    }
}

/// Binds an ephemeral port and serves the full router on it.
pub async fn spawn_app(mutate: impl FnOnce(&mut Config)) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = test_config(port);
    mutate(&mut config);

    let app_context = Arc::new(AppContext::new(Arc::new(config)));
    let app = routes::create_router(app_context);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
    }
}

pub fn booking_body() -> Value {
    serde_json::json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "phone": "(555) 123-4567",
        "address": "12 Analytical Way",
        "details": "Refinish the stair treads",
    })
}

pub fn testimonial_body() -> Value {
    serde_json::json!({
        "name": "Grace Hopper",
        "projectDetails": "Deck restoration",
        "dateOfProject": "2024-05-01",
        "location": "",
        "selectedOption": "Outstanding work from start to finish.",
        "additionalComments": "",
        "signature": "Grace Hopper",
        "dateSubmitted": "2024-05-20",
    })
}
