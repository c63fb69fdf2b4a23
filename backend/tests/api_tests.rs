//! HTTP API integration tests
//!
//! Drives the full router in-process with the remote collaborators replaced.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use shared::{Coordinates, DailyForecast, ForecastBundle};
use tower::ServiceExt;
use water_oasis::error::{AppError, AppResult};
use water_oasis::external::{ChatMessage, NarrativeBackend};
use water_oasis::services::{
    AuthService, ForecastProvider, PredictionService, ReservoirService, WeatherService,
};
use water_oasis::{create_app, AppState, Config};

struct CannedBackend(&'static str);

#[async_trait]
impl NarrativeBackend for CannedBackend {
    async fn complete(&self, _messages: &[ChatMessage]) -> AppResult<String> {
        Ok(self.0.to_string())
    }

    fn backend_name(&self) -> &'static str {
        "canned"
    }
}

struct DryWeek;

#[async_trait]
impl ForecastProvider for DryWeek {
    async fn forecast(&self, _coordinates: Coordinates) -> AppResult<ForecastBundle> {
        let forecast = (1..=5)
            .map(|d| DailyForecast {
                date: NaiveDate::from_ymd_opt(2024, 9, d).unwrap(),
                max_temp: 30.0,
                min_temp: 18.0,
                avg_humidity: 40.0,
                precipitation: 0.0,
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
                wind_speed: 4.0,
                rain_probability: 10.0,
            })
            .collect();
        Ok(ForecastBundle {
            location: "Nairobi".to_string(),
            coordinates: None,
            forecast,
        })
    }
}

struct NoWeather;

#[async_trait]
impl ForecastProvider for NoWeather {
    async fn forecast(&self, _coordinates: Coordinates) -> AppResult<ForecastBundle> {
        Err(AppError::WeatherService("timeout".to_string()))
    }
}

fn app_with(forecasts: Arc<dyn ForecastProvider>, reply: &'static str) -> Router {
    let config = Config::from_defaults().unwrap();
    let reservoirs = ReservoirService::seeded();

    let state = AppState {
        auth: AuthService::new(&config.jwt),
        weather: WeatherService::new(&config.weather).unwrap(),
        predictions: PredictionService::new(
            Arc::new(reservoirs.clone()),
            forecasts.clone(),
            Arc::new(CannedBackend(reply)),
        ),
        reservoirs,
        forecasts,
        config: Arc::new(config),
    };

    create_app(state)
}

fn app() -> Router {
    app_with(Arc::new(DryWeek), "Prediction: dry spell continues")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn demo_token(app: &Router) -> String {
    let (status, body) = send(app, json_request(Method::POST, "/api/auth/demo-login", json!({}), None)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["reservoirs"], 8);
}

#[tokio::test]
async fn test_list_and_filter_reservoirs() {
    let app = app();

    let (status, body) = send(&app, get("/api/reservoirs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);

    let (_, body) = send(&app, get("/api/reservoirs?status=critical")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Nakuru Rift Valley Reservoir");

    let (status, body) = send(&app, get("/api/reservoirs/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Reservoir not found");
}

#[tokio::test]
async fn test_mutations_require_token() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/reservoirs", json!({ "name": "New" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, _) = send(
        &app,
        json_request(Method::DELETE, "/api/reservoirs/1", json!({}), Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads stay public
    let (status, _) = send(&app, get("/api/reservoirs/1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_update_delete_reservoir() {
    let app = app();
    let token = demo_token(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/reservoirs",
            json!({
                "name": "Garissa Borehole Network",
                "location": "Garissa, Kenya",
                "capacity": 60,
                "currentLevel": 25,
                "coordinates": { "lat": -0.4536, "lng": 39.6401 }
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 9);
    assert_eq!(body["data"]["status"], "critical");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, "/api/reservoirs/9", json!({ "currentLevel": 75 }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "good");

    let (status, body) = send(
        &app,
        json_request(Method::DELETE, "/api/reservoirs/9", json!({}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reservoir deleted successfully");

    let (status, _) = send(&app, get("/api/reservoirs/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_reservoir_validation() {
    let app = app();
    let token = demo_token(&app).await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/reservoirs", json!({ "name": "Half" }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: name, location, capacity, currentLevel, coordinates"
    );
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            json!({ "email": "Amina@Example.org", "password": "secret1", "name": " Amina " }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["email"], "amina@example.org");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": "amina@example.org", "password": "wrong-password" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": "amina@example.org", "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Amina");
}

#[tokio::test]
async fn test_predict_envelope() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/ai/predict", json!({ "reservoirId": "4" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["reservoirId"], 4);
    assert_eq!(data["prediction"], "dry spell continues");
    assert_eq!(data["riskLevel"], "medium");
    assert_eq!(data["daysUntilCritical"], 15);
    assert_eq!(data["confidence"], 75);
    assert_eq!(data["weatherSummary"]["dryDays"], 5);
    assert_eq!(data["weatherSummary"]["avgTemperature"], 24);
    assert!(data["generatedAt"].is_string());
}

#[tokio::test]
async fn test_predict_errors() {
    let app = app();

    let (status, body) = send(&app, json_request(Method::POST, "/api/ai/predict", json!({}), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Reservoir ID is required");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/ai/predict", json!({ "reservoirId": 404 }), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Reservoir not found");

    let app = app_with(Arc::new(NoWeather), "unused");
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/ai/predict", json!({ "reservoirId": 1 }), None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch weather forecast");
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = app();

    let bodies = [
        json!({ "reservoirId": -1 }),
        json!({
            "reservoirId": 1,
            "weatherData": { "forecast": [{ "date": "next tuesday", "precipitation": 2 }] }
        }),
    ];
    for body in bodies {
        let (status, body) = send(&app, json_request(Method::POST, "/api/ai/predict", body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let token = demo_token(&app).await;
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/reservoirs/1")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(r#"{"currentLevel": 50}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_reservoir_outlook() {
    let app = app();

    let (status, body) = send(&app, get("/api/weather/prediction/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["prediction"]["reservoirId"], 2);
    assert_eq!(body["data"]["prediction"]["expectedChange"], -2.0);
    assert_eq!(body["data"]["weatherForecast"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_weather_requires_configuration() {
    let app = app();

    let (status, body) = send(&app, get("/api/weather/current/-1.2921/36.8219")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Weather API key not configured");

    let (status, _) = send(&app, get("/api/weather/forecast/123/36.8219")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ai_health_reports_configuration() {
    let app = app();

    let (status, body) = send(&app, get("/api/ai/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["apiKeyConfigured"], false);
    assert_eq!(body["data"]["status"], "not_configured");
}
