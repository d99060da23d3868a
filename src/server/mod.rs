//! HTTP interface of the diagnosis service.

use crate::config::Config;
use crate::util::{DiagnetError, Result};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use self::state::AppState;

/// Build the service's `Router`
///
/// # Errors
/// `DiagnetError::InvalidConfig` if the configured CORS origin is not a valid header value
pub fn router(state: AppState, config: &Config) -> Result<Router> {
    let mut app = Router::new()
        .route("/diagnose", post(handlers::diagnose_handler))
        .route("/symptoms", get(handlers::symptoms_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = &config.cors_origin {
        let origin = origin
            .parse::<HeaderValue>()
            .map_err(|e| DiagnetError::InvalidConfig(format!("CORS origin {:?}: {}", origin, e)))?;

        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        app = app.layer(cors);
    }

    Ok(app)
}

pub enum ServiceError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ServiceError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ServiceError::InternalError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::network::build_network;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let kb = KnowledgeBase::standard().unwrap();
        let network = build_network(&kb).unwrap();
        router(AppState::new(kb, network), &Config::default()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_diagnose(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/diagnose")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_message() {
        let (status, body) = send(app(), post_diagnose("{}")).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!({ "error": "No message provided" }), body);

        let (status, body) = send(app(), post_diagnose(r#"{"message": ""}"#)).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!({ "error": "No message provided" }), body);
    }

    #[tokio::test]
    async fn invalid_body() {
        let (status, body) = send(app(), post_diagnose("not json")).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!({ "error": "Invalid JSON body" }), body);
    }

    #[tokio::test]
    async fn no_symptoms() {
        let (status, body) = send(app(), post_diagnose(r#"{"message": "I ate a banana"}"#)).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(
            json!({
                "symptoms": [],
                "rule_based": {},
                "bayesian": {},
                "message": "No symptoms detected"
            }),
            body
        );
    }

    #[tokio::test]
    async fn diagnose_fever_and_cough() {
        let (status, body) = send(app(), post_diagnose(r#"{"message": "fever and cough"}"#)).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!(["fever", "cough"]), body["symptoms"]);
        assert_eq!(json!("Analysis completed successfully"), body["message"]);
        assert_eq!(json!(0.4), body["rule_based"]["Flu"]);
        assert_eq!(json!(0.5), body["rule_based"]["Pneumonia"]);
        assert_eq!(20, body["bayesian"].as_object().unwrap().len());
    }

    #[tokio::test]
    async fn symptom_universe() {
        let (status, body) = send(app(), get_request("/symptoms")).await;
        assert_eq!(StatusCode::OK, status);

        let symptoms: Vec<&str> = body["symptoms"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();
        assert_eq!(Some(&"abdominal pain"), symptoms.first());
        assert!(symptoms.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = send(app(), get_request("/health")).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!({ "status": "ok" }), body);
    }

    #[test]
    fn cors_origin() {
        let kb = KnowledgeBase::standard().unwrap();
        let network = build_network(&kb).unwrap();
        let state = AppState::new(kb, network);

        let mut config = Config::default();
        config.cors_origin = Some(String::from("http://localhost:3000"));
        assert!(router(state.clone(), &config).is_ok());

        config.cors_origin = Some(String::from("bad\norigin"));
        assert!(router(state, &config).is_err());
    }
}
