//! Router assembly.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, exams, health, nursing, patients, pharmacy};
use crate::state::AppState;

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // administration
        .route("/admin/hospitals", post(admin::create_hospital))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/users/{id}", get(admin::get_user))
        .route(
            "/admin/patients/{id}/dossier",
            delete(admin::deactivate_dossier),
        )
        .route("/patients", post(admin::create_patient))
        // patient lookup and consultations
        .route("/patients/{query}", get(patients::get_patient))
        .route("/patients/{query}/dossier", get(patients::get_dossier))
        .route(
            "/patients/{query}/consultations",
            post(patients::create_consultation),
        )
        // exams
        .route("/exams", get(exams::list_exams))
        .route("/exams/{id}/start", post(exams::start_exam))
        .route("/exams/{id}/result", post(exams::submit_result))
        .route("/exams/{id}/validate", post(exams::validate_exam))
        .route("/exams/{id}/cancel", post(exams::cancel_exam))
        .route("/results/{id}/metrics", post(exams::record_metric))
        // nursing
        .route(
            "/consultations/{id}/activities",
            post(nursing::plan_activity),
        )
        .route("/activities", get(nursing::list_activities))
        .route("/activities/{id}/start", post(nursing::start_activity))
        .route(
            "/activities/{id}/complete",
            post(nursing::complete_activity),
        )
        // pharmacy service channel
        .route("/pharmacy/ordonnances", get(pharmacy::list_unvalidated))
        .route("/pharmacy/ordonnances/{id}", get(pharmacy::get_ordonnance))
        .route(
            "/pharmacy/ordonnances/{id}/validate",
            post(pharmacy::validate_ordonnance),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::REQUEST_TIMEOUT
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, header};
    use healthhub_db_memory::create_storage;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN_TOKEN: &str = "dev-admin-token";
    const SERVICE_KEY: &str = "test-pharmacy-key";

    async fn app() -> Router {
        let (registry, clinical) = create_storage();
        let state = AppState::new(registry, clinical, SERVICE_KEY);
        let mut config = AppConfig::default();
        config.auth.pharmacy_service_key = SERVICE_KEY.into();
        bootstrap::seed(&state.registry, &config).await.unwrap();
        build_router(state, Duration::from_secs(5))
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        (status, json_body(response).await)
    }

    async fn seed_hospital(app: &Router) -> String {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/admin/hospitals",
                Some(ADMIN_TOKEN),
                Some(json!({"name": "CHU Central", "place": "Lyon"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn seed_user(app: &Router, hospital_id: &str, role: &str, profile: Value, token: &str) -> String {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/admin/users",
                Some(ADMIN_TOKEN),
                Some(json!({
                    "username": format!("{role}.test"),
                    "role": role,
                    "hospital_id": hospital_id,
                    "profile": profile,
                    "token": token,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    async fn seed_patient(app: &Router, hospital_id: &str, doctor_id: &str, nid: i64) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/patients",
                Some(ADMIN_TOKEN),
                Some(json!({
                    "national_health_id": nid,
                    "first_name": "Omar",
                    "last_name": "Haddad",
                    "birth_date": "1984-07-01T00:00:00Z",
                    "assigned_doctor_id": doctor_id,
                    "hospital_id": hospital_id,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    fn doctor_profile() -> Value {
        json!({"kind": "doctor", "specialty": "generaliste", "phone": "0555"})
    }

    fn tech_profile(kind: &str) -> Value {
        json!({"kind": kind, "shift": "day", "specialty": "biochemistry", "phone": "0555", "pending_tests": 0})
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app().await;
        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app().await;
        let (status, body) = send(&app, request("GET", "/patients/42", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_credentials");
    }

    #[tokio::test]
    async fn non_admin_cannot_administrate() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/admin/hospitals",
                Some("doc-token"),
                Some(json!({"name": "x", "place": "y"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn locator_serves_all_three_key_shapes() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        let registered = seed_patient(&app, &hospital, &doctor, 1_840_769_222_333).await;

        let user_id = registered["patient"]["user_id"].as_str().unwrap();
        let qr_token = registered["record"]["qr_token"].as_str().unwrap();
        for query in ["1840769222333", user_id, qr_token] {
            let (status, body) = send(
                &app,
                request("GET", &format!("/patients/{query}"), Some("doc-token"), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "query {query}: {body}");
            assert_eq!(body["user_id"], user_id);
        }
    }

    #[tokio::test]
    async fn denial_is_indistinguishable_from_a_miss() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        seed_patient(&app, &hospital, &doctor, 1_111_111_111).await;

        // a nurse from another hospital
        let (status, other_hospital) = send(
            &app,
            request(
                "POST",
                "/admin/hospitals",
                Some(ADMIN_TOKEN),
                Some(json!({"name": "CHU Nord", "place": "Lille"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        seed_user(
            &app,
            other_hospital["id"].as_str().unwrap(),
            "nurse",
            json!({"kind": "nurse", "shift": "night", "specialty": "urgences", "phone": "0555"}),
            "nurse-token",
        )
        .await;

        let (denied_status, denied_body) = send(
            &app,
            request("GET", "/patients/1111111111", Some("nurse-token"), None),
        )
        .await;
        let (miss_status, miss_body) = send(
            &app,
            request("GET", "/patients/9999999999", Some("nurse-token"), None),
        )
        .await;
        assert_eq!(denied_status, StatusCode::NOT_FOUND);
        assert_eq!(miss_status, StatusCode::NOT_FOUND);
        assert_eq!(denied_body["error"], miss_body["error"]);
    }

    #[tokio::test]
    async fn patient_sees_their_own_record_with_their_seeded_token() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        let registered = seed_patient(&app, &hospital, &doctor, 2_222_222_222).await;
        let patient_token = registered["token"].as_str().unwrap();

        let (status, body) = send(
            &app,
            request("GET", "/patients/2222222222", Some(patient_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["national_health_id"], 2_222_222_222_i64);
    }

    #[tokio::test]
    async fn exam_flow_end_to_end() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        let tech =
            seed_user(&app, &hospital, "lab_tech", tech_profile("lab_tech"), "tech-token").await;
        seed_patient(&app, &hospital, &doctor, 3_333_333_333).await;

        // doctor requests a lab exam
        let (status, outcome) = send(
            &app,
            request(
                "POST",
                "/patients/3333333333/consultations",
                Some("doc-token"),
                Some(json!({
                    "date": "2026-03-01T10:00:00Z",
                    "summary": "bilan",
                    "exams": [{"kind": "lab", "priority": "urgent", "notes": "NFS", "assignee": tech}],
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{outcome}");
        assert_eq!(outcome["consultation"]["status"], "termine");
        let exam_id = outcome["exams"][0]["id"].as_str().unwrap().to_string();

        // tech sees it in the queue, scoped by specialty and hospital
        let (status, queue) = send(&app, request("GET", "/exams", Some("tech-token"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(queue.as_array().unwrap().len(), 1);
        assert_eq!(queue[0]["status"], "planifie");

        let (status, _) = send(
            &app,
            request("POST", &format!("/exams/{exam_id}/start"), Some("tech-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, result) = send(
            &app,
            request(
                "POST",
                &format!("/exams/{exam_id}/result"),
                Some("tech-token"),
                Some(json!({"kind": "lab", "report": "hemoglobine normale"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{result}");

        let (status, validated) = send(
            &app,
            request("POST", &format!("/exams/{exam_id}/validate"), Some("tech-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(validated["status"], "termine");

        // metric on the tech's own result
        let result_id = result["id"].as_str().unwrap();
        let (status, metric) = send(
            &app,
            request(
                "POST",
                &format!("/results/{result_id}/metrics"),
                Some("tech-token"),
                Some(json!({"metric": "glycemia", "value": 1.1, "unit": "g/L"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{metric}");

        // the dossier now shows the consultation and the metric
        let (status, dossier) = send(
            &app,
            request("GET", "/patients/3333333333/dossier", Some("doc-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dossier["consultations"].as_array().unwrap().len(), 1);
        assert_eq!(dossier["metrics"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pharmacy_channel_requires_the_service_key() {
        let app = app().await;
        let (status, body) = send(&app, request("GET", "/pharmacy/ordonnances", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_service_key");

        let req = Request::builder()
            .method("GET")
            .uri("/pharmacy/ordonnances")
            .header("x-service-key", SERVICE_KEY)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn pharmacy_validates_a_prescription() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        seed_patient(&app, &hospital, &doctor, 4_444_444_444).await;

        let (status, outcome) = send(
            &app,
            request(
                "POST",
                "/patients/4444444444/consultations",
                Some("doc-token"),
                Some(json!({
                    "date": "2026-03-01T10:00:00Z",
                    "summary": "angine",
                    "diagnostic": "angine bacterienne",
                    "prescription": {
                        "expires_at": "2026-06-01T00:00:00Z",
                        "lines": [{
                            "medication_name": "amoxicilline",
                            "medication_form": "comprime",
                            "dose": "moyen",
                            "duration": "7 jours",
                            "frequency": "3x par jour",
                        }],
                    },
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{outcome}");
        let ordonnance_id = outcome["ordonnance"]["id"].as_str().unwrap();

        let validate = |uri: String| {
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("x-service-key", SERVICE_KEY)
                .body(Body::empty())
                .unwrap()
        };
        let (status, validated) = send(
            &app,
            validate(format!("/pharmacy/ordonnances/{ordonnance_id}/validate")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(validated["validated"], true);

        // idempotent
        let (status, _) = send(
            &app,
            validate(format!("/pharmacy/ordonnances/{ordonnance_id}/validate")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_dose_is_unprocessable() {
        let app = app().await;
        let hospital = seed_hospital(&app).await;
        let doctor = seed_user(&app, &hospital, "doctor", doctor_profile(), "doc-token").await;
        seed_patient(&app, &hospital, &doctor, 5_555_555_555).await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/patients/5555555555/consultations",
                Some("doc-token"),
                Some(json!({
                    "date": "2026-03-01T10:00:00Z",
                    "summary": "angine",
                    "diagnostic": "angine",
                    "prescription": {
                        "expires_at": "2026-06-01T00:00:00Z",
                        "lines": [{
                            "medication_name": "amoxicilline",
                            "medication_form": "comprime",
                            "duration": "7 jours",
                            "frequency": "3x par jour",
                        }],
                    },
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_failed");
    }
}
