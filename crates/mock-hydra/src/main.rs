//! In-memory stand-in for an Ory-Hydra-style admin API, for local
//! development and integration testing of the registration flow.
//!
//! Clients live in a process-local map; restarting the binary wipes them,
//! which conveniently exercises the "client gone remotely" recovery paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tracing::info;

type Clients = Arc<Mutex<HashMap<String, Value>>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app = app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:4445").await.unwrap();
    info!("mock-hydra listening on http://localhost:4445");
    axum::serve(listener, app).await.unwrap();
}

fn app() -> Router {
    let clients: Clients = Arc::new(Mutex::new(HashMap::new()));
    Router::new()
        .route("/health/ready", get(health))
        .route("/admin/clients", post(create_client).get(list_clients))
        .route(
            "/admin/clients/{id}",
            get(get_client).delete(delete_client),
        )
        .with_state(clients)
}

// --- Endpoints ---

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn create_client(
    State(clients): State<Clients>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Some(client_id) = body["client_id"].as_str().map(str::to_string) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "client_id is required"})),
        );
    };

    let mut clients = clients.lock().unwrap();
    if clients.contains_key(&client_id) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": format!("client {client_id} already exists")})),
        );
    }

    info!(client_id = %client_id, "client created");
    clients.insert(client_id, body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn get_client(
    State(clients): State<Clients>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match clients.lock().unwrap().get(&id) {
        // Like the real thing, the secret is never echoed back.
        Some(client) => {
            let mut client = client.clone();
            if let Some(obj) = client.as_object_mut() {
                obj.remove("client_secret");
            }
            (StatusCode::OK, Json(client))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("client {id} not found")})),
        ),
    }
}

async fn delete_client(
    State(clients): State<Clients>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if clients.lock().unwrap().remove(&id).is_some() {
        info!(client_id = %id, "client deleted");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn list_clients(State(clients): State<Clients>) -> Json<Value> {
    let clients = clients.lock().unwrap();
    Json(Value::Array(clients.values().cloned().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    fn client_body(id: &str) -> Value {
        json!({
            "client_id": id,
            "client_secret": "s3cret",
            "client_name": "travel agent",
            "grant_types": ["client_credentials"],
            "scope": "agent:read agent:write"
        })
    }

    #[tokio::test]
    async fn create_then_get_round_trips_without_secret() {
        let server = TestServer::new(app()).unwrap();

        let created = server
            .post("/admin/clients")
            .json(&client_body("did:key:z1"))
            .await;
        created.assert_status(StatusCode::CREATED);

        let fetched = server.get("/admin/clients/did:key:z1").await;
        fetched.assert_status_ok();
        let body: Value = fetched.json();
        assert_eq!(body["client_id"], "did:key:z1");
        assert!(body.get("client_secret").is_none());
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let server = TestServer::new(app()).unwrap();
        server
            .post("/admin/clients")
            .json(&client_body("did:key:z1"))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/admin/clients")
            .json(&client_body("did:key:z1"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_client_is_404_until_created() {
        let server = TestServer::new(app()).unwrap();
        server
            .get("/admin/clients/did:key:zMissing")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete("/admin/clients/did:key:zMissing")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_the_client() {
        let server = TestServer::new(app()).unwrap();
        server
            .post("/admin/clients")
            .json(&client_body("did:key:z1"))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .delete("/admin/clients/did:key:z1")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/admin/clients/did:key:z1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_returns_all_registered_clients() {
        let server = TestServer::new(app()).unwrap();
        let listed: Value = server.get("/admin/clients").await.json();
        assert_eq!(listed, json!([]));

        server
            .post("/admin/clients")
            .json(&client_body("did:key:z1"))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/admin/clients")
            .json(&client_body("did:key:z2"))
            .await
            .assert_status(StatusCode::CREATED);

        let listed: Value = server.get("/admin/clients").await.json();
        let ids: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["client_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"did:key:z1"));
        assert!(ids.contains(&"did:key:z2"));
    }

    #[tokio::test]
    async fn create_requires_client_id() {
        let server = TestServer::new(app()).unwrap();
        server
            .post("/admin/clients")
            .json(&json!({"client_name": "nameless"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
