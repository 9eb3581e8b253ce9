//! End-to-end export against a local mock of the FAOSTAT API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use faostat::{
    export_dataset, ClientConfig, ErrorKind, ExportError, ExportRequest, FaostatClient,
    EMPTY_INDEX_SENTINEL,
};

type Queries = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// How the mock data endpoint answers
#[derive(Clone, Copy)]
enum DataMode {
    Rows,
    NotFound,
    GatewayTimeout,
}

#[derive(Clone)]
struct MockState {
    data_mode: DataMode,
    queries: Queries,
}

async fn codes_handler(Path(domain): Path<String>) -> Response {
    if domain == "XX" {
        return (StatusCode::INTERNAL_SERVER_ERROR, EMPTY_INDEX_SENTINEL).into_response();
    }
    Json(json!({
        "data": [
            {"code": "882", "label": "Raw milk of cattle", "aggregate_type": "0"},
            {"code": "951", "label": "Raw milk of buffalo", "aggregate_type": "0"},
        ]
    }))
    .into_response()
}

async fn data_handler(
    State(state): State<MockState>,
    Path(domain): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.queries.lock().unwrap().push(params);

    match state.data_mode {
        DataMode::NotFound => (StatusCode::NOT_FOUND, "no such dataset").into_response(),
        DataMode::GatewayTimeout => StatusCode::from_u16(524).unwrap().into_response(),
        DataMode::Rows => Json(json!({
            "data": [
                {"Domain Code": domain, "Item Code": "882", "Item": "Raw milk of cattle", "Year": "2020", "Value": 1.5},
                {"Domain Code": domain, "Item Code": "882", "Item": "Raw milk of cattle", "Year": "2021", "Value": 1.7, "Flag": "E"},
            ]
        }))
        .into_response(),
    }
}

async fn spawn_mock(data_mode: DataMode) -> (FaostatClient, Queries) {
    let queries: Queries = Arc::default();
    let state = MockState {
        data_mode,
        queries: queries.clone(),
    };

    let app = Router::new()
        .route("/api/v1/en/codes/items/{domain}", get(codes_handler))
        .route("/api/v1/en/data/{domain}", get(data_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::new(&format!("http://{}/api/v1", addr)).unwrap();
    (FaostatClient::new(config).unwrap(), queries)
}

fn request_into(dir: &std::path::Path) -> ExportRequest {
    ExportRequest::new("QCL", ["Raw milk of cattle", "Raw milk of yak"], vec![2020, 2021])
        .with_template("faostat_{dataset}_{describe}_{timestamp}.csv")
        .with_output_dir(dir)
}

#[tokio::test]
async fn test_export_writes_csv() {
    let (client, queries) = spawn_mock(DataMode::Rows).await;
    let dir = tempfile::tempdir().unwrap();

    let outcome = export_dataset(&client, &request_into(dir.path())).await.unwrap();

    assert_eq!(outcome.codes, vec![882]);
    assert_eq!(outcome.table.len(), 2);
    assert!(outcome.path.starts_with(dir.path()));

    // two labels asked, one resolved: the name counts what was asked for
    let filename = outcome.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(filename.starts_with("faostat_QCL_2items_2years_"), "{}", filename);
    assert!(filename.ends_with(".csv"));

    let contents = std::fs::read_to_string(&outcome.path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("Domain Code,Item Code,Item,Year,Value,Flag")
    );
    assert_eq!(lines.next(), Some("QCL,882,Raw milk of cattle,2020,1.5,"));
    assert_eq!(lines.next(), Some("QCL,882,Raw milk of cattle,2021,1.7,E"));

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.get("item").map(String::as_str), Some("882"));
    assert_eq!(query.get("year").map(String::as_str), Some("2020,2021"));
    assert_eq!(query.get("limit").map(String::as_str), Some("-1"));
    assert_eq!(query.get("output_type").map(String::as_str), Some("objects"));
}

#[tokio::test]
async fn test_probe_runs_before_full_fetch() {
    let (client, queries) = spawn_mock(DataMode::Rows).await;
    let dir = tempfile::tempdir().unwrap();

    let request = request_into(dir.path()).with_probe(true);
    export_dataset(&client, &request).await.unwrap();

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("1"));
    assert_eq!(queries[0].get("year").map(String::as_str), Some("2020"));
    assert_eq!(queries[1].get("limit").map(String::as_str), Some("-1"));
}

#[tokio::test]
async fn test_no_matching_labels() {
    let (client, queries) = spawn_mock(DataMode::Rows).await;
    let dir = tempfile::tempdir().unwrap();

    let request = request_into(dir.path()).with_labels(["Raw milk of yak"]);
    let err = export_dataset(&client, &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoMatch);
    assert!(err.to_string().contains("Raw milk of yak"));
    assert!(queries.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_domain_is_resource_not_found() {
    let (client, _) = spawn_mock(DataMode::Rows).await;
    let dir = tempfile::tempdir().unwrap();

    let request = request_into(dir.path()).with_domain("XX");
    let err = export_dataset(&client, &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert!(err.to_string().contains("XX not found"));
}

#[tokio::test]
async fn test_gateway_timeout_leaves_no_file() {
    let (client, _) = spawn_mock(DataMode::GatewayTimeout).await;
    let dir = tempfile::tempdir().unwrap();

    let err = export_dataset(&client, &request_into(dir.path())).await.unwrap_err();

    match &err {
        ExportError::DataFetch(fetch) => assert_eq!(fetch.domain, "QCL"),
        other => panic!("expected DataFetch, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::DataFetch);
    assert_eq!(err.root_kind(), ErrorKind::RequestTimeout);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_other_status_is_http_error() {
    let (client, _) = spawn_mock(DataMode::NotFound).await;
    let dir = tempfile::tempdir().unwrap();

    let err = export_dataset(&client, &request_into(dir.path())).await.unwrap_err();

    assert_eq!(err.root_kind(), ErrorKind::Http);
    assert!(err.to_string().contains("404"));
    assert!(err.to_string().contains("no such dataset"));
}

#[tokio::test]
async fn test_invalid_template_fails_after_fetch() {
    let (client, _) = spawn_mock(DataMode::Rows).await;
    let dir = tempfile::tempdir().unwrap();

    let request = request_into(dir.path()).with_template("faostat_{grains}.csv");
    let err = export_dataset(&client, &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Output);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
