use std::sync::{Arc, Mutex};

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use opcms_crm_client::api::errors::ApiError;
use opcms_crm_client::api::http::HttpCustomerApi;
use opcms_crm_client::api::{DuplicateCheck, RemoteCollection};
use opcms_crm_client::domain::customer::{NewCustomer, UpdateCustomer};
use opcms_crm_client::domain::query::{QueryState, SortOrder, filters};
use opcms_crm_client::domain::types::{
    CompanyName, ContactName, CustomerKey, PageNumber, PhoneNumber,
};
use opcms_crm_client::models::config::ClientConfig;
use opcms_crm_client::services::list::{ListSynchronizer, RefreshOutcome};
use opcms_crm_client::session::Session;

const KNOWN_KEY: &str = "0b6f1c2e-8d4a-4e3b-9c11-5a7e2f9d3b40";
const FAILING_KEY: &str = "9f2d7c1a-4b3e-4a6f-8e21-7c5b1d0a9e88";

/// Requests seen by the fake backend: `(authorization, method, path?query)`.
#[derive(Default)]
struct Backend {
    requests: Mutex<Vec<(Option<String>, String, String)>>,
}

impl Backend {
    fn record(&self, req: &HttpRequest) {
        let auth = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let target = match req.query_string() {
            "" => req.path().to_string(),
            query => format!("{}?{query}", req.path()),
        };
        self.requests
            .lock()
            .expect("requests lock")
            .push((auth, req.method().to_string(), target));
    }

    fn last(&self) -> (Option<String>, String, String) {
        self.requests
            .lock()
            .expect("requests lock")
            .last()
            .cloned()
            .expect("a request was made")
    }
}

fn customer_json(key: &str, company_name: &str) -> Value {
    json!({
        "id": 3,
        "customer_id": key,
        "company_name": company_name,
        "contact_name": "Jane Doe",
        "contact_phone": "13800138000",
        "customer_type": "enterprise",
        "province": "Guangdong",
        "status": "active",
        "level": "vip",
        "source": "direct",
        "created_at": "2024-03-01T09:00:00",
        "updated_at": "2024-03-01T09:00:00"
    })
}

fn failure(status: StatusCode, error: &str, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "error": error,
        "message": message
    }))
}

async fn list_customers(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req);
    match req.headers().get(header::AUTHORIZATION) {
        None => {
            return failure(StatusCode::UNAUTHORIZED, "Unauthorized", "Missing token");
        }
        Some(value) if value.as_bytes() == b"Bearer expired" => {
            return failure(StatusCode::UNAUTHORIZED, "Unauthorized", "Token expired");
        }
        Some(_) => {}
    }
    if req.query_string().contains("search=broken") {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body("{\"success\": true, \"data\": {\"customers\": [");
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "customers": [customer_json(KNOWN_KEY, "Acme Corp")],
            "total": 41,
            "page": 3,
            "page_size": 20,
            "total_pages": 3
        },
        "message": "ok"
    }))
}

async fn check_duplicate(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req);
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "is_duplicate": true,
            "duplicate_field": "company_name",
            "duplicate_value": "Acme Corp"
        }
    }))
}

async fn get_customer(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req);
    let key = path.into_inner();
    if key == KNOWN_KEY {
        HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer_json(&key, "Acme Corp")
        }))
    } else {
        failure(
            StatusCode::NOT_FOUND,
            "Not Found",
            &format!("Customer with id \"{key}\" not found"),
        )
    }
}

async fn create_customer(
    req: HttpRequest,
    body: web::Json<Value>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req);
    let company_name = body["company_name"].as_str().unwrap_or_default();
    if company_name == "Acme Corp" {
        return failure(
            StatusCode::CONFLICT,
            "Duplicate customer",
            "Customer with company name \"Acme Corp\" already exists",
        );
    }
    HttpResponse::Created().json(json!({
        "success": true,
        "data": customer_json("5d1e9a40-2c7b-4f8e-a3d6-1b0c9e8f7a65", company_name),
        "message": "Customer created"
    }))
}

async fn update_customer(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Value>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req);
    let mut customer = customer_json(&path.into_inner(), "Acme Corp");
    customer["city"] = body["city"].clone();
    HttpResponse::Ok().json(json!({ "success": true, "data": customer }))
}

async fn delete_customer(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req);
    if path.into_inner() == FAILING_KEY {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", "");
    }
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": null,
        "message": "Customer deleted"
    }))
}

/// Starts the fake backend on an ephemeral port and returns its API base URL.
fn start_backend(backend: web::Data<Backend>) -> String {
    let server = HttpServer::new(move || {
        App::new().app_data(backend.clone()).service(
            web::scope("/api/v1")
                .route("/customers", web::get().to(list_customers))
                .route("/customers", web::post().to(create_customer))
                .route("/customers/check-duplicate", web::get().to(check_duplicate))
                .route("/customers/{key}", web::get().to(get_customer))
                .route("/customers/{key}", web::put().to(update_customer))
                .route("/customers/{key}", web::delete().to(delete_customer)),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind fake backend");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}/api/v1/")
}

fn client(base_url: &str, token: Option<&str>) -> HttpCustomerApi {
    let session = match token {
        Some(token) => Session::with_token(token, Some("jane".to_string())),
        None => Session::new(),
    };
    HttpCustomerApi::new(&ClientConfig::new(base_url), Arc::new(session)).expect("client")
}

fn key(value: &str) -> CustomerKey {
    value.parse().expect("valid key")
}

#[actix_web::test]
async fn list_request_carries_query_and_bearer_token() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend.clone()), Some("secret"));
    let query = QueryState::new()
        .search("Acme")
        .filter(filters::STATUS, "active")
        .sort("company_name", SortOrder::Desc);

    let page = api.fetch_page(&query).await.expect("page");

    let (auth, method, target) = backend.last();
    assert_eq!(auth.as_deref(), Some("Bearer secret"));
    assert_eq!(method, "GET");
    assert_eq!(
        target,
        "/api/v1/customers?page=1&page_size=20&search=Acme&status=active&sort=company_name%3Adesc"
    );
    assert_eq!(page.total(), 41);
    assert_eq!(page.page(), PageNumber::new(3).expect("page"));
    assert_eq!(page.items()[0].key, key(KNOWN_KEY));
}

#[actix_web::test]
async fn synchronizer_applies_page_from_server() {
    let backend = web::Data::new(Backend::default());
    let sync = ListSynchronizer::new(client(&start_backend(backend), Some("secret")));

    assert_eq!(sync.refresh().await, RefreshOutcome::Applied);

    let view = sync.view();
    assert_eq!(view.total(), 41);
    assert_eq!(view.items().len(), 1);
    assert!(view.error.is_none());
}

#[actix_web::test]
async fn unauthorized_response_clears_session() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend), Some("expired"));
    assert!(api.session().is_authenticated());

    let result = api.fetch_page(&QueryState::new()).await;

    assert_eq!(result, Err(ApiError::Unauthorized("Token expired".to_string())));
    assert!(!api.session().is_authenticated());
}

#[actix_web::test]
async fn missing_record_maps_to_not_found() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend), Some("secret"));

    let found = api.fetch_one(&key(KNOWN_KEY)).await.expect("known customer");
    let missing = api.fetch_one(&key(FAILING_KEY)).await;

    assert_eq!(found.company_name, "Acme Corp");
    assert!(matches!(missing, Err(ApiError::NotFound(message)) if message.contains(FAILING_KEY)));
}

#[actix_web::test]
async fn duplicate_create_maps_to_validation() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend.clone()), Some("secret"));
    let draft = |name: &str| {
        NewCustomer::new(
            CompanyName::new(name).expect("company name"),
            ContactName::new("Jane Doe").expect("contact name"),
            PhoneNumber::new("13800138000").expect("phone"),
        )
    };

    let created = api.create(&draft("Globex")).await.expect("created");
    let duplicate = api.create(&draft("Acme Corp")).await;

    assert_eq!(created.company_name, "Globex");
    assert_eq!(
        duplicate,
        Err(ApiError::Validation(
            "Customer with company name \"Acme Corp\" already exists".to_string()
        ))
    );
    let (_, method, target) = backend.last();
    assert_eq!((method.as_str(), target.as_str()), ("POST", "/api/v1/customers"));
}

#[actix_web::test]
async fn update_sends_only_changed_fields() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend.clone()), Some("secret"));
    let patch = UpdateCustomer {
        city: Some("Shenzhen".to_string()),
        ..Default::default()
    };

    let updated = api.update(&key(KNOWN_KEY), &patch).await.expect("updated");
    let empty = api.update(&key(KNOWN_KEY), &UpdateCustomer::default()).await;

    assert_eq!(updated.city.as_deref(), Some("Shenzhen"));
    assert!(matches!(empty, Err(ApiError::Validation(_))));
    let (_, method, target) = backend.last();
    assert_eq!(method, "PUT");
    assert_eq!(target, format!("/api/v1/customers/{KNOWN_KEY}"));
}

#[actix_web::test]
async fn server_error_is_transient() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend), Some("secret"));

    api.delete(&key(KNOWN_KEY)).await.expect("deleted");
    let result = api.delete(&key(FAILING_KEY)).await;

    match result {
        Err(err) => {
            assert!(err.is_retryable());
            assert_eq!(err, ApiError::Transient("Internal Server Error".to_string()));
        }
        Ok(()) => panic!("expected a transient error"),
    }
}

#[actix_web::test]
async fn malformed_body_is_decode_error() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend), Some("secret"));

    let result = api.fetch_page(&QueryState::new().search("broken")).await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[actix_web::test]
async fn unreachable_server_is_transient() {
    let api = client("http://127.0.0.1:9/api/v1", None);

    let result = api.fetch_page(&QueryState::new()).await;

    assert!(matches!(result, Err(ApiError::Transient(_))));
}

#[actix_web::test]
async fn duplicate_check_sends_params() {
    let backend = web::Data::new(Backend::default());
    let api = client(&start_backend(backend.clone()), None);

    let result = api
        .check_duplicate(Some("Acme Corp"), None)
        .await
        .expect("checked");

    assert!(result.is_duplicate);
    assert_eq!(result.duplicate_field.as_deref(), Some("company_name"));
    let (auth, _, target) = backend.last();
    assert_eq!(auth, None);
    assert_eq!(
        target,
        "/api/v1/customers/check-duplicate?company_name=Acme+Corp"
    );
}
