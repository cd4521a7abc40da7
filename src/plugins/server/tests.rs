use axum::{
  Router,
  body::{Body, to_bytes},
  http::{HeaderMap, Method, Request, StatusCode, header},
};
use tower::ServiceExt;

use super::router;
use crate::{prelude::*, state::AppState, sv::fixtures};

struct Sent {
  status: StatusCode,
  headers: HeaderMap,
  body: json::Value,
}

async fn app() -> (Arc<AppState>, Router) {
  let app = Arc::new(AppState::in_memory().await);
  (app.clone(), router(app))
}

async fn send(
  router: &Router,
  method: Method,
  uri: &str,
  auth: Option<&str>,
  body: Option<json::Value>,
) -> Sent {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(token) = auth {
    req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(body) => req
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string())),
    None => req.body(Body::empty()),
  }
  .unwrap();

  let res = router.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let headers = res.headers().clone();
  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let body = json::from_slice(&bytes).unwrap_or(json::Value::Null);

  Sent { status, headers, body }
}

async fn register(router: &Router, email: &str) -> String {
  let res = send(
    router,
    Method::POST,
    "/api/auth/register",
    None,
    Some(json::json!({
      "nombre_completo": "Rider",
      "email": email,
      "telefono": "555-0100",
      "password": "secret-pass",
    })),
  )
  .await;
  assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
  res.body["data"]["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &AppState, router: &Router) -> String {
  fixtures::admin(&app.db, "root@example.com").await;
  let res = send(
    router,
    Method::POST,
    "/session/login",
    None,
    Some(json::json!({
      "email": "root@example.com",
      "password": fixtures::PASSWORD,
    })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  res.body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
  let (_, router) = app().await;

  let res = send(&router, Method::GET, "/health", None, None).await;
  assert_eq!(res.status, StatusCode::OK);
  assert_eq!(res.body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
  let (_, router) = app().await;

  let res = send(
    &router,
    Method::POST,
    "/api/license/validate",
    None,
    Some(json::json!({ "device_id": "dev-1" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::UNAUTHORIZED);
  assert_eq!(res.body["success"], false);
  assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_user_token_rejected_on_admin_routes() {
  let (_, router) = app().await;
  let token = register(&router, "rider@example.com").await;

  let res = send(&router, Method::GET, "/admin/users", Some(&token), None).await;
  assert_eq!(res.status, StatusCode::UNAUTHORIZED);
  assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_web_login_cookie_authenticates_session() {
  let (app, router) = app().await;
  admin_token(&app, &router).await;

  let res = send(
    &router,
    Method::POST,
    "/session/login",
    None,
    Some(json::json!({
      "email": "root@example.com",
      "password": fixtures::PASSWORD,
    })),
  )
  .await;
  let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
  assert!(cookie.starts_with("auth_token="));
  let pair = cookie.split(';').next().unwrap().to_string();

  let req = Request::builder()
    .uri("/session")
    .header(header::COOKIE, pair)
    .body(Body::empty())
    .unwrap();
  let res = router.clone().oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);

  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let body: json::Value = json::from_slice(&bytes).unwrap();
  assert_eq!(body["data"]["email"], "root@example.com");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
  let (app, router) = app().await;
  fixtures::admin(&app.db, "root@example.com").await;

  let res = send(
    &router,
    Method::POST,
    "/session/login",
    None,
    Some(json::json!({ "email": "root@example.com", "password": "nope" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::UNAUTHORIZED);
  assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_device_registers_once() {
  let (_, router) = app().await;
  let token = register(&router, "rider@example.com").await;
  let body = json::json!({ "device_id": "dev-1" });

  let res = send(
    &router,
    Method::POST,
    "/api/auth/registerdevice",
    Some(&token),
    Some(body.clone()),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  assert_eq!(res.body["data"]["device_id"], "dev-1");

  let res = send(
    &router,
    Method::POST,
    "/api/auth/registerdevice",
    Some(&token),
    Some(body),
  )
  .await;
  assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
  let (_, router) = app().await;
  register(&router, "rider@example.com").await;

  let res = send(
    &router,
    Method::POST,
    "/api/auth/register",
    None,
    Some(json::json!({
      "name": "Other",
      "email": "rider@example.com",
      "phone": "555-0101",
      "password": "secret-pass",
    })),
  )
  .await;
  assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_activate_then_validate() {
  let (app, router) = app().await;
  let admin = admin_token(&app, &router).await;
  let user = register(&router, "rider@example.com").await;

  let res = send(
    &router,
    Method::POST,
    "/admin/licenses/provision",
    Some(&admin),
    Some(json::json!({ "kind": "anual" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
  let code = res.body["data"]["code"].as_str().unwrap().to_string();

  send(
    &router,
    Method::POST,
    "/api/auth/registerdevice",
    Some(&user),
    Some(json::json!({ "device_id": "dev-1" })),
  )
  .await;

  let res = send(
    &router,
    Method::POST,
    "/api/license/activate",
    Some(&user),
    Some(json::json!({ "codigo_licencia": code, "device_id": "dev-1" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  assert_eq!(res.body["data"]["days_remaining"], 30);

  let res = send(
    &router,
    Method::POST,
    "/api/license/validate",
    Some(&user),
    Some(json::json!({ "device_id": "dev-1" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  assert_eq!(res.body["data"]["codigo"], code.as_str());
  assert_eq!(res.body["data"]["daysRemaining"], 30);
  assert!(res.body["data"]["expiry"].is_string());

  let res = send(
    &router,
    Method::POST,
    "/api/license/validate",
    Some(&user),
    Some(json::json!({ "device_id": "dev-2" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
  let (_, router) = app().await;

  let req = Request::builder()
    .method(Method::POST)
    .uri("/session/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let res = router.clone().oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);

  let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let body: json::Value = json::from_slice(&bytes).unwrap();
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_rebinds_device() {
  let (app, router) = app().await;
  let admin = admin_token(&app, &router).await;
  let user = fixtures::user(&app.db, "rider@example.com").await;

  let res = send(
    &router,
    Method::PUT,
    &format!("/admin/users/{}/device", user.id),
    Some(&admin),
    Some(json::json!({ "device_id": "dev-9" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);

  let user = app.sv().user.by_id(user.id).await.unwrap().unwrap();
  assert_eq!(user.device_id.as_deref(), Some("dev-9"));
}

#[tokio::test]
async fn test_mobile_login_shape() {
  let (app, router) = app().await;
  fixtures::user(&app.db, "rider@example.com").await;

  let res = send(
    &router,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json::json!({
      "email": "rider@example.com",
      "password": fixtures::PASSWORD,
    })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  assert!(res.body["data"]["token"].is_string());
  assert_eq!(res.body["data"]["usuario"]["email"], "rider@example.com");
  assert_eq!(res.body["data"]["device_registered"], false);
}

#[tokio::test]
async fn test_group_routes_under_both_paths() {
  let (_, router) = app().await;
  let token = register(&router, "rider@example.com").await;

  let res = send(
    &router,
    Method::POST,
    "/api/grupos/create",
    Some(&token),
    Some(json::json!({ "nombre_grupo": "Night" })),
  )
  .await;
  assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
  let id = res.body["data"]["id"].as_i64().unwrap();

  let res = send(&router, Method::GET, "/api/groups", Some(&token), None).await;
  assert_eq!(res.body["data"].as_array().unwrap().len(), 1);

  let uri = format!("/api/screenshots/list?id_grupo={id}");
  let res = send(&router, Method::GET, &uri, Some(&token), None).await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);
  assert_eq!(res.body["data"], json::json!([]));

  let res =
    send(&router, Method::GET, "/api/screenshots/list", Some(&token), None)
      .await;
  assert_eq!(res.status, StatusCode::BAD_REQUEST);

  let res = send(
    &router,
    Method::DELETE,
    "/api/grupos/delete",
    Some(&token),
    Some(json::json!({ "id_grupo": id })),
  )
  .await;
  assert_eq!(res.status, StatusCode::OK, "{}", res.body);

  let res =
    send(&router, Method::GET, "/api/grupos/list", Some(&token), None).await;
  assert_eq!(res.body["data"], json::json!([]));

  let res = send(&router, Method::GET, "/api/empresa/info", None, None).await;
  assert_eq!(res.status, StatusCode::NOT_FOUND);
}
