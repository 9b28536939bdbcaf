//! End-to-end behaviour of every route, driven in-process through
//! `Router::call` without opening a socket.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use persons_api::{AppState, PersonDirectory, Router, routes};
use serde_json::{Value, json};

fn app() -> Router {
    routes::router(AppState::default())
}

struct Reply {
    status: u16,
    headers: http::HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    fn error_locs(&self) -> Vec<Vec<String>> {
        self.json()["detail"]
            .as_array()
            .expect("validation detail list")
            .iter()
            .map(|e| serde_json::from_value(e["loc"].clone()).unwrap())
            .collect()
    }
}

async fn send(router: &Router, req: http::Request<Full<Bytes>>) -> Reply {
    let resp = router.call(req).await;
    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    Reply { status, headers, body }
}

async fn get(path: &str) -> Reply {
    send(&app(), http::Request::get(path).body(Full::default()).unwrap()).await
}

async fn send_json(method: http::Method, path: &str, body: Value) -> Reply {
    let req = http::Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();
    send(&app(), req).await
}

fn form(path: &str) -> http::request::Builder {
    http::Request::post(path).header("content-type", "application/x-www-form-urlencoded")
}

async fn post_form(path: &str, body: &'static str) -> Reply {
    let req = form(path).body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap();
    send(&app(), req).await
}

fn person() -> Value {
    json!({
        "first_name": "Daniel",
        "last_name": "Calamateo",
        "age": 28,
        "hair_color": "black",
        "is_married": false,
        "password": "123456789"
    })
}

fn location() -> Value {
    json!({ "city": "Tlaquepaque", "state": "Jalisco", "country": "México" })
}

// ── home ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn home_says_hello() {
    let r = get("/").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!({ "Hello": "world" }));
}

// ── create_person ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_person_returns_201_without_password() {
    let r = send_json(http::Method::POST, "/person/new", person()).await;
    assert_eq!(r.status, 201);
    let mut expected = person();
    expected.as_object_mut().unwrap().remove("password");
    assert_eq!(r.json(), expected);
}

#[tokio::test]
async fn create_person_rejects_age_out_of_range() {
    for age in [0, -1, 116] {
        let mut p = person();
        p["age"] = json!(age);
        let r = send_json(http::Method::POST, "/person/new", p).await;
        assert_eq!(r.status, 422, "age {age}");
        assert_eq!(r.error_locs(), vec![vec!["body", "age"]]);
    }
}

#[tokio::test]
async fn create_person_aggregates_all_violations() {
    let mut p = person();
    p["first_name"] = json!("");
    p["last_name"] = json!("x".repeat(51));
    p["password"] = json!("short");
    let r = send_json(http::Method::POST, "/person/new", p).await;
    assert_eq!(r.status, 422);
    assert_eq!(
        r.error_locs(),
        vec![
            vec!["body", "first_name"],
            vec!["body", "last_name"],
            vec!["body", "password"],
        ]
    );
}

#[tokio::test]
async fn create_person_requires_fields_and_known_hair_color() {
    let mut p = person();
    p.as_object_mut().unwrap().remove("age");
    let r = send_json(http::Method::POST, "/person/new", p).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.json()["detail"][0]["type"], "missing");

    let mut p = person();
    p["hair_color"] = json!("green");
    let r = send_json(http::Method::POST, "/person/new", p).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.json()["detail"][0]["type"], "enum");
}

#[tokio::test]
async fn create_person_reports_missing_and_invalid_fields_together() {
    let r = send_json(
        http::Method::POST,
        "/person/new",
        json!({ "first_name": "", "last_name": "X", "password": "short" }),
    )
    .await;
    assert_eq!(r.status, 422);
    assert_eq!(
        r.error_locs(),
        vec![vec!["body", "age"], vec!["body", "first_name"], vec!["body", "password"]]
    );
    let kinds: Vec<Value> = r.json()["detail"].as_array().unwrap().iter().map(|e| e["type"].clone()).collect();
    assert_eq!(kinds, [json!("missing"), json!("length"), json!("length")]);

    let r = send_json(
        http::Method::POST,
        "/person/new",
        json!({ "first_name": "A", "password": "longenough", "hair_color": "green" }),
    )
    .await;
    assert_eq!(r.status, 422);
    assert_eq!(
        r.error_locs(),
        vec![vec!["body", "age"], vec!["body", "hair_color"], vec!["body", "last_name"]]
    );
}

#[tokio::test]
async fn create_person_rejects_non_json_body() {
    let req = http::Request::post("/person/new")
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(b"{not json")))
        .unwrap();
    let r = send(&app(), req).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body"]]);
}

// ── show_person (query, deprecated) ───────────────────────────────────────────

#[tokio::test]
async fn show_person_by_query_maps_name_to_age() {
    let r = get("/person/detail?name=Gabriela&age=28").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!({ "Gabriela": "28" }));
    assert_eq!(r.headers["deprecation"], "true");
}

#[tokio::test]
async fn show_person_by_query_without_name_keys_null() {
    let r = get("/person/detail?age=30").await;
    assert_eq!(r.json(), json!({ "null": "30" }));
}

#[tokio::test]
async fn show_person_by_query_requires_age_and_bounds_name() {
    let r = get("/person/detail?name=Gabriela").await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["query", "age"]]);

    let r = get(&format!("/person/detail?name={}&age=3", "a".repeat(51))).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["query", "name"]]);
}

#[tokio::test]
async fn show_person_by_query_repeated_key_keeps_last() {
    let r = get("/person/detail?name=Ana&age=1&age=2").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!({ "Ana": "2" }));
}

// ── show_person (path) ────────────────────────────────────────────────────────

#[tokio::test]
async fn show_person_finds_known_ids() {
    for id in 1..=5 {
        let r = get(&format!("/person/detail/{id}")).await;
        assert_eq!(r.status, 200);
        assert_eq!(r.json(), json!({ id.to_string(): "It exists" }));
    }
}

#[tokio::test]
async fn show_person_unknown_id_is_404() {
    let r = get("/person/detail/6").await;
    assert_eq!(r.status, 404);
    assert_eq!(r.json(), json!({ "detail": "This person does not exist" }));
}

#[tokio::test]
async fn show_person_non_positive_id_fails_validation() {
    for id in ["0", "-4", "abc"] {
        let r = get(&format!("/person/detail/{id}")).await;
        assert_eq!(r.status, 422, "id {id}");
        assert_eq!(r.error_locs(), vec![vec!["path", "person_id"]]);
    }
}

#[tokio::test]
async fn show_person_uses_injected_directory() {
    let router = routes::router(AppState::new(PersonDirectory::new([42])));
    let req = |path: &str| http::Request::get(path).body(Full::default()).unwrap();
    assert_eq!(send(&router, req("/person/detail/42")).await.status, 200);
    assert_eq!(send(&router, req("/person/detail/1")).await.status, 404);
}

// ── update_person ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_person_merges_person_and_location() {
    let body = json!({ "person": person(), "location": location() });
    let r = send_json(http::Method::PUT, "/person/3", body).await;
    assert_eq!(r.status, 200);
    let mut expected = person();
    expected.as_object_mut().unwrap().extend(location().as_object().unwrap().clone());
    assert_eq!(r.json(), expected);
}

#[tokio::test]
async fn update_person_skips_existence_check() {
    // The read path 404s on id 999; the update path does not look it up.
    let body = json!({ "person": person(), "location": location() });
    let r = send_json(http::Method::PUT, "/person/999", body).await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json()["city"], "Tlaquepaque");
}

#[tokio::test]
async fn update_person_reports_path_and_body_errors_together() {
    let mut p = person();
    p["age"] = json!(0);
    let body = json!({ "person": p, "location": { "city": "", "state": "J", "country": "M" } });
    let r = send_json(http::Method::PUT, "/person/0", body).await;
    assert_eq!(r.status, 422);
    assert_eq!(
        r.error_locs(),
        vec![
            vec!["path", "person_id"],
            vec!["body", "location", "city"],
            vec!["body", "person", "age"],
        ]
    );
}

// ── login ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_username_and_message_only() {
    let r = post_form("/login", "username=Calamateo&password=x").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!({ "username": "Calamateo", "message": "Login Successfully" }));
    assert!(!String::from_utf8_lossy(&r.body).contains("password"));
}

#[tokio::test]
async fn login_requires_both_fields() {
    let r = post_form("/login", "username=Calamateo").await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body", "password"]]);
}

#[tokio::test]
async fn login_reports_every_bad_field() {
    let r = post_form("/login", "username=ThisUsernameIsWayTooLong").await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body", "password"], vec!["body", "username"]]);
}

// ── contact ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_echoes_user_agent() {
    let req = form("/contact")
        .header("user-agent", "curl/8.5.0")
        .header("cookie", "ads=summer")
        .body(Full::new(Bytes::from_static(
            b"first_name=Ana&last_name=Ruiz&email=ana%40example.com",
        )))
        .unwrap();
    let r = send(&app(), req).await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!("curl/8.5.0"));
}

#[tokio::test]
async fn contact_without_user_agent_is_null() {
    let r = post_form("/contact", "first_name=Ana&last_name=Ruiz&email=ana%40example.com").await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), Value::Null);
}

#[tokio::test]
async fn contact_validates_email_and_name_lengths() {
    let r = post_form(
        "/contact",
        "first_name=AnaMariaGuadalupeLopez&last_name=Ruiz&email=not-an-email",
    )
    .await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body", "email"], vec!["body", "first_name"]]);
}

// ── post_image ────────────────────────────────────────────────────────────────

fn multipart(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--BOUNDARY\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");
    body
}

async fn upload(router: &Router, body: Vec<u8>) -> Reply {
    let req = http::Request::post("/post-image")
        .header("content-type", "multipart/form-data; boundary=BOUNDARY")
        .body(Full::new(Bytes::from(body)))
        .unwrap();
    send(router, req).await
}

#[tokio::test]
async fn post_image_reports_size_in_kilobytes() {
    let r = upload(&app(), multipart("cat.png", "image/png", &[7u8; 2048])).await;
    assert_eq!(r.status, 200);
    assert_eq!(r.json(), json!({ "Filename": "cat.png", "Format": "image/png", "Size(kb)": 2.0 }));
}

#[tokio::test]
async fn post_image_rounds_to_two_decimals() {
    let r = upload(&app(), multipart("a.jpg", "image/jpeg", &[1u8; 1000])).await;
    assert_eq!(r.json()["Size(kb)"], 0.98);
}

#[tokio::test]
async fn post_image_without_file_fails_validation() {
    let req = http::Request::post("/post-image").body(Full::default()).unwrap();
    let r = send(&app(), req).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body", "image"]]);
}

#[tokio::test]
async fn post_image_rejects_plain_form_field() {
    let body = b"--BOUNDARY\r\n\
        Content-Disposition: form-data; name=\"image\"\r\n\r\n\
        not a file\r\n\
        --BOUNDARY--\r\n"
        .to_vec();
    let r = upload(&app(), body).await;
    assert_eq!(r.status, 422);
    assert_eq!(r.error_locs(), vec![vec!["body", "image"]]);
    assert_eq!(r.json()["detail"][0]["msg"], "Expected UploadFile");
}

#[tokio::test]
async fn post_image_over_body_limit_is_413() {
    let router = app().with_body_limit(1024);
    let r = upload(&router, multipart("big.bin", "application/octet-stream", &[0u8; 4096])).await;
    assert_eq!(r.status, 413);
}

// ── routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_and_wrong_method() {
    assert_eq!(get("/nowhere").await.status, 404);
    assert_eq!(get("/login").await.status, 405);
}

#[tokio::test]
async fn health_probes_answer() {
    assert_eq!(get("/healthz").await.body, "ok");
    assert_eq!(get("/readyz").await.body, "ready");
}
