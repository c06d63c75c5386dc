//! Server test utilities.

use crate::common::fixtures::{BOUNDARY, multipart_body, seed_table};
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use portal_core::Table;
use portal_core::config::AppConfig;
use portal_server::{AppState, create_router};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server over a seeded table in a temporary directory.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        let records = portal_records::from_config(&config.paths)
            .await
            .expect("Failed to open record store");
        records
            .save(&seed_table())
            .await
            .expect("Failed to seed stockist table");
        let uploads = portal_storage::from_config(&config.paths)
            .await
            .expect("Failed to open upload store");

        portal_server::metrics::register_metrics();
        let state = AppState::new(config, records, uploads);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    pub fn upload_root(&self) -> &Path {
        &self.state.config.paths.upload_root
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.state.config.paths.scratch_dir.clone()
    }

    pub async fn table(&self) -> Table {
        self.state.records.load().await.expect("Failed to load table")
    }

    /// Replace the stored table, e.g. to add rows the default seed lacks.
    pub async fn seed(&self, table: &Table) {
        self.state
            .records
            .save(table)
            .await
            .expect("Failed to seed stockist table");
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST an urlencoded form. `body` is already encoded.
    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response {
        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart_body(fields, file))).unwrap())
            .await
    }

    /// Sign a regional manager in and return the `Cookie` header value.
    pub async fn login_regional(&self, email: &str) -> String {
        let response = self
            .post_form("/login", None, &format!("email={}", form_encode(email)))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        session_cookie(&response).expect("login should issue a session cookie")
    }

    /// Sign an admin in and return the `Cookie` header value.
    pub async fn login_admin(&self, (email, password): (&str, &str)) -> String {
        let body = format!(
            "email={}&password={}",
            form_encode(email),
            form_encode(password)
        );
        let response = self.post_form("/admin", None, &body).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("admin login should issue a session cookie")
    }

    /// Follow-up page for `cookie`, where queued flashes are rendered.
    pub async fn page(&self, uri: &str, cookie: &str) -> String {
        let response = self.get(uri, Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_string(response).await
    }
}

/// Minimal urlencoding for test values.
pub fn form_encode(value: &str) -> String {
    value.replace('%', "%25").replace('@', "%40").replace(' ', "+").replace('&', "%26")
}

/// `name=value` pair from the `Set-Cookie` header.
#[allow(dead_code)]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[allow(dead_code)]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("body is not UTF-8")
}
