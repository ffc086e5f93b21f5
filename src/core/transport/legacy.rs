//! Legacy editor endpoint.
//!
//! The rtorrent and ruTorrent configuration editors talk to
//! `/cgi-bin/conf/{editor}` with `ajax`, `action`, `file` and `content`
//! parameters and expect the JSON reply wrapped in an HTML fragment. Query
//! parameters and an urlencoded request body are both accepted; body values
//! win when a key appears in both.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use http::StatusCode;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::domains::files::{FileError, FileOutcome, FileRequest, FileService};

/// Editors served by the legacy endpoint.
pub const EDITORS: [&str; 2] = ["rtorrent", "rutorrent"];

/// Route pattern of the legacy endpoint.
pub const ROUTE: &str = "/cgi-bin/conf/{editor}";

/// Build the legacy router for the given file service.
pub fn router(files: Arc<FileService>) -> Router {
    Router::new()
        .route(ROUTE, get(handle_editor).post(handle_editor))
        .with_state(files)
}

/// Wrap a JSON value in the HTML fragment the editors scrape.
///
/// The fragment starts with a literal header line, hides the box with an
/// inline style and embeds the pretty-printed JSON below its own
/// `Content-Type` line.
pub fn wrap_json_response(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

    format!(
        "Content-Type: text/html; charset=UTF-8\n\n\
         <style>\n.ajax-json-box {{ display: none; }}\n</style>\n\
         <div class=\"ajax-json-box\"><div class=\"ajax-json-content\"><pre>\
         Content-Type: application/json\n\n{}\n</pre></div></div>",
        pretty
    )
}

/// JSON body for a successful outcome.
pub fn outcome_json(outcome: &FileOutcome) -> Value {
    match outcome {
        FileOutcome::Read(read) => json!({
            "success": true,
            "content": read.content,
            "file": read.file,
        }),
        FileOutcome::Written(written) => {
            let mut body = json!({
                "success": true,
                "file": written.file,
            });
            if let Some(backup) = &written.backup {
                body["backup"] = json!(backup);
            }
            body
        }
    }
}

/// JSON body for a failed request.
pub fn error_json(err: &FileError) -> Value {
    json!({ "error": err.to_string() })
}

async fn handle_editor(
    State(files): State<Arc<FileService>>,
    Path(editor): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    if !EDITORS.contains(&editor.as_str()) {
        debug!("Unknown editor requested: {}", editor);
        return StatusCode::NOT_FOUND.into_response();
    }

    let params = match merge_params(query.as_deref(), &body) {
        Ok(params) => params,
        Err(e) => {
            warn!("Malformed {} editor parameters: {}", editor, e);
            return (StatusCode::BAD_REQUEST, "Malformed request parameters").into_response();
        }
    };

    if params.get("ajax").map(String::as_str) != Some("1") {
        return (StatusCode::BAD_REQUEST, "Not AJAX request").into_response();
    }

    let request = FileRequest::from_params(
        params.get("action").map(String::as_str),
        params.get("file").map(String::as_str),
        params.get("content").map(String::as_str),
    );

    let body = match request {
        Ok(request) => {
            info!("{} editor: {} {}", editor, request.action(), request.file());
            run_request(files, request).await
        }
        Err(e) => error_json(&FileError::from(e)),
    };

    Html(wrap_json_response(&body)).into_response()
}

async fn run_request(files: Arc<FileService>, request: FileRequest) -> Value {
    let joined = tokio::task::spawn_blocking(move || files.handle(&request)).await;

    match joined {
        Ok(Ok(outcome)) => outcome_json(&outcome),
        Ok(Err(e)) => error_json(&e),
        Err(e) => {
            error!("File operation task failed: {}", e);
            json!({ "error": "Internal server error" })
        }
    }
}

fn merge_params(
    query: Option<&str>,
    body: &[u8],
) -> Result<HashMap<String, String>, serde_urlencoded::de::Error> {
    let mut params: HashMap<String, String> = match query {
        Some(query) => serde_urlencoded::from_str(query)?,
        None => HashMap::new(),
    };

    if !body.is_empty() {
        let form: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        params.extend(form);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::AccessPolicy;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router_for(root: &std::path::Path) -> Router {
        let policy = AccessPolicy::new(
            [root],
            [".conf"],
            Some(".rtorrent.rc".to_string()),
            64,
            true,
        );
        router(Arc::new(FileService::new(Arc::new(policy))))
    }

    fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        tokio_test::block_on(async {
            let response = app.oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        })
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, form: &[(&str, &str)]) -> Request<Body> {
        let body = serde_urlencoded::to_string(form).unwrap();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    /// Pull the embedded JSON back out of the HTML fragment.
    fn embedded_json(html: &str) -> Value {
        let start = html.find("application/json\n\n").unwrap() + "application/json\n\n".len();
        let end = html.rfind("\n</pre>").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_wrap_json_response_format() {
        let html = wrap_json_response(&json!({ "error": "Access denied: /etc/x.conf" }));

        assert!(html.starts_with("Content-Type: text/html; charset=UTF-8\n\n<style>\n"));
        assert!(html.contains(".ajax-json-box { display: none; }"));
        assert!(html.contains(
            "<div class=\"ajax-json-box\"><div class=\"ajax-json-content\"><pre>Content-Type: application/json\n\n{\n"
        ));
        assert!(html.ends_with("}\n</pre></div></div>"));
        assert_eq!(embedded_json(&html)["error"], "Access denied: /etc/x.conf");
    }

    #[test]
    fn test_read_via_query_string() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("app.conf");
        fs::write(&file, "a=1\n").unwrap();

        let uri = format!(
            "/cgi-bin/conf/rtorrent?ajax=1&action=read_file&file={}",
            file.display()
        );
        let (status, html) = send(router_for(temp_dir.path()), get(&uri));

        assert_eq!(status, StatusCode::OK);
        let body = embedded_json(&html);
        assert_eq!(body["success"], true);
        assert_eq!(body["content"], "a=1\n");
        assert_eq!(body["file"], file.display().to_string());
    }

    #[test]
    fn test_write_via_form_body_reports_backup() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("app.conf");
        fs::write(&file, "old").unwrap();
        let file_str = file.display().to_string();

        let request = post_form(
            "/cgi-bin/conf/rutorrent",
            &[
                ("ajax", "1"),
                ("action", "write_file"),
                ("file", &file_str),
                ("content", "new"),
            ],
        );
        let (status, html) = send(router_for(temp_dir.path()), request);

        assert_eq!(status, StatusCode::OK);
        let body = embedded_json(&html);
        assert_eq!(body["success"], true);
        assert!(body["backup"].as_str().unwrap().starts_with("app.conf."));
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
    }

    #[test]
    fn test_body_overrides_query() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("app.conf");
        fs::write(&file, "kept").unwrap();
        let file_str = file.display().to_string();

        let uri = "/cgi-bin/conf/rtorrent?ajax=0&action=write_file";
        let request = post_form(uri, &[("ajax", "1"), ("action", "read_file"), ("file", &file_str)]);
        let (_, html) = send(router_for(temp_dir.path()), request);

        assert_eq!(embedded_json(&html)["content"], "kept");
    }

    #[test]
    fn test_not_ajax_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (status, body) = send(
            router_for(temp_dir.path()),
            get("/cgi-bin/conf/rtorrent?action=read_file&file=/tmp/a.conf"),
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Not AJAX request");
    }

    #[test]
    fn test_unknown_editor_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let (status, _) = send(
            router_for(temp_dir.path()),
            get("/cgi-bin/conf/transmission?ajax=1"),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_guard_and_request_errors_are_wrapped() {
        let temp_dir = TempDir::new().unwrap();

        let (status, html) = send(
            router_for(temp_dir.path()),
            get("/cgi-bin/conf/rtorrent?ajax=1&action=read_file&file=/tmp/../etc/passwd"),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(embedded_json(&html)["error"], "Directory traversal not allowed");

        let (_, html) = send(
            router_for(temp_dir.path()),
            get("/cgi-bin/conf/rtorrent?ajax=1&action=delete_file&file=/tmp/a.conf"),
        );
        assert_eq!(embedded_json(&html)["error"], "Unknown action: delete_file");

        let (_, html) = send(
            router_for(temp_dir.path()),
            get("/cgi-bin/conf/rtorrent?ajax=1&action=read_file"),
        );
        assert_eq!(embedded_json(&html)["error"], "Missing file parameter");
    }

    #[test]
    fn test_write_without_backup_omits_field() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("fresh.conf");
        let outcome = FileOutcome::Written(crate::domains::files::WriteOutcome {
            file: file.display().to_string(),
            written: true,
            backup: None,
        });

        let body = outcome_json(&outcome);
        assert_eq!(body["success"], true);
        assert!(body.get("backup").is_none());
    }
}
