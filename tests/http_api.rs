use std::error::Error;
use std::fs;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use opsdeck::config::Config;
use opsdeck::http;
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn Error>>;

async fn get(config: Config, uri: &str) -> Result<axum::response::Response, Box<dyn Error>> {
    let app = http::router(config);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    Ok(response)
}

#[tokio::test]
async fn index_serves_the_operator_page() -> TestResult {
    let response = get(Config::default(), "/").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await?.to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("opsdeck"));
    Ok(())
}

#[tokio::test]
async fn deploy_without_params_is_bad_request() -> TestResult {
    let response = get(Config::default(), "/api/deploy").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deploy_with_missing_script_is_bad_request() -> TestResult {
    let response = get(
        Config::default(),
        "/api/deploy?project_id=demo&script=/definitely/missing.sh",
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn commit_on_non_repo_is_bad_request() -> TestResult {
    let dir = tempfile::tempdir()?;
    let uri = format!("/api/commit?repo={}", dir.path().display());
    let response = get(Config::default(), &uri).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn convert_rejects_suspicious_target_format() -> TestResult {
    let input = tempfile::NamedTempFile::new()?;
    let uri = format!("/api/convert?input={}&to=a.b", input.path().display());
    let response = get(Config::default(), &uri).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn repos_endpoint_lists_git_checkouts() -> TestResult {
    let root = tempfile::tempdir()?;
    fs::create_dir_all(root.path().join("alpha/.git"))?;
    fs::create_dir_all(root.path().join("beta"))?;
    fs::create_dir_all(root.path().join("gamma/.git"))?;

    let mut config = Config::default();
    config.repos.root = root.path().to_path_buf();

    let response = get(config, "/api/repos").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await?.to_bytes();
    let repos: serde_json::Value = serde_json::from_slice(&body)?;
    let names: Vec<&str> = repos
        .as_array()
        .expect("json array")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["alpha", "gamma"]);
    Ok(())
}

#[tokio::test]
async fn deploy_streams_output_and_terminal_done() -> TestResult {
    let dir = tempfile::tempdir()?;
    let script = dir.path().join("deploy.sh");
    fs::write(&script, "#!/bin/sh\necho deploy-ok\n")?;

    let uri = format!(
        "/api/deploy?project_id=demo&script={}",
        script.display()
    );
    let response = get(Config::default(), &uri).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    // The stream is finite; it closes after the terminal event.
    let body = response.into_body().collect().await?.to_bytes();
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("deploy-ok"));
    assert!(body.contains(r#""type":"done""#));
    assert!(body.contains(r#""code":0"#));
    Ok(())
}
