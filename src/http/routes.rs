// src/http/routes.rs

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::model::Config;
use crate::engine::{self, workflows};
use crate::exec::{self, Operation};
use crate::http::fsops;
use crate::stream::session;

/// Shared state for all handlers: just the immutable config.
pub struct AppState {
    pub config: Config,
}

/// Build the opsdeck route table.
pub fn router(config: Config) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/", get(index))
        .route("/api/repos", get(list_repos))
        .route("/api/deploy", get(deploy))
        .route("/api/commit", get(commit))
        .route("/api/merge", get(merge))
        .route("/api/convert", get(convert))
        .with_state(state)
}

/// Operator page, embedded at compile time.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

async fn list_repos(State(state): State<Arc<AppState>>) -> Response {
    match fsops::scan_repos(&state.config.repos.root).await {
        Ok(repos) => Json(repos).into_response(),
        Err(err) => server_error(format!("failed to scan repositories: {err:#}")),
    }
}

#[derive(Debug, Deserialize)]
struct DeployQuery {
    project_id: String,
    script: String,
}

/// Run a deploy script and stream its output.
///
/// The script is made executable if it is not already, and its working
/// directory is derived from its path (see [`fsops::deploy_cwd`]).
async fn deploy(State(state): State<Arc<AppState>>, Query(q): Query<DeployQuery>) -> Response {
    let script = PathBuf::from(&q.script);
    if !script.is_file() {
        return bad_request(format!("script not found: {}", script.display()));
    }
    if let Err(err) = fsops::ensure_executable(&script) {
        return server_error(format!("failed to set execute permission: {err:#}"));
    }

    let cwd = fsops::deploy_cwd(&script, state.config.deploy.cwd_marker.as_deref());
    info!(
        script = %script.display(),
        cwd = %cwd.display(),
        project_id = %q.project_id,
        "deploy requested"
    );

    let operation = Operation::new("bash")
        .arg(q.script)
        .arg("--project-id")
        .arg(q.project_id)
        .arg("--yes")
        .current_dir(cwd);

    session::sse_response(exec::spawn_operation(operation)).into_response()
}

#[derive(Debug, Deserialize)]
struct CommitQuery {
    repo: String,
}

/// Run the assistant CLI in a repository to generate a commit, streaming
/// its output. Configured env overrides apply to the child only.
async fn commit(State(state): State<Arc<AppState>>, Query(q): Query<CommitQuery>) -> Response {
    let repo = PathBuf::from(&q.repo);
    if !fsops::is_git_repo(&repo) {
        return bad_request(format!("not a git repository: {}", repo.display()));
    }

    let assistant = &state.config.assistant;
    info!(repo = %repo.display(), bin = %assistant.bin, "commit generation requested");

    let mut operation = Operation::new(assistant.bin.clone())
        .args(assistant.args.iter().cloned())
        .current_dir(&repo);
    for (key, value) in &assistant.env {
        operation = operation.env(key.clone(), value.clone());
    }
    for key in &assistant.clear_env {
        operation = operation.env_remove(key.clone());
    }

    session::sse_response(exec::spawn_operation(operation)).into_response()
}

#[derive(Debug, Deserialize)]
struct MergeQuery {
    repo: String,
    target: String,
}

/// Merge the repo's current branch into `target` and push, streaming every
/// step. Fail-fast: a failed step stops the sequence, and the cleanup step
/// returns the checkout to the original branch either way.
///
/// Not safe to run concurrently with another session against the same
/// checkout; serializing such calls is the caller's responsibility.
async fn merge(State(state): State<Arc<AppState>>, Query(q): Query<MergeQuery>) -> Response {
    let repo = PathBuf::from(&q.repo);
    if !fsops::is_git_repo(&repo) {
        return bad_request(format!("not a git repository: {}", repo.display()));
    }

    let current = match fsops::current_branch(&repo).await {
        Ok(branch) => branch,
        Err(err) => {
            warn!(repo = %repo.display(), error = %err, "could not resolve current branch");
            return server_error(format!("failed to resolve current branch: {err:#}"));
        }
    };
    if current == q.target {
        return bad_request(format!("already on target branch '{}'", q.target));
    }

    info!(repo = %repo.display(), current = %current, target = %q.target, "merge requested");

    let workflow = workflows::merge_into(&repo, &current, &q.target);
    session::sse_response(engine::spawn_workflow(workflow)).into_response()
}

#[derive(Debug, Deserialize)]
struct ConvertQuery {
    input: String,
    /// Target extension, e.g. `webp`.
    to: String,
}

/// Convert an image via the configured converter binary, streaming its
/// output. The result lands next to the input with the new extension.
async fn convert(State(state): State<Arc<AppState>>, Query(q): Query<ConvertQuery>) -> Response {
    let input = PathBuf::from(&q.input);
    if !input.is_file() {
        return bad_request(format!("input not found: {}", input.display()));
    }
    if q.to.is_empty() || !q.to.chars().all(|c| c.is_ascii_alphanumeric()) {
        return bad_request(format!("invalid target format '{}'", q.to));
    }

    let output = input.with_extension(&q.to);
    info!(input = %input.display(), output = %output.display(), "conversion requested");

    let operation = Operation::new(state.config.convert.bin.clone())
        .arg(input.to_string_lossy().into_owned())
        .arg(output.to_string_lossy().into_owned());

    session::sse_response(exec::spawn_operation(operation)).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, message.into()).into_response()
}

fn server_error(message: impl Into<String>) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message.into()).into_response()
}
