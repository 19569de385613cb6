//! In-memory stand-in for the job-posting service.
//!
//! One route, `/`, dispatches on the `action` query parameter. POST bodies
//! are JSON and must carry the configured `api_key`; the only GET action is
//! the anonymous `fetchByCategory`. Jobs are kept ordered by
//! `(partition_key, range_key)` so paged scans resume exactly after a
//! cursor.

use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub partition_key: String,
    pub range_key: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: String,
    pub location: String,
    pub job_type: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub requirements: String,
    pub responsibilities: String,
    pub benefits: String,
    pub status: String,
    pub posted_by: String,
    pub application_deadline: String,
    pub experience_level: String,
    pub remote_allowed: bool,
    pub application_count: i64,
    pub view_count: i64,
    pub created: String,
    pub modified: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub results: Vec<Job>,
    pub last_partition_key: Option<String>,
    pub last_range_key: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateJob {
    pub account_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub department: String,
    pub category: String,
    pub location: String,
    pub job_type: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub requirements: String,
    pub responsibilities: String,
    pub benefits: String,
    pub posted_by: String,
    pub application_deadline: String,
    pub experience_level: String,
    pub remote_allowed: bool,
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub api_key: String,
    pub partition_key: String,
    pub range_key: String,
}

#[derive(Deserialize)]
pub struct UpdateJob {
    pub job: Job,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
}

/// Shared shape of the paged POST scans; only the filter field differs.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ScanRequest {
    pub account_id: String,
    pub category: String,
    pub department: String,
    pub last_partition_key: Option<String>,
    pub last_range_key: Option<String>,
    pub limit: Option<usize>,
    pub api_key: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ActionQuery {
    pub action: String,
    pub category: String,
    pub last_partition_key: Option<String>,
    pub last_range_key: Option<String>,
    pub limit: Option<usize>,
}

/// Error answer. `Api` uses the service's JSON error envelope, `Plain` a
/// bare text body.
#[derive(Debug)]
pub enum Failure {
    Api(StatusCode, String),
    Plain(StatusCode, String),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::Api(status, message) => (
                status,
                Json(json!({ "status_code": status.as_u16(), "message": message })),
            )
                .into_response(),
            Failure::Plain(status, message) => (status, message).into_response(),
        }
    }
}

#[derive(Default)]
pub struct Store {
    jobs: BTreeMap<(String, String), Job>,
    next_seq: u64,
}

impl Store {
    fn insert(&mut self, input: CreateJob) -> Job {
        self.next_seq += 1;
        let now = chrono::Utc::now().to_rfc3339();
        let posted_by = if input.posted_by.is_empty() {
            input.user_id
        } else {
            input.posted_by
        };
        let job = Job {
            partition_key: input.account_id,
            range_key: format!("{:012}-{}", self.next_seq, Uuid::new_v4().simple()),
            title: input.title,
            description: input.description,
            category: input.category,
            department: input.department,
            location: input.location,
            job_type: input.job_type,
            salary_min: input.salary_min,
            salary_max: input.salary_max,
            requirements: input.requirements,
            responsibilities: input.responsibilities,
            benefits: input.benefits,
            status: "active".to_string(),
            posted_by,
            application_deadline: input.application_deadline,
            experience_level: input.experience_level,
            remote_allowed: input.remote_allowed,
            application_count: 0,
            view_count: 0,
            created: now.clone(),
            modified: now,
        };
        self.jobs
            .insert((job.partition_key.clone(), job.range_key.clone()), job.clone());
        job
    }

    fn get(&self, partition_key: &str, range_key: &str) -> Option<&Job> {
        self.jobs
            .get(&(partition_key.to_string(), range_key.to_string()))
    }

    /// Replace the editable fields of a stored job. The key, creation time
    /// and counters stay as stored.
    fn replace(&mut self, job: Job) -> bool {
        let Some(stored) = self
            .jobs
            .get_mut(&(job.partition_key.clone(), job.range_key.clone()))
        else {
            return false;
        };
        let Job {
            partition_key,
            range_key,
            created,
            application_count,
            view_count,
            ..
        } = std::mem::take(stored);
        *stored = Job {
            partition_key,
            range_key,
            created,
            application_count,
            view_count,
            modified: chrono::Utc::now().to_rfc3339(),
            ..job
        };
        true
    }

    fn remove(&mut self, partition_key: &str, range_key: &str) -> bool {
        self.jobs
            .remove(&(partition_key.to_string(), range_key.to_string()))
            .is_some()
    }

    /// Jobs matching `filter` strictly after `after`, at most `limit` of
    /// them. The cursor is set only when more matches remain.
    pub fn scan(
        &self,
        filter: impl Fn(&Job) -> bool,
        after: Option<(String, String)>,
        limit: usize,
    ) -> Page {
        let start = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let mut matches = self
            .jobs
            .range((start, Bound::Unbounded))
            .map(|(_, job)| job)
            .filter(|job| filter(job));

        let results: Vec<Job> = matches.by_ref().take(limit).cloned().collect();
        let more = matches.next().is_some();

        let (last_partition_key, last_range_key) = match results.last() {
            Some(last) if more => (Some(last.partition_key.clone()), Some(last.range_key.clone())),
            _ => (None, None),
        };
        Page {
            results,
            last_partition_key,
            last_range_key,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    api_key: Arc<str>,
}

impl AppState {
    fn authorize(&self, api_key: &str) -> Result<(), Failure> {
        if api_key == &*self.api_key {
            Ok(())
        } else {
            Err(Failure::Api(StatusCode::UNAUTHORIZED, "invalid api key".to_string()))
        }
    }
}

pub fn app(api_key: impl Into<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        api_key: Arc::from(api_key.into()),
    };
    Router::new()
        .route("/", get(public_dispatch).post(dispatch))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Failure> {
    serde_json::from_slice(body)
        .map_err(|e| Failure::Api(StatusCode::BAD_REQUEST, format!("invalid request body: {e}")))
}

fn cursor(
    partition: Option<String>,
    range: Option<String>,
) -> Result<Option<(String, String)>, Failure> {
    let partition = partition.filter(|s| !s.is_empty());
    let range = range.filter(|s| !s.is_empty());
    match (partition, range) {
        (Some(p), Some(r)) => Ok(Some((p, r))),
        (None, None) => Ok(None),
        _ => Err(Failure::Api(
            StatusCode::BAD_REQUEST,
            "last_partition_key and last_range_key must be given together".to_string(),
        )),
    }
}

fn page_size(limit: Option<usize>) -> usize {
    match limit {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(n) => n,
    }
}

fn not_found() -> Failure {
    Failure::Api(StatusCode::NOT_FOUND, "job not found".to_string())
}

async fn dispatch(
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> Result<Response, Failure> {
    tracing::debug!(action = %query.action, bytes = body.len(), "request");
    match query.action.as_str() {
        "create" => {
            let input: CreateJob = parse(&body)?;
            state.authorize(&input.api_key)?;
            let job = state.db.write().await.insert(input);
            tracing::info!(partition_key = %job.partition_key, range_key = %job.range_key, "job created");
            Ok(Json(job).into_response())
        }
        "fetch" => {
            let input: KeyRequest = parse(&body)?;
            state.authorize(&input.api_key)?;
            let db = state.db.read().await;
            let job = db.get(&input.partition_key, &input.range_key).ok_or_else(not_found)?;
            Ok(Json(job.clone()).into_response())
        }
        "update" => {
            let input: UpdateJob = parse(&body)?;
            state.authorize(&input.api_key)?;
            if !state.db.write().await.replace(input.job) {
                return Err(not_found());
            }
            tracing::info!(user_id = %input.user_id, "job updated");
            Ok(Json(true).into_response())
        }
        "delete" => {
            let input: KeyRequest = parse(&body)?;
            state.authorize(&input.api_key)?;
            if !state.db.write().await.remove(&input.partition_key, &input.range_key) {
                return Err(not_found());
            }
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        "fetchAll" | "fetchByCategory" | "fetchByDepartment" => {
            let input: ScanRequest = parse(&body)?;
            state.authorize(&input.api_key)?;
            let after = cursor(input.last_partition_key, input.last_range_key)?;
            let limit = page_size(input.limit);
            let account = input.account_id;
            let by_account = move |job: &Job| account.is_empty() || job.partition_key == account;

            let db = state.db.read().await;
            let page = match query.action.as_str() {
                "fetchAll" => db.scan(by_account, after, limit),
                "fetchByCategory" => {
                    let category = input.category;
                    db.scan(|job| job.category == category && by_account(job), after, limit)
                }
                _ => {
                    let department = input.department;
                    db.scan(|job| job.department == department && by_account(job), after, limit)
                }
            };
            Ok(Json(page).into_response())
        }
        other => Err(Failure::Plain(
            StatusCode::BAD_REQUEST,
            format!("unknown action: {other}"),
        )),
    }
}

async fn public_dispatch(
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
) -> Result<Json<Page>, Failure> {
    if query.action != "fetchByCategory" {
        return Err(Failure::Plain(
            StatusCode::BAD_REQUEST,
            format!("unknown action: {}", query.action),
        ));
    }
    let after = cursor(query.last_partition_key, query.last_range_key)?;
    let category = query.category;
    let db = state.db.read().await;
    Ok(Json(db.scan(
        |job| job.category == category,
        after,
        page_size(query.limit),
    )))
}
