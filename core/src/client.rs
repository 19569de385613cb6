//! Blocking client for the job-posting service.
//!
//! # Design
//! `JobClient` holds a base URL, a default API key and a shared
//! [`Transport`], and never changes after construction, so one client can
//! serve many threads at once. Every operation follows the same path:
//!
//! 1. take the request record by value and fill in the default API key if
//!    the caller left it empty;
//! 2. [`JobClient::send`] it as a JSON POST to `{base_url}?action=<name>`
//!    (or [`JobClient::send_query`] for the anonymous GET path);
//! 3. hand the response to [`decode`] / [`decode_empty`].
//!
//! Requests are built as plain [`HttpRequest`] values first
//! (`build_request`, `build_query_request`), which keeps URL and body
//! construction testable without a server.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::{Error, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{decode, decode_empty};
use crate::transport::{Transport, UreqTransport, DEFAULT_TIMEOUT};
use crate::types::{
    Authenticated, CreateJobRequest, Cursor, DeleteJobRequest, FetchAllJobsRequest,
    FetchJobRequest, FetchJobsByCategoryRequest, FetchJobsByDepartmentRequest, Job, JobPage,
    UpdateJobRequest,
};

/// Value of the `action` query parameter selecting the remote behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Fetch,
    FetchAll,
    FetchByCategory,
    FetchByDepartment,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Fetch => "fetch",
            Action::FetchAll => "fetchAll",
            Action::FetchByCategory => "fetchByCategory",
            Action::FetchByDepartment => "fetchByDepartment",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Endpoint suffix appended to the base URL.
    pub fn endpoint(self) -> String {
        format!("?action={}", self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous client for the job service. Cheap to clone.
#[derive(Clone)]
pub struct JobClient {
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for JobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("JobClient")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .finish_non_exhaustive()
    }
}

/// Configures a [`JobClient`].
pub struct JobClientBuilder {
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl JobClientBuilder {
    /// Key sent with every request whose own `api_key` is empty.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Timeout for the default transport. Ignored when a transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the default `ureq` transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Fails only if the base URL is not an absolute URL.
    pub fn build(self) -> std::result::Result<JobClient, url::ParseError> {
        Url::parse(&self.base_url)?;

        let transport = match self.transport {
            Some(transport) => {
                if self.timeout.is_some() {
                    tracing::debug!("custom transport supplied, ignoring configured timeout");
                }
                transport
            }
            None => Arc::new(UreqTransport::new(self.timeout.unwrap_or(DEFAULT_TIMEOUT))),
        };

        Ok(JobClient {
            base_url: self.base_url,
            api_key: self.api_key,
            transport,
        })
    }
}

impl JobClient {
    /// Client with the default transport and timeout.
    pub fn new(base_url: &str, api_key: &str) -> std::result::Result<Self, url::ParseError> {
        Self::builder(base_url).api_key(api_key).build()
    }

    pub fn builder(base_url: impl Into<String>) -> JobClientBuilder {
        JobClientBuilder {
            base_url: base_url.into(),
            api_key: String::new(),
            timeout: None,
            transport: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Transport primitives
    // -----------------------------------------------------------------------

    /// Build a request to `{base_url}{endpoint}`, with an optional JSON body.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
    ) -> std::result::Result<HttpRequest, TransportError> {
        let (headers, body) = match body {
            Some(body) => {
                let json = serde_json::to_string(body).map_err(TransportError::Serialize)?;
                (
                    vec![("content-type".to_string(), "application/json".to_string())],
                    Some(json),
                )
            }
            None => (Vec::new(), None),
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body,
        })
    }

    /// Build a GET request to `{base_url}{endpoint}` with `params` merged
    /// into the query string. Empty values are left out; the query is
    /// encoded in key order.
    pub fn build_query_request<'a>(
        &self,
        endpoint: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> std::result::Result<HttpRequest, TransportError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;

        let mut query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        for (key, value) in params {
            if value.is_empty() {
                continue;
            }
            query.insert(key.to_string(), value.to_string());
        }

        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&query);
        }

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    /// Build and dispatch a request. The response is returned undecoded.
    pub fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let request = self.build_request(method, endpoint, body)?;
        self.dispatch(request)
    }

    /// Build and dispatch a query-parameter GET. See [`Self::build_query_request`].
    pub fn send_query<'a>(
        &self,
        endpoint: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let request = self.build_query_request(endpoint, params)?;
        self.dispatch(request)
    }

    fn dispatch(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// Fill in the default API key if the request carries none.
    fn inject_default_key<R: Authenticated>(&self, request: &mut R) {
        let api_key = request.api_key_mut();
        if api_key.is_empty() {
            api_key.clone_from(&self.api_key);
        }
    }

    /// Shared path of every authenticated operation.
    fn post<R>(&self, action: Action, mut request: R, context: &'static str) -> Result<HttpResponse>
    where
        R: Authenticated + Serialize,
    {
        self.inject_default_key(&mut request);
        self.send(HttpMethod::Post, &action.endpoint(), Some(&request))
            .map_err(Error::transport(context))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn create_job(&self, request: CreateJobRequest) -> Result<Job> {
        decode(self.post(Action::Create, request, "failed to create job")?)
    }

    pub fn fetch_job(&self, request: FetchJobRequest) -> Result<Job> {
        decode(self.post(Action::Fetch, request, "failed to fetch job")?)
    }

    pub fn fetch_all_jobs(&self, request: FetchAllJobsRequest) -> Result<JobPage> {
        decode(self.post(Action::FetchAll, request, "failed to fetch all jobs")?)
    }

    pub fn fetch_jobs_by_category(&self, request: FetchJobsByCategoryRequest) -> Result<JobPage> {
        decode(self.post(Action::FetchByCategory, request, "failed to fetch jobs by category")?)
    }

    /// Anonymous variant of [`Self::fetch_jobs_by_category`] over GET with
    /// query parameters. No API key is sent.
    pub fn fetch_jobs_by_category_public(
        &self,
        category: &str,
        cursor: Option<&Cursor>,
    ) -> Result<JobPage> {
        let (last_partition_key, last_range_key) = cursor
            .map(|c| (c.last_partition_key.as_str(), c.last_range_key.as_str()))
            .unwrap_or_default();
        let params = [
            ("category", category),
            ("last_partition_key", last_partition_key),
            ("last_range_key", last_range_key),
        ];
        let response = self
            .send_query(&Action::FetchByCategory.endpoint(), params)
            .map_err(Error::transport("failed to fetch jobs by category (public)"))?;
        decode(response)
    }

    pub fn fetch_jobs_by_department(
        &self,
        request: FetchJobsByDepartmentRequest,
    ) -> Result<JobPage> {
        decode(self.post(
            Action::FetchByDepartment,
            request,
            "failed to fetch jobs by department",
        )?)
    }

    /// Replace a stored job. The service answers whether it applied.
    pub fn update_job(&self, request: UpdateJobRequest) -> Result<bool> {
        decode(self.post(Action::Update, request, "failed to update job")?)
    }

    pub fn delete_job(&self, request: DeleteJobRequest) -> Result<()> {
        decode_empty(self.post(Action::Delete, request, "failed to delete job")?)
    }

    // -----------------------------------------------------------------------
    // Shortcuts
    // -----------------------------------------------------------------------

    /// Create a job from the handful of fields most postings need.
    pub fn create_job_simple(
        &self,
        account_id: &str,
        user_id: &str,
        title: &str,
        description: &str,
        category: &str,
        department: &str,
    ) -> Result<Job> {
        self.create_job(CreateJobRequest {
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            department: department.to_string(),
            ..CreateJobRequest::default()
        })
    }

    pub fn fetch_job_by_key(&self, partition_key: &str, range_key: &str) -> Result<Job> {
        self.fetch_job(FetchJobRequest::new(partition_key, range_key))
    }

    pub fn delete_job_by_key(&self, partition_key: &str, range_key: &str) -> Result<()> {
        self.delete_job(DeleteJobRequest::new(partition_key, range_key))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    const BASE_URL: &str = "http://localhost:3000/jobs";

    /// Records every request and answers from a queue (default: `200 true`).
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<HttpResponse>>,
    }

    impl Recording {
        fn respond(&self, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(HttpResponse::new(status, body));
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request sent")
        }

        fn last_body(&self) -> serde_json::Value {
            serde_json::from_str(self.last().body.as_deref().expect("no body")).unwrap()
        }
    }

    impl Transport for Recording {
        fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| HttpResponse::new(200, "true")))
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn execute(&self, _: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            Err(TransportError::Other("connection refused".into()))
        }
    }

    fn client_with(api_key: &str) -> (JobClient, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        let client = JobClient::builder(BASE_URL)
            .api_key(api_key)
            .transport(Arc::clone(&recording))
            .build()
            .unwrap();
        (client, recording)
    }

    #[test]
    fn empty_key_is_replaced_by_default() {
        let (client, recording) = client_with("default-key");
        recording.respond(200, r#"{"partition_key":"acct","range_key":"01","title":"T"}"#);

        let job = client
            .create_job(CreateJobRequest {
                title: "T".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(job.title, "T");
        assert_eq!(recording.last_body()["api_key"], "default-key");
    }

    #[test]
    fn explicit_key_is_sent_unchanged() {
        let (client, recording) = client_with("default-key");
        let request = UpdateJobRequest {
            api_key: "caller-key".into(),
            ..UpdateJobRequest::new(Job::default(), "user-1")
        };

        assert!(client.update_job(request).unwrap());
        assert_eq!(recording.last_body()["api_key"], "caller-key");
        assert_eq!(recording.last_body()["user_id"], "user-1");
    }

    #[test]
    fn operations_post_to_their_action() {
        let (client, recording) = client_with("k");
        let page = r#"{"results":[],"last_partition_key":null,"last_range_key":null}"#;

        recording.respond(200, page);
        client.fetch_all_jobs(FetchAllJobsRequest::new("acct")).unwrap();
        assert_eq!(recording.last().url, format!("{BASE_URL}?action=fetchAll"));

        recording.respond(200, page);
        client
            .fetch_jobs_by_category(FetchJobsByCategoryRequest::new("Design"))
            .unwrap();
        assert_eq!(recording.last().url, format!("{BASE_URL}?action=fetchByCategory"));
        assert_eq!(recording.last_body()["category"], "Design");

        recording.respond(200, page);
        client
            .fetch_jobs_by_department(FetchJobsByDepartmentRequest::new("Engineering"))
            .unwrap();
        assert_eq!(recording.last().url, format!("{BASE_URL}?action=fetchByDepartment"));

        recording.respond(204, "");
        client.delete_job_by_key("acct", "01").unwrap();
        let request = recording.last();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, format!("{BASE_URL}?action=delete"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(recording.last_body()["partition_key"], "acct");
        assert_eq!(recording.last_body()["api_key"], "k");
    }

    #[test]
    fn shortcuts_use_default_key() {
        let (client, recording) = client_with("default-key");
        recording.respond(200, r#"{"title":"Rust dev"}"#);

        client
            .create_job_simple("acct", "user", "Rust dev", "Write Rust", "Software", "Engineering")
            .unwrap();

        let body = recording.last_body();
        assert_eq!(body["account_id"], "acct");
        assert_eq!(body["department"], "Engineering");
        assert_eq!(body["api_key"], "default-key");
    }

    #[test]
    fn public_category_fetch_uses_get_with_query() {
        let (client, recording) = client_with("secret");
        recording.respond(200, r#"{"results":[]}"#);

        let cursor = Cursor::new("acct 1", "0009");
        client
            .fetch_jobs_by_category_public("Software Development", Some(&cursor))
            .unwrap();

        let request = recording.last();
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
        assert_eq!(
            request.url,
            "http://localhost:3000/jobs?action=fetchByCategory&category=Software+Development\
             &last_partition_key=acct+1&last_range_key=0009"
        );
        assert!(!request.url.contains("secret"));
    }

    #[test]
    fn public_category_fetch_without_cursor_omits_it() {
        let (client, recording) = client_with("k");
        recording.respond(200, r#"{"results":[]}"#);

        client.fetch_jobs_by_category_public("Design", None).unwrap();

        assert_eq!(
            recording.last().url,
            "http://localhost:3000/jobs?action=fetchByCategory&category=Design"
        );
    }

    #[test]
    fn query_params_with_empty_values_are_dropped() {
        let (client, _) = client_with("k");

        let request = client
            .build_query_request("?action=fetchByCategory", [("category", ""), ("last_range_key", "")])
            .unwrap();
        assert_eq!(request.url, "http://localhost:3000/jobs?action=fetchByCategory");

        let request = client
            .build_query_request("?action=fetchByCategory", [("b", "2"), ("a", ""), ("c", "3")])
            .unwrap();
        assert_eq!(request.url, "http://localhost:3000/jobs?action=fetchByCategory&b=2&c=3");
    }

    #[test]
    fn build_request_without_body_has_no_content_type() {
        let (client, _) = client_with("k");
        let request = client
            .build_request::<()>(HttpMethod::Post, "?action=fetch", None)
            .unwrap();
        assert!(request.body.is_none());
        assert!(request.header("content-type").is_none());
    }

    #[test]
    fn transport_failure_carries_context() {
        let client = JobClient::builder(BASE_URL)
            .transport(Unreachable)
            .build()
            .unwrap();

        let err = client.fetch_job_by_key("acct", "01").unwrap_err();
        assert!(matches!(err, Error::Transport { context: "failed to fetch job", .. }));
        assert_eq!(err.to_string(), "failed to fetch job: connection refused");
    }

    #[test]
    fn api_error_is_not_wrapped() {
        let (client, recording) = client_with("k");
        recording.respond(401, r#"{"status_code":0,"message":"invalid api key"}"#);

        let err = client.fetch_job_by_key("acct", "01").unwrap_err();
        let api = err.as_api().expect("api error");
        assert_eq!(api.status_code(), 401);
        assert_eq!(api.message(), "invalid api key");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(JobClient::new("", "k").is_err());
        assert!(JobClient::new("not a url", "k").is_err());
        assert!(JobClient::new("https://jobs.example.com/", "k").is_ok());
    }

    #[test]
    fn debug_hides_api_key() {
        let (client, _) = client_with("super-secret");
        let debug = format!("{client:?}");
        assert!(debug.contains(BASE_URL));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<JobClient>();
    }
}
