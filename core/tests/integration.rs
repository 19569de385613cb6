//! Client operations against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port (fresh store), then
//! drives `JobClient` over real HTTP through the default `ureq` transport.

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use job_core::{
    CreateJobRequest, Error, FetchAllJobsRequest, FetchJobsByCategoryRequest,
    FetchJobsByDepartmentRequest, HttpMethod, JobClient, UpdateJobRequest,
};

const API_KEY: &str = "integration-key";

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, API_KEY).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

fn client() -> JobClient {
    JobClient::new(&start_server(), API_KEY).unwrap()
}

fn posting(account_id: &str, title: &str, category: &str, department: &str) -> CreateJobRequest {
    CreateJobRequest {
        account_id: account_id.to_string(),
        user_id: "user-1".to_string(),
        title: title.to_string(),
        category: category.to_string(),
        department: department.to_string(),
        salary_min: 80_000,
        salary_max: 120_000,
        remote_allowed: true,
        ..Default::default()
    }
}

#[test]
fn crud_lifecycle() {
    let client = client();

    // Step 1: create.
    let created = client.create_job(posting("acct-1", "T", "Software", "Engineering")).unwrap();
    assert_eq!(created.title, "T");
    assert_eq!(created.partition_key, "acct-1");
    assert!(!created.range_key.is_empty());
    assert_eq!(created.salary_max, 120_000);
    assert!(created.remote_allowed);

    // Step 2: fetch by the returned key.
    let fetched = client
        .fetch_job_by_key(&created.partition_key, &created.range_key)
        .unwrap();
    assert_eq!(fetched, created);

    // Step 3: update the title.
    let mut edited = fetched.clone();
    edited.title = "T (Updated)".to_string();
    edited.salary_max += 10_000;
    let applied = client.update_job(UpdateJobRequest::new(edited, "user-1")).unwrap();
    assert!(applied);

    // Step 4: fetch again.
    let fetched = client
        .fetch_job_by_key(&created.partition_key, &created.range_key)
        .unwrap();
    assert_eq!(fetched.title, "T (Updated)");
    assert_eq!(fetched.salary_max, 130_000);
    assert_eq!(fetched.created, created.created);

    // Step 5: delete.
    client
        .delete_job_by_key(&created.partition_key, &created.range_key)
        .unwrap();

    // Step 6: fetch after delete is a 404 API error.
    let err = client
        .fetch_job_by_key(&created.partition_key, &created.range_key)
        .unwrap_err();
    let api = err.as_api().expect("expected API error");
    assert_eq!(api.status_code(), 404);
    assert_eq!(api.message(), "job not found");

    // Step 7: delete again is also a 404.
    let err = client
        .delete_job_by_key(&created.partition_key, &created.range_key)
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn fetch_all_pages_are_disjoint_and_complete() {
    let client = client();
    let mut created = Vec::new();
    for i in 0..7 {
        created.push(client.create_job(posting("pager", &format!("job {i}"), "c", "d")).unwrap());
    }
    client.create_job(posting("other-account", "noise", "c", "d")).unwrap();

    let mut seen = Vec::new();
    let mut sizes = Vec::new();
    let mut cursor = None;
    loop {
        let page = client
            .fetch_all_jobs(FetchAllJobsRequest::new("pager").limit(3).after(cursor))
            .unwrap();
        sizes.push(page.results.len());
        seen.extend(page.results);
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(sizes, [3, 3, 1]);
    assert_eq!(seen, created);
    let unique: HashSet<_> = seen.iter().map(|job| job.range_key.clone()).collect();
    assert_eq!(unique.len(), 7);
}

#[test]
fn category_paths_agree() {
    let client = client();
    for i in 0..3 {
        client.create_job(posting("acct", &format!("design {i}"), "Design", "Product")).unwrap();
    }
    client.create_job(posting("acct", "backend", "Software Development", "Engineering")).unwrap();

    let private = client
        .fetch_jobs_by_category(FetchJobsByCategoryRequest::new("Design"))
        .unwrap();
    assert_eq!(private.results.len(), 3);
    assert!(private.is_last());

    // The public GET path pages with the same cursor.
    let first = client.fetch_jobs_by_category_public("Design", None).unwrap();
    assert_eq!(first.results, private.results);

    let spaced = client
        .fetch_jobs_by_category_public("Software Development", None)
        .unwrap();
    assert_eq!(spaced.results.len(), 1);
    assert_eq!(spaced.results[0].title, "backend");

    let after_first = private.results[0].key();
    let rest = client
        .fetch_jobs_by_category_public("Design", Some(&after_first))
        .unwrap();
    assert_eq!(rest.results, private.results[1..]);
}

#[test]
fn department_filter() {
    let client = client();
    client.create_job(posting("acct", "a", "c", "Engineering")).unwrap();
    client.create_job(posting("acct", "b", "c", "Sales")).unwrap();

    let page = client
        .fetch_jobs_by_department(FetchJobsByDepartmentRequest::new("Sales"))
        .unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].title, "b");
}

#[test]
fn wrong_api_key_is_api_error() {
    let client = JobClient::new(&start_server(), "wrong-key").unwrap();

    let err = client
        .create_job(posting("acct", "T", "c", "d"))
        .unwrap_err();
    let api = err.as_api().expect("expected API error");
    assert_eq!(api.status_code(), 401);
    assert_eq!(api.message(), "invalid api key");

    // An explicit key on the request wins over the client default.
    let job = client
        .create_job(CreateJobRequest {
            api_key: API_KEY.to_string(),
            ..posting("acct", "T", "c", "d")
        })
        .unwrap();
    assert_eq!(job.title, "T");
}

#[test]
fn plain_text_error_becomes_message() {
    let client = client();
    let body = serde_json::json!({ "api_key": API_KEY });

    let response = client
        .send(HttpMethod::Post, "?action=bogus", Some(&body))
        .unwrap();
    let err = job_core::decode_empty(response).unwrap_err();

    let api = err.as_api().expect("expected API error");
    assert_eq!(api.status_code(), 400);
    assert_eq!(api.message(), "unknown action: bogus");
}

#[test]
fn unreachable_server_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = JobClient::new(&format!("http://{addr}/"), API_KEY).unwrap();

    let err = client.fetch_job_by_key("acct", "0").unwrap_err();
    assert!(matches!(err, Error::Transport { context: "failed to fetch job", .. }));
}

#[test]
fn timeout_aborts_silent_server() {
    // Accepts connections and never writes a byte.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });

    let client = JobClient::builder(format!("http://{addr}/"))
        .api_key(API_KEY)
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client.fetch_job_by_key("acct", "0").unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::Transport { context: "failed to fetch job", .. }), "got {err}");
    assert!(elapsed >= Duration::from_millis(250), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");
}

#[test]
fn one_client_many_threads() {
    let client = client();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let client = &client;
            scope.spawn(move || {
                for i in 0..5 {
                    client
                        .create_job(posting("shared", &format!("w{worker}-{i}"), "c", "d"))
                        .unwrap();
                }
            });
        }
    });

    let page = client
        .fetch_all_jobs(FetchAllJobsRequest::new("shared").limit(100))
        .unwrap();
    assert_eq!(page.results.len(), 20);
    assert!(page.is_last());
}
