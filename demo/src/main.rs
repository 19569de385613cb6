mod config;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use job_core::{CreateJobRequest, FetchAllJobsRequest, Job, JobClient, UpdateJobRequest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    info!(base_url = %config.base_url, account_id = %config.account_id, "job client demo");

    let client = JobClient::builder(config.base_url.as_str())
        .api_key(config.api_key.as_str())
        .timeout(config.timeout())
        .build()
        .with_context(|| format!("invalid API_BASE_URL {:?}", config.base_url))?;

    let failures = run(&client, &config);
    info!(failures, "demo complete");
    Ok(())
}

/// Run every step, logging failures and carrying on. Returns how many
/// steps failed.
fn run(client: &JobClient, config: &Config) -> usize {
    info!("1. creating a job");
    let job = match client.create_job(sample_job(config)) {
        Ok(job) => {
            info!(
                title = %job.title,
                partition_key = %job.partition_key,
                range_key = %job.range_key,
                "job created"
            );
            job
        }
        Err(err) => {
            // Every later step needs the created job's key.
            error!("create job failed: {err}");
            return 1;
        }
    };

    let mut failures = 0;

    info!("2. fetching the job");
    match client.fetch_job_by_key(&job.partition_key, &job.range_key) {
        Ok(fetched) => info!(title = %fetched.title, "job fetched"),
        Err(err) => {
            error!("fetch job failed: {err}");
            failures += 1;
        }
    }

    info!("3. fetching all jobs");
    match client.fetch_all_jobs(FetchAllJobsRequest::new(config.account_id.as_str()).limit(10)) {
        Ok(page) => info!(count = page.results.len(), more = !page.is_last(), "jobs fetched"),
        Err(err) => {
            error!("fetch all jobs failed: {err}");
            failures += 1;
        }
    }

    info!("4. updating the job");
    match client.update_job(UpdateJobRequest::new(edited(&job), config.user_id.as_str())) {
        Ok(applied) => info!(applied, "job updated"),
        Err(err) => {
            error!("update job failed: {err}");
            failures += 1;
        }
    }

    info!("5. deleting the job");
    match client.delete_job_by_key(&job.partition_key, &job.range_key) {
        Ok(()) => info!("job deleted"),
        Err(err) => {
            error!("delete job failed: {err}");
            failures += 1;
        }
    }

    failures
}

fn sample_job(config: &Config) -> CreateJobRequest {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    CreateJobRequest {
        account_id: config.account_id.clone(),
        user_id: config.user_id.clone(),
        title: format!("Test Job - {now}"),
        description: "Test job created by the job client demo".to_string(),
        department: "Engineering".to_string(),
        category: "Software Development".to_string(),
        location: "Remote".to_string(),
        job_type: "full-time".to_string(),
        salary_min: 80_000,
        salary_max: 120_000,
        requirements: "Rust programming, AWS experience".to_string(),
        responsibilities: "Develop and maintain backend services".to_string(),
        benefits: "Health, dental, 401k".to_string(),
        posted_by: "test@example.com".to_string(),
        application_deadline: "2024-12-31".to_string(),
        experience_level: "mid".to_string(),
        remote_allowed: true,
        ..CreateJobRequest::default()
    }
}

fn edited(job: &Job) -> Job {
    Job {
        title: format!("{} (Updated)", job.title),
        salary_max: job.salary_max + 10_000,
        ..job.clone()
    }
}
