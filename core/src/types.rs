//! Wire records for the job service.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! the integration tests catch any drift between the two crates.
//!
//! Every request record carries an `api_key`. An empty key means "use the
//! client's default", which `JobClient` fills in right before sending.
//! Pagination cursors are an `Option<Cursor>` so the partition and range
//! halves can only be present or absent together.

use serde::{Deserialize, Serialize};

/// A job posting. The composite key (`partition_key`, `range_key`) is
/// assigned by the service; the range key sorts by creation order.
///
/// Fields the service leaves out decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub partition_key: String,
    pub range_key: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: String,
    pub location: String,
    /// full-time, part-time, contract, ...
    pub job_type: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub requirements: String,
    pub responsibilities: String,
    pub benefits: String,
    /// active, inactive, filled, ...
    pub status: String,
    pub posted_by: String,
    pub application_deadline: String,
    /// entry, mid, senior, ...
    pub experience_level: String,
    pub remote_allowed: bool,
    pub application_count: i64,
    pub view_count: i64,
    pub created: String,
    pub modified: String,
}

impl Job {
    /// The composite key as a cursor, e.g. to resume a scan after this job.
    pub fn key(&self) -> Cursor {
        Cursor::new(self.partition_key.clone(), self.range_key.clone())
    }
}

/// Position in a paged scan: the key of the last job already returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub last_partition_key: String,
    pub last_range_key: String,
}

impl Cursor {
    pub fn new(last_partition_key: impl Into<String>, last_range_key: impl Into<String>) -> Self {
        Self {
            last_partition_key: last_partition_key.into(),
            last_range_key: last_range_key.into(),
        }
    }

    /// Combine the two nullable wire fields. Empty strings count as absent.
    fn from_parts(
        partition: Option<String>,
        range: Option<String>,
    ) -> Result<Option<Cursor>, String> {
        let partition = partition.filter(|s| !s.is_empty());
        let range = range.filter(|s| !s.is_empty());
        match (partition, range) {
            (Some(p), Some(r)) => Ok(Some(Cursor::new(p, r))),
            (None, None) => Ok(None),
            (Some(_), None) => Err("last_partition_key present without last_range_key".into()),
            (None, Some(_)) => Err("last_range_key present without last_partition_key".into()),
        }
    }
}

/// One page of a job scan. `cursor` is `None` on the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobPage", into = "RawJobPage")]
pub struct JobPage {
    pub results: Vec<Job>,
    pub cursor: Option<Cursor>,
}

impl JobPage {
    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Flat wire shape of [`JobPage`].
#[derive(Serialize, Deserialize)]
struct RawJobPage {
    #[serde(default)]
    results: Option<Vec<Job>>,
    #[serde(default)]
    last_partition_key: Option<String>,
    #[serde(default)]
    last_range_key: Option<String>,
}

impl TryFrom<RawJobPage> for JobPage {
    type Error = String;

    fn try_from(raw: RawJobPage) -> Result<Self, Self::Error> {
        Ok(JobPage {
            results: raw.results.unwrap_or_default(),
            cursor: Cursor::from_parts(raw.last_partition_key, raw.last_range_key)?,
        })
    }
}

impl From<JobPage> for RawJobPage {
    fn from(page: JobPage) -> Self {
        let (last_partition_key, last_range_key) = match page.cursor {
            Some(c) => (Some(c.last_partition_key), Some(c.last_range_key)),
            None => (None, None),
        };
        RawJobPage {
            results: Some(page.results),
            last_partition_key,
            last_range_key,
        }
    }
}

/// Request records that carry an API key the client may fill in.
pub trait Authenticated {
    fn api_key_mut(&mut self) -> &mut String;
}

macro_rules! authenticated {
    ($($ty:ty),+ $(,)?) => {
        $(impl Authenticated for $ty {
            fn api_key_mut(&mut self) -> &mut String {
                &mut self.api_key
            }
        })+
    };
}

authenticated!(
    CreateJobRequest,
    FetchJobRequest,
    DeleteJobRequest,
    UpdateJobRequest,
    FetchAllJobsRequest,
    FetchJobsByCategoryRequest,
    FetchJobsByDepartmentRequest,
    FetchJobsByStatusRequest,
    FetchJobsByLocationRequest,
    FetchJobsByExperienceLevelRequest,
    FetchJobsByRemoteRequest,
    FetchJobsBySalaryRangeRequest,
);

/// Payload for `action=create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
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
    #[serde(default)]
    pub api_key: String,
}

/// Payload for `action=fetch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobRequest {
    #[serde(default)]
    pub api_key: String,
    pub partition_key: String,
    pub range_key: String,
}

impl FetchJobRequest {
    pub fn new(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            api_key: String::new(),
            partition_key: partition_key.into(),
            range_key: range_key.into(),
        }
    }
}

/// Payload for `action=delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteJobRequest {
    #[serde(default)]
    pub api_key: String,
    pub partition_key: String,
    pub range_key: String,
}

impl DeleteJobRequest {
    pub fn new(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            api_key: String::new(),
            partition_key: partition_key.into(),
            range_key: range_key.into(),
        }
    }
}

/// Payload for `action=update`. The job's key selects the record to replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateJobRequest {
    pub job: Job,
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
}

impl UpdateJobRequest {
    pub fn new(job: Job, user_id: impl Into<String>) -> Self {
        Self {
            job,
            user_id: user_id.into(),
            api_key: String::new(),
        }
    }
}

/// Payload for `action=fetchAll`: every job of one account, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAllJobsRequest {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

impl FetchAllJobsRequest {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// Payload for `action=fetchByCategory` over the authenticated POST path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByCategoryRequest {
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

impl FetchJobsByCategoryRequest {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// Payload for `action=fetchByDepartment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByDepartmentRequest {
    pub department: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

impl FetchJobsByDepartmentRequest {
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

// The filters below are part of the service schema but have no client
// operation yet.

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByStatusRequest {
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByLocationRequest {
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByExperienceLevelRequest {
    pub experience_level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsByRemoteRequest {
    pub remote_allowed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJobsBySalaryRangeRequest {
    pub min_salary: i64,
    pub max_salary: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(flatten)]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub api_key: String,
}

/// Service-to-service authentication record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    pub method: String,
    pub attempting_service_id: String,
    pub goal_service_key: String,
}
