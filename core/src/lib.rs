//! Synchronous client for the job-posting service.
//!
//! # Overview
//! The service exposes a single URL whose `action` query parameter selects
//! what to do (`?action=create`, `?action=fetchAll`, ...). Requests are JSON
//! POST bodies carrying an API key; one public read path uses GET with query
//! parameters instead.
//!
//! # Design
//! - `JobClient` is immutable after construction and holds the transport
//!   behind an `Arc`, so it can be cloned and shared across threads.
//! - Every operation funnels through `send` / `send_query` and the shared
//!   decoder in [`response`], so error handling is identical everywhere.
//! - Failures are one of three kinds: transport, API (status >= 400) or
//!   decode. None are retried.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use client::{Action, JobClient, JobClientBuilder};
pub use error::{ApiError, Error, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{decode, decode_empty};
pub use transport::{Transport, UreqTransport, DEFAULT_TIMEOUT};
pub use types::{
    AuthenticationRequest, Authenticated, CreateJobRequest, Cursor, DeleteJobRequest,
    FetchAllJobsRequest, FetchJobRequest, FetchJobsByCategoryRequest,
    FetchJobsByDepartmentRequest, FetchJobsByExperienceLevelRequest, FetchJobsByLocationRequest,
    FetchJobsByRemoteRequest, FetchJobsBySalaryRangeRequest, FetchJobsByStatusRequest, Job,
    JobPage, UpdateJobRequest,
};
