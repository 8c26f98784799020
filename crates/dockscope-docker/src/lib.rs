//! Docker client for dockscope
//!
//! Finds a reachable Docker daemon, lists running containers and opens raw
//! log streams for the log pipeline, optionally bounded to a time window.

mod client;
mod endpoint;

pub use client::{DEFAULT_TAIL_LINES, DockerClient, LogWindow};
pub use endpoint::{Endpoint, candidate_endpoints};
