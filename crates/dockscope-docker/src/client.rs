use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions, LogsOptions};
use bollard::models::ContainerSummary;
use chrono::{DateTime, Utc};
use dockscope_logs::{LogSource, RawLogStream};
use dockscope_types::Container;
use futures::StreamExt;
use tracing::{debug, info};

use crate::endpoint::{Endpoint, candidate_endpoints};

/// Lines of history requested when a log stream opens
pub const DEFAULT_TAIL_LINES: u64 = 100;

/// How long a candidate endpoint gets to answer a ping
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Request timeout handed to bollard, in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Time bounds on the log history requested from Docker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogWindow {
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl LogWindow {
    /// Fails when `since` is after `until`
    pub fn new(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(since), Some(until)) = (since, until)
            && since > until
        {
            bail!("since ({since}) is after until ({until})");
        }
        Ok(Self { since, until })
    }

    /// Unix seconds as Docker expects them; 0 leaves the bound open
    fn as_unix(bound: Option<DateTime<Utc>>) -> i64 {
        bound.map_or(0, |at| at.timestamp())
    }
}

/// Docker daemon connection used as the log pipeline's source
pub struct DockerClient {
    docker: Docker,
    endpoint: Endpoint,
    tail_lines: u64,
    window: LogWindow,
}

impl DockerClient {
    /// Connect to the first reachable endpoint.
    ///
    /// `explicit_host` (from config or `--host`) is tried before `DOCKER_HOST`
    /// and the well-known sockets.
    pub async fn connect(explicit_host: Option<&str>, tail_lines: u64) -> Result<Self> {
        let docker_host = std::env::var("DOCKER_HOST").ok();
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let candidates = candidate_endpoints(
            explicit_host,
            docker_host.as_deref(),
            home.as_deref(),
            Path::exists,
        );

        if candidates.is_empty() {
            bail!("No Docker endpoints found. Is Docker running?");
        }

        let mut failures = Vec::new();
        for endpoint in candidates {
            match Self::try_endpoint(&endpoint).await {
                Ok(docker) => {
                    info!(endpoint = %endpoint, "connected to Docker");
                    return Ok(Self {
                        docker,
                        endpoint,
                        tail_lines,
                        window: LogWindow::default(),
                    });
                }
                Err(e) => {
                    debug!(endpoint = %endpoint, error = %e, "endpoint unavailable");
                    failures.push(format!("{endpoint}: {e:#}"));
                }
            }
        }

        bail!(
            "No available Docker endpoint. Tried:\n  {}",
            failures.join("\n  ")
        )
    }

    async fn try_endpoint(endpoint: &Endpoint) -> Result<Docker> {
        let docker = if let Some(path) = endpoint.socket_path() {
            Docker::connect_with_socket(path, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        } else {
            Docker::connect_with_http(
                &endpoint.host,
                REQUEST_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            )
        }
        .context("Failed to create Docker client")?;

        tokio::time::timeout(PING_TIMEOUT, docker.ping())
            .await
            .context("Ping timed out")?
            .context("Ping failed")?;

        Ok(docker)
    }

    /// The endpoint this client is connected to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Only request log lines inside `window`
    pub fn with_window(mut self, window: LogWindow) -> Self {
        self.window = window;
        self
    }
}

/// Follow stdout and stderr with timestamps, bounded by `tail_lines` and `window`
fn logs_options(tail_lines: u64, window: LogWindow) -> LogsOptions<String> {
    LogsOptions::<String> {
        follow: true,
        stdout: true,
        stderr: true,
        timestamps: true,
        since: LogWindow::as_unix(window.since),
        until: LogWindow::as_unix(window.until),
        tail: tail_lines.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl LogSource for DockerClient {
    async fn list_running_containers(&self) -> Result<Vec<Container>> {
        let options = ListContainersOptions::<String> {
            all: false,
            filters: HashMap::from([("status".to_string(), vec!["running".to_string()])]),
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .context("Failed to list containers")?;

        Ok(containers.into_iter().map(container_from_summary).collect())
    }

    async fn stream_raw_logs(&self, container_id: &str) -> Result<RawLogStream> {
        self.docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .with_context(|| format!("Failed to inspect container {container_id}"))?;

        let stream = self
            .docker
            .logs(container_id, Some(logs_options(self.tail_lines, self.window)))
            .map(|chunk| {
                chunk
                    .map(|output| output.into_bytes().to_vec())
                    .map_err(anyhow::Error::from)
            });

        Ok(Box::pin(stream))
    }

    async fn close(&self) -> Result<()> {
        // bollard holds no session state; dropping the client closes its connections
        debug!(endpoint = %self.endpoint, "Docker client closed");
        Ok(())
    }
}

/// Shorten the ID to 12 characters and drop the name's leading slash
fn container_from_summary(summary: ContainerSummary) -> Container {
    let id: String = summary.id.unwrap_or_default().chars().take(12).collect();
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id.clone());

    Container {
        id,
        name,
        image: summary.image.unwrap_or_default(),
        image_id: summary.image_id.unwrap_or_default(),
        status: summary.status.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_summary_conversion() {
        let summary = ContainerSummary {
            id: Some("4f66ad9a0b2e8f3c9d1a7b6c5e4d3f2a1b0c9d8e7f6a5b4c3d2e1f0a9b8c7d6e".into()),
            names: Some(vec!["/web-frontend".into()]),
            image: Some("nginx:1.27".into()),
            image_id: Some("sha256:9a2c11e4".into()),
            status: Some("Up 3 hours".into()),
            ..Default::default()
        };

        let container = container_from_summary(summary);
        assert_eq!(container.id, "4f66ad9a0b2e");
        assert_eq!(container.name, "web-frontend");
        assert_eq!(container.image, "nginx:1.27");
        assert_eq!(container.image_id, "sha256:9a2c11e4");
        assert_eq!(container.status, "Up 3 hours");
    }

    #[test]
    fn test_unnamed_container_uses_id() {
        let summary = ContainerSummary {
            id: Some("abc123".into()),
            ..Default::default()
        };

        let container = container_from_summary(summary);
        assert_eq!(container.name, "abc123");
        assert_eq!(container.image, "");
    }

    #[test]
    fn test_logs_options_are_open_ended_by_default() {
        let options = logs_options(100, LogWindow::default());
        assert!(options.follow && options.stdout && options.stderr && options.timestamps);
        assert_eq!(options.tail, "100");
        assert_eq!(options.since, 0);
        assert_eq!(options.until, 0);
    }

    #[test]
    fn test_logs_options_carry_the_window() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        let window = LogWindow::new(Some(since), Some(until)).unwrap();

        let options = logs_options(20, window);
        assert_eq!(options.since, 1_704_103_200);
        assert_eq!(options.until, 1_704_106_800);
        assert_eq!(options.tail, "20");

        let open_end = logs_options(20, LogWindow::new(Some(since), None).unwrap());
        assert_eq!(open_end.since, 1_704_103_200);
        assert_eq!(open_end.until, 0);
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        let err = LogWindow::new(Some(late), Some(early)).unwrap_err();
        assert!(err.to_string().contains("is after until"));
        assert!(LogWindow::new(Some(early), Some(early)).is_ok());
        assert_eq!(LogWindow::new(None, None).unwrap(), LogWindow::default());
    }
}
