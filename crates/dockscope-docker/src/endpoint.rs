use std::fmt;
use std::path::{Path, PathBuf};

/// Standard daemon socket on Linux hosts
const SYSTEM_SOCKET: &str = "/var/run/docker.sock";

/// A Docker daemon address worth trying
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Short label, e.g. "orbstack"
    pub name: String,
    /// Daemon address: `unix://...`, `tcp://...` or `http://...`
    pub host: String,
}

impl Endpoint {
    fn new(name: &str, host: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            host: host.into(),
        }
    }

    fn socket(name: &str, path: &Path) -> Self {
        Self::new(name, format!("unix://{}", path.display()))
    }

    /// Socket path when this is a `unix://` endpoint
    pub fn socket_path(&self) -> Option<&str> {
        self.host.strip_prefix("unix://")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.host)
    }
}

/// Endpoints to try, in order of preference.
///
/// An explicit host comes first, then `DOCKER_HOST`, then the OrbStack,
/// Docker Desktop and system sockets. Sockets are only listed when `exists`
/// reports the path is present. Duplicate hosts are dropped.
pub fn candidate_endpoints(
    explicit: Option<&str>,
    docker_host: Option<&str>,
    home: Option<&Path>,
    exists: impl Fn(&Path) -> bool,
) -> Vec<Endpoint> {
    let mut candidates = Vec::new();

    if let Some(host) = explicit.filter(|h| !h.is_empty()) {
        candidates.push(Endpoint::new("configured", normalize_host(host)));
    }
    if let Some(host) = docker_host.filter(|h| !h.is_empty()) {
        candidates.push(Endpoint::new("DOCKER_HOST", normalize_host(host)));
    }

    let mut sockets: Vec<(&str, PathBuf)> = Vec::new();
    if let Some(home) = home {
        sockets.push(("orbstack", home.join(".orbstack/run/docker.sock")));
        sockets.push(("docker-desktop", home.join(".docker/run/docker.sock")));
    }
    sockets.push(("docker-daemon", PathBuf::from(SYSTEM_SOCKET)));

    for (name, path) in sockets {
        if exists(&path) {
            candidates.push(Endpoint::socket(name, &path));
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.host.clone()));
    candidates
}

/// Bare socket paths are accepted as shorthand for `unix://<path>`
fn normalize_host(host: &str) -> String {
    if host.starts_with('/') {
        format!("unix://{host}")
    } else {
        host.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(endpoints: &[Endpoint]) -> Vec<&str> {
        endpoints.iter().map(|e| e.host.as_str()).collect()
    }

    #[test]
    fn test_preference_order() {
        let home = Path::new("/home/dev");
        let endpoints = candidate_endpoints(
            Some("tcp://10.0.0.5:2375"),
            Some("unix:///run/user/1000/docker.sock"),
            Some(home),
            |_| true,
        );

        assert_eq!(
            hosts(&endpoints),
            vec![
                "tcp://10.0.0.5:2375",
                "unix:///run/user/1000/docker.sock",
                "unix:///home/dev/.orbstack/run/docker.sock",
                "unix:///home/dev/.docker/run/docker.sock",
                "unix:///var/run/docker.sock",
            ]
        );
        assert_eq!(endpoints[2].name, "orbstack");
    }

    #[test]
    fn test_missing_sockets_are_skipped() {
        let endpoints = candidate_endpoints(None, None, Some(Path::new("/home/dev")), |p| {
            p == Path::new(SYSTEM_SOCKET)
        });
        assert_eq!(hosts(&endpoints), vec!["unix:///var/run/docker.sock"]);
    }

    #[test]
    fn test_duplicates_and_blank_values_dropped() {
        let endpoints = candidate_endpoints(
            Some("/var/run/docker.sock"),
            Some(""),
            None,
            |_| true,
        );
        assert_eq!(hosts(&endpoints), vec!["unix:///var/run/docker.sock"]);
        assert_eq!(endpoints[0].name, "configured");
    }

    #[test]
    fn test_real_socket_file_is_detected() {
        let home = tempfile::tempdir().unwrap();
        let socket_dir = home.path().join(".docker/run");
        std::fs::create_dir_all(&socket_dir).unwrap();
        std::fs::write(socket_dir.join("docker.sock"), b"").unwrap();

        let endpoints = candidate_endpoints(None, None, Some(home.path()), |p| {
            p.starts_with(home.path()) && p.exists()
        });
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].name, "docker-desktop");
        assert_eq!(
            endpoints[0].socket_path(),
            Some(socket_dir.join("docker.sock").to_str().unwrap())
        );
    }
}
