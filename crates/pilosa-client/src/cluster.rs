use pilosa_common::Uri;

/// Round-robin registry of server addresses.
///
/// `cursor` always points at the host the next call to
/// [`next_host`](Self::next_host) returns, and is 0 when the cluster is empty.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    hosts: Vec<Uri>,
    cursor: usize,
}

impl Cluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cluster with a single host
    pub fn with_host(host: Uri) -> Self {
        Self::with_hosts(vec![host])
    }

    /// Create a cluster with a static host list, rotated in the given order
    pub fn with_hosts(hosts: Vec<Uri>) -> Self {
        Self { hosts, cursor: 0 }
    }

    /// Append a host; duplicates are kept and rotated like any other host
    pub fn add_host(&mut self, host: Uri) {
        self.hosts.push(host);
    }

    /// Get the next host using round-robin
    pub fn next_host(&mut self) -> Option<Uri> {
        let host = self.hosts.get(self.cursor)?.clone();
        self.cursor = (self.cursor + 1) % self.hosts.len();
        Some(host)
    }

    /// Remove the first host equal to `host`.
    ///
    /// The rotation order of the remaining hosts is preserved: if the removed
    /// host was next up, the host that followed it is returned next.
    pub fn remove_host(&mut self, host: &Uri) -> bool {
        let Some(index) = self.hosts.iter().position(|h| h == host) else {
            return false;
        };
        self.hosts.remove(index);

        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.hosts.len() {
            self.cursor = 0;
        }
        true
    }

    /// Get a copy of all hosts in rotation order
    pub fn hosts(&self) -> Vec<Uri> {
        self.hosts.clone()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
