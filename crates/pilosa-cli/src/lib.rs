// Copyright 2025 Pilosa Client Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Pilosa CLI
//!
//! Command-line access to a Pilosa cluster built on `pilosa-client`.
//!
//! ## Host Resolution
//!
//! Hosts come from, in order of priority:
//!
//! 1. `--host` flags (repeatable)
//! 2. The `PILOSA_HOSTS` environment variable (comma-separated)
//! 3. The default address `http://localhost:10101`

use anyhow::Result;
use pilosa_client::Cluster;
use pilosa_common::Uri;

/// Environment variable consulted when no `--host` flag is given
pub const HOSTS_ENV_VAR: &str = "PILOSA_HOSTS";

/// Builds the cluster the CLI dispatches to.
///
/// # Errors
///
/// Returns an error naming the first address that fails to parse.
pub fn resolve_cluster(flags: &[String], env_hosts: Option<&str>) -> Result<Cluster> {
    let addresses: Vec<&str> = if !flags.is_empty() {
        flags.iter().map(String::as_str).collect()
    } else if let Some(env_hosts) = env_hosts {
        env_hosts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    if addresses.is_empty() {
        return Ok(Cluster::with_host(Uri::default()));
    }

    let hosts = addresses
        .into_iter()
        .map(|address| {
            Uri::from_address(address)
                .map_err(|e| anyhow::anyhow!("Invalid host '{}': {}", address, e))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Cluster::with_hosts(hosts))
}
