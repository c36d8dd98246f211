//! Cluster topology as returned by `GET /cluster/topology`.
use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClusterTopologyInfo {
    pub topology: Topology,
    pub etag: i64,
    pub leader: String,
    pub current_state: String,
    pub node_tag: String,
    pub current_term: i64,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct Topology {
    pub topology_id: String,
    pub all_nodes: HashMap<String, Url>,
    pub members: HashMap<String, Url>,
    pub promotables: HashMap<String, Url>,
    pub watchers: HashMap<String, Url>,
    pub last_node_id: String,
    pub etag: i64,
}

impl ClusterTopologyInfo {
    /// Builds a placeholder topology from the urls a store was configured with. Each url gets
    /// a synthetic node tag until the real topology is downloaded.
    pub fn from_initial_urls(urls: &[Url]) -> Self {
        let all_nodes = urls
            .iter()
            .enumerate()
            .map(|(i, url)| (format!("?{}", i), url.clone()))
            .collect();
        Self {
            topology: Topology {
                all_nodes,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
