//! The raven commands are the only way the client talks to the server.
//!
//! A command knows which REST endpoint it targets and how to turn itself into a
//! [`reqwest::Request`] against one of the cluster nodes. Sending it is the job of the
//! [`DocumentStore`](crate::DocumentStore) actor, which picks the node and attaches the
//! topology etag.
use reqwest::Method;
use url::Url;

#[derive(Debug)]
pub struct RavenCommand {
    pub base_server_url: Url,
    pub command: RavenCommandVariant,
}

impl RavenCommand {
    /// Returns a [`reqwest::Request`] for the specific [`RavenCommandVariant`].
    pub fn get_http_request(&self, client: &reqwest::Client) -> anyhow::Result<reqwest::Request> {
        let request_config = RequestConfig {
            client,
            base_url: &self.base_server_url,
        };

        // Handle specific command options
        let request = match &self.command {
            RavenCommandVariant::GetClusterTopology => {
                create_get_cluster_topology_request(request_config)?
            }
            RavenCommandVariant::GetAllDocumentsFromDatabase {
                database,
                page_size,
                start,
            } => create_get_all_documents_from_database_request(
                request_config,
                database,
                *page_size,
                *start,
            )?,
        };

        Ok(request)
    }
}

fn create_get_cluster_topology_request(config: RequestConfig) -> anyhow::Result<reqwest::Request> {
    let request = config
        .client
        .request(Method::GET, config.base_url.join("cluster/topology")?)
        .build()?;
    Ok(request)
}

fn create_get_all_documents_from_database_request(
    config: RequestConfig,
    database: &str,
    page_size: Option<i64>,
    start: Option<i64>,
) -> anyhow::Result<reqwest::Request> {
    //Create a vec to hold optional parts of the query string
    let mut query_string_parts = Vec::new();

    if let Some(page_size) = page_size {
        query_string_parts.push(format!("pageSize={}", page_size))
    }
    if let Some(start) = start {
        query_string_parts.push(format!("start={}", start))
    }

    let mut url = config
        .base_url
        .join("databases/")?
        .join(format!("{}/", database).as_str())?
        .join("docs")?;
    if !query_string_parts.is_empty() {
        url.set_query(Some(query_string_parts.join("&").as_str()));
    }

    let request = config.client.request(Method::GET, url).build()?;

    Ok(request)
}

/// Represents all operations that can be sent to the server.
/// Contained inside a [`RavenCommand`]. Holds all data relevant
/// to the specific command to be sent.
#[derive(Clone, Debug)]
pub enum RavenCommandVariant {
    GetClusterTopology,
    GetAllDocumentsFromDatabase {
        database: String,
        page_size: Option<i64>,
        start: Option<i64>,
    },
}

impl RavenCommandVariant {
    /// The database a command targets, if it is database scoped.
    pub fn database(&self) -> Option<&str> {
        match self {
            RavenCommandVariant::GetClusterTopology => None,
            RavenCommandVariant::GetAllDocumentsFromDatabase { database, .. } => Some(database),
        }
    }
}

#[derive(Debug)]
struct RequestConfig<'a> {
    client: &'a reqwest::Client,
    base_url: &'a Url,
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{RavenCommand, RavenCommandVariant};

    #[test]
    fn cluster_topology_request_targets_topology_endpoint() {
        let command = RavenCommand {
            base_server_url: Url::parse("http://localhost:8080").unwrap(),
            command: RavenCommandVariant::GetClusterTopology,
        };

        let request = command.get_http_request(&reqwest::Client::new()).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/cluster/topology"
        );
    }

    #[test]
    fn all_documents_request_includes_paging() {
        let command = RavenCommand {
            base_server_url: Url::parse("http://localhost:8080/").unwrap(),
            command: RavenCommandVariant::GetAllDocumentsFromDatabase {
                database: "Orders".to_string(),
                page_size: Some(25),
                start: Some(50),
            },
        };

        let request = command.get_http_request(&reqwest::Client::new()).unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/databases/Orders/docs?pageSize=25&start=50"
        );
    }

    #[test]
    fn all_documents_request_without_paging_has_no_query() {
        let command = RavenCommand {
            base_server_url: Url::parse("http://localhost:8080/").unwrap(),
            command: RavenCommandVariant::GetAllDocumentsFromDatabase {
                database: "Orders".to_string(),
                page_size: None,
                start: None,
            },
        };

        let request = command.get_http_request(&reqwest::Client::new()).unwrap();

        assert_eq!(request.url().query(), None);
    }
}
