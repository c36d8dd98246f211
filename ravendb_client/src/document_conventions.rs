use std::time::Duration;

/// Customizes how a [`DocumentStore`](crate::DocumentStore) behaves.
///
/// Conventions can only be changed before the store is initialized.
#[derive(Clone, Debug)]
pub struct DocumentConventions {
    disable_topology_updates: bool,
    identity_parts_separator: char,
    topology_update_interval: Duration,
}

impl Default for DocumentConventions {
    fn default() -> Self {
        Self {
            disable_topology_updates: false,
            identity_parts_separator: '/',
            topology_update_interval: Duration::from_secs(5 * 60),
        }
    }
}

// Mutators
impl DocumentConventions {
    pub fn default_for_single_server() -> Self {
        Self {
            disable_topology_updates: true,
            ..Default::default()
        }
    }

    /// When set, the store only ever talks to the urls it was given and never asks the
    /// cluster for its topology.
    pub fn set_disable_topology_updates(&mut self, disable: bool) -> &mut Self {
        self.disable_topology_updates = disable;
        self
    }

    /// Separator used between the collection prefix and the identity part of generated ids.
    pub fn set_identity_parts_separator(&mut self, separator: char) -> &mut Self {
        self.identity_parts_separator = separator;
        self
    }

    pub fn set_topology_update_interval(&mut self, interval: Duration) -> &mut Self {
        self.topology_update_interval = interval;
        self
    }
}

// Getters
impl DocumentConventions {
    pub fn disable_topology_updates(&self) -> bool {
        self.disable_topology_updates
    }

    pub fn identity_parts_separator(&self) -> char {
        self.identity_parts_separator
    }

    pub fn topology_update_interval(&self) -> Duration {
        self.topology_update_interval
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::DocumentConventions;

    #[test]
    fn defaults_match_server_expectations() {
        let conventions = DocumentConventions::default();

        assert!(!conventions.disable_topology_updates());
        assert_eq!(conventions.identity_parts_separator(), '/');
        assert_eq!(
            conventions.topology_update_interval(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn single_server_conventions_disable_topology_updates() {
        assert!(DocumentConventions::default_for_single_server().disable_topology_updates());
    }

    #[test]
    fn mutators_chain() {
        let mut conventions = DocumentConventions::default();

        conventions
            .set_identity_parts_separator('-')
            .set_topology_update_interval(Duration::from_secs(10));

        assert_eq!(conventions.identity_parts_separator(), '-');
        assert_eq!(
            conventions.topology_update_interval(),
            Duration::from_secs(10)
        );
    }
}
