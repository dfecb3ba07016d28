/// Host header allow-list. `*` admits any host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedHosts(Vec<String>);

impl AllowedHosts {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            hosts
                .into_iter()
                .map(|host| host.as_ref().trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        )
    }

    pub fn any() -> Self {
        Self(vec!["*".into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Compares without the port suffix, case-insensitively.
    pub fn is_allowed(&self, host: &str) -> bool {
        let name = host
            .rsplit_once(':')
            .filter(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
            .map_or(host, |(name, _)| name)
            .to_ascii_lowercase();

        self.0
            .iter()
            .any(|allowed| allowed == "*" || *allowed == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_ignored() {
        let hosts = AllowedHosts::new(["api.example.com", "LOCALHOST"]);
        assert!(hosts.is_allowed("api.example.com:8000"));
        assert!(hosts.is_allowed("localhost"));
        assert!(!hosts.is_allowed("evil.example.com"));
        assert!(!hosts.is_allowed(""));
    }

    #[test]
    fn wildcard_admits_everything() {
        assert!(AllowedHosts::any().is_allowed("anything.internal:9000"));
    }
}
