use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// HTTP verbs an endpoint may be recorded with. Anything else an extractor
/// reports is ignored at merge time.
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Transport classification of an endpoint.
///
/// Variant order is the promotion order: an endpoint only ever moves
/// towards `Graphql`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Rest,
    Rpc,
    Graphql,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Rest => "rest",
            Kind::Rpc => "rpc",
            Kind::Graphql => "graphql",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Kind::Rest => "REST",
            Kind::Rpc => "RPC",
            Kind::Graphql => "GraphQL",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw observation of a possible endpoint, as produced by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hit {
    pub url: String,
    pub kind: Kind,
    pub method: Option<String>,
    pub gql_op_type: Option<String>,
    pub gql_op_name: Option<String>,
    pub rpc_method: Option<String>,
}

impl Hit {
    /// A plain REST hit with an optional method.
    pub fn rest(url: impl Into<String>, method: Option<String>) -> Self {
        Self {
            url: url.into(),
            method,
            ..Default::default()
        }
    }

    pub fn graphql(url: impl Into<String>, op_type: Option<String>, op_name: Option<String>) -> Self {
        Self {
            url: url.into(),
            kind: Kind::Graphql,
            method: Some("POST".to_string()),
            gql_op_type: op_type,
            gql_op_name: op_name,
            ..Default::default()
        }
    }

    pub fn rpc(url: impl Into<String>, method: Option<String>, rpc_method: Option<String>) -> Self {
        Self {
            url: url.into(),
            kind: Kind::Rpc,
            method,
            rpc_method,
            ..Default::default()
        }
    }

    /// Same observation pointed at a different URL.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }
}

/// The merged record for one normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub kind: Kind,
    pub methods: BTreeSet<String>,
    pub params: BTreeMap<String, Vec<String>>,
    pub sources: BTreeSet<String>,
    pub gql_ops: BTreeSet<(String, String)>,
    pub rpc_methods: BTreeSet<String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, kind: Kind) -> Self {
        Self {
            url: url.into(),
            kind,
            methods: BTreeSet::new(),
            params: BTreeMap::new(),
            sources: BTreeSet::new(),
            gql_ops: BTreeSet::new(),
            rpc_methods: BTreeSet::new(),
        }
    }

    /// Fold one hit into this record. Kind promotion is handled by the store.
    pub fn merge(&mut self, hit: &Hit, source: &str) {
        if let Some(ref method) = hit.method
            && HTTP_METHODS.contains(&method.as_str())
        {
            self.methods.insert(method.clone());
        }
        if !source.is_empty() {
            self.sources.insert(source.to_string());
        }
        if hit.kind == Kind::Graphql
            && let Some(ref op_type) = hit.gql_op_type
        {
            let name = hit
                .gql_op_name
                .clone()
                .unwrap_or_else(|| "anonymous".to_string());
            self.gql_ops.insert((op_type.clone(), name));
        }
        if hit.kind == Kind::Rpc
            && let Some(ref rpc_method) = hit.rpc_method
        {
            self.rpc_methods.insert(rpc_method.clone());
        }
    }
}

/// Keyed store of endpoints for one crawl run. Iteration order is URL order.
#[derive(Debug, Default)]
pub struct EndpointStore {
    endpoints: BTreeMap<String, Endpoint>,
}

impl EndpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: &str, hit: &Hit, source: &str, params: &BTreeMap<String, Vec<String>>) {
        let endpoint = self
            .endpoints
            .entry(url.to_string())
            .or_insert_with(|| Endpoint::new(url, hit.kind));

        endpoint.kind = endpoint.kind.max(hit.kind);
        endpoint.merge(hit, source);

        for (key, values) in params {
            endpoint
                .params
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    pub fn get(&self, url: &str) -> Option<&Endpoint> {
        self.endpoints.get(url)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Endpoint> {
        self.endpoints.values_mut()
    }

    /// Snapshot of every endpoint, sorted by URL.
    pub fn all(&self) -> Vec<Endpoint> {
        self.endpoints.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_params() -> BTreeMap<String, Vec<String>> {
        BTreeMap::new()
    }

    #[test]
    fn test_first_hit_creates_endpoint() {
        let mut store = EndpointStore::new();
        let hit = Hit::rest("https://example.com/api/users", Some("GET".to_string()));
        store.add("https://example.com/api/users", &hit, "https://example.com/", &no_params());

        let ep = store.get("https://example.com/api/users").unwrap();
        assert_eq!(ep.kind, Kind::Rest);
        assert!(ep.methods.contains("GET"));
        assert!(ep.sources.contains("https://example.com/"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_repeated_hit_only_grows_params() {
        let mut store = EndpointStore::new();
        let hit = Hit::rest("https://example.com/api/items", Some("POST".to_string()));
        let mut params = BTreeMap::new();
        params.insert("page".to_string(), vec!["1".to_string()]);

        store.add("https://example.com/api/items", &hit, "a.js", &params);
        let once = store.get("https://example.com/api/items").unwrap().clone();
        store.add("https://example.com/api/items", &hit, "a.js", &params);
        let twice = store.get("https://example.com/api/items").unwrap();

        assert_eq!(once.methods, twice.methods);
        assert_eq!(once.sources, twice.sources);
        assert_eq!(once.kind, twice.kind);
        assert_eq!(twice.params["page"], vec!["1", "1"]);
    }

    #[test]
    fn test_kind_only_escalates() {
        let orders = [
            [Kind::Rest, Kind::Graphql, Kind::Rpc],
            [Kind::Graphql, Kind::Rest, Kind::Rpc],
            [Kind::Rpc, Kind::Rest, Kind::Graphql],
        ];

        for order in orders {
            let mut store = EndpointStore::new();
            for kind in order {
                let hit = Hit {
                    url: "https://example.com/graphql".to_string(),
                    kind,
                    ..Default::default()
                };
                store.add("https://example.com/graphql", &hit, "", &no_params());
            }
            assert_eq!(store.get("https://example.com/graphql").unwrap().kind, Kind::Graphql);
        }

        let mut store = EndpointStore::new();
        store.add("u", &Hit::rpc("u", None, None), "", &no_params());
        store.add("u", &Hit::rest("u", None), "", &no_params());
        assert_eq!(store.get("u").unwrap().kind, Kind::Rpc);
    }

    #[test]
    fn test_unknown_method_is_ignored() {
        let mut ep = Endpoint::new("https://example.com/api", Kind::Rest);
        ep.merge(&Hit::rest("x", Some("FROB".to_string())), "");
        assert!(ep.methods.is_empty());
        assert!(ep.sources.is_empty());
    }

    #[test]
    fn test_graphql_ops_default_to_anonymous() {
        let mut ep = Endpoint::new("https://example.com/graphql", Kind::Graphql);
        ep.merge(&Hit::graphql("__graphql__", Some("query".to_string()), None), "app.js");
        ep.merge(
            &Hit::graphql("__graphql__", Some("mutation".to_string()), Some("AddUser".to_string())),
            "app.js",
        );
        // no op type, nothing recorded
        ep.merge(&Hit::graphql("__graphql__", None, None), "app.js");

        assert_eq!(ep.gql_ops.len(), 2);
        assert!(ep.gql_ops.contains(&("query".to_string(), "anonymous".to_string())));
        assert!(ep.gql_ops.contains(&("mutation".to_string(), "AddUser".to_string())));
    }

    #[test]
    fn test_rpc_methods_only_from_rpc_hits() {
        let mut ep = Endpoint::new("https://example.com/socket.io", Kind::Rpc);
        ep.merge(&Hit::rpc("__socketio__", None, Some("emit:chat".to_string())), "");
        let mut rest = Hit::rest("x", None);
        rest.rpc_method = Some("ignored".to_string());
        ep.merge(&rest, "");

        assert_eq!(ep.rpc_methods.len(), 1);
        assert!(ep.rpc_methods.contains("emit:chat"));
    }

    #[test]
    fn test_all_is_sorted_by_url() {
        let mut store = EndpointStore::new();
        for url in ["https://b.example/x", "https://a.example/z", "https://a.example/a"] {
            store.add(url, &Hit::rest(url, None), "", &no_params());
        }
        let urls: Vec<String> = store.all().into_iter().map(|e| e.url).collect();
        assert_eq!(
            urls,
            vec!["https://a.example/a", "https://a.example/z", "https://b.example/x"]
        );
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Kind::Graphql).unwrap(), "\"graphql\"");
        assert_eq!(Kind::Rpc.to_string(), "rpc");
    }
}
