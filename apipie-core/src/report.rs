// Report generation from discovered endpoints

use apipie_scanner::{Endpoint, Kind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub rest: usize,
    pub graphql: usize,
    pub rpc: usize,
}

impl KindCounts {
    pub fn total(&self) -> usize {
        self.rest + self.graphql + self.rpc
    }
}

pub fn count_kinds(endpoints: &[Endpoint]) -> KindCounts {
    let mut counts = KindCounts::default();
    for endpoint in endpoints {
        match endpoint.kind {
            Kind::Rest => counts.rest += 1,
            Kind::Graphql => counts.graphql += 1,
            Kind::Rpc => counts.rpc += 1,
        }
    }
    counts
}

/// Sorted methods, or `UNKNOWN` when none were recorded.
pub fn method_list(endpoint: &Endpoint) -> Vec<String> {
    if endpoint.methods.is_empty() {
        vec!["UNKNOWN".to_string()]
    } else {
        endpoint.methods.iter().cloned().collect()
    }
}

/// `/first-segment/` of the endpoint path, `/` for the root.
fn group_prefix(url: &str) -> String {
    let path = Url::parse(url).map(|u| u.path().to_string()).unwrap_or_default();
    match path.split('/').find(|segment| !segment.is_empty()) {
        Some(first) => format!("/{}/", first),
        None => "/".to_string(),
    }
}

fn sources_line(endpoint: &Endpoint) -> Option<String> {
    if endpoint.sources.is_empty() {
        return None;
    }
    let sources: Vec<&str> = endpoint.sources.iter().map(String::as_str).collect();
    Some(format!("| Source | {} |", sources.join(", ")))
}

fn render_rest(endpoint: &Endpoint) -> Vec<String> {
    let methods = method_list(endpoint);
    let method_tag = methods.join(", ");
    let primary = if methods[0] == "UNKNOWN" { "GET" } else { methods[0].as_str() };

    let mut lines = vec![
        format!("#### {} `{}`\n", method_tag, endpoint.url),
        "| | |".to_string(),
        "|---|---|".to_string(),
        format!("| URL | `{}` |", endpoint.url),
        format!("| Method | {} |", method_tag),
    ];

    if !endpoint.params.is_empty() {
        let rendered: Vec<String> = endpoint
            .params
            .iter()
            .map(|(key, values)| match values.first() {
                Some(value) => format!("`{}`='{}'", key, value),
                None => format!("`{}`", key),
            })
            .collect();
        lines.push(format!("| Params | {} |", rendered.join(", ")));
    }

    if let Some(line) = sources_line(endpoint) {
        lines.push(line);
    }

    let mut curl_url = endpoint.url.clone();
    if !endpoint.params.is_empty() {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &endpoint.params {
            query.append_pair(key, values.first().map(String::as_str).unwrap_or(""));
        }
        curl_url.push('?');
        curl_url.push_str(&query.finish());
    }

    let xflag = if primary != "GET" {
        format!(" -X {}", primary)
    } else {
        String::new()
    };
    lines.push(String::new());
    lines.push(format!("```bash\ncurl{} '{}'\n```\n", xflag, curl_url));
    lines
}

fn render_header(endpoint: &Endpoint) -> Vec<String> {
    let mut lines = vec![
        format!("### `{}`\n", endpoint.url),
        "| | |".to_string(),
        "|---|---|".to_string(),
        format!("| URL | `{}` |", endpoint.url),
        "| Method | POST |".to_string(),
    ];
    if let Some(line) = sources_line(endpoint) {
        lines.push(line);
    }
    lines
}

fn curl_post(url: &str, body: &str) -> Vec<String> {
    vec![
        String::new(),
        "```bash".to_string(),
        format!("curl -X POST '{}' \\", url),
        "  -H 'Content-Type: application/json' \\".to_string(),
        format!("  -d '{}'", body),
        "```\n".to_string(),
    ]
}

fn render_graphql(endpoint: &Endpoint) -> Vec<String> {
    let mut lines = render_header(endpoint);

    if !endpoint.gql_ops.is_empty() {
        lines.push("\n**Operations:**\n".to_string());
        lines.push("| Type | Name |".to_string());
        lines.push("|------|------|".to_string());
        for (op_type, op_name) in &endpoint.gql_ops {
            lines.push(format!("| {} | `{}` |", op_type, op_name));
        }
    }

    lines.extend(curl_post(&endpoint.url, r#"{"query": "{ __typename }"}"#));
    lines
}

fn render_rpc(endpoint: &Endpoint) -> Vec<String> {
    let mut lines = render_header(endpoint);

    if !endpoint.rpc_methods.is_empty() {
        lines.push("\n**Methods:**\n".to_string());
        for method in &endpoint.rpc_methods {
            lines.push(format!("- `{}`", method));
        }
    }

    lines.extend(curl_post(
        &endpoint.url,
        r#"{"jsonrpc":"2.0","method":"<method>","params":[],"id":1}"#,
    ));
    lines
}

/// Markdown report: kind summary table, then REST grouped by first path
/// segment, then GraphQL and RPC endpoints.
pub fn generate_markdown_report(endpoints: &[Endpoint], target: &str) -> String {
    let counts = count_kinds(endpoints);
    let rest: Vec<&Endpoint> = endpoints.iter().filter(|e| e.kind == Kind::Rest).collect();
    let graphql: Vec<&Endpoint> = endpoints.iter().filter(|e| e.kind == Kind::Graphql).collect();
    let rpc: Vec<&Endpoint> = endpoints.iter().filter(|e| e.kind == Kind::Rpc).collect();

    let mut buf = vec![
        format!("# API Endpoints — {}\n", target),
        "| Kind | Count |".to_string(),
        "|------|-------|".to_string(),
        format!("| REST | {} |", counts.rest),
        format!("| GraphQL | {} |", counts.graphql),
        format!("| RPC | {} |", counts.rpc),
        format!("| **Total** | **{}** |", endpoints.len()),
        String::new(),
    ];

    if !rest.is_empty() {
        buf.push("## REST\n".to_string());
        let mut groups: BTreeMap<String, Vec<&Endpoint>> = BTreeMap::new();
        for endpoint in rest {
            groups.entry(group_prefix(&endpoint.url)).or_default().push(endpoint);
        }
        for (prefix, group) in groups {
            buf.push(format!("### {}\n", prefix));
            for endpoint in group {
                buf.extend(render_rest(endpoint));
            }
        }
        buf.push("---\n".to_string());
    }

    if !graphql.is_empty() {
        buf.push("## GraphQL\n".to_string());
        for endpoint in graphql {
            buf.extend(render_graphql(endpoint));
        }
        buf.push("---\n".to_string());
    }

    if !rpc.is_empty() {
        buf.push("## RPC\n".to_string());
        for endpoint in rpc {
            buf.extend(render_rpc(endpoint));
        }
        buf.push("---\n".to_string());
    }

    buf.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GqlOperation {
    #[serde(rename = "type")]
    pub op_type: String,
    pub name: String,
}

/// One endpoint as written to the JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub url: String,
    pub kind: Kind,
    pub methods: Vec<String>,
    pub params: BTreeMap<String, Vec<String>>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gql_operations: Vec<GqlOperation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_methods: Vec<String>,
}

impl From<&Endpoint> for EndpointRecord {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            url: endpoint.url.clone(),
            kind: endpoint.kind,
            methods: method_list(endpoint),
            params: endpoint.params.clone(),
            sources: endpoint.sources.iter().cloned().collect(),
            gql_operations: endpoint
                .gql_ops
                .iter()
                .map(|(op_type, name)| GqlOperation {
                    op_type: op_type.clone(),
                    name: name.clone(),
                })
                .collect(),
            rpc_methods: endpoint.rpc_methods.iter().cloned().collect(),
        }
    }
}

pub fn generate_json_report(endpoints: &[Endpoint]) -> Result<String, serde_json::Error> {
    let records: Vec<EndpointRecord> = endpoints.iter().map(EndpointRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

pub fn generate_report(endpoints: &[Endpoint], target: &str, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Markdown => Ok(generate_markdown_report(endpoints, target)),
        ReportFormat::Json => generate_json_report(endpoints),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
