// Tests for report generation functionality

use apipie_core::report::{
    EndpointRecord, ReportFormat, count_kinds, generate_json_report, generate_markdown_report,
    generate_report, method_list, save_report,
};
use apipie_scanner::{Endpoint, Kind};
use tempfile::NamedTempFile;

fn rest(url: &str, methods: &[&str]) -> Endpoint {
    let mut endpoint = Endpoint::new(url, Kind::Rest);
    for method in methods {
        endpoint.methods.insert(method.to_string());
    }
    endpoint.sources.insert("https://example.com/".to_string());
    endpoint
}

fn graphql() -> Endpoint {
    let mut endpoint = Endpoint::new("https://example.com/graphql", Kind::Graphql);
    endpoint.methods.insert("POST".to_string());
    endpoint
        .gql_ops
        .insert(("query".to_string(), "GetUser".to_string()));
    endpoint
        .gql_ops
        .insert(("mutation".to_string(), "anonymous".to_string()));
    endpoint
}

fn rpc() -> Endpoint {
    let mut endpoint = Endpoint::new("https://example.com/jsonrpc", Kind::Rpc);
    endpoint.rpc_methods.insert("eth_blockNumber".to_string());
    endpoint
}

fn sample() -> Vec<Endpoint> {
    let mut search = rest("https://example.com/api/search", &["GET"]);
    search
        .params
        .insert("q".to_string(), vec!["shoes".to_string(), "hats".to_string()]);
    search.params.insert("page".to_string(), vec!["2".to_string()]);

    vec![
        search,
        rest("https://example.com/api/users/delete", &["DELETE"]),
        graphql(),
        rpc(),
        rest("https://example.com/login", &["POST", "GET"]),
    ]
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), None);
}

#[test]
fn test_report_format_extension() {
    assert_eq!(ReportFormat::Markdown.extension(), "md");
    assert_eq!(ReportFormat::Json.extension(), "json");
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_count_kinds() {
    let counts = count_kinds(&sample());
    assert_eq!(counts.rest, 3);
    assert_eq!(counts.graphql, 1);
    assert_eq!(counts.rpc, 1);
    assert_eq!(counts.total(), 5);
}

#[test]
fn test_method_list_falls_back_to_unknown() {
    assert_eq!(method_list(&rpc()), vec!["UNKNOWN"]);
    assert_eq!(
        method_list(&rest("https://example.com/a", &["POST", "GET"])),
        vec!["GET", "POST"]
    );
}

// ============================================================================
// Markdown Tests
// ============================================================================

#[test]
fn test_markdown_summary_table() {
    let md = generate_markdown_report(&sample(), "https://example.com");
    assert!(md.starts_with("# API Endpoints — https://example.com\n"));
    assert!(md.contains("| REST | 3 |"));
    assert!(md.contains("| GraphQL | 1 |"));
    assert!(md.contains("| RPC | 1 |"));
    assert!(md.contains("| **Total** | **5** |"));
}

#[test]
fn test_markdown_groups_rest_by_first_segment() {
    let md = generate_markdown_report(&sample(), "https://example.com");
    let api = md.find("### /api/").unwrap();
    let login = md.find("### /login/").unwrap();
    assert!(api < login);
    assert!(md.find("## REST").unwrap() < api);
    assert!(md.find("## GraphQL").unwrap() > login);
}

#[test]
fn test_markdown_root_endpoint_group() {
    let md = generate_markdown_report(&[rest("https://example.com/", &["GET"])], "t");
    assert!(md.contains("### /\n"));
}

#[test]
fn test_markdown_rest_curl_snippets() {
    let md = generate_markdown_report(&sample(), "https://example.com");
    assert!(md.contains("curl 'https://example.com/api/search?page=2&q=shoes'"));
    assert!(md.contains("curl -X DELETE 'https://example.com/api/users/delete'"));
    // GET sorts before POST, so no -X flag
    assert!(md.contains("curl 'https://example.com/login'"));
    assert!(md.contains("| Params | `page`='2', `q`='shoes' |"));
    assert!(md.contains("| Source | https://example.com/ |"));
}

#[test]
fn test_markdown_graphql_and_rpc_sections() {
    let md = generate_markdown_report(&sample(), "https://example.com");
    assert!(md.contains("| query | `GetUser` |"));
    assert!(md.contains("| mutation | `anonymous` |"));
    assert!(md.contains("curl -X POST 'https://example.com/graphql' \\"));
    assert!(md.contains("- `eth_blockNumber`"));
    assert!(md.contains(r#""jsonrpc":"2.0""#));
}

#[test]
fn test_markdown_skips_empty_sections() {
    let md = generate_markdown_report(&[graphql()], "t");
    assert!(!md.contains("## REST"));
    assert!(!md.contains("## RPC"));
    assert!(md.contains("## GraphQL"));
}

// ============================================================================
// JSON Tests
// ============================================================================

#[test]
fn test_json_report_records() {
    let json = generate_json_report(&sample()).unwrap();
    let records: Vec<EndpointRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(records.len(), 5);

    let search = &records[0];
    assert_eq!(search.url, "https://example.com/api/search");
    assert_eq!(search.kind, Kind::Rest);
    assert_eq!(search.params["q"], vec!["shoes", "hats"]);
    assert!(search.gql_operations.is_empty());

    let gql = records.iter().find(|r| r.kind == Kind::Graphql).unwrap();
    assert_eq!(gql.gql_operations.len(), 2);

    let rpc = records.iter().find(|r| r.kind == Kind::Rpc).unwrap();
    assert_eq!(rpc.methods, vec!["UNKNOWN"]);
    assert_eq!(rpc.rpc_methods, vec!["eth_blockNumber"]);
}

#[test]
fn test_json_omits_empty_optional_fields() {
    let json = generate_json_report(&[rest("https://example.com/api/a", &["GET"])]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let record = &value[0];
    assert_eq!(record["kind"], "rest");
    assert!(record.get("gql_operations").is_none());
    assert!(record.get("rpc_methods").is_none());
}

#[test]
fn test_json_gql_operation_shape() {
    let json = generate_json_report(&[graphql()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let ops = value[0]["gql_operations"].as_array().unwrap();
    assert!(ops.iter().any(|op| op["type"] == "query" && op["name"] == "GetUser"));
}

#[test]
fn test_generate_report_dispatch() {
    let endpoints = sample();
    assert!(
        generate_report(&endpoints, "t", ReportFormat::Markdown)
            .unwrap()
            .starts_with("# API Endpoints")
    );
    assert!(
        generate_report(&endpoints, "t", ReportFormat::Json)
            .unwrap()
            .starts_with('[')
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_save_report() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new()?;
    save_report("# hello\n", file.path())?;
    assert_eq!(std::fs::read_to_string(file.path())?, "# hello\n");
    Ok(())
}
