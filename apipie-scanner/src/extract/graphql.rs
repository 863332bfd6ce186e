use super::Extractor;
use crate::model::Hit;
use crate::resolve::GRAPHQL_SENTINEL;
use once_cell::sync::Lazy;
use regex::Regex;

static ENDPOINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[`"']((?:https?://[^`"'\s]*)?/(?:graphql|api/graphql|gql|query))[`"']"#).unwrap()
});

// gql`query Name ...`
static TAGGED_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:gql|graphql)\s*`\s*(query|mutation|subscription)\s*(\w*)").unwrap()
});

// "query Name { ... }" as a plain string
static OPERATION_STRING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[`"']\s*(query|mutation|subscription)\s+(\w+)"#).unwrap()
});

static CLIENT_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)client\s*\.\s*(query|mutate|subscribe)\s*\(").unwrap());

static HOOK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)use(Query|Mutation|Subscription|LazyQuery)\s*\(").unwrap());

// request("https://host/graphql", `query Name ...`) as used by graphql-request
static REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)(?:request|gqlRequest)\s*\(\s*[`"']([^`"']+)[`"']\s*,\s*(?:[`"']|gql\s*`)\s*(query|mutation|subscription)\s*(\w*)"#,
    )
    .unwrap()
});

fn op_name(raw: Option<regex::Match<'_>>) -> Option<String> {
    raw.map(|m| m.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn client_op(call: &str) -> &'static str {
    match call.to_lowercase().as_str() {
        "mutate" => "mutation",
        "subscribe" => "subscription",
        _ => "query",
    }
}

fn hook_op(hook: &str) -> &'static str {
    let hook = hook.to_lowercase();
    if hook.contains("mutation") {
        "mutation"
    } else if hook.contains("subscription") {
        "subscription"
    } else {
        "query"
    }
}

/// GraphQL operations and endpoints. Operations seen without a URL are
/// reported against the GraphQL sentinel.
pub struct GraphqlExtractor;

impl Extractor for GraphqlExtractor {
    fn name(&self) -> &'static str {
        "graphql"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        let mut hits = Vec::new();

        for caps in REQUEST_RE.captures_iter(js) {
            hits.push(Hit::graphql(
                &caps[1],
                Some(caps[2].to_lowercase()),
                op_name(caps.get(3)),
            ));
        }

        for re in [&*TAGGED_TEMPLATE_RE, &*OPERATION_STRING_RE] {
            for caps in re.captures_iter(js) {
                hits.push(Hit::graphql(
                    GRAPHQL_SENTINEL,
                    Some(caps[1].to_lowercase()),
                    op_name(caps.get(2)),
                ));
            }
        }

        for caps in CLIENT_CALL_RE.captures_iter(js) {
            hits.push(Hit::graphql(
                GRAPHQL_SENTINEL,
                Some(client_op(&caps[1]).to_string()),
                None,
            ));
        }

        for caps in HOOK_RE.captures_iter(js) {
            hits.push(Hit::graphql(
                GRAPHQL_SENTINEL,
                Some(hook_op(&caps[1]).to_string()),
                None,
            ));
        }

        for caps in ENDPOINT_RE.captures_iter(js) {
            hits.push(Hit::graphql(&caps[1], None, None));
        }

        hits
    }
}
