use super::Extractor;
use crate::model::Hit;
use crate::resolve::join_base;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// var e = n.create({ ..., baseURL: 'https://...' }), minified imports included
static CREATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(\w+)\s*=\s*(?:\w+\.)+create\s*\((?s:.){0,300}?baseURL\s*:\s*[`"'](https?://[^`"']+)[`"']"#,
    )
    .unwrap()
});

static CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(\w+)\s*\.\s*(get|post|put|patch|delete|head|options|request)\s*\(\s*[`"']([^`"'\s]+)[`"']"#,
    )
    .unwrap()
});

static OBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)axios\s*\(\s*\{[^}]*?\burl\s*:\s*[`"']([^`"']+)[`"'][^}]*?\bmethod\s*:\s*[`"'](\w+)[`"']"#,
    )
    .unwrap()
});

/// Client instances declared in `js` with a `baseURL`, keyed by variable name.
pub fn client_bases(js: &str) -> HashMap<String, String> {
    CREATE_RE
        .captures_iter(js)
        .map(|caps| {
            (
                caps[1].to_string(),
                caps[2].trim_end_matches('/').to_string(),
            )
        })
        .collect()
}

/// Request-builder calls: bare `axios.*` (page relative), calls on clients
/// created with a base URL (joined onto the base) and the config-object form.
pub struct AxiosExtractor;

impl Extractor for AxiosExtractor {
    fn name(&self) -> &'static str {
        "axios"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        let bases = client_bases(js);
        let mut hits = Vec::new();

        for caps in CALL_RE.captures_iter(js) {
            let object = &caps[1];
            let verb = caps[2].to_uppercase();
            let path = &caps[3];
            let method = (verb != "REQUEST").then_some(verb);

            if object == "axios" {
                hits.push(Hit::rest(path, method));
            } else if let Some(base) = bases.get(object) {
                hits.push(Hit::rest(join_base(base, path), method));
            }
        }

        hits.extend(
            OBJECT_RE
                .captures_iter(js)
                .map(|caps| Hit::rest(&caps[1], Some(caps[2].to_uppercase()))),
        );

        hits
    }
}
