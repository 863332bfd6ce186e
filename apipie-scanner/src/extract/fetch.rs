use super::Extractor;
use crate::model::Hit;
use once_cell::sync::Lazy;
use regex::Regex;

// fetch("url", { ..., method: "POST" })
static FETCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)fetch\(\s*[`"']([^`"']+)[`"'](?:\s*,\s*\{(?:[^{}]|\{[^{}]*\})*?\bmethod\s*:\s*[`"'](\w+)[`"'])?"#,
    )
    .unwrap()
});

pub struct FetchExtractor;

impl Extractor for FetchExtractor {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        FETCH_RE
            .captures_iter(js)
            .map(|caps| {
                let method = caps.get(2).map(|m| m.as_str().to_uppercase());
                Hit::rest(&caps[1], method)
            })
            .collect()
    }
}
