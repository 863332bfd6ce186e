use super::Extractor;
use crate::model::{HTTP_METHODS, Hit};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\.open\(\s*[`"'](\w+)[`"']\s*,\s*[`"']([^`"']+)[`"']"#).unwrap()
});

/// `xhr.open("METHOD", "url")`. Verbs outside the known set are dropped
/// rather than guessed.
pub struct XhrExtractor;

impl Extractor for XhrExtractor {
    fn name(&self) -> &'static str {
        "xhr"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        OPEN_RE
            .captures_iter(js)
            .map(|caps| {
                let method = caps[1].to_uppercase();
                let method = HTTP_METHODS.contains(&method.as_str()).then_some(method);
                Hit::rest(&caps[2], method)
            })
            .collect()
    }
}
