use super::Extractor;
use crate::model::Hit;
use once_cell::sync::Lazy;
use regex::Regex;

static HTTP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:\$http|this\.http|httpClient)\s*\.\s*(get|post|put|patch|delete)\s*\(\s*[`"']([^`"']+)[`"']"#,
    )
    .unwrap()
});

pub struct AngularExtractor;

impl Extractor for AngularExtractor {
    fn name(&self) -> &'static str {
        "angular"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        HTTP_RE
            .captures_iter(js)
            .map(|caps| Hit::rest(&caps[2], Some(caps[1].to_uppercase())))
            .collect()
    }
}
