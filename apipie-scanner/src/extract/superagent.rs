use super::Extractor;
use crate::model::Hit;
use once_cell::sync::Lazy;
use regex::Regex;

static SUPERAGENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)superagent\s*\.\s*(get|post|put|patch|delete)\s*\(\s*[`"']([^`"']+)[`"']"#)
        .unwrap()
});

pub struct SuperagentExtractor;

impl Extractor for SuperagentExtractor {
    fn name(&self) -> &'static str {
        "superagent"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        SUPERAGENT_RE
            .captures_iter(js)
            .map(|caps| Hit::rest(&caps[2], Some(caps[1].to_uppercase())))
            .collect()
    }
}
