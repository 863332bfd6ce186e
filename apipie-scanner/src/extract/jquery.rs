use super::Extractor;
use crate::model::Hit;
use once_cell::sync::Lazy;
use regex::Regex;

// $.ajax({ url: "...", type: "POST" })
static AJAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)\$\.\s*ajax\s*\(\s*\{[^}]*?\burl\s*:\s*[`"']([^`"']+)[`"'][^}]*?\b(?:type|method)\s*:\s*[`"'](\w+)[`"']"#,
    )
    .unwrap()
});

// $.get("..."), $.getJSON("..."), ...
static SHORTHAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\$\.\s*(get|post|getJSON|put|delete)\s*\(\s*[`"']([^`"']+)[`"']"#).unwrap()
});

fn shorthand_method(name: &str) -> Option<String> {
    let method = match name.to_lowercase().as_str() {
        "get" | "getjson" => "GET",
        "post" => "POST",
        "put" => "PUT",
        "delete" => "DELETE",
        _ => return None,
    };
    Some(method.to_string())
}

pub struct JqueryExtractor;

impl Extractor for JqueryExtractor {
    fn name(&self) -> &'static str {
        "jquery"
    }

    fn extract(&self, js: &str) -> Vec<Hit> {
        let mut hits: Vec<Hit> = AJAX_RE
            .captures_iter(js)
            .map(|caps| Hit::rest(&caps[1], Some(caps[2].to_uppercase())))
            .collect();

        hits.extend(
            SHORTHAND_RE
                .captures_iter(js)
                .map(|caps| Hit::rest(&caps[2], shorthand_method(&caps[1]))),
        );

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ajax_options_object() {
        let js = r#"$.ajax({
            url: "/api/cart",
            dataType: "json",
            type: "post"
        });"#;
        let hits = JqueryExtractor.extract(js);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/api/cart");
        assert_eq!(hits[0].method.as_deref(), Some("POST"));
    }

    #[test]
    fn test_ajax_data_type_is_not_the_method() {
        let js = r#"$.ajax({ url: "/api/cart/items", dataType: "json", contentType: "x", type: "DELETE" })"#;
        let hits = JqueryExtractor.extract(js);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/api/cart/items");
        assert_eq!(hits[0].method.as_deref(), Some("DELETE"));
    }

    #[test]
    fn test_ajax_url_key_is_whole_word() {
        let js = r#"$.ajax({ baseUrl: "/static", url: "/api/real", method: "PATCH" })"#;
        let hits = JqueryExtractor.extract(js);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/api/real");
        assert_eq!(hits[0].method.as_deref(), Some("PATCH"));
    }

    #[test]
    fn test_ajax_method_key() {
        let hits = JqueryExtractor.extract(r#"$.ajax({url:'/api/x',method:'PUT'})"#);
        assert_eq!(hits[0].method.as_deref(), Some("PUT"));
    }

    #[test]
    fn test_shorthand_forms() {
        let js = r#"$.getJSON('/api/feed'); $.post("/api/comment", d); $.delete(`/api/comment/1`);"#;
        let hits = JqueryExtractor.extract(js);
        let got: Vec<(&str, Option<&str>)> = hits
            .iter()
            .map(|h| (h.url.as_str(), h.method.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("/api/feed", Some("GET")),
                ("/api/comment", Some("POST")),
                ("/api/comment/1", Some("DELETE")),
            ]
        );
    }
}
