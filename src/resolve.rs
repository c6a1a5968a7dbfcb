//! Parsing of the nested result document carried by successful tasks.
//!
//! A succeeded task's query response embeds `resultJson`: a string field
//! that is itself JSON, containing `{"resultUrls": ["…"]}`. This module
//! decodes that inner document and enforces the non-empty invariant; it
//! performs no I/O.

use serde::Deserialize;

use crate::error::{KieError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultDocument {
    #[serde(default)]
    result_urls: Vec<String>,
}

/// Decode a `resultJson` document into its ordered list of result URLs.
///
/// Order is preserved as found. Callers typically download only the first
/// entry, but alternates stay available.
///
/// # Errors
///
/// Returns a protocol error if the document is not valid JSON or carries
/// no locators.
pub fn result_urls(result_json: &str) -> Result<Vec<String>> {
    let doc: ResultDocument = serde_json::from_str(result_json)
        .map_err(|e| KieError::Protocol(format!("malformed result document: {}", e)))?;

    if doc.result_urls.is_empty() {
        return Err(KieError::Protocol(
            "no result locators in result document".to_string(),
        ));
    }

    Ok(doc.result_urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_url() {
        let urls = result_urls(r#"{"resultUrls":["http://x/img.png"]}"#).unwrap();
        assert_eq!(urls, vec!["http://x/img.png".to_string()]);
    }

    #[test]
    fn order_preserved() {
        let urls = result_urls(r#"{"resultUrls":["http://x/1.png","http://x/2.png","http://x/3.png"]}"#)
            .unwrap();
        assert_eq!(urls[0], "http://x/1.png");
        assert_eq!(urls[2], "http://x/3.png");
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn malformed_document_fails() {
        let err = result_urls("not json at all").unwrap_err();
        match err {
            KieError::Protocol(msg) => assert!(msg.contains("malformed result document")),
            other => panic!("expected Protocol error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_document_fails() {
        assert!(result_urls(r#"{"resultUrls":["http://x/img.pn"#).is_err());
    }

    #[test]
    fn missing_urls_key_fails() {
        let err = result_urls(r#"{"somethingElse":true}"#).unwrap_err();
        match err {
            KieError::Protocol(msg) => assert!(msg.contains("no result locators")),
            other => panic!("expected Protocol error, got {other:?}"),
        }
    }

    #[test]
    fn empty_url_list_fails() {
        let err = result_urls(r#"{"resultUrls":[]}"#).unwrap_err();
        match err {
            KieError::Protocol(msg) => assert!(msg.contains("no result locators")),
            other => panic!("expected Protocol error, got {other:?}"),
        }
    }

    #[test]
    fn extra_fields_ignored() {
        let urls =
            result_urls(r#"{"resultUrls":["http://x/img.png"],"seed":42,"cost":0.01}"#).unwrap();
        assert_eq!(urls.len(), 1);
    }
}
