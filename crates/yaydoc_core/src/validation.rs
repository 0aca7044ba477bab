//! crates/yaydoc_core/src/validation.rs
//!
//! Allow-list checks applied to caller input before it reaches the external
//! generator or the filesystem.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::domain::GenerationRequest;
use crate::ports::{PortError, PortResult};

/// Upper bound for any single request field, in bytes.
pub const MAX_FIELD_LEN: usize = 2048;

const GIT_URL_SCHEMES: [&str; 4] = ["http", "https", "git", "ssh"];

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s/\\]+@[^@\s/\\]+\.[^@\s/\\]+$").expect("email pattern is valid")
});

/// Validates every field of a generation request.
pub fn validate_request(request: &GenerationRequest) -> PortResult<()> {
    let fields = [
        ("email", request.email.as_str()),
        ("author", request.author.as_str()),
        ("git_url", request.git_url.as_str()),
        ("doc_theme", request.doc_theme.as_str()),
        ("doc_path", request.doc_path.as_str()),
        ("project_name", request.project_name.as_str()),
        ("version", request.version.as_str()),
    ];
    for (name, value) in fields {
        validate_field(name, value)?;
    }

    validate_git_url(&request.git_url)?;
    validate_email(&request.email)?;
    Ok(())
}

fn validate_field(name: &str, value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::InvalidRequest(format!("missing field `{}`", name)));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(PortError::InvalidRequest(format!(
            "field `{}` exceeds {} bytes",
            name, MAX_FIELD_LEN
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(PortError::InvalidRequest(format!(
            "field `{}` contains control characters",
            name
        )));
    }
    // A leading dash would be read as a flag by the generator.
    if value.starts_with('-') {
        return Err(PortError::InvalidRequest(format!(
            "field `{}` must not start with '-'",
            name
        )));
    }
    Ok(())
}

fn validate_git_url(raw: &str) -> PortResult<()> {
    let url = Url::parse(raw)
        .map_err(|e| PortError::InvalidRequest(format!("git_url is not a valid URL: {}", e)))?;
    if !GIT_URL_SCHEMES.contains(&url.scheme()) {
        return Err(PortError::InvalidRequest(format!(
            "git_url scheme `{}` is not supported",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(PortError::InvalidRequest("git_url has no host".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> PortResult<()> {
    if !EMAIL_SHAPE.is_match(email) {
        return Err(PortError::InvalidRequest(format!(
            "`{}` is not a valid email address",
            email
        )));
    }
    validate_path_segment("email", email)
        .map_err(|e| PortError::InvalidRequest(e.to_string()))
}

/// Checks that `value` can be used as a single directory or file name under
/// the artifact root without escaping it.
pub fn validate_path_segment(name: &str, value: &str) -> PortResult<()> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(PortError::PathTraversal(format!("{} `{}`", name, value)));
    }
    if value
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
    {
        return Err(PortError::PathTraversal(format!(
            "{} contains a path separator or control character",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            email: "a@x.com".to_string(),
            author: "A".to_string(),
            git_url: "https://example.com/r.git".to_string(),
            doc_theme: "t".to_string(),
            doc_path: "/".to_string(),
            project_name: "p".to_string(),
            version: "1.0".to_string(),
        }
    }

    fn assert_invalid(request: GenerationRequest) {
        match validate_request(&request) {
            Err(PortError::InvalidRequest(_)) => {}
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn accepts_spaces_and_punctuation_in_free_text() {
        let mut req = request();
        req.author = "Jane O'Neil & co; \"docs\"".to_string();
        req.project_name = "My Project $(whoami)".to_string();
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        let mut req = request();
        req.author = "   ".to_string();
        assert_invalid(req);

        let mut req = request();
        req.version = String::new();
        assert_invalid(req);
    }

    #[test]
    fn rejects_control_characters() {
        let mut req = request();
        req.project_name = "p\nq".to_string();
        assert_invalid(req);
    }

    #[test]
    fn rejects_flag_like_values() {
        let mut req = request();
        req.doc_theme = "-u".to_string();
        assert_invalid(req);
    }

    #[test]
    fn rejects_oversized_fields() {
        let mut req = request();
        req.author = "a".repeat(MAX_FIELD_LEN + 1);
        assert_invalid(req);
    }

    #[test]
    fn git_url_must_be_a_supported_absolute_url() {
        for bad in ["not a url", "file:///etc/passwd", "ftp://example.com/r.git", "r.git"] {
            let mut req = request();
            req.git_url = bad.to_string();
            assert_invalid(req);
        }
        for good in [
            "http://example.com/r.git",
            "git://example.com/r.git",
            "ssh://git@example.com/r.git",
        ] {
            let mut req = request();
            req.git_url = good.to_string();
            assert!(validate_request(&req).is_ok(), "{} should be accepted", good);
        }
    }

    #[test]
    fn email_must_look_like_an_address() {
        for bad in ["nobody", "a@b", "a/b@x.com", "a@x.com/..", "@x.com"] {
            let mut req = request();
            req.email = bad.to_string();
            assert_invalid(req);
        }
    }

    #[test]
    fn path_segments_reject_traversal() {
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", "a\0b"] {
            assert!(
                matches!(
                    validate_path_segment("segment", bad),
                    Err(PortError::PathTraversal(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(validate_path_segment("segment", "a..b@x.com").is_ok());
    }
}
