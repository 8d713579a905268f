//! Repository URL parsing

use url::Url;

use crate::{Error, Result};

/// Parse a repository URL
pub fn parse(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::Validation("Repository URL not specified".to_string()));
    }
    Ok(Url::parse(input)?)
}

/// Parse a git remote, accepting scp-like `user@host:path` syntax
///
/// `git@github.com:owner/repo.git` becomes
/// `ssh://git@github.com/owner/repo.git`.
pub fn parse_git(input: &str) -> Result<Url> {
    let input = input.trim();
    if !input.contains("://") {
        if let Some((authority, path)) = input.split_once(':') {
            if authority.contains('@') && !authority.contains('/') {
                let path = path.trim_start_matches('/');
                return Ok(Url::parse(&format!("ssh://{}/{}", authority, path))?);
            }
        }
    }
    parse(input)
}

/// Host of the URL, empty for host-less URLs such as `file://`
pub fn host(url: &Url) -> &str {
    url.host_str().unwrap_or("")
}

/// Last non-empty path segment
pub fn file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https() {
        let url = parse("https://svn.example.com/repo").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(host(&url), "svn.example.com");
        assert_eq!(url.path(), "/repo");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(parse("  "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse("not a url"), Err(Error::Url(_))));
    }

    #[test]
    fn test_parse_git_scp_like() {
        let url = parse_git("git@github.com:owner/repo.git").unwrap();
        assert_eq!(url.scheme(), "ssh");
        assert_eq!(url.username(), "git");
        assert_eq!(host(&url), "github.com");
        assert_eq!(url.path(), "/owner/repo.git");
    }

    #[test]
    fn test_parse_git_https() {
        let url = parse_git("https://github.com/owner/repo").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "/owner/repo");
    }

    #[test]
    fn test_file_name() {
        let url = parse("https://repo.example.com/maven/app/1.0/app-1.0.war").unwrap();
        assert_eq!(file_name(&url).as_deref(), Some("app-1.0.war"));
        let url = parse("https://repo.example.com/").unwrap();
        assert_eq!(file_name(&url), None);
    }
}
