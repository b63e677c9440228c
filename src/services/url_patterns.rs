// Classification of tab URLs: watch/shorts pages, the video site's domain, and hostname keys.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static WATCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://([^/]+\.)?youtube\.com/watch\?").expect("watch pattern is valid")
});

static SHORTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://([^/]+\.)?youtube\.com/shorts/").expect("shorts pattern is valid")
});

static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|\.)youtube\.com$").expect("domain pattern is valid"));

/// Single-video or short-form video page.
pub fn is_watch_url(url: &str) -> bool {
    WATCH_RE.is_match(url) || SHORTS_RE.is_match(url)
}

/// Hostname used to group tabs. Falls back to the raw string when unparsable.
pub fn hostname_key(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Any page on the video site, watch page or not.
pub fn is_matching_domain(url: &str) -> bool {
    let host = hostname_key(url);
    !host.is_empty() && DOMAIN_RE.is_match(&host)
}
