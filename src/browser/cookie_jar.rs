//! Netscape `cookies.txt` jars, as exported by browser "cookies.txt" add-ons
//! and by tools such as yt-dlp.

use url::Url;

use crate::domain::BrowserCookie;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq)]
pub struct JarCookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds, 0 for session cookies.
    pub expires: i64,
    pub name: String,
    pub value: String,
}

impl JarCookie {
    fn parse_line(line: &str) -> Option<Self> {
        // HttpOnly lines look like comments but carry a cookie.
        let line = line.strip_prefix(HTTP_ONLY_PREFIX).unwrap_or(line);

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            return None;
        }

        let domain = fields[0].trim().to_ascii_lowercase();
        if domain.is_empty() {
            return None;
        }

        Some(Self {
            include_subdomains: fields[1].eq_ignore_ascii_case("TRUE") || domain.starts_with('.'),
            domain,
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            expires: fields[4].trim().parse().unwrap_or(0),
            name: fields[5].to_string(),
            // Values may legally contain tabs.
            value: fields[6..].join("\t"),
        })
    }

    fn bare_domain(&self) -> &str {
        self.domain.trim_start_matches('.')
    }

    fn domain_matches(&self, host: &str) -> bool {
        let domain = self.bare_domain();
        if host == domain {
            return true;
        }
        self.include_subdomains
            && host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
    }

    fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/')
                || request_path.as_bytes().get(self.path.len()) == Some(&b'/'))
    }

    fn is_expired(&self, now: i64) -> bool {
        self.expires > 0 && self.expires <= now
    }

    /// Whether a browser would attach this cookie to a request for `url`.
    pub fn applies_to(&self, url: &Url, now: i64) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        if self.secure && url.scheme() != "https" {
            return false;
        }

        self.domain_matches(&host) && self.path_matches(url.path()) && !self.is_expired(now)
    }
}

impl From<&JarCookie> for BrowserCookie {
    fn from(cookie: &JarCookie) -> Self {
        Self {
            domain: cookie.domain.clone(),
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            path: cookie.path.clone(),
            expires_at: (cookie.expires > 0).then_some(cookie.expires as f64),
        }
    }
}

/// Parse a jar, skipping comments and malformed lines.
pub fn parse(contents: &str) -> Vec<JarCookie> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| {
            !line.trim().is_empty()
                && (!line.starts_with('#') || line.starts_with(HTTP_ONLY_PREFIX))
        })
        .filter_map(|line| {
            let parsed = JarCookie::parse_line(line);
            if parsed.is_none() {
                tracing::debug!("Skipping malformed cookie line");
            }
            parsed
        })
        .collect()
}

/// Cookies from `jar` that apply to `url`, in jar order.
pub fn cookies_for(jar: &[JarCookie], url: &Url, now: i64) -> Vec<BrowserCookie> {
    jar.iter()
        .filter(|c| c.applies_to(url, now))
        .map(BrowserCookie::from)
        .collect()
}
