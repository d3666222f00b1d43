// Picture entity - recovers the origin image behind proxied CDN urls

use std::collections::HashMap;
use std::fmt;
use tracing::warn;
use url::Url;

/// Image attached to a post. Feed items carry proxied thumbnail URLs whose
/// query string names the true origin and its declared dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// The URL exactly as the feed item carried it.
    pub url: String,
    /// True origin image, or the raw URL when it is not of the proxied form.
    pub origin: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub basename: String,
}

impl Picture {
    /// Parsing never fails: a URL without the proxy parameters, or one that
    /// does not parse at all, falls back to the whole string as origin with
    /// unknown dimensions.
    pub fn parse(raw: &str) -> Self {
        let mut origin = raw.to_string();
        let mut width = None;
        let mut height = None;

        match Url::parse(raw) {
            Ok(parsed) => {
                let mut pairs: HashMap<String, String> =
                    parsed.query_pairs().into_owned().collect();
                if let Some(proxied) = pairs.remove("url") {
                    origin = proxied;
                    width = pairs.get("w").and_then(|value| value.parse().ok());
                    height = pairs.get("h").and_then(|value| value.parse().ok());
                }
            }
            Err(_) => {
                warn!(url = raw, "picture url did not parse, keeping it verbatim");
            }
        }

        let basename = origin.rsplit('/').next().unwrap_or("").to_string();
        Self {
            url: raw.to_string(),
            origin,
            width,
            height,
            basename,
        }
    }
}

impl fmt::Display for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.width, self.height) {
            (Some(width), Some(height)) => {
                write!(f, "Picture {} ({}x{})", self.basename, width, height)
            }
            _ => write!(f, "Picture {}", self.basename),
        }
    }
}
