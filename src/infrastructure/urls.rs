// URL helpers - redirect resolution and origin stripping for post links

use once_cell::sync::Lazy;
use reqwest::Client;
use url::Url;

use crate::error::GraphResult;

static HTTP: Lazy<Client> = Lazy::new(Client::new);

/// Follow redirects on a possibly shortened link and return the final URL.
pub async fn resolve(raw: &str) -> GraphResult<String> {
    let response = HTTP.get(raw).send().await?;
    Ok(response.url().to_string())
}

/// Strip a URL down to its canonical base: query string and fragment
/// (tracking parameters and the like) removed.
pub fn base(raw: &str) -> GraphResult<String> {
    let mut parsed = Url::parse(raw)?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}
