//! Request URL construction for the current-conditions endpoint.

use std::fmt;

use url::Url;

use crate::error::QueryError;

const CURRENT_ENDPOINT: &str = "current.json";

/// A place name or a `"lat,lon"` pair, trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn new(text: impl AsRef<str>) -> Result<Self, QueryError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Query for a device position, rendered the way the provider expects: `"lat,lon"`.
    pub fn from_coordinates(lat: f64, lon: f64) -> Result<Self, QueryError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        if !valid {
            return Err(QueryError::InvalidCoordinates { lat, lon });
        }

        Ok(Self(format!("{lat},{lon}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocationQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build `{base_url}/current.json?key={api_key}&q={query}` with both values
/// form-urlencoded. Any query or fragment already on `base_url` is dropped.
pub fn build_request_url(base_url: &Url, query: &str, api_key: &str) -> Result<Url, QueryError> {
    let query = LocationQuery::new(query)?;

    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| {
            QueryError::EncodingFailed(format!("base URL `{base_url}` cannot carry a path"))
        })?
        .pop_if_empty()
        .push(CURRENT_ENDPOINT);

    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("key", api_key)
        .append_pair("q", query.as_str());

    Ok(url)
}
