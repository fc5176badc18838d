//! Canvas REST API client

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::download::write_stream;
use super::error::{RemoteError, RemoteResult};
use super::Remote;
use crate::types::{CourseEntry, CourseId, FolderEntry, RemoteFile};

// One `<url>; rel="next"` element of a Link header
static NEXT_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>]+)>\s*;[^,]*\brel="?next"?"#).unwrap());

/// Blocking client for the Canvas REST API
pub struct CanvasClient {
    client: Client,
    base_url: Url,
    token: String,
    per_page: u32,
}

impl CanvasClient {
    /// Create a client for `base_url` authenticating with `token`
    pub fn new(base_url: Url, token: &str, per_page: u32, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("coursesync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
            per_page,
        })
    }

    /// Build an API URL under the base, e.g. `courses/42/files`
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> RemoteResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/api/v1/{}", base, path))
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("per_page", &self.per_page.to_string());
        }

        Ok(url)
    }

    /// GET every page of a listing, following `rel="next"` links
    fn get_paginated<T: DeserializeOwned>(&self, first: Url) -> RemoteResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first.to_string());

        while let Some(url) = next {
            trace!(%url, "fetching listing page");
            let response = self.client.get(&url).bearer_auth(&self.token).send()?;
            let response = check_status(response, &url)?;

            next = next_link(response.headers());
            let page: Vec<T> = response.json()?;
            items.extend(page);
        }

        Ok(items)
    }
}

impl Remote for CanvasClient {
    fn courses(&self) -> RemoteResult<Vec<CourseEntry>> {
        let url = self.endpoint("courses", &[("enrollment_state", "active")])?;
        let courses: Vec<CourseEntry> = self.get_paginated(url)?;
        debug!(count = courses.len(), "listed courses");
        Ok(courses)
    }

    fn folders(&self, course: CourseId) -> RemoteResult<Vec<FolderEntry>> {
        let url = self.endpoint(&format!("courses/{}/folders", course), &[])?;
        self.get_paginated(url)
    }

    fn files(&self, course: CourseId) -> RemoteResult<Vec<RemoteFile>> {
        let url = self.endpoint(&format!("courses/{}/files", course), &[])?;
        self.get_paginated(url)
    }

    fn download(&self, file: &RemoteFile, dest: &Path, cancel: &AtomicBool) -> RemoteResult<u64> {
        // File URLs are pre-signed, the API credential is not sent with them
        let response = self.client.get(&file.url).send()?;
        let response = check_status(response, &file.url)?;
        write_stream(response, dest, file.size, cancel)
    }
}

fn check_status(response: Response, url: &str) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// The `rel="next"` target of a Link header, if any
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            NEXT_LINK_REGEX
                .captures(value)
                .map(|caps| caps[1].to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client(base: &str) -> CanvasClient {
        CanvasClient::new(Url::parse(base).unwrap(), "t0ken", 100, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_next_link() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://canvas.example/api/v1/courses?page=1&per_page=100>; rel=\"current\",\
                 <https://canvas.example/api/v1/courses?page=2&per_page=100>; rel=\"next\",\
                 <https://canvas.example/api/v1/courses?page=5&per_page=100>; rel=\"last\"",
            ),
        );
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://canvas.example/api/v1/courses?page=2&per_page=100")
        );
    }

    #[test]
    fn test_next_link_absent_on_last_page() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://canvas.example/api/v1/courses?page=1>; rel=\"first\",\
                 <https://canvas.example/api/v1/courses?page=1>; rel=\"last\"",
            ),
        );
        assert_eq!(next_link(&headers), None);
        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn test_endpoint() {
        let url = client("https://canvas.example/")
            .endpoint("courses", &[("enrollment_state", "active")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://canvas.example/api/v1/courses?enrollment_state=active&per_page=100"
        );

        let url = client("https://school.example/lms")
            .endpoint("courses/7/folders", &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://school.example/lms/api/v1/courses/7/folders?per_page=100"
        );
    }
}
