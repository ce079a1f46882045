use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::Token;
use crate::error::{AdoLensError, Result};

pub(super) const API_VERSION: &str = "7.1";
pub(super) const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";
pub(super) const PAGE_SIZE: usize = 100;

/// A decoded response body plus the continuation token Azure DevOps sends
/// when more pages are available.
pub(super) struct Page<T> {
    pub body: T,
    pub continuation_token: Option<String>,
}

pub struct AzureDevOpsClient {
    client: Client,
    organization_url: Url,
    token: Option<Token>,
}

impl AzureDevOpsClient {
    pub fn new(organization_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("adolens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let organization_url = Url::parse(organization_url)?;

        if organization_url.cannot_be_a_base() {
            return Err(AdoLensError::Config(format!(
                "Organization URL must be an http(s) URL, got: {organization_url}"
            )));
        }

        Ok(Self {
            client,
            organization_url,
            token,
        })
    }

    /// Organization name: the last path segment for `dev.azure.com/{org}`,
    /// otherwise the host (legacy `{org}.visualstudio.com` URLs).
    pub fn organization(&self) -> String {
        self.organization_url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .or_else(|| self.organization_url.host_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Builds `{org}/[{project}/]_apis/{segments..}?api-version=..` with every
    /// segment percent-encoded.
    pub(super) fn api_url(&self, project: Option<&str>, segments: &[&str]) -> Result<Url> {
        let mut url = self.organization_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AdoLensError::Config(format!(
                    "Organization URL cannot hold a path: {}",
                    self.organization_url
                ))
            })?
            .pop_if_empty()
            .extend(project)
            .push("_apis")
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request.basic_auth("", Some(token.as_str()))
        } else {
            request
        }
    }

    pub(super) async fn get<T>(&self, url: Url) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");
        self.send(self.client.get(url)).await
    }

    pub(super) async fn post<T, B>(&self, url: Url, body: &B) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("POST {url}");
        self.send(self.client.post(url).json(body)).await
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        // Azure DevOps answers bad credentials with a 203 sign-in page.
        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION || status == StatusCode::UNAUTHORIZED
        {
            return Err(AdoLensError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AdoLensError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let continuation_token = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        Ok(Page {
            body,
            continuation_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::Value;

    #[test]
    fn rejects_invalid_organization_url() {
        let result = AzureDevOpsClient::new("not a url", None);
        assert!(matches!(
            result,
            Err(AdoLensError::Url(url::ParseError::RelativeUrlWithoutBase))
        ));
    }

    #[test]
    fn rejects_non_hierarchical_url() {
        let result = AzureDevOpsClient::new("mailto:someone@example.com", None);
        assert!(matches!(result, Err(AdoLensError::Config(_))));
    }

    #[test]
    fn derives_organization_from_path() {
        let client = AzureDevOpsClient::new("https://dev.azure.com/fabrikam/", None).unwrap();
        assert_eq!(client.organization(), "fabrikam");
    }

    #[test]
    fn derives_organization_from_legacy_host() {
        let client = AzureDevOpsClient::new("https://fabrikam.visualstudio.com", None).unwrap();
        assert_eq!(client.organization(), "fabrikam.visualstudio.com");
    }

    #[test]
    fn builds_project_scoped_urls_with_encoding() {
        let client = AzureDevOpsClient::new("https://dev.azure.com/fabrikam/", None).unwrap();
        let url = client
            .api_url(Some("Fabrikam Fiber"), &["build", "builds"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/fabrikam/Fabrikam%20Fiber/_apis/build/builds?api-version=7.1"
        );
    }

    #[test]
    fn builds_organization_scoped_urls() {
        let client = AzureDevOpsClient::new("https://dev.azure.com/fabrikam", None).unwrap();
        let url = client.api_url(None, &["projects"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/fabrikam/_apis/projects?api-version=7.1"
        );
    }

    #[tokio::test]
    async fn sends_token_as_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/org/_apis/projects")
            .match_query(Matcher::Any)
            .match_header("authorization", "Basic OnNlY3JldA==")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header(CONTINUATION_HEADER, "next-page")
            .with_body(r#"{"count":0,"value":[]}"#)
            .create_async()
            .await;

        let client =
            AzureDevOpsClient::new(&format!("{}/org", server.url()), Some(Token::from("secret")))
                .unwrap();
        let url = client.api_url(None, &["projects"]).unwrap();
        let page: Page<Value> = client.get(url).await.unwrap();

        assert_eq!(page.continuation_token.as_deref(), Some("next-page"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_sign_in_page_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/org/_apis/projects")
            .match_query(Matcher::Any)
            .with_status(203)
            .with_header("content-type", "text/html")
            .with_body("<html>Sign in</html>")
            .create_async()
            .await;

        let client = AzureDevOpsClient::new(&format!("{}/org", server.url()), None).unwrap();
        let url = client.api_url(None, &["projects"]).unwrap();
        let result: Result<Page<Value>> = client.get(url).await;

        assert!(matches!(result, Err(AdoLensError::Unauthorized { status: 203 })));
    }

    #[tokio::test]
    async fn surfaces_api_errors_with_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/org/missing/_apis/pipelines")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("project not found")
            .create_async()
            .await;

        let client = AzureDevOpsClient::new(&format!("{}/org", server.url()), None).unwrap();
        let url = client.api_url(Some("missing"), &["pipelines"]).unwrap();
        let result: Result<Page<Value>> = client.get(url).await;

        match result {
            Err(AdoLensError::ApiError { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "project not found");
            }
            other => panic!("expected ApiError, got {:?}", other.map(|p| p.body)),
        }
    }

    #[tokio::test]
    async fn reports_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/org/_apis/projects")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let client = AzureDevOpsClient::new(&format!("{}/org", server.url()), None).unwrap();
        let url = client.api_url(None, &["projects"]).unwrap();
        let result: Result<Page<Value>> = client.get(url).await;

        assert!(matches!(result, Err(AdoLensError::Json(_))));
    }
}
