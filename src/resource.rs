use url::Url;

use crate::session::AuthToken;

/// Just a wrapper around a URL and an optional bearer token
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
    token: Option<AuthToken>,
}

impl Resource {
    pub fn new(url: Url, token: Option<AuthToken>) -> Self {
        Self { url, token }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn token(&self) -> Option<&AuthToken> { self.token.as_ref() }

    /// Build a new Resource by keeping the same scheme and server as `self`, but changing the path part
    pub fn combine(&self, new_path: &str) -> Resource {
        let mut built = (*self).clone();
        built.url.set_path(new_path);
        built
    }

    /// Same as `self`, with credentials attached
    pub fn authenticated(&self, token: &AuthToken) -> Resource {
        Resource { url: self.url.clone(), token: Some(token.clone()) }
    }
}
