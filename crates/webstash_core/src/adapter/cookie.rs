//! Cookie adapter.
//!
//! Sets a root-scoped cookie whose value is a transient resource locator
//! for the payload. Only the locator is inlined, so payload size never hits
//! the cookie size ceiling; the locator shares the lifetime caveat of the
//! key-value adapters.

use super::BackendAdapter;
use crate::capability::BackendCapability;
use crate::error::{StashError, StashResult};
use crate::host::Host;
use crate::payload::Payload;
use async_trait::async_trait;
use std::rc::Rc;

/// Adapter over the host's cookie jar.
pub struct CookieAdapter {
    host: Rc<dyn Host>,
    path: String,
}

impl CookieAdapter {
    /// Creates an adapter writing cookies scoped to `path`.
    pub fn new(host: Rc<dyn Host>, path: String) -> Self {
        Self { host, path }
    }
}

/// Finds the value of cookie `name` in a `;`-separated cookie string.
///
/// Pairs are split on the first `=`; names are trimmed, values are not.
pub(crate) fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value)
}

#[async_trait(?Send)]
impl BackendAdapter for CookieAdapter {
    fn capability(&self) -> BackendCapability {
        BackendCapability::Cookie
    }

    async fn write(&self, name: &str, payload: &Payload) -> StashResult<()> {
        let jar = self.host.cookies()?;
        let locator = self.host.locators()?.mint(payload)?;
        jar.set_cookie(&format!("{name}={locator};path={}", self.path))
    }

    async fn read(&self, name: &str) -> StashResult<Payload> {
        let cookies = self.host.cookies()?.cookie_string()?;
        let locator = find_cookie(&cookies, name).ok_or_else(|| StashError::not_found(name))?;
        self.host.locators()?.resolve(locator).await
    }
}
