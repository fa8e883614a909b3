//! Message registry: api key to request/response schema pair.
//!
//! A process-wide registry is installed once, explicitly, with [`init`] (or
//! lazily with the default message set via [`global_or_init`]). Nothing is
//! registered as a side effect of linking a module.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use super::api_key::ApiKey;
use super::messages::{
    CreateAclsRequestData, DeleteAclsRequestData, DescribeAclsRequestData, Message, Request,
};
use super::schema::Schema;
use crate::error::{Error, Result};
use crate::types::VersionRange;

/// Everything needed to encode a request and decode its response.
#[derive(Debug, Clone, Copy)]
pub struct MessageType {
    pub api_key: ApiKey,
    pub request: &'static Schema,
    pub response: &'static Schema,
    pub versions: VersionRange,
}

impl MessageType {
    pub fn of<R: Request>() -> Self {
        Self {
            api_key: R::API_KEY,
            request: R::schema(),
            response: R::Response::schema(),
            versions: R::VERSIONS,
        }
    }

    /// Flexibility of the request at `version`, which also selects the
    /// request header version.
    pub fn request_is_flexible(&self, version: i16) -> bool {
        self.request.is_flexible(version)
    }

    pub fn response_is_flexible(&self, version: i16) -> bool {
        self.response.is_flexible(version)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    messages: HashMap<ApiKey, MessageType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every message this crate defines.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<DescribeAclsRequestData>()?;
        registry.register::<CreateAclsRequestData>()?;
        registry.register::<DeleteAclsRequestData>()?;
        Ok(registry)
    }

    /// Add `R` after checking both of its schemas. Registering the same api
    /// key twice is a configuration error.
    pub fn register<R: Request>(&mut self) -> Result<()> {
        let message = MessageType::of::<R>();
        message.request.validate()?;
        message.response.validate()?;

        if self.messages.contains_key(&message.api_key) {
            return Err(Error::Config(format!(
                "{} registered twice",
                message.api_key.as_str()
            )));
        }

        tracing::debug!(
            api_key = message.api_key.as_str(),
            versions = %message.versions,
            "registered message"
        );
        self.messages.insert(message.api_key, message);
        Ok(())
    }

    pub fn get(&self, api_key: ApiKey) -> Option<&MessageType> {
        self.messages.get(&api_key)
    }

    /// The message registered for `api_key`, provided it is defined at
    /// `version`.
    pub fn lookup(&self, api_key: ApiKey, version: i16) -> Result<&MessageType> {
        let message = self
            .get(api_key)
            .ok_or(Error::UnknownApiKey(api_key.code()))?;
        if !message.versions.contains(version) {
            return Err(Error::UnsupportedVersion { api_key, version });
        }
        Ok(message)
    }

    /// Request and response schemas for `api_key` at `version`.
    pub fn message_pair(
        &self,
        api_key: ApiKey,
        version: i16,
    ) -> Result<(&'static Schema, &'static Schema)> {
        let message = self.lookup(api_key, version)?;
        Ok((message.request, message.response))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Install the process-wide registry. Fails if one is already installed.
pub fn init(registry: Registry) -> Result<()> {
    GLOBAL
        .set(registry)
        .map_err(|_| Error::RegistryAlreadyInitialized)
}

/// The process-wide registry, if installed.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// The process-wide registry, installing [`Registry::with_defaults`] on
/// first use.
pub fn global_or_init() -> Result<&'static Registry> {
    GLOBAL.get_or_try_init(Registry::with_defaults)
}
