// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use http::header::{CONTENT_TYPE, DATE};
use sigv2_core::{Error, Result};

use crate::constants::*;

/// SigningRequest carries every field that takes part in the string to sign.
///
/// Absent optional fields are empty strings: the string to sign reserves a
/// position for each of them regardless of content.
#[derive(Clone, Default)]
pub struct SigningRequest {
    /// HTTP method token, e.g. `GET`.
    pub verb: String,
    /// Base64 encoded content digest, or empty.
    pub content_md5: String,
    /// MIME type, or empty.
    pub content_type: String,
    /// Date in the exact textual form sent to the server.
    ///
    /// For presigned URLs this is the expiry timestamp.
    pub date: String,
    /// Request headers, keyed case-insensitively.
    ///
    /// Only the `x-amz` ones are signed.
    pub service_headers: HashMap<String, String>,
    /// Path with optional query string, in its original form.
    pub resource: String,
}

impl SigningRequest {
    /// Create a request from its required fields.
    pub fn new(
        verb: impl Into<String>,
        date: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            verb: verb.into(),
            date: date.into(),
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Set content md5.
    pub fn with_content_md5(mut self, content_md5: impl Into<String>) -> Self {
        self.content_md5 = content_md5.into();
        self
    }

    /// Set content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.service_headers.insert(name.into(), value.into());
        self
    }

    /// Add a batch of headers.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.service_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Build a signing request from http::request::Parts.
    ///
    /// Repeated `x-amz` headers are folded into one comma separated value.
    pub fn from_parts(parts: &http::request::Parts) -> Result<Self> {
        let header = |name: &str| -> Result<String> {
            match parts.headers.get(name) {
                Some(v) => Ok(v.to_str()?.to_string()),
                None => Ok(String::new()),
            }
        };

        let mut service_headers: HashMap<String, String> = HashMap::new();
        for name in parts.headers.keys() {
            if !name.as_str().starts_with(X_AMZ_PREFIX) {
                continue;
            }

            let values = parts
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().map(str::trim))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            service_headers.insert(name.as_str().to_string(), values.join(","));
        }

        Ok(Self {
            verb: parts.method.as_str().to_string(),
            content_md5: header(CONTENT_MD5)?,
            content_type: header(CONTENT_TYPE.as_str())?,
            date: header(DATE.as_str())?,
            service_headers,
            resource: parts
                .uri
                .path_and_query()
                .map(|v| v.as_str())
                .unwrap_or("/")
                .to_string(),
        })
    }
}

/// Fail with `MissingField` when a required field is empty.
pub(crate) fn ensure_present(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::missing_field(field));
    }
    Ok(())
}

impl Debug for SigningRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Header values may carry session tokens, only names are printed.
        let mut header_names: Vec<&str> =
            self.service_headers.keys().map(String::as_str).collect();
        header_names.sort_unstable();

        f.debug_struct("SigningRequest")
            .field("verb", &self.verb)
            .field("content_md5", &self.content_md5)
            .field("content_type", &self.content_type)
            .field("date", &self.date)
            .field("service_headers", &header_names)
            .field("resource", &self.resource)
            .finish()
    }
}
