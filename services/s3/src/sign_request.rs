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

//! Signature version 2 signing.

use std::fmt::Write;

use http::header::{AUTHORIZATION, DATE};
use http::HeaderValue;
use log::debug;
use sigv2_core::hash::base64_hmac_sha1;
use sigv2_core::time::{format_http_date, format_timestamp, now, DateTime};
use sigv2_core::Result;

use crate::canonical::{canonicalize_headers, canonicalize_resource};
use crate::constants::*;
use crate::credential::Credential;
use crate::request::{ensure_present, SigningRequest};

/// Construct string to sign for header based authentication.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// [CanonicalizedAmzHeaders + "\n"] +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Signing and authenticating REST requests](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html)
pub fn string_to_sign(req: &SigningRequest) -> Result<String> {
    ensure_present("verb", &req.verb)?;
    ensure_present("date", &req.date)?;
    let resource = canonicalize_resource(&req.resource)?;
    let headers = canonicalize_headers(&req.service_headers);

    let mut s = String::new();
    writeln!(&mut s, "{}", req.verb)?;
    writeln!(&mut s, "{}", req.content_md5)?;
    writeln!(&mut s, "{}", req.content_type)?;
    writeln!(&mut s, "{}", req.date)?;
    if !headers.is_empty() {
        writeln!(&mut s, "{headers}")?;
    }
    s.write_str(&resource)?;

    debug!("string to sign: {s:?}");
    Ok(s)
}

/// Construct string to sign for presigned URLs.
///
/// Verb, content md5 and content type are fixed, whatever the request says.
///
/// ## Format
///
/// ```text
/// "GET\n" +
/// "\n" +
/// "\n" +
/// Expires + "\n" +
/// CanonicalizedResource;
/// ```
pub fn query_string_to_sign(req: &SigningRequest) -> Result<String> {
    ensure_present("date", &req.date)?;
    let resource = canonicalize_resource(&req.resource)?;

    let s = format!("{PRESIGNED_VERB}\n\n\n{}\n{resource}", req.date);

    debug!("query string to sign: {s:?}");
    Ok(s)
}

/// Compute the header form signature of a request.
pub fn sign(req: &SigningRequest, cred: &Credential) -> Result<String> {
    let string_to_sign = string_to_sign(req)?;
    Ok(base64_hmac_sha1(
        cred.secret_access_key.as_bytes(),
        string_to_sign.as_bytes(),
    ))
}

/// Compute the query form signature of a request, used as the `Signature`
/// parameter of a presigned URL.
pub fn sign_query(req: &SigningRequest, cred: &Credential) -> Result<String> {
    let string_to_sign = query_string_to_sign(req)?;
    Ok(base64_hmac_sha1(
        cred.secret_access_key.as_bytes(),
        string_to_sign.as_bytes(),
    ))
}

/// Render the `Authorization` header value: `AWS <access_key_id>:<signature>`.
pub fn authorization(req: &SigningRequest, cred: &Credential) -> Result<String> {
    let signature = sign(req, cred)?;
    Ok(format!(
        "{AUTHORIZATION_SCHEME} {}:{signature}",
        cred.access_key_id
    ))
}

/// RequestSigner signs `http` requests in place.
///
/// - [Authenticating Requests (AWS Signature Version 2)](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html)
#[derive(Debug, Default)]
pub struct RequestSigner {
    bucket: Option<String>,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for path style requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every signed resource with `/<bucket>`.
    ///
    /// Needed for virtual hosted style requests where the bucket lives in
    /// the host instead of the path.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request with an `Authorization` header.
    ///
    /// A `Date` header is added when the request carries none, and the
    /// session token of temporary credentials is sent as
    /// `x-amz-security-token`. Headers are only written once the signature
    /// has been computed.
    pub fn sign_header(&self, parts: &mut http::request::Parts, cred: &Credential) -> Result<()> {
        let mut req = self.build(parts)?;

        let date = if parts.headers.contains_key(DATE) {
            None
        } else {
            let date = format_http_date(self.time.unwrap_or_else(now));
            req.date.clone_from(&date);
            Some(HeaderValue::from_str(&date)?)
        };

        let token = match &cred.security_token {
            Some(token) => {
                req.service_headers
                    .insert(X_AMZ_SECURITY_TOKEN.to_string(), token.clone());
                let mut value = HeaderValue::from_str(token)?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        let mut value = HeaderValue::from_str(&authorization(&req, cred)?)?;
        value.set_sensitive(true);

        if let Some(date) = date {
            parts.headers.insert(DATE, date);
        }
        if let Some(token) = token {
            parts.headers.insert(X_AMZ_SECURITY_TOKEN, token);
        }
        parts.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Compute the signature of a presigned URL for the request.
    ///
    /// Assembling the URL with `AWSAccessKeyId`, `Expires` and `Signature`
    /// stays with the caller.
    pub fn sign_query(
        &self,
        parts: &http::request::Parts,
        cred: &Credential,
        expires_at: DateTime,
    ) -> Result<String> {
        let mut req = self.build(parts)?;
        req.date = format_timestamp(expires_at);

        sign_query(&req, cred)
    }

    fn build(&self, parts: &http::request::Parts) -> Result<SigningRequest> {
        let mut req = SigningRequest::from_parts(parts)?;
        if let Some(bucket) = &self.bucket {
            req.resource = format!("/{bucket}{}", req.resource);
        }
        Ok(req)
    }
}
