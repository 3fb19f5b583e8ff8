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

//! Canonical forms of the request headers and resource.

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::str::FromStr;

use http::uri::PathAndQuery;
use log::debug;
use sigv2_core::{Error, Result};

use crate::constants::*;
use crate::request::ensure_present;

/// Canonicalize the `x-amz` headers of a request.
///
/// - ignore headers whose lower-cased name does not start with `x-amz`
/// - lower-case names
/// - sort by name
/// - trim whitespace around the `:` separator
/// - join with newline
///
/// Two names that only differ in case fold into one line; the value of the
/// lexicographically greatest original name wins.
///
/// ## Reference
///
/// - [Constructing the CanonicalizedAmzHeaders Element](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html#RESTAuthenticationConstructingCanonicalizedAmzHeaders)
pub fn canonicalize_headers(headers: &HashMap<String, String>) -> String {
    let mut picked: BTreeMap<String, (&str, &str)> = BTreeMap::new();
    for (k, v) in headers {
        let name = k.trim().to_lowercase();
        if !name.starts_with(X_AMZ_PREFIX) {
            continue;
        }

        match picked.entry(name) {
            Entry::Vacant(e) => {
                e.insert((k.as_str(), v.as_str()));
            }
            Entry::Occupied(mut e) => {
                if k.as_str() > e.get().0 {
                    e.insert((k.as_str(), v.as_str()));
                }
            }
        }
    }

    let mut s = String::with_capacity(16);
    for (idx, (name, (_, value))) in picked.iter().enumerate() {
        if idx != 0 {
            s.push('\n');
        }

        s.push_str(name);
        s.push(':');
        s.push_str(value.trim());
    }

    s
}

/// Canonicalize the resource of a request.
///
/// The path is kept as is. Query parameters that are not sub-resources are
/// dropped, the remaining ones are sorted by name and rendered as `name` or
/// `name=value`. Values are percent-decoded and inserted without encoding
/// them again.
///
/// ## Reference
///
/// - [Constructing the CanonicalizedResource Element](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html#ConstructingTheCanonicalizedResourceElement)
pub fn canonicalize_resource(resource: &str) -> Result<String> {
    ensure_present("resource", resource)?;
    if !resource.starts_with('/') {
        return Err(Error::invalid_resource(format!(
            "resource {resource:?} must start with '/'"
        )));
    }

    // Object keys may carry raw spaces, sign them the way they go on the wire.
    let escaped = if resource.contains(' ') {
        Cow::Owned(resource.replace(' ', "%20"))
    } else {
        Cow::Borrowed(resource)
    };
    let paq = PathAndQuery::from_str(&escaped).map_err(|e| {
        Error::invalid_resource(format!("resource {resource:?} is not a valid path and query"))
            .with_source(e)
    })?;

    // Repeated sub-resources are joined with `,` in order of appearance.
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(query) = paq.query() {
        for (k, v) in form_urlencoded::parse(query.as_bytes()) {
            if !is_sub_resource(&k) {
                continue;
            }
            params.entry(k.into_owned()).or_default().push(v.into_owned());
        }
    }

    let mut s = String::with_capacity(resource.len());
    s.push_str(paq.path());
    for (idx, (k, values)) in params.iter().enumerate() {
        s.push(if idx == 0 { '?' } else { '&' });
        s.push_str(k);

        let value = values.join(",");
        if !value.is_empty() {
            s.push('=');
            s.push_str(&value);
        }
    }

    debug!("canonical resource: {s}");
    Ok(s)
}

fn is_sub_resource(param: &str) -> bool {
    SUBRESOURCES.contains(param)
}
