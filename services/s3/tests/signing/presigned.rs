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

use chrono::TimeZone;
use chrono::Utc;
use http::Request;
use pretty_assertions::assert_eq;
use sigv2_core::{ErrorKind, Result};
use sigv2_s3::{query_string_to_sign, sign_query, RequestSigner, SigningRequest};

use super::example_credential;

#[test]
fn test_presigned_get() -> Result<()> {
    let req = SigningRequest::new("GET", "1175139620", "/johnsmith/photos/puppy.jpg");

    assert_eq!(
        "GET\n\n\n1175139620\n/johnsmith/photos/puppy.jpg",
        query_string_to_sign(&req)?
    );
    assert_eq!("NpgCjnDzrM+WFzoENXmpNDUsSn8=", sign_query(&req, &example_credential())?);
    Ok(())
}

#[test]
fn test_presigned_ignores_verb_and_content() -> Result<()> {
    let get = SigningRequest::new("GET", "1175139620", "/johnsmith/photos/puppy.jpg");
    let put = SigningRequest::new("PUT", "1175139620", "/johnsmith/photos/puppy.jpg")
        .with_content_md5("4gJE4saaMU4BqNR0kLY+lw==")
        .with_content_type("image/jpeg")
        .with_header("x-amz-acl", "public-read");

    assert_eq!(
        sign_query(&get, &example_credential())?,
        sign_query(&put, &example_credential())?
    );
    Ok(())
}

#[test]
fn test_presigned_with_response_override() -> Result<()> {
    let signer = RequestSigner::new().with_bucket("johnsmith");

    let (parts, _) = Request::get(
        "http://johnsmith.s3.amazonaws.com/photos/puppy.jpg?response-content-disposition=attachment%3B%20filename%3Dpuppy.jpg",
    )
    .body(())
    .unwrap()
    .into_parts();
    let signature = signer.sign_query(
        &parts,
        &example_credential(),
        Utc.timestamp_opt(1175139620, 0).unwrap(),
    )?;

    assert_eq!("ZDoil0fFb3xC4bVki6yoEU6Crfw=", signature);
    Ok(())
}

#[test]
fn test_presigned_missing_expiry() {
    let req = SigningRequest::new("GET", "", "/johnsmith/photos/puppy.jpg");

    let err = sign_query(&req, &example_credential()).unwrap_err();
    assert_eq!(ErrorKind::MissingField, err.kind());
}
