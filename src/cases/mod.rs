// File: cases/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shipped conformance suite. Each module holds the cases for one area
//! of RFC 7230/7231 behavior; registration order below is execution order.

pub mod chunked;
pub mod concurrency;
pub mod content_length;
pub mod get;
pub mod header_field;
pub mod keep_alive;
pub mod request_line;

use crate::runner::TestCase;

pub fn all_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("get.root", |c| Box::pin(get::root(c))),
        TestCase::new("get.missing_resource", |c| {
            Box::pin(get::missing_resource(c))
        }),
        TestCase::new("get.unknown_method", |c| Box::pin(get::unknown_method(c))),
        TestCase::new("get.second_port", |c| Box::pin(get::second_port(c))),
        TestCase::new("get.head_has_no_body", |c| Box::pin(get::head_has_no_body(c))),
        TestCase::new("request_line.http_1_0", |c| {
            Box::pin(request_line::http_1_0(c))
        }),
        TestCase::new("request_line.bad_version", |c| {
            Box::pin(request_line::bad_version(c))
        }),
        TestCase::new("header_field.space_before_colon", |c| {
            Box::pin(header_field::space_before_colon(c))
        }),
        TestCase::new("header_field.empty_name", |c| {
            Box::pin(header_field::empty_name(c))
        }),
        TestCase::new("header_field.missing_colon", |c| {
            Box::pin(header_field::missing_colon(c))
        }),
        TestCase::new("header_field.empty_value", |c| {
            Box::pin(header_field::empty_value(c))
        }),
        TestCase::new("header_field.mandatory_headers", |c| {
            Box::pin(header_field::mandatory_headers(c))
        }),
        TestCase::new("header_field.missing_host", |c| {
            Box::pin(header_field::missing_host(c))
        }),
        TestCase::new("header_field.duplicate_host", |c| {
            Box::pin(header_field::duplicate_host(c))
        }),
        TestCase::new("content_length.negative", |c| {
            Box::pin(content_length::negative(c))
        }),
        TestCase::new("content_length.overflowing", |c| {
            Box::pin(content_length::overflowing(c))
        }),
        TestCase::new("content_length.non_numeric", |c| {
            Box::pin(content_length::non_numeric(c))
        }),
        TestCase::new("content_length.duplicate_differing", |c| {
            Box::pin(content_length::duplicate_differing(c))
        }),
        TestCase::new("content_length.with_chunked", |c| {
            Box::pin(content_length::with_chunked(c))
        }),
        TestCase::new("content_length.over_server_limit", |c| {
            Box::pin(content_length::over_server_limit(c))
        }),
        TestCase::new("chunked.post", |c| Box::pin(chunked::post(c))),
        TestCase::new("chunked.with_trailer", |c| Box::pin(chunked::with_trailer(c))),
        TestCase::new("chunked.zero_padded_last_chunk", |c| {
            Box::pin(chunked::zero_padded_last_chunk(c))
        }),
        TestCase::new("keep_alive.two_requests", |c| {
            Box::pin(keep_alive::two_requests(c))
        }),
        TestCase::new("concurrency.hundred_gets", |c| {
            Box::pin(concurrency::hundred_gets(c))
        }),
    ]
}
