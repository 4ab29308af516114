//! HTTP request handlers

pub mod stream;
pub mod upload;
