//! Core engine infrastructure

pub mod cache;
