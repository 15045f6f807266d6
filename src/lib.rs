//! postboard: blog index front-end that loads posts from a remote API and
//! renders them with category filtering.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
