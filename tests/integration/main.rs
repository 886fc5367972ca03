//! Integration tests for the miner
//!
//! These tests use wiremock to stand in for the site and drive both miners
//! end-to-end against temporary output directories.

mod detail_tests;
mod listing_tests;
