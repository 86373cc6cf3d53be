//! Test suite for crmsync
//!
//! This module organizes all tests

pub mod common;
