//! Middleware module
//!
//! This module provides HTTP middleware layers

pub mod logging;
