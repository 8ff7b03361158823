//! HTTP access to the Taskify backend.
//!
//! This module provides the REST client and its typed error.

pub mod client;
pub mod error;

pub use client::{
    Ack, ApiClient, AuthSession, ClientConfig, Invitation, NewProject, Onboarding, SettingsUpdate,
};
pub use error::ApiError;
