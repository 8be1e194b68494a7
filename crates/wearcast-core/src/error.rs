//! Centralized error types for the Wearcast application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling in the session and CLI
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;
use wearcast_weather::WeatherError;

/// Top-level application error type.
///
/// Use `user_message()` to get a message fit for the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    /// A lookup was requested while another one is still running.
    #[error("A weather lookup is already in progress")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Preferences(e) => e.user_message().to_string(),
            // Transport failures get the finer-grained network wording
            AppError::Weather(WeatherError::Network(e)) => {
                e.into_network_error().user_message().to_string()
            }
            AppError::Weather(e) => e.user_message(),
            AppError::Busy => "Still fetching the weather. Please wait.".to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Classification of transport failures, used to word network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Preference storage errors.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to read preferences: {0}")]
    Read(String),

    #[error("Failed to write preferences: {0}")]
    Write(String),
}

impl PreferencesError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PreferencesError::Read(_) => "Saved preferences could not be loaded. Using defaults.",
            PreferencesError::Write(_) => "Your preferences could not be saved.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for &reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
