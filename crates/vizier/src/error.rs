// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("query service rejected the request: {message}")]
    Service {
        message: String,
        guidance: Option<String>,
    },
    #[error("malformed service response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a query is already in flight; wait for it to settle before resubmitting")]
    QueryPending,
}

#[derive(Error, Debug)]
pub enum VizierError {
    #[error("query service error: {0}")]
    Client(#[from] ClientError),
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),
}

pub type Result<T> = std::result::Result<T, VizierError>;

impl VizierError {
    pub fn category(&self) -> &'static str {
        match self {
            VizierError::Client(ClientError::Transport(_)) => "Transport",
            VizierError::Client(ClientError::Service { .. }) => "Service",
            VizierError::Client(ClientError::Decode(_)) => "Decode",
            VizierError::Controller(_) => "Controller",
        }
    }

    /// User-facing guidance carried by a service rejection, when present.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            VizierError::Client(ClientError::Service { guidance, .. }) => guidance.as_deref(),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            VizierError::Client(ClientError::Transport(_)) => {
                "The insight service could not be reached. Please try again.".to_string()
            }
            VizierError::Client(ClientError::Service { message, .. }) => message.clone(),
            VizierError::Client(ClientError::Decode(_)) => {
                "The insight service returned an unreadable response.".to_string()
            }
            VizierError::Controller(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_expose_guidance() {
        let err = VizierError::Client(ClientError::Service {
            message: "no such database".to_string(),
            guidance: Some("check the connection id".to_string()),
        });
        assert_eq!(err.category(), "Service");
        assert_eq!(err.guidance(), Some("check the connection id"));
        assert_eq!(err.user_message(), "no such database");
    }

    #[test]
    fn controller_errors_have_no_guidance() {
        let err = VizierError::Controller(ControllerError::QueryPending);
        assert_eq!(err.category(), "Controller");
        assert_eq!(err.guidance(), None);
    }
}
