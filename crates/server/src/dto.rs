//! Constant response bodies for the non-verification endpoints.

use serde::Serialize;

pub const SERVICE_NAME: &str = "faceverify";

const PRIVACY_STATEMENT: &str = "Uploaded photos are processed in memory only. \
Image bytes, decoded pixels, face crops and model inputs are zeroed as soon as the verification \
finishes. Nothing is written to disk, logged, or retained between requests, and \
responses carry only the verification verdict.";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: SERVICE_NAME,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub privacy: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            name: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            privacy: PRIVACY_STATEMENT,
            endpoints: vec![
                EndpointInfo {
                    method: "POST",
                    path: "/verify",
                    description: "Verify a photo of exactly one face (multipart field `image`)",
                },
                EndpointInfo {
                    method: "GET",
                    path: "/health",
                    description: "Liveness check",
                },
                EndpointInfo {
                    method: "GET",
                    path: "/",
                    description: "Service information",
                },
            ],
        }
    }
}
