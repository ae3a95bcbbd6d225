//! Cloud API client surface.
//!
//! [`CloudClient::configure`] binds a resolved credential set;
//! [`CloudClient::connect`] opens a handle on one service. Every service
//! goes through the same path, so adding one is a new [`ServiceKind`]
//! variant and its endpoint rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::{
    AwsCredentials, ConfigLookup, CredentialError, CredentialResolver, PartialAwsCredentials,
};

/// Region Route 53 requests are signed for.
const GLOBAL_SIGNING_REGION: &str = "us-east-1";

/// Cloud services a client can connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Elastic compute.
    Ec2,
    /// DNS. A global service with a single endpoint.
    Route53,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Ec2 => write!(f, "ec2"),
            ServiceKind::Route53 => write!(f, "route53"),
        }
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ec2" => Ok(ServiceKind::Ec2),
            "route53" => Ok(ServiceKind::Route53),
            other => Err(format!(
                "unsupported service: '{other}'. Supported: ec2, route53"
            )),
        }
    }
}

impl ServiceKind {
    /// Whether the service is served from one endpoint for all regions.
    pub fn is_global(self) -> bool {
        matches!(self, ServiceKind::Route53)
    }

    /// HTTPS endpoint for this service in `region`.
    pub fn endpoint(self, region: &str) -> String {
        let suffix = dns_suffix(region);
        if self.is_global() {
            format!("https://{self}.{suffix}")
        } else {
            format!("https://{self}.{region}.{suffix}")
        }
    }
}

/// Partition DNS suffix for a region.
fn dns_suffix(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    }
}

/// A configured cloud API client.
#[derive(Debug, Clone)]
pub struct CloudClient {
    credentials: AwsCredentials,
}

impl CloudClient {
    /// Bind a complete credential set.
    pub fn configure(credentials: AwsCredentials) -> Self {
        tracing::debug!(region = %credentials.region, "configured cloud client");
        Self { credentials }
    }

    pub fn credentials(&self) -> &AwsCredentials {
        &self.credentials
    }

    pub fn region(&self) -> &str {
        &self.credentials.region
    }

    /// Open a handle on `service` with this client's credentials.
    pub fn connect(&self, service: ServiceKind) -> ServiceHandle {
        let signing_region = if service.is_global() {
            GLOBAL_SIGNING_REGION.to_string()
        } else {
            self.credentials.region.clone()
        };
        let handle = ServiceHandle {
            service,
            endpoint: service.endpoint(&self.credentials.region),
            signing_region,
            credentials: self.credentials.clone(),
        };
        tracing::info!(%service, endpoint = %handle.endpoint, "opened service connection");
        handle
    }
}

/// A connection handle on one cloud service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    pub service: ServiceKind,
    pub endpoint: String,
    pub signing_region: String,
    pub credentials: AwsCredentials,
}

/// Resolve credentials, configure a client, and connect to `service`.
pub fn login<L: ConfigLookup>(
    service: ServiceKind,
    explicit: &PartialAwsCredentials,
    lookup: L,
) -> Result<ServiceHandle, CredentialError> {
    let credentials = CredentialResolver::new(lookup).resolve_aws(explicit)?;
    Ok(CloudClient::configure(credentials).connect(service))
}
