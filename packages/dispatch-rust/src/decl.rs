//! Declarative service configuration.
//!
//! Deployments declare a service's operations and their dispatch policies in
//! a serialized form (JSON, TOML via serde); the declaration is re-applied
//! on every process start. Enum members are validated during
//! deserialization, so an out-of-range impersonation or release mode fails
//! at configuration parse time, before any description is assembled.

use serde::{Deserialize, Serialize};

use crate::description::{OperationDescription, ServiceDescription};
use crate::policy::OperationPolicy;

/// One operation in a service declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDecl {
    /// Operation name, unique within the service.
    pub name: String,
    /// True for callback-direction operations invoked by the service.
    #[serde(default)]
    pub server_initiated: bool,
    /// Dispatch policy; omitted means pipeline defaults and no attached
    /// behavior.
    #[serde(default)]
    pub policy: Option<OperationPolicy>,
}

/// Declarative form of a service contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDecl {
    /// Service name.
    pub name: String,
    /// Declared operations, in contract order.
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

impl ServiceDecl {
    /// Materialize the declaration into a service description, attaching
    /// each declared policy as a behavior on its operation.
    #[must_use]
    pub fn into_description(self) -> ServiceDescription {
        let mut service = ServiceDescription::new(self.name);
        for decl in self.operations {
            let mut operation = if decl.server_initiated {
                OperationDescription::server_initiated(decl.name)
            } else {
                OperationDescription::new(decl.name)
            };
            if let Some(policy) = decl.policy {
                operation.attach_behavior(policy);
            }
            service.add_operation(operation);
        }
        service
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
