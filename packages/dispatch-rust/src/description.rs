//! Operation and service descriptions assembled before dispatch-runtime
//! construction.
//!
//! Behaviors are attached explicitly to the operation record during assembly;
//! there is no attribute or reflection discovery step.

use std::fmt;
use std::sync::Arc;

use crate::behavior::OperationBehavior;

// ---------------------------------------------------------------------------
// OperationDescription
// ---------------------------------------------------------------------------

/// Describes one remotely invocable operation of a service contract.
pub struct OperationDescription {
    name: String,
    server_initiated: bool,
    behaviors: Vec<Arc<dyn OperationBehavior>>,
}

impl OperationDescription {
    /// Description of a normal client-to-server operation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_initiated: false,
            behaviors: Vec::new(),
        }
    }

    /// Description of a callback-direction operation invoked by the service
    /// toward the caller.
    #[must_use]
    pub fn server_initiated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_initiated: true,
            behaviors: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for callback-direction operations.
    #[must_use]
    pub const fn is_server_initiated(&self) -> bool {
        self.server_initiated
    }

    /// Attach a behavior to this operation. Behaviors are applied in
    /// attachment order during the build walk.
    pub fn attach_behavior<B: OperationBehavior + 'static>(&mut self, behavior: B) {
        self.behaviors.push(Arc::new(behavior));
    }

    /// Behaviors attached to this operation, in attachment order.
    #[must_use]
    pub fn behaviors(&self) -> &[Arc<dyn OperationBehavior>] {
        &self.behaviors
    }
}

impl fmt::Debug for OperationDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescription")
            .field("name", &self.name)
            .field("server_initiated", &self.server_initiated)
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ServiceDescription
// ---------------------------------------------------------------------------

/// Named set of operations making up one service contract.
#[derive(Debug)]
pub struct ServiceDescription {
    name: String,
    operations: Vec<OperationDescription>,
}

impl ServiceDescription {
    /// Empty contract with the given service name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_operation(&mut self, operation: OperationDescription) {
        self.operations.push(operation);
    }

    #[must_use]
    pub fn operations(&self) -> &[OperationDescription] {
        &self.operations
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
