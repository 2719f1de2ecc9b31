//! Build-time behavior application.
//!
//! Walks every operation of a [`ServiceDescription`], creates a default
//! runtime record, and invokes each attached behavior's hooks in a fixed
//! order:
//!
//! 1. `add_binding_parameters` -- collect channel-level parameters
//! 2. `validate` -- per-behavior checks against the description alone
//! 3. `apply_dispatch_behavior` / `apply_client_behavior` -- write the record
//!
//! The first error aborts the build: every failure here is a configuration
//! defect that must surface before the service accepts its first call.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::behavior::BehaviorError;
use crate::description::ServiceDescription;
use crate::dispatch::{BindingParameterCollection, ClientOperation, DispatchOperation};

// ---------------------------------------------------------------------------
// DispatchRuntime
// ---------------------------------------------------------------------------

/// Server-side runtime produced by [`build_dispatch_runtime`].
///
/// Once built, the per-operation records are no longer mutated; the pipeline
/// reads them concurrently for every in-flight call.
#[derive(Debug)]
pub struct DispatchRuntime {
    service_name: String,
    operations: HashMap<String, DispatchOperation>,
    binding_parameters: BindingParameterCollection,
}

impl DispatchRuntime {
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Dispatch record for the named operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&DispatchOperation> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &DispatchOperation> {
        self.operations.values()
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Channel-level parameters collected from all behaviors, for the
    /// transport stack to drain.
    #[must_use]
    pub fn binding_parameters(&self) -> &BindingParameterCollection {
        &self.binding_parameters
    }
}

// ---------------------------------------------------------------------------
// ClientRuntime
// ---------------------------------------------------------------------------

/// Client-side runtime produced by [`build_client_runtime`].
#[derive(Debug)]
pub struct ClientRuntime {
    service_name: String,
    operations: HashMap<String, ClientOperation>,
    binding_parameters: BindingParameterCollection,
}

impl ClientRuntime {
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Proxy record for the named operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&ClientOperation> {
        self.operations.get(name)
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Channel-level parameters collected from all behaviors.
    #[must_use]
    pub fn binding_parameters(&self) -> &BindingParameterCollection {
        &self.binding_parameters
    }
}

// ---------------------------------------------------------------------------
// Build walks
// ---------------------------------------------------------------------------

/// Build the server-side dispatch runtime for a service.
///
/// # Errors
///
/// Returns the first [`BehaviorError`] raised by any behavior, or
/// [`BehaviorError::DuplicateOperation`] when two operations share a name.
pub fn build_dispatch_runtime(
    service: &ServiceDescription,
) -> Result<DispatchRuntime, BehaviorError> {
    let mut operations = HashMap::new();
    let mut binding_parameters = BindingParameterCollection::new();

    for description in service.operations() {
        if operations.contains_key(description.name()) {
            return Err(BehaviorError::DuplicateOperation {
                operation: description.name().to_string(),
            });
        }

        let mut dispatch = DispatchOperation::new(description.name());
        for behavior in description.behaviors() {
            behavior.add_binding_parameters(description, &mut binding_parameters);
            behavior.validate(description)?;
            behavior.apply_dispatch_behavior(description, &mut dispatch)?;
        }
        debug!(
            "applied {} behaviors to operation '{}'",
            description.behaviors().len(),
            description.name()
        );
        operations.insert(description.name().to_string(), dispatch);
    }

    info!(
        "built dispatch runtime for service '{}' with {} operations",
        service.name(),
        operations.len()
    );
    Ok(DispatchRuntime {
        service_name: service.name().to_string(),
        operations,
        binding_parameters,
    })
}

/// Build the client-side proxy runtime for a service.
///
/// # Errors
///
/// Returns the first [`BehaviorError`] raised by any behavior's `validate`,
/// or [`BehaviorError::DuplicateOperation`] when two operations share a name.
pub fn build_client_runtime(service: &ServiceDescription) -> Result<ClientRuntime, BehaviorError> {
    let mut operations = HashMap::new();
    let mut binding_parameters = BindingParameterCollection::new();

    for description in service.operations() {
        if operations.contains_key(description.name()) {
            return Err(BehaviorError::DuplicateOperation {
                operation: description.name().to_string(),
            });
        }

        let mut client = ClientOperation::new(description.name());
        for behavior in description.behaviors() {
            behavior.add_binding_parameters(description, &mut binding_parameters);
            behavior.validate(description)?;
            behavior.apply_client_behavior(description, &mut client);
        }
        operations.insert(description.name().to_string(), client);
    }

    info!(
        "built client runtime for service '{}' with {} operations",
        service.name(),
        operations.len()
    );
    Ok(ClientRuntime {
        service_name: service.name().to_string(),
        operations,
        binding_parameters,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::OperationBehavior;
    use crate::description::OperationDescription;
    use crate::policy::{ImpersonationOption, OperationPolicy, ReleaseInstanceMode};

    fn deposit_policy() -> OperationPolicy {
        let mut policy = OperationPolicy::new();
        policy.set_auto_dispose_parameters(false);
        policy.set_impersonation(ImpersonationOption::Required);
        policy.set_release_instance_mode(ReleaseInstanceMode::AfterCall);
        policy
    }

    #[test]
    fn dispatch_runtime_reflects_applied_policy() {
        let mut deposit = OperationDescription::new("Deposit");
        deposit.attach_behavior(deposit_policy());

        let mut service = ServiceDescription::new("bank");
        service.add_operation(deposit);

        let runtime = build_dispatch_runtime(&service).unwrap();
        assert_eq!(runtime.service_name(), "bank");
        assert_eq!(runtime.operation_count(), 1);

        let dispatch = runtime.operation("Deposit").unwrap();
        assert!(!dispatch.auto_dispose_parameters);
        assert_eq!(dispatch.impersonation, ImpersonationOption::Required);
        assert!(!dispatch.release_instance_before_call);
        assert!(dispatch.release_instance_after_call);
    }

    #[test]
    fn operation_without_behaviors_keeps_pipeline_defaults() {
        let mut service = ServiceDescription::new("bank");
        service.add_operation(OperationDescription::new("Balance"));

        let runtime = build_dispatch_runtime(&service).unwrap();
        let dispatch = runtime.operation("Balance").unwrap();
        assert!(dispatch.auto_dispose_parameters);
        assert_eq!(dispatch.impersonation, ImpersonationOption::NotAllowed);
    }

    #[test]
    fn behavior_error_aborts_the_build() {
        let mut policy = OperationPolicy::new();
        policy.set_release_instance_mode(ReleaseInstanceMode::BeforeCall);
        let mut callback = OperationDescription::server_initiated("OnBalanceChanged");
        callback.attach_behavior(policy);

        let mut service = ServiceDescription::new("bank");
        service.add_operation(callback);

        let result = build_dispatch_runtime(&service);
        assert!(matches!(
            result,
            Err(BehaviorError::ReleaseModeOnServerInitiated { ref operation })
                if operation == "OnBalanceChanged"
        ));
    }

    #[test]
    fn duplicate_operation_names_are_a_contract_violation() {
        let mut service = ServiceDescription::new("bank");
        service.add_operation(OperationDescription::new("Deposit"));
        service.add_operation(OperationDescription::new("Deposit"));

        let result = build_dispatch_runtime(&service);
        assert!(matches!(
            result,
            Err(BehaviorError::DuplicateOperation { ref operation }) if operation == "Deposit"
        ));
    }

    #[test]
    fn client_runtime_is_untouched_by_dispatch_policy() {
        let mut deposit = OperationDescription::new("Deposit");
        deposit.attach_behavior(deposit_policy());

        let mut service = ServiceDescription::new("bank");
        service.add_operation(deposit);

        let runtime = build_client_runtime(&service).unwrap();
        assert_eq!(
            runtime.operation("Deposit"),
            Some(&ClientOperation::new("Deposit"))
        );
        assert!(runtime.binding_parameters().is_empty());
    }

    #[test]
    fn contributed_binding_parameters_reach_the_runtime() {
        #[derive(Debug, PartialEq)]
        struct QueueDepth(u32);

        struct QueueBehavior;

        impl OperationBehavior for QueueBehavior {
            fn add_binding_parameters(
                &self,
                _description: &OperationDescription,
                binding_parameters: &mut BindingParameterCollection,
            ) {
                binding_parameters.insert(QueueDepth(16));
            }
        }

        let mut deposit = OperationDescription::new("Deposit");
        deposit.attach_behavior(QueueBehavior);

        let mut service = ServiceDescription::new("bank");
        service.add_operation(deposit);

        let runtime = build_dispatch_runtime(&service).unwrap();
        assert_eq!(
            runtime.binding_parameters().get::<QueueDepth>(),
            Some(&QueueDepth(16))
        );
    }

    #[test]
    fn failing_validate_aborts_the_build() {
        struct RejectingBehavior;

        impl OperationBehavior for RejectingBehavior {
            fn validate(
                &self,
                _description: &OperationDescription,
            ) -> Result<(), BehaviorError> {
                Err(BehaviorError::OutOfRange {
                    enumeration: "QueuePriority",
                    value: 9,
                })
            }
        }

        let mut deposit = OperationDescription::new("Deposit");
        deposit.attach_behavior(RejectingBehavior);

        let mut service = ServiceDescription::new("bank");
        service.add_operation(deposit);

        assert!(build_dispatch_runtime(&service).is_err());
        assert!(build_client_runtime(&service).is_err());
    }
}
