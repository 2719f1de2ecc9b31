//! Behavior application protocol: how per-operation configuration attaches
//! to the pipeline's dispatch records at service build time.
//!
//! Every behavior attached to an operation exposes the same four hooks; the
//! build walk ([`crate::builder`]) invokes all of them for every operation.
//! [`OperationPolicy`] implements the set with `apply_dispatch_behavior` as
//! its only non-trivial hook: impersonation, instance release, and parameter
//! disposal are all callee-side concerns.

use crate::description::OperationDescription;
use crate::dispatch::{BindingParameterCollection, ClientOperation, DispatchOperation};
use crate::policy::{OperationPolicy, ReleaseInstanceMode};

// ---------------------------------------------------------------------------
// BehaviorError
// ---------------------------------------------------------------------------

/// Errors raised while applying operation behaviors.
///
/// Every variant is a build-time configuration defect: deterministic,
/// non-retryable, and expected to abort service construction before the
/// service accepts its first call.
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    /// A raw value outside its closed enumeration.
    #[error("value {value} is not a member of {enumeration}")]
    OutOfRange {
        enumeration: &'static str,
        value: u8,
    },
    /// A non-default release-instance mode on a server-initiated operation.
    /// Callback-direction operations have no server-side instance to release.
    #[error("release-instance mode does not apply to server-initiated operation '{operation}'")]
    ReleaseModeOnServerInitiated { operation: String },
    /// The calling framework registered two operations under one name.
    #[error("operation '{operation}' is registered more than once")]
    DuplicateOperation { operation: String },
}

// ---------------------------------------------------------------------------
// OperationBehavior trait
// ---------------------------------------------------------------------------

/// Capability set implemented by anything that configures one operation
/// during service build.
///
/// The build walk calls all four hooks for every behavior attached to an
/// operation. Most behaviors care about a single hook, so the others default
/// to no-ops; a future behavior with real binding-parameter or validation
/// logic shares the same walk by overriding them.
pub trait OperationBehavior: Send + Sync {
    /// Contribute channel-level parameters for this operation. Default:
    /// contributes none.
    fn add_binding_parameters(
        &self,
        description: &OperationDescription,
        binding_parameters: &mut BindingParameterCollection,
    ) {
        let _ = (description, binding_parameters);
    }

    /// Check the behavior against the operation description alone. Rules
    /// that need dispatch-side context belong in
    /// [`apply_dispatch_behavior`](Self::apply_dispatch_behavior).
    /// Default: accept.
    fn validate(&self, description: &OperationDescription) -> Result<(), BehaviorError> {
        let _ = description;
        Ok(())
    }

    /// Configure the client-side proxy record. Default: no-op.
    fn apply_client_behavior(
        &self,
        description: &OperationDescription,
        client: &mut ClientOperation,
    ) {
        let _ = (description, client);
    }

    /// Configure the server-side dispatch record. Default: no-op.
    fn apply_dispatch_behavior(
        &self,
        description: &OperationDescription,
        dispatch: &mut DispatchOperation,
    ) -> Result<(), BehaviorError> {
        let _ = (description, dispatch);
        Ok(())
    }
}

impl OperationBehavior for OperationPolicy {
    /// Copies the policy onto the operation's dispatch record.
    ///
    /// Fails when the operation is server-initiated and the policy carries a
    /// non-default release mode: the callback direction inverts the roles,
    /// so there is no server-side instance to release and the combination is
    /// a developer error caught at build time.
    fn apply_dispatch_behavior(
        &self,
        description: &OperationDescription,
        dispatch: &mut DispatchOperation,
    ) -> Result<(), BehaviorError> {
        if description.is_server_initiated()
            && self.release_instance_mode() != ReleaseInstanceMode::None
        {
            return Err(BehaviorError::ReleaseModeOnServerInitiated {
                operation: description.name().to_string(),
            });
        }

        dispatch.auto_dispose_parameters = self.auto_dispose_parameters();
        dispatch.release_instance_before_call = self.release_instance_mode().releases_before_call();
        dispatch.release_instance_after_call = self.release_instance_mode().releases_after_call();
        dispatch.impersonation = self.impersonation();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
