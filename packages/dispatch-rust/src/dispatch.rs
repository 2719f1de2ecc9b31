//! Per-operation runtime records consumed by the request pipeline.
//!
//! A [`DispatchOperation`] is written once during service build (see
//! [`crate::builder`]) and read-only afterwards, so in-flight calls consult
//! it without synchronization.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::policy::ImpersonationOption;

// ---------------------------------------------------------------------------
// DispatchOperation
// ---------------------------------------------------------------------------

/// Server-side dispatch record for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOperation {
    /// Operation name, matching the description it was built from.
    pub name: String,
    /// Dispose input and output parameter objects after the call completes.
    pub auto_dispose_parameters: bool,
    /// Release the service instance before invoking the method.
    pub release_instance_before_call: bool,
    /// Release the service instance after the method returns.
    pub release_instance_after_call: bool,
    /// Security identity the operation body runs under.
    pub impersonation: ImpersonationOption,
}

impl DispatchOperation {
    /// Dispatch record with pipeline defaults: parameters disposed, instance
    /// kept across the call, no impersonation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_dispose_parameters: true,
            release_instance_before_call: false,
            release_instance_after_call: false,
            impersonation: ImpersonationOption::NotAllowed,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientOperation
// ---------------------------------------------------------------------------

/// Client-side proxy record for one operation.
///
/// The settings carried by [`crate::policy::OperationPolicy`] are callee-side
/// concerns, so its client hook leaves this record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOperation {
    /// Operation name, matching the description it was built from.
    pub name: String,
}

impl ClientOperation {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// BindingParameterCollection
// ---------------------------------------------------------------------------

/// Type-keyed collection of channel-level parameters contributed by
/// behaviors during the build walk. One value per parameter type; a later
/// insert of the same type replaces the earlier one.
#[derive(Default)]
pub struct BindingParameterCollection {
    parameters: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl BindingParameterCollection {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter value keyed by its type.
    pub fn insert<T: Any + Send + Sync>(&mut self, parameter: T) {
        self.parameters.insert(TypeId::of::<T>(), Box::new(parameter));
    }

    /// Retrieve the parameter of type `T`, if one was contributed.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.parameters
            .get(&TypeId::of::<T>())
            .and_then(|parameter| parameter.downcast_ref::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl fmt::Debug for BindingParameterCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingParameterCollection")
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
