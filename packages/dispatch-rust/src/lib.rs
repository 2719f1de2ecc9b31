//! Relay Dispatch — per-operation behavior configuration for the operation
//! pipeline.
//!
//! A behavior attaches to one operation of a service contract and decides,
//! at service build time, how the dispatch pipeline treats each incoming
//! call: whether the caller's security identity is impersonated, when the
//! service instance is released, and whether call parameters are disposed.
//!
//! 1. **Policy** (`policy`): the per-operation settings descriptor
//! 2. **Descriptions** (`description`): operations and contracts under assembly
//! 3. **Protocol** (`behavior`): the hooks a behavior exposes to the build walk
//! 4. **Runtime records** (`dispatch`): what the pipeline reads per call
//! 5. **Build walk** (`builder`): applies behaviors and produces the runtime
//! 6. **Declarations** (`decl`): serde source form, re-applied at startup

pub mod behavior;
pub mod builder;
pub mod decl;
pub mod description;
pub mod dispatch;
pub mod policy;

pub use behavior::{BehaviorError, OperationBehavior};
pub use builder::{build_client_runtime, build_dispatch_runtime, ClientRuntime, DispatchRuntime};
pub use decl::{OperationDecl, ServiceDecl};
pub use description::{OperationDescription, ServiceDescription};
pub use dispatch::{BindingParameterCollection, ClientOperation, DispatchOperation};
pub use policy::{ImpersonationOption, OperationPolicy, ReleaseInstanceMode};
