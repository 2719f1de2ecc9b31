//! Per-operation dispatch policy: impersonation, instance release, and
//! parameter disposal.
//!
//! [`OperationPolicy`] is the descriptor a developer attaches to one
//! operation. Its two enum-valued settings are closed sets; raw values from
//! untyped declaration sources go through [`TryFrom<u8>`] (or serde), so a
//! constructed policy can never hold an out-of-range value.

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorError;

// ---------------------------------------------------------------------------
// ImpersonationOption
// ---------------------------------------------------------------------------

/// Whether the dispatch pipeline runs the operation body under the caller's
/// propagated security identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpersonationOption {
    /// Run under the service process identity; a propagated caller identity
    /// is ignored.
    #[default]
    NotAllowed,
    /// Impersonate the caller when an identity was propagated.
    Allowed,
    /// Fail the call unless the caller's identity can be impersonated.
    Required,
}

impl ImpersonationOption {
    /// Raw encoding used by untyped declaration sources.
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::NotAllowed => 0,
            Self::Allowed => 1,
            Self::Required => 2,
        }
    }

    /// Returns the member encoded by `raw`, or `None` for a non-member.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::NotAllowed),
            1 => Some(Self::Allowed),
            2 => Some(Self::Required),
            _ => None,
        }
    }

    /// Membership check for caller-supplied raw values.
    #[must_use]
    pub const fn is_defined(raw: u8) -> bool {
        Self::from_raw(raw).is_some()
    }
}

impl TryFrom<u8> for ImpersonationOption {
    type Error = BehaviorError;

    fn try_from(raw: u8) -> Result<Self, BehaviorError> {
        Self::from_raw(raw).ok_or(BehaviorError::OutOfRange {
            enumeration: "ImpersonationOption",
            value: raw,
        })
    }
}

// ---------------------------------------------------------------------------
// ReleaseInstanceMode
// ---------------------------------------------------------------------------

/// When the service object instance bound to an operation is released
/// relative to the method invocation.
///
/// Bit-flag semantics: the raw encoding is the OR of the before-call and
/// after-call flags, so the legal raw values are exactly `{0, 1, 2, 3}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseInstanceMode {
    /// Keep the instance across the call (pipeline default).
    #[default]
    None,
    /// Release the instance before invoking the method.
    BeforeCall,
    /// Release the instance after the method returns.
    AfterCall,
    /// Release the instance on both sides of the invocation.
    BeforeAndAfterCall,
}

impl ReleaseInstanceMode {
    /// Flag bit for releasing before the call.
    pub const BEFORE_CALL: u8 = 0b01;
    /// Flag bit for releasing after the call.
    pub const AFTER_CALL: u8 = 0b10;

    /// Raw flag encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::BeforeCall => Self::BEFORE_CALL,
            Self::AfterCall => Self::AFTER_CALL,
            Self::BeforeAndAfterCall => Self::BEFORE_CALL | Self::AFTER_CALL,
        }
    }

    /// Returns the member encoded by `bits`, or `None` for a non-member.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::None),
            1 => Some(Self::BeforeCall),
            2 => Some(Self::AfterCall),
            3 => Some(Self::BeforeAndAfterCall),
            _ => None,
        }
    }

    /// Membership check for caller-supplied raw values.
    #[must_use]
    pub const fn is_defined(bits: u8) -> bool {
        Self::from_bits(bits).is_some()
    }

    /// True when the instance is released before the method runs.
    #[must_use]
    pub const fn releases_before_call(self) -> bool {
        self.bits() & Self::BEFORE_CALL != 0
    }

    /// True when the instance is released after the method returns.
    #[must_use]
    pub const fn releases_after_call(self) -> bool {
        self.bits() & Self::AFTER_CALL != 0
    }
}

impl TryFrom<u8> for ReleaseInstanceMode {
    type Error = BehaviorError;

    fn try_from(bits: u8) -> Result<Self, BehaviorError> {
        Self::from_bits(bits).ok_or(BehaviorError::OutOfRange {
            enumeration: "ReleaseInstanceMode",
            value: bits,
        })
    }
}

// ---------------------------------------------------------------------------
// OperationPolicy
// ---------------------------------------------------------------------------

/// Dispatch policy for one operation.
///
/// Carries the three callee-side settings the pipeline consults on every
/// call: parameter disposal, caller impersonation, and instance release.
/// The policy is applied to the operation's [`DispatchOperation`] exactly
/// once, at service build time; afterwards the pipeline reads only the
/// dispatch record and the policy is inert.
///
/// [`DispatchOperation`]: crate::dispatch::DispatchOperation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationPolicy {
    auto_dispose_parameters: bool,
    impersonation: ImpersonationOption,
    release_instance_mode: ReleaseInstanceMode,
}

impl Default for OperationPolicy {
    fn default() -> Self {
        Self {
            auto_dispose_parameters: true,
            impersonation: ImpersonationOption::NotAllowed,
            release_instance_mode: ReleaseInstanceMode::None,
        }
    }
}

impl OperationPolicy {
    /// Policy with pipeline defaults: parameters disposed, no impersonation,
    /// instance kept across the call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether input and output parameter objects are disposed after the
    /// call completes.
    #[must_use]
    pub const fn auto_dispose_parameters(&self) -> bool {
        self.auto_dispose_parameters
    }

    pub fn set_auto_dispose_parameters(&mut self, value: bool) {
        self.auto_dispose_parameters = value;
    }

    #[must_use]
    pub const fn impersonation(&self) -> ImpersonationOption {
        self.impersonation
    }

    pub fn set_impersonation(&mut self, value: ImpersonationOption) {
        self.impersonation = value;
    }

    #[must_use]
    pub const fn release_instance_mode(&self) -> ReleaseInstanceMode {
        self.release_instance_mode
    }

    pub fn set_release_instance_mode(&mut self, value: ReleaseInstanceMode) {
        self.release_instance_mode = value;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_policy_matches_pipeline_defaults() {
        let policy = OperationPolicy::new();
        assert!(policy.auto_dispose_parameters());
        assert_eq!(policy.impersonation(), ImpersonationOption::NotAllowed);
        assert_eq!(policy.release_instance_mode(), ReleaseInstanceMode::None);
    }

    #[test]
    fn setters_store_values() {
        let mut policy = OperationPolicy::new();
        policy.set_auto_dispose_parameters(false);
        policy.set_impersonation(ImpersonationOption::Required);
        policy.set_release_instance_mode(ReleaseInstanceMode::AfterCall);

        assert!(!policy.auto_dispose_parameters());
        assert_eq!(policy.impersonation(), ImpersonationOption::Required);
        assert_eq!(
            policy.release_instance_mode(),
            ReleaseInstanceMode::AfterCall
        );
    }

    #[test]
    fn impersonation_raw_round_trip() {
        for option in [
            ImpersonationOption::NotAllowed,
            ImpersonationOption::Allowed,
            ImpersonationOption::Required,
        ] {
            assert_eq!(ImpersonationOption::from_raw(option.as_raw()), Some(option));
        }
    }

    #[test]
    fn release_mode_bits_round_trip() {
        for mode in [
            ReleaseInstanceMode::None,
            ReleaseInstanceMode::BeforeCall,
            ReleaseInstanceMode::AfterCall,
            ReleaseInstanceMode::BeforeAndAfterCall,
        ] {
            assert_eq!(ReleaseInstanceMode::from_bits(mode.bits()), Some(mode));
        }
    }

    #[test]
    fn release_mode_flag_projection() {
        assert!(!ReleaseInstanceMode::None.releases_before_call());
        assert!(!ReleaseInstanceMode::None.releases_after_call());
        assert!(ReleaseInstanceMode::BeforeCall.releases_before_call());
        assert!(!ReleaseInstanceMode::BeforeCall.releases_after_call());
        assert!(!ReleaseInstanceMode::AfterCall.releases_before_call());
        assert!(ReleaseInstanceMode::AfterCall.releases_after_call());
        assert!(ReleaseInstanceMode::BeforeAndAfterCall.releases_before_call());
        assert!(ReleaseInstanceMode::BeforeAndAfterCall.releases_after_call());
    }

    proptest! {
        #[test]
        fn impersonation_membership_is_exactly_zero_through_two(raw: u8) {
            let member = ImpersonationOption::try_from(raw);
            prop_assert_eq!(member.is_ok(), raw <= 2);
            prop_assert_eq!(ImpersonationOption::is_defined(raw), raw <= 2);
            if let Ok(option) = member {
                prop_assert_eq!(option.as_raw(), raw);
            }
        }

        #[test]
        fn release_mode_membership_is_exactly_the_flag_combinations(bits: u8) {
            let member = ReleaseInstanceMode::try_from(bits);
            prop_assert_eq!(member.is_ok(), bits <= 3);
            prop_assert_eq!(ReleaseInstanceMode::is_defined(bits), bits <= 3);
            if let Ok(mode) = member {
                prop_assert_eq!(mode.bits(), bits);
            }
        }
    }
}
