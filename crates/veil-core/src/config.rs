#![forbid(unsafe_code)]

//! Modal configuration.
//!
//! With the `policy-config` feature, [`ModalConfig`] can be loaded from TOML:
//!
//! ```toml
//! [stacking]
//! base = 1000
//! step = 10
//! ```
//!
//! Missing keys take their defaults.

use crate::error::ConfigError;

/// Default lowest stacking index assigned to a modal.
pub const BASE_MODAL_Z: i32 = 1000;

/// Default gap between a modal and the highest existing stacking index.
pub const Z_INCREMENT: i32 = 10;

/// How a new modal's stacking index is derived from its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StackingPolicy {
    /// Lowest index a modal may receive.
    pub base: i32,
    /// Distance above the highest existing index. Must be at least 1.
    pub step: i32,
}

impl StackingPolicy {
    /// Create a policy with explicit base and step.
    #[must_use]
    pub const fn new(base: i32, step: i32) -> Self {
        Self { base, step }
    }

    /// Index for a new node given the highest existing explicit index.
    ///
    /// The result is at least `base` and strictly greater than `max_existing`.
    /// When adding `step` would overflow, the gap shrinks to 1. Returns `None`
    /// if `max_existing` is `i32::MAX`, since no greater index exists.
    #[must_use]
    pub fn next_index(self, max_existing: Option<i32>) -> Option<i32> {
        let step = self.step.max(1);
        match max_existing {
            Some(max) => max
                .checked_add(step)
                .or_else(|| max.checked_add(1))
                .map(|index| index.max(self.base)),
            None => Some(self.base),
        }
    }
}

impl Default for StackingPolicy {
    fn default() -> Self {
        Self::new(BASE_MODAL_Z, Z_INCREMENT)
    }
}

/// Configuration shared by every modal a factory builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ModalConfig {
    pub stacking: StackingPolicy,
}

impl ModalConfig {
    /// Set the stacking policy.
    #[must_use]
    pub fn stacking(mut self, stacking: StackingPolicy) -> Self {
        self.stacking = stacking;
        self
    }

    /// Check the configuration for values that would break modal guarantees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stacking.step < 1 {
            return Err(ConfigError::InvalidStep(self.stacking.step));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_index_without_siblings_is_base() {
        assert_eq!(StackingPolicy::default().next_index(None), Some(BASE_MODAL_Z));
    }

    #[test]
    fn next_index_above_low_siblings_is_base() {
        let policy = StackingPolicy::default();
        assert_eq!(policy.next_index(Some(5)), Some(BASE_MODAL_Z));
    }

    #[test]
    fn next_index_clears_high_siblings() {
        let policy = StackingPolicy::new(1, 1);
        assert_eq!(policy.next_index(Some(5)), Some(6));
        assert_eq!(StackingPolicy::default().next_index(Some(4000)), Some(4010));
    }

    #[test]
    fn next_index_narrows_gap_near_limit() {
        let policy = StackingPolicy::new(0, 10);
        assert_eq!(policy.next_index(Some(i32::MAX - 3)), Some(i32::MAX - 2));
    }

    #[test]
    fn next_index_has_no_room_above_max() {
        assert_eq!(StackingPolicy::new(0, 10).next_index(Some(i32::MAX)), None);
    }

    #[test]
    fn validate_rejects_non_positive_step() {
        let config = ModalConfig::default().stacking(StackingPolicy::new(0, 0));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStep(0))));
        assert!(ModalConfig::default().validate().is_ok());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn from_toml_fills_defaults() {
        let config = ModalConfig::from_toml_str("[stacking]\nstep = 2\n").unwrap();
        assert_eq!(config.stacking, StackingPolicy::new(BASE_MODAL_Z, 2));

        let empty = ModalConfig::from_toml_str("").unwrap();
        assert_eq!(empty, ModalConfig::default());
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn from_toml_reports_parse_errors() {
        let err = ModalConfig::from_toml_str("[stacking]\nstep = \"ten\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn from_toml_rejects_bad_step() {
        let err = ModalConfig::from_toml_str("[stacking]\nstep = -3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStep(-3)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_index_is_above_every_sibling(
                siblings in proptest::collection::vec(-10_000i32..10_000, 0..16),
                base in 0i32..2000,
                step in 1i32..50,
            ) {
                let policy = StackingPolicy::new(base, step);
                let index = policy.next_index(siblings.iter().copied().max()).unwrap();
                prop_assert!(index >= base);
                for s in siblings {
                    prop_assert!(index > s);
                }
            }
        }
    }
}
