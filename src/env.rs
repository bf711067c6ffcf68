//! Build environment detection.
//!
//! New CustomModelData values may only be issued from an interactive
//! environment, where the mutated registry file can be reviewed and
//! committed. Unattended builds (CI) must run against a pre-committed
//! registry; they may reuse values but never mint new ones.

/// Whether the build runs with a human able to commit registry changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnv {
    /// A developer build; new identifier allocation is allowed.
    Interactive,
    /// An unattended/CI build; new identifier allocation is fatal.
    Unattended,
}

impl BuildEnv {
    /// Detect the environment from the `CI` environment variable.
    ///
    /// Any non-empty value other than `false` means unattended, matching
    /// the convention of the common CI providers.
    pub fn detect() -> Self {
        match std::env::var("CI") {
            Ok(v) if !v.is_empty() && v != "false" => Self::Unattended,
            _ => Self::Interactive,
        }
    }

    /// Whether new identifier allocation is permitted.
    pub fn allows_allocation(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_policy() {
        assert!(BuildEnv::Interactive.allows_allocation());
        assert!(!BuildEnv::Unattended.allows_allocation());
    }
}
