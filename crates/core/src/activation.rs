// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activation flag bits carried as a single integer by `Activate`/`Deactivate`
//! (§6: bit 0 auto, 1 exclusive, 2 local, 3 activation-mode-complete,
//! 4 activation-mode-partial, 5 ignore-activation-skip, 6 shared).

/// A decoded view over the activation-flags integer. Kept as plain bit
/// accessors rather than a `bitflags!` type so the wire representation
/// (a single `i32` carried verbatim by RPC callers) stays exactly the
/// integer value, not a re-encoded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationFlags(pub i32);

impl ActivationFlags {
    pub const AUTO: i32 = 1 << 0;
    pub const EXCLUSIVE: i32 = 1 << 1;
    pub const LOCAL: i32 = 1 << 2;
    pub const MODE_COMPLETE: i32 = 1 << 3;
    pub const MODE_PARTIAL: i32 = 1 << 4;
    pub const IGNORE_ACTIVATION_SKIP: i32 = 1 << 5;
    pub const SHARED: i32 = 1 << 6;

    pub fn new(bits: i32) -> Self {
        Self(bits)
    }

    fn has(self, bit: i32) -> bool {
        self.0 & bit != 0
    }

    pub fn auto(self) -> bool {
        self.has(Self::AUTO)
    }

    pub fn exclusive(self) -> bool {
        self.has(Self::EXCLUSIVE)
    }

    pub fn local(self) -> bool {
        self.has(Self::LOCAL)
    }

    pub fn mode_complete(self) -> bool {
        self.has(Self::MODE_COMPLETE)
    }

    pub fn mode_partial(self) -> bool {
        self.has(Self::MODE_PARTIAL)
    }

    pub fn ignore_activation_skip(self) -> bool {
        self.has(Self::IGNORE_ACTIVATION_SKIP)
    }

    pub fn shared(self) -> bool {
        self.has(Self::SHARED)
    }

    /// Builds the `lvchange -a`/`vgchange -a` argument implied by these
    /// flags, for appending to the argv the Executor is handed.
    pub fn activation_mode_arg(self) -> Option<&'static str> {
        if self.mode_complete() {
            Some("complete")
        } else if self.mode_partial() {
            Some("partial")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_individual_bits() {
        let flags = ActivationFlags::new(ActivationFlags::AUTO | ActivationFlags::SHARED);
        assert!(flags.auto());
        assert!(flags.shared());
        assert!(!flags.exclusive());
    }

    #[test]
    fn activation_mode_prefers_complete_over_partial() {
        let flags =
            ActivationFlags::new(ActivationFlags::MODE_COMPLETE | ActivationFlags::MODE_PARTIAL);
        assert_eq!(flags.activation_mode_arg(), Some("complete"));
    }

    #[test]
    fn activation_mode_absent_when_neither_bit_set() {
        assert_eq!(ActivationFlags::new(0).activation_mode_arg(), None);
    }
}
