//! Host interface revision numbers
//!
//! Versions use the host's packed encoding: major in the upper 16 bits,
//! minor in the lower 16 bits (`0x0001_0008` is "1.8", `0x0009_0000` is "9").

use std::fmt;

/// A host interface revision in packed integer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct InterfaceVersion(i32);

impl InterfaceVersion {
    /// Revision 1.1
    pub const V1_1: Self = Self(0x0001_0001);
    /// Revision 1.2
    pub const V1_2: Self = Self(0x0001_0002);
    /// Revision 1.4
    pub const V1_4: Self = Self(0x0001_0004);
    /// Revision 1.6
    pub const V1_6: Self = Self(0x0001_0006);
    /// Revision 1.8
    pub const V1_8: Self = Self(0x0001_0008);
    /// Revision 9
    pub const V9: Self = Self(0x0009_0000);
    /// Revision 10
    pub const V10: Self = Self(0x000a_0000);

    /// Minimum revision a hostlink module declares on load.
    pub const REQUIRED: Self = Self::V1_8;

    /// Wrap a raw packed value as reported by the host.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Packed integer value, as returned from the load hook.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Major component
    #[inline]
    pub const fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Minor component
    #[inline]
    pub const fn minor(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Whether this revision satisfies `floor`.
    #[inline]
    pub fn satisfies(self, floor: InterfaceVersion) -> bool {
        self >= floor
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor() == 0 && self.major() > 1 {
            write!(f, "{}", self.major())
        } else {
            write!(f, "{}.{}", self.major(), self.minor())
        }
    }
}
