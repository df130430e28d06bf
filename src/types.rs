//! Core type definitions for ATM addressing.
//!
//! Zero-cost newtypes keep VPI, VCI and PW sequence numbers from being mixed
//! up at call sites. All types are `#[repr(transparent)]`.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Generates an ATM newtype wrapper with the common conversions.
macro_rules! atm_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
        $(, custom_methods: { $($custom:tt)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            $($($custom)*)?
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

atm_newtype!(
    /// Virtual Path Identifier. 8 bits at the UNI, 12 bits at the NNI.
    Vpi(u16) => "VPI",
    custom_methods: {
        /// Returns `true` if the value fits the VPI field at `bits` width.
        #[inline]
        pub const fn fits(self, bits: u32) -> bool {
            (self.0 as u32) < (1u32 << bits)
        }
    }
);

atm_newtype!(
    /// Virtual Channel Identifier (16 bits).
    Vci(u16) => "VCI"
);

atm_newtype!(
    /// Pseudowire control word sequence number.
    SequenceNumber(u16) => "SN",
    custom_methods: {
        /// Convert to big-endian bytes.
        #[inline]
        pub fn to_be_bytes(self) -> [u8; 2] {
            self.0.to_be_bytes()
        }
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display_and_conversions() {
        let vpi = Vpi::new(42);
        assert_eq!(vpi.to_string(), "VPI42");
        assert_eq!(u16::from(vpi), 42);
        assert_eq!(vpi, 42u16);
        assert_eq!(*Vci::from(5), 5);
        assert_eq!(SequenceNumber::new(0x1234).to_be_bytes(), [0x12, 0x34]);
    }

    #[test]
    fn vpi_width_check() {
        assert!(Vpi::new(255).fits(8));
        assert!(!Vpi::new(256).fits(8));
        assert!(Vpi::new(4095).fits(12));
        assert!(!Vpi::new(4096).fits(12));
    }

    #[test]
    fn newtypes_serialize_transparently() {
        let json = serde_json::to_string(&Vci::new(33)).unwrap();
        assert_eq!(json, "33");
    }
}
