//! RISC-V register files.
//!
//! Each class is its own type so an encoder cannot take a float register
//! where an integer one belongs. Encodings are fixed at construction and
//! always lie in `0..=31`.

/// Register class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegClass {
    General,
    Float,
    Vector,
}

/// Common view over the three register files.
pub trait RegEncoding: Copy {
    const CLASS: RegClass;

    /// 5-bit encoding.
    fn encoding(self) -> u32;

    /// Usable in a 3-bit compressed register field (encodings 8-15).
    #[inline]
    fn is_compressed_valid(self) -> bool {
        (8..=15).contains(&self.encoding())
    }

    /// 3-bit compressed encoding. Panics outside x8-x15 / f8-f15.
    #[inline]
    fn compressed_encoding(self) -> u32 {
        assert!(
            self.is_compressed_valid(),
            "{:?} register {} has no compressed encoding",
            Self::CLASS,
            self.encoding()
        );
        self.encoding() - 8
    }
}

macro_rules! reg_file {
    ($(#[$meta:meta])* $name:ident, $class:ident, [$($variant:ident = $num:expr),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $num),*
        }

        impl $name {
            /// All registers of this class, indexed by encoding.
            pub const ALL: [$name; 32] = [$($name::$variant),*];

            #[inline]
            pub fn from_u8(v: u8) -> Self {
                assert!(v < 32, concat!("invalid ", stringify!($name), " encoding {}"), v);
                Self::ALL[v as usize]
            }
        }

        impl RegEncoding for $name {
            const CLASS: RegClass = RegClass::$class;

            #[inline]
            fn encoding(self) -> u32 {
                self as u32
            }
        }
    };
}

reg_file!(
    /// Integer registers x0-x31.
    Reg, General, [
        X0 = 0, X1 = 1, X2 = 2, X3 = 3, X4 = 4, X5 = 5, X6 = 6, X7 = 7,
        X8 = 8, X9 = 9, X10 = 10, X11 = 11, X12 = 12, X13 = 13, X14 = 14, X15 = 15,
        X16 = 16, X17 = 17, X18 = 18, X19 = 19, X20 = 20, X21 = 21, X22 = 22, X23 = 23,
        X24 = 24, X25 = 25, X26 = 26, X27 = 27, X28 = 28, X29 = 29, X30 = 30, X31 = 31,
    ]
);

reg_file!(
    /// Floating-point registers f0-f31.
    FReg, Float, [
        F0 = 0, F1 = 1, F2 = 2, F3 = 3, F4 = 4, F5 = 5, F6 = 6, F7 = 7,
        F8 = 8, F9 = 9, F10 = 10, F11 = 11, F12 = 12, F13 = 13, F14 = 14, F15 = 15,
        F16 = 16, F17 = 17, F18 = 18, F19 = 19, F20 = 20, F21 = 21, F22 = 22, F23 = 23,
        F24 = 24, F25 = 25, F26 = 26, F27 = 27, F28 = 28, F29 = 29, F30 = 30, F31 = 31,
    ]
);

reg_file!(
    /// Vector registers v0-v31.
    VReg, Vector, [
        V0 = 0, V1 = 1, V2 = 2, V3 = 3, V4 = 4, V5 = 5, V6 = 6, V7 = 7,
        V8 = 8, V9 = 9, V10 = 10, V11 = 11, V12 = 12, V13 = 13, V14 = 14, V15 = 15,
        V16 = 16, V17 = 17, V18 = 18, V19 = 19, V20 = 20, V21 = 21, V22 = 22, V23 = 23,
        V24 = 24, V25 = 25, V26 = 26, V27 = 27, V28 = 28, V29 = 29, V30 = 30, V31 = 31,
    ]
);

// -- ABI names --

pub const ZR: Reg = Reg::X0;
pub const RA: Reg = Reg::X1;
pub const SP: Reg = Reg::X2;
pub const GP: Reg = Reg::X3;
pub const TP: Reg = Reg::X4;
pub const T0: Reg = Reg::X5;
pub const T1: Reg = Reg::X6;
pub const T2: Reg = Reg::X7;
/// Frame pointer.
pub const FP: Reg = Reg::X8;
pub const S1: Reg = Reg::X9;
pub const A0: Reg = Reg::X10;
pub const A1: Reg = Reg::X11;
pub const A2: Reg = Reg::X12;
pub const A3: Reg = Reg::X13;
pub const A4: Reg = Reg::X14;
pub const A5: Reg = Reg::X15;
pub const A6: Reg = Reg::X16;
pub const A7: Reg = Reg::X17;
pub const T3: Reg = Reg::X28;
pub const T4: Reg = Reg::X29;
pub const T5: Reg = Reg::X30;
pub const T6: Reg = Reg::X31;
