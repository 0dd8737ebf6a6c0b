//! Packed cache keys.
//!
//! Layout (low to high bits): `flags` | `pixel size` | `family id`.

use crate::font::family::FamilyId;
use crate::font::flags::StyleFlags;

pub const FLAG_BITS: u32 = 6;
pub const SIZE_BITS: u32 = 12;
pub const FAMILY_BITS: u32 = 32;

/// Largest pixel size representable in a key.
pub const MAX_PIXEL_SIZE: u16 = (1 << SIZE_BITS) - 1;

/// Number of entries in a per-font variant table (one per flag combination).
pub const VARIANT_SLOTS: usize = 1 << FLAG_BITS;

const _: () = assert!(
    (StyleFlags::all().bits() as u64) < (1u64 << FLAG_BITS),
    "style flags no longer fit in the key's flag bits"
);
const _: () = assert!(FLAG_BITS + SIZE_BITS + FAMILY_BITS <= u64::BITS);

/// Cache key for one logical font: `(family, pixel size, style flags)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontKey(u64);

impl FontKey {
    /// Packs a key, or returns `None` when `size` exceeds [`MAX_PIXEL_SIZE`].
    pub fn new(size: u16, flags: StyleFlags, family: FamilyId) -> Option<Self> {
        if size > MAX_PIXEL_SIZE {
            return None;
        }
        let family = u64::from(family.raw());
        let size = u64::from(size);
        let flags = u64::from(flags.bits());
        Some(Self(
            (family << (SIZE_BITS + FLAG_BITS)) | (size << FLAG_BITS) | flags,
        ))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn family(self) -> FamilyId {
        FamilyId::from_raw((self.0 >> (SIZE_BITS + FLAG_BITS)) as u32)
    }

    #[inline]
    pub fn size(self) -> u16 {
        ((self.0 >> FLAG_BITS) & u64::from(MAX_PIXEL_SIZE)) as u16
    }

    #[inline]
    pub fn flags(self) -> StyleFlags {
        StyleFlags::from_bits_truncate((self.0 & ((1 << FLAG_BITS) - 1)) as u8)
    }
}
