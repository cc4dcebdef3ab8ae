//! Big-endian, bounds-checked reading and writing of primitive values.
//!
//! Class files store every multi-byte quantity in big-endian order. This module provides the
//! small set of primitives the [`crate::file::parser::Parser`] and the
//! [`crate::classfile::ClassWriter`] are built on:
//!
//! - [`crate::file::io::ClassIO`] - Trait connecting a primitive type with its byte array form
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance it
//! - [`crate::file::io::write_be_at`] - Write a value at an offset and advance it
//!
//! Both fail with [`crate::Error::OutOfBounds`] instead of panicking when the buffer is too
//! small.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading and writing operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_class_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_class_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing the offset
/// by the size of `T` on success.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain after
/// `offset`.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_be_bytes(read))
}

/// Writes `value` in big-endian byte order at `offset`, advancing the offset on success.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit behind `offset`.
pub fn write_be_at<T: ClassIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_be_bytes();
    let bytes = bytes.as_ref();
    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    fn read<T: ClassIO>(data: &[u8]) -> Result<T> {
        read_be_at(data, &mut 0)
    }

    #[test]
    fn read_be_values() {
        assert_eq!(read::<u8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read::<u16>(&TEST_BUFFER).unwrap(), 0x0102);
        assert_eq!(read::<u32>(&TEST_BUFFER).unwrap(), 0x0102_0304);
        assert_eq!(read::<u64>(&TEST_BUFFER).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(read::<i8>(&[0xFF]).unwrap(), -1);
        assert_eq!(read::<i16>(&[0xFF, 0xFE]).unwrap(), -2);
        assert_eq!(read::<f32>(&[0x3F, 0x80, 0x00, 0x00]).unwrap(), 1.0);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2;
        assert_eq!(read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0304);
        assert_eq!(offset, 4);
        assert_eq!(read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x0506_0708);
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_out_of_bounds() {
        let mut offset = 6;
        assert!(matches!(
            read_be_at::<u32>(&TEST_BUFFER, &mut offset),
            Err(OutOfBounds)
        ));
        assert_eq!(offset, 6);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&TEST_BUFFER, &mut offset).is_err());
        assert!(read::<u16>(&[]).is_err());
    }

    #[test]
    fn write_be_values() {
        let mut buffer = [0u8; 8];
        let mut offset = 0;
        write_be_at(&mut buffer, &mut offset, 0xCAFE_u16).unwrap();
        write_be_at(&mut buffer, &mut offset, -1_i32).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(buffer, [0xCA, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00]);

        assert!(write_be_at(&mut buffer, &mut offset, 1_u32).is_err());
        assert_eq!(offset, 6);
        write_be_at(&mut buffer, &mut 0, 2.0_f64).unwrap();
        assert_eq!(read::<f64>(&buffer).unwrap(), 2.0);
    }
}
