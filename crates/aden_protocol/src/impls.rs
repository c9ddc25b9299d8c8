//! Implementations of [`Encode`](crate::Encode) and [`Decode`](crate::Decode)
//! on the primitive wire types.

use std::io::Write;

use anyhow::{bail, ensure};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{Decode, Encode};

/// Hard cap on decoded string length, in UTF-16 code units. A frame is at
/// most 64 KiB, so anything longer than this is malformed input.
const MAX_STRING_UNITS: usize = 32767;

impl Encode for u8 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_u8(*self)?)
    }
}

impl Decode<'_> for u8 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_u8()?)
    }
}

impl Encode for i8 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_i8(*self)?)
    }
}

impl Decode<'_> for i8 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_i8()?)
    }
}

impl Encode for bool {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_u8(u8::from(*self))?)
    }
}

impl Decode<'_> for bool {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        let n = r.read_u8()?;
        ensure!(n <= 1, "boolean is not 0 or 1 (got {n})");
        Ok(n == 1)
    }
}

impl Encode for i16 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_i16::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for i16 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_i16::<LittleEndian>()?)
    }
}

impl Encode for u16 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_u16::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for u16 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_u16::<LittleEndian>()?)
    }
}

impl Encode for i32 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_i32::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for i32 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_i32::<LittleEndian>()?)
    }
}

impl Encode for u32 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_u32::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for u32 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_u32::<LittleEndian>()?)
    }
}

impl Encode for i64 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_i64::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for i64 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_i64::<LittleEndian>()?)
    }
}

impl Encode for f64 {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_f64::<LittleEndian>(*self)?)
    }
}

impl Decode<'_> for f64 {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(r.read_f64::<LittleEndian>()?)
    }
}

impl Encode for str {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        for unit in self.encode_utf16() {
            w.write_u16::<LittleEndian>(unit)?;
        }

        // Two-byte terminator.
        Ok(w.write_u16::<LittleEndian>(0)?)
    }
}

impl Encode for &str {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        str::encode(self, w)
    }
}

impl Encode for String {
    fn encode(&self, w: impl Write) -> anyhow::Result<()> {
        str::encode(self, w)
    }
}

impl Decode<'_> for String {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        let mut units = Vec::new();

        loop {
            match r.read_u16::<LittleEndian>() {
                Ok(0) => break,
                Ok(unit) => {
                    ensure!(
                        units.len() < MAX_STRING_UNITS,
                        "string exceeds maximum length"
                    );
                    units.push(unit);
                }
                Err(_) => bail!("string is missing the null terminator"),
            }
        }

        Ok(String::from_utf16_lossy(&units))
    }
}

/// Sequences carry a leading `i32` LE element count.
impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        ensure!(
            i32::try_from(self.len()).is_ok(),
            "sequence length exceeds i32::MAX"
        );

        (self.len() as i32).encode(&mut w)?;

        for item in self {
            item.encode(&mut w)?;
        }

        Ok(())
    }
}

impl<'a, T: Decode<'a>> Decode<'a> for Vec<T> {
    fn decode(r: &mut &'a [u8]) -> anyhow::Result<Self> {
        let len = i32::decode(r)?;
        ensure!(len >= 0, "attempt to decode sequence with negative length");
        let len = len as usize;

        // Don't trust the decoded length to preallocate.
        let mut vec = Vec::with_capacity(cautious_capacity::<T>(len));

        for _ in 0..len {
            vec.push(T::decode(r)?);
        }

        Ok(vec)
    }
}

/// Prevents preallocating too much memory in case we get a malicious or
/// invalid sequence length.
fn cautious_capacity<Element>(size_hint: usize) -> usize {
    const MAX_PREALLOC_BYTES: usize = 64 * 1024;

    if std::mem::size_of::<Element>() == 0 {
        0
    } else {
        size_hint.min(MAX_PREALLOC_BYTES / std::mem::size_of::<Element>())
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, mut w: impl Write) -> anyhow::Result<()> {
        Ok(w.write_all(self)?)
    }
}

impl<const N: usize> Decode<'_> for [u8; N] {
    fn decode(r: &mut &[u8]) -> anyhow::Result<Self> {
        ensure!(
            r.len() >= N,
            "not enough data to decode [u8; {N}] (got {} bytes)",
            r.len()
        );

        let (res, remaining) = r.split_at(N);
        *r = remaining;

        Ok(res.try_into().expect("split length mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_string_round_trip() {
        let mut buf = Vec::new();
        "Kamael".encode(&mut buf).unwrap();

        // Code units plus the terminator, two bytes each.
        assert_eq!(buf.len(), (6 + 1) * 2);

        let mut r = &buf[..];
        assert_eq!(String::decode(&mut r).unwrap(), "Kamael");
        assert!(r.is_empty());
    }

    #[test]
    fn utf16_string_non_ascii() {
        let mut buf = Vec::new();
        "Залетай".encode(&mut buf).unwrap();

        let mut r = &buf[..];
        assert_eq!(String::decode(&mut r).unwrap(), "Залетай");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let buf = [0x41, 0x00, 0x42, 0x00];
        let mut r = &buf[..];
        assert!(String::decode(&mut r).is_err());
    }

    #[test]
    fn string_cap_is_exact() {
        let terminated = |units: usize| {
            let mut buf = Vec::with_capacity((units + 1) * 2);
            for _ in 0..units {
                buf.extend_from_slice(&[0x41, 0x00]);
            }
            buf.extend_from_slice(&[0x00, 0x00]);
            buf
        };

        // Exactly at the cap decodes.
        let buf = terminated(MAX_STRING_UNITS);
        let mut r = &buf[..];
        assert_eq!(String::decode(&mut r).unwrap().len(), MAX_STRING_UNITS);

        // One unit past it is malformed input.
        let buf = terminated(MAX_STRING_UNITS + 1);
        let mut r = &buf[..];
        assert!(String::decode(&mut r).is_err());
    }

    #[test]
    fn numeric_round_trip() {
        let mut buf = Vec::new();
        0x12345678_i32.encode(&mut buf).unwrap();
        (-2_i16).encode(&mut buf).unwrap();
        true.encode(&mut buf).unwrap();

        assert_eq!(buf[..4], [0x78, 0x56, 0x34, 0x12]);

        let mut r = &buf[..];
        assert_eq!(i32::decode(&mut r).unwrap(), 0x12345678);
        assert_eq!(i16::decode(&mut r).unwrap(), -2);
        assert!(bool::decode(&mut r).unwrap());
    }
}
