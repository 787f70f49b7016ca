//! TLV encoder: a byte buffer plus a container-type stack.

use crate::{ContainerKind, ElementType, Tag, TlvError, error::Result};

/// Writes a stream of TLV elements into an owned byte buffer.
///
/// Output order is exactly call order: the encoder never reorders or
/// batches writes, since call order is how tag order is established on the
/// wire.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
    stack: Vec<ContainerKind>,
}

impl Encoder {
    /// Creates an encoder with an empty buffer and an empty container
    /// stack.
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new(), stack: Vec::new() }
    }

    /// The encoded bytes so far, without copying.
    ///
    /// Callers must not mutate the returned slice's contents through any
    /// other means while holding this borrow.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the encoder, returning the owned buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_control(&mut self, tag: Tag, ty: ElementType) {
        let control = (tag.wire_form().code() << 5) | (ty.code() & 0x1F);
        self.buf.push(control);
        tag.write_bytes(&mut self.buf);
    }

    /// Writes a signed integer, selecting the smallest width (1, 2, 4, or 8
    /// bytes) that holds `value`.
    pub fn put_signed(&mut self, tag: Tag, value: i64) {
        let ty = match value {
            v if i8::try_from(v).is_ok() => ElementType::SignedInt1,
            v if i16::try_from(v).is_ok() => ElementType::SignedInt2,
            v if i32::try_from(v).is_ok() => ElementType::SignedInt4,
            _ => ElementType::SignedInt8,
        };
        self.write_control(tag, ty);
        let width = ty.fixed_payload_len().unwrap_or(8);
        self.buf.extend_from_slice(&value.to_le_bytes()[..width]);
    }

    /// Writes an unsigned integer, selecting the smallest width (1, 2, 4,
    /// or 8 bytes) that holds `value`.
    pub fn put_unsigned(&mut self, tag: Tag, value: u64) {
        let ty = match value {
            v if u8::try_from(v).is_ok() => ElementType::UnsignedInt1,
            v if u16::try_from(v).is_ok() => ElementType::UnsignedInt2,
            v if u32::try_from(v).is_ok() => ElementType::UnsignedInt4,
            _ => ElementType::UnsignedInt8,
        };
        self.write_control(tag, ty);
        let width = ty.fixed_payload_len().unwrap_or(8);
        self.buf.extend_from_slice(&value.to_le_bytes()[..width]);
    }

    /// Writes a signed integer at a caller-forced width.
    ///
    /// # Errors
    ///
    /// Returns [`TlvError::StringLengthOverflow`] if `value` does not fit
    /// in `width` bytes. The encoder never silently truncates.
    pub fn put_signed_width(&mut self, tag: Tag, value: i64, width: u8) -> Result<()> {
        let ty = match width {
            1 if i8::try_from(value).is_ok() => ElementType::SignedInt1,
            2 if i16::try_from(value).is_ok() => ElementType::SignedInt2,
            4 if i32::try_from(value).is_ok() => ElementType::SignedInt4,
            8 => ElementType::SignedInt8,
            _ => {
                return Err(TlvError::StringLengthOverflow { value: i128::from(value), width });
            },
        };
        self.write_control(tag, ty);
        let actual_width = ty.fixed_payload_len().unwrap_or(8);
        self.buf.extend_from_slice(&value.to_le_bytes()[..actual_width]);
        Ok(())
    }

    /// Writes an unsigned integer at a caller-forced width.
    ///
    /// # Errors
    ///
    /// Returns [`TlvError::StringLengthOverflow`] if `value` does not fit
    /// in `width` bytes.
    pub fn put_unsigned_width(&mut self, tag: Tag, value: u64, width: u8) -> Result<()> {
        let ty = match width {
            1 if u8::try_from(value).is_ok() => ElementType::UnsignedInt1,
            2 if u16::try_from(value).is_ok() => ElementType::UnsignedInt2,
            4 if u32::try_from(value).is_ok() => ElementType::UnsignedInt4,
            8 => ElementType::UnsignedInt8,
            _ => {
                return Err(TlvError::StringLengthOverflow { value: i128::from(value), width });
            },
        };
        self.write_control(tag, ty);
        let actual_width = ty.fixed_payload_len().unwrap_or(8);
        self.buf.extend_from_slice(&value.to_le_bytes()[..actual_width]);
        Ok(())
    }

    /// Writes a boolean element (no payload beyond the control octet).
    pub fn put_bool(&mut self, tag: Tag, value: bool) {
        let ty = if value { ElementType::BooleanTrue } else { ElementType::BooleanFalse };
        self.write_control(tag, ty);
    }

    /// Writes the `Null` element.
    pub fn put_null(&mut self, tag: Tag) {
        self.write_control(tag, ElementType::Null);
    }

    /// Writes an IEEE-754 single-precision float.
    pub fn put_float32(&mut self, tag: Tag, value: f32) {
        self.write_control(tag, ElementType::Float32);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an IEEE-754 double-precision float.
    pub fn put_float64(&mut self, tag: Tag, value: f64) {
        self.write_control(tag, ElementType::Float64);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn length_prefix_type_for(len: usize, is_utf8: bool) -> ElementType {
        match len {
            l if u8::try_from(l).is_ok() => {
                if is_utf8 { ElementType::Utf8String1 } else { ElementType::OctetString1 }
            },
            l if u16::try_from(l).is_ok() => {
                if is_utf8 { ElementType::Utf8String2 } else { ElementType::OctetString2 }
            },
            l if u32::try_from(l).is_ok() => {
                if is_utf8 { ElementType::Utf8String4 } else { ElementType::OctetString4 }
            },
            _ => {
                if is_utf8 { ElementType::Utf8String8 } else { ElementType::OctetString8 }
            },
        }
    }

    fn put_length_prefixed(&mut self, tag: Tag, data: &[u8], is_utf8: bool) {
        let ty = Self::length_prefix_type_for(data.len(), is_utf8);
        self.write_control(tag, ty);
        let prefix_width = ty.length_prefix_len().unwrap_or(8);
        match prefix_width {
            1 => self.buf.push(data.len() as u8),
            2 => self.buf.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            4 => self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes()),
            _ => self.buf.extend_from_slice(&(data.len() as u64).to_le_bytes()),
        }
        self.buf.extend_from_slice(data);
    }

    /// Writes a UTF-8 string, auto-sizing the length-prefix width to the
    /// smallest of 1/2/4/8 bytes that fits `data.len()`.
    pub fn put_utf8(&mut self, tag: Tag, data: &str) {
        self.put_length_prefixed(tag, data.as_bytes(), true);
    }

    /// Writes an octet string, auto-sizing the length-prefix width to the
    /// smallest of 1/2/4/8 bytes that fits `data.len()`.
    pub fn put_octet_string(&mut self, tag: Tag, data: &[u8]) {
        self.put_length_prefixed(tag, data, false);
    }

    /// Writes a UTF-8 string with a caller-forced length-prefix width.
    ///
    /// # Errors
    ///
    /// Returns [`TlvError::StringLengthOverflow`] if `data.len()` does not
    /// fit in `width` bytes.
    pub fn put_utf8_width(&mut self, tag: Tag, data: &str, width: u8) -> Result<()> {
        self.put_length_prefixed_width(tag, data.as_bytes(), true, width)
    }

    /// Writes an octet string with a caller-forced length-prefix width.
    ///
    /// # Errors
    ///
    /// Returns [`TlvError::StringLengthOverflow`] if `data.len()` does not
    /// fit in `width` bytes.
    pub fn put_octet_string_width(&mut self, tag: Tag, data: &[u8], width: u8) -> Result<()> {
        self.put_length_prefixed_width(tag, data, false, width)
    }

    fn put_length_prefixed_width(
        &mut self,
        tag: Tag,
        data: &[u8],
        is_utf8: bool,
        width: u8,
    ) -> Result<()> {
        let len = data.len();
        let fits = match width {
            1 => u8::try_from(len).is_ok(),
            2 => u16::try_from(len).is_ok(),
            4 => u32::try_from(len).is_ok(),
            8 => true,
            _ => false,
        };
        if !fits {
            return Err(TlvError::StringLengthOverflow { value: len as i128, width });
        }
        let ty = match (width, is_utf8) {
            (1, true) => ElementType::Utf8String1,
            (1, false) => ElementType::OctetString1,
            (2, true) => ElementType::Utf8String2,
            (2, false) => ElementType::OctetString2,
            (4, true) => ElementType::Utf8String4,
            (4, false) => ElementType::OctetString4,
            (8, true) => ElementType::Utf8String8,
            (_, true) => unreachable!("width is validated to be 1, 2, 4, or 8 by the fits check above"),
            (_, false) => ElementType::OctetString8,
        };
        self.write_control(tag, ty);
        match width {
            1 => self.buf.push(len as u8),
            2 => self.buf.extend_from_slice(&(len as u16).to_le_bytes()),
            4 => self.buf.extend_from_slice(&(len as u32).to_le_bytes()),
            _ => self.buf.extend_from_slice(&(len as u64).to_le_bytes()),
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn begin_container(&mut self, tag: Tag, kind: ContainerKind) {
        self.write_control(tag, kind.element_type());
        self.stack.push(kind);
    }

    /// Opens a `Structure` container under `tag`.
    pub fn begin_structure(&mut self, tag: Tag) {
        self.begin_container(tag, ContainerKind::Structure);
    }

    /// Opens an `Array` container under `tag`.
    pub fn begin_array(&mut self, tag: Tag) {
        self.begin_container(tag, ContainerKind::Array);
    }

    /// Opens a `List` container under `tag`.
    pub fn begin_list(&mut self, tag: Tag) {
        self.begin_container(tag, ContainerKind::List);
    }

    /// Pops the most recently opened container and emits its
    /// `EndOfContainer` marker (always anonymously tagged).
    ///
    /// # Errors
    ///
    /// Returns [`TlvError::ContainerUnderflow`] if no container is open.
    pub fn end_container(&mut self) -> Result<()> {
        if self.stack.pop().is_none() {
            return Err(TlvError::ContainerUnderflow);
        }
        self.write_control(Tag::Anonymous, ElementType::EndOfContainer);
        Ok(())
    }

    /// Pops and closes every remaining open container, ignoring
    /// underflow (there is none, by construction). Used at top-level
    /// flush so callers don't need to track nesting depth by hand.
    pub fn end_all_containers(&mut self) {
        while self.end_container().is_ok() {}
    }

    /// Number of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
