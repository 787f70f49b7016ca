//! TLV decoder: reads elements from a fully-buffered byte slice.

use crate::{ContainerKind, ElementType, Tag, TlvElementValue, TlvError, tag::TagForm};

/// Reads a stream of TLV elements from an in-memory byte buffer.
///
/// The decoder does not support partial/streaming decode from a source
/// that is not fully buffered in memory: the entire input is given to
/// [`Decoder::new`] up front.
///
/// After any error, [`Decoder::next`] returns `false` permanently and
/// [`Decoder::error`] returns the first error observed.
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<ContainerKind>,
    current: Option<(Tag, TlvElementValue)>,
    error: Option<TlvError>,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over `input`.
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0, stack: Vec::new(), current: None, error: None, done: false }
    }

    /// The first error observed, if any.
    #[must_use]
    pub fn error(&self) -> Option<&TlvError> {
        self.error.as_ref()
    }

    /// Bytes remaining past the current read position.
    ///
    /// Schemas use this to detect optional trailing fields without
    /// advancing the decoder.
    #[must_use]
    pub fn more(&self) -> bool {
        self.pos < self.input.len()
    }

    /// The most recently yielded `(tag, value)` pair.
    #[must_use]
    pub fn element(&self) -> Option<&(Tag, TlvElementValue)> {
        self.current.as_ref()
    }

    /// Number of containers the decoder currently believes are open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn fail(&mut self, err: TlvError) -> bool {
        self.error = Some(err);
        self.done = true;
        self.current = None;
        false
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.input.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.input.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    fn read_tag(&mut self, form: TagForm) -> std::result::Result<Tag, TlvError> {
        let needed = form.byte_len();
        let available = self.input.len().saturating_sub(self.pos);
        if available < needed {
            return Err(TlvError::InsufficientTagBytes { needed, available });
        }
        Ok(match form {
            TagForm::Anonymous => Tag::Anonymous,
            TagForm::Context => {
                Tag::Context(self.read_u8().ok_or(TlvError::UnexpectedEof)?)
            },
            TagForm::Common2 => {
                let b = self.read_bytes(2).ok_or(TlvError::UnexpectedEof)?;
                Tag::Common(u32::from(u16::from_le_bytes([b[0], b[1]])))
            },
            TagForm::Common4 => {
                let b = self.read_bytes(4).ok_or(TlvError::UnexpectedEof)?;
                Tag::Common(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            },
            TagForm::Implicit2 => {
                let b = self.read_bytes(2).ok_or(TlvError::UnexpectedEof)?;
                Tag::Implicit(u32::from(u16::from_le_bytes([b[0], b[1]])))
            },
            TagForm::Implicit4 => {
                let b = self.read_bytes(4).ok_or(TlvError::UnexpectedEof)?;
                Tag::Implicit(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            },
            TagForm::FullyQualified6 => {
                let b = self.read_bytes(6).ok_or(TlvError::UnexpectedEof)?;
                Tag::FullyQualified {
                    vendor: u16::from_le_bytes([b[0], b[1]]),
                    profile: u16::from_le_bytes([b[2], b[3]]),
                    tag: u32::from(u16::from_le_bytes([b[4], b[5]])),
                }
            },
            TagForm::FullyQualified8 => {
                let b = self.read_bytes(8).ok_or(TlvError::UnexpectedEof)?;
                Tag::FullyQualified {
                    vendor: u16::from_le_bytes([b[0], b[1]]),
                    profile: u16::from_le_bytes([b[2], b[3]]),
                    tag: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
                }
            },
        })
    }

    fn read_fixed_unsigned(&mut self, width: usize) -> std::result::Result<u64, TlvError> {
        let b = self.read_bytes(width).ok_or(TlvError::UnexpectedEof)?;
        Ok(match width {
            1 => u64::from(b[0]),
            2 => u64::from(u16::from_le_bytes([b[0], b[1]])),
            4 => u64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            _ => u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
        })
    }

    fn read_fixed_signed(&mut self, width: usize) -> std::result::Result<i64, TlvError> {
        let b = self.read_bytes(width).ok_or(TlvError::UnexpectedEof)?;
        Ok(match width {
            1 => i64::from(b[0] as i8),
            2 => i64::from(i16::from_le_bytes([b[0], b[1]])),
            4 => i64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            _ => i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
        })
    }

    fn read_length_prefix(&mut self, width: usize) -> std::result::Result<usize, TlvError> {
        let value = self.read_fixed_unsigned(width)?;
        usize::try_from(value).map_err(|_| TlvError::UnexpectedEof)
    }

    /// Advances to the next element, skipping `EndOfContainer` markers
    /// (which close a container on the stack instead of being yielded).
    ///
    /// Returns `false` at end of input or on the first error; call
    /// [`Decoder::error`] to distinguish the two.
    #[allow(clippy::too_many_lines)]
    pub fn next(&mut self) -> bool {
        if self.done {
            return false;
        }
        loop {
            let Some(control) = self.read_u8() else {
                self.current = None;
                if self.stack.is_empty() {
                    self.done = true;
                    return false;
                }
                return self.fail(TlvError::UnexpectedEof);
            };

            let tag_code = control >> 5;
            let type_code = control & 0x1F;

            let Some(form) = TagForm::from_code(tag_code) else {
                return self.fail(TlvError::UnsupportedTagForm(tag_code));
            };

            let Some(ty) = ElementType::from_code(type_code) else {
                return self.fail(TlvError::UnknownElementType(type_code));
            };

            let tag = match self.read_tag(form) {
                Ok(t) => t,
                Err(e) => return self.fail(e),
            };

            if ty == ElementType::EndOfContainer {
                if !matches!(tag, Tag::Anonymous) {
                    return self.fail(TlvError::InvalidControlByte(control));
                }
                if self.stack.pop().is_none() {
                    return self.fail(TlvError::ContainerUnderflow);
                }
                continue;
            }

            if let Some(kind) = ContainerKind::from_element_type(ty) {
                self.stack.push(kind);
                let value = match kind {
                    ContainerKind::Structure => TlvElementValue::StructureStart,
                    ContainerKind::Array => TlvElementValue::ArrayStart,
                    ContainerKind::List => TlvElementValue::ListStart,
                };
                self.current = Some((tag, value));
                return true;
            }

            let value = match ty {
                ElementType::SignedInt1 => TlvElementValue::Signed(match self.read_fixed_signed(1)
                {
                    Ok(v) => v,
                    Err(e) => return self.fail(e),
                }),
                ElementType::SignedInt2 => {
                    TlvElementValue::Signed(match self.read_fixed_signed(2) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::SignedInt4 => {
                    TlvElementValue::Signed(match self.read_fixed_signed(4) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::SignedInt8 => {
                    TlvElementValue::Signed(match self.read_fixed_signed(8) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::UnsignedInt1 => {
                    TlvElementValue::Unsigned(match self.read_fixed_unsigned(1) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::UnsignedInt2 => {
                    TlvElementValue::Unsigned(match self.read_fixed_unsigned(2) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::UnsignedInt4 => {
                    TlvElementValue::Unsigned(match self.read_fixed_unsigned(4) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::UnsignedInt8 => {
                    TlvElementValue::Unsigned(match self.read_fixed_unsigned(8) {
                        Ok(v) => v,
                        Err(e) => return self.fail(e),
                    })
                },
                ElementType::BooleanFalse => TlvElementValue::Bool(false),
                ElementType::BooleanTrue => TlvElementValue::Bool(true),
                ElementType::Float32 => {
                    let b = match self.read_bytes(4) {
                        Some(b) => b,
                        None => return self.fail(TlvError::UnexpectedEof),
                    };
                    TlvElementValue::Float32(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                },
                ElementType::Float64 => {
                    let b = match self.read_bytes(8) {
                        Some(b) => b,
                        None => return self.fail(TlvError::UnexpectedEof),
                    };
                    TlvElementValue::Float64(f64::from_le_bytes([
                        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                    ]))
                },
                ElementType::Utf8String1
                | ElementType::Utf8String2
                | ElementType::Utf8String4
                | ElementType::Utf8String8 => {
                    let width = ty.length_prefix_len().unwrap_or(0);
                    let len = match self.read_length_prefix(width) {
                        Ok(l) => l,
                        Err(e) => return self.fail(e),
                    };
                    let bytes = match self.read_bytes(len) {
                        Some(b) => b,
                        None => return self.fail(TlvError::UnexpectedEof),
                    };
                    match std::str::from_utf8(bytes) {
                        Ok(s) => TlvElementValue::Utf8(s.to_owned()),
                        Err(_) => return self.fail(TlvError::UnexpectedEof),
                    }
                },
                ElementType::OctetString1
                | ElementType::OctetString2
                | ElementType::OctetString4
                | ElementType::OctetString8 => {
                    let width = ty.length_prefix_len().unwrap_or(0);
                    let len = match self.read_length_prefix(width) {
                        Ok(l) => l,
                        Err(e) => return self.fail(e),
                    };
                    let bytes = match self.read_bytes(len) {
                        Some(b) => b,
                        None => return self.fail(TlvError::UnexpectedEof),
                    };
                    TlvElementValue::Bytes(bytes.to_vec())
                },
                ElementType::Null => TlvElementValue::Null,
                ElementType::Structure | ElementType::Array | ElementType::List => {
                    unreachable!("handled above via ContainerKind::from_element_type")
                },
                ElementType::EndOfContainer => unreachable!("handled above"),
            };

            self.current = Some((tag, value));
            return true;
        }
    }
}
