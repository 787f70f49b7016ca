//! TLV tag forms (Matter Core Spec Appendix A.7, TagControl).

/// The seven tag forms an element can carry.
///
/// Width selection for `Common`, `Implicit`, and `FullyQualified` is fully
/// determined by the magnitude of their numeric fields: the encoder always
/// picks the narrowest wire form that holds the value, the same way
/// [`crate::Encoder::put_unsigned`] picks the narrowest integer width. This
/// keeps encoding deterministic and round-trip closed without exposing a
/// separate "forced width" knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No tag bytes on the wire. Required for `EndOfContainer`.
    Anonymous,
    /// A single context-local byte, meaningful only within the enclosing
    /// structure.
    Context(u8),
    /// A profile-common tag; encodes as 2 wire bytes if it fits in `u16`,
    /// otherwise 4.
    Common(u32),
    /// An implicit-profile tag; same width rule as [`Tag::Common`].
    Implicit(u32),
    /// A fully vendor/profile-qualified tag; encodes as 6 wire bytes if
    /// `tag` fits in `u16`, otherwise 8.
    FullyQualified {
        /// Vendor ID.
        vendor: u16,
        /// Profile number.
        profile: u16,
        /// Tag number, local to (vendor, profile).
        tag: u32,
    },
}

/// Wire-level tag-control code (bits 7..5 of the control octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagForm {
    Anonymous = 0,
    Context = 1,
    Common2 = 2,
    Common4 = 3,
    Implicit2 = 4,
    Implicit4 = 5,
    FullyQualified6 = 6,
    FullyQualified8 = 7,
}

impl TagForm {
    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Anonymous),
            1 => Some(Self::Context),
            2 => Some(Self::Common2),
            3 => Some(Self::Common4),
            4 => Some(Self::Implicit2),
            5 => Some(Self::Implicit4),
            6 => Some(Self::FullyQualified6),
            7 => Some(Self::FullyQualified8),
            _ => None,
        }
    }

    pub(crate) fn code(self) -> u8 {
        self as u8
    }

    /// Number of tag bytes this form carries on the wire.
    pub(crate) fn byte_len(self) -> usize {
        match self {
            Self::Anonymous => 0,
            Self::Context => 1,
            Self::Common2 | Self::Implicit2 => 2,
            Self::Common4 | Self::Implicit4 => 4,
            Self::FullyQualified6 => 6,
            Self::FullyQualified8 => 8,
        }
    }
}

impl Tag {
    /// The wire form this tag will take when encoded.
    pub(crate) fn wire_form(self) -> TagForm {
        match self {
            Self::Anonymous => TagForm::Anonymous,
            Self::Context(_) => TagForm::Context,
            Self::Common(v) => {
                if v <= u32::from(u16::MAX) { TagForm::Common2 } else { TagForm::Common4 }
            },
            Self::Implicit(v) => {
                if v <= u32::from(u16::MAX) { TagForm::Implicit2 } else { TagForm::Implicit4 }
            },
            Self::FullyQualified { tag, .. } => {
                if tag <= u32::from(u16::MAX) {
                    TagForm::FullyQualified6
                } else {
                    TagForm::FullyQualified8
                }
            },
        }
    }

    pub(crate) fn write_bytes(self, out: &mut Vec<u8>) {
        match self {
            Self::Anonymous => {},
            Self::Context(n) => out.push(n),
            Self::Common(v) | Self::Implicit(v) => match self.wire_form() {
                TagForm::Common2 | TagForm::Implicit2 => {
                    out.extend_from_slice(&(v as u16).to_le_bytes());
                },
                _ => out.extend_from_slice(&v.to_le_bytes()),
            },
            Self::FullyQualified { vendor, profile, tag } => {
                out.extend_from_slice(&vendor.to_le_bytes());
                out.extend_from_slice(&profile.to_le_bytes());
                match self.wire_form() {
                    TagForm::FullyQualified6 => out.extend_from_slice(&(tag as u16).to_le_bytes()),
                    _ => out.extend_from_slice(&tag.to_le_bytes()),
                }
            },
        }
    }

    /// Returns this tag's context number, if it is a [`Tag::Context`] tag.
    #[must_use]
    pub fn as_context(self) -> Option<u8> {
        match self {
            Self::Context(n) => Some(n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_width_selection_is_minimal() {
        assert_eq!(Tag::Common(0xFFFF).wire_form(), TagForm::Common2);
        assert_eq!(Tag::Common(0x1_0000).wire_form(), TagForm::Common4);
    }

    #[test]
    fn fully_qualified_width_selection_is_minimal() {
        let small = Tag::FullyQualified { vendor: 1, profile: 2, tag: 0xFFFF };
        let large = Tag::FullyQualified { vendor: 1, profile: 2, tag: 0x1_0000 };
        assert_eq!(small.wire_form(), TagForm::FullyQualified6);
        assert_eq!(large.wire_form(), TagForm::FullyQualified8);
    }
}
