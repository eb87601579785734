//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.

use crate::ber::length_encoded_len;
use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of sub-identifiers allowed in an OID.
///
/// RFC 2578 Section 3.5: "there are at most 128 sub-identifiers in a value".
/// Enforced by [`Oid::parse`] and [`Oid::from_ber`], and checked by the codec
/// before encoding OIDs built from raw arcs.
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// Immutable once built; [`child`](Self::child) and [`parent`](Self::parent)
/// return new values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// ```
    /// use snmp_wire::oid::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1]);
    /// assert_eq!(oid.len(), 4);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted notation (e.g. "1.3.6.1.2.1.1.1.0").
    ///
    /// A leading dot is accepted. Arc constraints are not checked here, use
    /// [`validate`](Self::validate) for that.
    ///
    /// ```
    /// use snmp_wire::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.2.1.1.1.0").unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc: u32 = part.parse().map_err(|_| {
                Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s.to_string())
            })?;
            arcs.push(arc);
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                    s.to_string(),
                ));
            }
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check whether `other` is a prefix of this OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.starts_with(&other.arcs)
    }

    /// The OID with its last arc removed, or `None` for an empty OID.
    pub fn parent(&self) -> Option<Oid> {
        let (_, rest) = self.arcs.split_last()?;
        Some(Oid::from_slice(rest))
    }

    /// A new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Validate arc constraints per X.690 Section 8.19.4.
    ///
    /// The first arc must be 0, 1 or 2; the second must be below 40 unless the
    /// first is 2, and the combined first sub-identifier must fit in 32 bits.
    pub fn validate(&self) -> Result<()> {
        let Some(&arc1) = self.arcs.first() else {
            return Ok(());
        };
        if arc1 > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(arc1)));
        }
        if let Some(&arc2) = self.arcs.get(1) {
            let too_large = if arc1 < 2 { arc2 >= 40 } else { arc2 > u32::MAX - 80 };
            if too_large {
                return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                    first: arc1,
                    second: arc2,
                }));
            }
        }
        Ok(())
    }

    /// Fail with `FieldTooLarge` if the OID exceeds [`MAX_OID_LEN`].
    pub fn validate_length(&self) -> Result<()> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::field_too_large(
                "object identifier",
                self.arcs.len(),
                MAX_OID_LEN,
            ));
        }
        Ok(())
    }

    /// Validate both arc constraints and length.
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;
        self.validate_length()
    }

    /// Encode the OID content octets (without tag and length).
    ///
    /// The first two arcs share one sub-identifier, `arc1 * 40 + arc2`; every
    /// other arc is base-128 with a continuation bit.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        let Some(&arc1) = self.arcs.first() else {
            return bytes;
        };
        let arc2 = self.arcs.get(1).copied().unwrap_or(0);
        encode_subidentifier(&mut bytes, arc1 as u64 * 40 + arc2 as u64);

        for &arc in self.arcs.iter().skip(2) {
            encode_subidentifier(&mut bytes, arc as u64);
        }

        bytes
    }

    /// Encode the OID content octets into a `Vec`.
    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Size of the full OBJECT IDENTIFIER TLV.
    pub fn ber_encoded_len(&self) -> usize {
        let content_len = self.content_len();
        1 + length_encoded_len(content_len) + content_len
    }

    fn content_len(&self) -> usize {
        let Some(&arc1) = self.arcs.first() else {
            return 0;
        };
        let arc2 = self.arcs.get(1).copied().unwrap_or(0);
        let first = subidentifier_len(arc1 as u64 * 40 + arc2 as u64);
        first
            + self
                .arcs
                .iter()
                .skip(2)
                .map(|&a| subidentifier_len(a as u64))
                .sum::<usize>()
    }

    /// Decode OID content octets.
    ///
    /// Error offsets are relative to `data`.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        let (first_subid, mut i) = decode_subidentifier(data, 0)?;
        match first_subid {
            0..40 => arcs.extend([0, first_subid]),
            40..80 => arcs.extend([1, first_subid - 40]),
            _ => arcs.extend([2, first_subid - 80]),
        }

        while i < data.len() {
            let (arc, next) = decode_subidentifier(data, i)?;
            arcs.push(arc);
            i = next;

            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    i,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

fn subidentifier_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encode a sub-identifier in base-128, most significant group first.
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u64) {
    let groups = subidentifier_len(value);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode a sub-identifier starting at `start`, returning (value, next index).
fn decode_subidentifier(data: &[u8], start: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut i = start;

    loop {
        let Some(&byte) = data.get(i) else {
            return Err(Error::decode(i, DecodeErrorKind::InvalidOidEncoding));
        };
        i += 1;

        if value > (u32::MAX >> 7) {
            return Err(Error::decode(i - 1, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | (byte & 0x7F) as u32;

        if byte & 0x80 == 0 {
            return Ok((value, i));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_wire::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
