//! Variable bindings.
//!
//! A [`VarBind`] pairs an OID with a value. A [`VarBindList`] is the ordered,
//! bounded payload of every PDU; response order mirrors request order.

use crate::ber::{Decoder, EncodeBuf, tlv_len};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Maximum number of variable bindings in one PDU.
pub const MAX_BINDINGS: usize = 100;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Check the name and any OID value against the X.690 arc rules and
    /// the sub-identifier bound.
    pub fn validate(&self) -> Result<()> {
        self.oid.validate_all()?;
        if let Value::ObjectIdentifier(oid) = &self.value {
            oid.validate_all()?;
        }
        Ok(())
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Returns the exact encoded size of this VarBind in bytes.
    pub fn encoded_size(&self) -> usize {
        tlv_len(self.oid.ber_encoded_len() + self.value.ber_encoded_len())
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        seq.expect_end()?;
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.oid, self.value)
    }
}

/// Ordered list of at most [`MAX_BINDINGS`] variable bindings.
///
/// Every OID in the list, binding names and OID values alike, passes
/// [`Oid::validate_all`], so what encodes also decodes to the same list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarBindList {
    items: Vec<VarBind>,
}

impl VarBindList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a list of NULL-valued bindings for a read request.
    pub fn from_oids<'a>(oids: impl IntoIterator<Item = &'a Oid>) -> Result<Self> {
        let mut list = Self::new();
        for oid in oids {
            list.push(VarBind::null(oid.clone()))?;
        }
        Ok(list)
    }

    /// Append a binding, failing with `FieldTooLarge` past the bound.
    pub fn push(&mut self, vb: VarBind) -> Result<()> {
        if self.items.len() >= MAX_BINDINGS {
            return Err(Error::field_too_large(
                "variable bindings",
                self.items.len() + 1,
                MAX_BINDINGS,
            ));
        }
        vb.validate()?;
        self.items.push(vb);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VarBind> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[VarBind] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<VarBind> {
        self.items
    }

    /// Exact size of the encoded list SEQUENCE.
    pub fn encoded_size(&self) -> usize {
        tlv_len(self.items.iter().map(VarBind::encoded_size).sum())
    }

    /// Encode as a SEQUENCE OF VarBind.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            for vb in self.items.iter().rev() {
                vb.encode(buf);
            }
        });
    }

    /// Decode a SEQUENCE OF VarBind, enforcing the binding bound.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        // a VarBind is never shorter than 6 bytes (30 04 06 00 05 00)
        let mut items = Vec::with_capacity((seq.remaining() / 6).min(MAX_BINDINGS));

        while !seq.is_empty() {
            if items.len() == MAX_BINDINGS {
                tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %seq.absolute_offset() }, "too many variable bindings");
                return Err(Error::field_too_large(
                    "variable bindings",
                    MAX_BINDINGS + 1,
                    MAX_BINDINGS,
                ));
            }
            items.push(VarBind::decode(&mut seq)?);
        }

        Ok(Self { items })
    }
}

impl TryFrom<Vec<VarBind>> for VarBindList {
    type Error = Error;

    fn try_from(items: Vec<VarBind>) -> Result<Self> {
        if items.len() > MAX_BINDINGS {
            return Err(Error::field_too_large(
                "variable bindings",
                items.len(),
                MAX_BINDINGS,
            ));
        }
        for vb in &items {
            vb.validate()?;
        }
        Ok(Self { items })
    }
}

impl<'a> IntoIterator for &'a VarBindList {
    type Item = &'a VarBind;
    type IntoIter = std::slice::Iter<'a, VarBind>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl std::ops::Index<usize> for VarBindList {
    type Output = VarBind;

    fn index(&self, index: usize) -> &VarBind {
        &self.items[index]
    }
}

impl std::fmt::Display for VarBindList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, vb) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", vb)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use crate::oid;
    use bytes::Bytes;

    fn roundtrip(list: &VarBindList) -> VarBindList {
        let mut buf = EncodeBuf::new();
        list.encode(&mut buf);
        let bytes = buf.finish();
        assert_eq!(bytes.len(), list.encoded_size());
        VarBindList::decode(&mut Decoder::new(bytes)).unwrap()
    }

    #[test]
    fn test_varbind_roundtrip() {
        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::Integer(42));
        let mut buf = EncodeBuf::new();
        vb.encode(&mut buf);
        let bytes = buf.finish();
        assert_eq!(bytes.len(), vb.encoded_size());
        assert_eq!(VarBind::decode(&mut Decoder::new(bytes)).unwrap(), vb);
    }

    #[test]
    fn test_list_preserves_order_with_exceptions() {
        let list = VarBindList::try_from(vec![
            VarBind::new(
                oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                Value::OctetString(Bytes::from_static(b"Linux router")),
            ),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 99, 0), Value::NoSuchObject),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(123456)),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 100, 0), Value::NoSuchInstance),
        ])
        .unwrap();

        let decoded = roundtrip(&list);
        assert_eq!(decoded, list);
        assert!(decoded[1].value.is_exception());
        assert!(!decoded[2].value.is_exception());
    }

    #[test]
    fn test_empty_list() {
        let list = VarBindList::new();
        assert!(roundtrip(&list).is_empty());
    }

    #[test]
    fn test_push_bound() {
        let mut list = VarBindList::new();
        for i in 0..MAX_BINDINGS as u32 {
            list.push(VarBind::null(oid!(1, 3, 6, 1, i))).unwrap();
        }
        let err = list
            .push(VarBind::null(oid!(1, 3, 6, 1, 100)))
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);
        assert_eq!(list.len(), MAX_BINDINGS);
    }

    #[test]
    fn test_try_from_bound() {
        let items: Vec<_> = (0..=MAX_BINDINGS as u32)
            .map(|i| VarBind::null(oid!(1, 3, 6, 1, i)))
            .collect();
        let err = VarBindList::try_from(items).unwrap_err();
        assert!(matches!(err, Error::FieldTooLarge { len: 101, max: 100, .. }));
    }

    #[test]
    fn test_push_rejects_long_oid() {
        let long = Oid::new(0..200);
        let err = VarBindList::new().push(VarBind::null(long)).unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);
    }

    #[test]
    fn test_push_rejects_long_oid_value() {
        let mut arcs = vec![1, 3, 6, 1];
        arcs.extend(0..(crate::oid::MAX_OID_LEN as u32 - 3));
        let value = Value::ObjectIdentifier(Oid::from_slice(&arcs));

        let mut list = VarBindList::new();
        let err = list
            .push(VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), value.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::FieldTooLarge { len: 129, max: 128, .. }));
        assert!(list.is_empty());

        let err = VarBindList::try_from(vec![VarBind::new(oid!(1, 3, 6, 1), value)]).unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);
    }

    #[test]
    fn test_push_rejects_invalid_arcs() {
        use crate::error::OidErrorKind;

        // 5.3.1 would encode as sub-identifier 203 and come back as 2.123.1
        let err = VarBindList::new()
            .push(VarBind::null(oid!(5, 3, 1)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::InvalidFirstArc(5),
                ..
            }
        ));

        let bad_value = VarBind::new(oid!(1, 3, 6, 1), Value::ObjectIdentifier(oid!(1, 40, 2)));
        assert!(VarBindList::try_from(vec![bad_value]).is_err());

        let good = VarBind::new(oid!(1, 3, 6, 1), Value::ObjectIdentifier(oid!(2, 123, 1)));
        let list = VarBindList::try_from(vec![good]).unwrap();
        assert_eq!(roundtrip(&list), list);
    }

    #[test]
    fn test_decode_rejects_too_many_bindings() {
        // hand-build a 101 entry list; the encoder path refuses to
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            for i in (0..=MAX_BINDINGS as u32).rev() {
                VarBind::null(oid!(1, 3, i)).encode(buf);
            }
        });
        let err = VarBindList::decode(&mut Decoder::new(buf.finish())).unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);
    }

    #[test]
    fn test_varbind_trailing_garbage_rejected() {
        // VarBind SEQUENCE with an extra NULL after the value
        let data = [0x30, 0x07, 0x06, 0x01, 0x2B, 0x05, 0x00, 0x05, 0x00];
        assert!(VarBind::decode(&mut Decoder::from_slice(&data)).is_err());
    }

    #[test]
    fn test_display() {
        let list = VarBindList::try_from(vec![
            VarBind::new(oid!(1, 3, 6, 1), Value::Integer(1)),
            VarBind::null(oid!(1, 3, 6, 2)),
        ])
        .unwrap();
        assert_eq!(list.to_string(), "[1.3.6.1=1, 1.3.6.2=NULL]");
    }
}
