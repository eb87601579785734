//! Formatting utilities.
//!
//! ```
//! use snmp_wire::format::hex;
//!
//! assert_eq!(hex::encode(&[0xde, 0xad]), "dead");
//! println!("{}", hex::Bytes(&[0x00, 0xff])); // prints: 00ff
//! ```

pub mod hex;
