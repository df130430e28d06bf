//! Seams between the ATM core and the decoders it hands payloads to.
//!
//! The core never decodes LLC, PPP, Ethernet, frame relay, IP or SSCOP
//! itself. It only decides which decoder a payload belongs to and calls it
//! through these traits; the host supplies the implementations.

use serde::{Deserialize, Serialize};

/// A decoded field value produced by a sub-dissector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
}

/// One named field in a [`DecodedTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedField {
    pub name: String,
    pub value: FieldValue,
}

/// What a sub-dissector returns for a payload it accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodedTree {
    pub protocol: String,
    pub fields: Vec<DecodedField>,
}

impl DecodedTree {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(DecodedField {
            name: name.into(),
            value,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// Decoder for a protocol carried over ATM.
///
/// Returns `None` when the payload is not accepted, which lets the caller
/// fall through to its next option.
pub trait SubDissector: Send + Sync {
    fn dissect(&self, payload: &[u8]) -> Option<DecodedTree>;
}

impl<F> SubDissector for F
where
    F: Fn(&[u8]) -> Option<DecodedTree> + Send + Sync,
{
    fn dissect(&self, payload: &[u8]) -> Option<DecodedTree> {
        self(payload)
    }
}

/// Numeric-keyed dispatch: "decode this payload as type `key`, if you can".
pub trait DecoderTable {
    fn try_dispatch(&self, key: u32, payload: &[u8]) -> Option<DecodedTree>;
}
