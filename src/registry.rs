//! Sub-dissector registry.
//!
//! Holds the two numeric-keyed tables the ATM layer dispatches through (AAL5
//! and AAL2 traffic types) and the named hand-off decoders the AAL5 payload
//! heuristics resolve to. The host populates it once at startup; dissection
//! only reads it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AtmError;
use crate::traits::{DecodedTree, DecoderTable, SubDissector};

/// Named decoders the ATM layer hands payloads to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handoff {
    /// Signalling (SSCOP) decoder.
    Sscop,
    /// LLC/SNAP encapsulation (RFC 2684).
    Llc,
    Ppp,
    /// Ethernet that may or may not carry an FCS.
    Ethernet,
    /// Frame relay network interworking.
    FrameRelay,
    Ipv4,
    Ipv6,
}

impl fmt::Display for Handoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Handoff::Sscop => "sscop",
            Handoff::Llc => "llc",
            Handoff::Ppp => "ppp",
            Handoff::Ethernet => "eth",
            Handoff::FrameRelay => "fr",
            Handoff::Ipv4 => "ip",
            Handoff::Ipv6 => "ipv6",
        };
        f.write_str(s)
    }
}

/// Which numeric-keyed table a lookup goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTable {
    Aal5,
    Aal2,
}

impl TypeTable {
    pub fn name(self) -> &'static str {
        match self {
            TypeTable::Aal5 => "atm.aal5.type",
            TypeTable::Aal2 => "atm.aal2.type",
        }
    }
}

/// Registered sub-dissectors, keyed by traffic type or hand-off name.
#[derive(Default)]
pub struct SubDissectorRegistry {
    aal5_types: HashMap<u32, Box<dyn SubDissector>>,
    aal2_types: HashMap<u32, Box<dyn SubDissector>>,
    handoffs: HashMap<Handoff, Box<dyn SubDissector>>,
}

impl fmt::Debug for SubDissectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut aal5: Vec<_> = self.aal5_types.keys().collect();
        aal5.sort();
        let mut aal2: Vec<_> = self.aal2_types.keys().collect();
        aal2.sort();
        let mut handoffs: Vec<_> = self.handoffs.keys().map(ToString::to_string).collect();
        handoffs.sort();
        f.debug_struct("SubDissectorRegistry")
            .field("aal5_types", &aal5)
            .field("aal2_types", &aal2)
            .field("handoffs", &handoffs)
            .finish()
    }
}

impl SubDissectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, table: TypeTable) -> &HashMap<u32, Box<dyn SubDissector>> {
        match table {
            TypeTable::Aal5 => &self.aal5_types,
            TypeTable::Aal2 => &self.aal2_types,
        }
    }

    /// Registers a handler for `key` in one of the traffic-type tables.
    ///
    /// # Errors
    /// - [`AtmError::HandlerAlreadyRegistered`] - `key` already has a handler
    pub fn register_type(
        &mut self,
        table: TypeTable,
        key: u32,
        handler: Box<dyn SubDissector>,
    ) -> Result<(), AtmError> {
        let map = match table {
            TypeTable::Aal5 => &mut self.aal5_types,
            TypeTable::Aal2 => &mut self.aal2_types,
        };
        if map.contains_key(&key) {
            return Err(AtmError::HandlerAlreadyRegistered {
                table: table.name(),
                key: key.to_string(),
            });
        }
        map.insert(key, handler);
        Ok(())
    }

    /// Registers the decoder for a named hand-off.
    ///
    /// # Errors
    /// - [`AtmError::HandlerAlreadyRegistered`] - the hand-off already has a decoder
    pub fn register_handoff(
        &mut self,
        handoff: Handoff,
        handler: Box<dyn SubDissector>,
    ) -> Result<(), AtmError> {
        if self.handoffs.contains_key(&handoff) {
            return Err(AtmError::HandlerAlreadyRegistered {
                table: "atm.handoff",
                key: handoff.to_string(),
            });
        }
        self.handoffs.insert(handoff, handler);
        Ok(())
    }

    pub fn has_type(&self, table: TypeTable, key: u32) -> bool {
        self.table(table).contains_key(&key)
    }

    /// Looks `key` up in `table` and runs the handler, if any.
    pub fn try_type(&self, table: TypeTable, key: u32, payload: &[u8]) -> Option<DecodedTree> {
        self.table(table).get(&key)?.dissect(payload)
    }

    /// Runs the decoder registered for `handoff`, if any.
    pub fn try_handoff(&self, handoff: Handoff, payload: &[u8]) -> Option<DecodedTree> {
        self.handoffs.get(&handoff)?.dissect(payload)
    }

    /// Read-only view of one traffic-type table.
    pub fn type_table(&self, table: TypeTable) -> TypeTableView<'_> {
        TypeTableView {
            registry: self,
            table,
        }
    }
}

/// A single traffic-type table seen through [`DecoderTable`].
#[derive(Debug, Clone, Copy)]
pub struct TypeTableView<'a> {
    registry: &'a SubDissectorRegistry,
    table: TypeTable,
}

impl DecoderTable for TypeTableView<'_> {
    fn try_dispatch(&self, key: u32, payload: &[u8]) -> Option<DecodedTree> {
        self.registry.try_type(self.table, key, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FieldValue;

    fn named(protocol: &'static str) -> Box<dyn SubDissector> {
        Box::new(move |payload: &[u8]| {
            Some(
                DecodedTree::new(protocol)
                    .with_field("len", FieldValue::U32(payload.len() as u32)),
            )
        })
    }

    #[test]
    fn register_and_dispatch_types() {
        let mut registry = SubDissectorRegistry::new();
        registry
            .register_type(TypeTable::Aal5, 3, named("lane"))
            .unwrap();
        registry
            .register_type(TypeTable::Aal2, 3, named("aal2-lane"))
            .unwrap();

        let tree = registry.try_type(TypeTable::Aal5, 3, &[1, 2, 3]).unwrap();
        assert_eq!(tree.protocol, "lane");
        assert_eq!(tree.field("len"), Some(&FieldValue::U32(3)));
        assert_eq!(
            registry.try_type(TypeTable::Aal2, 3, &[]).unwrap().protocol,
            "aal2-lane"
        );
        assert!(registry.try_type(TypeTable::Aal5, 4, &[]).is_none());
        assert!(registry.has_type(TypeTable::Aal5, 3));
        assert!(!registry.has_type(TypeTable::Aal5, 4));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = SubDissectorRegistry::new();
        registry
            .register_type(TypeTable::Aal5, 1, named("llc"))
            .unwrap();
        let result = registry.register_type(TypeTable::Aal5, 1, named("other"));
        assert_eq!(
            result,
            Err(AtmError::HandlerAlreadyRegistered {
                table: "atm.aal5.type",
                key: "1".to_string()
            })
        );

        registry
            .register_handoff(Handoff::Ppp, named("ppp"))
            .unwrap();
        assert!(matches!(
            registry.register_handoff(Handoff::Ppp, named("ppp")),
            Err(AtmError::HandlerAlreadyRegistered { table: "atm.handoff", .. })
        ));
    }

    #[test]
    fn table_view_implements_decoder_table() {
        let mut registry = SubDissectorRegistry::new();
        registry
            .register_type(TypeTable::Aal2, 8, named("umts_fp"))
            .unwrap();
        let view = registry.type_table(TypeTable::Aal2);
        assert_eq!(view.try_dispatch(8, &[0]).unwrap().protocol, "umts_fp");
        assert!(view.try_dispatch(9, &[0]).is_none());
    }

    #[test]
    fn handoff_without_decoder_yields_nothing() {
        let registry = SubDissectorRegistry::new();
        assert!(registry.try_handoff(Handoff::Ipv4, &[0x45]).is_none());
    }
}
