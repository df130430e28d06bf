//! ATM and ATM pseudowire protocol constants and bitmasks.
//!
//! Wire sizes, field masks and check residues shared by the ATM cell layer,
//! the AAL decoders and the RFC 4717 pseudowire decoders. Values that are
//! specific to one sub-layer still live here so that builders and parsers
//! agree on a single definition.

// --- ATM Cell Layer (ITU-T I.361) ---

/// Size of an ATM cell payload in bytes.
pub const ATM_CELL_PAYLOAD_SIZE: usize = 48;
/// Size of an ATM cell header without the HEC byte.
pub const ATM_CELL_HEADER_SIZE_NO_HEC: usize = 4;
/// Size of an ATM cell header including the HEC byte.
pub const ATM_CELL_HEADER_SIZE: usize = 5;
/// Size of a full ATM cell on the wire (header with HEC + payload).
pub const ATM_CELL_SIZE: usize = ATM_CELL_HEADER_SIZE + ATM_CELL_PAYLOAD_SIZE;

/// Coset leader XORed into the HEC (ITU-T I.432.1).
pub const HEC_COSET_LEADER: u8 = 0x55;
/// Number of header bits covered by the HEC single-error correction.
pub const HEC_PROTECTED_BITS: u8 = 40;

/// Mask for the GFC nibble in byte 0 of a UNI header.
pub const UNI_GFC_MASK: u8 = 0xF0;
/// Mask for the PTI bits in byte 3 of a cell header (before shifting).
pub const CELL_PTI_MASK: u8 = 0b0000_1110;
/// Mask for the CLP bit in byte 3 of a cell header.
pub const CELL_CLP_MASK: u8 = 0b0000_0001;

/// PTI bit that marks an OAM/resource-management cell (`1xx`).
pub const PTI_OAM_BIT: u8 = 0b100;
/// PTI bit carrying EFCI for user data cells (`0x0`/`0x1`).
pub const PTI_CONGESTION_BIT: u8 = 0b010;
/// PTI bit carrying the ATM-user-to-ATM-user indication (AAL5 end of PDU).
pub const PTI_SDU_TYPE_BIT: u8 = 0b001;

// --- OAM (ITU-T I.610) ---

/// VCI reserved for F4 segment OAM flows.
pub const VCI_F4_SEGMENT: u16 = 3;
/// VCI reserved for F4 end-to-end OAM flows.
pub const VCI_F4_END_TO_END: u16 = 4;
/// PTI value of an F5 segment OAM cell.
pub const PTI_F5_SEGMENT: u8 = 0b100;
/// PTI value of an F5 end-to-end OAM cell.
pub const PTI_F5_END_TO_END: u8 = 0b101;
/// Size of the function-specific field in an OAM cell.
pub const OAM_FUNCTION_SPECIFIC_SIZE: usize = 45;
/// Mask for the 10-bit CRC carried in the last two bytes of OAM and AAL3/4 cells.
pub const CRC10_MASK: u16 = 0x03FF;

// --- AAL1 / AAL2 / AAL3/4 SAR ---

/// Size of the AAL1 SAR-PDU header.
pub const AAL1_SAR_HEADER_SIZE: usize = 1;
/// Size of the AAL3/4 SAR-PDU header.
pub const AAL34_SAR_HEADER_SIZE: usize = 2;
/// Size of the AAL3/4 SAR-PDU trailer.
pub const AAL34_SAR_TRAILER_SIZE: usize = 2;
/// Largest legal AAL3/4 SAR-PDU payload length indicator.
pub const AAL34_MAX_LI: u8 = 44;
/// Size of the AAL2 start field plus CPS packet header stripped before dispatch.
pub const AAL2_SUBHEADER_SIZE: usize = 4;

// --- AAL5 CPCS (ITU-T I.363.5) ---

/// Size of the AAL5 CPCS trailer (UU, CPI, Length, CRC-32).
pub const AAL5_TRAILER_SIZE: usize = 8;
/// Largest padding an AAL5 CPCS-PDU can carry.
pub const AAL5_MAX_PADDING: usize = 47;
/// CRC-32 register value left after running over a PDU with a correct trailer.
pub const AAL5_CRC32_RESIDUE: u32 = 0xC704_DD7B;

// --- AAL5 payload heuristics (RFC 2684, RFC 2427) ---

/// LLC/SNAP header prefix (DSAP, SSAP, control).
pub const LLC_SNAP_PREFIX: [u8; 3] = [0xAA, 0xAA, 0x03];
/// PPP protocol number for IPv4, compared against the low byte of the first word.
pub const PPP_PROTOCOL_IP: u16 = 0x0021;
/// Q.922 UI control field preceding an NLPID in frame relay interworking.
pub const FR_NLPID_CONTROL: u8 = 0x03;
/// NLPID for IPv4.
pub const NLPID_IP: u8 = 0xCC;
/// NLPID for IPv6.
pub const NLPID_IPV6: u8 = 0x8E;
/// NLPID pad octet preceding a SNAP header.
pub const NLPID_PAD: u8 = 0x00;
/// NLPID for SNAP.
pub const NLPID_SNAP: u8 = 0x80;
/// Leading pad bytes of a VC-multiplexed bridged Ethernet PDU.
pub const BRIDGED_ETHERNET_PAD_SIZE: usize = 2;
/// Minimum AAL5 payload length before heuristics are tried.
pub const AAL5_HEURISTIC_MIN_LENGTH: usize = 8;

// --- ATM Pseudowire (RFC 4717) ---

/// Size of the PW control word.
pub const PW_CONTROL_WORD_SIZE: usize = 4;
/// Bytes of the generic (1:1 / AAL5-PDU) control word that precede the ATM-specific byte.
pub const PW_GENERIC_CW_PREFIX_SIZE: usize = 3;
/// Per-cell header size in N:1 mode.
pub const PW_N1_CELL_HEADER_SIZE: usize = 4;
/// Per-cell header size in 1:1 VCC mode.
pub const PW_11_VCC_CELL_HEADER_SIZE: usize = 1;
/// Per-cell header size in 1:1 VPC mode.
pub const PW_11_VPC_CELL_HEADER_SIZE: usize = 3;

/// Mask for the four leading bits of a PW control word that must be zero.
pub const PW_CW_BITS03_MASK: u8 = 0xF0;
/// Mask for the flags (preferred CW) or reserved bits (generic CW) of byte 0.
pub const PW_CW_FLAGS_MASK: u8 = 0x0F;
/// Mask for the reserved bits in byte 1 of the preferred control word.
pub const PW_CW_RSV_MASK: u8 = 0xC0;
/// Mask for the 6-bit length field in byte 1 of the preferred control word.
pub const PW_CW_LENGTH_MASK: u8 = 0x3F;

/// AAL5-SDU flag: transport type (1 = ATM admin cell).
pub const PW_AAL5_SDU_T_BIT: u8 = 0b1000;
/// AAL5-SDU flag: EFCI.
pub const PW_AAL5_SDU_E_BIT: u8 = 0b0100;
/// AAL5-SDU flag: CLP.
pub const PW_AAL5_SDU_C_BIT: u8 = 0b0010;
/// AAL5-SDU flag: command/response.
pub const PW_AAL5_SDU_U_BIT: u8 = 0b0001;

/// ATM-specific byte: M bit.
pub const PW_ATM_BYTE_M_BIT: u8 = 0x80;
/// ATM-specific byte: V bit (VCI present).
pub const PW_ATM_BYTE_V_BIT: u8 = 0x40;
/// 1:1 ATM-specific byte: reserved bits.
pub const PW_11_ATM_BYTE_RSV_MASK: u8 = 0x30;
/// AAL5-PDU ATM-specific byte: reserved bits.
pub const PW_AAL5_PDU_ATM_BYTE_RSV_MASK: u8 = 0x38;
/// AAL5-PDU ATM-specific byte: U bit.
pub const PW_AAL5_PDU_U_BIT: u8 = 0x04;
/// AAL5-PDU ATM-specific byte: E bit.
pub const PW_AAL5_PDU_E_BIT: u8 = 0x02;
/// ATM-specific byte: CLP bit.
pub const PW_ATM_BYTE_C_BIT: u8 = 0x01;

// --- Defaults ---

/// Default for accepting a non-zero length field in the preferred control word.
pub const DEFAULT_ALLOW_CW_LENGTH_NONZERO: bool = false;
/// Default for widening the control word length field with the reserved bits.
pub const DEFAULT_EXTEND_CW_LENGTH_WITH_RSVD: bool = false;
/// Default for expecting the HEC byte in raw cells.
pub const DEFAULT_HEC_PRESENT: bool = true;
/// Default for handing LANE traffic to the signalling decoder.
pub const DEFAULT_DISSECT_LANE_AS_SSCOP: bool = false;
