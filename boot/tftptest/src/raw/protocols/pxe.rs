//! PXE Base Code Protocol
//!
//! Raw layout of `EFI_PXE_BASE_CODE_PROTOCOL` and its mode data. The
//! firmware owns the TFTP client behind `mtftp`; this module only mirrors
//! the structures needed to drive it.

use crate::raw::types::*;
use core::ffi::c_void;
use core::fmt;
use core::mem::{offset_of, size_of};
use static_assertions::const_assert_eq;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Size of the BOOTP `file` field
pub const BOOTP_BOOT_FILE_LEN: usize = 128;

/// Size of the BOOTP `sname` field
pub const BOOTP_SERVER_NAME_LEN: usize = 64;

/// Size of a raw PXE packet buffer
pub const PXE_PACKET_LEN: usize = 1472;

/// ARP cache / route table capacity in the mode structure
pub const PXE_ARP_CACHE_SIZE: usize = 8;

/// Route table capacity in the mode structure
pub const PXE_ROUTE_TABLE_SIZE: usize = 8;

/// IP filter list capacity
pub const PXE_IP_FILTER_SIZE: usize = 8;

// =============================================================================
// TFTP OPCODES
// =============================================================================

/// EFI_PXE_BASE_CODE_TFTP_OPCODE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct TftpOpcode(pub u32);

impl TftpOpcode {
    pub const TFTP_GET_FILE_SIZE: Self = Self(1);
    pub const TFTP_READ_FILE: Self = Self(2);
    pub const TFTP_WRITE_FILE: Self = Self(3);
    pub const TFTP_READ_DIRECTORY: Self = Self(4);
    pub const MTFTP_GET_FILE_SIZE: Self = Self(5);
    pub const MTFTP_READ_FILE: Self = Self(6);
    pub const MTFTP_READ_DIRECTORY: Self = Self(7);
}

// =============================================================================
// PACKETS
// =============================================================================

/// EFI_PXE_BASE_CODE_DHCPV4_PACKET
#[derive(Clone, Copy)]
#[repr(C)]
pub struct DhcpV4Packet {
    pub bootp_opcode: u8,
    pub bootp_hw_type: u8,
    pub bootp_hw_addr_len: u8,
    pub bootp_gate_hops: u8,
    pub bootp_ident: u32,
    pub bootp_seconds: u16,
    pub bootp_flags: u16,
    /// Client IP address
    pub bootp_ci_addr: [u8; 4],
    /// "Your" (assigned) IP address
    pub bootp_yi_addr: [u8; 4],
    /// Next server (TFTP) IP address
    pub bootp_si_addr: [u8; 4],
    /// Relay agent IP address
    pub bootp_gi_addr: [u8; 4],
    /// Client hardware address
    pub bootp_hw_addr: [u8; 16],
    pub bootp_srv_name: [u8; BOOTP_SERVER_NAME_LEN],
    /// Boot file name, NUL-terminated unless it fills the field
    pub bootp_boot_file: [Char8; BOOTP_BOOT_FILE_LEN],
    pub dhcp_magik: u32,
    pub dhcp_options: [u8; 56],
}

impl fmt::Debug for DhcpV4Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhcpV4Packet")
            .field("bootp_opcode", &self.bootp_opcode)
            .field("bootp_yi_addr", &self.bootp_yi_addr)
            .field("bootp_si_addr", &self.bootp_si_addr)
            .finish_non_exhaustive()
    }
}

/// EFI_PXE_BASE_CODE_PACKET
///
/// The DHCPv6 arm is not mirrored; it fits inside `raw`.
#[derive(Clone, Copy)]
#[repr(C)]
pub union PxePacket {
    pub raw: [u8; PXE_PACKET_LEN],
    pub dhcpv4: DhcpV4Packet,
}

impl PxePacket {
    /// DHCPv4 view of the packet
    pub fn dhcpv4(&self) -> &DhcpV4Packet {
        // Every bit pattern is a valid DhcpV4Packet.
        unsafe { &self.dhcpv4 }
    }
}

impl fmt::Debug for PxePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PxePacket").field(self.dhcpv4()).finish()
    }
}

// =============================================================================
// MODE SUB-STRUCTURES
// =============================================================================

/// EFI_PXE_BASE_CODE_IP_FILTER
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct IpFilter {
    pub filters: u8,
    pub ip_cnt: u8,
    pub reserved: u16,
    pub ip_list: [IpAddress; PXE_IP_FILTER_SIZE],
}

/// EFI_PXE_BASE_CODE_ARP_ENTRY
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct ArpEntry {
    pub ip_addr: IpAddress,
    pub mac_addr: MacAddress,
}

/// EFI_PXE_BASE_CODE_ROUTE_ENTRY
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct RouteEntry {
    pub ip_addr: IpAddress,
    pub subnet_mask: IpAddress,
    pub gw_addr: IpAddress,
}

/// EFI_PXE_BASE_CODE_ICMP_ERROR
#[derive(Clone, Copy)]
#[repr(C)]
pub struct IcmpError {
    pub ty: u8,
    pub code: u8,
    pub checksum: u16,
    /// Reserved / MTU / pointer / echo identifier+sequence
    pub u: u32,
    pub data: [u8; 494],
}

impl fmt::Debug for IcmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcmpError")
            .field("ty", &self.ty)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

/// EFI_PXE_BASE_CODE_TFTP_ERROR
#[derive(Clone, Copy)]
#[repr(C)]
pub struct TftpError {
    /// TFTP error code sent by the server
    pub error_code: u8,
    /// NUL-terminated error message sent by the server
    pub error_string: [Char8; 127],
}

impl fmt::Debug for TftpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TftpError")
            .field("error_code", &self.error_code)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// MODE
// =============================================================================

/// EFI_PXE_BASE_CODE_MODE
///
/// Read-only for the application; the firmware updates it.
#[derive(Debug)]
#[repr(C)]
pub struct PxeBaseCodeMode {
    pub started: Boolean,
    pub ipv6_available: Boolean,
    pub ipv6_supported: Boolean,
    pub using_ipv6: Boolean,
    pub bis_supported: Boolean,
    pub bis_detected: Boolean,
    pub auto_arp: Boolean,
    pub send_guid: Boolean,
    /// `dhcp_discover` holds a valid packet
    pub dhcp_discover_valid: Boolean,
    pub dhcp_ack_received: Boolean,
    pub proxy_offer_received: Boolean,
    pub pxe_discover_valid: Boolean,
    pub pxe_reply_received: Boolean,
    pub pxe_bis_reply_received: Boolean,
    pub icmp_error_received: Boolean,
    /// `tftp_error` holds the last error sent by a TFTP server
    pub tftp_error_received: Boolean,
    pub make_callbacks: Boolean,
    pub ttl: u8,
    pub tos: u8,
    pub station_ip: IpAddress,
    pub subnet_mask: IpAddress,
    pub dhcp_discover: PxePacket,
    pub dhcp_ack: PxePacket,
    pub proxy_offer: PxePacket,
    pub pxe_discover: PxePacket,
    pub pxe_reply: PxePacket,
    pub pxe_bis_reply: PxePacket,
    pub ip_filter: IpFilter,
    pub arp_cache_entries: u32,
    pub arp_cache: [ArpEntry; PXE_ARP_CACHE_SIZE],
    pub route_table_entries: u32,
    pub route_table: [RouteEntry; PXE_ROUTE_TABLE_SIZE],
    pub icmp_error: IcmpError,
    pub tftp_error: TftpError,
}

// =============================================================================
// PROTOCOL
// =============================================================================

/// EFI_PXE_BASE_CODE_PROTOCOL
#[repr(C)]
pub struct PxeBaseCodeProtocol {
    pub revision: u64,

    pub start: unsafe extern "efiapi" fn(this: *mut Self, use_ipv6: Boolean) -> Status,

    pub stop: unsafe extern "efiapi" fn(this: *mut Self) -> Status,

    pub dhcp: unsafe extern "efiapi" fn(this: *mut Self, sort_offers: Boolean) -> Status,

    pub discover: unsafe extern "efiapi" fn(
        this: *mut Self,
        ty: u16,
        layer: *mut u16,
        use_bis: Boolean,
        info: *const c_void,
    ) -> Status,

    /// TFTP/MTFTP transfer; `buffer_size` is in/out
    pub mtftp: unsafe extern "efiapi" fn(
        this: *mut Self,
        operation: TftpOpcode,
        buffer: *mut c_void,
        overwrite: Boolean,
        buffer_size: *mut u64,
        block_size: *const usize,
        server_ip: *const IpAddress,
        filename: *const Char8,
        info: *const c_void,
        dont_use_buffer: Boolean,
    ) -> Status,

    pub udp_write: unsafe extern "efiapi" fn(
        this: *mut Self,
        op_flags: u16,
        dest_ip: *const IpAddress,
        dest_port: *const u16,
        gateway_ip: *const IpAddress,
        src_ip: *const IpAddress,
        src_port: *mut u16,
        header_size: *const usize,
        header_ptr: *const c_void,
        buffer_size: *const usize,
        buffer_ptr: *const c_void,
    ) -> Status,

    pub udp_read: unsafe extern "efiapi" fn(
        this: *mut Self,
        op_flags: u16,
        dest_ip: *mut IpAddress,
        dest_port: *mut u16,
        src_ip: *mut IpAddress,
        src_port: *mut u16,
        header_size: *const usize,
        header_ptr: *mut c_void,
        buffer_size: *mut usize,
        buffer_ptr: *mut c_void,
    ) -> Status,

    pub set_ip_filter: unsafe extern "efiapi" fn(this: *mut Self, new_filter: *const IpFilter) -> Status,

    pub arp: unsafe extern "efiapi" fn(
        this: *mut Self,
        ip_addr: *const IpAddress,
        mac_addr: *mut MacAddress,
    ) -> Status,

    pub set_parameters: unsafe extern "efiapi" fn(
        this: *mut Self,
        new_auto_arp: *const Boolean,
        new_send_guid: *const Boolean,
        new_ttl: *const u8,
        new_tos: *const u8,
        new_make_callback: *const Boolean,
    ) -> Status,

    pub set_station_ip: unsafe extern "efiapi" fn(
        this: *mut Self,
        new_station_ip: *const IpAddress,
        new_subnet_mask: *const IpAddress,
    ) -> Status,

    pub set_packets: unsafe extern "efiapi" fn(
        this: *mut Self,
        new_dhcp_discover_valid: *const Boolean,
        new_dhcp_ack_received: *const Boolean,
        new_proxy_offer_received: *const Boolean,
        new_pxe_discover_valid: *const Boolean,
        new_pxe_reply_received: *const Boolean,
        new_pxe_bis_reply_received: *const Boolean,
        new_dhcp_discover: *const PxePacket,
        new_dhcp_ack: *const PxePacket,
        new_proxy_offer: *const PxePacket,
        new_pxe_discover: *const PxePacket,
        new_pxe_reply: *const PxePacket,
        new_pxe_bis_reply: *const PxePacket,
    ) -> Status,

    /// Mode data, owned by the firmware
    pub mode: *const PxeBaseCodeMode,
}

impl PxeBaseCodeProtocol {
    /// Protocol GUID
    pub const GUID: Guid = guids::PXE_BASE_CODE_PROTOCOL;
}

impl fmt::Debug for PxeBaseCodeProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PxeBaseCodeProtocol")
            .field("revision", &self.revision)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// LAYOUT CHECKS
// =============================================================================

const_assert_eq!(size_of::<DhcpV4Packet>(), 296);
const_assert_eq!(offset_of!(DhcpV4Packet, bootp_si_addr), 20);
const_assert_eq!(offset_of!(DhcpV4Packet, bootp_hw_addr), 28);
const_assert_eq!(offset_of!(DhcpV4Packet, bootp_boot_file), 108);
const_assert_eq!(size_of::<PxePacket>(), PXE_PACKET_LEN);
const_assert_eq!(size_of::<IpFilter>(), 132);
const_assert_eq!(size_of::<ArpEntry>(), 48);
const_assert_eq!(size_of::<RouteEntry>(), 48);
const_assert_eq!(size_of::<IcmpError>(), 504);
const_assert_eq!(size_of::<TftpError>(), 128);
const_assert_eq!(offset_of!(PxeBaseCodeMode, station_ip), 20);
const_assert_eq!(offset_of!(PxeBaseCodeMode, dhcp_discover), 52);
const_assert_eq!(offset_of!(PxeBaseCodeMode, dhcp_ack), 52 + PXE_PACKET_LEN);
const_assert_eq!(offset_of!(PxeBaseCodeMode, tftp_error), 10296);
const_assert_eq!(size_of::<PxeBaseCodeMode>(), 10424);

#[cfg(target_pointer_width = "64")]
const_assert_eq!(offset_of!(PxeBaseCodeProtocol, mtftp), 40);
#[cfg(target_pointer_width = "64")]
const_assert_eq!(offset_of!(PxeBaseCodeProtocol, mode), 104);
