//! PXE Base Code Protocol
//!
//! Network-boot capability backed by `EFI_PXE_BASE_CODE_PROTOCOL`. The
//! firmware already ran DHCP to boot us; this wrapper reads what it
//! negotiated and drives its TFTP client.

use crate::error::{Error, Result};
use crate::network::{
    BootFile, DhcpRecord, Ipv4Address, MacAddress, NetworkBoot, ReadFileRequest, TftpErrorInfo,
};
use crate::raw::protocols::pxe::{PxeBaseCodeMode, PxeBaseCodeProtocol, TftpOpcode};
use crate::raw::types::*;
use core::ptr::{self, NonNull};

/// PXE Base Code protocol instance of the boot device
#[derive(Debug)]
pub struct PxeBaseCode {
    inner: NonNull<PxeBaseCodeProtocol>,
}

impl PxeBaseCode {
    /// Wrap a protocol interface returned by `HandleProtocol`
    ///
    /// # Safety
    /// The interface must stay valid while boot services are active.
    pub unsafe fn from_ptr(inner: NonNull<PxeBaseCodeProtocol>) -> Self {
        Self { inner }
    }

    /// Mode data published by the firmware
    fn mode(&self) -> Option<&PxeBaseCodeMode> {
        unsafe { self.inner.as_ref().mode.as_ref() }
    }
}

impl NetworkBoot for PxeBaseCode {
    fn dhcp_record(&self) -> Result<DhcpRecord> {
        let mode = self.mode().ok_or(Error::InvalidState)?;
        if !is_true(mode.dhcp_discover_valid) {
            return Err(Error::InvalidState);
        }

        let discover = mode.dhcp_discover.dhcpv4();
        let ack = mode.dhcp_ack.dhcpv4();

        Ok(DhcpRecord {
            client_mac: MacAddress::from_hw_addr(&discover.bootp_hw_addr),
            station_ip: Ipv4Address(mode.station_ip.v4()),
            subnet_mask: Ipv4Address(mode.subnet_mask.v4()),
            server_ip: Ipv4Address(ack.bootp_si_addr),
            boot_file: BootFile::from_bootp(&ack.bootp_boot_file),
        })
    }

    fn read_file(
        &mut self,
        request: &ReadFileRequest<'_>,
        buffer: &mut [u8],
        buffer_size: &mut u64,
    ) -> Status {
        let this = self.inner.as_ptr();
        let server = IpAddress::from_v4(request.server.0);
        let block_size = request.block_size;
        let overwrite = if request.overwrite { TRUE } else { FALSE };

        // The firmware must not write past the buffer.
        *buffer_size = (*buffer_size).min(buffer.len() as u64);

        log::trace!(
            "Mtftp(TFTP_READ_FILE, {:?}, server {}, size {}, block {})",
            request.filename,
            request.server,
            *buffer_size,
            block_size
        );

        unsafe {
            ((*this).mtftp)(
                this,
                TftpOpcode::TFTP_READ_FILE,
                buffer.as_mut_ptr().cast(),
                overwrite,
                buffer_size,
                &block_size,
                &server,
                request.filename.as_ptr().cast::<Char8>(),
                ptr::null(),
                FALSE,
            )
        }
    }

    fn tftp_error(&self) -> Option<TftpErrorInfo> {
        let mode = self.mode()?;
        if !is_true(mode.tftp_error_received) {
            return None;
        }
        Some(TftpErrorInfo::new(mode.tftp_error.error_code, &mode.tftp_error.error_string))
    }
}
