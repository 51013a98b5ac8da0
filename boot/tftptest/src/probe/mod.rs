//! Boot File Probe
//!
//! Exercises the firmware's TFTP read through the network-boot capability
//! of the boot device:
//!
//! 1. download our own boot file, which must succeed and start with "MZ";
//! 2. download a file the server does not have, which must fail with
//!    `EFI_TFTP_ERROR`.
//!
//! Every step reports to the console. The first unexpected result ends the
//! run; the operator always gets a key press before control returns.

use crate::config::{
    ProbeConfig, BOOTFILE_NAME_MAXLEN, DOWNLOAD_BUFFER_SIZE, FIRMWARE_VENDOR_MAXLEN, HEX_HEAD_LEN,
    PROGRAM_NAME, VERSION,
};
use crate::console::{pause, Console, HexHead};
use crate::error::{Error, Result};
use crate::network::{DhcpRecord, NetworkBoot, ReadFileRequest, TransferOutcome};
use crate::string::String16;

#[cfg(test)]
pub mod mock;

// =============================================================================
// PLATFORM
// =============================================================================

/// Firmware identification from the system table
#[derive(Debug, Clone, Copy, Default)]
pub struct FirmwareInfo {
    /// Vendor string
    pub vendor: String16<FIRMWARE_VENDOR_MAXLEN>,
    /// Vendor-specific revision
    pub revision: u32,
}

/// What the probe needs from the firmware besides the console
pub trait BootPlatform {
    /// Network-boot capability of the boot device
    type Network: NetworkBoot;

    /// Firmware identification
    fn firmware(&self) -> FirmwareInfo;

    /// Resolve the network-boot capability of the device we were loaded from
    fn network_boot(&self) -> Result<Self::Network>;
}

// =============================================================================
// DOWNLOAD BUFFER
// =============================================================================

/// Fixed download buffer with its in/out transfer length
pub struct DownloadBuffer {
    data: [u8; DOWNLOAD_BUFFER_SIZE],
    len: u64,
}

impl DownloadBuffer {
    /// Zeroed buffer, armed for a full-size transfer
    pub const fn new() -> Self {
        Self {
            data: [0; DOWNLOAD_BUFFER_SIZE],
            len: DOWNLOAD_BUFFER_SIZE as u64,
        }
    }

    /// Buffer capacity in bytes
    pub const fn capacity(&self) -> u64 {
        DOWNLOAD_BUFFER_SIZE as u64
    }

    /// Zero the contents
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reset the transfer length to the full capacity
    pub fn rearm(&mut self) {
        self.len = self.capacity();
    }

    /// Transfer length; after a transfer, the bytes received
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if the last transfer delivered nothing
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Buffer and length, as handed to the firmware
    pub fn parts_mut(&mut self) -> (&mut [u8], &mut u64) {
        (&mut self.data, &mut self.len)
    }

    /// First bytes, for dumps and the signature check
    pub fn head(&self) -> &[u8] {
        &self.data[..HEX_HEAD_LEN]
    }
}

impl Default for DownloadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DownloadBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DownloadBuffer")
            .field("head", &HexHead(self.head()))
            .field("len", &self.len)
            .finish()
    }
}

// =============================================================================
// PROBE
// =============================================================================

/// Boot file probe
///
/// The download buffer is borrowed: at 64 KiB it belongs in static storage,
/// not in a firmware stack frame.
#[derive(Debug)]
pub struct BootFileProbe<'b> {
    config: ProbeConfig,
    buffer: &'b mut DownloadBuffer,
}

impl<'b> BootFileProbe<'b> {
    /// Create a probe downloading into `buffer`
    pub fn new(config: ProbeConfig, buffer: &'b mut DownloadBuffer) -> Self {
        Self { config, buffer }
    }

    /// Run the probe, report the verdict and wait for a key press
    pub fn run<P, C>(&mut self, platform: &P, console: &mut C) -> Result<()>
    where
        P: BootPlatform,
        C: Console + ?Sized,
    {
        let outcome = self.probe(platform, console);

        let reported = match &outcome {
            Ok(()) => {
                log::info!("probe passed");
                console.write_str("\n[RESULT] PASS\n")
            }
            Err(error) => {
                log::error!("probe failed: {}", error);
                writeln!(console, "\n[RESULT] FAIL: {}", error)
            }
        };

        let paused = pause(console);
        outcome.and(reported).and(paused)
    }

    fn probe<P, C>(&mut self, platform: &P, console: &mut C) -> Result<()>
    where
        P: BootPlatform,
        C: Console + ?Sized,
    {
        if let Err(error) = console.reset() {
            log::warn!("console reset failed: {}", error);
        }
        self.banner(platform, console)?;

        let mut network = platform.network_boot()?;
        let dhcp = network.dhcp_record()?;
        let boot_file: String16<BOOTFILE_NAME_MAXLEN> = String16::from_ascii(dhcp.boot_file.as_bytes());
        report_dhcp(&dhcp, &boot_file, console)?;

        self.buffer.clear();
        writeln!(console, "\ndownloadbuf[0-8]: {} -- all zeros!", HexHead(self.buffer.head()))?;

        self.fetch_boot_file(&mut network, &dhcp, &boot_file, console)?;
        self.fetch_missing_file(&mut network, &dhcp, console)
    }

    fn banner<P, C>(&self, platform: &P, console: &mut C) -> Result<()>
    where
        P: BootPlatform,
        C: Console + ?Sized,
    {
        let firmware = platform.firmware();
        writeln!(console, "\n{} {}", PROGRAM_NAME, VERSION)?;
        console.write_str(
            "EFI application to test the firmware's EFI_PXE_BASE_CODE_TFTP_READ_FILE function\n",
        )?;
        writeln!(
            console,
            "[System Table] Firmware vendor: {}  Revision: {}",
            firmware.vendor, firmware.revision
        )?;
        log::info!("firmware {} rev {:#x}", firmware.vendor, firmware.revision);
        Ok(())
    }

    /// Download our own boot file; it must arrive with the executable marker
    fn fetch_boot_file<N, C>(
        &mut self,
        network: &mut N,
        dhcp: &DhcpRecord,
        boot_file: &String16<BOOTFILE_NAME_MAXLEN>,
        console: &mut C,
    ) -> Result<()>
    where
        N: NetworkBoot,
        C: Console + ?Sized,
    {
        write!(console, "\nTFTP_READ_FILE \"{}\" from {}... ", boot_file, dhcp.server_ip)?;

        let request = self.request(dhcp, dhcp.boot_file.as_cstr());
        match self.transfer(network, &request) {
            TransferOutcome::Success { received } => {
                writeln!(console, "EFI_SUCCESS! ({} bytes)", received)?;
            }
            failure => {
                writeln!(console, "failed!\nError returned: {}", failure.status())?;
                return Err(Error::UnexpectedTransferFailure(failure.status()));
            }
        }

        write!(console, "\ndownloadbuf[0-8]: {} ", HexHead(self.buffer.head()))?;
        if self.config.signature_check.matches(self.buffer.head()) {
            console.write_str("-- PE32 sig found!\n")?;
            Ok(())
        } else {
            console.write_str("-- no PE32 sig ?!\n")?;
            Err(Error::SignatureMismatch)
        }
    }

    /// Download a file the server does not have; only `EFI_TFTP_ERROR` passes
    fn fetch_missing_file<N, C>(
        &mut self,
        network: &mut N,
        dhcp: &DhcpRecord,
        console: &mut C,
    ) -> Result<()>
    where
        N: NetworkBoot,
        C: Console + ?Sized,
    {
        let missing: String16<BOOTFILE_NAME_MAXLEN> =
            String16::from_ascii(self.config.missing_file.to_bytes());
        write!(console, "\nTFTP_READ_FILE \"{}\" from {}... ", missing, dhcp.server_ip)?;

        let request = self.request(dhcp, self.config.missing_file);
        match self.transfer(network, &request) {
            TransferOutcome::Success { .. } => {
                write!(
                    console,
                    "EFI_SUCCESS ?!\n\nThis shouldn't have happened if \"{}\" doesn't exist !!!",
                    missing
                )?;
                write!(console, "\ndownloadbuf[0-8]: {} ", HexHead(self.buffer.head()))?;
                if self.config.signature_check.matches(self.buffer.head()) {
                    console.write_str("-- still PE32 sig!\n")?;
                } else {
                    console.write_str("-- no PE32 sig ?!\n")?;
                }
                Err(Error::UnexpectedTransferSuccess)
            }
            TransferOutcome::NotFound => {
                console.write_str("EFI_TFTP_ERROR!\n\nGood! As expected!\n")?;
                if let Some(error) = network.tftp_error() {
                    writeln!(console, "[TFTP] Server error {}: {}", error.code, error)?;
                    log::info!("server error {}: {}", error.code, error);
                }
                Ok(())
            }
            TransferOutcome::OtherError(status) => {
                writeln!(console, "{} ?!", status)?;
                Err(Error::UnexpectedTransferOutcome(status))
            }
        }
    }

    fn request<'a>(&self, dhcp: &DhcpRecord, filename: &'a core::ffi::CStr) -> ReadFileRequest<'a> {
        ReadFileRequest {
            server: dhcp.server_ip,
            filename,
            block_size: self.config.block_size,
            overwrite: false,
        }
    }

    /// One TFTP read into the zeroed, fully armed buffer
    fn transfer<N: NetworkBoot>(&mut self, network: &mut N, request: &ReadFileRequest<'_>) -> TransferOutcome {
        self.buffer.clear();
        self.buffer.rearm();

        let (data, len) = self.buffer.parts_mut();
        let status = network.read_file(request, data, len);
        let outcome = TransferOutcome::from_status(status, *len);

        log::info!(
            "TFTP_READ_FILE {:?} from {}: {} ({} bytes)",
            request.filename,
            request.server,
            status,
            self.buffer.len()
        );
        outcome
    }
}

fn report_dhcp<C: Console + ?Sized>(
    dhcp: &DhcpRecord,
    boot_file: &String16<BOOTFILE_NAME_MAXLEN>,
    console: &mut C,
) -> Result<()> {
    writeln!(
        console,
        "[DHCP] Client MAC: {}  IP: {}  Netmask: {}",
        dhcp.client_mac, dhcp.station_ip, dhcp.subnet_mask
    )?;
    writeln!(
        console,
        "[DHCP] TFTP Server IP: {}  Boot file (= us): {}",
        dhcp.server_ip, boot_file
    )?;
    log::debug!("{:?}", dhcp);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::mock::{MockConsole, MockPlatform, Response};
    use super::*;
    use crate::error::ProtocolKind;
    use crate::network::Ipv4Address;
    use crate::pe::SignatureCheck;
    use crate::raw::types::Status;
    use spin::Mutex;

    const PE_HEAD: &[u8] = b"MZ\x90\x00\x03\x00\x00\x00\x04\x00";

    fn run(platform: &MockPlatform, config: ProbeConfig) -> (Result<()>, MockConsole) {
        let mut buffer = DownloadBuffer::new();
        let mut console = MockConsole::new();
        let mut probe = BootFileProbe::new(config, &mut buffer);
        let result = probe.run(platform, &mut console);
        (result, console)
    }

    #[test]
    fn test_signature_found_proceeds_to_second_transfer() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR));

        let (_, console) = run(&platform, ProbeConfig::default());

        assert!(console.output().contains("-- PE32 sig found!"));
        assert_eq!(platform.calls().len(), 2);
    }

    #[test]
    fn test_tftp_error_on_missing_file_passes() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR));

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Ok(()));
        let output = console.output();
        assert!(output.contains("EFI_TFTP_ERROR!\n\nGood! As expected!"));
        assert!(output.contains("[RESULT] PASS"));
        assert!(output.ends_with("\nPress any key...\n"));
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_missing_file_success_fails_even_with_marker() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::file(PE_HEAD));

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(Error::UnexpectedTransferSuccess));
        let output = console.output();
        assert!(output.contains("EFI_SUCCESS ?!"));
        assert!(output.contains("This shouldn't have happened if \"foobar.txt\" doesn't exist !!!"));
        assert!(output.contains("-- still PE32 sig!"));
        assert!(output.contains("[RESULT] FAIL"));
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_missing_file_other_status_fails() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TIMEOUT));

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(Error::UnexpectedTransferOutcome(Status::TIMEOUT)));
        assert!(console.output().contains("EFI_TIMEOUT ?!"));
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_signature_mismatch_stops_before_second_transfer() {
        let platform = MockPlatform::pxe_boot().respond(Response::file(b"XZ\x00\x00"));

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(Error::SignatureMismatch));
        assert!(console.output().contains("-- no PE32 sig ?!"));
        assert_eq!(platform.calls().len(), 1);
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_second_transfer_gets_full_capacity() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR));

        let _ = run(&platform, ProbeConfig::default());

        let calls = platform.calls();
        assert_eq!(calls[0].buffer_size, DOWNLOAD_BUFFER_SIZE as u64);
        assert_eq!(calls[1].buffer_size, DOWNLOAD_BUFFER_SIZE as u64);
        assert!(calls[1].buffer_zeroed);
    }

    #[test]
    fn test_transfer_parameters() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR));

        let _ = run(&platform, ProbeConfig::default());

        let calls = platform.calls();
        assert_eq!(calls[0].filename, b"tftptest.efi");
        assert_eq!(calls[1].filename, b"foobar.txt");
        for call in &calls {
            assert_eq!(call.server, Ipv4Address::new(10, 0, 2, 2));
            assert_eq!(call.block_size, 1024);
            assert!(!call.overwrite);
            assert_eq!(call.buffer_len, DOWNLOAD_BUFFER_SIZE);
        }
    }

    #[test]
    fn test_first_transfer_failure() {
        let platform = MockPlatform::pxe_boot().respond(Response::status(Status::TFTP_ERROR));

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(Error::UnexpectedTransferFailure(Status::TFTP_ERROR)));
        assert!(console.output().contains("failed!\nError returned: EFI_TFTP_ERROR"));
        assert_eq!(platform.calls().len(), 1);
    }

    #[test]
    fn test_capability_lookup_failure() {
        let error = Error::CapabilityLookup {
            protocol: ProtocolKind::PxeBaseCode,
            status: Status::UNSUPPORTED,
        };
        let platform = MockPlatform::pxe_boot().fail_lookup(error);

        let (result, console) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(error));
        assert!(console
            .output()
            .contains("[RESULT] FAIL: HandleProtocol EFI_PXE_BASE_CODE_PROTOCOL failed: EFI_UNSUPPORTED"));
        assert!(platform.calls().is_empty());
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_invalid_dhcp_state() {
        let platform = MockPlatform::pxe_boot().without_dhcp();

        let (result, _) = run(&platform, ProbeConfig::default());

        assert_eq!(result, Err(Error::InvalidState));
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn test_report_lines() {
        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR).with_server_error(1, b"File not found"));

        let (_, console) = run(&platform, ProbeConfig::default());

        let output = console.output();
        assert_eq!(console.resets(), 1);
        assert!(output.contains("[System Table] Firmware vendor: EDK II  Revision: 65536"));
        assert!(output.contains("[DHCP] Client MAC: 52:54:00:12:34:56  IP: 10.0.2.15  Netmask: 255.255.255.0"));
        assert!(output.contains("[DHCP] TFTP Server IP: 10.0.2.2  Boot file (= us): tftptest.efi"));
        assert!(output.contains("downloadbuf[0-8]: 00 00 00 00 00 00 00 00 -- all zeros!"));
        assert!(output.contains("TFTP_READ_FILE \"tftptest.efi\" from 10.0.2.2... EFI_SUCCESS! (10 bytes)"));
        assert!(output.contains("downloadbuf[0-8]: 4d 5a 90 00 03 00 00 00 -- PE32 sig found!"));
        assert!(output.contains("TFTP_READ_FILE \"foobar.txt\" from 10.0.2.2... EFI_TFTP_ERROR!"));
        assert!(output.contains("[TFTP] Server error 1: File not found"));
    }

    #[test]
    fn test_strict_signature_rejects_zero_head() {
        let config = ProbeConfig {
            signature_check: SignatureCheck::Strict,
            ..ProbeConfig::default()
        };

        let lenient = MockPlatform::pxe_boot()
            .respond(Response::file(&[0u8; 16]))
            .respond(Response::status(Status::TFTP_ERROR));
        let (result, _) = run(&lenient, ProbeConfig { signature_check: SignatureCheck::Lenient, ..config });
        assert_eq!(result, Ok(()));

        let strict = MockPlatform::pxe_boot().respond(Response::file(&[0u8; 16]));
        let (result, _) = run(&strict, config);
        assert_eq!(result, Err(Error::SignatureMismatch));
    }

    #[test]
    fn test_downloads_into_static_buffer() {
        static BUFFER: Mutex<DownloadBuffer> = Mutex::new(DownloadBuffer::new());

        let platform = MockPlatform::pxe_boot()
            .respond(Response::file(PE_HEAD))
            .respond(Response::status(Status::TFTP_ERROR));
        let mut console = MockConsole::new();

        let mut buffer = BUFFER.lock();
        let result = BootFileProbe::new(ProbeConfig::default(), &mut buffer).run(&platform, &mut console);

        assert_eq!(result, Ok(()));
        assert_eq!(platform.calls().len(), 2);
        // The second read left the buffer zeroed and re-armed in place.
        assert_eq!(buffer.head(), &[0u8; HEX_HEAD_LEN]);
        assert_eq!(buffer.len(), buffer.capacity());
    }

    #[test]
    fn test_console_failure_still_waits_for_key() {
        let platform = MockPlatform::pxe_boot();
        let mut console = MockConsole::new();
        console.fail_output(Status::DEVICE_ERROR);
        let mut buffer = DownloadBuffer::new();

        let result = BootFileProbe::new(ProbeConfig::default(), &mut buffer).run(&platform, &mut console);

        assert_eq!(result, Err(Error::Device(Status::DEVICE_ERROR)));
        assert!(platform.calls().is_empty());
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_download_buffer_rearm() {
        let mut buffer = DownloadBuffer::new();
        {
            let (data, len) = buffer.parts_mut();
            data[0] = 0x4D;
            *len = 10;
        }
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.head()[0], 0x4D);

        buffer.clear();
        buffer.rearm();
        assert_eq!(buffer.len(), buffer.capacity());
        assert_eq!(buffer.head(), &[0u8; HEX_HEAD_LEN]);
    }
}
