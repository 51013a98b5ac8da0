//! Test doubles for the probe: a scripted PXE capability and a recording
//! console.

use super::{BootPlatform, FirmwareInfo};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::network::{
    BootFile, DhcpRecord, Ipv4Address, MacAddress, NetworkBoot, ReadFileRequest, TftpErrorInfo,
};
use crate::raw::types::Status;
use crate::string::String16;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

// =============================================================================
// CONSOLE
// =============================================================================

/// Console recording everything written to it
#[derive(Debug, Default)]
pub struct MockConsole {
    output: String,
    resets: usize,
    key_waits: usize,
    output_failure: Option<Status>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `status`
    pub fn fail_output(&mut self, status: Status) {
        self.output_failure = Some(status);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn key_waits(&self) -> usize {
        self.key_waits
    }
}

impl Console for MockConsole {
    fn write_str(&mut self, s: &str) -> Result<()> {
        if let Some(status) = self.output_failure {
            return Err(Error::Device(status));
        }
        self.output.push_str(s);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }

    fn wait_for_key(&mut self) -> Result<()> {
        self.key_waits += 1;
        Ok(())
    }
}

// =============================================================================
// NETWORK
// =============================================================================

/// Scripted reply to one `read_file` call
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    data: Vec<u8>,
    server_error: Option<TftpErrorInfo>,
}

impl Response {
    /// Successful transfer delivering `data`
    pub fn file(data: &[u8]) -> Self {
        Self {
            status: Status::SUCCESS,
            data: data.to_vec(),
            server_error: None,
        }
    }

    /// Failed transfer
    pub fn status(status: Status) -> Self {
        Self {
            status,
            data: Vec::new(),
            server_error: None,
        }
    }

    /// Error packet the server sent during this transfer
    pub fn with_server_error(mut self, code: u8, message: &[u8]) -> Self {
        self.server_error = Some(TftpErrorInfo::new(code, message));
        self
    }
}

/// What the probe passed to one `read_file` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub filename: Vec<u8>,
    pub server: Ipv4Address,
    pub block_size: usize,
    pub overwrite: bool,
    /// `buffer_size` on entry
    pub buffer_size: u64,
    pub buffer_len: usize,
    pub buffer_zeroed: bool,
}

#[derive(Debug)]
struct NetworkState {
    dhcp: Result<DhcpRecord>,
    responses: VecDeque<Response>,
    calls: Vec<RecordedCall>,
    server_error: Option<TftpErrorInfo>,
}

/// PXE capability replaying scripted responses
#[derive(Debug, Clone)]
pub struct MockNetwork {
    state: Rc<RefCell<NetworkState>>,
}

impl NetworkBoot for MockNetwork {
    fn dhcp_record(&self) -> Result<DhcpRecord> {
        self.state.borrow().dhcp
    }

    fn read_file(
        &mut self,
        request: &ReadFileRequest<'_>,
        buffer: &mut [u8],
        buffer_size: &mut u64,
    ) -> Status {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            filename: request.filename.to_bytes().to_vec(),
            server: request.server,
            block_size: request.block_size,
            overwrite: request.overwrite,
            buffer_size: *buffer_size,
            buffer_len: buffer.len(),
            buffer_zeroed: buffer.iter().all(|&b| b == 0),
        });

        let Some(response) = state.responses.pop_front() else {
            return Status::DEVICE_ERROR;
        };
        state.server_error = response.server_error;

        if response.status.is_success() {
            let len = response.data.len().min(buffer.len());
            buffer[..len].copy_from_slice(&response.data[..len]);
            *buffer_size = len as u64;
        }
        response.status
    }

    fn tftp_error(&self) -> Option<TftpErrorInfo> {
        self.state.borrow().server_error
    }
}

// =============================================================================
// PLATFORM
// =============================================================================

/// Firmware with a PXE-booted NIC
#[derive(Debug)]
pub struct MockPlatform {
    state: Rc<RefCell<NetworkState>>,
    lookup_failure: Option<Error>,
}

impl MockPlatform {
    /// PXE boot of `tftptest.efi` from 10.0.2.2, QEMU user-network style
    pub fn pxe_boot() -> Self {
        let dhcp = DhcpRecord {
            client_mac: MacAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
            station_ip: Ipv4Address::new(10, 0, 2, 15),
            subnet_mask: Ipv4Address::new(255, 255, 255, 0),
            server_ip: Ipv4Address::new(10, 0, 2, 2),
            boot_file: BootFile::from_bootp(b"tftptest.efi\0"),
        };
        Self {
            state: Rc::new(RefCell::new(NetworkState {
                dhcp: Ok(dhcp),
                responses: VecDeque::new(),
                calls: Vec::new(),
                server_error: None,
            })),
            lookup_failure: None,
        }
    }

    /// Queue the reply to the next transfer
    pub fn respond(self, response: Response) -> Self {
        self.state.borrow_mut().responses.push_back(response);
        self
    }

    /// Fail the capability lookup
    pub fn fail_lookup(mut self, error: Error) -> Self {
        self.lookup_failure = Some(error);
        self
    }

    /// Report no valid DHCP discover record
    pub fn without_dhcp(self) -> Self {
        self.state.borrow_mut().dhcp = Err(Error::InvalidState);
        self
    }

    /// Transfers issued so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }
}

impl BootPlatform for MockPlatform {
    type Network = MockNetwork;

    fn firmware(&self) -> FirmwareInfo {
        FirmwareInfo {
            vendor: String16::from_str("EDK II"),
            revision: 0x10000,
        }
    }

    fn network_boot(&self) -> Result<MockNetwork> {
        if let Some(error) = self.lookup_failure {
            return Err(error);
        }
        Ok(MockNetwork {
            state: Rc::clone(&self.state),
        })
    }
}
