//! Error types for the TFTP probe
//!
//! Every error is terminal: the probe reports it, waits for the operator and
//! leaves with the status returned by [`Error::to_status`].

use crate::raw::types::Status;
use core::fmt;

/// Result type for probe operations
pub type Result<T> = core::result::Result<T, Error>;

/// Firmware protocol looked up while resolving the network-boot capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    /// EFI_LOADED_IMAGE_PROTOCOL on the image handle
    LoadedImage,
    /// EFI_PXE_BASE_CODE_PROTOCOL on the boot device handle
    PxeBaseCode,
}

impl ProtocolKind {
    /// Firmware name of the protocol
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadedImage => "EFI_LOADED_IMAGE_PROTOCOL",
            Self::PxeBaseCode => "EFI_PXE_BASE_CODE_PROTOCOL",
        }
    }
}

/// Probe error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Environment
    // =========================================================================

    /// System table pointer is null or its signature is wrong
    InvalidSystemTable,

    /// System table carries no Boot Services
    BootServicesUnavailable,

    /// System table carries no console input or output
    ConsoleUnavailable,

    /// A console call failed
    Device(Status),

    // =========================================================================
    // Probe
    // =========================================================================

    /// The firmware could not supply a protocol for the boot device
    CapabilityLookup {
        /// Protocol being looked up
        protocol: ProtocolKind,
        /// Status returned by HandleProtocol
        status: Status,
    },

    /// The PXE mode has no valid DHCP discover record
    InvalidState,

    /// The boot file download did not succeed
    UnexpectedTransferFailure(Status),

    /// The boot file download carried no executable signature
    SignatureMismatch,

    /// The download of a nonexistent file succeeded
    UnexpectedTransferSuccess,

    /// The download of a nonexistent file failed with a non-TFTP status
    UnexpectedTransferOutcome(Status),
}

impl Error {
    /// Exit status reported to the firmware for this error
    pub fn to_status(self) -> Status {
        match self {
            Self::InvalidSystemTable => Status::INVALID_PARAMETER,
            _ => Status::LOAD_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSystemTable => write!(f, "invalid system table"),
            Self::BootServicesUnavailable => write!(f, "boot services unavailable"),
            Self::ConsoleUnavailable => write!(f, "console unavailable"),
            Self::Device(status) => write!(f, "console device error: {}", status),
            Self::CapabilityLookup { protocol, status } => {
                write!(f, "HandleProtocol {} failed: {}", protocol.name(), status)
            }
            Self::InvalidState => write!(f, "DHCP discover record not valid"),
            Self::UnexpectedTransferFailure(status) => {
                write!(f, "boot file download failed: {}", status)
            }
            Self::SignatureMismatch => write!(f, "boot file has no PE32 signature"),
            Self::UnexpectedTransferSuccess => {
                write!(f, "download of a nonexistent file succeeded")
            }
            Self::UnexpectedTransferOutcome(status) => {
                write!(f, "download of a nonexistent file failed with {}", status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_errors_map_to_load_error() {
        let errors = [
            Error::CapabilityLookup { protocol: ProtocolKind::PxeBaseCode, status: Status::UNSUPPORTED },
            Error::InvalidState,
            Error::UnexpectedTransferFailure(Status::TIMEOUT),
            Error::SignatureMismatch,
            Error::UnexpectedTransferSuccess,
            Error::UnexpectedTransferOutcome(Status::ICMP_ERROR),
        ];
        for error in errors {
            assert_eq!(error.to_status(), Status::LOAD_ERROR);
        }
        assert_eq!(Error::InvalidSystemTable.to_status(), Status::INVALID_PARAMETER);
    }

    #[test]
    fn test_display_includes_firmware_status() {
        let error = Error::CapabilityLookup {
            protocol: ProtocolKind::LoadedImage,
            status: Status::UNSUPPORTED,
        };
        assert_eq!(
            format!("{}", error),
            "HandleProtocol EFI_LOADED_IMAGE_PROTOCOL failed: EFI_UNSUPPORTED"
        );
    }
}
