//! tftptest.efi
//!
//! UEFI entry point. Build with `--target x86_64-unknown-uefi` and serve
//! the result as the PXE boot file.

#![cfg_attr(target_os = "uefi", no_std, no_main)]

use pxe_tftptest::config::{self, ProbeConfig};
use pxe_tftptest::debug;
use pxe_tftptest::probe::DownloadBuffer;
use pxe_tftptest::raw::system_table::EfiSystemTable;
use pxe_tftptest::raw::types::{Handle, Status};
use pxe_tftptest::{BootFileProbe, Result, UefiEnv};
use spin::Mutex;

/// Transfer buffer; lives in the image, off the firmware stack
static DOWNLOAD_BUFFER: Mutex<DownloadBuffer> = Mutex::new(DownloadBuffer::new());

// =============================================================================
// ENTRY POINT
// =============================================================================

/// UEFI entry point
#[no_mangle]
pub extern "efiapi" fn efi_main(image_handle: Handle, system_table: *mut EfiSystemTable) -> Status {
    debug::init(config::log_level());
    log::info!("{} {} starting", config::PROGRAM_NAME, config::VERSION);

    match probe_main(image_handle, system_table) {
        Ok(()) => Status::SUCCESS,
        Err(e) => {
            log::error!("exiting: {}", e);
            e.to_status()
        }
    }
}

fn probe_main(image_handle: Handle, system_table: *mut EfiSystemTable) -> Result<()> {
    let env = unsafe { UefiEnv::init(image_handle, system_table)? };
    let mut console = env.console()?;

    let mut buffer = DOWNLOAD_BUFFER.lock();
    let mut probe = BootFileProbe::new(ProbeConfig::default(), &mut buffer);
    probe.run(&env, &mut console)
}

#[cfg(target_os = "uefi")]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
    debug::panic_log(format_args!("panic: {}", info));
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(not(target_os = "uefi"))]
fn main() {
    eprintln!("tftptest is a UEFI application; build it for x86_64-unknown-uefi");
}
