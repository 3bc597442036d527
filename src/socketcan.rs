//! Exposes a Linux socketcan interface as a CAN driver.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use async_trait::async_trait;
use tokio::io::unix::AsyncFd;

use crate::can_driver::CanDriver;
use crate::codec::{self, WIRE_LEN};
use crate::error::{Error, Result};
use crate::frame::{CanFrame, timestamp_now};

/// Driver for a raw `AF_CAN` socket bound to one interface.
///
/// The socket is opened non-blocking and registered with the tokio
/// reactor, so reads suspend the task instead of the thread.
pub struct SocketCanDriver {
    ifname: String,
    fd: Option<AsyncFd<OwnedFd>>,
}

impl SocketCanDriver {
    /// Open and bind a raw CAN socket on the named interface.
    pub fn open(ifname: &str) -> Result<Self> {
        let fd = open_raw_socket(ifname).map_err(|source| Error::ChannelUnavailable {
            iface: ifname.to_string(),
            source,
        })?;
        log::info!("opened CAN device {}", ifname);
        let fd = AsyncFd::new(fd)?;
        Ok(SocketCanDriver {
            ifname: ifname.to_string(),
            fd: Some(fd),
        })
    }

    fn fd(&self) -> Result<&AsyncFd<OwnedFd>> {
        self.fd.as_ref().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("CAN device {} is closed", self.ifname),
            ))
        })
    }
}

#[async_trait]
impl CanDriver for SocketCanDriver {
    async fn send_frame(&mut self, frame: &CanFrame) -> Result<()> {
        let fd = self.fd()?;
        let buf = codec::encode_wire(frame);
        loop {
            let mut guard = fd.writable().await?;
            match guard.try_io(|inner| {
                let n = unsafe {
                    libc::write(
                        inner.as_raw_fd(),
                        buf.as_ptr() as *const libc::c_void,
                        buf.len(),
                    )
                };
                if n < 0 {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(n as usize)
                }
            }) {
                Ok(res) => {
                    res?;
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn read_frame(&mut self) -> Result<CanFrame> {
        let fd = self.fd()?;
        let mut buf = [0u8; WIRE_LEN];
        loop {
            let mut guard = fd.readable().await?;
            match guard.try_io(|inner| {
                let n = unsafe {
                    libc::read(
                        inner.as_raw_fd(),
                        buf.as_mut_ptr() as *mut libc::c_void,
                        buf.len(),
                    )
                };
                if n < 0 {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(n as usize)
                }
            }) {
                Ok(res) => {
                    let n = res?;
                    if n < WIRE_LEN {
                        return Err(Error::Io(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("truncated CAN frame ({} bytes)", n),
                        )));
                    }
                    let mut frame = codec::decode_wire(&buf)?;
                    frame.set_timestamp(Some(timestamp_now()));
                    return Ok(frame);
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn close_channel(&mut self) -> Result<()> {
        if let Some(fd) = self.fd.take() {
            log::info!("closing CAN device {}", self.ifname);
            drop(fd);
        }
        Ok(())
    }
}

fn open_raw_socket(ifname: &str) -> io::Result<OwnedFd> {
    let name = CString::new(ifname)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "interface name contains NUL"))?;

    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    if index == 0 {
        return Err(io::Error::last_os_error());
    }

    let raw = unsafe {
        libc::socket(
            libc::PF_CAN,
            libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            libc::CAN_RAW,
        )
    };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    let mut addr: libc::sockaddr_can = unsafe { mem::zeroed() };
    addr.can_family = libc::AF_CAN as libc::sa_family_t;
    addr.can_ifindex = index as libc::c_int;

    let ret = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            &addr as *const libc::sockaddr_can as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_can>() as libc::socklen_t,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(fd)
}
