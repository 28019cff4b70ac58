//! PTY (pseudoterminal) management
//!
//! The pair is opened with `openpty`, which applies the window size before
//! any process can observe the subordinate side. Both ends are
//! `FD_CLOEXEC`; the child only keeps the copies it dups onto fds 0-2.

use std::fs::File;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::pty::{openpty, OpenptyResult};

use crate::error::{Error, Result};
use crate::size::WindowSize;

/// A pseudoterminal master, plus the subordinate until a child takes it
pub struct Pty {
    master: OwnedFd,
    subordinate: Option<OwnedFd>,
    size: WindowSize,
}

impl Pty {
    /// Open a new pair with the given geometry
    pub fn open(size: WindowSize) -> Result<Self> {
        let ws = size.to_winsize();
        let OpenptyResult { master, slave } = openpty(&ws, None).map_err(Error::Open)?;
        for fd in [master.as_raw_fd(), slave.as_raw_fd()] {
            fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        }
        log::debug!(
            "Opened PTY {}x{} (master fd {}, subordinate fd {})",
            size.cols,
            size.rows,
            master.as_raw_fd(),
            slave.as_raw_fd()
        );
        Ok(Self {
            master,
            subordinate: Some(slave),
            size,
        })
    }

    /// Geometry the pair was opened with
    pub fn size(&self) -> WindowSize {
        self.size
    }

    /// Geometry as currently reported by the kernel
    pub fn window_size(&self) -> Result<WindowSize> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe {
            libc::ioctl(
                self.master.as_raw_fd(),
                libc::TIOCGWINSZ as libc::c_ulong,
                &mut ws,
            )
        };
        if result == -1 {
            Err(Error::WindowSize(io::Error::last_os_error()))
        } else {
            Ok(WindowSize::from(ws))
        }
    }

    /// Independent handle for reading child output
    pub fn master_reader(&self) -> Result<File> {
        Ok(File::from(self.master.try_clone()?))
    }

    /// Independent handle for writing child input
    pub fn master_writer(&self) -> Result<File> {
        Ok(File::from(self.master.try_clone()?))
    }

    pub(crate) fn take_subordinate(&mut self) -> Option<OwnedFd> {
        self.subordinate.take()
    }
}

impl AsRawFd for Pty {
    fn as_raw_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }
}

impl AsFd for Pty {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}
