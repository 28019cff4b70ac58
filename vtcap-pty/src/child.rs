//! Child process management for PTY
//!
//! Spawns a program with the subordinate side of a fresh pair as its
//! controlling terminal and standard streams.

use std::ffi::{CString, OsStr};
use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{dup2, execvp, fork, setsid, ForkResult, Pid};

use crate::error::{Error, Result};
use crate::pty::Pty;
use crate::size::WindowSize;

/// Exit status used when exec fails in the forked child
pub const EXEC_FAILED: i32 = 127;

/// A child process attached to a PTY
pub struct Child {
    pty: Pty,
    pid: Pid,
    /// Set once the child has been reaped
    status: Option<WaitStatus>,
}

impl Child {
    /// Spawn `program` with `args` on a new PTY of the given size.
    ///
    /// The program is looked up on `PATH`. Environment and working directory
    /// are inherited. If exec fails the child exits with [`EXEC_FAILED`],
    /// which the caller observes as an ordinary exit.
    pub fn spawn<S, I, A>(program: S, args: I, size: WindowSize) -> Result<Self>
    where
        S: AsRef<OsStr>,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let program = cstring(program.as_ref())?;
        let mut argv = vec![program.clone()];
        for arg in args {
            argv.push(cstring(arg.as_ref())?);
        }

        let mut pty = Pty::open(size)?;
        let subordinate = pty.take_subordinate().ok_or(Error::Spawn(Errno::EBADF))?;

        match unsafe { fork() }.map_err(Error::Spawn)? {
            ForkResult::Parent { child } => {
                drop(subordinate);
                log::info!("Spawned {:?} as pid {}", program, child);
                Ok(Self {
                    pty,
                    pid: child,
                    status: None,
                })
            }
            ForkResult::Child => {
                // Rust ignores SIGPIPE and exec would carry that over
                unsafe {
                    libc::signal(libc::SIGPIPE, libc::SIG_DFL);
                }

                if setsid().is_err() {
                    unsafe { libc::_exit(1) };
                }

                let raw = subordinate.as_raw_fd();
                unsafe {
                    if libc::ioctl(raw, libc::TIOCSCTTY as libc::c_ulong, 0) < 0 {
                        libc::_exit(1);
                    }
                }

                for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
                    if dup2(raw, target).is_err() {
                        unsafe { libc::_exit(1) };
                    }
                }
                // dup2 onto itself keeps the close-on-exec flag
                if raw <= 2 && fcntl(raw, FcntlArg::F_SETFD(FdFlag::empty())).is_err() {
                    unsafe { libc::_exit(1) };
                }

                let _ = execvp(&program, &argv);
                unsafe { libc::_exit(EXEC_FAILED) }
            }
        }
    }

    pub fn pty(&self) -> &Pty {
        &self.pty
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// True once the child has been reaped by `try_wait` or `wait`
    pub fn is_exited(&self) -> bool {
        self.status.is_some()
    }

    /// Reap the child if it has exited, without blocking
    pub fn try_wait(&mut self) -> Result<Option<WaitStatus>> {
        if let Some(status) = self.status {
            return Ok(Some(status));
        }
        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG))? {
            WaitStatus::StillAlive => Ok(None),
            status => Ok(self.record(status)),
        }
    }

    /// Block until the child exits
    pub fn wait(&mut self) -> Result<WaitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        loop {
            match waitpid(self.pid, None) {
                Ok(status) => {
                    if let Some(status) = self.record(status) {
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Ask the child to terminate (SIGTERM). No-op once it has exited.
    pub fn terminate(&self) -> Result<()> {
        if self.is_exited() {
            return Ok(());
        }
        match kill(self.pid, Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Independent handle for reading child output
    pub fn master_reader(&self) -> Result<File> {
        self.pty.master_reader()
    }

    /// Independent handle for writing child input
    pub fn master_writer(&self) -> Result<File> {
        self.pty.master_writer()
    }

    fn record(&mut self, status: WaitStatus) -> Option<WaitStatus> {
        match status {
            WaitStatus::Exited(..) | WaitStatus::Signaled(..) => {
                log::info!("Child {} finished: {:?}", self.pid, status);
                self.status = Some(status);
                Some(status)
            }
            _ => None,
        }
    }
}

impl AsRawFd for Child {
    fn as_raw_fd(&self) -> RawFd {
        self.pty.as_raw_fd()
    }
}

impl AsFd for Child {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.pty.as_fd()
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        if !self.is_exited() {
            let _ = kill(self.pid, Signal::SIGHUP);
        }
    }
}

fn cstring(value: &OsStr) -> Result<CString> {
    CString::new(value.as_bytes()).map_err(|e| Error::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    /// Read until the subordinate side is closed everywhere (EIO on Linux)
    fn read_to_hangup(child: &Child) -> String {
        let mut reader = child.master_reader().unwrap();
        let mut output = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => output.extend_from_slice(&buf[..n]),
            }
        }
        String::from_utf8_lossy(&output).into_owned()
    }

    #[test]
    fn test_spawn_echo() {
        let mut child = Child::spawn("echo", ["hello"], WindowSize::default()).unwrap();
        let output = read_to_hangup(&child);
        assert!(output.contains("hello"), "got {:?}", output);
        assert_eq!(child.wait().unwrap(), WaitStatus::Exited(child.pid(), 0));
        assert!(child.is_exited());
    }

    #[test]
    fn test_child_sees_window_size() {
        let mut child = Child::spawn("stty", ["size"], WindowSize::new(80, 24)).unwrap();
        let output = read_to_hangup(&child);
        assert!(output.contains("24 80"), "got {:?}", output);
        child.wait().unwrap();
    }

    #[test]
    fn test_master_reports_requested_geometry() {
        let mut child = Child::spawn("sleep", ["30"], WindowSize::new(80, 24)).unwrap();
        assert_eq!(child.pty().size(), WindowSize::new(80, 24));
        assert_eq!(child.pty().window_size().unwrap(), child.pty().size());
        child.terminate().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_exec_failure_exits_127() {
        let mut child = Child::spawn(
            "/nonexistent/vtcap-test-program",
            Vec::<String>::new(),
            WindowSize::default(),
        )
        .unwrap();
        assert_eq!(
            child.wait().unwrap(),
            WaitStatus::Exited(child.pid(), EXEC_FAILED)
        );
    }

    #[test]
    fn test_terminate_running_child() {
        let mut child = Child::spawn("sleep", ["30"], WindowSize::default()).unwrap();
        assert!(child.try_wait().unwrap().is_none());
        child.terminate().unwrap();
        assert_eq!(
            child.wait().unwrap(),
            WaitStatus::Signaled(child.pid(), Signal::SIGTERM, false)
        );
        // Terminating an exited child is a no-op
        child.terminate().unwrap();
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_interior_nul_rejected() {
        let result = Child::spawn("echo", ["a\0b"], WindowSize::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
