//! Session driver
//!
//! Owns the child, the engine and the control channel, and services both
//! byte sources from a single `poll` loop:
//! - child output is fed to the engine, whose replies go straight back to
//!   the child through the [`Mirror`]
//! - control frames are parsed and answered in arrival order
//! - the child is reaped between events; its exit is announced once with
//!   `*exited` after its remaining output has been consumed

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::AsFd;
use std::thread;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use vtcap_core::{Disposition, Terminal, UnhandledPolicy};
use vtcap_pty::{Child, WindowSize};

use crate::config::{Config, DRIVER_WAIT_DELAY};
use crate::control::{self, Command, FrameReader};
use crate::error::Result;
use crate::mirror::Mirror;
use crate::snapshot;

/// Upper bound on reads when consuming output left behind by an exited child
const DRAIN_READS: usize = 256;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Starting,
    Running,
    Terminating,
    Stopped,
}

pub struct Session {
    config: Config,
    state: State,
    child: Child,
    terminal: Terminal<Mirror<File>>,
    master: File,
    /// False once the master reported hangup
    master_open: bool,
    control: File,
    frames: FrameReader,
    exited_sent: bool,
    buf: Vec<u8>,
}

impl Session {
    /// Spawn the child and build the engine. `control` is both the command
    /// source and the response sink.
    pub fn start(config: Config, control: File) -> Result<Self> {
        let mut state = State::Starting;
        log::info!("Session {:?}: {:?}", state, config.command);

        if config.driver_wait {
            log::info!("Waiting {:?} for a debugger", DRIVER_WAIT_DELAY);
            thread::sleep(DRIVER_WAIT_DELAY);
        }

        let (cols, rows) = (config.cols(), config.rows());
        let child = Child::spawn(config.program(), config.args(), WindowSize::new(cols, rows))?;
        check_geometry(&child);
        let master = child.master_reader()?;
        let writer = child.master_writer()?;

        let policy = if log::log_enabled!(log::Level::Debug) {
            UnhandledPolicy::uniform(Disposition::Trace)
        } else {
            UnhandledPolicy::default()
        };
        let mut terminal = Terminal::new(
            usize::from(rows),
            usize::from(cols),
            Mirror::new(writer),
            policy,
        );
        terminal.enable_alt_screen(true);
        terminal.reset();

        state = State::Running;
        log::info!("Session {:?}: pid {}", state, child.pid());

        Ok(Self {
            buf: vec![0; config.read_buffer],
            config,
            state,
            child,
            terminal,
            master,
            master_open: true,
            control,
            frames: FrameReader::new(),
            exited_sent: false,
        })
    }

    /// Service both sources until `quit` or the driver goes away
    pub fn run(&mut self) -> Result<()> {
        while self.state == State::Running {
            self.poll_once()?;
        }
        log::info!("Session {:?}", self.state);
        Ok(())
    }

    fn poll_once(&mut self) -> Result<()> {
        let timeout = if self.exited_sent {
            PollTimeout::NONE
        } else {
            PollTimeout::from(self.config.exit_check_ms)
        };

        let (control_ready, master_ready) = {
            let mut fds = vec![PollFd::new(self.control.as_fd(), PollFlags::POLLIN)];
            if self.master_open {
                fds.push(PollFd::new(self.master.as_fd(), PollFlags::POLLIN));
            }
            match poll(&mut fds, timeout) {
                Ok(_) => {}
                Err(Errno::EINTR) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
            let ready = |fd: &PollFd| fd.revents().is_some_and(|r| !r.is_empty());
            (ready(&fds[0]), fds.get(1).is_some_and(ready))
        };

        if master_ready {
            self.read_master()?;
        }
        if control_ready && self.state == State::Running {
            self.read_control()?;
        }
        if self.state == State::Running && !self.exited_sent {
            self.check_child()?;
        }
        Ok(())
    }

    /// Feed one read of child output to the engine
    fn read_master(&mut self) -> Result<()> {
        match self.master.read(&mut self.buf) {
            Ok(0) => self.close_master("end of file"),
            Ok(n) => {
                log::trace!("Child wrote {} bytes", n);
                self.terminal.input_write(&self.buf[..n]);
                return self.flush_bells();
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            // EIO once every holder of the subordinate side has closed it
            Err(e) => self.close_master(&e.to_string()),
        }
        Ok(())
    }

    fn close_master(&mut self, reason: &str) {
        log::debug!("PTY master closed: {}", reason);
        self.master_open = false;
    }

    fn flush_bells(&mut self) -> Result<()> {
        let bells = self.terminal.listener_mut().take_bells();
        for _ in 0..bells {
            if self.state != State::Running {
                break;
            }
            self.respond_or_shutdown(control::BELL)?;
        }
        Ok(())
    }

    fn read_control(&mut self) -> Result<()> {
        let n = match self.control.read(&mut self.buf) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                return Ok(())
            }
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            log::info!("Control channel closed by driver");
            return self.shutdown();
        }

        self.frames.push(&self.buf[..n]);
        while self.state == State::Running {
            let Some(frame) = self.frames.next_frame() else {
                break;
            };
            self.dispatch(&frame)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, frame: &[u8]) -> Result<()> {
        match Command::parse(frame) {
            Ok(Some(command)) => {
                log::debug!("Command {:?}", command);
                self.execute(command)
            }
            Ok(None) => {
                log::debug!("Ignoring frame {:?}", String::from_utf8_lossy(frame));
                Ok(())
            }
            Err(e) => {
                log::warn!("Dropping control frame: {}", e);
                Ok(())
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::CaptureImg => {
                let reverse = self.terminal.listener().state().reverse;
                let json = snapshot::capture_img(&self.terminal, reverse);
                self.respond_or_shutdown(json.as_bytes())
            }
            Command::CaptureAll => {
                let json = snapshot::capture_all(&self.terminal, self.terminal.listener().state());
                self.respond_or_shutdown(json.as_bytes())
            }
            Command::SendToInterior(bytes) => {
                self.terminal.listener_mut().send(&bytes);
                Ok(())
            }
            Command::Reset => {
                self.terminal.reset();
                self.respond_or_shutdown(b"")
            }
            Command::Quit => {
                self.state = State::Terminating;
                log::info!("Session {:?}: quit requested", self.state);
                self.child.terminate()?;
                self.child.wait()?;
                // The driver may already be gone; the session ends either way
                let _ = self.respond(b"");
                self.state = State::Stopped;
                Ok(())
            }
        }
    }

    fn check_child(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            return Ok(());
        }
        self.drain_master()?;
        if self.state != State::Running {
            return Ok(());
        }
        self.exited_sent = true;
        self.respond_or_shutdown(control::EXITED)
    }

    /// Consume output the child wrote before exiting
    fn drain_master(&mut self) -> Result<()> {
        for _ in 0..DRAIN_READS {
            if !self.master_open {
                break;
            }
            let mut fds = [PollFd::new(self.master.as_fd(), PollFlags::POLLIN)];
            let ready = match poll(&mut fds, PollTimeout::ZERO) {
                Ok(_) => fds[0].revents().is_some_and(|r| !r.is_empty()),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            };
            if !ready {
                break;
            }
            self.read_master()?;
        }
        Ok(())
    }

    fn respond(&mut self, payload: &[u8]) -> io::Result<()> {
        control::write_frame(&mut self.control, payload)
    }

    /// Respond, ending the session if the driver can no longer be reached
    fn respond_or_shutdown(&mut self, payload: &[u8]) -> Result<()> {
        match self.respond(payload) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("Control channel write failed: {}", e);
                self.shutdown()
            }
        }
    }

    /// Stop the child and end the session without acknowledging anything
    fn shutdown(&mut self) -> Result<()> {
        self.state = State::Terminating;
        self.child.terminate()?;
        self.child.wait()?;
        self.state = State::Stopped;
        Ok(())
    }
}

/// Compare the geometry the child sees with the one requested
fn check_geometry(child: &Child) {
    let requested = child.pty().size();
    match child.pty().window_size() {
        Ok(actual) if actual == requested => {
            log::debug!("Terminal geometry {}x{}", actual.cols, actual.rows);
        }
        Ok(actual) => log::warn!(
            "Terminal geometry {}x{} differs from requested {}x{}",
            actual.cols,
            actual.rows,
            requested.cols,
            requested.rows
        ),
        Err(e) => log::warn!("Cannot read terminal geometry: {}", e),
    }
}
