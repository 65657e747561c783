//! Test driver for pb integration tests.
//!
//! Runs the built `pb` binary against a scratch store directory (passed
//! via PB_DIR). Stdio is piped by default; the PTY variants make one end
//! a terminal so the implicit copy/paste dispatch, which keys off
//! isatty, can be exercised.

use std::io::{Read, Write};
use std::os::fd::{FromRawFd, IntoRawFd};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use nix::pty::openpty;

/// Locate the pb binary in the workspace target directory.
pub fn pb_binary() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/../target/debug/pb")
}

/// Captured output plus exit code from a completed pb run.
pub struct PbOutput {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl PbOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn assert_ok(&self) {
        assert_eq!(
            self.status, 0,
            "pb failed\nstdout: {}\nstderr: {}",
            self.stdout_text(),
            self.stderr
        );
    }
}

/// Run pb with piped stdio, feeding `input` on stdin.
pub fn run_pb(store: &Path, args: &[&str], input: &[u8]) -> PbOutput {
    let mut child = Command::new(pb_binary())
        .args(args)
        .env("PB_DIR", store)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn pb");

    {
        let mut stdin = child.stdin.take().expect("stdin not piped");
        stdin.write_all(input).expect("failed to write to pb stdin");
        // Dropping the handle closes the pipe so pb sees EOF.
    }

    let output = child.wait_with_output().expect("failed to wait for pb");
    PbOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Run pb with a PTY on stdin (so isatty(0) holds) and piped stdout.
pub fn run_pb_tty_stdin(store: &Path, args: &[&str]) -> PbOutput {
    let pty = openpty(None, None).expect("openpty failed");
    let master_fd = pty.master.into_raw_fd();
    let slave_fd = pty.slave.into_raw_fd();

    let mut cmd = Command::new(pb_binary());
    cmd.args(args)
        .env("PB_DIR", store)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Replace stdin with the PTY slave in the child.
    unsafe {
        cmd.pre_exec(move || {
            if libc::dup2(slave_fd, 0) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            if slave_fd > 2 {
                libc::close(slave_fd);
            }
            Ok(())
        });
    }

    let child = cmd.spawn().expect("failed to spawn pb");
    unsafe {
        libc::close(slave_fd);
    }

    let output = child.wait_with_output().expect("failed to wait for pb");
    unsafe {
        libc::close(master_fd);
    }

    PbOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Run pb with piped stdin and a PTY on stdout (so isatty(1) holds).
/// Whatever pb writes to the terminal comes back as `stdout`.
pub fn run_pb_tty_stdout(store: &Path, args: &[&str], input: &[u8]) -> PbOutput {
    let pty = openpty(None, None).expect("openpty failed");
    let master_fd = pty.master.into_raw_fd();
    let slave_fd = pty.slave.into_raw_fd();

    let mut cmd = Command::new(pb_binary());
    cmd.args(args)
        .env("PB_DIR", store)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    // Replace stdout with the PTY slave in the child.
    unsafe {
        cmd.pre_exec(move || {
            if libc::dup2(slave_fd, 1) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            if slave_fd > 2 {
                libc::close(slave_fd);
            }
            Ok(())
        });
    }

    let mut child = cmd.spawn().expect("failed to spawn pb");
    unsafe {
        libc::close(slave_fd);
    }

    // Drain the PTY master so the child can't block on a full terminal
    // buffer. EIO is expected once the slave side closes.
    let capture = Arc::new(Mutex::new(Vec::new()));
    let drain = Arc::clone(&capture);
    let drain_thread = thread::spawn(move || {
        let mut master = unsafe { std::fs::File::from_raw_fd(master_fd) };
        let mut buf = [0u8; 4096];
        loop {
            match master.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => drain.lock().unwrap().extend_from_slice(&buf[..n]),
                Err(e) => {
                    if e.raw_os_error() != Some(libc::EIO) {
                        eprintln!("pty drain error: {e}");
                    }
                    break;
                }
            }
        }
    });

    {
        let mut stdin = child.stdin.take().expect("stdin not piped");
        stdin.write_all(input).expect("failed to write to pb stdin");
    }

    let output = child.wait_with_output().expect("failed to wait for pb");
    let _ = drain_thread.join();

    let stdout = capture.lock().unwrap().clone();
    PbOutput {
        status: output.status.code().unwrap_or(-1),
        stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
