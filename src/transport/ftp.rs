//! FTP transport backed by `suppaftp`
//!
//! Plain (unencrypted) FTP with MLSD listings, UTF-8 paths and MFMT for
//! stamping uploads. FTP answers most rejections with a generic 550, so
//! after a failed command the transport lists the parent directory to tell
//! "already exists"/"not found" apart from a real rejection.

use crate::config::TargetConfig;
use crate::error::{RemoteError, SyncError};
use crate::transport::mlsd;
use crate::transport::RemoteTransport;
use crate::tree::node::{EntryKind, ListedEntry};
use chrono::{DateTime, Utc};
use std::net::ToSocketAddrs;
use std::time::{Duration, SystemTime};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};
use tracing::{debug, info, warn};

/// What a probe of a remote path found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Absent,
    Present(EntryKind),
    Unknown,
}

/// Authenticated FTP session, closed with `QUIT` on drop.
pub struct FtpTransport {
    stream: FtpStream,
}

impl FtpTransport {
    /// Connect, authenticate and switch to binary transfers.
    pub fn connect(target: &TargetConfig) -> Result<Self, SyncError> {
        let address = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|e| SyncError::Connection(format!("{}: {}", target.host, e)))?
            .next()
            .ok_or_else(|| {
                SyncError::Connection(format!("{}: no address resolved", target.host))
            })?;

        let timeout = Duration::from_secs(target.connect_timeout_secs);
        let mut stream = FtpStream::connect_timeout(address, timeout)
            .map_err(|e| SyncError::Connection(format!("{}: {}", address, e)))?;

        if let Some(welcome) = stream.get_welcome_msg() {
            info!(greeting = %welcome.trim(), "Greeting from target");
        }

        stream
            .login(target.user.as_str(), target.password.as_str())
            .map_err(|e| SyncError::Connection(format!("login as '{}' failed: {}", target.user, e)))?;
        // Non-ASCII names need UTF-8 on servers that do not default to it
        let utf8 = stream.custom_command(
            "OPTS UTF8 ON",
            &[Status::CommandOk, Status::CommandNotImplemented],
        );
        match utf8 {
            Ok(_) => debug!("UTF-8 paths enabled"),
            Err(e) => warn!(
                error = %e,
                "Server refused OPTS UTF8 ON; non-ASCII names may be garbled"
            ),
        }
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| SyncError::Connection(format!("cannot switch to binary mode: {}", e)))?;

        info!(address = %address, user = %target.user, "Authenticated");
        Ok(Self { stream })
    }

    fn list_raw(&mut self, path: &str) -> Result<Vec<ListedEntry>, FtpError> {
        let pathname = if path.is_empty() { None } else { Some(path) };
        let lines = self.stream.mlsd(pathname)?;
        Ok(lines.iter().filter_map(|line| mlsd::parse_line(line)).collect())
    }

    /// Look up `path` in its parent's listing
    fn probe(&mut self, path: &str) -> Probe {
        let (parent, name) = match path.rfind('/') {
            Some(0) => ("/", &path[1..]),
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => ("", path),
        };
        match self.list_raw(parent) {
            Ok(entries) => entries
                .into_iter()
                .find(|entry| entry.name == name)
                .map(|entry| Probe::Present(entry.kind))
                .unwrap_or(Probe::Absent),
            Err(e) => {
                debug!(path = %path, error = %e, "Probe listing failed");
                Probe::Unknown
            }
        }
    }

    fn rejected(path: &str, err: FtpError) -> RemoteError {
        match err {
            FtpError::ConnectionError(io) => RemoteError::Connection(io.to_string()),
            other => RemoteError::Rejected {
                path: path.to_string(),
                message: other.to_string().trim().to_string(),
            },
        }
    }

    /// Classify a failed removal: an absent target is reported as `NotFound`.
    fn removal_error(&mut self, path: &str, err: FtpError) -> RemoteError {
        if matches!(err, FtpError::ConnectionError(_)) {
            return Self::rejected(path, err);
        }
        match self.probe(path) {
            Probe::Absent => RemoteError::NotFound(path.to_string()),
            _ => Self::rejected(path, err),
        }
    }
}

impl RemoteTransport for FtpTransport {
    fn list_directory(&mut self, path: &str) -> Result<Vec<ListedEntry>, RemoteError> {
        debug!(path = %path, "MLSD");
        self.list_raw(path).map_err(|e| Self::rejected(path, e))
    }

    fn write_file(&mut self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        debug!(path = %path, bytes = content.len(), "STOR");
        let mut reader = content;
        self.stream
            .put_file(path, &mut reader)
            .map(|_| ())
            .map_err(|e| Self::rejected(path, e))
    }

    fn set_modified_time(&mut self, path: &str, modified: SystemTime) -> Result<(), RemoteError> {
        let stamp = mfmt_timestamp(modified);
        debug!(path = %path, stamp = %stamp, "MFMT");
        self.stream
            .custom_command(format!("MFMT {} {}", stamp, path), &[Status::File])
            .map(|_| ())
            .map_err(|e| Self::rejected(path, e))
    }

    fn make_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "MKD");
        match self.stream.mkdir(path) {
            Ok(()) => Ok(()),
            Err(FtpError::ConnectionError(io)) => Err(RemoteError::Connection(io.to_string())),
            Err(err) => match self.probe(path) {
                Probe::Present(EntryKind::Directory) => {
                    Err(RemoteError::AlreadyExists(path.to_string()))
                }
                _ => Err(Self::rejected(path, err)),
            },
        }
    }

    fn remove_file(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "DELE");
        match self.stream.rm(path) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.removal_error(path, err)),
        }
    }

    fn remove_directory(&mut self, path: &str) -> Result<(), RemoteError> {
        debug!(path = %path, "RMD");
        match self.stream.rmdir(path) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.removal_error(path, err)),
        }
    }
}

/// `YYYYMMDDHHMMSS` in UTC, the MFMT argument format
fn mfmt_timestamp(modified: SystemTime) -> String {
    DateTime::<Utc>::from(modified)
        .format("%Y%m%d%H%M%S")
        .to_string()
}

impl Drop for FtpTransport {
    fn drop(&mut self) {
        if let Err(e) = self.stream.quit() {
            warn!(error = %e, "QUIT failed");
        }
    }
}
