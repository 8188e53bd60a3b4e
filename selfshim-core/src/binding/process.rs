//! Process-backed binding
//!
//! Runs the managed instance as a detached child process and keeps a small
//! JSON instance record on disk, so a later invocation of the shim can query
//! and stop the process an earlier one started.

use std::fs;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::binding::NativeBinding;
use crate::config::BindingSettings;
use crate::error::BindingError;

/// Status returned by `start`/`stop` when nothing was done
const NOT_DONE: i32 = 1;

/// Interval between liveness checks while waiting for a stop
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the binding remembers about the instance it launched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub pid: i32,
    pub started_at: DateTime<Utc>,
    pub args: Vec<String>,
    /// Kernel start time of `pid` (seconds since epoch), used to detect pid reuse
    #[serde(default)]
    pub process_start: Option<u64>,
}

/// Binding that spawns the managed instance as an executable
pub struct ProcessBinding {
    executable: PathBuf,
    state_file: PathBuf,
    stop_grace: Duration,
    child: Option<Child>,
}

impl ProcessBinding {
    /// Create a binding for an already resolved executable
    pub fn new(executable: PathBuf, state_file: PathBuf) -> Self {
        Self {
            executable,
            state_file,
            stop_grace: Duration::from_secs(2),
            child: None,
        }
    }

    /// Time allowed between SIGTERM and SIGKILL
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Build a binding from configuration
    ///
    /// The instance record path is taken from `SELFSHIM_STATE_FILE`, then the
    /// configured `state_file`, then [`get_default_state_file`].
    pub fn from_settings(settings: &BindingSettings) -> Result<Self, BindingError> {
        let executable = resolve_executable(&settings.executable)?;

        let state_file = std::env::var("SELFSHIM_STATE_FILE")
            .map(PathBuf::from)
            .ok()
            .or_else(|| settings.state_file.clone())
            .unwrap_or_else(get_default_state_file);

        debug!(
            "Process binding: executable={}, state_file={}",
            executable.display(),
            state_file.display()
        );

        Ok(Self::new(executable, state_file).with_stop_grace(settings.stop_grace()))
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Read the instance record, discarding it if unreadable
    pub fn read_record(&self) -> Option<InstanceRecord> {
        let contents = match fs::read_to_string(&self.state_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(
                    "Failed to read instance record {}: {}",
                    self.state_file.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Discarding corrupt instance record {}: {}",
                    self.state_file.display(),
                    e
                );
                self.remove_record();
                None
            }
        }
    }

    fn write_record(&self, record: &InstanceRecord) -> Result<(), BindingError> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent).map_err(|e| BindingError::StateFile {
                reason: format!("Failed to create {}: {}", parent.display(), e),
            })?;
        }

        let contents =
            serde_json::to_string_pretty(record).map_err(|e| BindingError::StateFile {
                reason: format!("Failed to serialize instance record: {}", e),
            })?;

        fs::write(&self.state_file, contents).map_err(|e| BindingError::StateFile {
            reason: format!("Failed to write {}: {}", self.state_file.display(), e),
        })
    }

    fn remove_record(&self) {
        let _ = fs::remove_file(&self.state_file);
    }

    /// Whether `pid` still refers to a live process
    ///
    /// An owned child is reaped here so it does not linger as a zombie.
    fn process_alive(&mut self, pid: i32) -> bool {
        let owned_exit = match self.child.as_mut() {
            Some(child) if child.id() as i32 == pid => match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("Managed process {} exited with {}", pid, status);
                    Some(true)
                }
                Ok(None) => Some(false),
                Err(e) => {
                    warn!("Failed to poll managed process {}: {}", pid, e);
                    None
                }
            },
            _ => None,
        };

        match owned_exit {
            Some(true) => {
                self.child = None;
                return false;
            }
            Some(false) => return true,
            None => {}
        }

        match signal::kill(Pid::from_raw(pid), None) {
            Ok(()) => true,
            Err(nix::errno::Errno::ESRCH) => false,
            // Exists but belongs to someone else
            Err(nix::errno::Errno::EPERM) => true,
            Err(e) => {
                warn!("Error checking process {} status: {}", pid, e);
                true
            }
        }
    }

    /// Whether the live process at `record.pid` is the one that was recorded
    ///
    /// Records without a start time can only be matched on pid.
    fn record_matches(&self, record: &InstanceRecord) -> bool {
        if let Some(child) = self.child.as_ref() {
            if child.id() as i32 == record.pid {
                return true;
            }
        }

        match record.process_start {
            Some(expected) => process_start_time(record.pid) == Some(expected),
            None => true,
        }
    }

    fn spawn(&self, args: &[String]) -> Result<Child, BindingError> {
        let (arg0, rest) = args.split_first().ok_or(BindingError::InvalidArgument {
            reason: "launch configuration is empty".to_string(),
        })?;

        Command::new(&self.executable)
            .arg0(arg0)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // Own process group so terminal signals aimed at the shim miss it
            .process_group(0)
            .spawn()
            .map_err(|e| BindingError::SpawnFailed {
                reason: format!("{}: {}", self.executable.display(), e),
            })
    }

    fn wait_for_exit(&mut self, pid: i32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.process_alive(pid) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(STOP_POLL_INTERVAL);
        }
    }
}

impl NativeBinding for ProcessBinding {
    fn is_running(&mut self) -> i32 {
        let Some(record) = self.read_record() else {
            return 0;
        };

        if !self.process_alive(record.pid) {
            debug!("Removing stale instance record for pid {}", record.pid);
            self.remove_record();
            return 0;
        }

        if !self.record_matches(&record) {
            warn!(
                "Pid {} now belongs to another process, discarding instance record",
                record.pid
            );
            self.remove_record();
            return 0;
        }

        1
    }

    fn start(&mut self, args: &[String]) -> i32 {
        if self.is_running() != 0 {
            warn!("Managed instance already running, refusing second start");
            return NOT_DONE;
        }

        let mut child = match self.spawn(args) {
            Ok(child) => child,
            Err(e) => {
                warn!("{}", e);
                return NOT_DONE;
            }
        };

        let pid = child.id() as i32;
        let record = InstanceRecord {
            pid,
            started_at: Utc::now(),
            args: args.to_vec(),
            process_start: process_start_time(pid),
        };

        if let Err(e) = self.write_record(&record) {
            // Without a record nothing could stop it later
            warn!("{}, terminating untracked process {}", e, record.pid);
            let _ = child.kill();
            let _ = child.wait();
            return NOT_DONE;
        }

        info!(
            "Started {} as pid {}",
            self.executable.display(),
            record.pid
        );
        self.child = Some(child);
        0
    }

    fn stop(&mut self) -> i32 {
        let pid = match self.read_record() {
            Some(record) => {
                if self.process_alive(record.pid) && !self.record_matches(&record) {
                    warn!(
                        "Pid {} now belongs to another process, not signalling it",
                        record.pid
                    );
                    self.remove_record();
                    return NOT_DONE;
                }
                record.pid
            }
            None => match self.child.as_ref() {
                Some(child) => child.id() as i32,
                None => {
                    debug!("No managed instance to stop");
                    return NOT_DONE;
                }
            },
        };

        let pid_obj = Pid::from_raw(pid);

        debug!("Sending SIGTERM to process {}", pid);
        match signal::kill(pid_obj, Signal::SIGTERM) {
            Ok(()) => {
                if !self.wait_for_exit(pid, self.stop_grace) {
                    warn!(
                        "Process {} did not respond to SIGTERM, sending SIGKILL",
                        pid
                    );
                    if let Err(e) = signal::kill(pid_obj, Signal::SIGKILL) {
                        if e != nix::errno::Errno::ESRCH {
                            warn!("Failed to send SIGKILL to process {}: {}", pid, e);
                        }
                    }
                }
            }
            Err(nix::errno::Errno::ESRCH) => {
                debug!("Process {} already terminated", pid);
            }
            Err(e) => {
                warn!("Failed to send SIGTERM to process {}: {}", pid, e);
            }
        }

        if let Some(mut child) = self.child.take() {
            if child.id() as i32 == pid {
                let _ = child.wait();
            } else {
                self.child = Some(child);
            }
        }

        self.remove_record();
        info!("Stopped managed process {}", pid);
        0
    }
}

/// Kernel start time of a process, in seconds since the epoch
pub fn process_start_time(pid: i32) -> Option<u64> {
    let pid = sysinfo::Pid::from_u32(u32::try_from(pid).ok()?);
    let mut system = sysinfo::System::new();
    if !system.refresh_process(pid) {
        return None;
    }
    system.process(pid).map(|process| process.start_time())
}

/// Resolve the executable to spawn
///
/// Paths are checked for existence; bare names are looked up on `PATH`.
pub fn resolve_executable(executable: &str) -> Result<PathBuf, BindingError> {
    let path = Path::new(executable);
    if path.components().count() > 1 {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(BindingError::ExecutableNotFound {
            name: executable.to_string(),
        });
    }

    which::which(executable).map_err(|_| BindingError::ExecutableNotFound {
        name: executable.to_string(),
    })
}

/// Get the default instance record path
pub fn get_default_state_file() -> PathBuf {
    // Use XDG_RUNTIME_DIR if available, otherwise /tmp
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        Path::new(&runtime_dir).join("selfshim.json")
    } else {
        Path::new("/tmp").join(format!("selfshim-{}.json", nix::unistd::getuid()))
    }
}
