use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::mem;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr;

use clap::{App, Arg, SubCommand};
use libc::{c_int, c_void};
use nix::errno::Errno;
use tracing::{event, Level};

use glibc_compat64::exports;

use crate::model::{Config, ScenarioFailed, ShimMismatch};
use crate::CARGO_PKG_VERSION;

pub const SUBCOMMAND_NAME: &str = "verify";

pub fn get_subcommand() -> App<'static, 'static> {
    SubCommand::with_name(SUBCOMMAND_NAME)
        .version(CARGO_PKG_VERSION)
        .about("Run each shim and its delegate side by side and compare the results")
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("scratch-dir")
                .long("scratch-dir")
                .value_name("DIR")
                .help("Directory for scratch files, overrides the config")
                .takes_value(true),
        )
}

/// What a call reported: a return value, or a failure with its error number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Value(c_int),
    Failed(Errno),
}

impl Outcome {
    // -1 plus errno
    fn from_fcntl(rv: c_int) -> Outcome {
        if rv == -1 {
            Outcome::Failed(Errno::last())
        } else {
            Outcome::Value(rv)
        }
    }

    // error number as the return value
    fn from_fallocate(rv: c_int) -> Outcome {
        if rv == 0 {
            Outcome::Value(0)
        } else {
            Outcome::Failed(Errno::from_i32(rv))
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Failed(errno) => write!(f, "{:?}", errno),
        }
    }
}

#[derive(Debug)]
pub struct Probe {
    pub scenario: &'static str,
    pub shim: Outcome,
    pub direct: Outcome,
    pub expectation_held: bool,
}

impl Probe {
    pub fn matches(&self) -> bool {
        self.shim == self.direct
    }
}

struct ScratchFile {
    path: PathBuf,
    file: File,
    keep: bool,
}

impl ScratchFile {
    fn create(dir: &Path, name: &str, keep: bool) -> Result<ScratchFile, failure::Error> {
        let path = dir.join(format!("compat64-check-{}-{}", std::process::id(), name));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(ScratchFile { path, file, keep })
    }

    fn len(&self) -> Result<u64, failure::Error> {
        Ok(self.file.metadata()?.len())
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            event!(Level::WARN, path = ?self.path, error = %err, "failed to remove scratch file");
        }
    }
}

fn write_lock() -> libc::flock {
    let mut lock: libc::flock = unsafe { mem::zeroed() };
    lock.l_type = libc::F_WRLCK as libc::c_short;
    lock.l_whence = libc::SEEK_SET as libc::c_short;
    lock
}

/// `F_GETFL` on a read-write descriptor.
pub fn getfl_on_open_file(config: &Config) -> Result<Probe, failure::Error> {
    let scratch = ScratchFile::create(&config.scratch_dir, "getfl", config.keep_scratch)?;
    let fd = scratch.file.as_raw_fd();

    let shim = Outcome::from_fcntl(unsafe { exports::fcntl64(fd, libc::F_GETFL, ptr::null_mut()) });
    let direct = Outcome::from_fcntl(unsafe { libc::fcntl(fd, libc::F_GETFL) });

    let expectation_held = match shim {
        Outcome::Value(flags) => flags & libc::O_ACCMODE == libc::O_RDWR,
        Outcome::Failed(..) => false,
    };

    Ok(Probe {
        scenario: "fcntl64 F_GETFL on read-write file",
        shim,
        direct,
        expectation_held,
    })
}

/// Allocation on a fresh empty file grows it to at least the requested length.
pub fn fallocate_on_empty_file(config: &Config) -> Result<Probe, failure::Error> {
    let len = config.allocation_length;
    let shim_file = ScratchFile::create(&config.scratch_dir, "fallocate-shim", config.keep_scratch)?;
    let direct_file =
        ScratchFile::create(&config.scratch_dir, "fallocate-direct", config.keep_scratch)?;

    let shim = Outcome::from_fallocate(unsafe {
        exports::posix_fallocate64(shim_file.file.as_raw_fd(), 0, len)
    });
    let direct = Outcome::from_fallocate(unsafe {
        libc::posix_fallocate(direct_file.file.as_raw_fd(), 0, len as libc::off_t)
    });

    let shim_len = shim_file.len()?;
    let direct_len = direct_file.len()?;
    event!(
        Level::DEBUG,
        shim_len = shim_len,
        direct_len = direct_len,
        requested = len
    );

    Ok(Probe {
        scenario: "posix_fallocate64 on empty file",
        shim,
        direct,
        expectation_held: shim == Outcome::Value(0)
            && len as u64 <= shim_len
            && shim_len == direct_len,
    })
}

/// `F_SETLK` on a descriptor that is not open.
pub fn setlk_on_bad_fd(config: &Config) -> Result<Probe, failure::Error> {
    let lock = write_lock();
    let arg = &lock as *const libc::flock as *mut c_void;

    let shim = Outcome::from_fcntl(unsafe { exports::fcntl64(config.invalid_fd, libc::F_SETLK, arg) });
    let direct = Outcome::from_fcntl(unsafe {
        libc::fcntl(config.invalid_fd, libc::F_SETLK, &lock as *const libc::flock)
    });

    Ok(Probe {
        scenario: "fcntl64 F_SETLK on bad descriptor",
        shim,
        direct,
        expectation_held: shim == Outcome::Failed(Errno::EBADF),
    })
}

/// Allocation on a descriptor that is not open.
pub fn fallocate_on_bad_fd(config: &Config) -> Result<Probe, failure::Error> {
    let shim = Outcome::from_fallocate(unsafe { exports::posix_fallocate64(config.invalid_fd, 0, 1) });
    let direct = Outcome::from_fallocate(unsafe { libc::posix_fallocate(config.invalid_fd, 0, 1) });

    Ok(Probe {
        scenario: "posix_fallocate64 on bad descriptor",
        shim,
        direct,
        expectation_held: match shim {
            Outcome::Failed(..) => true,
            Outcome::Value(..) => false,
        },
    })
}

pub fn run_all(config: &Config) -> Result<Vec<Probe>, failure::Error> {
    Ok(vec![
        getfl_on_open_file(config)?,
        fallocate_on_empty_file(config)?,
        setlk_on_bad_fd(config)?,
        fallocate_on_bad_fd(config)?,
    ])
}

pub fn main(matches: &clap::ArgMatches) -> Result<(), failure::Error> {
    let mut config = match matches.value_of_os("config") {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    if let Some(dir) = matches.value_of_os("scratch-dir") {
        config.scratch_dir = Path::new(dir).to_owned();
    }
    event!(Level::DEBUG, config = ?config);

    let probes = run_all(&config)?;

    let mut first_failure: Option<failure::Error> = None;
    for probe in &probes {
        println!(
            "{:<40} shim={:<10} direct={:<10} {}",
            probe.scenario,
            probe.shim.to_string(),
            probe.direct.to_string(),
            if probe.matches() && probe.expectation_held {
                "ok"
            } else {
                "FAIL"
            },
        );

        event!(
            Level::INFO,
            scenario = probe.scenario,
            shim = %probe.shim,
            direct = %probe.direct,
            matches = probe.matches(),
            expectation_held = probe.expectation_held
        );

        if first_failure.is_some() {
            continue;
        }
        if !probe.matches() {
            event!(Level::ERROR, scenario = probe.scenario, "shim and delegate disagree");
            first_failure = Some(ShimMismatch { scenario: probe.scenario }.into());
        } else if !probe.expectation_held {
            event!(Level::ERROR, scenario = probe.scenario, "unexpected outcome");
            first_failure = Some(ScenarioFailed { scenario: probe.scenario }.into());
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
