use std::fmt;
use std::os::unix::io::{AsRawFd, RawFd};

use libc::{c_int, c_void, flock};
use nix::errno::Errno;
use tracing::{event, Level};

use crate::exports;

/// A `fcntl` command together with its correctly typed argument.
///
/// Each variant carries exactly what its command reads or writes, so callers
/// never go through the untyped third slot themselves.
pub enum FcntlArg<'a> {
    DupFd(RawFd),
    DupFdCloexec(RawFd),
    GetFd,
    SetFd(c_int),
    GetFl,
    SetFl(c_int),
    GetLk(&'a mut flock),
    SetLk(&'a flock),
    SetLkw(&'a flock),
}

impl<'a> FcntlArg<'a> {
    pub fn command(&self) -> c_int {
        match *self {
            FcntlArg::DupFd(..) => libc::F_DUPFD,
            FcntlArg::DupFdCloexec(..) => libc::F_DUPFD_CLOEXEC,
            FcntlArg::GetFd => libc::F_GETFD,
            FcntlArg::SetFd(..) => libc::F_SETFD,
            FcntlArg::GetFl => libc::F_GETFL,
            FcntlArg::SetFl(..) => libc::F_SETFL,
            FcntlArg::GetLk(..) => libc::F_GETLK,
            FcntlArg::SetLk(..) => libc::F_SETLK,
            FcntlArg::SetLkw(..) => libc::F_SETLKW,
        }
    }

    fn name(&self) -> &'static str {
        match *self {
            FcntlArg::DupFd(..) => "F_DUPFD",
            FcntlArg::DupFdCloexec(..) => "F_DUPFD_CLOEXEC",
            FcntlArg::GetFd => "F_GETFD",
            FcntlArg::SetFd(..) => "F_SETFD",
            FcntlArg::GetFl => "F_GETFL",
            FcntlArg::SetFl(..) => "F_SETFL",
            FcntlArg::GetLk(..) => "F_GETLK",
            FcntlArg::SetLk(..) => "F_SETLK",
            FcntlArg::SetLkw(..) => "F_SETLKW",
        }
    }

    // The value placed in the variadic slot. Integer arguments are widened
    // to pointer width, which is how they are passed variadically anyway.
    fn into_raw(self) -> *mut c_void {
        match self {
            FcntlArg::DupFd(fd) | FcntlArg::DupFdCloexec(fd) => fd as isize as *mut c_void,
            FcntlArg::SetFd(flags) | FcntlArg::SetFl(flags) => flags as isize as *mut c_void,
            FcntlArg::GetFd | FcntlArg::GetFl => std::ptr::null_mut(),
            FcntlArg::GetLk(lock) => lock as *mut flock as *mut c_void,
            FcntlArg::SetLk(lock) | FcntlArg::SetLkw(lock) => {
                lock as *const flock as *mut c_void
            }
        }
    }
}

impl<'a> fmt::Display for FcntlArg<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FcntlArg::DupFd(v) | FcntlArg::DupFdCloexec(v) => write!(f, "{}({})", self.name(), v),
            FcntlArg::SetFd(v) | FcntlArg::SetFl(v) => write!(f, "{}({:#x})", self.name(), v),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Runs `arg` against `fd` through the exported `fcntl64` stub.
pub fn fcntl<F: AsRawFd>(fd: &F, arg: FcntlArg) -> Result<c_int, nix::Error> {
    fcntl_raw(fd.as_raw_fd(), arg)
}

/// Like [`fcntl`], for a descriptor that may not be backed by an open file.
pub fn fcntl_raw(fd: RawFd, arg: FcntlArg) -> Result<c_int, nix::Error> {
    let cmd = arg.command();
    let name = arg.name();
    // the borrow inside `arg` outlives the call, so the pointer stays valid
    let rv = unsafe { exports::fcntl64(fd, cmd, arg.into_raw()) };
    if rv == -1 {
        let errno = Errno::last();
        event!(Level::TRACE, fd = fd, command = name, errno = ?errno, "fcntl64 failed");
        return Err(nix::Error::Sys(errno));
    }
    Ok(rv)
}

#[cfg(test)]
mod tests {
    use super::{fcntl, fcntl_raw, FcntlArg};
    use std::fs::{self, File, OpenOptions};
    use std::mem;
    use std::os::unix::io::{AsRawFd, FromRawFd};
    use std::path::PathBuf;

    use nix::errno::Errno;

    fn scratch(name: &str) -> (PathBuf, File) {
        let path = std::env::temp_dir().join(format!("glibc-compat64-fcntl-{}", name));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        (path, file)
    }

    fn write_lock() -> libc::flock {
        let mut lock: libc::flock = unsafe { mem::zeroed() };
        lock.l_type = libc::F_WRLCK as libc::c_short;
        lock.l_whence = libc::SEEK_SET as libc::c_short;
        lock.l_start = 0;
        lock.l_len = 0;
        lock
    }

    #[test]
    fn getfl_matches_direct_call() {
        let (path, file) = scratch("getfl");

        let shimmed = fcntl(&file, FcntlArg::GetFl).unwrap();
        let direct = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFL) };
        assert_eq!(shimmed, direct);
        assert_eq!(shimmed & libc::O_ACCMODE, libc::O_RDWR);

        drop(file);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn setfl_round_trips_nonblock() {
        let (path, file) = scratch("setfl");

        let flags = fcntl(&file, FcntlArg::GetFl).unwrap();
        fcntl(&file, FcntlArg::SetFl(flags | libc::O_NONBLOCK)).unwrap();
        let flags = fcntl(&file, FcntlArg::GetFl).unwrap();
        assert_ne!(flags & libc::O_NONBLOCK, 0);

        drop(file);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn dupfd_cloexec_respects_minimum() {
        let (path, file) = scratch("dupfd");

        let dup = fcntl(&file, FcntlArg::DupFdCloexec(100)).unwrap();
        assert!(dup >= 100);
        let dup = unsafe { File::from_raw_fd(dup) };
        let fd_flags = fcntl(&dup, FcntlArg::GetFd).unwrap();
        assert_ne!(fd_flags & libc::FD_CLOEXEC, 0);

        drop(dup);
        drop(file);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn setlk_on_bad_fd_is_ebadf() {
        let lock = write_lock();
        let shimmed = fcntl_raw(-1, FcntlArg::SetLk(&lock));
        assert_eq!(shimmed, Err(nix::Error::Sys(Errno::EBADF)));

        let direct = unsafe { libc::fcntl(-1, libc::F_SETLK, &lock as *const libc::flock) };
        assert_eq!(direct, -1);
        assert_eq!(Errno::last(), Errno::EBADF);
    }

    #[test]
    fn getlk_reports_unlocked_range() {
        let (path, file) = scratch("getlk");

        let mut lock = write_lock();
        fcntl(&file, FcntlArg::GetLk(&mut lock)).unwrap();
        // no other process holds a lock on a file we just created
        assert_eq!(lock.l_type, libc::F_UNLCK as libc::c_short);

        drop(file);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn setlk_then_unlock() {
        let (path, file) = scratch("setlk");

        let mut lock = write_lock();
        assert_eq!(fcntl(&file, FcntlArg::SetLk(&lock)).unwrap(), 0);
        lock.l_type = libc::F_UNLCK as libc::c_short;
        assert_eq!(fcntl(&file, FcntlArg::SetLk(&lock)).unwrap(), 0);

        drop(file);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn display_names_commands() {
        assert_eq!(FcntlArg::GetFl.to_string(), "F_GETFL");
        assert_eq!(FcntlArg::SetFd(1).to_string(), "F_SETFD(0x1)");
        assert_eq!(FcntlArg::DupFd(3).to_string(), "F_DUPFD(3)");
        let lock = write_lock();
        assert_eq!(FcntlArg::SetLkw(&lock).to_string(), "F_SETLKW");
    }
}
