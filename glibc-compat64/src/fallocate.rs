use std::os::unix::io::{AsRawFd, RawFd};

use nix::errno::Errno;
use tracing::{event, Level};

use crate::exports;

/// Reserves `len` bytes at `offset` in `fd` through the exported
/// `posix_fallocate64` stub. The file grows if `offset + len` is past its end.
pub fn posix_fallocate<F: AsRawFd>(fd: &mut F, offset: i64, len: i64) -> Result<(), nix::Error> {
    posix_fallocate_raw(fd.as_raw_fd(), offset, len)
}

pub fn posix_fallocate_raw(fd: RawFd, offset: i64, len: i64) -> Result<(), nix::Error> {
    let rv = unsafe { exports::posix_fallocate64(fd, offset, len) };
    match rv {
        0 => Ok(()),
        // the error number comes back as the return value, not through errno
        _ => {
            let errno = Errno::from_i32(rv);
            event!(
                Level::TRACE,
                fd = fd,
                offset = offset,
                len = len,
                errno = ?errno,
                "posix_fallocate64 failed"
            );
            Err(nix::Error::Sys(errno))
        }
    }
}
