//! The C ABI entry points.
//!
//! A glibc-linked binary references `fcntl64` and `posix_fallocate64`; musl
//! only provides `fcntl` and `posix_fallocate`, whose `off_t` is already 64
//! bits wide. Both stubs hand their arguments to the musl call untouched and
//! return its result untouched.
//!
//! The symbols are only emitted unmangled on musl (or with the
//! `force-export` feature). On a glibc host they stay ordinary Rust-callable
//! functions so we never interpose the host libc's own definitions.

use libc::{c_int, c_void, off_t};

use crate::ffi;

/// `int fcntl64(int fd, int cmd, ...)`
///
/// Stable Rust cannot define a C-variadic function, so the optional argument
/// is taken as a fixed pointer-width parameter. Every calling convention musl
/// supports passes the first variadic integer or pointer argument in the same
/// register or stack slot as a named one, so `arg` holds exactly what
/// `va_arg(ap, void *)` would yield. For commands without an argument the
/// value is unspecified and `fcntl` ignores it.
///
/// # Safety
///
/// `arg` must be valid for whatever `cmd` requires of it (for example a
/// `struct flock *` for `F_SETLK`).
#[cfg_attr(any(target_env = "musl", feature = "force-export"), no_mangle)]
pub unsafe extern "C" fn fcntl64(fd: c_int, cmd: c_int, arg: *mut c_void) -> c_int {
    ffi::fcntl(fd, cmd, arg)
}

/// `int posix_fallocate64(int fd, off64_t offset, off64_t len)`
///
/// Returns 0 or an error number; `errno` is not involved.
///
/// # Safety
///
/// Same contract as `posix_fallocate`: `fd` is only read, never owned.
#[cfg_attr(any(target_env = "musl", feature = "force-export"), no_mangle)]
pub unsafe extern "C" fn posix_fallocate64(fd: c_int, offset: i64, len: i64) -> c_int {
    // identity on musl, where off_t is i64 on every target
    ffi::posix_fallocate(fd, offset as off_t, len as off_t)
}

/// Whether this build emits `fcntl64` and `posix_fallocate64` as unmangled
/// symbols.
pub fn symbols_exported() -> bool {
    cfg!(any(target_env = "musl", feature = "force-export"))
}
