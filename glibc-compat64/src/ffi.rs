use libc::{c_int, off_t};

// musl implements the large-file behavior under the unsuffixed names.
#[link(name = "c")]
extern "C" {
    // int fcntl(int fd, int cmd, ... /* arg */);
    pub fn fcntl(fd: c_int, cmd: c_int, ...) -> c_int;

    // int posix_fallocate(int fd, off_t offset, off_t len);
    pub fn posix_fallocate(fd: c_int, offset: off_t, len: off_t) -> c_int;
}
