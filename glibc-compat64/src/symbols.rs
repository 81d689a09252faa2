/// An exported symbol and the musl function it forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShimSymbol {
    pub name: &'static str,
    pub delegate: &'static str,
    pub signature: &'static str,
}

pub const FCNTL64: ShimSymbol = ShimSymbol {
    name: "fcntl64",
    delegate: "fcntl",
    signature: "int fcntl64(int fd, int cmd, ...)",
};

pub const POSIX_FALLOCATE64: ShimSymbol = ShimSymbol {
    name: "posix_fallocate64",
    delegate: "posix_fallocate",
    signature: "int posix_fallocate64(int fd, off64_t offset, off64_t len)",
};

pub static SYMBOLS: &[ShimSymbol] = &[FCNTL64, POSIX_FALLOCATE64];

pub fn find(name: &str) -> Option<&'static ShimSymbol> {
    SYMBOLS.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::{find, SYMBOLS};

    #[test]
    fn delegates_are_unsuffixed() {
        for sym in SYMBOLS {
            assert_eq!(format!("{}64", sym.delegate), sym.name);
            assert!(sym.signature.starts_with(&format!("int {}(", sym.name)));
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(find("fcntl64").map(|s| s.delegate), Some("fcntl"));
        assert!(find("open64").is_none());
    }
}
