use std::fs::OpenOptions;
use std::path::Path;

use clap::{App, Arg, SubCommand};
use tracing::{event, Level};

use crate::CARGO_PKG_VERSION;

pub const SUBCOMMAND_NAME: &str = "fallocate";

pub fn get_subcommand() -> App<'static, 'static> {
    SubCommand::with_name(SUBCOMMAND_NAME)
        .version(CARGO_PKG_VERSION)
        .about("Preallocate a byte range of a file through posix_fallocate64")
        .arg(
            Arg::with_name("file")
                .long("file")
                .value_name("FILE")
                .help("The file to allocate into, created if missing")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("offset")
                .long("offset")
                .value_name("BYTES")
                .help("Start of the range")
                .default_value("0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("length")
                .long("length")
                .value_name("BYTES")
                .help("Length of the range")
                .required(true)
                .takes_value(true),
        )
}

fn parse_bytes(matches: &clap::ArgMatches, name: &str) -> Result<i64, failure::Error> {
    let value = matches.value_of(name).unwrap();
    value
        .parse::<i64>()
        .map_err(|err| failure::format_err!("bad --{} {:?}: {}", name, value, err))
}

pub fn main(matches: &clap::ArgMatches) -> Result<(), failure::Error> {
    let target = matches.value_of_os("file").unwrap();
    let target = Path::new(target).to_owned();
    let offset = parse_bytes(matches, "offset")?;
    let length = parse_bytes(matches, "length")?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(&target)?;

    glibc_compat64::posix_fallocate(&mut file, offset, length)?;

    let size = file.metadata()?.len();
    event!(
        Level::INFO,
        path = ?target,
        offset = offset,
        length = length,
        size = size,
        "allocated"
    );
    println!("{}: {} bytes", target.display(), size);

    Ok(())
}
