use clap::{App, SubCommand};

use glibc_compat64::{symbols_exported, SYMBOLS};

use crate::CARGO_PKG_VERSION;

pub const SUBCOMMAND_NAME: &str = "symbols";

pub fn get_subcommand() -> App<'static, 'static> {
    SubCommand::with_name(SUBCOMMAND_NAME)
        .version(CARGO_PKG_VERSION)
        .about("List the shimmed symbols and their delegates")
}

pub fn main(_matches: &clap::ArgMatches) -> Result<(), failure::Error> {
    let exported = if symbols_exported() {
        "exported"
    } else {
        "not exported (glibc host build)"
    };
    for sym in SYMBOLS {
        println!("{:<20} -> {:<16} {}", sym.name, sym.delegate, exported);
        println!("    {}", sym.signature);
    }
    Ok(())
}
