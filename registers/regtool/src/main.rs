// Licensed under the Apache-2.0 license

mod demo;
mod render;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use registers_namespace::{AliasMode, DirentId, Namespace, Value};
use simple_logger::SimpleLogger;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(
    name = "regtool",
    author,
    version,
    about = "Browse and poke a register namespace over a simulated register space"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Byte pattern read back from register addresses never written
    #[arg(
        long,
        value_name = "BYTE",
        default_value = "0",
        value_parser = parse_fill,
        global = true
    )]
    fill: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every register and field under PATH
    Dump {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the rendered value of a register or field
    Read { path: String },
    /// Write VALUE (datatype text for fields, a numeral for registers) and
    /// print the result
    Write { path: String, value: String },
    /// Print the canonical form of PATH
    Resolve { path: String },
    /// List the immediate children of a scope
    List {
        #[arg(default_value = "/")]
        path: String,
    },
}

fn parse_fill(text: &str) -> Result<u8> {
    let value = Value::parse(text)?;
    value
        .to_u64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| anyhow!("fill byte {text} does not fit in 8 bits"))
}

fn find(ns: &Namespace, path: &str, mode: AliasMode) -> Result<DirentId> {
    ns.lookup_str(ns.root(), path, mode)?
        .ok_or_else(|| anyhow!("{path}: not found"))
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let ns = demo::build(cli.fill)?;
    debug!("demo namespace built with fill 0x{:02x}", cli.fill);

    match cli.command {
        Command::Dump { path } => {
            let id = find(&ns, &path, AliasMode::Follow)?;
            render::dump(&ns, id, out)?;
        }
        Command::Read { path } => {
            let id = find(&ns, &path, AliasMode::Follow)?;
            writeln!(out, "{}", ns.evaluate(id)?)?;
        }
        Command::Write { path, value } => {
            let id = find(&ns, &path, AliasMode::Follow)?;
            ns.write_str(id, &value)?;
            writeln!(out, "{}", ns.evaluate(id)?)?;
        }
        Command::Resolve { path } => match ns.resolve_str(ns.root(), &path)? {
            Some(mut resolved) => {
                resolved.set_absolute(true);
                writeln!(out, "{resolved}")?;
            }
            None => bail!("{path}: not found"),
        },
        Command::List { path } => {
            let id = find(&ns, &path, AliasMode::Follow)?;
            render::list(&ns, id, out)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("regtool").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_read_and_write() {
        let vendor = run_args(&["read", "pci/dev[0]/vendor"]).unwrap();
        assert_eq!(vendor, "0x8086\n");
        let bus_master = run_args(&["write", "gpu/bus_master", "no"]).unwrap();
        assert_eq!(bus_master, "no\n");
        let command = run_args(&["write", "pci/dev[1]/%command", "0x7"]).unwrap();
        assert_eq!(command, "0x0007\n");
        assert!(run_args(&["read", "pci/nothing"]).is_err());
        assert!(run_args(&["write", "pci/dev[0]/class", "toaster"]).is_err());
    }

    #[test]
    fn test_resolve() {
        let status = run_args(&["resolve", "gpu/%status"]).unwrap();
        assert_eq!(status, "/pci/dev[0]/%status\n");
        let dev = run_args(&["resolve", "pci/dev[-1]/../dev[0x0]"]).unwrap();
        assert_eq!(dev, "/pci/dev[0]\n");
        assert!(run_args(&["resolve", "pci/dev[5]"]).is_err());
    }

    #[test]
    fn test_fill_option() {
        assert_eq!(parse_fill("0xff").unwrap(), 0xff);
        assert!(parse_fill("0x100").is_err());
        // Unwritten BAR registers read back as the fill pattern.
        let out = run_args(&["--fill", "0xa5", "read", "pci/dev[1]/%bar0_hi"]).unwrap();
        assert_eq!(out, "0xa5a5a5a5\n");
    }

    #[test]
    fn test_list_and_dump() {
        let list = run_args(&["list", "pci"]).unwrap();
        assert!(list.contains("dev[]  array of 2 scope"));
        let dump = run_args(&["dump", "gpu"]).unwrap();
        assert!(dump.contains("/pci/dev[0]/vendor: 0x8086\n"));
        assert!(dump.contains("/pci/dev[0]/class: display\n"));
        let root = run_args(&["dump"]).unwrap();
        assert!(root.contains("/gpu -> /pci/dev[0]\n"));
    }
}
