#[macro_use]
extern crate log;

use std::fs::File;
use std::io::{self, BufRead, Cursor, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use memmap::Mmap;
use structopt::StructOpt;

use macho_header::MachFile;

#[derive(Debug, StructOpt)]
#[structopt(name = "machodump", about = "Dump the mach header and load commands of a 64-bit Mach-O file")]
struct Opt {
    /// print the mach header
    #[structopt(short = "H", long = "header")]
    header: bool,

    /// print the load commands
    #[structopt(short = "l", long = "load-commands")]
    load_commands: bool,

    /// reject files without a 64-bit mach magic
    #[structopt(long)]
    strict: bool,

    /// the file to analyze, read from stdin when omitted
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,
}

fn prompt_file() -> Result<PathBuf> {
    print!("Please enter the file you want to analyze: ");
    io::stdout().flush()?;

    let mut line = String::new();

    io::stdin().lock().read_line(&mut line)?;

    let path = line.trim();

    if path.is_empty() {
        bail!("no file specified");
    }

    Ok(PathBuf::from(path))
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let opt = Opt::from_args();

    let path = match opt.file {
        Some(ref path) => path.clone(),
        None => prompt_file()?,
    };

    debug!("analyze file {:?}", path);

    let file = File::open(&path).with_context(|| format!("open file {:?}", path))?;
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("map file {:?}", path))?;
    let cur = Cursor::new(&mmap[..]);

    let mach = if opt.strict {
        MachFile::parse_strict(cur)
    } else {
        MachFile::parse(cur)
    }
    .with_context(|| format!("parse file {:?}", path))?;

    if !mach.header.is_64bit() {
        warn!("0x{:08x} is not a 64-bit mach magic, the output may be garbage", mach.header.magic);
    } else if mach.header.is_swapped() {
        warn!("the file was decoded with the wrong byte order, try --strict");
    }

    if let Err(ref err) = mach.cpu_subtype {
        warn!("{}", err);
    }

    let print_all = !opt.header && !opt.load_commands;

    println!("{}:", path.display());

    if opt.header || print_all {
        print!("{}", mach.header);
    }

    if opt.load_commands || print_all {
        for (i, cmd) in mach.commands.iter().enumerate() {
            println!("Load command {}", i);
            print!("{}", cmd);
        }
    }

    Ok(())
}
