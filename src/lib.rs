//! Decode the header and load commands of 64-bit Mach-O files.
//!
//! ```no_run
//! use macho_header::MachFile;
//!
//! let file = MachFile::load("/bin/ls")?;
//!
//! for segment in file.segments() {
//!     println!("{} 0x{:016x}", segment.segname, segment.vmaddr);
//! }
//! # Ok::<(), macho_header::MachError>(())
//! ```
#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

mod commands;
mod consts;
#[cfg(feature = "display")]
mod display;
mod errors;
mod header;
mod loader;

pub use crate::commands::{
    FixedName, LoadCommand, Section, SectionFlags, Segment64, LOAD_COMMAND_HEADER_SIZE, SECTION_64_SIZE,
    SEGMENT_COMMAND_64_BODY_SIZE,
};
pub use crate::consts::*;
pub use crate::errors::{MachError, Result, Step, UnknownCpuSubType};
pub use crate::header::{MachHeader, MACH_HEADER_64_SIZE};
pub use crate::loader::{LoadCommands, MachCommand, MachFile};
