use std::fmt;

use crate::commands::{LoadCommand, Section, Segment64};
use crate::consts::*;
use crate::header::MachHeader;
use crate::loader::{MachCommand, MachFile};

impl fmt::Display for MachHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mach header\n")?;
        write!(
            f,
            "      magic cputype cpusubtype  caps    filetype ncmds sizeofcmds      \
             flags\n"
        )?;
        write!(
            f,
            " 0x{:08x} {:7} {:10}  0x{:02x}  {:10} {:5} {:10} 0x{:08x}\n",
            self.magic,
            self.cputype,
            get_cpu_subtype_type(self.cpusubtype),
            get_cpu_subtype_feature(self.cpusubtype),
            self.filetype,
            self.ncmds,
            self.sizeofcmds,
            self.flags
        )?;

        match self.cpu_type_name() {
            Some(name) => write!(f, "    cputype {}\n", name)?,
            None => write!(f, "    cputype unknown (0x{:x})\n", self.cputype)?,
        }
        match self.cpu_subtype_name() {
            Ok(name) => write!(f, " cpusubtype {}\n", name)?,
            Err(_) => write!(f, " cpusubtype unknown (0x{:x})\n", self.cpusubtype)?,
        }
        match self.file_type_name() {
            Some(name) => write!(f, "   filetype {}\n", name)?,
            None => write!(f, "   filetype unknown (0x{:x})\n", self.filetype)?,
        }

        let flags = self.flag_names();

        if flags.is_empty() {
            write!(f, "      flags (none)\n")
        } else {
            write!(f, "      flags {}\n", flags.join(" "))
        }
    }
}

impl fmt::Display for MachCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            LoadCommand::Segment64(ref segment) => self.print_segment_command(f, segment),
            LoadCommand::Command { cmd } => self.print_command(f, cmd),
        }
    }
}

impl MachCommand {
    fn print_segment_command(&self, f: &mut fmt::Formatter, segment: &Segment64) -> fmt::Result {
        write!(f, "      cmd {}\n", self.0.name())?;
        write!(f, "  cmdsize {}\n", self.1)?;
        write!(f, "  segname {}\n", segment.segname)?;
        write!(f, "   vmaddr 0x{:016x}\n", segment.vmaddr)?;
        write!(f, "   vmsize 0x{:016x}\n", segment.vmsize)?;
        write!(f, "  fileoff {}\n", segment.fileoff)?;
        write!(f, " filesize {}\n", segment.filesize)?;
        write!(f, "  maxprot 0x{:08x} {}\n", segment.maxprot, segment.max_prot().to_rwx())?;
        write!(f, " initprot 0x{:08x} {}\n", segment.initprot, segment.init_prot().to_rwx())?;
        write!(f, "   nsects {}\n", segment.nsects)?;

        let flags = segment.segment_flags();

        if flags.is_empty() {
            write!(f, "    flags 0x{:x}\n", segment.flags)?;
        } else {
            write!(f, "    flags 0x{:x} ({:?})\n", segment.flags, flags)?;
        }

        for section in &segment.sections {
            print_section(f, segment, section)?;
        }

        Ok(())
    }

    fn print_command(&self, f: &mut fmt::Formatter, cmd: u32) -> fmt::Result {
        if is_known_cmd(cmd) {
            write!(f, "      cmd {}\n", cmd_name(cmd))?;
        } else {
            write!(f, "      cmd {} (0x{:x})\n", cmd_name(cmd), cmd)?;
        }
        write!(f, "  cmdsize {}\n", self.1)
    }
}

fn print_section(f: &mut fmt::Formatter, segment: &Segment64, section: &Section) -> fmt::Result {
    write!(f, "Section\n")?;
    write!(f, "  sectname {}\n", section.sectname)?;
    write!(
        f,
        "   segname {}{}",
        section.segname,
        if segment.segname != section.segname {
            " (does not match segment)\n"
        } else {
            "\n"
        }
    )?;
    write!(f, "      addr 0x{:016x}\n", section.addr)?;
    write!(f, "      size 0x{:016x}\n", section.size)?;
    write!(f, "    offset {}\n", section.offset)?;
    write!(
        f,
        "     align 2^{} ({})\n",
        section.align,
        1u64.checked_shl(section.align).unwrap_or(0)
    )?;
    write!(f, "    reloff {}\n", section.reloff)?;
    write!(f, "    nreloc {}\n", section.nreloc)?;
    write!(f, "     flags 0x{:08x}\n", u32::from(section.flags))?;
    write!(
        f,
        " reserved1 {}{}",
        section.reserved1,
        match section.flags.sect_type() {
            S_SYMBOL_STUBS | S_LAZY_SYMBOL_POINTERS | S_LAZY_DYLIB_SYMBOL_POINTERS | S_NON_LAZY_SYMBOL_POINTERS => {
                " (index into indirect symbol table)\n"
            }
            _ => "\n",
        }
    )?;
    write!(
        f,
        " reserved2 {}{}",
        section.reserved2,
        if section.flags.sect_type() == S_SYMBOL_STUBS {
            " (size of stubs)\n"
        } else {
            "\n"
        }
    )?;
    write!(f, " reserved3 {}\n", section.reserved3)
}

impl fmt::Display for MachFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header)?;

        for (i, cmd) in self.commands.iter().enumerate() {
            write!(f, "Load command {}\n", i)?;
            write!(f, "{}", cmd)?;
        }

        Ok(())
    }
}
