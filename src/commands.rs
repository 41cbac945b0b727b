use std::borrow::Cow;
use std::fmt;

use byteorder::ByteOrder;

use crate::consts::*;

/// cmd + cmdsize
pub const LOAD_COMMAND_HEADER_SIZE: usize = 8;
/// `segment_command_64` without the cmd and cmdsize fields
pub const SEGMENT_COMMAND_64_BODY_SIZE: usize = 64;
/// `section_64`
pub const SECTION_64_SIZE: usize = 80;

/// A fixed size name of segment or section.
///
/// The raw bytes are kept as is, the name may fill all 16 bytes without a NUL terminator.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FixedName(pub [u8; 16]);

impl FixedName {
    pub fn new(name: &str) -> FixedName {
        let mut buf = [0; 16];
        let len = name.len().min(buf.len());

        buf[..len].copy_from_slice(&name.as_bytes()[..len]);

        FixedName(buf)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The name without the trailing padding.
    pub fn as_str(&self) -> Cow<str> {
        let len = self.0.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);

        String::from_utf8_lossy(&self.0[..len])
    }
}

impl fmt::Debug for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl PartialEq<str> for FixedName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<'a> PartialEq<&'a str> for FixedName {
    fn eq(&self, other: &&'a str) -> bool {
        self.as_str() == *other
    }
}

fn read_name(buf: &[u8]) -> FixedName {
    let mut name = [0; 16];

    name.copy_from_slice(&buf[..16]);

    FixedName(name)
}

/// The flags field of a section structure is separated into two parts a section
/// type and section attributes.
///
/// The section types are mutually exclusive (it can only have one type)
/// but the section attributes are not (it may have more than one attribute).
///
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SectionFlags(pub u32);

impl SectionFlags {
    pub fn sect_type(self) -> u32 {
        self.0 & SECTION_TYPE
    }

    pub fn sect_attrs(self) -> SectionAttributes {
        SectionAttributes::from_bits_truncate(self.0 & SECTION_ATTRIBUTES)
    }
}

impl From<SectionFlags> for u32 {
    fn from(flags: SectionFlags) -> u32 {
        flags.0
    }
}

/// The 64-bit segment load command indicates that a part of this file is to be
/// mapped into a 64-bit task's address space.
///
/// The size of this segment in memory, vmsize, maybe equal to or
/// larger than the amount to map from this file, filesize.
/// The file is mapped starting at fileoff to the beginning of
/// the segment in memory, vmaddr.  The rest of the memory of the segment,
/// if any, is allocated zero fill on demand.  The section_64 structures
/// directly follow the segment command.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Segment64 {
    /// segment name
    pub segname: FixedName,
    /// memory address of this segment
    pub vmaddr: u64,
    /// memory size of this segment
    pub vmsize: u64,
    /// file offset of this segment
    pub fileoff: u64,
    /// amount to map from the file
    pub filesize: u64,
    /// maximum VM protection
    pub maxprot: vm_prot_t,
    /// initial VM protection
    pub initprot: vm_prot_t,
    /// number of sections in segment
    pub nsects: u32,
    /// flags
    pub flags: u32,
    /// sections
    pub sections: Vec<Section>,
}

impl Segment64 {
    /// Decode the segment body following cmd and cmdsize.
    ///
    /// The sections are read separately, `sections` is left empty.
    pub fn parse<O: ByteOrder>(buf: &[u8; SEGMENT_COMMAND_64_BODY_SIZE]) -> Segment64 {
        Segment64 {
            segname: read_name(&buf[0..16]),
            vmaddr: O::read_u64(&buf[16..24]),
            vmsize: O::read_u64(&buf[24..32]),
            fileoff: O::read_u64(&buf[32..40]),
            filesize: O::read_u64(&buf[40..48]),
            maxprot: O::read_i32(&buf[48..52]),
            initprot: O::read_i32(&buf[52..56]),
            nsects: O::read_u32(&buf[56..60]),
            flags: O::read_u32(&buf[60..64]),
            sections: Vec::new(),
        }
    }

    pub fn segment_flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_truncate(self.flags)
    }

    pub fn max_prot(&self) -> VmProt {
        VmProt::from_bits_truncate(self.maxprot)
    }

    pub fn init_prot(&self) -> VmProt {
        VmProt::from_bits_truncate(self.initprot)
    }

    /// The cmdsize a well formed segment command with `nsects` sections declares.
    pub fn expected_cmdsize(&self) -> u64 {
        (LOAD_COMMAND_HEADER_SIZE + SEGMENT_COMMAND_64_BODY_SIZE) as u64 + SECTION_64_SIZE as u64 * u64::from(self.nsects)
    }

    pub fn section(&self, sectname: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.sectname == sectname)
    }
}

/// A segment is made up of zero or more sections.
///
/// Sections with the same section name, sectname, going into the same segment,
/// segname, are combined by the link editor.  The resulting section is aligned
/// to the maximum alignment of the combined sections and is the new section's
/// alignment.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Section {
    /// name of this section
    pub sectname: FixedName,
    /// segment this section goes in
    pub segname: FixedName,
    /// memory address of this section
    pub addr: u64,
    /// size in bytes of this section
    pub size: u64,
    /// file offset of this section
    pub offset: u32,
    /// section alignment (power of 2)
    pub align: u32,
    /// file offset of relocation entries
    pub reloff: u32,
    /// number of relocation entries
    pub nreloc: u32,
    // flags (section type and attributes)
    pub flags: SectionFlags,
    /// reserved (for offset or index)
    pub reserved1: u32,
    /// reserved (for count or sizeof)
    pub reserved2: u32,
    /// reserved
    pub reserved3: u32,
}

impl Section {
    pub fn parse<O: ByteOrder>(buf: &[u8; SECTION_64_SIZE]) -> Section {
        Section {
            sectname: read_name(&buf[0..16]),
            segname: read_name(&buf[16..32]),
            addr: O::read_u64(&buf[32..40]),
            size: O::read_u64(&buf[40..48]),
            offset: O::read_u32(&buf[48..52]),
            align: O::read_u32(&buf[52..56]),
            reloff: O::read_u32(&buf[56..60]),
            nreloc: O::read_u32(&buf[60..64]),
            flags: SectionFlags(O::read_u32(&buf[64..68])),
            reserved1: O::read_u32(&buf[68..72]),
            reserved2: O::read_u32(&buf[72..76]),
            reserved3: O::read_u32(&buf[76..80]),
        }
    }
}

/// The load commands directly follow the mach header.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    Segment64(Segment64),
    /// Any other command, its payload is skipped.
    Command {
        /// type of load command
        cmd: u32,
    },
}

impl LoadCommand {
    pub fn cmd(&self) -> u32 {
        match *self {
            LoadCommand::Segment64(_) => LC_SEGMENT_64,
            LoadCommand::Command { cmd } => cmd,
        }
    }

    pub fn name(&self) -> &'static str {
        cmd_name(self.cmd())
    }

    pub fn is_known(&self) -> bool {
        is_known_cmd(self.cmd())
    }

    pub fn as_segment(&self) -> Option<&Segment64> {
        match *self {
            LoadCommand::Segment64(ref segment) => Some(segment),
            _ => None,
        }
    }
}
