use std::fs::File;
use std::io::{self, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;
use std::result::Result as StdResult;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::commands::*;
use crate::consts::*;
use crate::errors::*;
use crate::header::{MachHeader, MACH_HEADER_64_SIZE};

/// A load command with its declared `cmdsize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachCommand(pub LoadCommand, pub usize);

impl MachCommand {
    pub fn command(&self) -> &LoadCommand {
        &self.0
    }

    pub fn cmdsize(&self) -> usize {
        self.1
    }
}

/// Keep track of how many bytes were consumed from the byte source.
struct Tracked<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> Tracked<R> {
    fn new(inner: R) -> Self {
        Tracked { inner, pos: 0 }
    }

    fn read_exact(&mut self, buf: &mut [u8], step: Step) -> Result<()> {
        self.inner.read_exact(buf).step(step)?;
        self.pos += buf.len() as u64;

        Ok(())
    }

    /// Read and drop `len` bytes.
    fn skip(&mut self, len: u64, step: Step) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(len), &mut io::sink()).step(step)?;

        self.pos += skipped;

        if skipped < len {
            return Err(MachError::ReadError {
                step,
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {} bytes, got {}", len, skipped),
                ),
            });
        }

        Ok(())
    }
}

/// Walk the load commands following the mach header.
///
/// Yields exactly `ncmds` commands, or stops at the first error.
pub struct LoadCommands<R, O> {
    rdr: Tracked<R>,
    index: usize,
    remaining: u32,
    phantom: PhantomData<O>,
}

impl<R: Read, O: ByteOrder> LoadCommands<R, O> {
    /// Walk the load commands of `header`, `rdr` must be positioned right after the header.
    pub fn new(rdr: R, header: &MachHeader) -> Self {
        Self::with_tracked(Tracked::new(rdr), header.ncmds)
    }

    fn with_tracked(rdr: Tracked<R>, ncmds: u32) -> Self {
        LoadCommands {
            rdr,
            index: 0,
            remaining: ncmds,
            phantom: PhantomData,
        }
    }

    /// The number of bytes consumed from the byte source so far.
    pub fn position(&self) -> u64 {
        self.rdr.pos
    }

    fn parse_command(&mut self) -> Result<MachCommand> {
        let mut buf = [0; LOAD_COMMAND_HEADER_SIZE];

        self.rdr.read_exact(&mut buf, Step::CommandHeader)?;

        let cmd = O::read_u32(&buf[0..4]);
        let cmdsize = O::read_u32(&buf[4..8]);

        if (cmdsize as usize) < LOAD_COMMAND_HEADER_SIZE {
            return Err(MachError::InvalidCommandSize {
                index: self.index,
                cmd,
                cmdsize,
            });
        }

        let cmd = if cmd == LC_SEGMENT_64 {
            LoadCommand::Segment64(self.parse_segment(cmdsize)?)
        } else {
            let len = cmdsize as usize - LOAD_COMMAND_HEADER_SIZE;

            trace!("skip {} command with {} bytes payload", cmd_name(cmd), len);

            self.rdr.skip(len as u64, Step::Payload)?;

            LoadCommand::Command { cmd }
        };

        debug!("parsed #{} {} command with {} bytes", self.index, cmd.name(), cmdsize);

        Ok(MachCommand(cmd, cmdsize as usize))
    }

    fn parse_segment(&mut self, cmdsize: u32) -> Result<Segment64> {
        let mut buf = [0; SEGMENT_COMMAND_64_BODY_SIZE];

        self.rdr.read_exact(&mut buf, Step::Segment)?;

        let mut segment = Segment64::parse::<O>(&buf);

        if segment.expected_cmdsize() != u64::from(cmdsize) {
            warn!(
                "segment {} declares {} bytes but {} sections take {} bytes, the following commands may be misaligned",
                segment.segname,
                cmdsize,
                segment.nsects,
                segment.expected_cmdsize()
            );
        }

        for _ in 0..segment.nsects {
            let mut buf = [0; SECTION_64_SIZE];

            self.rdr.read_exact(&mut buf, Step::Section)?;

            segment.sections.push(Section::parse::<O>(&buf));
        }

        Ok(segment)
    }
}

impl<R: Read, O: ByteOrder> Iterator for LoadCommands<R, O> {
    type Item = Result<MachCommand>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let res = self.parse_command();

        if res.is_ok() {
            self.remaining -= 1;
            self.index += 1;
        } else {
            self.remaining = 0;
        }

        Some(res)
    }
}

/// The decoded header and load commands of a 64-bit mach file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachFile {
    pub header: MachHeader,
    pub commands: Vec<MachCommand>,
    /// The resolved cpu subtype, an unsupported subtype doesn't fail the parsing.
    pub cpu_subtype: StdResult<&'static str, UnknownCpuSubType>,
    /// The position in the byte source after the last load command.
    pub end: u64,
}

impl MachFile {
    /// Parse a mach file from the beginning of `rdr`.
    ///
    /// The header is always decoded as little endian and the magic is not checked.
    pub fn parse<R: Read>(rdr: R) -> Result<MachFile> {
        let mut rdr = Tracked::new(rdr);
        let mut buf = [0; MACH_HEADER_64_SIZE];

        rdr.read_exact(&mut buf, Step::Header)?;

        Self::parse_commands::<R, LittleEndian>(rdr, &buf)
    }

    /// Parse a mach file, rejecting anything but a 64-bit mach header.
    ///
    /// Byte swapped files are decoded as big endian.
    pub fn parse_strict<R: Read>(rdr: R) -> Result<MachFile> {
        let mut rdr = Tracked::new(rdr);
        let mut buf = [0; MACH_HEADER_64_SIZE];

        rdr.read_exact(&mut buf, Step::Header)?;

        match LittleEndian::read_u32(&buf[0..4]) {
            MH_MAGIC_64 => Self::parse_commands::<R, LittleEndian>(rdr, &buf),
            MH_CIGAM_64 => Self::parse_commands::<R, BigEndian>(rdr, &buf),
            magic => Err(MachError::UnknownMagic(magic)),
        }
    }

    /// Open and parse the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<MachFile> {
        let file = File::open(path.as_ref())?;

        debug!("loading mach file {:?}", path.as_ref());

        Self::parse(BufReader::new(file))
    }

    fn parse_commands<R: Read, O: ByteOrder>(rdr: Tracked<R>, buf: &[u8; MACH_HEADER_64_SIZE]) -> Result<MachFile> {
        let header = MachHeader::parse::<O>(buf);

        debug!("parsed mach-o file header: {:?}", header);

        let cpu_subtype = header.cpu_subtype_name();

        if let Err(ref err) = cpu_subtype {
            debug!("{}", err);
        }

        let mut iter = LoadCommands::<R, O>::with_tracked(rdr, header.ncmds);
        let mut commands = Vec::with_capacity(header.ncmds.min(1024) as usize);

        for cmd in &mut iter {
            commands.push(cmd?);
        }

        debug!("parsed {} load commands", commands.len());

        let file = MachFile {
            header,
            commands,
            cpu_subtype,
            end: iter.position(),
        };

        if file.declared_commands_size() != u64::from(file.header.sizeofcmds) {
            warn!(
                "load commands declare {} bytes, but the header declares {} bytes",
                file.declared_commands_size(),
                file.header.sizeofcmds
            );
        }

        Ok(file)
    }

    /// The sum of the `cmdsize` of all load commands.
    pub fn declared_commands_size(&self) -> u64 {
        self.commands.iter().map(|cmd| cmd.cmdsize() as u64).sum()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment64> {
        self.commands.iter().filter_map(|cmd| cmd.command().as_segment())
    }

    pub fn segment(&self, segname: &str) -> Option<&Segment64> {
        self.segments().find(|segment| segment.segname == segname)
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

    use super::*;
    use crate::commands::tests::{section_data, segment_body};

    pub fn mach_header<O: ByteOrder>(cpusubtype: cpu_subtype_t, ncmds: u32, sizeofcmds: u32, flags: u32) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.write_u32::<O>(MH_MAGIC_64).unwrap();
        buf.write_i32::<O>(CPU_TYPE_ARM64).unwrap();
        buf.write_i32::<O>(cpusubtype).unwrap();
        buf.write_u32::<O>(MH_EXECUTE).unwrap();
        buf.write_u32::<O>(ncmds).unwrap();
        buf.write_u32::<O>(sizeofcmds).unwrap();
        buf.write_u32::<O>(flags).unwrap();
        buf.write_u32::<O>(0).unwrap();

        buf
    }

    pub fn opaque_command(cmd: u32, cmdsize: u32) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.write_u32::<LittleEndian>(cmd).unwrap();
        buf.write_u32::<LittleEndian>(cmdsize).unwrap();
        buf.extend((8..cmdsize).map(|i| i as u8));

        buf
    }

    pub fn segment_command(segname: &str, sections: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.write_u32::<LittleEndian>(LC_SEGMENT_64).unwrap();
        buf.write_u32::<LittleEndian>(72 + 80 * sections.len() as u32).unwrap();
        buf.extend(segment_body(segname, 0x100000000, 0x4000, sections.len() as u32));

        for (i, sectname) in sections.iter().enumerate() {
            buf.extend(section_data(sectname, segname, 0x100000000 + 0x100 * i as u64));
        }

        buf
    }

    /// A small executable with the usual layout of the load commands.
    pub fn hello_world() -> Vec<u8> {
        let commands = [
            segment_command(SEG_PAGEZERO, &[]),
            segment_command(SEG_TEXT, &[SECT_TEXT, "__stubs", "__cstring"]),
            segment_command(SEG_LINKEDIT, &[]),
            opaque_command(LC_DYLD_CHAINED_FIXUPS, 16),
            opaque_command(LC_SYMTAB, 24),
            opaque_command(LC_LOAD_DYLINKER, 32),
            opaque_command(LC_MAIN, 24),
            opaque_command(LC_LOAD_DYLIB, 56),
        ];
        let sizeofcmds: u32 = commands.iter().map(|cmd| cmd.len() as u32).sum();

        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, commands.len() as u32, sizeofcmds, 0x00200085);

        for cmd in &commands {
            buf.extend(cmd);
        }

        buf
    }

    #[test]
    fn test_parse_single_segment() {
        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_V8, 1, 72, MH_PIE);

        buf.extend(segment_command(SEG_PAGEZERO, &[]));

        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.cpu_subtype, Ok("CPU_SUBTYPE_ARM64_V8"));
        assert!(file.header.flag_names().contains(&"MH_PIE"));
        assert_eq!(file.commands.len(), 1);

        let MachCommand(ref cmd, cmdsize) = file.commands[0];

        assert_eq!(cmdsize, 72);
        assert_eq!(cmd.as_segment().map(|segment| segment.sections.len()), Some(0));
        assert_eq!(file.end, 32 + 72);
    }

    #[test]
    fn test_parse_unknown_command() {
        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_V8, 1, 16, MH_PIE);

        buf.extend(opaque_command(0x7f, 16));
        // trailing bytes must not be consumed
        buf.extend(&[0xff; 8]);

        let mut cur = Cursor::new(&buf);
        let file = MachFile::parse(&mut cur).unwrap();

        assert_eq!(file.commands, vec![MachCommand(LoadCommand::Command { cmd: 0x7f }, 16)]);
        assert_eq!(file.commands[0].command().name(), LC_UNKNOWN);
        assert!(file.segments().next().is_none());
        assert_eq!(file.end, 32 + 16);
        assert_eq!(cur.position(), 32 + 16);
    }

    #[test]
    fn test_parse_hello_world() {
        let _ = pretty_env_logger::try_init();

        let buf = hello_world();
        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.commands.len(), file.header.ncmds as usize);
        assert_eq!(file.declared_commands_size(), u64::from(file.header.sizeofcmds));
        assert_eq!(file.end, buf.len() as u64);
        assert_eq!(file.cpu_subtype, Ok("CPU_SUBTYPE_ARM64_ALL"));
        assert_eq!(
            file.header.flag_names(),
            vec!["MH_NOUNDEFS", "MH_DYLDLINK", "MH_TWOLEVEL", "MH_PIE"]
        );

        assert_eq!(
            file.commands.iter().map(|cmd| cmd.command().name()).collect::<Vec<_>>(),
            vec![
                "LC_SEGMENT_64",
                "LC_SEGMENT_64",
                "LC_SEGMENT_64",
                "LC_DYLD_CHAINED_FIXUPS",
                "LC_SYMTAB",
                "LC_LOAD_DYLINKER",
                "LC_MAIN",
                "LC_LOAD_DYLIB",
            ]
        );

        let text = file.segment(SEG_TEXT).unwrap();

        assert_eq!(text.nsects, 3);
        assert_eq!(
            text.sections.iter().map(|section| section.sectname.to_string()).collect::<Vec<_>>(),
            vec![SECT_TEXT, "__stubs", "__cstring"]
        );
        assert_eq!(
            text.sections.iter().map(|section| section.addr).collect::<Vec<_>>(),
            vec![0x100000000, 0x100000100, 0x100000200]
        );
        assert!(text.section("__stubs").is_some());
        assert!(file.segment(SEG_DATA).is_none());
        assert_eq!(file.segments().count(), 3);
    }

    #[test]
    fn test_opaque_payload_is_consumed() {
        for &cmdsize in &[8, 16, 24, 4096] {
            let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, 2, cmdsize + 72, 0);

            buf.extend(opaque_command(LC_UUID, cmdsize));
            buf.extend(segment_command(SEG_LINKEDIT, &[]));

            let file = MachFile::parse(Cursor::new(&buf)).unwrap();

            assert_eq!(file.end, 32 + u64::from(cmdsize) + 72);
            assert_eq!(file.segment(SEG_LINKEDIT).map(|segment| segment.vmsize), Some(0x4000));
        }
    }

    #[test]
    fn test_mismatched_sizeofcmds() {
        // the header claims far more bytes than the single command uses
        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, 1, 0x1000, 0);

        buf.extend(opaque_command(LC_SOURCE_VERSION, 16));
        buf.extend(opaque_command(LC_UUID, 24));

        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.commands.len(), 1);
        assert_ne!(file.declared_commands_size(), u64::from(file.header.sizeofcmds));
        assert_eq!(file.end, 32 + 16);
    }

    #[test]
    fn test_unknown_cpu_subtype() {
        let mut buf = mach_header::<LittleEndian>(99, 1, 16, MH_PIE);

        buf.extend(opaque_command(LC_SOURCE_VERSION, 16));

        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.cpu_subtype, Err(UnknownCpuSubType(99)));
        assert_eq!(file.header.cputype, CPU_TYPE_ARM64);
        assert_eq!(file.header.filetype, MH_EXECUTE);
        assert_eq!(file.header.flags, MH_PIE);
        assert_eq!(file.commands.len(), 1);
    }

    #[test]
    fn test_cpu_subtype_with_capability_bits() {
        let mut buf = mach_header::<LittleEndian>(0x01000001, 1, 16, MH_PIE);

        buf.extend(opaque_command(LC_SOURCE_VERSION, 16));

        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.cpu_subtype, Err(UnknownCpuSubType(0x01000001)));
        assert_eq!(file.commands.len(), 1);
        assert_eq!(file.end, 48);
    }

    #[test]
    fn test_truncated_stream() {
        let buf = hello_world();

        let err = MachFile::parse(Cursor::new(&buf[..20])).unwrap_err();
        assert_eq!(err.step(), Some(Step::Header));

        let err = MachFile::parse(Cursor::new(&buf[..36])).unwrap_err();
        assert_eq!(err.step(), Some(Step::CommandHeader));

        let err = MachFile::parse(Cursor::new(&buf[..32 + 8 + 10])).unwrap_err();
        assert_eq!(err.step(), Some(Step::Segment));

        // the second segment has sections
        let err = MachFile::parse(Cursor::new(&buf[..32 + 72 + 72 + 100])).unwrap_err();
        assert_eq!(err.step(), Some(Step::Section));

        let err = MachFile::parse(Cursor::new(&buf[..buf.len() - 1])).unwrap_err();
        assert_eq!(err.step(), Some(Step::Payload));
        assert!(err.is_truncated());
    }

    #[test]
    fn test_invalid_command_size() {
        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, 2, 32, 0);

        buf.extend(opaque_command(LC_UUID, 24));
        buf.write_u32::<LittleEndian>(LC_SYMTAB).unwrap();
        buf.write_u32::<LittleEndian>(4).unwrap();

        match MachFile::parse(Cursor::new(&buf)) {
            Err(MachError::InvalidCommandSize { index, cmd, cmdsize }) => {
                assert_eq!(index, 1);
                assert_eq!(cmd, LC_SYMTAB);
                assert_eq!(cmdsize, 4);
            }
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn test_segment_with_mismatched_cmdsize() {
        // the fixed segment width is trusted over cmdsize
        let mut segment = segment_command(SEG_TEXT, &[SECT_TEXT]);

        LittleEndian::write_u32(&mut segment[4..8], 72);

        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, 2, 72 + 16, 0);

        buf.extend(segment);
        buf.extend(opaque_command(LC_SOURCE_VERSION, 16));

        let file = MachFile::parse(Cursor::new(&buf)).unwrap();

        assert_eq!(file.commands[0].cmdsize(), 72);
        assert_eq!(file.segment(SEG_TEXT).map(|segment| segment.sections.len()), Some(1));
        assert_eq!(file.commands[1].command().cmd(), LC_SOURCE_VERSION);
        assert_eq!(file.end, 32 + 152 + 16);
    }

    #[test]
    fn test_segment_with_huge_nsects() {
        let mut segment = segment_command(SEG_TEXT, &[SECT_TEXT]);

        // nsects
        LittleEndian::write_u32(&mut segment[64..68], u32::MAX);

        let mut body = [0; SEGMENT_COMMAND_64_BODY_SIZE];

        body.copy_from_slice(&segment[8..72]);

        assert_eq!(
            Segment64::parse::<LittleEndian>(&body).expected_cmdsize(),
            72 + 80 * u64::from(u32::MAX)
        );

        let mut buf = mach_header::<LittleEndian>(CPU_SUBTYPE_ARM64_ALL, 1, 152, 0);

        buf.extend(segment);

        let err = MachFile::parse(Cursor::new(&buf)).unwrap_err();

        assert_eq!(err.step(), Some(Step::Section));
        assert!(err.is_truncated());
    }

    #[test]
    fn test_load_commands_iterator_stops_after_error() {
        let buf = hello_world();
        let header = MachHeader::read::<_, LittleEndian>(&mut &buf[..]).unwrap();
        let mut iter = LoadCommands::<_, LittleEndian>::new(Cursor::new(&buf[32..32 + 72 + 4]), &header);

        assert!(iter.next().unwrap().is_ok());
        assert_eq!(iter.position(), 72);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());

        let mut iter = LoadCommands::<_, LittleEndian>::new(Cursor::new(&buf[32..]), &MachHeader::default());

        assert!(iter.next().is_none());
        assert_eq!(iter.position(), 0);
    }

    #[test]
    fn test_parse_strict() {
        let buf = hello_world();
        let file = MachFile::parse_strict(Cursor::new(&buf)).unwrap();

        assert_eq!(file, MachFile::parse(Cursor::new(&buf)).unwrap());

        let mut elf = buf.clone();

        elf[..4].copy_from_slice(b"\x7fELF");

        match MachFile::parse_strict(Cursor::new(&elf)) {
            Err(MachError::UnknownMagic(magic)) => assert_eq!(magic, 0x464c457f),
            res => panic!("unexpected result: {:?}", res),
        }

        // the lenient parser reads whatever follows
        assert!(MachFile::parse(Cursor::new(&elf)).is_ok());
    }

    #[test]
    fn test_parse_strict_big_endian() {
        let mut buf = mach_header::<BigEndian>(CPU_SUBTYPE_X86_64_H, 1, 16, MH_NOUNDEFS);

        buf.write_u32::<BigEndian>(LC_UUID).unwrap();
        buf.write_u32::<BigEndian>(16).unwrap();
        buf.extend(&[0; 8]);

        let file = MachFile::parse_strict(Cursor::new(&buf)).unwrap();

        assert_eq!(file.header.magic, MH_MAGIC_64);
        assert_eq!(file.cpu_subtype, Ok("CPU_SUBTYPE_X86_64_H"));
        assert_eq!(file.commands, vec![MachCommand(LoadCommand::Command { cmd: LC_UUID }, 16)]);
        assert_eq!(file.end, 48);
    }
}
