use std::io::Read;
use std::result::Result as StdResult;

use byteorder::ByteOrder;

use crate::consts::*;
use crate::errors::*;

/// Size of `mach_header_64`, including the reserved field.
pub const MACH_HEADER_64_SIZE: usize = 32;

/// The 64-bit mach header appears at the very beginning of the object file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MachHeader {
    /// mach magic number identifier
    pub magic: u32,
    /// cpu specifier
    pub cputype: cpu_type_t,
    /// machine specifier
    pub cpusubtype: cpu_subtype_t,
    /// type of file
    pub filetype: u32,
    /// number of load commands
    pub ncmds: u32,
    /// the size of all the load commands
    pub sizeofcmds: u32,
    /// flags
    pub flags: u32,
}

impl MachHeader {
    /// Decode the header from its 32 bytes window.
    ///
    /// The magic is not checked and the trailing reserved field is ignored.
    pub fn parse<O: ByteOrder>(buf: &[u8; MACH_HEADER_64_SIZE]) -> MachHeader {
        MachHeader {
            magic: O::read_u32(&buf[0..4]),
            cputype: O::read_i32(&buf[4..8]),
            cpusubtype: O::read_i32(&buf[8..12]),
            filetype: O::read_u32(&buf[12..16]),
            ncmds: O::read_u32(&buf[16..20]),
            sizeofcmds: O::read_u32(&buf[20..24]),
            flags: O::read_u32(&buf[24..28]),
        }
    }

    pub fn read<R: Read, O: ByteOrder>(rdr: &mut R) -> Result<MachHeader> {
        let mut buf = [0; MACH_HEADER_64_SIZE];

        rdr.read_exact(&mut buf).step(Step::Header)?;

        Ok(Self::parse::<O>(&buf))
    }

    pub fn is_64bit(&self) -> bool {
        self.magic == MH_MAGIC_64 || self.magic == MH_CIGAM_64
    }

    /// The header was decoded with the wrong byte order.
    pub fn is_swapped(&self) -> bool {
        self.magic == MH_CIGAM_64
    }

    pub fn header_flags(&self) -> MachHeaderFlags {
        MachHeaderFlags::from_bits_truncate(self.flags)
    }

    pub fn flag_names(&self) -> Vec<&'static str> {
        self.header_flags().names()
    }

    pub fn cpu_subtype_name(&self) -> StdResult<&'static str, UnknownCpuSubType> {
        cpu_subtype_name(self.cpusubtype).ok_or(UnknownCpuSubType(self.cpusubtype))
    }

    pub fn cpu_type_name(&self) -> Option<&'static str> {
        cpu_type_name(self.cputype)
    }

    pub fn file_type_name(&self) -> Option<&'static str> {
        file_type_name(self.filetype)
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use byteorder::{BigEndian, ByteOrder, LittleEndian};

    use super::*;

    /**
    Mach header
          magic cputype cpusubtype  caps    filetype ncmds sizeofcmds      flags
     0xfeedfacf 16777223          3  0x80           2    15       2080 0x00a18085
    **/
    pub const MACH_HEADER_64_DATA: [u8; 32] = [
        0xcf, 0xfa, 0xed, 0xfe, 0x7, 0x0, 0x0, 0x1, 0x3, 0x0, 0x0, 0x80, 0x2, 0x0, 0x0, 0x0, 0xf, 0x0, 0x0, 0x0,
        0x20, 0x8, 0x0, 0x0, 0x85, 0x80, 0xa1, 0x0, 0x0, 0x0, 0x0, 0x0,
    ];

    #[test]
    fn test_parse_mach_header() {
        let header = MachHeader::parse::<LittleEndian>(&MACH_HEADER_64_DATA);

        assert_eq!(header.magic, MH_MAGIC_64);
        assert_eq!(header.cputype, CPU_TYPE_X86_64);
        assert_eq!(header.cpusubtype, 0x80000003u64 as i32);
        assert_eq!(header.filetype, MH_EXECUTE);
        assert_eq!(header.ncmds, 15);
        assert_eq!(header.sizeofcmds, 2080);
        assert_eq!(header.flags, 0x00a18085);

        assert!(header.is_64bit());
        assert!(!header.is_swapped());
        assert_eq!(header.cpu_type_name(), Some("X86_64"));
        // CPU_SUBTYPE_LIB64 is set
        assert_eq!(header.cpu_subtype_name(), Err(UnknownCpuSubType(0x80000003u64 as i32)));
        assert_eq!(header.file_type_name(), Some("EXECUTE"));
        assert!(header.header_flags().contains(MachHeaderFlags::PIE));
    }

    #[test]
    fn test_read_mach_header_consumes_reserved() {
        let mut cur = Cursor::new(&MACH_HEADER_64_DATA[..]);

        let header = MachHeader::read::<_, LittleEndian>(&mut cur).unwrap();

        assert_eq!(header.ncmds, 15);
        assert_eq!(cur.position(), MACH_HEADER_64_SIZE as u64);
    }

    #[test]
    fn test_read_short_header() {
        let mut cur = Cursor::new(&MACH_HEADER_64_DATA[..28]);

        let err = MachHeader::read::<_, LittleEndian>(&mut cur).unwrap_err();

        assert_eq!(err.step(), Some(Step::Header));
        assert!(err.is_truncated());
    }

    #[test]
    fn test_unknown_cpu_subtype_keeps_fields() {
        let mut data = MACH_HEADER_64_DATA;

        data[8..12].copy_from_slice(&[99, 0, 0, 0]);

        let header = MachHeader::parse::<LittleEndian>(&data);

        assert_eq!(header.cpu_subtype_name(), Err(UnknownCpuSubType(99)));
        assert_eq!(header.cputype, CPU_TYPE_X86_64);
        assert_eq!(header.ncmds, 15);
        assert_eq!(header.sizeofcmds, 2080);
        assert_eq!(header.flags, 0x00a18085);
    }

    #[test]
    fn test_cpu_subtype_with_capability_bits() {
        let mut data = MACH_HEADER_64_DATA;

        for &(subtype, name) in &[
            (0x00000003, Ok("CPU_SUBTYPE_X86_64_ALL")),
            (0x01000001, Err(UnknownCpuSubType(0x01000001))),
            (0x02000003, Err(UnknownCpuSubType(0x02000003))),
            (0x40000008, Err(UnknownCpuSubType(0x40000008))),
        ] {
            LittleEndian::write_i32(&mut data[8..12], subtype);

            let header = MachHeader::parse::<LittleEndian>(&data);

            assert_eq!(header.cpu_subtype_name(), name);
            assert_eq!(header.flags, 0x00a18085);
        }
    }

    #[test]
    fn test_foreign_byte_order() {
        let header = MachHeader::parse::<BigEndian>(&MACH_HEADER_64_DATA);

        assert_eq!(header.magic, MH_CIGAM_64);
        assert!(header.is_swapped());
        assert_eq!(header.ncmds, 0x0f000000);
    }
}
