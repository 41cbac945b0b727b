#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::collections::HashMap;

pub type cpu_type_t = i32;
pub type cpu_subtype_t = i32;
pub type vm_prot_t = i32;

// Capability bits used in the definition of cpu_type.
//

/// mask for architecture bits
pub const CPU_ARCH_MASK: cpu_type_t = 0xff000000u64 as cpu_type_t;
/// 64 bit ABI
pub const CPU_ARCH_ABI64: cpu_type_t = 0x01000000;

//  Machine types known by all.
//

pub const CPU_TYPE_ANY: cpu_type_t = -1;

pub const CPU_TYPE_X86: cpu_type_t = 7;
pub const CPU_TYPE_I386: cpu_type_t = CPU_TYPE_X86;
pub const CPU_TYPE_X86_64: cpu_type_t = CPU_TYPE_X86 | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM: cpu_type_t = 12;
pub const CPU_TYPE_ARM64: cpu_type_t = CPU_TYPE_ARM | CPU_ARCH_ABI64;
pub const CPU_TYPE_POWERPC: cpu_type_t = 18;
pub const CPU_TYPE_POWERPC64: cpu_type_t = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

// Capability bits used in the definition of cpu_subtype.
//

/// mask for feature flags
pub const CPU_SUBTYPE_MASK: cpu_subtype_t = 0xff000000u64 as cpu_subtype_t;
/// 64 bit libraries
pub const CPU_SUBTYPE_LIB64: cpu_subtype_t = 0x80000000u64 as cpu_subtype_t;

pub const CPU_SUBTYPE_ARM64_ALL: cpu_subtype_t = 0;
pub const CPU_SUBTYPE_ARM64_V8: cpu_subtype_t = 1;
pub const CPU_SUBTYPE_X86_64_ALL: cpu_subtype_t = 3;
/// Haswell feature subset
pub const CPU_SUBTYPE_X86_64_H: cpu_subtype_t = 8;
pub const CPU_SUBTYPE_ARM_V7: cpu_subtype_t = 9;
pub const CPU_SUBTYPE_ARM_V7S: cpu_subtype_t = 11;

/// Strip the capability bits from a cpu subtype.
pub fn get_cpu_subtype_type(subtype: cpu_subtype_t) -> cpu_subtype_t {
    subtype & !CPU_SUBTYPE_MASK
}

/// The capability bits of a cpu subtype.
pub fn get_cpu_subtype_feature(subtype: cpu_subtype_t) -> u8 {
    ((subtype & CPU_SUBTYPE_MASK) >> 24) as u8
}

// Constant for the magic field of the mach_header_64 (64-bit architectures)
//

/// the 64-bit mach magic number
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
/// NXSwapInt(MH_MAGIC_64)
pub const MH_CIGAM_64: u32 = 0xcffaedfe;

// Constants for the filetype field of the mach_header
//

/// relocatable object file
pub const MH_OBJECT: u32 = 0x1;
/// demand paged executable file
pub const MH_EXECUTE: u32 = 0x2;
/// fixed VM shared library file
pub const MH_FVMLIB: u32 = 0x3;
/// core file
pub const MH_CORE: u32 = 0x4;
/// preloaded executable file
pub const MH_PRELOAD: u32 = 0x5;
/// dynamically bound shared library
pub const MH_DYLIB: u32 = 0x6;
/// dynamic link editor
pub const MH_DYLINKER: u32 = 0x7;
/// dynamically bound bundle file
pub const MH_BUNDLE: u32 = 0x8;
/// shared library stub for static linking only, no section contents
pub const MH_DYLIB_STUB: u32 = 0x9;
/// companion file with only debug sections
pub const MH_DSYM: u32 = 0xa;
/// x86_64 kexts
pub const MH_KEXT_BUNDLE: u32 = 0xb;

// Constants for the flags field of the mach_header
//

/// the object file has no undefined references
pub const MH_NOUNDEFS: u32 = 0x1;
/// the object file is the output of an incremental link against a base file and can't be link edited again
pub const MH_INCRLINK: u32 = 0x2;
/// the object file is input for the dynamic linker and can't be staticly link edited again
pub const MH_DYLDLINK: u32 = 0x4;
/// the object file's undefined references are bound by the dynamic linker when loaded.
pub const MH_BINDATLOAD: u32 = 0x8;
/// the file has its dynamic undefined references prebound.
pub const MH_PREBOUND: u32 = 0x10;
/// the file has its read-only and read-write segments split
pub const MH_SPLIT_SEGS: u32 = 0x20;
/// the shared library init routine is to be run lazily via catching memory faults to its writeable segments (obsolete)
pub const MH_LAZY_INIT: u32 = 0x40;
/// the image is using two-level name space bindings
pub const MH_TWOLEVEL: u32 = 0x80;
/// the executable is forcing all images to use flat name space bindings
pub const MH_FORCE_FLAT: u32 = 0x100;
/// this umbrella guarantees no multiple defintions of symbols in its sub-images
pub const MH_NOMULTIDEFS: u32 = 0x200;
/// do not have dyld notify the prebinding agent about this executable
pub const MH_NOFIXPREBINDING: u32 = 0x400;
/// the binary is not prebound but can have its prebinding redone.
pub const MH_PREBINDABLE: u32 = 0x800;
/// indicates that this binary binds to all two-level namespace modules of its dependent libraries.
pub const MH_ALLMODSBOUND: u32 = 0x1000;
/// safe to divide up the sections into sub-sections via symbols for dead code stripping
pub const MH_SUBSECTIONS_VIA_SYMBOLS: u32 = 0x2000;
/// the binary has been canonicalized via the unprebind operation
pub const MH_CANONICAL: u32 = 0x4000;
/// the final linked image contains external weak symbols
pub const MH_WEAK_DEFINES: u32 = 0x8000;
/// the final linked image uses weak symbols
pub const MH_BINDS_TO_WEAK: u32 = 0x10000;
/// all stacks in the task will be given stack execution privilege.
pub const MH_ALLOW_STACK_EXECUTION: u32 = 0x20000;
/// the binary declares it is safe for use in processes with uid zero
pub const MH_ROOT_SAFE: u32 = 0x40000;
/// the binary declares it is safe for use in processes when issetugid() is true
pub const MH_SETUID_SAFE: u32 = 0x80000;
/// the static linker does not need to examine dependent dylibs to see if any are re-exported
pub const MH_NO_REEXPORTED_DYLIBS: u32 = 0x100000;
/// the OS will load the main executable at a random address.
pub const MH_PIE: u32 = 0x200000;
/// the static linker will not create a LC_LOAD_DYLIB load command to the dylib
/// if no symbols are being referenced from the dylib.
pub const MH_DEAD_STRIPPABLE_DYLIB: u32 = 0x400000;
/// Contains a section of type S_THREAD_LOCAL_VARIABLES
pub const MH_HAS_TLV_DESCRIPTORS: u32 = 0x800000;
/// the OS will run the main executable with a non-executable heap
pub const MH_NO_HEAP_EXECUTION: u32 = 0x1000000;
/// The code was linked for use in an application extension.
pub const MH_APP_EXTENSION_SAFE: u32 = 0x02000000;
/// the image contains Objective-C metadata
pub const MH_HAS_OBJC: u32 = 0x40000000;

bitflags! {
    /// Flags of the `mach_header_64`.
    pub struct MachHeaderFlags: u32 {
        const NOUNDEFS = MH_NOUNDEFS;
        const INCRLINK = MH_INCRLINK;
        const DYLDLINK = MH_DYLDLINK;
        const BINDATLOAD = MH_BINDATLOAD;
        const PREBOUND = MH_PREBOUND;
        const SPLIT_SEGS = MH_SPLIT_SEGS;
        const LAZY_INIT = MH_LAZY_INIT;
        const TWOLEVEL = MH_TWOLEVEL;
        const FORCE_FLAT = MH_FORCE_FLAT;
        const NOMULTIDEFS = MH_NOMULTIDEFS;
        const NOFIXPREBINDING = MH_NOFIXPREBINDING;
        const PREBINDABLE = MH_PREBINDABLE;
        const ALLMODSBOUND = MH_ALLMODSBOUND;
        const SUBSECTIONS_VIA_SYMBOLS = MH_SUBSECTIONS_VIA_SYMBOLS;
        const CANONICAL = MH_CANONICAL;
        const WEAK_DEFINES = MH_WEAK_DEFINES;
        const BINDS_TO_WEAK = MH_BINDS_TO_WEAK;
        const ALLOW_STACK_EXECUTION = MH_ALLOW_STACK_EXECUTION;
        const ROOT_SAFE = MH_ROOT_SAFE;
        const SETUID_SAFE = MH_SETUID_SAFE;
        const NO_REEXPORTED_DYLIBS = MH_NO_REEXPORTED_DYLIBS;
        const PIE = MH_PIE;
        const DEAD_STRIPPABLE_DYLIB = MH_DEAD_STRIPPABLE_DYLIB;
        const HAS_TLV_DESCRIPTORS = MH_HAS_TLV_DESCRIPTORS;
        const NO_HEAP_EXECUTION = MH_NO_HEAP_EXECUTION;
        const APP_EXTENSION_SAFE = MH_APP_EXTENSION_SAFE;
        const HAS_OBJC = MH_HAS_OBJC;
    }
}

const MACH_HEADER_FLAG_NAMES: &[(u32, &str)] = &[
    (MH_NOUNDEFS, "MH_NOUNDEFS"),
    (MH_INCRLINK, "MH_INCRLINK"),
    (MH_DYLDLINK, "MH_DYLDLINK"),
    (MH_BINDATLOAD, "MH_BINDATLOAD"),
    (MH_PREBOUND, "MH_PREBOUND"),
    (MH_SPLIT_SEGS, "MH_SPLIT_SEGS"),
    (MH_LAZY_INIT, "MH_LAZY_INIT"),
    (MH_TWOLEVEL, "MH_TWOLEVEL"),
    (MH_FORCE_FLAT, "MH_FORCE_FLAT"),
    (MH_NOMULTIDEFS, "MH_NOMULTIDEFS"),
    (MH_NOFIXPREBINDING, "MH_NOFIXPREBINDING"),
    (MH_PREBINDABLE, "MH_PREBINDABLE"),
    (MH_ALLMODSBOUND, "MH_ALLMODSBOUND"),
    (MH_SUBSECTIONS_VIA_SYMBOLS, "MH_SUBSECTIONS_VIA_SYMBOLS"),
    (MH_CANONICAL, "MH_CANONICAL"),
    (MH_WEAK_DEFINES, "MH_WEAK_DEFINES"),
    (MH_BINDS_TO_WEAK, "MH_BINDS_TO_WEAK"),
    (MH_ALLOW_STACK_EXECUTION, "MH_ALLOW_STACK_EXECUTION"),
    (MH_ROOT_SAFE, "MH_ROOT_SAFE"),
    (MH_SETUID_SAFE, "MH_SETUID_SAFE"),
    (MH_NO_REEXPORTED_DYLIBS, "MH_NO_REEXPORTED_DYLIBS"),
    (MH_PIE, "MH_PIE"),
    (MH_DEAD_STRIPPABLE_DYLIB, "MH_DEAD_STRIPPABLE_DYLIB"),
    (MH_HAS_TLV_DESCRIPTORS, "MH_HAS_TLV_DESCRIPTORS"),
    (MH_NO_HEAP_EXECUTION, "MH_NO_HEAP_EXECUTION"),
    (MH_APP_EXTENSION_SAFE, "MH_APP_EXTENSION_SAFE"),
    (MH_HAS_OBJC, "MH_HAS_OBJC"),
];

impl MachHeaderFlags {
    /// The names of all flags set in `self`, in declaration order.
    ///
    /// Bits without a known flag are ignored.
    pub fn names(self) -> Vec<&'static str> {
        MACH_HEADER_FLAG_NAMES
            .iter()
            .filter(|&&(bit, _)| self.bits() & bit == bit)
            .map(|&(_, name)| name)
            .collect()
    }
}

// After MacOS X 10.1 when a new load command is added that is required to be
// understood by the dynamic linker for the image to execute properly the
// LC_REQ_DYLD bit will be or'ed into the load command constant.  If the dynamic
// linker sees such a load command it it does not understand will issue a
// "unknown load command required for execution" error and refuse to use the
// image.  Other load commands without this bit that are not understood will
// simply be ignored.
//
pub const LC_REQ_DYLD: u32 = 0x80000000;

// Constants for the cmd field of all load commands, the type
pub const LC_SEGMENT: u32 = 0x1; /* segment of this file to be mapped */
pub const LC_SYMTAB: u32 = 0x2; /* link-edit stab symbol table info */
pub const LC_SYMSEG: u32 = 0x3; /* link-edit gdb symbol table info (obsolete) */
pub const LC_THREAD: u32 = 0x4; /* thread */
pub const LC_UNIXTHREAD: u32 = 0x5; /* unix thread (includes a stack) */
pub const LC_LOADFVMLIB: u32 = 0x6; /* load a specified fixed VM shared library */
pub const LC_IDFVMLIB: u32 = 0x7; /* fixed VM shared library identification */
pub const LC_IDENT: u32 = 0x8; /* object identification info (obsolete) */
pub const LC_FVMFILE: u32 = 0x9; /* fixed VM file inclusion (internal use) */
pub const LC_PREPAGE: u32 = 0xa; /* prepage command (internal use) */
pub const LC_DYSYMTAB: u32 = 0xb; /* dynamic link-edit symbol table info */
pub const LC_LOAD_DYLIB: u32 = 0xc; /* load a dynamically linked shared library */
pub const LC_ID_DYLIB: u32 = 0xd; /* dynamically linked shared lib ident */
pub const LC_LOAD_DYLINKER: u32 = 0xe; /* load a dynamic linker */
pub const LC_ID_DYLINKER: u32 = 0xf; /* dynamic linker identification */
pub const LC_PREBOUND_DYLIB: u32 = 0x10; /* modules prebound for a dynamically linked shared library */
pub const LC_ROUTINES: u32 = 0x11; /* image routines */
pub const LC_SUB_FRAMEWORK: u32 = 0x12; /* sub framework */
pub const LC_SUB_UMBRELLA: u32 = 0x13; /* sub umbrella */
pub const LC_SUB_CLIENT: u32 = 0x14; /* sub client */
pub const LC_SUB_LIBRARY: u32 = 0x15; /* sub library */
pub const LC_TWOLEVEL_HINTS: u32 = 0x16; /* two-level namespace lookup hints */
pub const LC_PREBIND_CKSUM: u32 = 0x17; /* prebind checksum */

// load a dynamically linked shared library that is allowed to be missing
// (all symbols are weak imported).
//
pub const LC_LOAD_WEAK_DYLIB: u32 = 0x18 | LC_REQ_DYLD;
pub const LC_SEGMENT_64: u32 = 0x19; /* 64-bit segment of this file to be mapped */
pub const LC_ROUTINES_64: u32 = 0x1a; /* 64-bit image routines */
pub const LC_UUID: u32 = 0x1b; /* the uuid */
pub const LC_RPATH: u32 = 0x1c | LC_REQ_DYLD; /* runpath additions */
pub const LC_CODE_SIGNATURE: u32 = 0x1d; /* local of code signature */
pub const LC_SEGMENT_SPLIT_INFO: u32 = 0x1e; /* local of info to split segments */
pub const LC_REEXPORT_DYLIB: u32 = 0x1f | LC_REQ_DYLD; /* load and re-export dylib */
pub const LC_LAZY_LOAD_DYLIB: u32 = 0x20; /* delay load of dylib until first use */
pub const LC_ENCRYPTION_INFO: u32 = 0x21; /* encrypted segment information */
pub const LC_DYLD_INFO: u32 = 0x22; /* compressed dyld information */
pub const LC_DYLD_INFO_ONLY: u32 = 0x22 | LC_REQ_DYLD; /* compressed dyld information only */
pub const LC_LOAD_UPWARD_DYLIB: u32 = 0x23 | LC_REQ_DYLD; /* load upward dylib */
pub const LC_VERSION_MIN_MACOSX: u32 = 0x24; /* build for MacOSX min OS version */
pub const LC_VERSION_MIN_IPHONEOS: u32 = 0x25; /* build for iPhoneOS min OS version */
pub const LC_FUNCTION_STARTS: u32 = 0x26; /* compressed table of function start addresses */
pub const LC_DYLD_ENVIRONMENT: u32 = 0x27; /* string for dyld to treat like environment variable */
pub const LC_MAIN: u32 = 0x28 | LC_REQ_DYLD; /* replacement for LC_UNIXTHREAD */
pub const LC_DATA_IN_CODE: u32 = 0x29; /* table of non-instructions in __text */
pub const LC_SOURCE_VERSION: u32 = 0x2A; /* source version used to build binary */
pub const LC_DYLIB_CODE_SIGN_DRS: u32 = 0x2B; /* Code signing DRs copied from linked dylibs */
pub const LC_ENCRYPTION_INFO_64: u32 = 0x2C; /* 64-bit encrypted segment information */
pub const LC_LINKER_OPTION: u32 = 0x2D; /* linker options in MH_OBJECT files */
pub const LC_LINKER_OPTIMIZATION_HINT: u32 = 0x2E; /* optimization hints in MH_OBJECT files */
pub const LC_VERSION_MIN_TVOS: u32 = 0x2F; /* build for AppleTV min OS version */
pub const LC_VERSION_MIN_WATCHOS: u32 = 0x30; /* build for Watch min OS version */
pub const LC_NOTE: u32 = 0x31; /* arbitrary data included within a Mach-O file */
pub const LC_BUILD_VERSION: u32 = 0x32; /* build for platform min OS version */
pub const LC_DYLD_EXPORTS_TRIE: u32 = 0x33 | LC_REQ_DYLD; /* used with linkedit_data_command, payload is trie */
pub const LC_DYLD_CHAINED_FIXUPS: u32 = 0x34 | LC_REQ_DYLD; /* used with linkedit_data_command */

/// The label of load commands missing from the table.
pub const LC_UNKNOWN: &str = "LC_UNKNOWN";

const LOAD_COMMAND_NAMES: &[(u32, &str)] = &[
    (LC_SEGMENT, "LC_SEGMENT"),
    (LC_SYMTAB, "LC_SYMTAB"),
    (LC_SYMSEG, "LC_SYMSEG"),
    (LC_THREAD, "LC_THREAD"),
    (LC_UNIXTHREAD, "LC_UNIXTHREAD"),
    (LC_LOADFVMLIB, "LC_LOADFVMLIB"),
    (LC_IDFVMLIB, "LC_IDFVMLIB"),
    (LC_IDENT, "LC_IDENT"),
    (LC_FVMFILE, "LC_FVMFILE"),
    (LC_PREPAGE, "LC_PREPAGE"),
    (LC_DYSYMTAB, "LC_DYSYMTAB"),
    (LC_LOAD_DYLIB, "LC_LOAD_DYLIB"),
    (LC_ID_DYLIB, "LC_ID_DYLIB"),
    (LC_LOAD_DYLINKER, "LC_LOAD_DYLINKER"),
    (LC_ID_DYLINKER, "LC_ID_DYLINKER"),
    (LC_PREBOUND_DYLIB, "LC_PREBOUND_DYLIB"),
    (LC_ROUTINES, "LC_ROUTINES"),
    (LC_SUB_FRAMEWORK, "LC_SUB_FRAMEWORK"),
    (LC_SUB_UMBRELLA, "LC_SUB_UMBRELLA"),
    (LC_SUB_CLIENT, "LC_SUB_CLIENT"),
    (LC_SUB_LIBRARY, "LC_SUB_LIBRARY"),
    (LC_TWOLEVEL_HINTS, "LC_TWOLEVEL_HINTS"),
    (LC_PREBIND_CKSUM, "LC_PREBIND_CKSUM"),
    (LC_LOAD_WEAK_DYLIB, "LC_LOAD_WEAK_DYLIB"),
    (LC_SEGMENT_64, "LC_SEGMENT_64"),
    (LC_ROUTINES_64, "LC_ROUTINES_64"),
    (LC_UUID, "LC_UUID"),
    (LC_RPATH, "LC_RPATH"),
    (LC_CODE_SIGNATURE, "LC_CODE_SIGNATURE"),
    (LC_SEGMENT_SPLIT_INFO, "LC_SEGMENT_SPLIT_INFO"),
    (LC_REEXPORT_DYLIB, "LC_REEXPORT_DYLIB"),
    (LC_LAZY_LOAD_DYLIB, "LC_LAZY_LOAD_DYLIB"),
    (LC_ENCRYPTION_INFO, "LC_ENCRYPTION_INFO"),
    (LC_DYLD_INFO, "LC_DYLD_INFO"),
    (LC_DYLD_INFO_ONLY, "LC_DYLD_INFO_ONLY"),
    (LC_LOAD_UPWARD_DYLIB, "LC_LOAD_UPWARD_DYLIB"),
    (LC_VERSION_MIN_MACOSX, "LC_VERSION_MIN_MACOSX"),
    (LC_VERSION_MIN_IPHONEOS, "LC_VERSION_MIN_IPHONEOS"),
    (LC_FUNCTION_STARTS, "LC_FUNCTION_STARTS"),
    (LC_DYLD_ENVIRONMENT, "LC_DYLD_ENVIRONMENT"),
    (LC_MAIN, "LC_MAIN"),
    (LC_DATA_IN_CODE, "LC_DATA_IN_CODE"),
    (LC_SOURCE_VERSION, "LC_SOURCE_VERSION"),
    (LC_DYLIB_CODE_SIGN_DRS, "LC_DYLIB_CODE_SIGN_DRS"),
    (LC_ENCRYPTION_INFO_64, "LC_ENCRYPTION_INFO_64"),
    (LC_LINKER_OPTION, "LC_LINKER_OPTION"),
    (LC_LINKER_OPTIMIZATION_HINT, "LC_LINKER_OPTIMIZATION_HINT"),
    (LC_VERSION_MIN_TVOS, "LC_VERSION_MIN_TVOS"),
    (LC_VERSION_MIN_WATCHOS, "LC_VERSION_MIN_WATCHOS"),
    (LC_NOTE, "LC_NOTE"),
    (LC_BUILD_VERSION, "LC_BUILD_VERSION"),
    (LC_DYLD_EXPORTS_TRIE, "LC_DYLD_EXPORTS_TRIE"),
    (LC_DYLD_CHAINED_FIXUPS, "LC_DYLD_CHAINED_FIXUPS"),
];

lazy_static! {
    static ref LOAD_COMMANDS: HashMap<u32, &'static str> = LOAD_COMMAND_NAMES.iter().cloned().collect();
}

/// The symbolic name of a load command, `LC_UNKNOWN` for unrecognized tags.
pub fn cmd_name(cmd: u32) -> &'static str {
    LOAD_COMMANDS.get(&cmd).cloned().unwrap_or(LC_UNKNOWN)
}

pub fn is_known_cmd(cmd: u32) -> bool {
    LOAD_COMMANDS.contains_key(&cmd)
}

/// Map a cpu subtype to its name.
///
/// The raw value is matched, a subtype with capability bits set is not recognized.
pub fn cpu_subtype_name(subtype: cpu_subtype_t) -> Option<&'static str> {
    match subtype {
        CPU_SUBTYPE_ARM64_ALL => Some("CPU_SUBTYPE_ARM64_ALL"),
        CPU_SUBTYPE_ARM64_V8 => Some("CPU_SUBTYPE_ARM64_V8"),
        CPU_SUBTYPE_X86_64_ALL => Some("CPU_SUBTYPE_X86_64_ALL"),
        CPU_SUBTYPE_X86_64_H => Some("CPU_SUBTYPE_X86_64_H"),
        CPU_SUBTYPE_ARM_V7 => Some("CPU_SUBTYPE_ARM_V7"),
        CPU_SUBTYPE_ARM_V7S => Some("CPU_SUBTYPE_ARM_V7S"),
        _ => None,
    }
}

pub fn cpu_type_name(cputype: cpu_type_t) -> Option<&'static str> {
    match cputype {
        CPU_TYPE_ANY => Some("ANY"),
        CPU_TYPE_X86 => Some("X86"),
        CPU_TYPE_X86_64 => Some("X86_64"),
        CPU_TYPE_ARM => Some("ARM"),
        CPU_TYPE_ARM64 => Some("ARM64"),
        CPU_TYPE_POWERPC => Some("PPC"),
        CPU_TYPE_POWERPC64 => Some("PPC64"),
        _ => None,
    }
}

pub fn file_type_name(filetype: u32) -> Option<&'static str> {
    match filetype {
        MH_OBJECT => Some("OBJECT"),
        MH_EXECUTE => Some("EXECUTE"),
        MH_FVMLIB => Some("FVMLIB"),
        MH_CORE => Some("CORE"),
        MH_PRELOAD => Some("PRELOAD"),
        MH_DYLIB => Some("DYLIB"),
        MH_DYLINKER => Some("DYLINKER"),
        MH_BUNDLE => Some("BUNDLE"),
        MH_DYLIB_STUB => Some("DYLIB_STUB"),
        MH_DSYM => Some("DSYM"),
        MH_KEXT_BUNDLE => Some("KEXT_BUNDLE"),
        _ => None,
    }
}

// Constants for the flags field of the segment_command

/// the file contents for this segment is for the high part of the VM space,
/// the low part is zero filled (for stacks in core files)
pub const SG_HIGHVM: u32 = 0x1;
/// this segment is the VM that is allocated by a fixed VM library,
/// for overlap checking in the link editor
pub const SG_FVMLIB: u32 = 0x2;
/// this segment has nothing that was relocated in it and nothing relocated to it,
/// that is it maybe safely replaced without relocation
pub const SG_NORELOC: u32 = 0x4;
/// This segment is protected.  If the segment starts at file offset 0,
/// the first page of the segment is not protected.
/// All other pages of the segment are protected.
pub const SG_PROTECTED_VERSION_1: u32 = 0x8;
/// This segment is made read-only after fixups
pub const SG_READ_ONLY: u32 = 0x10;

bitflags! {
    pub struct SegmentFlags: u32 {
        const HIGHVM = SG_HIGHVM;
        const FVMLIB = SG_FVMLIB;
        const NORELOC = SG_NORELOC;
        const PROTECTED_VERSION_1 = SG_PROTECTED_VERSION_1;
        const READ_ONLY = SG_READ_ONLY;
    }
}

pub const VM_PROT_NONE: vm_prot_t = 0x00;
pub const VM_PROT_READ: vm_prot_t = 0x01;
pub const VM_PROT_WRITE: vm_prot_t = 0x02;
pub const VM_PROT_EXECUTE: vm_prot_t = 0x04;

bitflags! {
    /// Virtual memory protection of a segment.
    pub struct VmProt: vm_prot_t {
        const READ = VM_PROT_READ;
        const WRITE = VM_PROT_WRITE;
        const EXECUTE = VM_PROT_EXECUTE;
    }
}

impl VmProt {
    /// Render as `rwx` with `-` for missing permissions.
    pub fn to_rwx(self) -> String {
        [(VmProt::READ, 'r'), (VmProt::WRITE, 'w'), (VmProt::EXECUTE, 'x')]
            .iter()
            .map(|&(prot, c)| if self.contains(prot) { c } else { '-' })
            .collect()
    }
}

// The flags field of a section structure is separated into two parts a section
// type and section attributes.
//

/// 256 section types
pub const SECTION_TYPE: u32 = 0x000000ff;
/// 24 section attributes
pub const SECTION_ATTRIBUTES: u32 = 0xffffff00;

/// regular section
pub const S_REGULAR: u32 = 0x0;
/// zero fill on demand section
pub const S_ZEROFILL: u32 = 0x1;
/// section with only literal C strings
pub const S_CSTRING_LITERALS: u32 = 0x2;
/// section with only 4 byte literals
pub const S_4BYTE_LITERALS: u32 = 0x3;
/// section with only 8 byte literals
pub const S_8BYTE_LITERALS: u32 = 0x4;
/// section with only pointers to literals
pub const S_LITERAL_POINTERS: u32 = 0x5;
/// section with only non-lazy symbol pointers
pub const S_NON_LAZY_SYMBOL_POINTERS: u32 = 0x6;
/// section with only lazy symbol pointers
pub const S_LAZY_SYMBOL_POINTERS: u32 = 0x7;
/// section with only symbol stubs, byte size of stub in the reserved2 field
pub const S_SYMBOL_STUBS: u32 = 0x8;
/// section with only function pointers for initialization
pub const S_MOD_INIT_FUNC_POINTERS: u32 = 0x9;
/// section with only function pointers for termination
pub const S_MOD_TERM_FUNC_POINTERS: u32 = 0xa;
/// section contains symbols that are to be coalesced
pub const S_COALESCED: u32 = 0xb;
/// zero fill on demand section (that can be larger than 4 gigabytes)
pub const S_GB_ZEROFILL: u32 = 0xc;
/// section with only pairs of function pointers for interposing
pub const S_INTERPOSING: u32 = 0xd;
/// section with only 16 byte literals
pub const S_16BYTE_LITERALS: u32 = 0xe;
/// section contains DTrace Object Format
pub const S_DTRACE_DOF: u32 = 0xf;
/// section with only lazy symbol pointers to lazy loaded dylibs
pub const S_LAZY_DYLIB_SYMBOL_POINTERS: u32 = 0x10;
/// template of initial values for TLVs
pub const S_THREAD_LOCAL_REGULAR: u32 = 0x11;
/// template of initial values for TLVs
pub const S_THREAD_LOCAL_ZEROFILL: u32 = 0x12;
/// TLV descriptors
pub const S_THREAD_LOCAL_VARIABLES: u32 = 0x13;
/// pointers to TLV descriptors
pub const S_THREAD_LOCAL_VARIABLE_POINTERS: u32 = 0x14;
/// functions to call to initialize TLV values
pub const S_THREAD_LOCAL_INIT_FUNCTION_POINTERS: u32 = 0x15;

bitflags! {
    /// Attributes part of the section flags.
    pub struct SectionAttributes: u32 {
        /// section contains only true machine instructions
        const S_ATTR_PURE_INSTRUCTIONS = 0x80000000;
        /// section contains coalesced symbols that are not to be in a ranlib table of contents
        const S_ATTR_NO_TOC = 0x40000000;
        /// ok to strip static symbols in this section in files with the MH_DYLDLINK flag
        const S_ATTR_STRIP_STATIC_SYMS = 0x20000000;
        /// no dead stripping
        const S_ATTR_NO_DEAD_STRIP = 0x10000000;
        /// blocks are live if they reference live blocks
        const S_ATTR_LIVE_SUPPORT = 0x08000000;
        /// Used with i386 code stubs written on by dyld
        const S_ATTR_SELF_MODIFYING_CODE = 0x04000000;
        /// a debug section
        const S_ATTR_DEBUG = 0x02000000;
        /// section contains some machine instructions
        const S_ATTR_SOME_INSTRUCTIONS = 0x00000400;
        /// section has external relocation entries
        const S_ATTR_EXT_RELOC = 0x00000200;
        /// section has local relocation entries
        const S_ATTR_LOC_RELOC = 0x00000100;
    }
}

// The names of segments and sections in them are mostly meaningless to the
// link-editor.  But there are few things to support traditional UNIX
// executables that require the link-editor and assembler to use some names
// agreed upon by convention.
//

/// the pagezero segment which has no protections and catches NULL references for MH_EXECUTE files
pub const SEG_PAGEZERO: &str = "__PAGEZERO";
/// the tradition UNIX text segment
pub const SEG_TEXT: &str = "__TEXT";
/// the real text part of the text section no headers, and no padding
pub const SECT_TEXT: &str = "__text";
/// the tradition UNIX data segment
pub const SEG_DATA: &str = "__DATA";
/// the real initialized data section no padding, no bss overlap
pub const SECT_DATA: &str = "__data";
/// the real uninitialized data section no padding
pub const SECT_BSS: &str = "__bss";
/// the section common symbols are allocated in by the link editor
pub const SECT_COMMON: &str = "__common";
/// the segment containing all structs created and maintained by the link editor.
pub const SEG_LINKEDIT: &str = "__LINKEDIT";
