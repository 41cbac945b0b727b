use std::fmt;
use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::consts::cpu_subtype_t;

/// The decoding step that was reading when the byte source failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Header,
    CommandHeader,
    Segment,
    Section,
    Payload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Step::Header => "header",
            Step::CommandHeader => "command header",
            Step::Segment => "segment",
            Step::Section => "section",
            Step::Payload => "payload",
        })
    }
}

/// The cpu subtype is not one of the supported subtypes.
///
/// It doesn't abort decoding, the `MachFile` keeps it next to the header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("cpu subtype 0x{0:x} not recognized or supported.")]
pub struct UnknownCpuSubType(pub cpu_subtype_t);

#[derive(Debug, Error)]
pub enum MachError {
    #[error("fail to do I/O operations, {0}.")]
    IoError(#[from] io::Error),
    #[error("fail to read {step}, {source}.")]
    ReadError {
        step: Step,
        #[source]
        source: io::Error,
    },
    #[error("load command #{index} ({cmd:#x}) has invalid size {cmdsize}.")]
    InvalidCommandSize { index: usize, cmd: u32, cmdsize: u32 },
    #[error("unknown file format 0x{0:x}.")]
    UnknownMagic(u32),
    #[error(transparent)]
    UnknownCpuSubType(#[from] UnknownCpuSubType),
}

impl MachError {
    /// The step that failed to read, if this is an I/O failure.
    pub fn step(&self) -> Option<Step> {
        match *self {
            MachError::ReadError { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Whether the byte source ended before the step was complete.
    pub fn is_truncated(&self) -> bool {
        match *self {
            MachError::ReadError { ref source, .. } => source.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

pub type Result<T> = StdResult<T, MachError>;

/// Attach the current decoding step to an I/O failure.
pub trait ReadStep<T> {
    fn step(self, step: Step) -> Result<T>;
}

impl<T> ReadStep<T> for io::Result<T> {
    fn step(self, step: Step) -> Result<T> {
        self.map_err(|source| MachError::ReadError { step, source })
    }
}
