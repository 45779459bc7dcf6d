//! Error types shared by the shell core.
//!
//! Guard-not-met conditions in the boot sequence are not errors and never
//! show up here. What does show up is a broken contract between the core and
//! the emulator engine (bad framebuffer geometry, a poisoned lock), which the
//! host is expected to treat as fatal.

/// Framebuffer geometry that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Visible width or height is zero.
    EmptyRegion,

    /// Source or destination buffer has zero length.
    EmptyBuffer,

    /// Pixel size other than 3 (BGR) or 4 (BGRA) bytes.
    UnsupportedPixelSize(usize),

    /// Pitch is smaller than one visible row.
    PitchTooSmall { pitch: usize, row_bytes: usize },

    /// Source holds fewer bytes than the visible region needs.
    SourceTooShort { needed: usize, actual: usize },

    /// Destination holds fewer bytes than the RGBA copy needs.
    DestinationTooShort { needed: usize, actual: usize },

    /// Visible region does not fit inside the backing canvas.
    RegionOutOfBounds {
        visible: (usize, usize),
        canvas: (usize, usize),
    },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRegion => write!(f, "visible region is empty"),
            Self::EmptyBuffer => write!(f, "pixel buffer is empty"),
            Self::UnsupportedPixelSize(bpp) => {
                write!(f, "unsupported pixel size: {bpp} bytes")
            }
            Self::PitchTooSmall { pitch, row_bytes } => {
                write!(f, "pitch {pitch} is smaller than a visible row ({row_bytes} bytes)")
            }
            Self::SourceTooShort { needed, actual } => {
                write!(f, "source buffer: expected {needed} bytes, got {actual}")
            }
            Self::DestinationTooShort { needed, actual } => {
                write!(f, "destination buffer: expected {needed} bytes, got {actual}")
            }
            Self::RegionOutOfBounds { visible, canvas } => write!(
                f,
                "visible region {}x{} exceeds canvas {}x{}",
                visible.0, visible.1, canvas.0, canvas.1
            ),
        }
    }
}

impl std::error::Error for FrameError {}

/// Errors surfaced by the scene layer to its host.
#[derive(Debug)]
pub enum ShellError {
    /// A broken invariant between the core and the engine. Not recoverable.
    Fatal(FrameError),

    /// A shared resource lock was poisoned by a panicking producer thread.
    LockPoisoned(&'static str),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal(e) => write!(f, "fatal framebuffer error: {e}"),
            Self::LockPoisoned(name) => write!(f, "{name} lock poisoned"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fatal(e) => Some(e),
            Self::LockPoisoned(_) => None,
        }
    }
}

impl From<FrameError> for ShellError {
    fn from(e: FrameError) -> Self {
        Self::Fatal(e)
    }
}
