//! Output sample formats.

/*
The Mix Domain
==============

The mixer works in a signed 8-bit "level" domain: a waveform amplitude of ±1
times a volume of at most 127 lands inside -128..=127. Everything outside is
hard-clamped (never wrapped) before being converted to whatever the audio
device wants:

    format   silence   level -128   level 127
    i8           0        -128          127
    u8         128           0          255
    i16          0      -32768        32512
    f32        0.0        -1.0     0.992...

Conversions are exact shifts/offsets so a clamped level round-trips.
*/

/// Lowest level the mixer emits.
pub const LEVEL_MIN: i32 = i8::MIN as i32;
/// Highest level the mixer emits.
pub const LEVEL_MAX: i32 = i8::MAX as i32;

/// Clamp an accumulated level into the output range.
#[inline]
pub fn clamp_level(level: i32) -> i32 {
    level.clamp(LEVEL_MIN, LEVEL_MAX)
}

/// A sample type the mixer can write into.
pub trait OutputSample: Copy + Send + 'static {
    /// Value of a silent sample (the format midpoint).
    const SILENCE: Self;

    /// Convert a level already clamped to `LEVEL_MIN..=LEVEL_MAX`.
    fn from_level(level: i32) -> Self;

    /// Inverse of [`OutputSample::from_level`], for meters and scopes.
    fn to_level(self) -> i32;

    /// Normalised `-1.0..1.0` view of the sample.
    #[inline]
    fn to_unit(self) -> f32 {
        self.to_level() as f32 / 128.0
    }
}

impl OutputSample for i8 {
    const SILENCE: Self = 0;

    #[inline]
    fn from_level(level: i32) -> Self {
        clamp_level(level) as i8
    }

    #[inline]
    fn to_level(self) -> i32 {
        self as i32
    }
}

impl OutputSample for u8 {
    const SILENCE: Self = 128;

    #[inline]
    fn from_level(level: i32) -> Self {
        (clamp_level(level) + 128) as u8
    }

    #[inline]
    fn to_level(self) -> i32 {
        self as i32 - 128
    }
}

impl OutputSample for i16 {
    const SILENCE: Self = 0;

    #[inline]
    fn from_level(level: i32) -> Self {
        (clamp_level(level) << 8) as i16
    }

    #[inline]
    fn to_level(self) -> i32 {
        (self as i32) >> 8
    }
}

impl OutputSample for f32 {
    const SILENCE: Self = 0.0;

    #[inline]
    fn from_level(level: i32) -> Self {
        clamp_level(level) as f32 / 128.0
    }

    #[inline]
    fn to_level(self) -> i32 {
        (self * 128.0).round() as i32
    }
}
