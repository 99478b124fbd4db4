/// Number of glyphs: the 256 byte values plus the end-of-stream sentinel.
pub const GLYPH_COUNT: usize = 257;
/// Glyph value reserved to mark the end of the data.
pub const END_OF_FILE: u16 = 256;

/// Returns a frequency count of the input data, indexed by glyph. The end-of-stream sentinel
/// is always counted exactly once, even for empty input.
pub fn freqs(data: &[u8]) -> [u64; GLYPH_COUNT] {
    let mut freqs = [0_u64; GLYPH_COUNT];
    data.iter().for_each(|&el| freqs[el as usize] += 1);
    freqs[END_OF_FILE as usize] += 1;
    freqs
}
