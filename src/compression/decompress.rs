use std::fs;

use log::{debug, error, info, trace};

use super::compress::write_output;
use super::container::{Container, TableNode};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffError, Result};
use crate::tools::cli::{restored_path, HuffOpts};
use crate::tools::freq_count::END_OF_FILE;
use crate::tools::timer::Timer;

/// Decode a whole container. Returns the stored file name (lossily converted for display) and
/// the original data.
pub fn decompress_bytes(data: &[u8]) -> Result<(String, Vec<u8>)> {
    let (name, out) = decode(data, &mut Timer::new())?;
    Ok((String::from_utf8_lossy(&name).into_owned(), out))
}

/// Parse and unpack a container held in memory, marking the timer as we go. The stored name is
/// returned as raw bytes.
pub fn decode(data: &[u8], timer: &mut Timer) -> Result<(Vec<u8>, Vec<u8>)> {
    let container = Container::from_bytes(data)?;
    timer.mark("parse");

    let out = unpack(&container.payload, &container.nodes)?;
    timer.mark("unpack");

    Ok((container.filename, out))
}

/// Walk the tree from the root, one payload bit at a time (lowest bit of each byte first).
/// A literal leaf emits its byte and sends us back to the root without using up a bit. The
/// sentinel leaf ends decoding; anything after it in the payload is padding.
///
/// The nodes must have passed the container checks: children in range, and a leaf root only
/// if it is the sentinel.
pub fn unpack(payload: &[u8], nodes: &[TableNode]) -> Result<Vec<u8>> {
    let mut br = BitReader::new(payload);
    // Guess at the output size for the initial allocation.
    let mut out = Vec::with_capacity(payload.len() * 2);
    let mut position = 0;

    loop {
        let node = &nodes[position];
        match node.glyph {
            Some(END_OF_FILE) => break,
            Some(glyph) => {
                out.push(glyph as u8);
                position = 0;
            }
            None => {
                let bit = match br.bool_bit() {
                    Some(bit) => bit,
                    None => {
                        error!(
                            "Payload ran out at {} before the end of data marker.",
                            br.loc()
                        );
                        return Err(HuffError::format(
                            "payload ended before the end of data marker",
                        ));
                    }
                };
                // Checked when the container was parsed
                let next = if bit { node.right } else { node.left };
                position = next.ok_or_else(|| {
                    HuffError::format(format!("merge node {} is missing a child", position))
                })?;
            }
        }
    }

    let padding = payload.len().saturating_sub(br.bytes_used());
    if padding > 0 {
        debug!("Ignored {} bytes after the end of data marker.", padding);
    }
    trace!("\rDecoded {} bytes, stopped at {}.", out.len(), br.loc());
    Ok(out)
}

/// Decompress the container named in opts, writing the file under its stored name.
pub fn decompress(opts: &HuffOpts, timer: &mut Timer) -> Result<()> {
    let input = opts.input()?;
    let data = fs::read(input)?;
    info!("Read {} bytes from {}.", data.len(), input.display());
    timer.mark("io");

    let (stored, out) = decode(&data, timer)?;
    info!("Container holds {:?}.", String::from_utf8_lossy(&stored));

    let target = match &opts.output_file {
        Some(name) => name.clone(),
        None => restored_path(input, &stored),
    };
    write_output(opts, &target, &out)?;
    timer.mark("io");

    info!("Decompressed {} bytes to {} bytes.", data.len(), out.len());
    Ok(())
}

/// Decode the container named in opts and report, without writing anything.
pub fn verify(opts: &HuffOpts, timer: &mut Timer) -> Result<()> {
    let input = opts.input()?;
    let data = fs::read(input)?;
    timer.mark("io");

    let (stored, out) = decode(&data, timer)?;
    info!(
        "{}: ok ({:?}, {} bytes).",
        input.display(),
        String::from_utf8_lossy(&stored),
        out.len()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{decompress, decompress_bytes, unpack, verify};
    use crate::compression::compress::{compress, compress_bytes};
    use crate::compression::container::{Container, TableNode};
    use crate::error::HuffError;
    use crate::tools::cli::HuffOpts;
    use crate::tools::freq_count::END_OF_FILE;
    use crate::tools::timer::Timer;
    use std::fs;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let packed = compress_bytes("data.bin", data).unwrap();
        let (name, out) = decompress_bytes(&packed).unwrap();
        assert_eq!(name, "data.bin");
        out
    }

    /// Small xorshift so the "random" data is the same every run.
    fn noise(len: usize, mut seed: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                seed as u8
            })
            .collect()
    }

    #[test]
    fn empty_round_trip_test() {
        assert_eq!(round_trip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn single_byte_round_trip_test() {
        assert_eq!(round_trip("AAAA".as_bytes()), "AAAA".as_bytes());
        assert_eq!(round_trip("A".as_bytes()), "A".as_bytes());
    }

    #[test]
    fn tie_round_trip_test() {
        assert_eq!(round_trip("ABAB".as_bytes()), "ABAB".as_bytes());
        assert_eq!(round_trip("ABCABC".as_bytes()), "ABCABC".as_bytes());
    }

    #[test]
    fn text_round_trip_test() {
        let text = "It was the best of times, it was the worst of times, it was the age of wisdom, \
                    it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity."
            .repeat(20);
        assert_eq!(round_trip(text.as_bytes()), text.as_bytes());
    }

    #[test]
    fn binary_round_trip_test() {
        let all = (0..=255_u8).collect::<Vec<u8>>();
        assert_eq!(round_trip(&all), all);

        let data = noise(50_000, 0x2545_f491_4f6c_dd1d);
        assert_eq!(round_trip(&data), data);

        // Skewed weights make for long codes
        let skewed = (0..20_u8)
            .flat_map(|b| std::iter::repeat(b).take(1 << (b / 2)))
            .collect::<Vec<u8>>();
        assert_eq!(round_trip(&skewed), skewed);
    }

    #[test]
    fn every_length_round_trip_test() {
        // Exercise every padding length of the last byte
        let data = noise(64, 7);
        for len in 0..data.len() {
            assert_eq!(round_trip(&data[..len]), &data[..len]);
        }
    }

    #[test]
    fn sentinel_never_emitted_test() {
        // Only bytes that were in the input come back; nothing extra for the sentinel
        let data = [0_u8, 255, 0, 255, 1];
        let out = round_trip(&data);
        assert_eq!(out.len(), data.len());
    }

    #[test]
    fn stops_at_sentinel_test() {
        // A = "1", EOF = "0": 1,1,1,1,0 then garbage that must be ignored
        let nodes = vec![
            TableNode { glyph: None, left: Some(1), right: Some(2) },
            TableNode { glyph: Some(END_OF_FILE), left: None, right: None },
            TableNode { glyph: Some(b'A' as u16), left: None, right: None },
        ];
        assert_eq!(unpack(&[0x0f, 0xff, 0xff], &nodes).unwrap(), "AAAA".as_bytes());
        assert_eq!(unpack(&[0xef], &nodes).unwrap(), "AAAA".as_bytes());
    }

    #[test]
    fn sentinel_root_test() {
        let nodes = vec![TableNode { glyph: Some(END_OF_FILE), left: None, right: None }];
        assert_eq!(unpack(&[], &nodes).unwrap(), Vec::<u8>::new());
        assert_eq!(unpack(&[0], &nodes).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn truncated_payload_test() {
        let mut packed = compress_bytes("t", "hello hello hello".as_bytes()).unwrap();
        packed.truncate(packed.len() - 1);
        assert!(matches!(decompress_bytes(&packed), Err(HuffError::Format(_))));
    }

    #[test]
    fn oversized_node_count_test() {
        let mut bytes = vec![1, 0, 0, 0, b'x'];
        bytes.extend_from_slice(&600_u32.to_le_bytes());
        bytes.extend_from_slice(&[0xff; 12]);
        assert!(matches!(decompress_bytes(&bytes), Err(HuffError::Format(_))));
    }

    #[test]
    fn node_count_identity_test() {
        for data in ["", "AAAA", "ABAB", "abracadabra"] {
            let c = Container::from_bytes(&compress_bytes("n", data.as_bytes()).unwrap()).unwrap();
            let glyphs = c.nodes.iter().filter(|n| n.glyph.is_some()).count();
            assert_eq!(c.nodes.len(), 2 * glyphs - 1);
        }
    }

    #[test]
    fn file_round_trip_test() {
        let dir = std::env::temp_dir().join(format!("huff_decompress_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("notes.md");
        let original = noise(4096, 99);
        fs::write(&input, &original).unwrap();

        let mut opts = HuffOpts::new();
        opts.file = Some(input.clone());
        compress(&opts, &mut Timer::new()).unwrap();

        // Decompress next to the container under an explicit name
        let mut opts = HuffOpts::new();
        opts.file = Some(dir.join("notes.huf"));
        verify(&opts, &mut Timer::new()).unwrap();
        opts.output_file = Some(dir.join("restored.md"));
        decompress(&opts, &mut Timer::new()).unwrap();
        assert_eq!(fs::read(dir.join("restored.md")).unwrap(), original);

        // The stored name already exists, so the derived target is refused without --force
        opts.output_file = None;
        let again = decompress(&opts, &mut Timer::new());
        assert!(matches!(again, Err(HuffError::OutputExists(_))));
        opts.force_overwrite = true;
        decompress(&opts, &mut Timer::new()).unwrap();
        assert_eq!(fs::read(&input).unwrap(), original);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn raw_name_round_trip_test() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = std::env::temp_dir().join(format!("huff_raw_restore_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join(OsStr::from_bytes(b"r\xe9sum\xe9"));
        fs::write(&input, "curriculum").unwrap();

        let mut opts = HuffOpts::new();
        opts.file = Some(input.clone());
        compress(&opts, &mut Timer::new()).unwrap();
        fs::remove_file(&input).unwrap();

        // Restored under the exact bytes it was stored with
        opts.file = Some(dir.join(OsStr::from_bytes(b"r\xe9sum\xe9.huf")));
        decompress(&opts, &mut Timer::new()).unwrap();
        assert_eq!(fs::read(&input).unwrap(), b"curriculum");

        fs::remove_dir_all(&dir).unwrap();
    }
}
