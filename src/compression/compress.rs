use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};

use super::container::{Container, TableNode};
use crate::bitstream::bitpacker::pack;
use crate::error::{HuffError, Result};
use crate::huffman_coding::candidate_table::CandidateTable;
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::heap_tree::HuffmanTree;
use crate::tools::cli::{compressed_path, stored_name, HuffOpts, Output};
use crate::tools::freq_count::freqs;
use crate::tools::timer::Timer;

/// Compress `data` into a container that remembers `filename`.
pub fn compress_bytes(filename: &str, data: &[u8]) -> Result<Vec<u8>> {
    encode(filename.as_bytes(), data, &mut Timer::new())
}

/// Run every compression stage over data already in memory, marking the timer as we go.
pub fn encode(filename: &[u8], data: &[u8], timer: &mut Timer) -> Result<Vec<u8>> {
    let table = CandidateTable::from_freqs(&freqs(data));
    info!("Found {} distinct glyphs (sentinel included).", table.glyph_count());
    timer.mark("freqs");

    let tree = HuffmanTree::build(table);
    debug!(
        "Tree holds {} nodes for {} glyphs.",
        tree.node_count(),
        tree.glyph_count()
    );
    timer.mark("tree");

    let codes = CodeTable::from_tree(&tree);
    timer.mark("codes");

    let payload = pack(data, &codes);
    timer.mark("pack");

    let container = Container {
        filename: filename.to_vec(),
        nodes: tree.nodes().iter().map(TableNode::from).collect(),
        payload,
    };
    container.to_bytes()
}

/// Compress the input file named in opts.
pub fn compress(opts: &HuffOpts, timer: &mut Timer) -> Result<()> {
    let input = opts.input()?;

    // Only the name goes into the container, not the directory
    let stored = stored_name(input);

    let data = fs::read(input)?;
    info!("Read {} bytes from {}.", data.len(), input.display());
    timer.mark("io");

    let out = encode(&stored, &data, timer)?;

    let target = match &opts.output_file {
        Some(name) => name.clone(),
        None => compressed_path(input),
    };
    write_output(opts, &target, &out)?;
    timer.mark("io");

    info!(
        "Compressed {} bytes to {} bytes ({:.1}%).",
        data.len(),
        out.len(),
        ratio(out.len(), data.len())
    );
    Ok(())
}

/// Send `data` to stdout or to `target`, refusing to replace an existing file unless forced.
pub(crate) fn write_output(opts: &HuffOpts, target: &Path, data: &[u8]) -> Result<()> {
    match opts.output {
        Output::Stdout => {
            let mut out = io::stdout().lock();
            out.write_all(data)?;
            out.flush()?;
            debug!("Wrote {} bytes to stdout.", data.len());
        }
        Output::File => {
            if target.exists() && !opts.force_overwrite {
                return Err(HuffError::OutputExists(target.display().to_string()));
            }
            fs::write(target, data)?;
            info!("Wrote {} bytes to {}.", data.len(), target.display());
        }
    }
    Ok(())
}

/// Output size as a percentage of the input size.
fn ratio(out: usize, input: usize) -> f64 {
    if input == 0 {
        return 0.0;
    }
    out as f64 * 100.0 / input as f64
}

#[cfg(test)]
mod test {
    use super::{compress, compress_bytes};
    use crate::compression::container::Container;
    use crate::error::HuffError;
    use crate::tools::cli::HuffOpts;
    use crate::tools::timer::Timer;
    use std::fs;

    #[test]
    fn single_byte_container_test() {
        let bytes = compress_bytes("a.txt", "AAAA".as_bytes()).unwrap();
        let c = Container::from_bytes(&bytes).unwrap();
        assert_eq!(c.filename, b"a.txt");
        assert_eq!(c.nodes.len(), 3);
        assert_eq!(c.payload, vec![0x0f]);
    }

    #[test]
    fn deterministic_test() {
        let data = "she sells sea shells by the sea shore".as_bytes();
        let first = compress_bytes("s.txt", data).unwrap();
        let second = compress_bytes("s.txt", data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_test() {
        let c = Container::from_bytes(&compress_bytes("empty", &[]).unwrap()).unwrap();
        assert_eq!(c.nodes.len(), 1);
        assert_eq!(c.payload, vec![0]);
    }

    #[test]
    fn compress_file_test() {
        let dir = std::env::temp_dir().join(format!("huff_compress_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("poem.txt");
        fs::write(&input, "so much depends upon a red wheel barrow").unwrap();

        let mut opts = HuffOpts::new();
        opts.file = Some(input.clone());
        compress(&opts, &mut Timer::new()).unwrap();

        let out = dir.join("poem.huf");
        let c = Container::from_bytes(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(c.filename, b"poem.txt");

        // Second run must not clobber the first without --force
        let again = compress(&opts, &mut Timer::new());
        assert!(matches!(again, Err(HuffError::OutputExists(_))));
        opts.force_overwrite = true;
        compress(&opts, &mut Timer::new()).unwrap();

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_test() {
        let mut opts = HuffOpts::new();
        opts.file = Some("/no/such/dir/huff_missing.txt".into());
        let result = compress(&opts, &mut Timer::new());
        assert!(matches!(result, Err(HuffError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn raw_file_name_test() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = std::env::temp_dir().join(format!("huff_raw_name_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let raw: &[u8] = b"na\xefve.txt";
        let input = dir.join(OsStr::from_bytes(raw));
        fs::write(&input, "plain text").unwrap();

        let mut opts = HuffOpts::new();
        opts.file = Some(input.clone());
        compress(&opts, &mut Timer::new()).unwrap();

        let out = dir.join(OsStr::from_bytes(b"na\xefve.huf"));
        let c = Container::from_bytes(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(c.filename, raw.to_vec());

        fs::remove_dir_all(&dir).unwrap();
    }
}
