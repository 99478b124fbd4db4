use log::{debug, trace};

use crate::huffman_coding::code_table::{Code, CodeTable};
use crate::tools::freq_count::END_OF_FILE;

/// Packs variable length codes into bytes, low bit first.
pub struct BitPacker {
    pub output: Vec<u8>,
    /// Bits waiting to be written, oldest in the lowest bit.
    queue: u128,
    /// Count of valid bits in the queue (always below 8 between calls).
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of size specified. Call flush() to
    /// write out any partial byte before reading the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Move every complete byte from the queue to the output.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            self.output.push(self.queue as u8); //push the low byte out
            self.queue >>= 8;
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Put one code on the stream. The queue never holds more than 7 bits between calls, so any
    /// code shorter than 121 bits fits.
    pub fn out_code(&mut self, code: Code) {
        debug_assert!(code.len as u32 + (self.q_bits as u32) <= 128);
        self.queue |= code.bits << self.q_bits;
        self.q_bits += code.len;
        self.write_stream();
    }

    /// Flushes the remaining bits (1-7) from the queue. The unused high bits of the last byte are zero.
    pub fn flush(&mut self) {
        if self.q_bits > 0 {
            self.output.push(self.queue as u8);
            self.queue = 0;
            self.q_bits = 0;
        }
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.output.len(), self.q_bits)
    }
}

/// Encode `data` followed by the end-of-stream glyph. The result is exactly codes.payload_len() bytes.
pub fn pack(data: &[u8], codes: &CodeTable) -> Vec<u8> {
    let mut bp = BitPacker::new(codes.payload_len());

    // Every byte in the data was counted when the table was built, so it has a code.
    let mut table = [Code::default(); 256];
    for (glyph, code) in codes.iter().filter(|&(g, _)| g < END_OF_FILE) {
        table[glyph as usize] = code;
    }

    data.iter().for_each(|&byte| {
        debug_assert!(table[byte as usize].len > 0, "byte {} has no code", byte);
        bp.out_code(table[byte as usize])
    });
    if let Some(eof) = codes.code(END_OF_FILE) {
        bp.out_code(eof);
    }
    trace!("\rEnd of data marker written, stream at {}", bp.loc());
    bp.flush();

    debug!(
        "Packed {} bytes into {} bytes of payload.",
        data.len(),
        bp.output.len()
    );
    bp.output
}

#[cfg(test)]
mod test {
    use super::{pack, BitPacker};
    use crate::huffman_coding::code_table::{Code, CodeTable};
    use crate::huffman_coding::heap_tree::HuffmanTree;

    fn code(s: &str) -> Code {
        s.chars().fold(Code::default(), |c, b| c.push(b == '1'))
    }

    #[test]
    fn low_bit_first_test() {
        let mut bp = BitPacker::new(4);
        bp.out_code(code("1"));
        bp.out_code(code("01"));
        bp.flush();
        assert_eq!(bp.output, vec![0b0000_0101]);
    }

    #[test]
    fn spans_bytes_test() {
        let mut bp = BitPacker::new(4);
        bp.out_code(code("111111"));
        bp.out_code(code("0011"));
        assert_eq!("[1.2]", &bp.loc());
        bp.flush();
        assert_eq!(bp.output, vec![0b0011_1111, 0b0000_0011]);
        assert_eq!("[2.0]", &bp.loc());
    }

    #[test]
    fn single_bits_test() {
        let mut bp = BitPacker::new(1);
        for bit in ["1", "0", "0", "0", "0", "0", "0", "1"] {
            bp.out_code(code(bit));
        }
        assert_eq!(bp.output, vec![0b1000_0001]);
        bp.flush();
        assert_eq!(bp.output.len(), 1);
    }

    #[test]
    fn long_code_test() {
        let mut bp = BitPacker::new(16);
        bp.out_code(code("1"));
        bp.out_code(code(&"10".repeat(50)));
        bp.flush();
        assert_eq!(bp.output.len(), 13);
        assert_eq!(bp.output[0], 0b1010_1011);
        assert_eq!(bp.output[12], 0b0000_1010);
    }

    #[test]
    fn pack_single_byte_test() {
        // A = "1", EOF = "0": AAAA then EOF is 1,1,1,1,0
        let data = "AAAA".as_bytes();
        let codes = CodeTable::from_tree(&HuffmanTree::from_bytes(data));
        assert_eq!(pack(data, &codes), vec![0x0f]);
    }

    #[test]
    fn pack_length_test() {
        let data = "so much depends upon a red wheel barrow".as_bytes();
        let codes = CodeTable::from_tree(&HuffmanTree::from_bytes(data));
        let packed = pack(data, &codes);
        assert_eq!(packed.len(), codes.payload_len());
        assert_eq!(packed.len() as u64, (codes.total_bits() + 7) / 8);
    }

    #[test]
    fn pack_empty_test() {
        let codes = CodeTable::from_tree(&HuffmanTree::from_bytes(&[]));
        assert_eq!(pack(&[], &codes), vec![0]);
    }
}
