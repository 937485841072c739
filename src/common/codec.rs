use super::{
    bitstream::BitStream,
    error::{QRError, QRResult},
    metadata::{ECLevel, Version},
};

// Byte mode data encoder
//------------------------------------------------------------------------------

// Encodes the payload at the smallest version that fits it
pub(crate) fn encode(data: &[u8], ecl: ECLevel) -> QRResult<(BitStream, Version)> {
    let ver = find_best_version(data.len(), ecl)?;
    let bs = encode_with_version(data, ver, ecl)?;
    Ok((bs, ver))
}

// Encodes the payload at a caller-pinned version
pub(crate) fn encode_with_version(data: &[u8], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
    if data.len() > ver.byte_capacity(ecl) {
        return Err(QRError::DataTooLong);
    }

    let bit_capacity = ver.data_bit_capacity(ecl);
    let mut bs = BitStream::new(bit_capacity);
    push_header(data.len(), ver, &mut bs);
    push_byte_data(data, &mut bs);
    push_terminator(&mut bs);
    pad_remaining_capacity(&mut bs);

    debug_assert!(
        bs.len() == bit_capacity,
        "Encoded stream should fill capacity exactly: Len {}, Capacity {}",
        bs.len(),
        bit_capacity
    );

    Ok(bs)
}

fn find_best_version(len: usize, ecl: ECLevel) -> QRResult<Version> {
    for v in 1..=40 {
        let ver = Version::new(v)?;
        if len <= ver.byte_capacity(ecl) {
            return Ok(ver);
        }
    }
    Err(QRError::DataTooLong)
}

// Writer for encoded data
//------------------------------------------------------------------------------

fn push_header(char_count: usize, ver: Version, out: &mut BitStream) {
    out.push_bits(MODE_BYTE, MODE_BIT_LEN);
    let len_bits = ver.char_count_bits();
    debug_assert!(
        char_count < (1 << len_bits),
        "Char count exceeds bit length: Char count {char_count}, Char count bits {len_bits}"
    );
    out.push_bits(char_count as u16, len_bits);
}

fn push_byte_data(data: &[u8], out: &mut BitStream) {
    for &b in data {
        out.push_bits(b, 8);
    }
}

fn push_terminator(out: &mut BitStream) {
    let bit_len = out.len();
    let bit_capacity = out.capacity();
    if bit_len < bit_capacity {
        let term_len = std::cmp::min(4, bit_capacity - bit_len);
        out.push_bits(0u8, term_len);
    }
}

fn pad_remaining_capacity(out: &mut BitStream) {
    push_padding_bits(out);
    push_padding_codewords(out);
}

fn push_padding_bits(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0u8, 8 - offset);
    }
}

fn push_padding_codewords(out: &mut BitStream) {
    debug_assert!(
        out.len() & 7 == 0,
        "Bit offset should be zero before padding codewords: {}",
        out.len() & 7
    );

    let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
    PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
        out.push_bits(pc, 8);
    });
}

// Global constants
//------------------------------------------------------------------------------

const MODE_BYTE: u8 = 0b0100;

const MODE_BIT_LEN: usize = 4;

static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];
