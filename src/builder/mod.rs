mod symbol;

pub use symbol::{Module, Symbol};

use std::ops::Deref;

use crate::common::{
    codec::{encode, encode_with_version},
    ec::ecc,
    error::QRResult,
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
    BitStream,
};

// Encoder
//------------------------------------------------------------------------------

/// Builder-style entry point. Configures a payload, error correction level
/// and optional version/mask overrides, then [`encode`](Self::encode)s them
/// into an owned [`Symbol`]. Every call is independent; no state is shared
/// between encodes.
pub struct QrEncoder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl<'a> QrEncoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: ECLevel::M, mask: None }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn metadata(&self) -> String {
        match self.version {
            Some(v) => {
                format!("{{ Version: {}, Ec level: {:?} }}", v, self.ec_level)
            }
            None => format!("{{ Version: None, Ec level: {:?} }}", self.ec_level),
        }
    }
}


impl QrEncoder<'_> {
    pub fn encode(&self) -> QRResult<Symbol> {
        println!("\nGenerating QR {}...", self.metadata());

        let mut qr = self.prepare()?;

        match self.mask {
            Some(m) => {
                println!("Applying mask {}...", *m);
                qr.apply_mask(m);
            }
            None => {
                println!("Finding & applying best mask...");
                apply_best_mask(&mut qr);
            }
        };

        let ver = qr.version();
        let total_modules = (ver.width() as usize) * (ver.width() as usize);
        let dark_modules = qr.count_dark_modules();
        let light_modules = total_modules - dark_modules;

        println!("Report:");
        println!("{}", qr.metadata());
        println!(
            "Data capacity: {} bytes, Error capacity: {} codewords",
            ver.byte_capacity(self.ec_level),
            Self::ec_capacity(ver, self.ec_level)
        );
        println!(
            "Dark cells: {}, Light cells: {}, Balance: {}%\n",
            dark_modules,
            light_modules,
            dark_modules * 100 / total_modules
        );

        Ok(qr)
    }

    // Runs every construction step except masking: version selection, data
    // encoding, ECC, interleaving, function patterns and data placement
    fn prepare(&self) -> QRResult<Symbol> {
        println!("Encoding data...");
        let (encoded_data, ver) = match self.version {
            Some(v) => (encode_with_version(self.data, v, self.ec_level)?, v),
            None => encode(self.data, self.ec_level)?,
        };

        println!("Constructing payload with ecc & interleaving...");
        let mut payload = BitStream::new(ver.total_codewords() << 3);
        let (data_blocks, ecc_blocks) = Self::compute_ecc(encoded_data.data(), ver, self.ec_level)?;
        payload.extend(&Self::interleave(&data_blocks));
        payload.extend(&Self::interleave(&ecc_blocks));

        println!("Drawing functional patterns & encoding region...");
        let mut qr = Symbol::new(ver, self.ec_level);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(payload);

        Ok(qr)
    }

    #[cfg(test)]
    pub(crate) fn prepare_unmasked(data: &[u8], ec_level: ECLevel) -> QRResult<Symbol> {
        QrEncoder::new(data).ec_level(ec_level).prepare()
    }

    /// Encodes the payload under up to 8 distinct forced mask patterns.
    /// Consumers that rotate the displayed symbol cycle through the returned
    /// set; every element carries the same payload.
    pub fn variations(&self, count: usize) -> QRResult<Vec<Symbol>> {
        (0..count.min(8) as u8)
            .map(|m| {
                let variant = QrEncoder {
                    data: self.data,
                    version: self.version,
                    ec_level: self.ec_level,
                    mask: Some(MaskPattern::new(m)?),
                };
                variant.encode()
            })
            .collect()
    }

    // ECC: Error Correction Codeword generator
    fn compute_ecc(
        data: &[u8],
        version: Version,
        ec_level: ECLevel,
    ) -> QRResult<(Vec<&[u8]>, Vec<Vec<u8>>)> {
        let data_blocks = Self::blockify(data, version, ec_level);

        let ecc_size_per_block = version.ecc_per_block(ec_level);
        let ecc_blocks = data_blocks
            .iter()
            .map(|b| ecc(b, ecc_size_per_block))
            .collect::<QRResult<Vec<_>>>()?;

        Ok((data_blocks, ecc_blocks))
    }

    pub(crate) fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
        let total_blocks = version.block_count(ec_level);
        let short_size = data.len() / total_blocks;
        let long_count = data.len() % total_blocks;
        let short_count = total_blocks - long_count;
        let total_short_size = short_size * short_count;

        debug_assert!(
            data.len() == version.data_codewords(ec_level),
            "Data len doesn't match data codeword capacity: Data len {}, Capacity {}",
            data.len(),
            version.data_codewords(ec_level)
        );

        let mut data_blocks = Vec::with_capacity(total_blocks);
        data_blocks.extend(data[..total_short_size].chunks(short_size));
        if long_count > 0 {
            data_blocks.extend(data[total_short_size..].chunks(short_size + 1));
        }
        data_blocks
    }

    pub fn ec_capacity(version: Version, ec_level: ECLevel) -> usize {
        // Codewords reserved for misdecode protection at the smallest versions
        let p = match (version.number(), ec_level) {
            (1, ECLevel::L) => 3,
            (2, ECLevel::L) | (1, ECLevel::M) => 2,
            (1, _) | (3, ECLevel::L) => 1,
            _ => 0,
        };

        let ec_bytes = version.block_count(ec_level) * version.ecc_per_block(ec_level);
        (ec_bytes - p) / 2
    }

    pub(crate) fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().expect("Blocks is empty");
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod encoder_tests {
    use super::QrEncoder;
    use crate::common::{
        error::QRError,
        mask::MaskPattern,
        metadata::{ECLevel, Version},
    };

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = [b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17"];
        let (_, ecc) =
            QrEncoder::compute_ecc(msg, Version::new(1).unwrap(), ECLevel::M).unwrap();
        assert_eq!(&*ecc, expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let (_, ecc) =
            QrEncoder::compute_ecc(msg, Version::new(5).unwrap(), ECLevel::Q).unwrap();
        assert_eq!(&*ecc, &expected_ec[..]);
    }

    #[test]
    fn test_blockify() {
        // Version 5-Q: 62 data codewords in 4 blocks of 15, 15, 16, 16
        let data: Vec<u8> = (0..62).collect();
        let blocks = QrEncoder::blockify(&data, Version::new(5).unwrap(), ECLevel::Q);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].len(), 15);
        assert_eq!(blocks[1].len(), 15);
        assert_eq!(blocks[2].len(), 16);
        assert_eq!(blocks[3].len(), 16);
        assert_eq!(blocks[2][0], 30);
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = QrEncoder::interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test]
    fn test_ec_capacity() {
        assert_eq!(QrEncoder::ec_capacity(Version::new(1).unwrap(), ECLevel::M), 4);
        assert_eq!(QrEncoder::ec_capacity(Version::new(1).unwrap(), ECLevel::L), 2);
        assert_eq!(QrEncoder::ec_capacity(Version::new(5).unwrap(), ECLevel::Q), 36);
    }

    #[test]
    fn test_encode_reports_requested_mask() {
        let qr = QrEncoder::new(b"FORCED MASK")
            .ec_level(ECLevel::Q)
            .mask(MaskPattern::new(5).unwrap())
            .encode()
            .unwrap();
        assert_eq!(qr.mask_pattern(), Some(MaskPattern::new(5).unwrap()));
    }

    #[test]
    fn test_encode_pinned_version_overflow() {
        let res = QrEncoder::new(&[0u8; 8])
            .version(Version::new(1).unwrap())
            .ec_level(ECLevel::H)
            .encode();
        assert!(matches!(res, Err(QRError::DataTooLong)));
    }

    #[test]
    fn test_variations_share_payload_shape() {
        let variants = QrEncoder::new(b"bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")
            .ec_level(ECLevel::Q)
            .variations(8)
            .unwrap();
        assert_eq!(variants.len(), 8);
        let ver = variants[0].version();
        for (m, qr) in variants.iter().enumerate() {
            assert_eq!(qr.version(), ver);
            assert_eq!(*qr.mask_pattern().unwrap(), m as u8);
        }
    }
}
