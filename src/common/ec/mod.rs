pub mod galois;

use std::sync::OnceLock;

use super::error::{QRError, QRResult};

// Generator polynomials
//------------------------------------------------------------------------------

// Generator polynomial coefficients for every supported ECC length, stored as
// alpha exponents with the leading 1 omitted. Built incrementally from
// (x - α^0)(x - α^1)...(x - α^(n-1)) on first use and shared read-only after.
static GENERATORS: OnceLock<Vec<Vec<u8>>> = OnceLock::new();

fn generators() -> &'static [Vec<u8>] {
    GENERATORS.get_or_init(|| {
        let mut all = Vec::with_capacity(MAX_EC_LEN + 1);
        all.push(Vec::new());
        let mut g = vec![1u8];
        for n in 0..MAX_EC_LEN {
            let mut next = vec![0u8; g.len() + 1];
            for (j, &c) in g.iter().enumerate() {
                next[j] ^= c;
                next[j + 1] ^= galois::mul(c, galois::exp(n));
            }
            g = next;
            let log_coeffs = g[1..]
                .iter()
                .map(|&c| {
                    debug_assert!(c != 0, "Generator coefficient should never be zero");
                    galois::log(c)
                })
                .collect();
            all.push(log_coeffs);
        }
        all
    })
}

pub(crate) fn generator(ec_len: usize) -> &'static [u8] {
    debug_assert!(1 <= ec_len && ec_len <= MAX_EC_LEN, "Unsupported ECC length: {ec_len}");
    &generators()[ec_len]
}

// ECC computation
//------------------------------------------------------------------------------

// Performs polynomial long division with data polynomial (num) and generator
// polynomial (den) to compute the remainder polynomial, the coefficients of
// which are the ecc
pub fn ecc(block: &[u8], ec_len: usize) -> QRResult<Vec<u8>> {
    if !(1..=MAX_EC_LEN).contains(&ec_len) {
        return Err(QRError::InvalidEcLength);
    }

    let len = block.len();
    let gen_poly = generator(ec_len);

    let mut res = block.to_vec();
    res.resize(len + ec_len, 0);

    for i in 0..len {
        let lead_coeff = res[i];
        if lead_coeff == 0 {
            continue;
        }

        let log_lead_coeff = galois::log(lead_coeff) as usize;
        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly.iter()) {
            *u ^= galois::exp(*v as usize + log_lead_coeff);
        }
    }

    Ok(res.split_off(len))
}

// Global constants
//------------------------------------------------------------------------------

// Largest ECC codeword count a single block can carry across all
// version/level combinations
pub const MAX_EC_LEN: usize = 68;
