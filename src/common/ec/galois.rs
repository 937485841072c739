use std::sync::OnceLock;

// GF(256) arithmetic
//------------------------------------------------------------------------------

// Exp/log tables for GF(256) with the QR primitive polynomial
// x^8 + x^4 + x^3 + x^2 + 1. The exp table is doubled so products of two
// logs index without a modulo.
struct GfTables {
    exp: [u8; 510],
    log: [u8; 256],
}

static TABLES: OnceLock<GfTables> = OnceLock::new();

fn tables() -> &'static GfTables {
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 510];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLY;
            }
        }
        for i in 255..510 {
            exp[i] = exp[i - 255];
        }
        GfTables { exp, log }
    })
}

/// α^i for i in 0..510; the cycle repeats every 255 exponents.
pub fn exp(i: usize) -> u8 {
    debug_assert!(i < 510, "Exponent out of table range: {i}");
    tables().exp[i]
}

/// Discrete log of a nonzero element. log(0) is undefined and returns 0 by
/// convention; callers in this crate never pass 0.
pub fn log(a: u8) -> u8 {
    tables().log[a as usize]
}

pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

/// Multiplicative inverse. inverse(0) is undefined and returns 0 by
/// convention; callers in this crate never pass 0.
pub fn inv(a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let t = tables();
    t.exp[255 - t.log[a as usize] as usize]
}

const PRIMITIVE_POLY: u16 = 0x11D;
