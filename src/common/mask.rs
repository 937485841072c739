use std::ops::Deref;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::Symbol;

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        match pattern {
            0..=7 => Ok(Self(pattern)),
            _ => Err(QRError::InvalidMaskPattern),
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i16, i16) -> bool {
        match self.0 {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Pattern validated at construction"),
        }
    }
}

// Mask selection
//------------------------------------------------------------------------------

// Scores all 8 candidate masks and applies the one with the lowest penalty.
// Ties break towards the lowest pattern index.
pub fn apply_best_mask(qr: &mut Symbol) -> MaskPattern {
    let best_mask = (0..8)
        .min_by_key(|&m| {
            let mut candidate = qr.clone();
            candidate.apply_mask(MaskPattern(m));
            compute_total_penalty(&candidate)
        })
        .expect("Should return atleast 1 mask");
    let best_mask = MaskPattern(best_mask);
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty scoring
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &Symbol) -> u32 {
    #[cfg(test)]
    PENALTY_EVALS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

// Rule 1: each run of 5 or more same-colored modules in a row or column
// scores 3 plus 1 for every module past the fifth
fn compute_adjacent_penalty(qr: &Symbol) -> u32 {
    let mut pen = 0;
    let w = qr.width();
    for i in 0..w {
        let mut row_run = 1u32;
        let mut col_run = 1u32;
        for j in 1..w {
            pen += run_step(*qr.get(i, j) == *qr.get(i, j - 1), &mut row_run);
            pen += run_step(*qr.get(j, i) == *qr.get(j - 1, i), &mut col_run);
        }
    }
    pen
}

fn run_step(same: bool, run: &mut u32) -> u32 {
    if !same {
        *run = 1;
        return 0;
    }
    *run += 1;
    match *run {
        5 => 3,
        6.. => 1,
        _ => 0,
    }
}

// Rule 2: 3 per 2x2 block of a single color
fn compute_block_penalty(qr: &Symbol) -> u32 {
    let mut pen = 0;
    let w = qr.width();
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// Rule 3: 40 per finder-like sequence (1011101 flanked by 4 light modules)
// in a row or column
fn compute_finder_pattern_penalty(qr: &Symbol, is_hor: bool) -> u32 {
    static PATTERN: [Color; 11] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Light,
        Color::Light,
        Color::Light,
        Color::Light,
    ];

    let mut pen = 0;
    let w = qr.width();
    for i in 0..w {
        for j in 0..=w - 11 {
            let window =
                |k: i16| if is_hor { *qr.get(i, j + k) } else { *qr.get(j + k, i) };
            if (0..11).map(&window).eq(PATTERN.iter().copied()) {
                pen += 40;
            }
            if (0..11).map(&window).eq(PATTERN.iter().rev().copied()) {
                pen += 40;
            }
        }
    }
    pen
}

// Rule 4: 10 per full 5% step the dark module ratio strays from 50%
fn compute_balance_penalty(qr: &Symbol) -> u32 {
    let dark = qr.count_dark_modules();
    let w = qr.width() as usize;
    let total = w * w;
    let steps = ((200 * dark).abs_diff(100 * total) / total) / 10;
    (steps * 10) as u32
}

#[cfg(test)]
pub(crate) static PENALTY_EVALS: std::sync::atomic::AtomicUsize =
    std::sync::atomic::AtomicUsize::new(0);

#[cfg(test)]
mod mask_tests {
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    use test_case::test_case;

    use super::*;
    use crate::builder::{Module, QrEncoder, Symbol};
    use crate::common::metadata::{ECLevel, Version};

    // Serializes tests that observe the penalty evaluation counter
    static COUNTER_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_mask_pattern_bounds() {
        assert!(MaskPattern::new(7).is_ok());
        assert_eq!(MaskPattern::new(8), Err(QRError::InvalidMaskPattern));
    }

    #[test_case(0, &[(0, 0, true), (0, 1, false), (1, 0, false), (1, 1, true)])]
    #[test_case(1, &[(0, 5, true), (1, 5, false), (2, 5, true)])]
    #[test_case(2, &[(5, 0, true), (5, 1, false), (5, 3, true)])]
    #[test_case(3, &[(0, 0, true), (1, 2, true), (1, 1, false)])]
    #[test_case(4, &[(0, 0, true), (0, 2, true), (0, 3, false), (2, 0, false)])]
    fn test_mask_functions(pattern: u8, probes: &[(i16, i16, bool)]) {
        let f = MaskPattern::new(pattern).unwrap().mask_function();
        for &(r, c, exp) in probes {
            assert_eq!(f(r, c), exp, "pattern {pattern} at ({r}, {c})");
        }
    }

    fn all_light_symbol() -> Symbol {
        let mut qr = Symbol::new(Version::new(1).unwrap(), ECLevel::L);
        let w = qr.width();
        for r in 0..w {
            for c in 0..w {
                qr.set(r, c, Module::Data(Color::Light));
            }
        }
        qr
    }

    #[test]
    fn test_adjacent_penalty_all_light() {
        let qr = all_light_symbol();
        // 21 rows and 21 columns, each a single run of 21: 3 + 16 each
        assert_eq!(compute_adjacent_penalty(&qr), 2 * 21 * 19);
    }

    #[test]
    fn test_block_penalty_all_light() {
        let qr = all_light_symbol();
        assert_eq!(compute_block_penalty(&qr), 20 * 20 * 3);
    }

    #[test]
    fn test_finder_pattern_penalty_all_light() {
        let qr = all_light_symbol();
        assert_eq!(compute_finder_pattern_penalty(&qr, true), 0);
        assert_eq!(compute_finder_pattern_penalty(&qr, false), 0);
    }

    #[test]
    fn test_finder_pattern_penalty_detects_sequence() {
        let mut qr = all_light_symbol();
        // 10111010000 left to right in row 3
        for (k, bit) in [1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0].iter().enumerate() {
            let clr = if *bit == 1 { Color::Dark } else { Color::Light };
            qr.set(3, k as i16, Module::Data(clr));
        }
        assert_eq!(compute_finder_pattern_penalty(&qr, true), 40);
    }

    #[test]
    fn test_balance_penalty_all_light() {
        let qr = all_light_symbol();
        // 0% dark is 10 steps of 5% away from 50%
        assert_eq!(compute_balance_penalty(&qr), 100);
    }

    #[test]
    fn test_best_mask_minimality() {
        let _guard = COUNTER_LOCK.lock().unwrap();

        let mut qr = QrEncoder::prepare_unmasked(b"MASK SELECTION", ECLevel::M).unwrap();
        let best = apply_best_mask(&mut qr);
        let best_pen = compute_total_penalty(&qr);
        for m in 0..8 {
            let mut candidate = QrEncoder::prepare_unmasked(b"MASK SELECTION", ECLevel::M).unwrap();
            candidate.apply_mask(MaskPattern::new(m).unwrap());
            let pen = compute_total_penalty(&candidate);
            assert!(best_pen <= pen, "mask {m} scored {pen}, best {} scored {best_pen}", *best);
            if pen == best_pen {
                assert!(*best <= m, "Tie should break to the lowest index");
            }
        }
    }

    #[test]
    fn test_forced_mask_skips_scoring() {
        let _guard = COUNTER_LOCK.lock().unwrap();

        let before = PENALTY_EVALS.load(Ordering::SeqCst);
        let qr = QrEncoder::new(b"FORCED")
            .ec_level(ECLevel::M)
            .mask(MaskPattern::new(3).unwrap())
            .encode()
            .unwrap();
        let after = PENALTY_EVALS.load(Ordering::SeqCst);
        assert_eq!(qr.mask_pattern(), Some(MaskPattern::new(3).unwrap()));
        assert_eq!(before, after, "Forced mask should not trigger penalty scoring");
    }
}
