use image::{GrayImage, Luma};
use std::ops::Deref;

use crate::common::iter::EncRegionIter;
use crate::common::mask::MaskPattern;
use crate::common::metadata::{
    format_info, Color, ECLevel, Version, FORMAT_INFO_BIT_LEN, FORMAT_INFO_COORDS_MAIN,
    FORMAT_INFO_COORDS_SIDE, VERSION_INFO_BIT_LEN, VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
};
use crate::common::BitStream;

// Module
//------------------------------------------------------------------------------

/// One cell of the symbol grid, tagged with the role it plays. Everything
/// except `Data` is reserved: data placement writes only to `Empty` cells and
/// masking flips only `Data` cells.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Module {
    Empty,
    Func(Color),
    VersionInfo(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::VersionInfo(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

// Symbol
//------------------------------------------------------------------------------

/// A QR symbol under construction, and the finished artifact returned to the
/// caller. All mutation is crate-internal; the public surface is read-only.
#[derive(Debug, Clone)]
pub struct Symbol {
    grid: Vec<Module>,
    w: i16,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

impl Symbol {
    pub(crate) fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; (w as usize) * (w as usize)], w, ver, ecl, mask: None }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> i16 {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    /// The mask applied to the symbol. Always set on a symbol returned by
    /// [`QrEncoder::encode`](crate::QrEncoder::encode).
    pub fn mask_pattern(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Version: {}, Ec level: {:?}, Mask: {:?} }}",
            self.ver,
            self.ecl,
            self.mask.map(|m| *m)
        )
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&m| matches!(**m, Color::Dark)).count()
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w;
        debug_assert!(-w <= r && r < w, "row should be within bounds: {r}");
        debug_assert!(-w <= c && c < w, "column should be within bounds: {c}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    /// Reads the module at (r, c). Negative coordinates wrap around from the
    /// far edge, so (-1, -1) is the bottom right corner.
    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub(crate) fn get_mut(&mut self, r: i16, c: i16) -> &mut Module {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub(crate) fn set(&mut self, r: i16, c: i16, module: Module) {
        *self.get_mut(r, c) = module;
    }

    #[cfg(test)]
    pub(crate) fn to_debug_str(&self) -> String {
        let w = self.w;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Func(Color::Dark) => 'f',
                    Module::Func(Color::Light) => 'F',
                    Module::VersionInfo(Color::Dark) => 'v',
                    Module::VersionInfo(Color::Light) => 'V',
                    Module::Format(Color::Dark) => 'm',
                    Module::Format(Color::Light) => 'M',
                    Module::Data(Color::Dark) => 'd',
                    Module::Data(Color::Light) => 'D',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }
}

#[cfg(test)]
mod symbol_util_tests {
    use super::{Module, Symbol};
    use crate::common::metadata::{Color, ECLevel, Version};

    #[test]
    fn test_index_wrap() {
        let mut qr = Symbol::new(Version::new(1).unwrap(), ECLevel::L);
        let w = qr.w;
        qr.set(-1, -1, Module::Func(Color::Dark));
        assert_eq!(qr.get(w - 1, w - 1), Module::Func(Color::Dark));
        qr.set(0, 0, Module::Func(Color::Dark));
        assert_eq!(qr.get(-w, -w), Module::Func(Color::Dark));
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_bound() {
        let qr = Symbol::new(Version::new(1).unwrap(), ECLevel::L);
        let w = qr.w;
        qr.get(w, 0);
    }

    #[test]
    #[should_panic]
    fn test_col_index_overwrap() {
        let qr = Symbol::new(Version::new(1).unwrap(), ECLevel::L);
        let w = qr.w;
        qr.get(0, -(w + 1));
    }
}

// Finder pattern
//------------------------------------------------------------------------------

impl Symbol {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Draws the 7x7 finder centered at (r, c) along with the light separator
    // border on the inward sides
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_left, dr_right) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_top, dc_bottom) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_left..=dr_right {
            for j in dc_top..=dc_bottom {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Func(Color::Light),
                        (3 | -3, _) | (_, 3 | -3) => Module::Func(Color::Dark),
                        (2 | -2, _) | (_, 2 | -2) => Module::Func(Color::Light),
                        _ => Module::Func(Color::Dark),
                    },
                );
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl Symbol {
    fn draw_timing_pattern(&mut self) {
        let w = self.w;
        self.draw_line(6, 8, 6, w - 9);
        self.draw_line(8, 6, w - 9, 6);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        if r1 == r2 {
            for j in c1..=c2 {
                let m =
                    if j & 1 == 0 { Module::Func(Color::Dark) } else { Module::Func(Color::Light) };
                self.set(r1, j, m);
            }
        } else {
            for i in r1..=r2 {
                let m =
                    if i & 1 == 0 { Module::Func(Color::Dark) } else { Module::Func(Color::Light) };
                self.set(i, c1, m);
            }
        }
    }
}


// Alignment pattern
//------------------------------------------------------------------------------

impl Symbol {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in poses {
            for &c in poses {
                self.draw_alignment_pattern_at(r, c)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.w;
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Func(Color::Dark),
                        _ => Module::Func(Color::Light),
                    },
                )
            }
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl Symbol {
    pub(crate) fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
    }
}

#[cfg(test)]
mod all_function_patterns_test {
    use super::Symbol;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_all_function_patterns() {
        let mut qr = Symbol::new(Version::new(3).unwrap(), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffF.............Ffffffff\n\
             fFFFFFfF.............FfFFFFFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFFFFFfF.............FfFFFFFf\n\
             fffffffFfFfFfFfFfFfFfFfffffff\n\
             FFFFFFFF.............FFFFFFFF\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f.............fffff....\n\
             FFFFFFFF............fFFFf....\n\
             fffffffF............fFfFf....\n\
             fFFFFFfF............fFFFf....\n\
             fFfffFfF............fffff....\n\
             fFfffFfF.....................\n\
             fFfffFfF.....................\n\
             fFFFFFfF.....................\n\
             fffffffF.....................\n"
        );
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl Symbol {
    pub(crate) fn reserve_format_area(&mut self) {
        self.draw_format_info((1 << FORMAT_INFO_BIT_LEN) - 1);
    }

    fn draw_format_info(&mut self, format_info: u32) {
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_MAIN,
        );
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_SIDE,
        );
        // The module above the bottom left finder is always dark
        self.set(-8, 8, Module::Format(Color::Dark));
    }

    pub(crate) fn draw_version_info(&mut self) {
        if self.ver.number() < 7 {
            return;
        }
        let ver_info = self.ver.info();
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::VersionInfo(Color::Light),
            Module::VersionInfo(Color::Dark),
            &VERSION_INFO_COORDS_BL,
        );
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::VersionInfo(Color::Light),
            Module::VersionInfo(Color::Dark),
            &VERSION_INFO_COORDS_TR,
        );
    }

    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i16, i16)],
    ) {
        let mut mask = 1 << (bit_len - 1);
        for (r, c) in coords {
            if number & mask == 0 {
                self.set(*r, *c, off_clr);
            } else {
                self.set(*r, *c, on_clr);
            }
            mask >>= 1;
        }
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl Symbol {
    pub(crate) fn draw_encoding_region(&mut self, payload: BitStream) {
        self.reserve_format_area();
        self.draw_version_info();
        self.draw_payload(payload);

        debug_assert!(
            !self.grid.contains(&Module::Empty),
            "Empty module found after data placement"
        );
    }

    fn draw_payload(&mut self, payload: BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload {
            let module = Module::Data(if bit { Color::Dark } else { Color::Light });
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);
    }

    // Modules left over past the last codeword are fixed light
    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i16, i16)>) {
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
            }
        }
    }

    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        self.mask = Some(pattern);
        let mask_fn = pattern.mask_function();
        let w = self.w;
        for r in 0..w {
            for c in 0..w {
                if mask_fn(r, c) {
                    if let Module::Data(clr) = self.get(r, c) {
                        self.set(r, c, Module::Data(!clr))
                    }
                }
            }
        }
        let format_info = format_info(self.ecl, *pattern);
        self.draw_format_info(format_info);
    }
}

// Render
//------------------------------------------------------------------------------

impl Symbol {
    /// Renders the symbol to a grayscale image at `module_sz` pixels per
    /// module, with the standard 4-module quiet zone.
    pub fn to_image(&self, module_sz: u32) -> GrayImage {
        let qz_sz = QUIET_ZONE as u32 * module_sz;
        let qr_sz = self.w as u32 * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = GrayImage::new(total_sz, total_sz);
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.put_pixel(j, i, Luma([255]));
                    continue;
                }
                let r = ((i - qz_sz) / module_sz) as i16;
                let c = ((j - qz_sz) / module_sz) as i16;
                let pixel = (*self.get(r, c)).select(Luma([0]), Luma([255]));
                canvas.put_pixel(j, i, pixel);
            }
        }

        canvas
    }

    /// Renders the symbol as block characters, quiet zone included. Dark
    /// modules print as spaces on a light block background, matching how a
    /// terminal shows light-on-dark.
    pub fn to_str(&self, module_sz: usize) -> String {
        let qz_sz = QUIET_ZONE * module_sz;
        let qr_sz = self.w as usize * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = String::new();
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.push('█');
                    continue;
                }
                let r = ((i - qz_sz) / module_sz) as i16;
                let c = ((j - qz_sz) / module_sz) as i16;
                canvas.push((*self.get(r, c)).select(' ', '█'));
            }
            canvas.push('\n');
        }

        canvas
    }
}

const QUIET_ZONE: usize = 4;
