//! # qrforge
//!
//! A Rust library for generating standards-compliant QR code symbols with
//! Reed-Solomon error correction. The encoder produces a finished module
//! matrix ready for rendering; pixel mapping, scaling and screen placement
//! are left to the consumer.
//!
//! ## Features
//!
//! - **Byte mode encoding**: arbitrary binary payloads across versions 1-40
//! - **Reed-Solomon error correction**: configurable levels (L, M, Q, H)
//!   with per-version block splitting and interleaving
//! - **Automatic version selection**: smallest symbol that fits the payload
//! - **Mask evaluation**: all 8 mask patterns scored with the standard
//!   penalty rules, or a caller-forced pattern
//! - **Symbol variations**: the same payload under distinct masks, for
//!   displays that cycle the rendered symbol
//!
//! ## Quick Start
//!
//! ```rust
//! use qrforge::QrEncoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage: version, and mask are chosen automatically
//! let qr = QrEncoder::new(b"Hello, World!").encode()?;
//!
//! assert_eq!(qr.version().number(), 1);
//! assert_eq!(qr.width(), 21);
//! println!("{}", qr.to_str(1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Full Configuration
//!
//! ```rust,no_run
//! use qrforge::{ECLevel, MaskPattern, QrEncoder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QrEncoder::new(b"bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")
//!     .version(Version::new(3)?)        // pin the version instead of auto-fitting
//!     .ec_level(ECLevel::Q)             // default is ECLevel::M
//!     .mask(MaskPattern::new(3)?)       // skip penalty scoring, force mask 3
//!     .encode()?;
//!
//! let img = qr.to_image(4); // 4x scale factor
//! img.save("address_qr.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading the matrix
//!
//! A renderer consumes [`Symbol::width`] and [`Symbol::get`]; modules
//! dereference to their [`Color`]:
//!
//! ```rust
//! use qrforge::{Color, QrEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QrEncoder::new(b"ping").encode()?;
//! for r in 0..qr.width() {
//!     for c in 0..qr.width() {
//!         let _is_dark = *qr.get(r, c) == Color::Dark;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;

pub use builder::{Module, QrEncoder, Symbol};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{format_info, parse_format_info, Color, ECLevel, Version};
