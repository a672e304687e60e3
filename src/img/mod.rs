//! Core IMG container reader module

pub mod cache;
pub mod codec;
pub mod format;
pub mod options;
pub mod reader;
pub mod source;
pub mod style;
pub mod subfile;
pub mod tile;
pub mod tree;
pub mod types;
pub mod utils;

pub use format::tre::{BoundsOnly, TreHeader};
pub use options::ImgOptions;
pub use reader::ImgReader;
pub use types::error::{ImgError, Result};
