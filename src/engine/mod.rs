pub mod bits;
pub mod compressor;
pub mod container;
pub mod decompressor;
pub mod frequency;
pub mod huffman;
pub mod queue;
pub mod visualize;

pub use compressor::*;
pub use decompressor::*;
