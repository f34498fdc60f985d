//! Byte-shuffle preconditioner used by the `+sh` compression codec variants.
//!
//! Grouping like-positioned bytes of fixed-size items together tends to make
//! the stream more compressible (e.g. all high bytes of a 16-bit sample run,
//! then all low bytes). See the XISF 1.0 specification's compression engine
//! section for the exact permutation.

use crate::{Error, Result};

/// Shuffle `input` into `N = floor(len / item_size)` groups of like-positioned
/// bytes; trailing `len % item_size` bytes are copied verbatim at the end.
pub fn shuffle(input: &[u8], item_size: usize) -> Result<Vec<u8>> {
    if item_size < 2 {
        return Err(Error::InvalidItemSize(item_size));
    }
    let n = input.len() / item_size;
    let tail_start = n * item_size;
    let mut out = vec![0u8; input.len()];

    for i in 0..n {
        for j in 0..item_size {
            out[j * n + i] = input[i * item_size + j];
        }
    }
    out[tail_start..].copy_from_slice(&input[tail_start..]);
    Ok(out)
}

/// Inverse of [`shuffle`].
pub fn unshuffle(input: &[u8], item_size: usize) -> Result<Vec<u8>> {
    if item_size < 2 {
        return Err(Error::InvalidItemSize(item_size));
    }
    let n = input.len() / item_size;
    let tail_start = n * item_size;
    let mut out = vec![0u8; input.len()];

    for i in 0..n {
        for j in 0..item_size {
            out[i * item_size + j] = input[j * n + i];
        }
    }
    out[tail_start..].copy_from_slice(&input[tail_start..]);
    Ok(out)
}
