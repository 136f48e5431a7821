//! Lateral start column of every along-track block.
//!
//! Consecutive blocks are shifted cross-track by the orbit's drift. The table
//! holds cumulative shifts at low resolution, relative to the westernmost
//! block. The values are a smooth reconstruction that reproduces the
//! documented 1580-column total span and the resulting image widths; they are
//! not the per-block offsets published with the instrument's products, so
//! individual blocks may sit a few columns off their true position.

use crate::resolution::{MisrResolution, BLOCK_COUNT};

/// Reconstructed low-resolution start column of each block (block 1 first).
pub static BLOCK_OFFSETS: [u16; BLOCK_COUNT] = [
       0,    0,    0,    1,    2,    3,    4,    6,    8,   10,   12,   15,
      18,   21,   24,   28,   32,   36,   40,   44,   49,   54,   59,   64,
      70,   76,   82,   88,   94,  101,  108,  115,  122,  130,  138,  146,
     154,  162,  170,  179,  188,  197,  206,  215,  225,  235,  245,  255,
     265,  275,  286,  297,  308,  319,  330,  341,  352,  364,  376,  388,
     400,  412,  424,  436,  448,  460,  473,  486,  499,  512,  525,  538,
     551,  564,  577,  590,  603,  616,  629,  643,  657,  671,  685,  699,
     713,  727,  741,  755,  769,  783,  797,  811,  825,  839,  853,  867,
     881,  895,  909,  923,  937,  951,  964,  977,  990, 1003, 1016, 1029,
    1042, 1055, 1068, 1081, 1094, 1107, 1120, 1132, 1144, 1156, 1168, 1180,
    1192, 1204, 1216, 1228, 1239, 1250, 1261, 1272, 1283, 1294, 1305, 1315,
    1325, 1335, 1345, 1355, 1365, 1374, 1383, 1392, 1401, 1410, 1418, 1426,
    1434, 1442, 1450, 1458, 1465, 1472, 1479, 1486, 1492, 1498, 1504, 1510,
    1516, 1521, 1526, 1531, 1536, 1540, 1544, 1548, 1552, 1556, 1559, 1562,
    1565, 1568, 1570, 1572, 1574, 1576, 1577, 1578, 1579, 1580, 1580, 1580,
];

/// Largest entry of [`BLOCK_OFFSETS`].
pub const MAX_OFFSET: usize = 1580;

/// Start column of zero-based block `block` at `resolution`.
///
/// Returns `None` past the last block.
#[inline]
pub fn block_offset(block: usize, resolution: MisrResolution) -> Option<usize> {
    BLOCK_OFFSETS
        .get(block)
        .map(|&offset| offset as usize * resolution.offset_scale())
}

/// Widest cumulative drift at `resolution`.
pub fn max_offset(resolution: MisrResolution) -> usize {
    MAX_OFFSET * resolution.offset_scale()
}
