// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::{
    borrow::Cow,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A raw block state id. The block table maps it back to a block and its properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockStateId(pub u16);

/// A chunk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    /// Chunk x, block x divided by 16.
    pub x: i32,
    /// Chunk z, block z divided by 16.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing a block column.
    #[must_use]
    pub const fn from_block(block_x: i32, block_z: i32) -> Self {
        Self::new(block_x >> 4, block_z >> 4)
    }

    /// Lowest block x inside the chunk.
    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.x << 4
    }

    /// Lowest block z inside the chunk.
    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.z << 4
    }

    /// Highest block x inside the chunk.
    #[must_use]
    pub const fn max_block_x(self) -> i32 {
        self.min_block_x() + 15
    }

    /// Highest block z inside the chunk.
    #[must_use]
    pub const fn max_block_z(self) -> i32 {
        self.min_block_z() + 15
    }

    /// Packs the position the way column and chunk keys are packed on disk.
    #[must_use]
    pub const fn as_long(self) -> i64 {
        pack_column(self.x, self.z)
    }
}

/// Packs two 32 bit coordinates into one key, `x` in the low half.
#[must_use]
pub const fn pack_column(x: i32, z: i32) -> i64 {
    (x as i64 & 0xFFFF_FFFF) | ((z as i64 & 0xFFFF_FFFF) << 32)
}

/// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    /// Block x.
    pub x: i32,
    /// Block y.
    pub y: i32,
    /// Block z.
    pub z: i32,
}

const PACKED_XZ_BITS: u32 = 26;
const PACKED_Y_BITS: u32 = 64 - 2 * PACKED_XZ_BITS;
const PACKED_X_MASK: i64 = (1 << PACKED_XZ_BITS) - 1;
const PACKED_Y_MASK: i64 = (1 << PACKED_Y_BITS) - 1;
const PACKED_Z_MASK: i64 = (1 << PACKED_XZ_BITS) - 1;
const Z_OFFSET: u32 = PACKED_Y_BITS;
const X_OFFSET: u32 = PACKED_Y_BITS + PACKED_XZ_BITS;

impl BlockPos {
    /// Creates a position from block coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position moved by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The position one block down.
    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The position one block up.
    #[must_use]
    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Packs into the 26/12/26 bit layout used for position keys.
    #[must_use]
    pub const fn as_long(self) -> i64 {
        ((self.x as i64 & PACKED_X_MASK) << X_OFFSET)
            | (self.y as i64 & PACKED_Y_MASK)
            | ((self.z as i64 & PACKED_Z_MASK) << Z_OFFSET)
    }

    /// Inverse of [`Self::as_long`].
    #[must_use]
    pub const fn from_long(packed: i64) -> Self {
        Self::new(
            (packed << (64 - X_OFFSET - PACKED_XZ_BITS) >> (64 - PACKED_XZ_BITS)) as i32,
            (packed << (64 - PACKED_Y_BITS) >> (64 - PACKED_Y_BITS)) as i32,
            (packed << (64 - Z_OFFSET - PACKED_XZ_BITS) >> (64 - PACKED_XZ_BITS)) as i32,
        )
    }

    /// The chunk containing the position.
    #[must_use]
    pub const fn chunk(self) -> ChunkPos {
        ChunkPos::from_block(self.x, self.z)
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// A namespaced id such as `minecraft:stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    /// The part before the colon.
    pub namespace: Cow<'static, str>,
    /// The part after the colon.
    pub path: Cow<'static, str>,
}

impl ResourceLocation {
    /// Namespace of every built-in id.
    pub const VANILLA_NAMESPACE: &'static str = "minecraft";

    /// An id in the vanilla namespace.
    #[must_use]
    pub fn vanilla(path: String) -> Self {
        ResourceLocation {
            namespace: Cow::Borrowed(Self::VANILLA_NAMESPACE),
            path: Cow::Owned(path),
        }
    }

    /// An id in the vanilla namespace, usable in constants.
    #[must_use]
    pub const fn vanilla_static(path: &'static str) -> Self {
        ResourceLocation {
            namespace: Cow::Borrowed(Self::VANILLA_NAMESPACE),
            path: Cow::Borrowed(path),
        }
    }

    /// Whether `namespace_char` may appear in a namespace.
    #[must_use]
    pub fn valid_namespace_char(namespace_char: char) -> bool {
        namespace_char == '_'
            || namespace_char == '-'
            || namespace_char.is_ascii_lowercase()
            || namespace_char.is_ascii_digit()
            || namespace_char == '.'
    }

    /// Whether `path_char` may appear in a path.
    #[must_use]
    pub fn valid_path_char(path_char: char) -> bool {
        Self::valid_namespace_char(path_char) || path_char == '/'
    }

    /// Whether both parts use only allowed characters.
    #[must_use]
    pub fn validate(namespace: &str, path: &str) -> bool {
        namespace.chars().all(Self::valid_namespace_char)
            && path.chars().all(Self::valid_path_char)
    }
}

impl Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceLocation {
    type Err = String;

    /// Parses `namespace:path`. A bare path gets the vanilla namespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .unwrap_or((Self::VANILLA_NAMESPACE, s));

        if !ResourceLocation::validate(namespace, path) {
            return Err(format!("Invalid resource location: {s}"));
        }

        Ok(ResourceLocation {
            namespace: Cow::Owned(namespace.to_string()),
            path: Cow::Owned(path.to_string()),
        })
    }
}

impl Serialize for ResourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
