//! World coordinates, region cells and the level-of-detail taxonomy.

/// How far coordinates shift right to produce a region index: cells are
/// 4096 world units on each side.
pub const REGION_SHIFT: i32 = 12;

/// Offset added after the shift so every in-range world coordinate maps
/// to a non-negative region index.
pub const REGION_OFFSET: i32 = 32;

/// A point in the world. Coordinates are the client's fixed-point world
/// units; `heading` is the 16-bit facing angle the client uses.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub heading: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self {
            x,
            y,
            z,
            heading: 0,
        }
    }

    pub fn region(self) -> RegionPos {
        RegionPos::from_world(self.x, self.y)
    }

    /// Squared planar distance to `(x, y)`, in i64 to survive the square.
    pub fn distance_sq(self, x: i32, y: i32) -> i64 {
        let dx = i64::from(x) - i64::from(self.x);
        let dy = i64::from(y) - i64::from(self.y);

        dx * dx + dy * dy
    }
}

/// The X and Y index of a region cell.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct RegionPos {
    pub rx: i32,
    pub ry: i32,
}

impl RegionPos {
    pub const fn new(rx: i32, ry: i32) -> Self {
        Self { rx, ry }
    }

    pub const fn from_world(x: i32, y: i32) -> Self {
        Self {
            rx: (x >> REGION_SHIFT) + REGION_OFFSET,
            ry: (y >> REGION_SHIFT) + REGION_OFFSET,
        }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            rx: self.rx + dx,
            ry: self.ry + dy,
        }
    }

    /// The bucket an object in `other` lands in for an observer in `self`,
    /// or `None` when `other` is outside the 3×3 neighborhood.
    pub fn bucket_of(self, other: Self) -> Option<LodBucket> {
        let dx = (other.rx - self.rx).abs();
        let dy = (other.ry - self.ry).abs();

        match (dx, dy) {
            (0, 0) => Some(LodBucket::Near),
            (1, 0) | (0, 1) => Some(LodBucket::Medium),
            (1, 1) => Some(LodBucket::Far),
            _ => None,
        }
    }
}

impl From<(i32, i32)> for RegionPos {
    fn from((rx, ry): (i32, i32)) -> Self {
        Self { rx, ry }
    }
}

/// The three per-observer cache buckets.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LodBucket {
    Near,
    Medium,
    Far,
}

/// Observation radius of a broadcast or a cell scan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LodLevel {
    /// The observer's own cell.
    Near,
    /// Own cell plus the four edge-adjacent cells.
    Medium,
    /// Own cell plus the four diagonal cells.
    Far,
    /// The whole 3×3 block.
    All,
}

const NEAR_OFFSETS: [(i32, i32); 1] = [(0, 0)];
const MEDIUM_OFFSETS: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];
const FAR_OFFSETS: [(i32, i32); 5] = [(0, 0), (-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl LodLevel {
    /// Cell offsets scanned at this level, relative to the center cell.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            LodLevel::Near => &NEAR_OFFSETS,
            LodLevel::Medium => &MEDIUM_OFFSETS,
            LodLevel::Far => &FAR_OFFSETS,
            LodLevel::All => &ALL_OFFSETS,
        }
    }

    /// Whether an observer whose cache holds the source in `bucket` is
    /// reached by a broadcast at this level.
    pub fn includes(self, bucket: LodBucket) -> bool {
        match self {
            LodLevel::Near => bucket == LodBucket::Near,
            LodLevel::Medium => matches!(bucket, LodBucket::Near | LodBucket::Medium),
            LodLevel::Far => matches!(bucket, LodBucket::Near | LodBucket::Far),
            LodLevel::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_coordinates_map_to_non_negative_cells() {
        // The live world spans roughly -131k..+228k on both axes.
        for (x, y) in [
            (-131_072, -131_072),
            (0, 0),
            (-1, -1),
            (228_607, 228_607),
            (83_400, 148_608),
        ] {
            let pos = RegionPos::from_world(x, y);
            assert!(pos.rx >= 0, "rx for {x} is {}", pos.rx);
            assert!(pos.ry >= 0, "ry for {y} is {}", pos.ry);
        }
    }

    #[test]
    fn cell_boundaries_follow_the_shift() {
        let a = RegionPos::from_world(0, 0);
        let b = RegionPos::from_world((1 << REGION_SHIFT) - 1, 0);
        let c = RegionPos::from_world(1 << REGION_SHIFT, 0);

        assert_eq!(a, b);
        assert_eq!(c, a.offset(1, 0));
    }

    #[test]
    fn bucket_classification_covers_the_neighborhood() {
        let center = RegionPos::new(40, 40);

        assert_eq!(center.bucket_of(center), Some(LodBucket::Near));
        assert_eq!(
            center.bucket_of(center.offset(1, 0)),
            Some(LodBucket::Medium)
        );
        assert_eq!(
            center.bucket_of(center.offset(0, -1)),
            Some(LodBucket::Medium)
        );
        assert_eq!(center.bucket_of(center.offset(1, 1)), Some(LodBucket::Far));
        assert_eq!(
            center.bucket_of(center.offset(-1, 1)),
            Some(LodBucket::Far)
        );
        assert_eq!(center.bucket_of(center.offset(2, 0)), None);
    }

    #[test]
    fn lod_filter_matches_the_bucket_taxonomy() {
        assert!(LodLevel::Near.includes(LodBucket::Near));
        assert!(!LodLevel::Near.includes(LodBucket::Medium));
        assert!(!LodLevel::Near.includes(LodBucket::Far));

        assert!(LodLevel::Medium.includes(LodBucket::Near));
        assert!(LodLevel::Medium.includes(LodBucket::Medium));
        assert!(!LodLevel::Medium.includes(LodBucket::Far));

        assert!(LodLevel::Far.includes(LodBucket::Near));
        assert!(!LodLevel::Far.includes(LodBucket::Medium));
        assert!(LodLevel::Far.includes(LodBucket::Far));

        assert!(LodLevel::All.includes(LodBucket::Medium));
        assert!(LodLevel::All.includes(LodBucket::Far));
    }

    #[test]
    fn location_region_agrees_with_raw_cell_math() {
        use rand::Rng;

        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let x = rng.gen_range(-131_072..228_608);
            let y = rng.gen_range(-131_072..228_608);

            assert_eq!(Location::new(x, y, 0).region(), RegionPos::from_world(x, y));
        }
    }

    #[test]
    fn offsets_have_the_documented_shapes() {
        assert_eq!(LodLevel::Near.offsets().len(), 1);
        assert_eq!(LodLevel::Medium.offsets().len(), 5);
        assert_eq!(LodLevel::Far.offsets().len(), 5);
        assert_eq!(LodLevel::All.offsets().len(), 9);
    }
}
