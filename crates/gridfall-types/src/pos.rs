//! Grid coordinates.
//!
//! [`TilePos`] is the universal registry key: tiles, nodes, loose items,
//! stockpile storage, construction sites, and workstations are all addressed
//! by their `(x, y, z)` position. Cross-registry references go through
//! coordinates rather than shared ownership, which is what keeps the
//! agent → job → tile → zone graph cycle-free.
//!
//! Positions serialize as `"x,y,z"` strings so they can key JSON maps in
//! save snapshots.

use serde::{Deserialize, Serialize};

/// A tile coordinate in the 3-D grid volume.
///
/// `z = 0` is ground level; higher levels are upper floors and rooftops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TilePos {
    /// Column (west to east).
    pub x: i32,
    /// Row (north to south).
    pub y: i32,
    /// Vertical level (0 = ground).
    pub z: i32,
}

impl TilePos {
    /// Create a position from components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Manhattan distance to `other`, ignoring the z component.
    ///
    /// Vertical separation is scored separately by callers (stockpile
    /// placement penalizes cross-level hauls with a flat surcharge).
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Chebyshev (king-move) distance to `other`, ignoring the z component.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// The four orthogonal neighbors on the same level.
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x, self.y.wrapping_sub(1), self.z),
            Self::new(self.x, self.y.wrapping_add(1), self.z),
            Self::new(self.x.wrapping_sub(1), self.y, self.z),
            Self::new(self.x.wrapping_add(1), self.y, self.z),
        ]
    }

    /// The position directly above (one level up).
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y, self.z.wrapping_add(1))
    }

    /// The position directly below (one level down).
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y, self.z.wrapping_sub(1))
    }
}

impl core::fmt::Display for TilePos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl From<TilePos> for String {
    fn from(pos: TilePos) -> Self {
        pos.to_string()
    }
}

impl TryFrom<String> for TilePos {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut parts = value.split(',');
        let parse = |part: Option<&str>| -> Result<i32, String> {
            part.ok_or_else(|| format!("malformed tile position: {value}"))?
                .trim()
                .parse::<i32>()
                .map_err(|err| format!("malformed tile position {value}: {err}"))
        };
        let x = parse(parts.next())?;
        let y = parse(parts.next())?;
        let z = parse(parts.next())?;
        if parts.next().is_some() {
            return Err(format!("malformed tile position: {value}"));
        }
        Ok(Self::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_ignores_z() {
        let a = TilePos::new(2, 3, 0);
        let b = TilePos::new(5, 1, 4);
        assert_eq!(a.manhattan(b), 5);
    }

    #[test]
    fn chebyshev_takes_max_axis() {
        let a = TilePos::new(0, 0, 0);
        let b = TilePos::new(3, 7, 0);
        assert_eq!(a.chebyshev(b), 7);
    }

    #[test]
    fn neighbors_are_orthogonal() {
        let p = TilePos::new(4, 4, 1);
        let n = p.neighbors();
        for neighbor in n {
            assert_eq!(p.manhattan(neighbor), 1);
            assert_eq!(neighbor.z, 1);
        }
    }

    #[test]
    fn serializes_as_key_string() {
        let p = TilePos::new(-1, 12, 3);
        assert_eq!(serde_json::to_string(&p).ok(), Some(String::from("\"-1,12,3\"")));
    }

    #[test]
    fn roundtrip_through_string() {
        let p = TilePos::new(7, 0, 2);
        let restored = TilePos::try_from(String::from(p));
        assert_eq!(restored.ok(), Some(p));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(TilePos::try_from(String::from("1,2")).is_err());
        assert!(TilePos::try_from(String::from("1,2,3,4")).is_err());
        assert!(TilePos::try_from(String::from("a,b,c")).is_err());
    }
}
