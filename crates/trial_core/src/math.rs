//! Fixed-point math utilities for deterministic simulation.
//!
//! All game simulation uses fixed-point arithmetic to ensure
//! deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Pi as a raw-bit constant (`round(pi * 2^32)`).
///
/// `Fixed::from_num` is not const, so the trig constants are spelled
/// as bit patterns.
pub const FIXED_PI: Fixed = Fixed::from_bits(13_493_037_705);

/// Two pi as a raw-bit constant.
pub const FIXED_TWO_PI: Fixed = Fixed::from_bits(26_986_075_409);

/// Half pi as a raw-bit constant.
pub const FIXED_HALF_PI: Fixed = Fixed::from_bits(6_746_518_852);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
///
/// Serializes optional fixed-point numbers via their raw bit representation,
/// preserving `None` as a serialized `None` value.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_bits()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

/// Serde support for `Vec<Fixed>`.
///
/// Used by cooldown banks and other fixed-point collections.
pub mod fixed_vec_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a vector of fixed-point numbers as raw bits.
    pub fn serialize<S>(values: &[Fixed], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: Vec<i64> = values.iter().map(|v| v.to_bits()).collect();
        bits.serialize(serializer)
    }

    /// Deserialize a vector of fixed-point numbers from raw bits.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = Vec::<i64>::deserialize(deserializer)?;
        Ok(bits.into_iter().map(Fixed::from_bits).collect())
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Squared length of the vector.
    #[must_use]
    pub fn length_squared(self) -> Fixed {
        self.dot(self)
    }

    /// Length of the vector via fixed-point sqrt.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.length_squared())
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }

    /// Clamp the vector's magnitude to `max`, preserving direction.
    ///
    /// Raw input vectors pass through this before reaching the player
    /// state; fixed-point admits no NaN, so defensive input handling
    /// reduces to a magnitude clamp.
    #[must_use]
    pub fn clamp_magnitude(self, max: Fixed) -> Self {
        if max <= Fixed::ZERO {
            return Self::ZERO;
        }
        let len_sq = self.length_squared();
        if len_sq <= max * max {
            return self;
        }
        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }
        Self::new(self.x * max / len, self.y * max / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Fixed-point sine using the Bhaskara I approximation.
///
/// Exact at 0, pi/2 and pi; maximum error is about 0.0016 in between,
/// which is far below anything the hover paths can show. Deterministic
/// by construction - no tables, no platform intrinsics.
#[must_use]
pub fn fixed_sin(angle: Fixed) -> Fixed {
    // Reduce into [0, 2*pi).
    let mut x = angle % FIXED_TWO_PI;
    if x < Fixed::ZERO {
        x += FIXED_TWO_PI;
    }

    let (x, negate) = if x > FIXED_PI {
        (x - FIXED_PI, true)
    } else {
        (x, false)
    };

    // sin(x) ~= 16x(pi - x) / (5*pi^2 - 4x(pi - x)) for x in [0, pi]
    let prod = x * (FIXED_PI - x);
    let num = Fixed::from_num(16) * prod;
    let den = Fixed::from_num(5) * FIXED_PI * FIXED_PI - Fixed::from_num(4) * prod;
    if den == Fixed::ZERO {
        return Fixed::ZERO;
    }
    let result = num / den;
    if negate {
        -result
    } else {
        result
    }
}

/// Fixed-point cosine via the sine approximation.
#[must_use]
pub fn fixed_cos(angle: Fixed) -> Fixed {
    fixed_sin(angle + FIXED_HALF_PI)
}

/// Rectangular play area, origin at the bottom-left corner.
///
/// The simulation is y-up: enemies descend from `height` toward the
/// player near y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    /// Playfield width in world units.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Playfield height in world units.
    #[serde(with = "fixed_serde")]
    pub height: Fixed,
}

impl Arena {
    /// Create an arena with the given dimensions.
    #[must_use]
    pub const fn new(width: Fixed, height: Fixed) -> Self {
        Self { width, height }
    }

    /// Center point of the arena.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        let two = Fixed::from_num(2);
        Vec2Fixed::new(self.width / two, self.height / two)
    }

    /// Clamp a point to lie inside the arena, inset by `margin` on all sides.
    #[must_use]
    pub fn clamp_point(&self, point: Vec2Fixed, margin: Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(margin, self.width - margin),
            point.y.clamp(margin, self.height - margin),
        )
    }

    /// Whether a point lies within the arena expanded by `margin` on all sides.
    ///
    /// Used by the cleanup sweep: anything outside the expanded rectangle
    /// is reclaimed.
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2Fixed, margin: Fixed) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

impl Default for Arena {
    /// Portrait phone playfield the original game targeted.
    fn default() -> Self {
        Self {
            width: Fixed::from_num(390),
            height: Fixed::from_num(844),
        }
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<Fixed> for Vec2Fixed {
    type Output = Self;

    fn mul(self, rhs: Fixed) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
