//! Pastry node Id in a circular identifier space
use rand::Rng;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use sha1_smol::Sha1;

use crate::{Error, Result};

/// The size of node Ids in bytes.
pub const ID_SIZE: usize = 20;

#[derive(Clone, Copy, PartialEq, Ord, PartialOrd, Eq, Hash)]
/// Pastry node Id, a position in the circular space of size 2^160.
pub struct Id(pub [u8; ID_SIZE]);

/// Unsigned circular distance between two [Id]s, the minimum of the
/// clockwise and counter-clockwise arc lengths between them.
#[derive(Clone, Copy, PartialEq, Ord, PartialOrd, Eq)]
pub struct Distance([u8; ID_SIZE]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The half of the circular id space, relative to a local [Id], in which
/// another Id falls.
pub enum Side {
    /// Counter-clockwise of the local Id.
    Left,
    /// Clockwise of the local Id.
    Right,
}

impl Id {
    pub fn random() -> Id {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; ID_SIZE] = rng.gen();

        Id(random_bytes)
    }

    /// Create a new Id from some bytes. Returns Err if `bytes` is not of length
    /// [ID_SIZE].
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Id> {
        let bytes = bytes.as_ref();
        if bytes.len() != ID_SIZE {
            return Err(Error::InvalidIdSize(bytes.len()));
        }

        let mut tmp: [u8; ID_SIZE] = [0; ID_SIZE];
        tmp[..ID_SIZE].clone_from_slice(&bytes[..ID_SIZE]);

        Ok(Id(tmp))
    }

    /// Digest an arbitrary byte sequence into the id space.
    ///
    /// Deterministic, equal inputs always digest to equal Ids.
    pub fn digest<T: AsRef<[u8]>>(input: T) -> Id {
        let mut hasher = Sha1::new();
        hasher.update(input.as_ref());

        Id(hasher.digest().bytes())
    }

    /// Circular distance between this Id and another.
    ///
    /// The minimum of the clockwise and counter-clockwise arc lengths,
    /// so it is symmetric and usable for total ordering of candidates.
    ///
    /// Distance to self is zero.
    pub fn distance(&self, other: &Id) -> Distance {
        let clockwise = clockwise_arc(self, other);
        let counter = clockwise_arc(other, self);

        Distance(clockwise.min(counter))
    }

    /// The side of the circle, relative to this Id, on which `other` falls.
    ///
    /// Compares the clockwise arc from `self` to `other` against the
    /// counter-clockwise arc and picks the side of the shorter one.
    /// The antipodal tie resolves to [Side::Right] so that placement
    /// stays deterministic.
    pub fn side_of(&self, other: &Id) -> Side {
        let clockwise = clockwise_arc(self, other);
        let counter = clockwise_arc(other, self);

        if clockwise <= counter {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// Arc length from `from` to `to` walking the circle clockwise,
/// big-endian `to - from` wrapping around the 2^160 space.
fn clockwise_arc(from: &Id, to: &Id) -> [u8; ID_SIZE] {
    let mut arc = [0; ID_SIZE];
    let mut borrow = false;

    for i in (0..ID_SIZE).rev() {
        let (diff, underflow) = to.0[i].overflowing_sub(from.0[i]);
        let (diff, borrow_out) = diff.overflowing_sub(borrow as u8);

        arc[i] = diff;
        borrow = underflow || borrow_out;
    }

    arc
}

impl Side {
    /// The other half of the circle.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Distance {
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl Debug for Distance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({:x?})", &self.0)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Id> {
        if s.len() != ID_SIZE * 2 || !s.is_ascii() {
            return Err(Error::InvalidIdEncoding);
        }

        let mut bytes = [0; ID_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidIdEncoding)?;
        }

        Ok(Id(bytes))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(n: u128) -> Id {
        let mut bytes = [0; ID_SIZE];
        bytes[ID_SIZE - 16..].copy_from_slice(&n.to_be_bytes());

        Id(bytes)
    }

    fn distance(n: u128) -> Distance {
        Distance(id(n).0)
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(Id::digest(b"node announcement"), Id::digest(b"node announcement"));
        assert_ne!(Id::digest(b"node announcement"), Id::digest(b"other announcement"));
    }

    #[test]
    fn from_bytes_rejects_wrong_width() {
        assert!(matches!(Id::from_bytes([0; 19]), Err(Error::InvalidIdSize(19))));
        assert!(matches!(Id::from_bytes([0; 21]), Err(Error::InvalidIdSize(21))));
        assert!(Id::from_bytes([7; ID_SIZE]).is_ok());
    }

    #[test]
    fn from_str_roundtrip() {
        let id = Id::random();

        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
        assert!(matches!("not hexadecimal".parse::<Id>(), Err(Error::InvalidIdEncoding)));
    }

    #[test]
    fn distance_is_symmetric() {
        let (a, b) = (id(3), id(250));

        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&b), distance(247));
        assert_eq!(a.distance(&a), distance(0));
    }

    #[test]
    fn distance_wraps_the_shorter_way() {
        // 3 and 2^160 - 4 are 7 apart across the origin.
        let a = id(3);
        let mut b = Id([0xff; ID_SIZE]);
        b.0[ID_SIZE - 1] = 0xfc;

        assert_eq!(a.distance(&b), distance(7));
        assert_eq!(b.distance(&a), distance(7));
    }

    #[test]
    fn side_of_is_antisymmetric() {
        let (a, b) = (id(5), id(9));

        assert_eq!(a.side_of(&b), Side::Right);
        assert_eq!(b.side_of(&a), Side::Left);

        // The shorter arc from 5 to 2^160 - 2 runs counter-clockwise
        // across the origin.
        let mut c = Id([0xff; ID_SIZE]);
        c.0[ID_SIZE - 1] = 0xfe;

        assert_eq!(a.side_of(&c), Side::Left);
        assert_eq!(c.side_of(&a), Side::Right);
    }

    #[test]
    fn antipodal_tie_resolves_right() {
        let a = id(0);
        let mut bytes = [0; ID_SIZE];
        bytes[0] = 0x80;
        let b = Id(bytes);

        assert_eq!(a.side_of(&b), Side::Right);
        assert_eq!(b.side_of(&a), Side::Right);
    }

    #[test]
    fn opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
