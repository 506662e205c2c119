use fnv::FnvHasher;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::{
    collections::HashMap,
    hash::{BuildHasherDefault, Hash}
};

pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FnvHasher>>;

/// Construct a hash map with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers.
/// Note it is less robust against security attacks on key collisions.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashMap::<K, V, _>::with_capacity_and_hasher(capacity, fnv)
}

/// The random source for maze building, fixed by `seed` or seeded from the OS.
pub fn xorshift_rng(seed: Option<u64>) -> XorShiftRng {
    match seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn seeded_rngs_agree() {
        let mut a = xorshift_rng(Some(8));
        let mut b = xorshift_rng(Some(8));
        let xs = (0..16).map(|_| a.gen::<u32>()).collect::<Vec<_>>();
        let ys = (0..16).map(|_| b.gen::<u32>()).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }
}
