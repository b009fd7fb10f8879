use rand::rngs::StdRng;
use rand::SeedableRng;

/// Sum of the Unicode code points of every character across `keys`.
///
/// Order-insensitive and collision-prone.
pub fn seed_from_keys(keys: &[&str]) -> u64 {
    keys.iter()
        .flat_map(|k| k.chars())
        .map(|c| u64::from(u32::from(c)))
        .sum()
}

pub fn rng_from_keys(keys: &[&str]) -> StdRng {
    StdRng::seed_from_u64(seed_from_keys(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn seed_is_sum_of_code_points() {
        // W h e a t = 87+104+101+97+116, A s i a = 65+115+105+97
        assert_eq!(seed_from_keys(&["Wheat", "Asia"]), 887);
        assert_eq!(seed_from_keys(&["WheatAsia"]), 887);
        assert_eq!(seed_from_keys(&[]), 0);
    }

    #[test]
    fn non_ascii_keys_use_code_points() {
        assert_eq!(seed_from_keys(&["é"]), 0xE9);
    }

    #[test]
    fn streams_are_pinned_across_runs() {
        let mut asia = rng_from_keys(&["Asia"]);
        let xs: Vec<u32> = (0..3).map(|_| asia.gen()).collect();
        assert_eq!(xs, vec![3_695_747_503, 4_179_321_918, 3_112_524_169]);

        let mut wheat_asia = rng_from_keys(&["Wheat", "Asia"]);
        let ys: Vec<u64> = (0..2).map(|_| wheat_asia.gen()).collect();
        assert_eq!(ys, vec![3_565_322_151_226_958_586, 17_903_201_183_096_324_683]);
    }

    #[test]
    fn same_keys_same_stream() {
        let mut a = rng_from_keys(&["Corn", "Europe"]);
        let mut b = rng_from_keys(&["Corn", "Europe"]);
        let xs: Vec<u64> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
