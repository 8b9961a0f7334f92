use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Generates a random alphanumeric string, used for connection keys.
pub fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_random_string() {
        let key = random_string(32);

        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, random_string(32), "keys should not repeat");
    }
}
