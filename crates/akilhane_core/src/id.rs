//! Record id generation.
//!
//! Ids have the shape `{prefix}_{epochMillis}_{suffix}` where the suffix is
//! nine random base-36 characters. The local store checks each new id against
//! the collection snapshot before accepting it.

use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of record identifiers.
pub trait IdGenerator: Send {
    /// Generates a new id for a record of kind `prefix`.
    fn generate(&self, prefix: &str) -> String;
}

/// Time-plus-random id generator used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{prefix}_{}_{suffix}", Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_shape() {
        let id = RandomIdGenerator.generate("question");
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "question");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn generated_ids_differ() {
        let a = RandomIdGenerator.generate("subject");
        let b = RandomIdGenerator.generate("subject");
        assert_ne!(a, b);
    }
}
