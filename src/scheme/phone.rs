use crate::error::{CrackError, Result};
use crate::scheme::PasswordScheme;

const PREFIXES: [&str; 10] = [
    "050", "051", "052", "053", "054", "055", "056", "057", "058", "059",
];
const NUMBERS_PER_PREFIX: u64 = 10_000_000;

/// Phone-number candidate space: `05X-XXXXXXX`.
///
/// A three-digit prefix from `050`..`059`, a dash, then a zero-padded
/// seven-digit suffix. 10 prefixes x 10,000,000 suffixes = 100,000,000
/// candidates; index `i` maps to prefix `i / 10^7` and suffix `i % 10^7`.
pub struct Phone05xScheme;

impl PasswordScheme for Phone05xScheme {
    fn name(&self) -> &'static str {
        "phone-05x"
    }

    fn size(&self) -> u64 {
        PREFIXES.len() as u64 * NUMBERS_PER_PREFIX
    }

    fn at(&self, index: u64) -> Result<String> {
        if index >= self.size() {
            return Err(CrackError::InvalidIndex {
                scheme: self.name(),
                index,
                size: self.size(),
            });
        }
        let prefix = PREFIXES[(index / NUMBERS_PER_PREFIX) as usize];
        let suffix = index % NUMBERS_PER_PREFIX;
        Ok(format!("{prefix}-{suffix:07}"))
    }
}
