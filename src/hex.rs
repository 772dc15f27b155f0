use std::fmt;

/// Formats a byte slice as contiguous lowercase hex, for trace logging of raw frames.
pub struct Hex<'a>(pub &'a [u8]);

impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Parses a hex dump. Whitespace is ignored, so test vectors can be grouped by field.
#[cfg(test)]
pub(crate) fn parse(s: &str) -> Vec<u8> {
    let digits = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    assert!(digits.is_ascii());
    assert_eq!(digits.len() % 2, 0, "odd number of hex digits");

    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("00abff"), &[0x00, 0xab, 0xff]);
        assert_eq!(parse("0000 0005\n 1f90"), &[0, 0, 0, 5, 0x1f, 0x90]);
    }

    #[test]
    fn display() {
        assert_eq!(Hex(&[0x00, 0x0a, 0xff]).to_string(), "000aff");
        assert_eq!(Hex(&[]).to_string(), "");
    }
}
