use super::Tokenizer;

/// Placeholder tokenizer mapping characters to their ASCII values.
///
/// **Not a real tokenizer.** There is no vocabulary behind it; it exists
/// so the runtime can be driven end-to-end before a real encoder is
/// wired in. Plain English/numeric input only: anything outside ASCII
/// encodes to 0, and ids without a valid scalar decode to a space.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiTokenizer;

impl AsciiTokenizer {
    pub fn new() -> Self {
        AsciiTokenizer
    }
}

impl Tokenizer for AsciiTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.chars()
            .map(|c| if c.is_ascii() { c as u32 } else { 0 })
            .collect()
    }

    fn decode(&self, tokens: &[u32]) -> String {
        tokens
            .iter()
            .map(|&id| char::from_u32(id).unwrap_or(' '))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii() {
        let tok = AsciiTokenizer::new();
        assert_eq!(tok.encode("Hi"), vec![72, 105]);
        assert_eq!(tok.encode(""), Vec::<u32>::new());
    }

    #[test]
    fn test_encode_non_ascii_is_zero() {
        let tok = AsciiTokenizer::new();
        assert_eq!(tok.encode("né"), vec![110, 0]);
    }

    #[test]
    fn test_decode() {
        let tok = AsciiTokenizer::new();
        assert_eq!(tok.decode(&[72, 105, 33]), "Hi!");
    }

    #[test]
    fn test_decode_invalid_scalar_is_space() {
        let tok = AsciiTokenizer::new();
        assert_eq!(tok.decode(&[0xD800]), " ");
    }

    #[test]
    fn test_round_trip_plain_text() {
        let tok = AsciiTokenizer::new();
        let text = "Hello 123";
        assert_eq!(tok.decode(&tok.encode(text)), text);
    }
}
