//! NMEA 0183 sentence decoder.
//!
//! A character-driven state machine that assembles one sentence at a time
//! into ordered terms, validates the XOR checksum, and yields a parsed
//! [`AivdmFragment`] for every valid `AIVDM` sentence. Anything else on the
//! bus (GPS sentences, noise, partial lines) is consumed and ignored; a
//! `'$'` or `'!'` start marker always resynchronizes.

use crate::error::FramingError;

/// Maximum characters in a single sentence term.
///
/// The armored payload is the longest term; NMEA caps a sentence at 82
/// characters, so a payload term never legitimately exceeds 62. Anything
/// longer invalidates the sentence.
pub const MAX_TERM_LEN: usize = 72;

/// Capacity of an armored payload buffer, sized for a fully assembled
/// multi-fragment message (up to five near-full fragments).
pub const PAYLOAD_CAPACITY: usize = 384;

/// An owned fixed-capacity armored-text buffer.
///
/// Re-expresses the firmware-style `char[]` payload buffers as a
/// bounds-checked array with an explicit length; overflow is a recoverable
/// error, never undefined behavior.
#[derive(Clone)]
pub struct PayloadBuf {
    bytes: [u8; PAYLOAD_CAPACITY],
    len: usize,
}

/// Internal marker for a full buffer; mapped to the caller's error domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

impl PayloadBuf {
    pub const fn new() -> Self {
        PayloadBuf {
            bytes: [0; PAYLOAD_CAPACITY],
            len: 0,
        }
    }

    /// Append armored characters, bounds-checked.
    pub fn extend_from_slice(&mut self, src: &[u8]) -> Result<(), BufferFull> {
        if self.len + src.len() > PAYLOAD_CAPACITY {
            return Err(BufferFull);
        }
        self.bytes[self.len..self.len + src.len()].copy_from_slice(src);
        self.len += src.len();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for PayloadBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PayloadBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for PayloadBuf {}

impl std::fmt::Debug for PayloadBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Armored text is printable ASCII by construction
        write!(f, "\"{}\"", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl From<&[u8]> for PayloadBuf {
    /// Build from a slice, truncating at capacity. Used by tests and hosts
    /// that already hold a bounded payload.
    fn from(src: &[u8]) -> Self {
        let mut buf = PayloadBuf::new();
        let take = src.len().min(PAYLOAD_CAPACITY);
        let _ = buf.extend_from_slice(&src[..take]);
        buf
    }
}

/// One parsed `AIVDM` sentence.
///
/// Produced by [`SentenceDecoder`] on successful checksum validation and
/// consumed immediately by the fragment reassembler.
#[derive(Debug, Clone, PartialEq)]
pub struct AivdmFragment {
    /// Fragment count in this logical message
    pub total: u8,
    /// This fragment's 1-based index
    pub num: u8,
    /// Sequential message id correlating fragments of one message;
    /// `None` implies a single-fragment message
    pub id: Option<u8>,
    /// Padding bits in the final 6-bit group of this fragment
    pub fill_bits: u8,
    /// Raw armored payload text
    pub payload: PayloadBuf,
}

/// Character-driven NMEA sentence decoder.
///
/// Feed it one byte at a time with [`SentenceDecoder::put`]; all state is
/// per-sentence and reset on every start marker.
#[derive(Debug)]
pub struct SentenceDecoder {
    term: [u8; MAX_TERM_LEN],
    term_len: usize,
    term_number: u8,
    checksum: u8,
    term_is_checksum: bool,
    sentence_valid: bool,
    sentence_done: bool,
    active: bool,
    is_aivdm: bool,
    total: u8,
    num: u8,
    id: Option<u8>,
    fill_bits: u8,
    payload: PayloadBuf,
}

impl Default for SentenceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceDecoder {
    pub fn new() -> Self {
        SentenceDecoder {
            term: [0; MAX_TERM_LEN],
            term_len: 0,
            term_number: 0,
            checksum: 0,
            term_is_checksum: false,
            sentence_valid: false,
            sentence_done: false,
            active: false,
            is_aivdm: false,
            total: 0,
            num: 0,
            id: None,
            fill_bits: 0,
            payload: PayloadBuf::new(),
        }
    }

    /// Consume one byte from the stream.
    ///
    /// Returns `Ok(Some(fragment))` when the byte closed a valid `AIVDM`
    /// sentence, `Ok(None)` when more input is needed (or the sentence was
    /// not ours), and `Err` when the byte invalidated the current sentence.
    /// After an error the decoder is still safe to feed; it resynchronizes
    /// on the next start marker.
    pub fn put(&mut self, c: u8) -> Result<Option<AivdmFragment>, FramingError> {
        match c {
            b'$' | b'!' => {
                self.reset_sentence();
                self.active = true;
                Ok(None)
            }
            _ if !self.active => Ok(None),
            b'\r' | b'\n' => self.close_sentence(),
            b'*' => {
                if self.term_is_checksum {
                    // Second '*' in one sentence
                    self.sentence_valid = false;
                    self.active = false;
                    return Err(FramingError::InvalidTerm {
                        index: self.term_number,
                    });
                }
                let result = self.parse_term();
                self.term_is_checksum = true;
                self.term_len = 0;
                result.map(|_| None)
            }
            b',' if !self.term_is_checksum => {
                self.checksum ^= c;
                let result = self.parse_term();
                self.term_number = self.term_number.saturating_add(1);
                self.term_len = 0;
                result.map(|_| None)
            }
            _ => {
                if !self.term_is_checksum {
                    self.checksum ^= c;
                }
                if self.term_len >= MAX_TERM_LEN {
                    self.sentence_valid = false;
                    self.active = false;
                    return Err(FramingError::TermOverflow {
                        index: self.term_number,
                        limit: MAX_TERM_LEN,
                    });
                }
                self.term[self.term_len] = c;
                self.term_len += 1;
                Ok(None)
            }
        }
    }

    fn reset_sentence(&mut self) {
        self.term_len = 0;
        self.term_number = 0;
        self.checksum = 0;
        self.term_is_checksum = false;
        self.sentence_valid = true;
        self.sentence_done = false;
        self.active = false;
        self.is_aivdm = false;
        self.total = 0;
        self.num = 0;
        self.id = None;
        self.fill_bits = 0;
        self.payload.clear();
    }

    /// Terminator seen; verify the checksum and emit the fragment.
    fn close_sentence(&mut self) -> Result<Option<AivdmFragment>, FramingError> {
        if self.sentence_done {
            // CR already closed this sentence; swallow the LF
            return Ok(None);
        }
        self.sentence_done = true;
        self.active = false;

        if !self.term_is_checksum {
            // No checksum section at all; not a decodable sentence
            return Ok(None);
        }
        if !self.is_aivdm {
            // Some other talker; silently ignored
            return Ok(None);
        }

        let received = self.parse_checksum_term()?;
        if received != self.checksum {
            return Err(FramingError::ChecksumMismatch {
                computed: self.checksum,
                received,
            });
        }
        if !self.sentence_valid || self.term_number < 6 {
            // A term failed earlier, or the sentence ended short
            return Ok(None);
        }

        Ok(Some(AivdmFragment {
            total: self.total,
            num: self.num,
            id: self.id,
            fill_bits: self.fill_bits,
            payload: std::mem::take(&mut self.payload),
        }))
    }

    fn parse_checksum_term(&self) -> Result<u8, FramingError> {
        if self.term_len != 2 {
            return Err(FramingError::ChecksumNotHex(
                *self.term.get(self.term_len.saturating_sub(1)).unwrap_or(&0),
            ));
        }
        let hi = char_to_hex(self.term[0]).ok_or(FramingError::ChecksumNotHex(self.term[0]))?;
        let lo = char_to_hex(self.term[1]).ok_or(FramingError::ChecksumNotHex(self.term[1]))?;
        Ok(hi << 4 | lo)
    }

    /// Validate/convert the term that just ended.
    fn parse_term(&mut self) -> Result<(), FramingError> {
        // Once a term has failed (or the talker isn't AIVDM) the rest of the
        // sentence is consumed without further interpretation.
        if self.term_number > 0 && (!self.sentence_valid || !self.is_aivdm) {
            return Ok(());
        }

        let term = &self.term[..self.term_len];
        match self.term_number {
            0 => {
                self.is_aivdm = term == b"AIVDM";
                Ok(())
            }
            1 => match parse_u8(term) {
                Some(total @ 1..=9) => {
                    self.total = total;
                    Ok(())
                }
                _ => self.fail_term(),
            },
            2 => match parse_u8(term) {
                Some(num) if num >= 1 && num <= self.total => {
                    self.num = num;
                    Ok(())
                }
                _ => self.fail_term(),
            },
            3 => {
                if term.is_empty() {
                    self.id = None;
                    Ok(())
                } else {
                    match parse_u8(term) {
                        Some(id) => {
                            self.id = Some(id);
                            Ok(())
                        }
                        None => self.fail_term(),
                    }
                }
            }
            4 => Ok(()), // radio channel, not needed for decoding
            5 => match self.payload.extend_from_slice(term) {
                Ok(()) => Ok(()),
                Err(BufferFull) => self.fail_term(),
            },
            6 => match parse_u8(term) {
                Some(fill @ 0..=5) => {
                    self.fill_bits = fill;
                    Ok(())
                }
                _ => self.fail_term(),
            },
            _ => Ok(()), // trailing terms are tolerated
        }
    }

    fn fail_term(&mut self) -> Result<(), FramingError> {
        self.sentence_valid = false;
        Err(FramingError::InvalidTerm {
            index: self.term_number,
        })
    }
}

fn parse_u8(term: &[u8]) -> Option<u8> {
    std::str::from_utf8(term).ok()?.parse().ok()
}

fn char_to_hex(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Compute the NMEA checksum of a sentence body (everything between the
/// start marker and `'*'`, exclusive).
pub fn nmea_checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, c| acc ^ c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut SentenceDecoder, text: &str) -> Vec<AivdmFragment> {
        let mut out = Vec::new();
        for b in text.bytes() {
            if let Ok(Some(fragment)) = decoder.put(b) {
                out.push(fragment);
            }
        }
        out
    }

    const FIXTURE: &str = "!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C\r\n";

    #[test]
    fn test_valid_single_fragment() {
        let mut decoder = SentenceDecoder::new();
        let fragments = feed(&mut decoder, FIXTURE);
        assert_eq!(fragments.len(), 1);
        let f = &fragments[0];
        assert_eq!(f.total, 1);
        assert_eq!(f.num, 1);
        assert_eq!(f.id, None);
        assert_eq!(f.fill_bits, 0);
        assert_eq!(f.payload.as_bytes(), b"15M67FC000G?ufbE`FepT@3n00Sa");
    }

    #[test]
    fn test_dollar_start_marker_accepted() {
        let mut decoder = SentenceDecoder::new();
        let fragments = feed(&mut decoder, &FIXTURE.replace('!', "$"));
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_checksum_round_trip() {
        let body = b"AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0";
        let checksum = nmea_checksum(body);
        assert_eq!(checksum, 0x5C);

        let sentence = format!("!{}*{:02X}\r\n", String::from_utf8_lossy(body), checksum);
        let mut decoder = SentenceDecoder::new();
        assert_eq!(feed(&mut decoder, &sentence).len(), 1);
    }

    #[test]
    fn test_single_character_flip_invalidates() {
        let original = FIXTURE.as_bytes();
        // Flip each payload character in turn; none may produce a fragment
        for i in 14..42 {
            let mut mutated = original.to_vec();
            mutated[i] ^= 0x01;
            let mut decoder = SentenceDecoder::new();
            let text = String::from_utf8_lossy(&mutated).into_owned();
            assert_eq!(feed(&mut decoder, &text).len(), 0, "flip at {}", i);
        }
    }

    #[test]
    fn test_checksum_mismatch_reported() {
        let bad = FIXTURE.replace("5C", "5D");
        let mut decoder = SentenceDecoder::new();
        let mut saw_mismatch = false;
        for b in bad.bytes() {
            if let Err(FramingError::ChecksumMismatch { computed, received }) = decoder.put(b) {
                assert_eq!(computed, 0x5C);
                assert_eq!(received, 0x5D);
                saw_mismatch = true;
            }
        }
        assert!(saw_mismatch);
    }

    #[test]
    fn test_non_hex_checksum_invalidates() {
        let bad = FIXTURE.replace("5C", "5X");
        let mut decoder = SentenceDecoder::new();
        let mut saw_error = false;
        for b in bad.bytes() {
            match decoder.put(b) {
                Err(FramingError::ChecksumNotHex(_)) => saw_error = true,
                Err(e) => panic!("unexpected error {:?}", e),
                Ok(Some(_)) => panic!("fragment from invalid sentence"),
                Ok(None) => {}
            }
        }
        assert!(saw_error);
    }

    #[test]
    fn test_other_talkers_silently_ignored() {
        let mut decoder = SentenceDecoder::new();
        // A GPS sentence sharing the bus; checksum is irrelevant because the
        // talker is not AIVDM
        for b in b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,,*47\r\n" {
            assert_eq!(decoder.put(*b).unwrap(), None);
        }
        // Decoder still works afterwards
        let fragments = feed(&mut decoder, FIXTURE);
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_resynchronizes_after_noise() {
        let mut decoder = SentenceDecoder::new();
        for b in b"garbage\x00\xff!AIVDM,1,1" {
            let _ = decoder.put(*b);
        }
        // A new start marker abandons the partial sentence
        let fragments = feed(&mut decoder, FIXTURE);
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_oversized_term_invalidates() {
        let mut decoder = SentenceDecoder::new();
        let mut sentence = String::from("!AIVDM,1,1,,B,");
        sentence.push_str(&"0".repeat(MAX_TERM_LEN + 1));
        let mut saw_overflow = false;
        for b in sentence.bytes() {
            if let Err(FramingError::TermOverflow { .. }) = decoder.put(b) {
                saw_overflow = true;
            }
        }
        assert!(saw_overflow);
    }

    #[test]
    fn test_bad_fragment_counts_invalidate() {
        // num > total
        let body = "AIVDM,1,2,,B,15M67FC000G?ufbE`FepT@3n00Sa,0";
        let sentence = format!("!{}*{:02X}\r\n", body, nmea_checksum(body.as_bytes()));
        let mut decoder = SentenceDecoder::new();
        assert_eq!(feed(&mut decoder, &sentence).len(), 0);
    }

    #[test]
    fn test_crlf_handled_once() {
        let mut decoder = SentenceDecoder::new();
        // The CR closes the sentence; the LF must not re-close or error
        let fragments = feed(&mut decoder, FIXTURE);
        assert_eq!(fragments.len(), 1);
        assert_eq!(decoder.put(b'\n').unwrap(), None);
    }

    #[test]
    fn test_multi_fragment_sentence_parses_id() {
        let body = "AIVDM,2,1,3,B,55P5TL01VIaAL@7WKO@mBplU@<PDhh000000001S;AJ::4A80?4i@E53,0";
        let sentence = format!("!{}*{:02X}\r\n", body, nmea_checksum(body.as_bytes()));
        let mut decoder = SentenceDecoder::new();
        let fragments = feed(&mut decoder, &sentence);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].total, 2);
        assert_eq!(fragments[0].num, 1);
        assert_eq!(fragments[0].id, Some(3));
    }
}
