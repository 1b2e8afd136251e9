//! Stateful UTF-8 decoding across arbitrary chunk boundaries.

/// Incremental UTF-8 decoder.
///
/// Network chunks can split a multi-byte character; the decoder returns the
/// longest decodable prefix of the accumulated bytes and keeps an incomplete
/// trailing sequence for the next chunk. Genuinely invalid sequences are
/// replaced with U+FFFD so a corrupt byte cannot stall the stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes and returns any newly decodable text.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_len]));
                    match e.error_len() {
                        Some(invalid_len) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid_len + invalid_len);
                        }
                        None => {
                            // Incomplete sequence at the tail, keep for the
                            // next chunk.
                            self.pending.drain(..valid_len);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Returns true while an incomplete character is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
