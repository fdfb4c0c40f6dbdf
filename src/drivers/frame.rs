use crate::drivers::ScopeError;
use crate::scope::SAMPLE_MAX;
/// Decodes one inbound frame of little-endian 16-bit samples.
///
/// Codes above the 12-bit range are clamped to full scale.
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<u16>, ScopeError> {
    if bytes.is_empty() {
        return Err(ScopeError::EmptyFrame);
    }
    if bytes.len() % 2 != 0 {
        return Err(ScopeError::OddFrameLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]).min(SAMPLE_MAX))
        .collect())
}
pub fn encode_frame(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
/// Re-chunks a byte stream into whole-sample frames.
///
/// Stream transports can split a sample across reads; the dangling byte is held
/// until the next read completes it.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    carry: Option<u8>,
}
impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns an even-length frame, or `None` if the read held less than one sample.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Vec<u8>> {
        let mut frame = Vec::with_capacity(chunk.len() + 1);
        frame.extend(self.carry.take());
        frame.extend_from_slice(chunk);
        if frame.len() % 2 != 0 {
            self.carry = frame.pop();
        }
        if frame.is_empty() {
            None
        } else {
            Some(frame)
        }
    }
    /// Drops a half-received sample, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.carry = None;
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn decodes_little_endian() {
        let samples = decode_frame(&[0x00, 0x00, 0xff, 0x0f, 0x34, 0x12]).unwrap();
        // 0x1234 is above 12 bits and clamps.
        assert_eq!(samples, vec![0, 4095, 4095]);
        assert_eq!(decode_frame(&encode_frame(&[1, 2048, 4095])).unwrap(), vec![1, 2048, 4095]);
    }
    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(decode_frame(&[]), Err(ScopeError::EmptyFrame)));
        assert!(matches!(
            decode_frame(&[1, 2, 3]),
            Err(ScopeError::OddFrameLength(3))
        ));
    }
    #[test]
    fn assembler_carries_split_sample() {
        let bytes = encode_frame(&[100, 200, 300]);
        let mut asm = FrameAssembler::new();
        assert_eq!(asm.push(&bytes[..1]), None);
        let first = asm.push(&bytes[1..4]).unwrap();
        assert_eq!(decode_frame(&first).unwrap(), vec![100, 200]);
        let second = asm.push(&bytes[4..]).unwrap();
        assert_eq!(decode_frame(&second).unwrap(), vec![300]);
        asm.push(&[7]);
        asm.reset();
        assert_eq!(asm.push(&[1, 0]), Some(vec![1, 0]));
    }
}
