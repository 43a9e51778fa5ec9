//! Shared fixtures: minimal PCM WAV files for tag round-trip tests

use std::path::Path;

/// Write a valid mono 16-bit PCM WAV file of roughly `seconds` seconds.
pub fn write_wav(path: &Path, seconds: u32) {
    let sample_rate: u32 = 8000;
    let byte_rate: u32 = sample_rate * 2;
    let data_len: u32 = byte_rate * seconds;

    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk: PCM, mono, 16-bit
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());

    // data chunk: silence
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(44 + data_len as usize, 0);

    std::fs::write(path, buf).expect("failed to write test wav");
}
