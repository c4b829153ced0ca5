// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-to-bytes conversion for printer code pages.
//
// Two tiers, neither of which can fail: a recognised label encodes with `?`
// substituted for every code point the target cannot represent; an
// unrecognised label falls back to UTF-8.

use encoding_rs::{EncoderResult, Encoding, UTF_8};
use tracing::warn;

/// Byte written in place of an unrepresentable character.
pub const REPLACEMENT: u8 = b'?';

/// A resolved output character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    /// 7-bit ASCII; anything above U+007F becomes `?`.
    Ascii,
    /// Any single- or multi-byte legacy encoding known to `encoding_rs`.
    Legacy(&'static Encoding),
}

impl Charset {
    /// Look up a label such as `utf-8`, `cp1252`, `shift_jis` or `gbk`.
    /// Returns `None` for labels nobody recognises.
    pub fn resolve(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        match label.as_str() {
            "ascii" | "us-ascii" | "646" => return Some(Self::Ascii),
            "latin-1" => return Some(Self::Legacy(encoding_rs::WINDOWS_1252)),
            _ => {}
        }
        let encoding = Encoding::for_label(label.as_bytes())?.output_encoding();
        if encoding == UTF_8 {
            Some(Self::Utf8)
        } else {
            Some(Self::Legacy(encoding))
        }
    }

    /// Resolve `label`, falling back to UTF-8 when it is unknown.
    pub fn resolve_or_utf8(label: &str) -> Self {
        Self::resolve(label).unwrap_or_else(|| {
            warn!(label, "unknown text encoding, falling back to utf-8");
            Self::Utf8
        })
    }

    /// Encode `text`, substituting `?` for unrepresentable characters.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT })
                .collect(),
            Self::Legacy(encoding) => encode_substituting(text, encoding),
        }
    }
}

fn encode_substituting(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut chunk = [0u8; 1024];
    let mut remaining = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(remaining, &mut chunk, true);
        out.extend_from_slice(&chunk[..written]);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(REPLACEMENT),
        }
    }
    out
}

/// Encode `text` under `label` with both fallback tiers applied.
pub fn encode_text(text: &str, label: &str) -> Vec<u8> {
    Charset::resolve_or_utf8(label).encode(text)
}
