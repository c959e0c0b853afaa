//! Text encodings used for commands and line reads.

use serde::{Deserialize, Serialize};

use crate::error::ShellBridgeError;
use crate::Result;

/// Character encoding of the remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8. Encoding never fails; decoding is lossy.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character up to U+00FF.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

impl Encoding {
    /// Encode command text into bytes.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => self.encode_narrow(text, 0xFF),
            Encoding::Ascii => self.encode_narrow(text, 0x7F),
        }
    }

    fn encode_narrow(self, text: &str, max: u32) -> Result<Vec<u8>> {
        text.chars()
            .map(|c| {
                if (c as u32) <= max {
                    Ok(c as u8)
                } else {
                    Err(ShellBridgeError::Encoding {
                        encoding: self,
                        character: c,
                    })
                }
            })
            .collect()
    }

    /// Decode buffered output into text.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = ShellBridgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(ShellBridgeError::Config(format!("unknown encoding: {}", s))),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
        };
        f.write_str(name)
    }
}
