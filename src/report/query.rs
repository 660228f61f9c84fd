use core::fmt::{self, Write};

use heapless::String;

#[derive(Debug, PartialEq)]
pub enum Error {
    Capacity,
}

/// Fixed-capacity URL with percent-encoded query parameters.
pub struct Url<const N: usize> {
    text: String<N>,
    has_query: bool,
}

impl<const N: usize> Url<N> {
    pub fn new(base: &str) -> Result<Self, Error> {
        let mut text = String::new();
        text.push_str(base).map_err(|_| Error::Capacity)?;
        Ok(Self {
            has_query: base.contains('?'),
            text,
        })
    }

    pub fn param(&mut self, key: &str, value: impl fmt::Display) -> Result<&mut Self, Error> {
        let separator = if self.has_query { '&' } else { '?' };
        self.has_query = true;

        self.text.push(separator).map_err(|_| Error::Capacity)?;
        write!(Encoder(&mut self.text), "{}", key).map_err(|_| Error::Capacity)?;
        self.text.push('=').map_err(|_| Error::Capacity)?;
        write!(Encoder(&mut self.text), "{}", value).map_err(|_| Error::Capacity)?;
        Ok(self)
    }

    /// Adds the parameter only when a value is present.
    pub fn param_fixed(
        &mut self,
        key: &str,
        value: Option<f32>,
        precision: usize,
    ) -> Result<&mut Self, Error> {
        match value {
            Some(v) => self.param(key, format_args!("{:.*}", precision, v)),
            None => Ok(self),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

struct Encoder<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Encoder<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        for byte in s.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                self.0.push(byte as char).map_err(|_| fmt::Error)?;
            } else {
                self.0.push('%').map_err(|_| fmt::Error)?;
                self.0
                    .push(HEX[(byte >> 4) as usize] as char)
                    .map_err(|_| fmt::Error)?;
                self.0
                    .push(HEX[(byte & 0x0F) as usize] as char)
                    .map_err(|_| fmt::Error)?;
            }
        }
        Ok(())
    }
}
