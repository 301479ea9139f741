//! Method descriptors in the host's encoding
//!
//! ```text
//! MethodDescriptor: '(' FieldType* ')' ReturnType
//! ReturnType:       FieldType | 'V'
//! FieldType:        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z'
//!                 | 'L' ClassName ';'
//!                 | '[' FieldType
//! ```

use std::fmt;

use crate::error::{BridgeError, BridgeResult};

/// A single parameter or return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `D`
    Double,
    /// `F`
    Float,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `S`
    Short,
    /// `Z`
    Boolean,
    /// `L<internal name>;`
    Object(String),
    /// `[<component>`
    Array(Box<FieldType>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => f.write_str("B"),
            FieldType::Char => f.write_str("C"),
            FieldType::Double => f.write_str("D"),
            FieldType::Float => f.write_str("F"),
            FieldType::Int => f.write_str("I"),
            FieldType::Long => f.write_str("J"),
            FieldType::Short => f.write_str("S"),
            FieldType::Boolean => f.write_str("Z"),
            FieldType::Object(name) => write!(f, "L{};", name),
            FieldType::Array(component) => write!(f, "[{}", component),
        }
    }
}

/// A parsed method descriptor such as `()V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    params: Vec<FieldType>,
    /// `None` for `V`
    ret: Option<FieldType>,
}

impl MethodDescriptor {
    /// Descriptor of a method taking nothing and returning nothing.
    pub fn void_no_args() -> Self {
        Self {
            params: Vec::new(),
            ret: None,
        }
    }

    /// Parse a descriptor string.
    pub fn parse(text: &str) -> BridgeResult<Self> {
        let mut parser = Parser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        };
        parser.expect(b'(')?;
        let mut params = Vec::new();
        while parser.peek() != Some(b')') {
            if parser.peek().is_none() {
                return Err(parser.error("unterminated parameter list"));
            }
            params.push(parser.field_type()?);
        }
        parser.expect(b')')?;
        let ret = if parser.peek() == Some(b'V') {
            parser.pos += 1;
            None
        } else {
            Some(parser.field_type()?)
        };
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("trailing characters after return type"));
        }
        Ok(Self { params, ret })
    }

    /// Parameter types in declaration order.
    pub fn params(&self) -> &[FieldType] {
        &self.params
    }

    /// Return type, `None` when the method returns nothing.
    pub fn return_type(&self) -> Option<&FieldType> {
        self.ret.as_ref()
    }

    /// Whether the method returns nothing.
    pub fn is_void(&self) -> bool {
        self.ret.is_none()
    }

    /// Number of declared parameters.
    pub fn arg_count(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for p in &self.params {
            write!(f, "{}", p)?;
        }
        f.write_str(")")?;
        match &self.ret {
            Some(t) => write!(f, "{}", t),
            None => f.write_str("V"),
        }
    }
}

impl std::str::FromStr for MethodDescriptor {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, reason: &str) -> BridgeError {
        BridgeError::InvalidDescriptor {
            descriptor: self.text.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    fn expect(&mut self, byte: u8) -> BridgeResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn field_type(&mut self) -> BridgeResult<FieldType> {
        let Some(byte) = self.peek() else {
            return Err(self.error("unexpected end of descriptor"));
        };
        self.pos += 1;
        let ty = match byte {
            b'B' => FieldType::Byte,
            b'C' => FieldType::Char,
            b'D' => FieldType::Double,
            b'F' => FieldType::Float,
            b'I' => FieldType::Int,
            b'J' => FieldType::Long,
            b'S' => FieldType::Short,
            b'Z' => FieldType::Boolean,
            b'L' => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b == b';' {
                        break;
                    }
                    self.pos += 1;
                }
                if self.peek() != Some(b';') {
                    return Err(self.error("unterminated class type"));
                }
                let name = &self.text[start..self.pos];
                if name.is_empty() {
                    return Err(self.error("empty class type"));
                }
                self.pos += 1;
                FieldType::Object(name.to_string())
            }
            b'[' => FieldType::Array(Box::new(self.field_type()?)),
            _ => {
                self.pos -= 1;
                return Err(self.error(&format!("unknown type tag '{}'", byte as char)));
            }
        };
        Ok(ty)
    }
}
